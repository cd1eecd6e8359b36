use serde::{Deserialize, Serialize};

use super::OrderedMap;

/// A single anomaly finding, tagged by its `reason`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Anomaly {
    /// User-agent contains a blocklisted signature
    BlockedSignature { count: usize },
    /// User-agent is suspiciously short
    ShortUserAgent { count: usize },
    /// Response time lies more than three standard deviations above the IP's mean
    HighResponseTime { value: i64, mean: f64, std: f64 },
}

impl Anomaly {
    pub fn reason(&self) -> &'static str {
        match self {
            Anomaly::BlockedSignature { .. } => "blocked_signature",
            Anomaly::ShortUserAgent { .. } => "short_user_agent",
            Anomaly::HighResponseTime { .. } => "high_response_time",
        }
    }
}

/// Result of one detection pass
///
/// Field names on the wire follow the established report format consumed by
/// downstream tooling.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    /// High-rate IPs followed by brute-force IPs, without duplicates
    #[serde(rename = "ips_sospechosas")]
    pub suspicious_ips: Vec<String>,
    /// IP -> largest number of failed logins inside one window
    #[serde(rename = "ataques_fuerza_bruta")]
    pub brute_force_attacks: OrderedMap<usize>,
    /// Sensitive endpoint -> total hits
    #[serde(rename = "endpoints_bajo_ataque")]
    pub endpoints_under_attack: OrderedMap<usize>,
    /// `ua_blocked:<ua>`, `ua_short:<ua>` or `response_time:<ip>` -> detail
    #[serde(rename = "anomalias_detectadas")]
    pub anomalies: OrderedMap<Anomaly>,
    #[serde(rename = "total_eventos_sospechosos")]
    pub total_suspicious_events: usize,
}

impl Report {
    /// Assemble a report; the total is the plain sum of all four sections
    pub fn new(
        suspicious_ips: Vec<String>,
        brute_force_attacks: OrderedMap<usize>,
        endpoints_under_attack: OrderedMap<usize>,
        anomalies: OrderedMap<Anomaly>,
    ) -> Self {
        let total_suspicious_events = suspicious_ips.len()
            + brute_force_attacks.len()
            + endpoints_under_attack.len()
            + anomalies.len();

        Report {
            suspicious_ips,
            brute_force_attacks,
            endpoints_under_attack,
            anomalies,
            total_suspicious_events,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.total_suspicious_events == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_counts_overlapping_categories() {
        let brute: OrderedMap<usize> = vec![("9.9.9.9", 6)].into_iter().collect();
        let report = Report::new(
            vec!["9.9.9.9".to_string()],
            brute,
            OrderedMap::new(),
            OrderedMap::new(),
        );

        // Same IP listed twice counts twice
        assert_eq!(report.total_suspicious_events, 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_wire_field_names() {
        let mut anomalies = OrderedMap::new();
        anomalies.insert("ua_blocked:curl/7.88", Anomaly::BlockedSignature { count: 2 });
        let report = Report::new(vec![], OrderedMap::new(), OrderedMap::new(), anomalies);

        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("ips_sospechosas").is_some());
        assert!(value.get("ataques_fuerza_bruta").is_some());
        assert!(value.get("endpoints_bajo_ataque").is_some());
        assert_eq!(value["total_eventos_sospechosos"], 1);
        assert_eq!(
            value["anomalias_detectadas"]["ua_blocked:curl/7.88"],
            serde_json::json!({"reason": "blocked_signature", "count": 2})
        );
    }

    #[test]
    fn test_high_response_time_detail() {
        let anomaly = Anomaly::HighResponseTime { value: 100000, mean: 9181.5, std: 28720.0 };
        let value = serde_json::to_value(&anomaly).unwrap();

        assert_eq!(value["reason"], "high_response_time");
        assert_eq!(value["value"], 100000);
        assert_eq!(anomaly.reason(), "high_response_time");
    }

    #[test]
    fn test_partial_report_reads_back_with_defaults() {
        let report: Report = serde_json::from_str(r#"{"ips_sospechosas": ["1.2.3.4"]}"#).unwrap();

        assert_eq!(report.suspicious_ips, vec!["1.2.3.4".to_string()]);
        assert!(report.brute_force_attacks.is_empty());
        assert!(report.anomalies.is_empty());
        assert_eq!(report.total_suspicious_events, 0);
    }
}
