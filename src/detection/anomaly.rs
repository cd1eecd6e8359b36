//! User-agent and response-time anomaly rules

use crate::models::{Anomaly, OrderedMap};

/// User-agents shorter than this many characters (and non-empty) are suspicious
pub const SHORT_USER_AGENT_LEN: usize = 10;

/// Z-score above which a response time is an outlier
pub const Z_SCORE_THRESHOLD: f64 = 3.0;

/// Minimum samples per IP before response times are scored
pub const MIN_RESPONSE_SAMPLES: usize = 3;

/// Flag blocklisted and very short user-agents
///
/// `user_agent_counts` must already be lower-cased. Keys are
/// `ua_blocked:<ua>` and `ua_short:<ua>`; one user-agent may produce both.
pub fn detect_user_agent_anomalies(
    user_agent_counts: &OrderedMap<usize>,
    blocked_user_agents: &[String],
) -> OrderedMap<Anomaly> {
    let blocked: Vec<String> = blocked_user_agents
        .iter()
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
        .collect();

    let mut anomalies = OrderedMap::new();
    for (ua, &count) in user_agent_counts.iter() {
        if blocked.iter().any(|token| ua.contains(token.as_str())) {
            anomalies.insert(format!("ua_blocked:{}", ua), Anomaly::BlockedSignature { count });
        }

        let len = ua.chars().count();
        if len > 0 && len < SHORT_USER_AGENT_LEN {
            anomalies.insert(format!("ua_short:{}", ua), Anomaly::ShortUserAgent { count });
        }
    }
    anomalies
}

/// Flag the first response time per IP whose z-score exceeds the threshold
///
/// Uses the population standard deviation. IPs with fewer than
/// [`MIN_RESPONSE_SAMPLES`] samples or no variance are skipped.
pub fn detect_response_time_anomalies(
    response_times_by_ip: &OrderedMap<Vec<i64>>,
) -> OrderedMap<Anomaly> {
    let mut anomalies = OrderedMap::new();
    for (ip, times) in response_times_by_ip.iter() {
        if times.len() < MIN_RESPONSE_SAMPLES {
            continue;
        }

        let (mean, std) = mean_and_std(times);
        if std == 0.0 {
            continue;
        }

        if let Some(&value) = times
            .iter()
            .find(|&&t| (t as f64 - mean) / std > Z_SCORE_THRESHOLD)
        {
            log::debug!(
                "Response time outlier for {}: {}ms (mean {:.1}, std {:.1})",
                ip, value, mean, std
            );
            anomalies.insert(
                format!("response_time:{}", ip),
                Anomaly::HighResponseTime { value, mean, std },
            );
        }
    }
    anomalies
}

/// Mean and population standard deviation
fn mean_and_std(values: &[i64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}
