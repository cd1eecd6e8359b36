//! Detection pipeline
//!
//! Records are normalized and grouped once ([`Timelines`]), the rate-based
//! and anomaly rules run over the grouped view, and their findings are
//! merged into a [`Report`]. A pass holds no state between calls.

pub mod aggregator;
pub mod anomaly;
pub mod rate_limiter;
pub mod timestamp;
pub mod window;

pub use aggregator::Timelines;
pub use rate_limiter::RateLimiter;
pub use timestamp::{normalize_timestamp, try_normalize};
pub use window::{count_within_window, has_high_rate};

use crate::config::DetectionConfig;
use crate::models::{LogRecord, Report};

/// Something that turns a batch of access-log records into a report
///
/// Detection never fails: malformed input degrades instead of aborting.
pub trait Detector {
    fn detect(&self, records: &[LogRecord], config: &DetectionConfig) -> Report;
}

/// Standard rule set: request rate, brute force, endpoint flood and anomalies
#[derive(Debug, Default, Clone, Copy)]
pub struct SuspiciousActivityDetector;

impl SuspiciousActivityDetector {
    pub fn new() -> Self {
        SuspiciousActivityDetector
    }
}

impl Detector for SuspiciousActivityDetector {
    fn detect(&self, records: &[LogRecord], config: &DetectionConfig) -> Report {
        let timelines = Timelines::build(records, config);
        let limiter = RateLimiter::from_config(config);

        let high_rate_ips = limiter.high_rate_ips(&timelines.requests_by_ip);
        let brute_force = limiter.brute_force_ips(&timelines.failed_logins_by_ip);
        let floods = limiter.endpoint_floods(&timelines.hits_by_endpoint);
        log::debug!(
            "Rate rules: {} high-rate IP(s), {} brute-force IP(s), {} flooded endpoint(s) (window {}ms, {} req/window)",
            high_rate_ips.len(),
            brute_force.len(),
            floods.len(),
            limiter.window_ms(),
            limiter.max_per_window()
        );

        let suspicious_ips = rate_limiter::merge_suspicious_ips(high_rate_ips, &brute_force);

        let mut anomalies = anomaly::detect_user_agent_anomalies(
            &timelines.user_agent_counts,
            &config.blocked_user_agents,
        );
        for (key, finding) in anomaly::detect_response_time_anomalies(&timelines.response_times_by_ip).iter() {
            anomalies.insert(key, finding.clone());
        }

        let report = Report::new(suspicious_ips, brute_force, floods, anomalies);
        log::info!(
            "Analyzed {} record(s): {} suspicious event(s)",
            records.len(),
            report.total_suspicious_events
        );
        report
    }
}
