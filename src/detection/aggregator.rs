//! Per-key timelines built in one pass over the batch

use std::collections::HashSet;

use super::timestamp::normalize_timestamp;
use crate::config::DetectionConfig;
use crate::models::{LogRecord, OrderedMap};

/// HTTP status that marks a failed login
pub const STATUS_UNAUTHORIZED: i64 = 401;

/// Grouped view of a batch, read-only once built
///
/// Keys keep first-encounter order. Timestamp sequences are sorted ascending;
/// response times keep arrival order.
#[derive(Debug, Clone, Default)]
pub struct Timelines {
    /// IP -> every request timestamp
    pub requests_by_ip: OrderedMap<Vec<i64>>,
    /// IP -> timestamps of 401 responses
    pub failed_logins_by_ip: OrderedMap<Vec<i64>>,
    /// Sensitive endpoint -> hit timestamps
    pub hits_by_endpoint: OrderedMap<Vec<i64>>,
    /// Lower-cased user-agent -> occurrences
    pub user_agent_counts: OrderedMap<usize>,
    /// IP -> response times in milliseconds
    pub response_times_by_ip: OrderedMap<Vec<i64>>,
}

impl Timelines {
    pub fn build(records: &[LogRecord], config: &DetectionConfig) -> Self {
        let sensitive: HashSet<&str> = config
            .suspicious_endpoints
            .iter()
            .map(String::as_str)
            .collect();

        let mut timelines = Timelines::default();

        for record in records {
            let ts = normalize_timestamp(&record.timestamp);

            timelines.requests_by_ip.get_or_default(&record.ip).push(ts);

            if record.status == STATUS_UNAUTHORIZED {
                timelines.failed_logins_by_ip.get_or_default(&record.ip).push(ts);
            }

            if sensitive.contains(record.endpoint.as_str()) {
                timelines.hits_by_endpoint.get_or_default(&record.endpoint).push(ts);
            }

            *timelines
                .user_agent_counts
                .get_or_default(&record.user_agent.to_lowercase()) += 1;

            if let Some(response_time) = record.response_time {
                timelines
                    .response_times_by_ip
                    .get_or_default(&record.ip)
                    .push(response_time);
            }
        }

        for timestamps in timelines
            .requests_by_ip
            .values_mut()
            .chain(timelines.failed_logins_by_ip.values_mut())
            .chain(timelines.hits_by_endpoint.values_mut())
        {
            timestamps.sort_unstable();
        }

        log::debug!(
            "Aggregated {} record(s): {} IP(s), {} with failed logins, {} sensitive endpoint(s), {} user-agent(s)",
            records.len(),
            timelines.requests_by_ip.len(),
            timelines.failed_logins_by_ip.len(),
            timelines.hits_by_endpoint.len(),
            timelines.user_agent_counts.len()
        );

        timelines
    }
}
