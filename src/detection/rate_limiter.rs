//! Rate-based rules: high request rate per IP, brute force, endpoint floods
//!
//! All three run the sliding-window scans from [`super::window`] over the
//! sorted timelines produced by the aggregator.

use super::window::{count_within_window, has_high_rate};
use crate::config::DetectionConfig;
use crate::models::OrderedMap;

/// Thresholds for the rate-based rules, derived once from the config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiter {
    /// Window length in milliseconds (at least 1)
    window_ms: i64,
    /// Requests per IP allowed inside one window (at least 1)
    max_per_window: usize,
    /// Failed logins per IP inside one window that count as brute force
    max_failed_logins: usize,
    /// Hits per sensitive endpoint allowed inside one window
    flood_threshold: usize,
}

impl RateLimiter {
    pub fn from_config(config: &DetectionConfig) -> Self {
        RateLimiter {
            window_ms: config.window_ms(),
            max_per_window: config.max_requests_per_window(),
            max_failed_logins: to_usize(config.max_failed_logins),
            // Endpoint floods compare against the raw per-minute figure, not
            // the window-scaled one
            flood_threshold: to_usize(config.max_requests_per_minute),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    pub fn max_per_window(&self) -> usize {
        self.max_per_window
    }

    /// IPs whose request rate exceeds the per-window limit, in first-seen order
    pub fn high_rate_ips(&self, requests_by_ip: &OrderedMap<Vec<i64>>) -> Vec<String> {
        requests_by_ip
            .iter()
            .filter(|(_, timestamps)| has_high_rate(timestamps, self.window_ms, self.max_per_window))
            .map(|(ip, _)| ip.to_string())
            .collect()
    }

    /// IPs with at least `max_failed_logins` failures inside one window
    ///
    /// The value is the largest number of failures seen in a single window.
    pub fn brute_force_ips(&self, failed_logins_by_ip: &OrderedMap<Vec<i64>>) -> OrderedMap<usize> {
        failed_logins_by_ip
            .iter()
            .filter_map(|(ip, timestamps)| {
                let count = count_within_window(timestamps, self.window_ms);
                (count >= self.max_failed_logins).then(|| (ip, count))
            })
            .collect()
    }

    /// Sensitive endpoints hit more than the flood threshold inside one window
    ///
    /// The value is the endpoint's total hit count across the batch.
    pub fn endpoint_floods(&self, hits_by_endpoint: &OrderedMap<Vec<i64>>) -> OrderedMap<usize> {
        hits_by_endpoint
            .iter()
            .filter(|(_, timestamps)| has_high_rate(timestamps, self.window_ms, self.flood_threshold))
            .map(|(endpoint, timestamps)| (endpoint, timestamps.len()))
            .collect()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}

/// Append brute-force IPs to the high-rate list, skipping ones already present
pub fn merge_suspicious_ips(
    mut high_rate_ips: Vec<String>,
    brute_force: &OrderedMap<usize>,
) -> Vec<String> {
    for ip in brute_force.keys() {
        if !high_rate_ips.iter().any(|existing| existing == ip) {
            high_rate_ips.push(ip.to_string());
        }
    }
    high_rate_ips
}

/// Negative thresholds become 0, so any hit trips the rule
fn to_usize(value: i64) -> usize {
    usize::try_from(value.max(0)).unwrap_or(usize::MAX)
}
