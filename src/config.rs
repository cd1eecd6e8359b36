use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::input::LoadError;
use crate::models::record::truncate_float;

/// Milliseconds in one minute, the unit `max_requests_per_minute` is expressed in
pub const MINUTE_MS: i64 = 60_000;

/// Detection thresholds for a single analysis run
///
/// Every key is optional in the config file; absent keys take the defaults
/// below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Requests per minute a single IP may issue before it is flagged
    #[serde(deserialize_with = "whole_number")]
    pub max_requests_per_minute: i64,
    /// Failed logins (HTTP 401) within one window that count as brute force
    #[serde(deserialize_with = "whole_number")]
    pub max_failed_logins: i64,
    /// Endpoints watched for floods
    pub suspicious_endpoints: Vec<String>,
    /// Sliding window length in milliseconds
    #[serde(deserialize_with = "whole_number")]
    pub time_window: i64,
    /// Case-insensitive user-agent substrings that mark a request as hostile
    pub blocked_user_agents: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            max_requests_per_minute: 60,
            max_failed_logins: 5,
            suspicious_endpoints: Vec::new(),
            time_window: 300_000,
            blocked_user_agents: Vec::new(),
        }
    }
}

impl DetectionConfig {
    /// Window length used by the sliding-window rules, never zero
    pub fn window_ms(&self) -> i64 {
        self.time_window.max(1)
    }

    /// Per-minute request limit scaled to the configured window, never zero
    ///
    /// The scaled figure truncates toward zero before the floor of 1 applies.
    pub fn max_requests_per_window(&self) -> usize {
        let scaled = self.max_requests_per_minute as i128 * self.window_ms() as i128
            / MINUTE_MS as i128;
        scaled.clamp(1, usize::MAX as i128) as usize
    }

    /// Load configuration from a `.toml` or `.json` file
    ///
    /// The format is picked from the extension; anything other than `.toml`
    /// is read as JSON.
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let contents = crate::input::read_source(path)?;

        if is_toml(path) {
            toml::from_str(&contents).map_err(|source| LoadError::InvalidToml {
                path: path.to_path_buf(),
                source,
            })
        } else {
            // `null` means "all defaults"
            let config: Option<DetectionConfig> =
                serde_json::from_str(&contents).map_err(|source| LoadError::InvalidJson {
                    path: path.to_path_buf(),
                    source,
                })?;
            Ok(config.unwrap_or_default())
        }
    }

    /// Save configuration to a file, as TOML or pretty JSON depending on extension
    pub fn to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = if is_toml(path) {
            toml::to_string_pretty(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Integer config value; floats are accepted and truncated toward zero
#[derive(Deserialize)]
#[serde(untagged)]
enum WholeNumber {
    Integer(i64),
    Float(f64),
}

fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match WholeNumber::deserialize(deserializer)? {
        WholeNumber::Integer(n) => Ok(n),
        WholeNumber::Float(f) => {
            truncate_float(f).ok_or_else(|| D::Error::custom("expected a finite number"))
        }
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false)
}
