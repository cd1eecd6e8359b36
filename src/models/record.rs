use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// IP recorded for entries that carry no source address
pub const UNKNOWN_IP: &str = "unknown";

/// Endpoint recorded for entries that carry no path
pub const ROOT_ENDPOINT: &str = "/";

/// Timestamp exactly as it appeared in the input
///
/// Access logs mix unix seconds, unix milliseconds and date strings, and
/// sometimes carry garbage. Every shape deserializes so a single bad entry
/// never rejects the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum RawTimestamp {
    Integer(i64),
    Float(f64),
    Text(String),
    #[default]
    Missing,
    Other(serde_json::Value),
}

impl From<i64> for RawTimestamp {
    fn from(value: i64) -> Self {
        RawTimestamp::Integer(value)
    }
}

impl From<&str> for RawTimestamp {
    fn from(value: &str) -> Self {
        RawTimestamp::Text(value.to_string())
    }
}

impl From<String> for RawTimestamp {
    fn from(value: String) -> Self {
        RawTimestamp::Text(value)
    }
}

/// A single access-log entry
///
/// Missing or `null` fields take their defaults here, at the parse boundary,
/// so detection code never has to re-check them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Source address, `"unknown"` when absent
    #[serde(default = "default_ip", deserialize_with = "ip_or_unknown")]
    pub ip: String,
    /// Request path, `"/"` when absent
    #[serde(default = "default_endpoint", deserialize_with = "endpoint_or_root")]
    pub endpoint: String,
    #[serde(default)]
    pub timestamp: RawTimestamp,
    /// HTTP status, 0 when absent or non-numeric
    #[serde(default, deserialize_with = "int_or_zero")]
    pub status: i64,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub user_agent: String,
    /// Response latency in milliseconds
    #[serde(default, deserialize_with = "optional_int", skip_serializing_if = "Option::is_none")]
    pub response_time: Option<i64>,
}

impl LogRecord {
    pub fn new(
        ip: &str,
        endpoint: &str,
        timestamp: impl Into<RawTimestamp>,
        status: i64,
        user_agent: &str,
    ) -> Self {
        LogRecord {
            ip: ip.to_string(),
            endpoint: endpoint.to_string(),
            timestamp: timestamp.into(),
            status,
            user_agent: user_agent.to_string(),
            response_time: None,
        }
    }

    pub fn with_response_time(mut self, response_time_ms: i64) -> Self {
        self.response_time = Some(response_time_ms);
        self
    }
}

fn default_ip() -> String {
    UNKNOWN_IP.to_string()
}

fn default_endpoint() -> String {
    ROOT_ENDPOINT.to_string()
}

/// String-like field value: text, or a scalar rendered as text
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientString {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Other(IgnoredAny),
}

impl LenientString {
    fn into_string(self) -> Option<String> {
        match self {
            LenientString::Text(s) => Some(s),
            LenientString::Integer(n) => Some(n.to_string()),
            LenientString::Float(f) => Some(f.to_string()),
            // `true` renders as "1", `false` as ""
            LenientString::Bool(b) => Some(if b { "1".to_string() } else { String::new() }),
            LenientString::Other(_) => None,
        }
    }
}

fn optional_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<LenientString>::deserialize(deserializer)?.and_then(LenientString::into_string))
}

fn ip_or_unknown<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(optional_string(deserializer)?.unwrap_or_else(default_ip))
}

fn endpoint_or_root<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(optional_string(deserializer)?.unwrap_or_else(default_endpoint))
}

fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(optional_string(deserializer)?.unwrap_or_default())
}

/// Integer-like field value: a number, or a string holding one
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientInt {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl LenientInt {
    fn into_i64(self) -> Option<i64> {
        match self {
            LenientInt::Integer(n) => Some(n),
            LenientInt::Float(f) => truncate_float(f),
            LenientInt::Text(s) => parse_numeric(&s),
            LenientInt::Other(_) => None,
        }
    }
}

fn int_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(optional_int(deserializer)?.unwrap_or(0))
}

fn optional_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<LenientInt>::deserialize(deserializer)?.and_then(LenientInt::into_i64))
}

/// Parse a numeric string (`"401"`, `" 1697123456 "`, `"1.5e3"`), truncating fractions
pub(crate) fn parse_numeric(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    s.parse::<f64>().ok().and_then(truncate_float)
}

pub(crate) fn truncate_float(f: f64) -> Option<i64> {
    // `as` saturates at the i64 bounds
    f.is_finite().then(|| f.trunc() as i64)
}
