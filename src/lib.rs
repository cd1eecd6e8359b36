pub mod config;
pub mod detection;
pub mod input;
pub mod models;
pub mod output;

// Re-export commonly used types
pub use config::DetectionConfig;
pub use detection::{Detector, SuspiciousActivityDetector};
pub use input::{JsonLoader, LoadError, LogLoader};
pub use models::{Anomaly, LogRecord, RawTimestamp, Report};
pub use output::{OutputFormat, OutputHandler};
