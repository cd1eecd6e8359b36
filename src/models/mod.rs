pub mod ordered;
pub mod record;
pub mod report;

pub use ordered::OrderedMap;
pub use record::{LogRecord, RawTimestamp, ROOT_ENDPOINT, UNKNOWN_IP};
pub use report::{Anomaly, Report};
