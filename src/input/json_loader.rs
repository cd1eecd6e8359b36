use super::{read_source, LoadError, LogLoader};
use crate::models::LogRecord;
use std::path::Path;

/// Loads a JSON array of access-log records from a file
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLoader;

impl JsonLoader {
    pub fn new() -> Self {
        JsonLoader
    }

    /// Parse records from an in-memory JSON document
    ///
    /// `null` yields no records; an empty document is invalid JSON.
    pub fn parse(contents: &str, path: &Path) -> Result<Vec<LogRecord>, LoadError> {
        let records: Option<Vec<LogRecord>> =
            serde_json::from_str(contents).map_err(|source| LoadError::InvalidJson {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(records.unwrap_or_default())
    }
}

impl LogLoader for JsonLoader {
    fn load(&self, source: &Path) -> Result<Vec<LogRecord>, LoadError> {
        let contents = read_source(source)?;
        let records = Self::parse(&contents, source)?;
        log::debug!("Loaded {} record(s) from {:?}", records.len(), source);
        Ok(records)
    }
}
