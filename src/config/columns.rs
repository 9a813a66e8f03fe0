use super::traits::ConfigSection;
use crate::error::FoldError;
use serde::{Deserialize, Serialize};

/// Names of the event log columns the splitters read.
///
/// Each name is tried first; when absent from the frame the connector falls
/// back to the aliases of the matching `RequiredColumn`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    pub entity_id: String,
    pub timestamp: String,
    pub event_subtype: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            entity_id: "user_id".to_string(),
            timestamp: "ts_listen".to_string(),
            event_subtype: "listen_type".to_string(),
        }
    }
}

impl ColumnsConfig {
    pub fn new(entity_id: &str, timestamp: &str, event_subtype: &str) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            timestamp: timestamp.to_string(),
            event_subtype: event_subtype.to_string(),
        }
    }
}

impl ConfigSection for ColumnsConfig {
    fn section_name() -> &'static str {
        "columns"
    }

    fn validate(&self) -> Result<(), FoldError> {
        let names = [&self.entity_id, &self.timestamp, &self.event_subtype];
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(FoldError::Configuration(
                "Column names must not be empty".to_string(),
            ));
        }
        if self.entity_id == self.timestamp
            || self.entity_id == self.event_subtype
            || self.timestamp == self.event_subtype
        {
            return Err(FoldError::Configuration(
                "Entity, timestamp and subtype columns must be distinct".to_string(),
            ));
        }
        Ok(())
    }
}
