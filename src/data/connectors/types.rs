use crate::config::ColumnsConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Columns the splitters read from an event log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequiredColumn {
    EntityId,
    Timestamp,
    EventSubtype,
}

impl RequiredColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntityId => "entity_id",
            Self::Timestamp => "timestamp",
            Self::EventSubtype => "event_subtype",
        }
    }

    /// Name configured for this column
    pub fn configured<'a>(&self, columns: &'a ColumnsConfig) -> &'a str {
        match self {
            Self::EntityId => &columns.entity_id,
            Self::Timestamp => &columns.timestamp,
            Self::EventSubtype => &columns.event_subtype,
        }
    }

    /// Common alternative column names
    pub fn aliases(&self) -> Vec<&'static str> {
        match self {
            Self::EntityId => vec!["entity_id", "user_id", "userId", "user"],
            Self::Timestamp => vec!["timestamp", "event_timestamp", "ts_listen", "ts", "time"],
            Self::EventSubtype => vec!["event_subtype", "listen_type", "event_type", "subtype"],
        }
    }
}

/// Metadata about a loaded event log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub file_path: String,
    pub num_rows: usize,
    pub num_columns: usize,
    pub columns: Vec<String>,
    pub num_entities: usize,
    pub skipped_rows: usize,
    pub time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}
