pub mod connectors;
pub mod event_log;
pub mod history;

pub use connectors::{CsvConnector, DataValidator, DatasetMetadata, RequiredColumn};
pub use event_log::EventLog;
pub use history::{EntityHistory, PerEntityOrderer};
