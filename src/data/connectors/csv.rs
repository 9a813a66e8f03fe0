use crate::config::ColumnsConfig;
use crate::data::event_log::EventLog;
use crate::error::{FoldError, Result};
use polars::prelude::*;
use chrono::{DateTime, Utc};
use std::path::Path;
use super::{
    types::DatasetMetadata,
    validator::DataValidator,
};

pub struct CsvConnector;

impl CsvConnector {
    /// Load CSV file into DataFrame
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| FoldError::DataLoading(format!("Failed to read CSV: {}", e)))?;

        Ok(df)
    }

    /// Load a CSV event log and build the typed view over it
    pub fn load_event_log<P: AsRef<Path>>(
        path: P,
        columns: &ColumnsConfig,
        require_subtype: bool,
    ) -> Result<EventLog> {
        let df = Self::load(&path)?;

        DataValidator::validate_event_columns(&df, columns, require_subtype)?;
        DataValidator::validate_minimum_rows(&df, 1)?;

        // Warn about nulls but don't fail
        let null_report = DataValidator::check_nulls(&df)?;
        if !null_report.is_empty() {
            log::warn!("Null values detected: {:?}", null_report);
        }

        let log = EventLog::from_frame(df, columns)?;
        if require_subtype {
            log.require_subtype()?;
        }
        Ok(log)
    }

    /// Create metadata for a loaded event log
    pub fn create_metadata<P: AsRef<Path>>(path: P, log: &EventLog) -> DatasetMetadata {
        let frame = log.frame();
        let time_range = log.time_range().and_then(|(min, max)| {
            Some((
                DateTime::<Utc>::from_timestamp(min, 0)?,
                DateTime::<Utc>::from_timestamp(max, 0)?,
            ))
        });

        DatasetMetadata {
            file_path: path.as_ref().to_string_lossy().to_string(),
            num_rows: frame.height(),
            num_columns: frame.width(),
            columns: frame
                .get_column_names()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            num_entities: log.entity_ids().len(),
            skipped_rows: log.skipped_rows(),
            time_range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_event_log_and_metadata() {
        let file = write_csv(
            "user_id,ts_listen,listen_type,media_id\n\
             1,100,1,10\n\
             1,200,0,11\n\
             2,150,1,10\n",
        );

        let log = CsvConnector::load_event_log(file.path(), &ColumnsConfig::default(), true)
            .unwrap();
        assert_eq!(log.len(), 3);

        let metadata = CsvConnector::create_metadata(file.path(), &log);
        assert_eq!(metadata.num_rows, 3);
        assert_eq!(metadata.num_entities, 2);
        assert_eq!(metadata.skipped_rows, 0);
        let (start, end) = metadata.time_range.unwrap();
        assert_eq!(start.timestamp(), 100);
        assert_eq!(end.timestamp(), 200);
    }

    #[test]
    fn test_load_without_required_subtype_fails() {
        let file = write_csv("user_id,ts_listen\n1,100\n");

        let result = CsvConnector::load_event_log(file.path(), &ColumnsConfig::default(), true);
        assert!(matches!(result, Err(FoldError::MissingColumns(_))));
    }
}
