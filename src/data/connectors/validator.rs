use super::types::RequiredColumn;
use crate::config::ColumnsConfig;
use crate::error::{FoldError, Result};
use polars::prelude::*;
use std::collections::HashMap;

pub struct DataValidator;

impl DataValidator {
    /// Resolve the event log columns, checking their types.
    ///
    /// The subtype column is always resolved when present but only required
    /// when `require_subtype` is set.
    pub fn validate_event_columns(
        df: &DataFrame,
        columns: &ColumnsConfig,
        require_subtype: bool,
    ) -> Result<HashMap<RequiredColumn, String>> {
        let mut column_map = HashMap::new();

        for required in [RequiredColumn::EntityId, RequiredColumn::Timestamp] {
            let name = Self::find_column(df, &required, columns)
                .ok_or_else(|| Self::missing(&required, columns))?;
            column_map.insert(required, name);
        }

        match Self::find_column(df, &RequiredColumn::EventSubtype, columns) {
            Some(name) => {
                column_map.insert(RequiredColumn::EventSubtype, name);
            }
            None if require_subtype => {
                return Err(Self::missing(&RequiredColumn::EventSubtype, columns));
            }
            None => {}
        }

        for (required, actual_name) in &column_map {
            let dtype = df.column(actual_name)?.dtype().clone();
            let accepted = match required {
                RequiredColumn::Timestamp => {
                    dtype.is_integer() || matches!(dtype, DataType::Datetime(_, _))
                }
                _ => dtype.is_integer(),
            };
            if !accepted {
                return Err(FoldError::DataLoading(format!(
                    "Column '{}' ({}) must be integer typed, found {:?}",
                    actual_name,
                    required.as_str(),
                    dtype
                )));
            }
        }

        Ok(column_map)
    }

    /// Configured name first, then aliases
    fn find_column(
        df: &DataFrame,
        required: &RequiredColumn,
        columns: &ColumnsConfig,
    ) -> Option<String> {
        let names = df.get_column_names();
        let configured = required.configured(columns);
        if names.iter().any(|col| col.as_str() == configured) {
            return Some(configured.to_string());
        }
        required
            .aliases()
            .into_iter()
            .find(|alias| names.iter().any(|col| col.as_str() == *alias))
            .map(str::to_string)
    }

    fn missing(required: &RequiredColumn, columns: &ColumnsConfig) -> FoldError {
        FoldError::MissingColumns(required.configured(columns).to_string())
    }

    /// Check for minimum required rows
    pub fn validate_minimum_rows(df: &DataFrame, min_rows: usize) -> Result<()> {
        if df.height() < min_rows {
            return Err(FoldError::DataLoading(format!(
                "Insufficient data: {} rows, minimum {} required",
                df.height(),
                min_rows
            )));
        }
        Ok(())
    }

    /// Null counts per column, only for columns that have any
    pub fn check_nulls(df: &DataFrame) -> Result<Vec<(String, usize)>> {
        let mut null_report = Vec::new();

        for column in df.get_columns() {
            let null_count = column.null_count();
            if null_count > 0 {
                null_report.push((column.name().to_string(), null_count));
            }
        }

        Ok(null_report)
    }
}
