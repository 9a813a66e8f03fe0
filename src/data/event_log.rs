use super::connectors::{DataValidator, RequiredColumn};
use crate::config::ColumnsConfig;
use crate::error::{FoldError, Result};
use crate::types::{EntityId, RowId, Timestamp};
use polars::prelude::*;
use std::collections::BTreeMap;

/// Read-only typed view over an event frame.
///
/// Row ids are positions in `frame`; the key columns are extracted once so
/// per-entity work never goes back to polars.
#[derive(Debug, Clone)]
pub struct EventLog {
    frame: DataFrame,
    entity_column: String,
    timestamp_column: String,
    subtype_column: Option<String>,
    entities: Vec<Option<EntityId>>,
    timestamps: Vec<Option<Timestamp>>,
    subtypes: Option<Vec<Option<i64>>>,
    skipped_rows: usize,
}

impl EventLog {
    /// Build the view, failing with `MissingColumns` when the entity or
    /// timestamp column cannot be resolved.
    pub fn from_frame(frame: DataFrame, columns: &ColumnsConfig) -> Result<Self> {
        let column_map = DataValidator::validate_event_columns(&frame, columns, false)?;

        let entity_column = column_map[&RequiredColumn::EntityId].clone();
        let timestamp_column = column_map[&RequiredColumn::Timestamp].clone();
        let subtype_column = column_map.get(&RequiredColumn::EventSubtype).cloned();

        let entities = extract_i64(&frame, &entity_column)?;
        let timestamps = extract_i64(&frame, &timestamp_column)?;
        let subtypes = subtype_column
            .as_deref()
            .map(|name| extract_i64(&frame, name))
            .transpose()?;

        let skipped_rows = entities
            .iter()
            .zip(&timestamps)
            .filter(|(e, t)| e.is_none() || t.is_none())
            .count();
        if skipped_rows > 0 {
            log::warn!(
                "{} rows have a null {} or {} and are excluded from every fold",
                skipped_rows,
                entity_column,
                timestamp_column
            );
        }

        Ok(Self {
            frame,
            entity_column,
            timestamp_column,
            subtype_column,
            entities,
            timestamps,
            subtypes,
            skipped_rows,
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn entity_column(&self) -> &str {
        &self.entity_column
    }

    pub fn timestamp_column(&self) -> &str {
        &self.timestamp_column
    }

    pub fn subtype_column(&self) -> Option<&str> {
        self.subtype_column.as_deref()
    }

    pub fn entity(&self, row: RowId) -> Option<EntityId> {
        self.entities.get(row).copied().flatten()
    }

    pub fn timestamp(&self, row: RowId) -> Option<Timestamp> {
        self.timestamps.get(row).copied().flatten()
    }

    pub fn event_subtype(&self, row: RowId) -> Option<i64> {
        self.subtypes
            .as_ref()
            .and_then(|s| s.get(row).copied().flatten())
    }

    pub fn has_subtype(&self) -> bool {
        self.subtypes.is_some()
    }

    pub fn require_subtype(&self) -> Result<()> {
        if self.has_subtype() {
            Ok(())
        } else {
            Err(FoldError::MissingColumns(RequiredColumn::EventSubtype.as_str().to_string()))
        }
    }

    /// Rows dropped for a null key
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Whether `row` has both an entity and a timestamp
    pub fn is_keyed(&self, row: RowId) -> bool {
        self.entity(row).is_some() && self.timestamp(row).is_some()
    }

    /// Sorted distinct entity ids
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.group_by_entity().into_keys().collect()
    }

    /// Keyed rows grouped by entity, each group in original row order
    pub fn group_by_entity(&self) -> BTreeMap<EntityId, Vec<RowId>> {
        let mut groups: BTreeMap<EntityId, Vec<RowId>> = BTreeMap::new();
        for row in 0..self.len() {
            if let (Some(entity), Some(_)) = (self.entity(row), self.timestamp(row)) {
                groups.entry(entity).or_default().push(row);
            }
        }
        groups
    }

    /// Earliest and latest keyed timestamp
    pub fn time_range(&self) -> Option<(Timestamp, Timestamp)> {
        let mut keyed = (0..self.len())
            .filter(|&row| self.is_keyed(row))
            .filter_map(|row| self.timestamp(row));
        let first = keyed.next()?;
        Some(keyed.fold((first, first), |(lo, hi), ts| (lo.min(ts), hi.max(ts))))
    }

    /// Integer feature column, for lookups by row id
    pub fn int_column(&self, name: &str) -> Result<Vec<Option<i64>>> {
        if !self
            .frame
            .get_column_names()
            .iter()
            .any(|col| col.as_str() == name)
        {
            return Err(FoldError::MissingColumns(name.to_string()));
        }
        extract_i64(&self.frame, name)
    }
}

/// Integer or datetime column as epoch values; datetimes are floored to seconds
fn extract_i64(frame: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let column = frame.column(name)?;
    let divisor = match column.dtype() {
        DataType::Datetime(TimeUnit::Milliseconds, _) => 1_000,
        DataType::Datetime(TimeUnit::Microseconds, _) => 1_000_000,
        DataType::Datetime(TimeUnit::Nanoseconds, _) => 1_000_000_000,
        dtype if dtype.is_integer() => 1,
        dtype => {
            return Err(FoldError::DataLoading(format!(
                "Column '{}' must be integer typed, found {:?}",
                name, dtype
            )))
        }
    };

    let values = column.cast(&DataType::Int64)?;
    Ok(values
        .i64()?
        .into_iter()
        .map(|v| v.map(|v| v.div_euclid(divisor)))
        .collect())
}
