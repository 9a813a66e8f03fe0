use super::event_log::EventLog;
use crate::error::Result;
use crate::types::{EntityId, OrderedEvent, RowId, Timeframe, Timestamp};
use std::collections::HashMap;

/// One entity's events, ascending by timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityHistory {
    pub entity_id: EntityId,
    events: Vec<OrderedEvent>,
}

impl EntityHistory {
    pub fn events(&self) -> &[OrderedEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn row_ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.events.iter().map(|e| e.row_id)
    }

    /// Events with `start <= timestamp <= end`
    pub fn between(&self, start: Timestamp, end: Timestamp) -> &[OrderedEvent] {
        if start > end {
            return &[];
        }
        let lo = self.events.partition_point(|e| e.timestamp < start);
        let hi = self.events.partition_point(|e| e.timestamp <= end);
        &self.events[lo..hi]
    }

    pub fn within(&self, timeframe: &Timeframe) -> &[OrderedEvent] {
        self.between(timeframe.start, timeframe.end)
    }

    /// Most frequent values of an integer feature column over this history,
    /// optionally restricted to a window. Ties go to the smaller value.
    pub fn top_values(
        &self,
        log: &EventLog,
        column: &str,
        n: usize,
        window: Option<&Timeframe>,
    ) -> Result<Vec<(i64, usize)>> {
        let values = log.int_column(column)?;
        let events = match window {
            Some(tf) => self.within(tf),
            None => self.events(),
        };

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for event in events {
            if let Some(value) = values.get(event.row_id).copied().flatten() {
                *counts.entry(value).or_insert(0) += 1;
            }
        }

        let mut ranking: Vec<(i64, usize)> = counts.into_iter().collect();
        ranking.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranking.truncate(n);
        Ok(ranking)
    }
}

/// Builds per-entity histories from an event log
pub struct PerEntityOrderer;

impl PerEntityOrderer {
    /// All keyed rows of `entity_id`, ascending by timestamp.
    ///
    /// Unknown entities yield an empty history.
    pub fn order(log: &EventLog, entity_id: EntityId) -> EntityHistory {
        let rows: Vec<RowId> = (0..log.len())
            .filter(|&row| log.entity(row) == Some(entity_id))
            .collect();
        Self::order_rows(log, entity_id, &rows)
    }

    /// Order a pre-grouped set of rows. `rows` must be in original row order
    /// so the stable sort breaks timestamp ties by row position.
    pub fn order_rows(log: &EventLog, entity_id: EntityId, rows: &[RowId]) -> EntityHistory {
        let mut events: Vec<OrderedEvent> = rows
            .iter()
            .filter_map(|&row_id| {
                let timestamp = log.timestamp(row_id)?;
                Some(OrderedEvent {
                    row_id,
                    timestamp,
                    event_subtype: log.event_subtype(row_id),
                })
            })
            .collect();
        events.sort_by_key(|e| e.timestamp);

        EntityHistory { entity_id, events }
    }
}
