use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based row position in the source frame
pub type RowId = usize;
pub type EntityId = i64;
/// Epoch seconds
pub type Timestamp = i64;

/// One event of an entity's history, reduced to the fields the splitters need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedEvent {
    pub row_id: RowId,
    pub timestamp: Timestamp,
    pub event_subtype: Option<i64>,
}

/// Inclusive time window covered by one entity's train rows in one fold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timeframe {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Timeframe {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// True when every timestamp in the window is strictly before `ts`
    pub fn precedes(&self, ts: Timestamp) -> bool {
        self.end < ts
    }

    pub fn start_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.start, 0)
    }

    pub fn end_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.end, 0)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const FMT: &str = "%Y-%m-%d %H:%M:%S";
        match (self.start_datetime(), self.end_datetime()) {
            (Some(start), Some(end)) => {
                write!(f, "[{} .. {}]", start.format(FMT), end.format(FMT))
            }
            _ => write!(f, "[{} .. {}]", self.start, self.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_precedes_is_strict() {
        let tf = Timeframe::new(100, 200);
        assert!(tf.precedes(201));
        assert!(!tf.precedes(200));
        assert!(tf.contains(200));
        assert!(!tf.contains(99));
    }

    #[test]
    fn test_timeframe_display_uses_utc_dates() {
        let tf = Timeframe::new(0, 3600);
        assert_eq!(tf.to_string(), "[1970-01-01 00:00:00 .. 1970-01-01 01:00:00]");
    }
}
