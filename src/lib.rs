pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod types;

pub use data::{EntityHistory, EventLog, PerEntityOrderer};
pub use engines::splitters::{
    split_withhold, train_test_split, withhold_last, FoldSet, FoldSplitter, Partition,
    ProportionalSplitter, WithholdLastKSplitter,
};
pub use engines::validation::{LeakageVerifier, LeakageViolation};
pub use error::{FoldError, Result};
pub use types::{EntityId, RowId, Timeframe, Timestamp};
