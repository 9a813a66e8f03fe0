use super::types::FoldSet;
use crate::config::ColumnsConfig;
use crate::data::EventLog;
use crate::error::Result;
use polars::prelude::*;

pub trait FoldSplitter: Send + Sync {
    fn name(&self) -> &str;

    /// Number of folds every call returns
    fn n_folds(&self) -> usize;

    /// Column names used when splitting a raw frame
    fn columns(&self) -> &ColumnsConfig;

    /// Split an already built event log into folds
    fn split_log(&self, log: &EventLog) -> Result<FoldSet>;

    /// Split a raw frame; fails with `MissingColumns` when the key columns
    /// cannot be resolved
    fn split(&self, data: &DataFrame) -> Result<FoldSet> {
        let log = EventLog::from_frame(data.clone(), self.columns())?;
        self.split_log(&log)
    }
}
