use super::aggregator::{EntitySplit, FoldContribution, PartitionAggregator};
use super::base::FoldSplitter;
use super::chunker::chunk;
use super::types::{FoldSet, InclusionPolicy, SplitPolicy, TestSelection};
use crate::config::{ColumnsConfig, SplitConfig};
use crate::data::{EntityHistory, EventLog, PerEntityOrderer};
use crate::error::{FoldError, Result};
use crate::types::{EntityId, OrderedEvent, RowId, Timeframe};
use rayon::prelude::*;
use std::ops::Range;

/// Splits each entity's sorted history into `n_splits` contiguous chunks and
/// turns every chunk into one fold's train rows plus a single later test row.
pub struct ProportionalSplitter {
    n_splits: usize,
    inclusion: InclusionPolicy,
    test_selection: TestSelection,
    parallel: bool,
    columns: ColumnsConfig,
}

impl ProportionalSplitter {
    pub fn new(n_splits: usize) -> Result<Self> {
        if n_splits == 0 {
            return Err(FoldError::invalid_argument(
                "n_splits",
                "at least one fold is required",
            ));
        }
        Ok(Self {
            n_splits,
            inclusion: InclusionPolicy::AllFolds,
            test_selection: TestSelection::FollowingRow,
            parallel: true,
            columns: ColumnsConfig::default(),
        })
    }

    pub fn from_config(split: &SplitConfig, columns: &ColumnsConfig) -> Result<Self> {
        Ok(Self::new(split.n_splits)?
            .with_inclusion(split.inclusion)
            .with_test_selection(split.test_selection)
            .with_parallel(split.parallel)
            .with_columns(columns.clone()))
    }

    pub fn with_inclusion(mut self, inclusion: InclusionPolicy) -> Self {
        self.inclusion = inclusion;
        self
    }

    pub fn with_test_selection(mut self, test_selection: TestSelection) -> Self {
        self.test_selection = test_selection;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_columns(mut self, columns: ColumnsConfig) -> Self {
        self.columns = columns;
        self
    }

    /// Per-fold contributions of a single entity
    pub fn split_entity(&self, history: &EntityHistory) -> Result<EntitySplit> {
        let events = history.events();
        let chunks = chunk(events.len(), self.n_splits)?;
        let last = chunks.len().saturating_sub(1);

        let mut folds: Vec<Option<FoldContribution>> = vec![None; self.n_splits];
        for (i, range) in chunks.into_iter().enumerate() {
            folds[i] = match self.test_selection {
                TestSelection::FollowingRow if i != last => following_pair(events, range),
                _ => tail_pair(events, range),
            };
        }

        Ok(EntitySplit {
            entity_id: history.entity_id,
            folds,
        })
    }
}

impl FoldSplitter for ProportionalSplitter {
    fn name(&self) -> &str {
        "Proportional"
    }

    fn n_folds(&self) -> usize {
        self.n_splits
    }

    fn columns(&self) -> &ColumnsConfig {
        &self.columns
    }

    fn split_log(&self, log: &EventLog) -> Result<FoldSet> {
        let groups = log.group_by_entity();
        let work = |(entity, rows): (&EntityId, &Vec<RowId>)| {
            let history = PerEntityOrderer::order_rows(log, *entity, rows);
            self.split_entity(&history)
        };

        let splits: Vec<EntitySplit> = if self.parallel {
            groups.par_iter().map(work).collect::<Result<_>>()?
        } else {
            groups.iter().map(work).collect::<Result<_>>()?
        };

        let folds = PartitionAggregator::new(self.n_splits, self.inclusion)
            .aggregate(SplitPolicy::Proportional, splits);

        log::info!(
            "Proportional split: {} entities, {} folds, {} entities retained in fold 0",
            groups.len(),
            self.n_splits,
            folds.folds.first().map_or(0, |p| p.timeframes.len())
        );
        Ok(folds)
    }
}

/// Whole chunk trains, the first row after it is the test row
fn following_pair(events: &[OrderedEvent], range: Range<usize>) -> Option<FoldContribution> {
    let test = events.get(range.end)?;
    contribution(&events[range], test)
}

/// All but the chunk's last row train, the last row is the test row
fn tail_pair(events: &[OrderedEvent], range: Range<usize>) -> Option<FoldContribution> {
    if range.len() < 2 {
        return None;
    }
    let test = &events[range.end - 1];
    contribution(&events[range.start..range.end - 1], test)
}

fn contribution(train: &[OrderedEvent], test: &OrderedEvent) -> Option<FoldContribution> {
    let first = train.first()?;
    let last = train.last()?;
    Some(FoldContribution {
        train: train.iter().map(|e| e.row_id).collect(),
        test: vec![test.row_id],
        timeframe: Some(Timeframe::new(first.timestamp, last.timestamp)),
    })
}

/// Proportional split with the default options
pub fn train_test_split(log: &EventLog, n_splits: usize) -> Result<FoldSet> {
    ProportionalSplitter::new(n_splits)?.split_log(log)
}
