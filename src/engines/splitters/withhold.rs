use super::aggregator::{EntitySplit, FoldContribution, PartitionAggregator};
use super::base::FoldSplitter;
use super::types::{FoldSet, FutureWithheld, InclusionPolicy, Partition, SplitPolicy};
use crate::config::{ColumnsConfig, SplitConfig};
use crate::data::{EntityHistory, EventLog, PerEntityOrderer};
use crate::error::{FoldError, Result};
use crate::types::{EntityId, RowId};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

/// Decides from an event's subtype whether it may be withheld
pub type EligibilityPredicate = Arc<dyn Fn(Option<i64>) -> bool + Send + Sync>;

/// Withholds, for fold `j`, each entity's `(j+1)`-th most recent eligible
/// event. Train rows are every other row of the entity, minus the rows
/// withheld so far (or minus all withheld rows, see `FutureWithheld`).
pub struct WithholdLastKSplitter {
    k: usize,
    eligible: EligibilityPredicate,
    future_withheld: FutureWithheld,
    parallel: bool,
    columns: ColumnsConfig,
}

impl WithholdLastKSplitter {
    /// Withhold `k` events per entity; by default subtype `1` is eligible
    pub fn new(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(FoldError::invalid_argument(
                "k",
                "at least one event must be withheld",
            ));
        }
        Ok(Self {
            k,
            eligible: subtype_in(vec![1]),
            future_withheld: FutureWithheld::Retain,
            parallel: true,
            columns: ColumnsConfig::default(),
        })
    }

    pub fn from_config(split: &SplitConfig, columns: &ColumnsConfig) -> Result<Self> {
        Ok(Self::new(split.n_splits)?
            .with_eligible_subtypes(split.eligible_subtypes.clone())
            .with_future_withheld(split.future_withheld)
            .with_parallel(split.parallel)
            .with_columns(columns.clone()))
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(Option<i64>) -> bool + Send + Sync + 'static,
    {
        self.eligible = Arc::new(predicate);
        self
    }

    pub fn with_eligible_subtypes(mut self, subtypes: Vec<i64>) -> Self {
        self.eligible = subtype_in(subtypes);
        self
    }

    pub fn with_future_withheld(mut self, future_withheld: FutureWithheld) -> Self {
        self.future_withheld = future_withheld;
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

    /// Eligible rows from most to least recent, at most `k`
    pub fn withheld_rows(&self, history: &EntityHistory) -> Vec<RowId> {
        history
            .events()
            .iter()
            .rev()
            .filter(|e| (self.eligible)(e.event_subtype))
            .take(self.k)
            .map(|e| e.row_id)
            .collect()
    }

    /// Per-fold contributions of a single entity. Folds run in order since
    /// fold `j` trains without the rows withheld by folds before it.
    pub fn split_entity(&self, history: &EntityHistory) -> EntitySplit {
        let withheld = self.withheld_rows(history);
        let mut excluded: HashSet<RowId> = match self.future_withheld {
            FutureWithheld::Retain => HashSet::new(),
            FutureWithheld::Exclude => withheld.iter().copied().collect(),
        };

        let mut folds = Vec::with_capacity(self.k);
        for j in 0..self.k {
            let test = withheld.get(j).copied();
            if let Some(row) = test {
                excluded.insert(row);
            }

            let train: Vec<RowId> = history
                .row_ids()
                .filter(|row| !excluded.contains(row))
                .collect();

            folds.push(Some(FoldContribution {
                train,
                test: test.into_iter().collect(),
                timeframe: None,
            }));
        }

        EntitySplit {
            entity_id: history.entity_id,
            folds,
        }
    }

    /// Single partition holding out all `k` withheld rows of every entity
    /// at once
    pub fn holdout(&self, log: &EventLog) -> Result<Partition> {
        log.require_subtype()?;

        let splits = self.map_entities(log, |history| {
            let withheld = self.withheld_rows(history);
            let train = history
                .row_ids()
                .filter(|row| !withheld.contains(row))
                .collect();
            EntitySplit {
                entity_id: history.entity_id,
                folds: vec![Some(FoldContribution {
                    train,
                    test: withheld,
                    timeframe: None,
                })],
            }
        });

        let folds = PartitionAggregator::new(1, InclusionPolicy::PerFold)
            .aggregate(SplitPolicy::WithholdLastK, splits);
        Ok(folds.folds.into_iter().next().unwrap_or_default())
    }

    fn map_entities<F>(&self, log: &EventLog, f: F) -> Vec<EntitySplit>
    where
        F: Fn(&EntityHistory) -> EntitySplit + Send + Sync,
    {
        let groups = log.group_by_entity();
        let work = |(entity, rows): (&EntityId, &Vec<RowId>)| {
            f(&PerEntityOrderer::order_rows(log, *entity, rows))
        };

        if self.parallel {
            groups.par_iter().map(work).collect()
        } else {
            groups.iter().map(work).collect()
        }
    }
}

impl FoldSplitter for WithholdLastKSplitter {
    fn name(&self) -> &str {
        "Withhold last k"
    }

    fn n_folds(&self) -> usize {
        self.k
    }

    fn columns(&self) -> &ColumnsConfig {
        &self.columns
    }

    fn split_log(&self, log: &EventLog) -> Result<FoldSet> {
        log.require_subtype()?;

        let splits = self.map_entities(log, |history| self.split_entity(history));
        let folds = PartitionAggregator::new(self.k, InclusionPolicy::PerFold)
            .aggregate(SplitPolicy::WithholdLastK, splits);

        let withheld = folds.withheld_rows().len();
        if withheld == 0 {
            log::warn!("No eligible events found; all {} test sets are empty", self.k);
        }
        log::info!(
            "Withhold split: {} folds, {} rows withheld in total",
            self.k,
            withheld
        );
        Ok(folds)
    }
}

fn subtype_in(subtypes: Vec<i64>) -> EligibilityPredicate {
    Arc::new(move |subtype| subtype.is_some_and(|s| subtypes.contains(&s)))
}

/// Withhold-last-k split with a custom eligibility predicate
pub fn split_withhold<F>(log: &EventLog, k: usize, eligible: F) -> Result<FoldSet>
where
    F: Fn(Option<i64>) -> bool + Send + Sync + 'static,
{
    WithholdLastKSplitter::new(k)?
        .with_predicate(eligible)
        .split_log(log)
}

/// Single fold holding out each entity's most recent eligible event
pub fn withhold_last<F>(log: &EventLog, eligible: F) -> Result<Partition>
where
    F: Fn(Option<i64>) -> bool + Send + Sync + 'static,
{
    let folds = split_withhold(log, 1, eligible)?;
    Ok(folds.folds.into_iter().next().unwrap_or_default())
}
