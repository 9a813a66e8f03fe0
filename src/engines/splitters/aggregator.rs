use super::types::{FoldSet, InclusionPolicy, Partition, SplitPolicy};
use crate::types::{EntityId, RowId, Timeframe};

/// What one entity contributes to one fold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldContribution {
    pub train: Vec<RowId>,
    pub test: Vec<RowId>,
    pub timeframe: Option<Timeframe>,
}

/// Per-fold contributions of one entity; `None` where it had too little data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySplit {
    pub entity_id: EntityId,
    pub folds: Vec<Option<FoldContribution>>,
}

/// Merges per-entity results into fold-level partitions
pub struct PartitionAggregator {
    n_folds: usize,
    inclusion: InclusionPolicy,
}

impl PartitionAggregator {
    pub fn new(n_folds: usize, inclusion: InclusionPolicy) -> Self {
        Self { n_folds, inclusion }
    }

    /// Merge entity splits into `n_folds` partitions.
    ///
    /// Input order does not matter: splits are merged by ascending entity id.
    /// An entity's test rows are kept in a fold only when it also has train
    /// rows there.
    pub fn aggregate(&self, policy: SplitPolicy, mut splits: Vec<EntitySplit>) -> FoldSet {
        splits.sort_by_key(|s| s.entity_id);

        let mut folds: Vec<Partition> = (0..self.n_folds).map(Partition::new).collect();
        let mut insufficient = 0usize;
        let mut orphaned = 0usize;

        for split in splits {
            let complete = split.folds.len() >= self.n_folds
                && split.folds.iter().take(self.n_folds).all(Option::is_some);
            if self.inclusion == InclusionPolicy::AllFolds && !complete {
                insufficient += 1;
                continue;
            }

            for (partition, contribution) in folds.iter_mut().zip(split.folds) {
                let Some(contribution) = contribution else {
                    continue;
                };
                if contribution.train.is_empty() {
                    if !contribution.test.is_empty() {
                        orphaned += 1;
                    }
                    continue;
                }

                partition.train_row_ids.extend(contribution.train);
                partition.test_row_ids.extend(contribution.test);
                if let Some(timeframe) = contribution.timeframe {
                    partition.timeframes.insert(split.entity_id, timeframe);
                }
            }
        }

        if insufficient > 0 {
            log::debug!(
                "{} entities lacked history for all {} folds and were excluded",
                insufficient,
                self.n_folds
            );
        }
        if orphaned > 0 {
            log::debug!("{} test selections dropped for entities without train rows", orphaned);
        }

        FoldSet { policy, folds }
    }
}
