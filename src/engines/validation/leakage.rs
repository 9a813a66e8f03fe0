use crate::data::EventLog;
use crate::engines::splitters::types::{FoldSet, SplitPolicy};
use crate::types::{EntityId, RowId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Test row's entity has no train window in the fold
    MissingTimeframe,
    /// Train window reaches the test row's timestamp
    TimeframeNotBeforeTest { end: Timestamp, test_timestamp: Timestamp },
    /// Train window starts after it ends
    InvertedTimeframe { start: Timestamp, end: Timestamp },
    /// Row is both train and test in the same fold
    TrainTestOverlap,
    /// Row id has no keyed row in the log
    UnknownRow,
    /// Row withheld by more than one fold
    RepeatedWithholding { first_fold: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeakageViolation {
    pub fold_index: usize,
    pub entity_id: Option<EntityId>,
    pub row_id: Option<RowId>,
    pub kind: ViolationKind,
}

impl fmt::Display for LeakageViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fold {}: {:?}", self.fold_index, self.kind)?;
        if let Some(entity) = self.entity_id {
            write!(f, " entity={}", entity)?;
        }
        if let Some(row) = self.row_id {
            write!(f, " row={}", row)?;
        }
        Ok(())
    }
}

/// Checks that no fold lets train data see the future of its test rows
pub struct LeakageVerifier;

impl LeakageVerifier {
    /// Report every violation across all folds; never fails early.
    ///
    /// Timeframe checks apply to proportional fold sets. Withhold fold sets
    /// carry no timeframes and are checked for repeated withholding instead.
    pub fn verify(folds: &FoldSet, log: &EventLog) -> Result<(), Vec<LeakageViolation>> {
        let mut violations = Vec::new();
        let mut first_withheld: BTreeMap<RowId, usize> = BTreeMap::new();

        for (fold_index, partition) in folds.iter().enumerate() {
            let violation = |entity_id, row_id, kind| LeakageViolation {
                fold_index,
                entity_id,
                row_id,
                kind,
            };

            for &row in partition.train_row_ids.intersection(&partition.test_row_ids) {
                violations.push(violation(log.entity(row), Some(row), ViolationKind::TrainTestOverlap));
            }

            for (&entity, timeframe) in &partition.timeframes {
                if timeframe.start > timeframe.end {
                    violations.push(violation(
                        Some(entity),
                        None,
                        ViolationKind::InvertedTimeframe {
                            start: timeframe.start,
                            end: timeframe.end,
                        },
                    ));
                }
            }

            for &row in &partition.test_row_ids {
                let (Some(entity), Some(test_timestamp)) = (log.entity(row), log.timestamp(row))
                else {
                    violations.push(violation(None, Some(row), ViolationKind::UnknownRow));
                    continue;
                };

                match folds.policy {
                    SplitPolicy::Proportional => match partition.timeframes.get(&entity) {
                        None => violations.push(violation(
                            Some(entity),
                            Some(row),
                            ViolationKind::MissingTimeframe,
                        )),
                        Some(tf) if !tf.precedes(test_timestamp) => violations.push(violation(
                            Some(entity),
                            Some(row),
                            ViolationKind::TimeframeNotBeforeTest {
                                end: tf.end,
                                test_timestamp,
                            },
                        )),
                        Some(_) => {}
                    },
                    SplitPolicy::WithholdLastK => {
                        if let Some(&first_fold) = first_withheld.get(&row) {
                            violations.push(violation(
                                Some(entity),
                                Some(row),
                                ViolationKind::RepeatedWithholding { first_fold },
                            ));
                        } else {
                            first_withheld.insert(row, fold_index);
                        }
                    }
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            log::warn!("Leakage check found {} violations", violations.len());
            Err(violations)
        }
    }
}
