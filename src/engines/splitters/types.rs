use crate::data::EventLog;
use crate::error::Result;
use crate::types::{EntityId, RowId, Timeframe};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which splitter produced a fold set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    Proportional,
    WithholdLastK,
}

/// Whether rows withheld by later folds stay in an earlier fold's train set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FutureWithheld {
    /// Fold j trains on everything except rows withheld by folds 0..=j
    Retain,
    /// Every fold trains without any of the k withheld rows
    Exclude,
}

/// How entities that cannot fill every fold are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InclusionPolicy {
    /// Entity appears in all folds or none
    AllFolds,
    /// Entity appears in each fold it can fill
    PerFold,
}

/// Which row of a chunk is held out in proportional splitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestSelection {
    /// Train on the whole chunk, test on the row after it; the final chunk
    /// tests on its own last row
    FollowingRow,
    /// Every chunk tests on its own last row
    ChunkTail,
}

/// One fold: disjoint train and test row ids plus per-entity train windows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub fold_num: usize,
    pub train_row_ids: BTreeSet<RowId>,
    pub test_row_ids: BTreeSet<RowId>,
    pub timeframes: BTreeMap<EntityId, Timeframe>,
}

impl Partition {
    pub fn new(fold_num: usize) -> Self {
        Self {
            fold_num,
            ..Self::default()
        }
    }

    pub fn is_disjoint(&self) -> bool {
        self.train_row_ids.is_disjoint(&self.test_row_ids)
    }

    /// Distinct entities with at least one test row
    pub fn test_entities(&self, log: &EventLog) -> BTreeSet<EntityId> {
        self.test_row_ids
            .iter()
            .filter_map(|&row| log.entity(row))
            .collect()
    }

    /// Resolve the row ids back into `(train, test)` frames
    pub fn materialize(&self, frame: &DataFrame) -> Result<(DataFrame, DataFrame)> {
        Ok((
            take_rows(frame, &self.train_row_ids)?,
            take_rows(frame, &self.test_row_ids)?,
        ))
    }
}

fn take_rows(frame: &DataFrame, rows: &BTreeSet<RowId>) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = rows.iter().map(|&row| row as IdxSize).collect();
    let idx = IdxCa::from_vec("row_id".into(), idx);
    Ok(frame.take(&idx)?)
}

/// Summary of one fold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldStats {
    pub fold_num: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub test_entities: usize,
    pub timeframes: usize,
}

/// Ordered folds produced by one splitter run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldSet {
    pub policy: SplitPolicy,
    pub folds: Vec<Partition>,
}

impl FoldSet {
    pub fn len(&self) -> usize {
        self.folds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folds.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Partition> {
        self.folds.iter()
    }

    pub fn get(&self, fold: usize) -> Option<&Partition> {
        self.folds.get(fold)
    }

    /// Union of test rows over all folds
    pub fn withheld_rows(&self) -> BTreeSet<RowId> {
        self.folds
            .iter()
            .flat_map(|p| p.test_row_ids.iter().copied())
            .collect()
    }

    pub fn stats(&self, log: &EventLog) -> Vec<FoldStats> {
        self.folds
            .iter()
            .map(|p| FoldStats {
                fold_num: p.fold_num,
                train_rows: p.train_row_ids.len(),
                test_rows: p.test_row_ids.len(),
                test_entities: p.test_entities(log).len(),
                timeframes: p.timeframes.len(),
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a FoldSet {
    type Item = &'a Partition;
    type IntoIter = std::slice::Iter<'a, Partition>;

    fn into_iter(self) -> Self::IntoIter {
        self.folds.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnsConfig;
    use polars::df;

    #[test]
    fn test_materialize_takes_rows_by_position() {
        let df = df! {
            "user_id" => &[1i64, 1, 1],
            "ts_listen" => &[10i64, 20, 30],
            "media_id" => &[100i64, 200, 300],
        }
        .unwrap();

        let mut partition = Partition::new(0);
        partition.train_row_ids.extend([0, 1]);
        partition.test_row_ids.insert(2);

        let (train, test) = partition.materialize(&df).unwrap();
        assert_eq!(train.height(), 2);
        assert_eq!(test.height(), 1);
        let media = test.column("media_id").unwrap().i64().unwrap().get(0);
        assert_eq!(media, Some(300));

        let log = EventLog::from_frame(df, &ColumnsConfig::default()).unwrap();
        assert_eq!(partition.test_entities(&log).len(), 1);
        assert!(partition.is_disjoint());
    }

    #[test]
    fn test_policy_serializes_snake_case() {
        let json = serde_json::to_string(&SplitPolicy::WithholdLastK).unwrap();
        assert_eq!(json, "\"withhold_last_k\"");
    }
}
