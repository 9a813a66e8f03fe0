use foldsplit::config::ColumnsConfig;
use foldsplit::data::CsvConnector;
use foldsplit::engines::splitters::{
    train_test_split, FoldSplitter, InclusionPolicy, ProportionalSplitter, TestSelection,
};
use foldsplit::engines::validation::LeakageVerifier;
use foldsplit::{EventLog, Timeframe};
use polars::df;
use polars::prelude::*;
use std::collections::BTreeSet;

fn load_sample() -> EventLog {
    CsvConnector::load_event_log(
        "tests/data/listens_sample.csv",
        &ColumnsConfig::default(),
        false,
    )
    .unwrap()
}

fn rows(set: &BTreeSet<usize>) -> Vec<usize> {
    set.iter().copied().collect()
}

#[test]
fn test_sample_three_folds() {
    let log = load_sample();
    let folds = train_test_split(&log, 3).unwrap();
    assert_eq!(folds.len(), 3);

    // users 3, 4 and 5 cannot fill three folds
    for partition in &folds {
        assert_eq!(partition.timeframes.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    assert_eq!(rows(&folds.folds[0].train_row_ids), vec![2, 4, 6, 10, 13]);
    assert_eq!(rows(&folds.folds[0].test_row_ids), vec![8, 11]);
    assert_eq!(rows(&folds.folds[1].test_row_ids), vec![5, 9]);
    assert_eq!(rows(&folds.folds[2].train_row_ids), vec![0, 5, 9]);
    assert_eq!(rows(&folds.folds[2].test_row_ids), vec![7, 14]);

    assert_eq!(
        folds.folds[0].timeframes[&1],
        Timeframe::new(1479143484, 1480067109)
    );

    assert!(LeakageVerifier::verify(&folds, &log).is_ok());
}

#[test]
fn test_every_fold_is_disjoint_and_leak_free() {
    let log = load_sample();
    for n_splits in 1..=5 {
        let folds = train_test_split(&log, n_splits).unwrap();
        assert_eq!(folds.len(), n_splits);
        for partition in &folds {
            assert!(partition.is_disjoint());
        }
        assert!(
            LeakageVerifier::verify(&folds, &log).is_ok(),
            "leakage with {} folds",
            n_splits
        );
    }
}

#[test]
fn test_all_or_nothing_inclusion() {
    let log = load_sample();
    let folds = train_test_split(&log, 3).unwrap();

    let first: BTreeSet<i64> = folds.folds[0].timeframes.keys().copied().collect();
    for partition in &folds {
        let entities: BTreeSet<i64> = partition.timeframes.keys().copied().collect();
        assert_eq!(entities, first);
        assert_eq!(partition.test_entities(&log), first);
    }
}

#[test]
fn test_per_fold_inclusion_is_a_superset() {
    let log = load_sample();
    let strict = train_test_split(&log, 3).unwrap();
    let relaxed = ProportionalSplitter::new(3)
        .unwrap()
        .with_inclusion(InclusionPolicy::PerFold)
        .split_log(&log)
        .unwrap();

    for (s, r) in strict.iter().zip(relaxed.iter()) {
        assert!(s.train_row_ids.is_subset(&r.train_row_ids));
        assert!(s.test_row_ids.is_subset(&r.test_row_ids));
    }
    // user 3: chunks of 3, 3, 1 -> present in folds 0 and 1 only
    assert!(relaxed.folds[0].timeframes.contains_key(&3));
    assert!(relaxed.folds[1].timeframes.contains_key(&3));
    assert!(!relaxed.folds[2].timeframes.contains_key(&3));
    assert!(LeakageVerifier::verify(&relaxed, &log).is_ok());
}

#[test]
fn test_deterministic() {
    let log = load_sample();
    let a = train_test_split(&log, 2).unwrap();
    let b = train_test_split(&log, 2).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_chunk_tail_worked_example() {
    let df = df! {
        "entity_id" => &[7i64, 7, 7, 7],
        "event_timestamp" => &[100i64, 200, 300, 400],
    }
    .unwrap();
    let columns = ColumnsConfig::new("entity_id", "event_timestamp", "event_subtype");

    let folds = ProportionalSplitter::new(2)
        .unwrap()
        .with_test_selection(TestSelection::ChunkTail)
        .with_columns(columns)
        .split(&df)
        .unwrap();

    assert_eq!(rows(&folds.folds[0].train_row_ids), vec![0]);
    assert_eq!(rows(&folds.folds[0].test_row_ids), vec![1]);
    assert_eq!(folds.folds[0].timeframes[&7], Timeframe::new(100, 100));
    assert_eq!(rows(&folds.folds[1].train_row_ids), vec![2]);
    assert_eq!(rows(&folds.folds[1].test_row_ids), vec![3]);
    assert_eq!(folds.folds[1].timeframes[&7], Timeframe::new(300, 300));
}

#[test]
fn test_tied_timestamps_are_reported() {
    let df = df! {
        "user_id" => &[1i64, 1, 1, 1],
        "ts_listen" => &[10i64, 20, 20, 30],
    }
    .unwrap();
    let log = EventLog::from_frame(df, &ColumnsConfig::default()).unwrap();
    let folds = train_test_split(&log, 2).unwrap();

    // fold 0 trains up to ts 20 and tests on the other ts 20 row
    let violations = LeakageVerifier::verify(&folds, &log).unwrap_err();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].fold_index, 0);
    assert_eq!(violations[0].row_id, Some(2));
}

#[test]
fn test_materialized_frames_match_row_ids() {
    let log = load_sample();
    let folds = train_test_split(&log, 3).unwrap();
    let (train, test) = folds.folds[0].materialize(log.frame()).unwrap();

    assert_eq!(train.height(), 5);
    assert_eq!(test.height(), 2);
    let users: Vec<Option<i64>> = test.column("user_id").unwrap().i64().unwrap().into_iter().collect();
    assert_eq!(users, vec![Some(1), Some(2)]);
}
