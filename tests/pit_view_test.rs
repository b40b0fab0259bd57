mod common;

use assert_matches::assert_matches;
use chrono::Duration;
use proptest::prelude::*;

use common::{day, full_engine, price_engine};
use pit_backtest::backtest::BacktestError;
use pit_backtest::config::EngineConfig;
use pit_backtest::data_provider::PitViolationError;
use pit_backtest::domain_types::DatasetKind;

#[test]
fn test_accessors_before_lock_mention_no_snapshot() {
    let engine = full_engine(30, EngineConfig::default());

    let err = engine.prices_as_of(day(5)).unwrap_err();
    assert_eq!(err, PitViolationError::NoSnapshotLocked);
    assert!(err.to_string().contains("No snapshot locked"));

    let err = engine.fundamentals_as_of(day(5)).unwrap_err();
    assert!(err.to_string().contains("No snapshot locked"));
}

#[test]
fn test_beyond_snapshot_end_is_violation() {
    let mut engine = full_engine(30, EngineConfig::default());
    engine.lock(None).unwrap();

    for offset in [1, 2, 100] {
        let as_of = day(29) + Duration::days(offset);
        assert_matches!(
            engine.prices_as_of(as_of),
            Err(PitViolationError::BeyondSnapshot { dataset: DatasetKind::Prices, .. })
        );
        assert_matches!(
            engine.fundamentals_as_of(as_of),
            Err(PitViolationError::BeyondSnapshot { dataset: DatasetKind::Fundamentals, .. })
        );
    }

    let err = engine.prices_as_of(day(31)).unwrap_err();
    assert!(err.to_string().contains("snapshot ends before requested date"));
}

#[test]
fn test_unknown_snapshot_id_fails_lock() {
    let mut engine = price_engine(10, EngineConfig::default());
    assert_matches!(
        engine.lock(Some("does-not-exist")),
        Err(BacktestError::Pit(PitViolationError::SnapshotNotFound(_)))
    );
    assert!(!engine.is_locked());
}

#[test]
fn test_relock_existing_snapshot() {
    let mut engine = price_engine(10, EngineConfig::default());
    let first = engine.lock(None).unwrap();
    engine.release();
    engine.release();
    assert!(!engine.is_locked());

    let again = engine.lock(Some(&first.snapshot_id)).unwrap();
    assert_eq!(again, first);
    assert_eq!(engine.prices_as_of(day(9)).unwrap().len(), 60);
}

#[test]
fn test_missing_fundamentals_dataset() {
    let mut engine = price_engine(10, EngineConfig::default());
    engine.lock(None).unwrap();
    assert_eq!(
        engine.fundamentals_as_of(day(5)),
        Err(PitViolationError::DatasetNotInSnapshot(DatasetKind::Fundamentals))
    );
}

proptest! {
    #[test]
    fn prop_prices_never_include_future_rows(offset in 0i64..120) {
        let mut engine = full_engine(120, EngineConfig::default());
        engine.lock(None).unwrap();
        let as_of = day(offset);

        let rows = engine.prices_as_of(as_of).unwrap();
        prop_assert!(!rows.is_empty());
        prop_assert!(rows.iter().map(|r| r.date).max().unwrap() <= as_of);
        prop_assert_eq!(rows.len() as i64, (offset + 1) * 6);
    }

    #[test]
    fn prop_fundamentals_respect_filing_lag(offset in 0i64..120) {
        let mut engine = full_engine(120, EngineConfig::default());
        engine.lock(None).unwrap();
        let as_of = day(offset);

        let rows = engine.fundamentals_as_of(as_of).unwrap();
        for row in &rows {
            prop_assert!(row.filing_date + Duration::days(90) <= as_of);
        }
        prop_assert_eq!(rows.is_empty(), offset < 90);
    }

    #[test]
    fn prop_beyond_end_always_fails(extra in 1i64..1000) {
        let mut engine = full_engine(40, EngineConfig::default());
        engine.lock(None).unwrap();
        let as_of = day(39) + Duration::days(extra);

        prop_assert!(engine.prices_as_of(as_of).is_err());
        prop_assert!(engine.fundamentals_as_of(as_of).is_err());
    }
}
