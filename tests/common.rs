#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

use pit_backtest::backtest::{AlphaError, AlphaStrategy, PitBacktester};
use pit_backtest::config::EngineConfig;
use pit_backtest::data_provider::InMemoryDataProvider;
use pit_backtest::domain_types::{DatasetKind, FundamentalRecord, PriceRecord, Signal};
use pit_backtest::snapshot::{DatasetVersion, InMemorySnapshotService};

pub const ENTITIES: [&str; 6] = ["AAA", "BBB", "CCC", "DDD", "EEE", "FFF"];

pub type TestEngine = PitBacktester<InMemorySnapshotService, InMemoryDataProvider>;

/// 第 `i` 個交易日（從 2024-01-01 起連續日曆日）
pub fn day(i: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i)
}

/// 確定性的價格面板：每個實體每天一筆，收益隨實體與日期變化
pub fn price_panel(days: i64) -> Vec<PriceRecord> {
    let mut rows = Vec::new();
    for i in 0..days {
        for (k, entity) in ENTITIES.iter().enumerate() {
            let k = k as f64;
            let ret = 0.002 * (k - 2.5) + 0.001 * ((i as f64) * (k + 1.0)).sin();
            rows.push(PriceRecord::new(*entity, day(i), ret, 10.0 + k, 1_000.0 * (k + 1.0)));
        }
    }
    rows
}

/// 每個實體每 30 天申報一次
pub fn fundamental_panel(days: i64) -> Vec<FundamentalRecord> {
    let mut rows = Vec::new();
    for i in (0..days).step_by(30) {
        for (k, entity) in ENTITIES.iter().enumerate() {
            rows.push(
                FundamentalRecord::new(*entity, day(i))
                    .with_metric("book_value", 5_000.0 * (k as f64 + 1.0) + i as f64),
            );
        }
    }
    rows
}

pub fn snapshot_service(price_end: NaiveDate, fundamentals_end: Option<NaiveDate>) -> InMemorySnapshotService {
    let mut datasets = BTreeMap::new();
    datasets.insert(
        DatasetKind::Prices,
        DatasetVersion::new(price_end, "prices-m1"),
    );
    if let Some(end) = fundamentals_end {
        datasets.insert(
            DatasetKind::Fundamentals,
            DatasetVersion::new(end, "fundamentals-m1"),
        );
    }
    InMemorySnapshotService::new(datasets)
}

/// 只有價格數據的引擎
pub fn price_engine(days: i64, config: EngineConfig) -> TestEngine {
    let provider = InMemoryDataProvider::with_prices(price_panel(days));
    PitBacktester::new(snapshot_service(day(days - 1), None), provider, config).unwrap()
}

/// 同時帶有價格與基本面的引擎
pub fn full_engine(days: i64, config: EngineConfig) -> TestEngine {
    let provider = InMemoryDataProvider::new(price_panel(days), fundamental_panel(days));
    PitBacktester::new(
        snapshot_service(day(days - 1), Some(day(days - 1))),
        provider,
        config,
    )
    .unwrap()
}

/// 以當日收益為信號的簡單 alpha
pub struct LastReturnAlpha;

impl AlphaStrategy for LastReturnAlpha {
    fn name(&self) -> &str {
        "last_return"
    }

    fn compute_raw(
        &self,
        prices: &[PriceRecord],
        _fundamentals: &[FundamentalRecord],
        as_of: NaiveDate,
    ) -> Result<Vec<Signal>, AlphaError> {
        Ok(prices
            .iter()
            .filter(|r| r.date == as_of)
            .map(|r| Signal::new(r.entity_id.clone(), r.ret))
            .collect())
    }
}

/// 記錄看到的最大日期，用於檢查沒有未來數據洩漏
pub struct LeakProbeAlpha {
    pub violations: std::cell::RefCell<Vec<NaiveDate>>,
}

impl LeakProbeAlpha {
    pub fn new() -> Self {
        Self {
            violations: std::cell::RefCell::new(Vec::new()),
        }
    }
}

impl AlphaStrategy for LeakProbeAlpha {
    fn name(&self) -> &str {
        "leak_probe"
    }

    fn compute_raw(
        &self,
        prices: &[PriceRecord],
        fundamentals: &[FundamentalRecord],
        as_of: NaiveDate,
    ) -> Result<Vec<Signal>, AlphaError> {
        let price_leak = prices.iter().any(|r| r.date > as_of);
        let filing_leak = fundamentals
            .iter()
            .any(|r| r.filing_date + Duration::days(90) > as_of);
        if price_leak || filing_leak {
            self.violations.borrow_mut().push(as_of);
        }
        LastReturnAlpha.compute_raw(prices, fundamentals, as_of)
    }
}

/// 在指定日期失敗的 alpha
pub struct FailingAlpha {
    pub fail_on: NaiveDate,
}

impl AlphaStrategy for FailingAlpha {
    fn name(&self) -> &str {
        "failing"
    }

    fn compute_raw(
        &self,
        prices: &[PriceRecord],
        fundamentals: &[FundamentalRecord],
        as_of: NaiveDate,
    ) -> Result<Vec<Signal>, AlphaError> {
        if as_of == self.fail_on {
            return Err(AlphaError::Computation(format!("boom at {}", as_of)));
        }
        LastReturnAlpha.compute_raw(prices, fundamentals, as_of)
    }
}
