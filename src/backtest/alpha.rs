//! 可插拔的 alpha 信號計算
//!
//! 引擎只通過 [`AlphaStrategy`] 調用策略，傳入的價格與基本面均已經過時點過濾。

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain_types::{EntityId, FundamentalRecord, PriceRecord, Signal};

/// alpha 計算錯誤
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlphaError {
    #[error("invalid alpha parameter: {0}")]
    InvalidParameter(String),

    #[error("alpha computation failed: {0}")]
    Computation(String),
}

/// alpha 策略
pub trait AlphaStrategy {
    /// 策略名稱，寫入結果以標識 alpha
    fn name(&self) -> &str;

    /// 根據時點數據計算 `as_of` 的原始信號
    fn compute_raw(
        &self,
        prices: &[PriceRecord],
        fundamentals: &[FundamentalRecord],
        as_of: NaiveDate,
    ) -> Result<Vec<Signal>, AlphaError>;
}

/// 動量：過去 `lookback` 個觀測的複利收益
#[derive(Debug, Clone)]
pub struct MomentumAlpha {
    lookback: usize,
    name: String,
}

impl MomentumAlpha {
    pub fn new(lookback: usize) -> Self {
        Self {
            lookback,
            name: format!("momentum_{}", lookback),
        }
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }
}

impl AlphaStrategy for MomentumAlpha {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute_raw(
        &self,
        prices: &[PriceRecord],
        _fundamentals: &[FundamentalRecord],
        as_of: NaiveDate,
    ) -> Result<Vec<Signal>, AlphaError> {
        if self.lookback == 0 {
            return Err(AlphaError::InvalidParameter(
                "momentum lookback must be positive".to_string(),
            ));
        }

        let mut by_entity: BTreeMap<&str, Vec<&PriceRecord>> = BTreeMap::new();
        for record in prices.iter().filter(|r| r.date <= as_of) {
            by_entity
                .entry(record.entity_id.as_str())
                .or_default()
                .push(record);
        }

        let signals = by_entity
            .into_iter()
            .filter(|(_, rows)| rows.last().map_or(false, |r| r.date == as_of))
            .filter(|(_, rows)| rows.len() >= self.lookback)
            .filter_map(|(entity, rows)| {
                let window = &rows[rows.len() - self.lookback..];
                let growth = window.iter().map(|r| 1.0 + r.ret).product::<f64>();
                let value = growth - 1.0;
                value.is_finite().then(|| Signal::new(entity, value))
            })
            .collect();

        Ok(signals)
    }
}

/// 基本面比率：最新可見指標除以市值
#[derive(Debug, Clone)]
pub struct FundamentalRatioAlpha {
    metric: String,
    name: String,
}

impl FundamentalRatioAlpha {
    pub fn new(metric: impl Into<String>) -> Self {
        let metric = metric.into();
        Self {
            name: format!("{}_to_market_cap", metric),
            metric,
        }
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }
}

impl AlphaStrategy for FundamentalRatioAlpha {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute_raw(
        &self,
        prices: &[PriceRecord],
        fundamentals: &[FundamentalRecord],
        as_of: NaiveDate,
    ) -> Result<Vec<Signal>, AlphaError> {
        if self.metric.is_empty() {
            return Err(AlphaError::InvalidParameter(
                "fundamental metric name is empty".to_string(),
            ));
        }

        // 每個實體當日市值
        let market_caps: BTreeMap<&EntityId, f64> = prices
            .iter()
            .filter(|r| r.date == as_of)
            .map(|r| (&r.entity_id, r.market_cap()))
            .filter(|(_, cap)| cap.is_finite() && *cap > 0.0)
            .collect();

        // 每個實體最新一次申報的指標
        let mut latest: BTreeMap<&EntityId, (NaiveDate, f64)> = BTreeMap::new();
        for record in fundamentals {
            let Some(value) = record.metric(&self.metric) else {
                continue;
            };
            let slot = latest
                .entry(&record.entity_id)
                .or_insert((record.filing_date, value));
            if record.filing_date >= slot.0 {
                *slot = (record.filing_date, value);
            }
        }

        let signals = latest
            .into_iter()
            .filter_map(|(entity, (_, value))| {
                let cap = market_caps.get(entity)?;
                let ratio = value / cap;
                ratio.is_finite().then(|| Signal::new(entity.clone(), ratio))
            })
            .collect();

        Ok(signals)
    }
}
