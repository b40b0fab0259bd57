use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::validation::{ValidationError, ValidationUtils, Validator};

/// 基本面申報滯後天數
pub const FILING_LAG_DAYS: i64 = 90;

/// 中間進度回報的最小間隔（秒）
pub const PROGRESS_INTERVAL_SECS: u64 = 30;

/// 應用程序配置結構
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktesterConfig {
    pub engine: EngineConfig,
    pub log: LogConfig,
}

impl Validator for BacktesterConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        self.engine.validate()?;
        self.log.validate()?;

        Ok(())
    }
}

/// 回測引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 基本面記錄在申報日後多少天才可見
    pub filing_lag_days: i64,
    /// 中間進度回報的節流間隔
    pub progress_interval_secs: u64,
    /// 年化換手率使用的年交易日數
    pub trading_days_per_year: u32,
    /// 未在請求中指定時使用的主要遠期收益期數
    pub default_horizon: usize,
    /// 頭尾分位比例
    pub quantile: f64,
    /// 信號自相關的滯後期
    pub autocorrelation_lags: Vec<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            filing_lag_days: FILING_LAG_DAYS,
            progress_interval_secs: PROGRESS_INTERVAL_SECS,
            trading_days_per_year: 252,
            default_horizon: 1,
            quantile: 0.2,
            autocorrelation_lags: vec![1, 5, 21],
        }
    }
}

impl EngineConfig {
    /// 獲取進度節流間隔
    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs)
    }
}

impl Validator for EngineConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::in_range(self.filing_lag_days, 0, 3650, "engine.filing_lag_days")?;
        ValidationUtils::in_range(self.trading_days_per_year, 1, 366, "engine.trading_days_per_year")?;
        ValidationUtils::in_range(self.default_horizon, 1, 2520, "engine.default_horizon")?;
        ValidationUtils::in_range(self.quantile, 0.01, 0.5, "engine.quantile")?;
        ValidationUtils::all_positive(&self.autocorrelation_lags, "engine.autocorrelation_lags")?;

        Ok(())
    }
}

/// 日誌配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Validator for LogConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::one_of(
            &self.level.to_lowercase(),
            &["trace", "debug", "info", "warn", "error"],
            "log.level",
        )?;

        ValidationUtils::one_of(
            &self.format.to_lowercase(),
            &["pretty", "compact", "full"],
            "log.format",
        )?;

        Ok(())
    }
}
