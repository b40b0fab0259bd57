//! 固定期數遠期收益
//!
//! 從 `as_of` 之後的交易日開始，恰好取 `horizon` 個交易日的日收益做幾何複利：
//! `Π(1 + r_i) - 1`。任一日缺失觀測的實體被排除；整個數據集不足
//! `horizon` 個後續交易日時返回 [`ForwardReturnError::MissingForwardReturn`]。

use chrono::NaiveDate;
use thiserror::Error;

use crate::data_provider::{PitViolationError, PriceTable};
use crate::domain_types::ForwardReturn;

/// 遠期收益計算錯誤
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForwardReturnError {
    #[error("missing forward returns: {as_of} needs {horizon} trading days ahead, only {available} available")]
    MissingForwardReturn {
        as_of: NaiveDate,
        horizon: usize,
        available: usize,
    },

    #[error("horizon must be at least one trading day")]
    InvalidHorizon,

    #[error(transparent)]
    Pit(#[from] PitViolationError),
}

impl ForwardReturnError {
    /// 是否為數據耗盡
    pub fn is_exhausted(&self) -> bool {
        matches!(self, ForwardReturnError::MissingForwardReturn { .. })
    }
}

/// 計算 `as_of` 的 `horizon` 期遠期收益，按實體排序
pub fn forward_returns(
    table: &PriceTable,
    as_of: NaiveDate,
    horizon: usize,
) -> Result<Vec<ForwardReturn>, ForwardReturnError> {
    if horizon == 0 {
        return Err(ForwardReturnError::InvalidHorizon);
    }

    let following = table.dates_after(as_of);
    if following.len() < horizon {
        return Err(ForwardReturnError::MissingForwardReturn {
            as_of,
            horizon,
            available: following.len(),
        });
    }
    let window = &following[..horizon];

    let results = table
        .entity_returns()
        .filter(|(_, series)| series.contains_key(&as_of))
        .filter_map(|(entity_id, series)| {
            let growth = window.iter().try_fold(1.0_f64, |acc, date| {
                series.get(date).map(|r| acc * (1.0 + r))
            })?;
            Some(ForwardReturn {
                entity_id: entity_id.clone(),
                date: as_of,
                ret: growth - 1.0,
            })
        })
        .collect();

    Ok(results)
}
