use thiserror::Error;

use super::alpha::AlphaError;
use super::cancel::JobCancelled;
use super::forward_return::ForwardReturnError;
use crate::config::ValidationError;
use crate::data_provider::{DataProviderError, PitViolationError};
use crate::snapshot::SnapshotServiceError;

/// 回測錯誤
///
/// 調用方據此區分三種情況：數據耗盡時返回結果而非錯誤；被取消時返回
/// [`BacktestError::Cancelled`] 且狀態已釋放；無法啟動時立即返回錯誤且不持有資源。
#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("PIT violation: {0}")]
    Pit(#[from] PitViolationError),

    #[error(transparent)]
    ForwardReturn(#[from] ForwardReturnError),

    #[error(transparent)]
    Cancelled(#[from] JobCancelled),

    #[error("alpha error: {0}")]
    Alpha(#[from] AlphaError),

    #[error("snapshot service error: {0}")]
    Snapshot(#[from] SnapshotServiceError),

    #[error("data provider error: {0}")]
    DataProvider(#[from] DataProviderError),

    #[error("invalid backtest request: {0}")]
    InvalidRequest(String),

    #[error("invalid engine config: {0}")]
    Config(#[from] ValidationError),
}

impl BacktestError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BacktestError::Cancelled(_))
    }

    /// 時點違規，包括遠期收益計算中遇到的
    pub fn pit_violation(&self) -> Option<&PitViolationError> {
        match self {
            BacktestError::Pit(err) => Some(err),
            BacktestError::ForwardReturn(ForwardReturnError::Pit(err)) => Some(err),
            _ => None,
        }
    }
}
