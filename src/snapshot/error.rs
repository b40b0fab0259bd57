use thiserror::Error;

use crate::data_provider::DataProviderError;
use crate::domain_types::DatasetKind;

/// 快照服務錯誤類型
#[derive(Error, Debug)]
pub enum SnapshotServiceError {
    /// 快照服務不可用
    #[error("snapshot service unavailable: {0}")]
    Unavailable(String),

    /// 沒有已註冊的數據集版本
    #[error("no version registered for dataset {0}")]
    MissingDataset(DatasetKind),

    /// 讀取數據範圍失敗
    #[error("failed to inspect dataset range: {0}")]
    Provider(#[from] DataProviderError),
}

/// 快照服務結果類型別名
pub type SnapshotResult<T> = Result<T, SnapshotServiceError>;
