//! 數據訪問錯誤定義

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain_types::DatasetKind;

/// 時間邊界違規
///
/// 在數據訪問層發生，對觸發它的操作總是致命的。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PitViolationError {
    #[error("No snapshot locked")]
    NoSnapshotLocked,

    #[error("snapshot {0} not found")]
    SnapshotNotFound(String),

    #[error("{dataset} snapshot ends before requested date: date_range_end {date_range_end} < {requested}")]
    BeyondSnapshot {
        dataset: DatasetKind,
        requested: NaiveDate,
        date_range_end: NaiveDate,
    },

    #[error("dataset {0} is not part of the locked snapshot")]
    DatasetNotInSnapshot(DatasetKind),
}

/// 原始數據加載錯誤
#[derive(Error, Debug)]
pub enum DataProviderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("invalid value in column {column}: {value} ({reason})")]
    InvalidValue {
        column: String,
        value: String,
        reason: String,
    },
}

/// 數據加載結果類型
pub type DataProviderResult<T> = Result<T, DataProviderError>;
