//! 數據快照模組
//!
//! 快照是一次回測唯一的數據邊界來源：每個數據集的 `date_range_end`
//! 決定了任何時點查詢能看到的最後日期。

pub mod error;
pub mod service;
pub mod types;

pub use error::{SnapshotResult, SnapshotServiceError};
pub use service::{InMemorySnapshotService, SnapshotService};
pub use types::{DatasetVersion, Snapshot};

#[cfg(test)]
pub use service::MockSnapshotService;
