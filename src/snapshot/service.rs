use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use uuid::Uuid;

use super::error::{SnapshotResult, SnapshotServiceError};
use super::types::{DatasetVersion, Snapshot};
use crate::data_provider::RawDataProvider;
use crate::domain_types::DatasetKind;

/// 數據版本服務 - 回測引擎依賴的外部協作者
#[cfg_attr(test, mockall::automock)]
pub trait SnapshotService: Send + Sync {
    /// 以當前各數據集的版本建立新快照
    fn create_snapshot(&self) -> SnapshotResult<Snapshot>;

    /// 獲取既有快照，不存在時返回 `None`
    fn get_snapshot(&self, snapshot_id: &str) -> SnapshotResult<Option<Snapshot>>;
}

/// 內存快照服務
///
/// 保存每個數據集的當前版本，建立快照時凍結一份副本。
/// 適用於測試與沒有獨立版本服務的嵌入場景。
pub struct InMemorySnapshotService {
    current: RwLock<BTreeMap<DatasetKind, DatasetVersion>>,
    snapshots: RwLock<HashMap<String, Snapshot>>,
    sequence: AtomicU64,
}

impl InMemorySnapshotService {
    /// 以給定的數據集版本創建服務
    pub fn new(datasets: BTreeMap<DatasetKind, DatasetVersion>) -> Self {
        Self {
            current: RwLock::new(datasets),
            snapshots: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// 以數據提供者中各數據集的最後日期註冊版本
    pub fn for_provider<P: RawDataProvider + ?Sized>(
        provider: &P,
        manifest_version: &str,
    ) -> SnapshotResult<Self> {
        let mut datasets = BTreeMap::new();
        for kind in DatasetKind::ALL {
            if let Some(end) = provider.latest_date(kind)? {
                datasets.insert(
                    kind,
                    DatasetVersion::new(end, format!("{}-{}", kind, manifest_version)),
                );
            }
        }

        if !datasets.contains_key(&DatasetKind::Prices) {
            return Err(SnapshotServiceError::MissingDataset(DatasetKind::Prices));
        }

        Ok(Self::new(datasets))
    }

    /// 更新某個數據集的當前版本，已建立的快照不受影響
    pub fn register_dataset(&self, kind: DatasetKind, version: DatasetVersion) {
        self.current.write().insert(kind, version);
    }

    /// 已建立的快照數量
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.read().len()
    }
}

impl SnapshotService for InMemorySnapshotService {
    fn create_snapshot(&self) -> SnapshotResult<Snapshot> {
        let datasets = self.current.read().clone();
        if datasets.is_empty() {
            return Err(SnapshotServiceError::Unavailable(
                "no datasets registered".to_string(),
            ));
        }

        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Snapshot {
            snapshot_id: Uuid::new_v4().to_string(),
            version_tag: format!("v{}", seq),
            created_at: Utc::now(),
            datasets,
        };

        debug!(
            "建立快照 {} ({})",
            snapshot.snapshot_id, snapshot.version_tag
        );
        self.snapshots
            .write()
            .insert(snapshot.snapshot_id.clone(), snapshot.clone());

        Ok(snapshot)
    }

    fn get_snapshot(&self, snapshot_id: &str) -> SnapshotResult<Option<Snapshot>> {
        Ok(self.snapshots.read().get(snapshot_id).cloned())
    }
}
