use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data_provider::error::PitViolationError;
use crate::domain_types::DatasetKind;

/// 單一數據集在快照中的版本信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetVersion {
    /// 此快照中該數據集可見的最後日期
    pub date_range_end: NaiveDate,
    /// 同步清單版本
    pub sync_manifest_version: String,
}

impl DatasetVersion {
    pub fn new(date_range_end: NaiveDate, sync_manifest_version: impl Into<String>) -> Self {
        Self {
            date_range_end,
            sync_manifest_version: sync_manifest_version.into(),
        }
    }
}

/// 不可變的數據版本引用，界定一次回測可訪問的數據範圍
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub snapshot_id: String,
    pub version_tag: String,
    pub created_at: DateTime<Utc>,
    pub datasets: BTreeMap<DatasetKind, DatasetVersion>,
}

impl Snapshot {
    /// 獲取數據集版本，不存在時視為時間邊界違規
    pub fn dataset(&self, kind: DatasetKind) -> Result<&DatasetVersion, PitViolationError> {
        self.datasets
            .get(&kind)
            .ok_or(PitViolationError::DatasetNotInSnapshot(kind))
    }

    pub fn has_dataset(&self, kind: DatasetKind) -> bool {
        self.datasets.contains_key(&kind)
    }

    /// 數據集的可見截止日期
    pub fn date_range_end(&self, kind: DatasetKind) -> Result<NaiveDate, PitViolationError> {
        self.dataset(kind).map(|v| v.date_range_end)
    }

    /// 每個數據集的版本標識，用於結果重現
    pub fn dataset_versions(&self) -> BTreeMap<String, String> {
        self.datasets
            .iter()
            .map(|(kind, v)| (kind.to_string(), v.sync_manifest_version.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_dataset_lookup() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 29).unwrap();
        let mut datasets = BTreeMap::new();
        datasets.insert(DatasetKind::Prices, DatasetVersion::new(end, "prices-v7"));
        let snapshot = Snapshot {
            snapshot_id: "snap-1".to_string(),
            version_tag: "v1".to_string(),
            created_at: Utc::now(),
            datasets,
        };

        assert_eq!(snapshot.date_range_end(DatasetKind::Prices).unwrap(), end);
        assert!(!snapshot.has_dataset(DatasetKind::Fundamentals));
        assert_eq!(
            snapshot.dataset(DatasetKind::Fundamentals),
            Err(PitViolationError::DatasetNotInSnapshot(DatasetKind::Fundamentals))
        );
        assert_eq!(
            snapshot.dataset_versions().get("prices").map(String::as_str),
            Some("prices-v7")
        );
    }
}
