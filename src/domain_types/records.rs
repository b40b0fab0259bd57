use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::types::EntityId;

/// 日頻價格記錄，每個實體每個交易日一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub entity_id: EntityId,
    pub date: NaiveDate,
    /// 當日收益率
    #[serde(rename = "return")]
    pub ret: f64,
    pub price: f64,
    pub shares_outstanding: f64,
}

impl PriceRecord {
    pub fn new(
        entity_id: impl Into<EntityId>,
        date: NaiveDate,
        ret: f64,
        price: f64,
        shares_outstanding: f64,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            date,
            ret,
            price,
            shares_outstanding,
        }
    }

    /// 市值
    pub fn market_cap(&self) -> f64 {
        self.price * self.shares_outstanding
    }

    /// 按 (entity_id, date) 排序
    pub fn cmp_key(&self, other: &Self) -> Ordering {
        self.entity_id
            .cmp(&other.entity_id)
            .then_with(|| self.date.cmp(&other.date))
    }
}

/// 基本面記錄，`filing_date` 為名義申報日期
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalRecord {
    pub entity_id: EntityId,
    pub filing_date: NaiveDate,
    pub metrics: BTreeMap<String, f64>,
}

impl FundamentalRecord {
    pub fn new(entity_id: impl Into<EntityId>, filing_date: NaiveDate) -> Self {
        Self {
            entity_id: entity_id.into(),
            filing_date,
            metrics: BTreeMap::new(),
        }
    }

    /// 添加指標值，可鏈式調用
    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        self.metrics.insert(name.to_string(), value);
        self
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    /// 按 (entity_id, filing_date) 排序
    pub fn cmp_key(&self, other: &Self) -> Ordering {
        self.entity_id
            .cmp(&other.entity_id)
            .then_with(|| self.filing_date.cmp(&other.filing_date))
    }
}
