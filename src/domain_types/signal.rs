use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::EntityId;

/// Alpha 在某個評估日期產生的原始信號
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub entity_id: EntityId,
    pub raw_value: f64,
}

impl Signal {
    pub fn new(entity_id: impl Into<EntityId>, raw_value: f64) -> Self {
        Self {
            entity_id: entity_id.into(),
            raw_value,
        }
    }
}

/// 從 `date` 起恰好 horizon 個交易日的幾何複利收益
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardReturn {
    pub entity_id: EntityId,
    pub date: NaiveDate,
    #[serde(rename = "return")]
    pub ret: f64,
}

/// 單日信號截面
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySignals {
    pub date: NaiveDate,
    pub signals: BTreeMap<EntityId, f64>,
}

/// 單日信息係數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyIc {
    pub date: NaiveDate,
    pub ic: f64,
    pub rank_ic: f64,
    /// 同時擁有信號與遠期收益的股票佔當日股票池的比例
    pub coverage: f64,
    pub observations: usize,
}

/// 單日組合權重
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWeights {
    pub date: NaiveDate,
    pub weights: BTreeMap<EntityId, f64>,
}

/// 單日組合收益
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReturn {
    pub date: NaiveDate,
    #[serde(rename = "return")]
    pub ret: f64,
    /// 頭部分位減尾部分位的平均遠期收益
    pub long_short_spread: f64,
}
