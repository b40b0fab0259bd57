//! 基本回測類型定義

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 實體識別碼（股票代碼、資產 ID 等）
pub type EntityId = String;

/// 快照中的邏輯數據集
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Prices,
    Fundamentals,
}

impl DatasetKind {
    /// 所有數據集
    pub const ALL: [DatasetKind; 2] = [DatasetKind::Prices, DatasetKind::Fundamentals];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Prices => "prices",
            DatasetKind::Fundamentals => "fundamentals",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 投資組合權重方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightMethod {
    /// 頭尾分位等權多空
    EqualWeightQuantile,
    /// 去均值後按信號大小加權
    SignalWeighted,
    /// 去均值後按排名加權
    RankWeighted,
}

impl Default for WeightMethod {
    fn default() -> Self {
        WeightMethod::EqualWeightQuantile
    }
}

impl WeightMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightMethod::EqualWeightQuantile => "equal_weight_quantile",
            WeightMethod::SignalWeighted => "signal_weighted",
            WeightMethod::RankWeighted => "rank_weighted",
        }
    }
}

impl fmt::Display for WeightMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 解析權重方法失敗
#[derive(Debug, Error, PartialEq, Eq)]
#[error("未知的權重方法: {0}")]
pub struct ParseWeightMethodError(pub String);

impl FromStr for WeightMethod {
    type Err = ParseWeightMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "equal_weight_quantile" | "equal" | "quantile" => Ok(WeightMethod::EqualWeightQuantile),
            "signal_weighted" | "signal" => Ok(WeightMethod::SignalWeighted),
            "rank_weighted" | "rank" => Ok(WeightMethod::RankWeighted),
            other => Err(ParseWeightMethodError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_method_parse_and_display() {
        assert_eq!("rank".parse::<WeightMethod>(), Ok(WeightMethod::RankWeighted));
        assert_eq!(
            "Signal_Weighted".parse::<WeightMethod>(),
            Ok(WeightMethod::SignalWeighted)
        );
        assert_eq!(
            WeightMethod::EqualWeightQuantile.to_string(),
            "equal_weight_quantile"
        );
        assert!("momentum".parse::<WeightMethod>().is_err());
    }

    #[test]
    fn test_dataset_kind_display() {
        assert_eq!(DatasetKind::Prices.to_string(), "prices");
        assert_eq!(DatasetKind::Fundamentals.to_string(), "fundamentals");
        assert!(DatasetKind::Prices < DatasetKind::Fundamentals);
    }
}
