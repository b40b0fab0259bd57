//! 換手率

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain_types::DailyWeights;

/// 單次調倉的換手率
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnoverPoint {
    pub date: NaiveDate,
    pub turnover: f64,
}

/// 換手率匯總
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnoverSummary {
    pub daily: Vec<TurnoverPoint>,
    pub average_turnover: f64,
    pub annualized_turnover: f64,
    pub max_turnover: f64,
}

impl TurnoverSummary {
    /// 由逐日權重計算；第一天沒有前一期權重，不計入
    ///
    /// 單次換手為 `Σ|w_t - w_{t-1}| / 2`，一側缺失的實體權重視為 0。
    pub fn from_weights(weights: &[DailyWeights], trading_days_per_year: u32) -> Self {
        let daily: Vec<TurnoverPoint> = weights
            .windows(2)
            .map(|pair| TurnoverPoint {
                date: pair[1].date,
                turnover: rebalance_turnover(&pair[0], &pair[1]),
            })
            .collect();

        if daily.is_empty() {
            return Self::default();
        }

        let average_turnover =
            daily.iter().map(|p| p.turnover).sum::<f64>() / daily.len() as f64;
        let max_turnover = daily.iter().map(|p| p.turnover).fold(0.0, f64::max);

        Self {
            annualized_turnover: average_turnover * trading_days_per_year as f64,
            average_turnover,
            max_turnover,
            daily,
        }
    }
}

fn rebalance_turnover(prev: &DailyWeights, curr: &DailyWeights) -> f64 {
    let entities: BTreeSet<&String> = prev.weights.keys().chain(curr.weights.keys()).collect();
    entities
        .into_iter()
        .map(|e| {
            let before = prev.weights.get(e).copied().unwrap_or(0.0);
            let after = curr.weights.get(e).copied().unwrap_or(0.0);
            (after - before).abs()
        })
        .sum::<f64>()
        / 2.0
}
