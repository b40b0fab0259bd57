//! 回測結果與匯總統計
//!
//! [`BacktestResult`] 在迭代結束（正常完成或提前終止）後一次性構建，此後不再修改。
//! 結果中帶有快照標識與各數據集版本，以便在同一快照上重現。

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::accumulator::RunAccumulator;
use super::decay::DecayCurve;
use super::metrics::{finite_mean, finite_std, hit_rate, information_ratio, signal_autocorrelation};
use super::turnover::TurnoverSummary;
use crate::config::EngineConfig;
use crate::domain_types::{DailyIc, DailySignals, DailyWeights, PortfolioReturn, WeightMethod};
use crate::snapshot::Snapshot;

/// 迭代的結束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunTermination {
    /// 請求範圍內的所有日期均已處理
    Completed,
    /// 遠期收益數據耗盡，只處理了部分日期
    HaltedEarly,
}

/// 匯總統計；無法定義的值為 NaN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean_ic: f64,
    pub ic_std: f64,
    pub ic_ir: f64,
    pub mean_rank_ic: f64,
    pub rank_ic_ir: f64,
    pub hit_rate: f64,
    pub coverage: f64,
    pub long_short_spread: f64,
    /// 滯後期 -> 信號排名自相關
    pub autocorrelation: BTreeMap<usize, f64>,
}

impl SummaryStats {
    pub fn compute(
        daily_ic: &[DailyIc],
        daily_returns: &[PortfolioReturn],
        daily_signals: &[DailySignals],
        lags: &[usize],
    ) -> Self {
        let ics: Vec<f64> = daily_ic.iter().map(|d| d.ic).collect();
        let rank_ics: Vec<f64> = daily_ic.iter().map(|d| d.rank_ic).collect();
        let coverage: Vec<f64> = daily_ic.iter().map(|d| d.coverage).collect();
        let spreads: Vec<f64> = daily_returns.iter().map(|r| r.long_short_spread).collect();

        Self {
            mean_ic: finite_mean(&ics),
            ic_std: finite_std(&ics),
            ic_ir: information_ratio(&ics),
            mean_rank_ic: finite_mean(&rank_ics),
            rank_ic_ir: information_ratio(&rank_ics),
            hit_rate: hit_rate(&ics),
            coverage: finite_mean(&coverage),
            long_short_spread: finite_mean(&spreads),
            autocorrelation: lags
                .iter()
                .map(|&lag| (lag, signal_autocorrelation(daily_signals, lag)))
                .collect(),
        }
    }
}

/// 回測結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub run_id: Uuid,
    pub alpha_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// 實際處理的第一個與最後一個日期
    pub effective_start: Option<NaiveDate>,
    pub effective_end: Option<NaiveDate>,
    pub snapshot_id: String,
    pub version_tag: String,
    pub dataset_versions: BTreeMap<String, String>,
    pub horizon: usize,
    pub weight_method: WeightMethod,
    pub daily_signals: Vec<DailySignals>,
    pub daily_ic: Vec<DailyIc>,
    pub daily_weights: Vec<DailyWeights>,
    pub daily_portfolio_returns: Vec<PortfolioReturn>,
    pub summary: SummaryStats,
    pub turnover: TurnoverSummary,
    pub decay: Option<DecayCurve>,
    pub termination: RunTermination,
    pub created_at: DateTime<Utc>,
}

impl BacktestResult {
    pub fn dates_evaluated(&self) -> usize {
        self.daily_signals.len()
    }

    pub fn halted_early(&self) -> bool {
        self.termination == RunTermination::HaltedEarly
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// 構建結果所需的運行上下文
#[derive(Debug, Clone)]
pub struct RunContext<'a> {
    pub alpha_name: &'a str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub horizon: usize,
    pub weight_method: WeightMethod,
    pub snapshot: &'a Snapshot,
    pub termination: RunTermination,
}

/// 結果匯總：把累積器折疊成最終結果
pub fn aggregate(acc: RunAccumulator, ctx: RunContext<'_>, config: &EngineConfig) -> BacktestResult {
    let summary = SummaryStats::compute(
        &acc.daily_ic,
        &acc.daily_returns,
        &acc.daily_signals,
        &config.autocorrelation_lags,
    );
    let turnover = TurnoverSummary::from_weights(&acc.daily_weights, config.trading_days_per_year);

    let decay = if acc.decay_ics.is_empty() {
        None
    } else {
        let series: Vec<(usize, Vec<f64>)> = acc.decay_ics.into_iter().collect();
        Some(DecayCurve::from_series(&series))
    };

    BacktestResult {
        run_id: Uuid::new_v4(),
        alpha_name: ctx.alpha_name.to_string(),
        start_date: ctx.start_date,
        end_date: ctx.end_date,
        effective_start: acc.daily_signals.first().map(|d| d.date),
        effective_end: acc.daily_signals.last().map(|d| d.date),
        snapshot_id: ctx.snapshot.snapshot_id.clone(),
        version_tag: ctx.snapshot.version_tag.clone(),
        dataset_versions: ctx.snapshot.dataset_versions(),
        horizon: ctx.horizon,
        weight_method: ctx.weight_method,
        daily_signals: acc.daily_signals,
        daily_ic: acc.daily_ic,
        daily_weights: acc.daily_weights,
        daily_portfolio_returns: acc.daily_returns,
        summary,
        turnover,
        decay,
        termination: ctx.termination,
        created_at: Utc::now(),
    }
}
