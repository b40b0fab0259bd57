//! 逐日累積器
//!
//! 每個日期的信號與遠期收益截面在這裡折疊成 IC、權重與組合收益序列，
//! 迭代結束後交給結果匯總。

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::metrics::{information_coefficient, pearson, MIN_CROSS_SECTION};
use super::portfolio::{build_weights, long_short_spread, portfolio_return, CrossSection};
use crate::domain_types::{
    DailyIc, DailySignals, DailyWeights, EntityId, ForwardReturn, PortfolioReturn, Signal,
    WeightMethod,
};

/// 運行期間的累積狀態
#[derive(Debug, Clone)]
pub struct RunAccumulator {
    weight_method: WeightMethod,
    quantile: f64,
    pub(crate) daily_signals: Vec<DailySignals>,
    pub(crate) daily_ic: Vec<DailyIc>,
    pub(crate) daily_weights: Vec<DailyWeights>,
    pub(crate) daily_returns: Vec<PortfolioReturn>,
    pub(crate) decay_ics: BTreeMap<usize, Vec<f64>>,
}

impl RunAccumulator {
    pub fn new(weight_method: WeightMethod, quantile: f64, decay_horizons: &[usize]) -> Self {
        Self {
            weight_method,
            quantile,
            daily_signals: Vec::new(),
            daily_ic: Vec::new(),
            daily_weights: Vec::new(),
            daily_returns: Vec::new(),
            decay_ics: decay_horizons.iter().map(|h| (*h, Vec::new())).collect(),
        }
    }

    /// 已折疊的日期數
    pub fn dates(&self) -> usize {
        self.daily_signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.daily_signals.is_empty()
    }

    /// 折疊一個日期
    ///
    /// `universe` 為當日有收益觀測的實體數；`decay` 為各衰減期限的遠期收益。
    pub fn fold_date(
        &mut self,
        date: NaiveDate,
        signals: &[Signal],
        forward: &[ForwardReturn],
        universe: usize,
        decay: &[(usize, Vec<ForwardReturn>)],
    ) {
        let signal_map: BTreeMap<EntityId, f64> = signals
            .iter()
            .filter(|s| s.raw_value.is_finite())
            .map(|s| (s.entity_id.clone(), s.raw_value))
            .collect();

        let section = match_cross_section(&signal_map, forward);
        let (ic, rank_ic) = information_coefficient(&section.signals, &section.forward);
        let coverage = if universe == 0 {
            f64::NAN
        } else {
            section.len() as f64 / universe as f64
        };

        let weights = build_weights(&section, self.weight_method, self.quantile);
        let ret = portfolio_return(&section, &weights);
        let spread = long_short_spread(&section, self.quantile);

        for (horizon, returns) in decay {
            if let Some(series) = self.decay_ics.get_mut(horizon) {
                let decay_section = match_cross_section(&signal_map, returns);
                let value = if decay_section.len() < MIN_CROSS_SECTION {
                    f64::NAN
                } else {
                    pearson(&decay_section.signals, &decay_section.forward)
                };
                series.push(value);
            }
        }

        self.daily_ic.push(DailyIc {
            date,
            ic,
            rank_ic,
            coverage,
            observations: section.len(),
        });
        self.daily_weights.push(DailyWeights { date, weights });
        self.daily_returns.push(PortfolioReturn {
            date,
            ret,
            long_short_spread: spread,
        });
        self.daily_signals.push(DailySignals {
            date,
            signals: signal_map,
        });
    }
}

/// 取同時擁有信號與遠期收益的實體，按實體代碼排序
fn match_cross_section(signals: &BTreeMap<EntityId, f64>, forward: &[ForwardReturn]) -> CrossSection {
    let mut matched: Vec<&ForwardReturn> = forward
        .iter()
        .filter(|f| f.ret.is_finite() && signals.contains_key(&f.entity_id))
        .collect();
    matched.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));

    let mut section = CrossSection::default();
    for f in matched {
        if let Some(signal) = signals.get(&f.entity_id) {
            section.push(f.entity_id.clone(), *signal, f.ret);
        }
    }
    section
}
