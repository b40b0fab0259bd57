//! 截面權重構建與組合收益

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::metrics::ranks;
use crate::domain_types::{EntityId, WeightMethod};

/// 單日截面：同時擁有信號與遠期收益的實體
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossSection {
    pub entities: Vec<EntityId>,
    pub signals: Vec<f64>,
    pub forward: Vec<f64>,
}

impl CrossSection {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn push(&mut self, entity_id: EntityId, signal: f64, forward: f64) {
        self.entities.push(entity_id);
        self.signals.push(signal);
        self.forward.push(forward);
    }

    /// 按信號由高到低排序的索引，並列時按實體代碼
    fn ranked_indices(&self) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..self.len()).collect();
        idx.sort_by(|&a, &b| {
            self.signals[b]
                .partial_cmp(&self.signals[a])
                .unwrap_or(Ordering::Equal)
                .then_with(|| self.entities[a].cmp(&self.entities[b]))
        });
        idx
    }

    /// 頭尾分位各自的股票數
    fn bucket_size(&self, quantile: f64) -> usize {
        let n = ((self.len() as f64) * quantile).floor() as usize;
        n.max(1).min(self.len() / 2)
    }
}

/// 按權重方法構建權重；截面不足兩個實體或信號無分散度時返回空權重
pub fn build_weights(
    section: &CrossSection,
    method: WeightMethod,
    quantile: f64,
) -> BTreeMap<EntityId, f64> {
    if section.len() < 2 {
        return BTreeMap::new();
    }

    match method {
        WeightMethod::EqualWeightQuantile => {
            let order = section.ranked_indices();
            let n = section.bucket_size(quantile);
            let mut weights = BTreeMap::new();
            for &i in &order[..n] {
                weights.insert(section.entities[i].clone(), 1.0 / n as f64);
            }
            for &i in &order[order.len() - n..] {
                weights.insert(section.entities[i].clone(), -1.0 / n as f64);
            }
            weights
        }
        WeightMethod::SignalWeighted => demeaned_weights(section, &section.signals),
        WeightMethod::RankWeighted => demeaned_weights(section, &ranks(&section.signals)),
    }
}

/// 去均值並縮放至總曝險為 1
fn demeaned_weights(section: &CrossSection, scores: &[f64]) -> BTreeMap<EntityId, f64> {
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    let centered: Vec<f64> = scores.iter().map(|s| s - mean).collect();
    let gross: f64 = centered.iter().map(|c| c.abs()).sum();
    if !(gross > 0.0) {
        return BTreeMap::new();
    }

    section
        .entities
        .iter()
        .zip(centered)
        .map(|(entity, c)| (entity.clone(), c / gross))
        .collect()
}

/// 組合收益：Σ w_i r_i
pub fn portfolio_return(section: &CrossSection, weights: &BTreeMap<EntityId, f64>) -> f64 {
    section
        .entities
        .iter()
        .zip(&section.forward)
        .filter_map(|(entity, r)| weights.get(entity).map(|w| w * r))
        .sum()
}

/// 頭部分位平均遠期收益減尾部分位平均遠期收益
pub fn long_short_spread(section: &CrossSection, quantile: f64) -> f64 {
    if section.len() < 2 {
        return f64::NAN;
    }

    let order = section.ranked_indices();
    let n = section.bucket_size(quantile);
    let mean_of = |idx: &[usize]| idx.iter().map(|&i| section.forward[i]).sum::<f64>() / n as f64;

    mean_of(&order[..n]) - mean_of(&order[order.len() - n..])
}
