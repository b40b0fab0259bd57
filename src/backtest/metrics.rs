//! 截面統計：信息係數、排名信息係數、命中率與信號自相關
//!
//! 無法定義的統計量（樣本不足、零方差）以 `NaN` 表示，彙總時只使用有限值。

use statrs::statistics::{Data, OrderStatistics, RankTieBreaker, Statistics};

use crate::domain_types::DailySignals;

/// 計算 IC 所需的最少截面樣本數
pub const MIN_CROSS_SECTION: usize = 3;

/// 皮爾遜相關係數
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }

    let sx = x.std_dev();
    let sy = y.std_dev();
    if !(sx > 0.0 && sy > 0.0) {
        return f64::NAN;
    }

    x.covariance(y) / (sx * sy)
}

/// 平均排名（並列取平均），從 1 開始
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let mut data = Data::new(values.to_vec());
    data.ranks(RankTieBreaker::Average)
}

/// 斯皮爾曼排名相關係數
pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    pearson(&ranks(x), &ranks(y))
}

/// 截面信息係數 (IC, rank IC)；樣本不足時為 NaN
pub fn information_coefficient(signal: &[f64], forward: &[f64]) -> (f64, f64) {
    if signal.len() < MIN_CROSS_SECTION {
        return (f64::NAN, f64::NAN);
    }
    (pearson(signal, forward), spearman(signal, forward))
}

/// 有限值的平均
pub fn finite_mean(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    finite.mean()
}

/// 有限值的樣本標準差
pub fn finite_std(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    finite.std_dev()
}

/// 信息比率：平均值 / 標準差
pub fn information_ratio(values: &[f64]) -> f64 {
    let std = finite_std(values);
    if !(std > 0.0) {
        return f64::NAN;
    }
    finite_mean(values) / std
}

/// 命中率：IC 為正的日期比例
pub fn hit_rate(ics: &[f64]) -> f64 {
    let finite: Vec<f64> = ics.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    finite.iter().filter(|&&ic| ic > 0.0).count() as f64 / finite.len() as f64
}

/// 信號在 `lag` 期的截面排名自相關，對所有可用日期取平均
pub fn signal_autocorrelation(daily_signals: &[DailySignals], lag: usize) -> f64 {
    if lag == 0 || daily_signals.len() <= lag {
        return f64::NAN;
    }

    let correlations: Vec<f64> = daily_signals
        .windows(lag + 1)
        .map(|window| {
            let (earlier, later) = (&window[0].signals, &window[lag].signals);
            let (prev, curr): (Vec<f64>, Vec<f64>) = later
                .iter()
                .filter_map(|(entity, value)| earlier.get(entity).map(|p| (*p, *value)))
                .unzip();
            if prev.len() < MIN_CROSS_SECTION {
                f64::NAN
            } else {
                spearman(&prev, &curr)
            }
        })
        .collect();

    finite_mean(&correlations)
}
