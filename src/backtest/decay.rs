//! 信號衰減曲線與半衰期

use serde::{Deserialize, Serialize};

use super::metrics::finite_mean;

/// 某一期限的平均 IC
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayPoint {
    pub horizon: usize,
    pub mean_ic: f64,
    /// 參與平均的有效日數
    pub observations: usize,
}

/// 衰減曲線
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecayCurve {
    pub points: Vec<DecayPoint>,
    /// 以交易日計的半衰期
    pub half_life: Option<f64>,
}

impl DecayCurve {
    /// `series` 為 (期限, 逐日 IC)，期限需已排序去重
    pub fn from_series(series: &[(usize, Vec<f64>)]) -> Self {
        let points: Vec<DecayPoint> = series
            .iter()
            .map(|(horizon, ics)| DecayPoint {
                horizon: *horizon,
                mean_ic: finite_mean(ics),
                observations: ics.iter().filter(|v| v.is_finite()).count(),
            })
            .collect();
        let half_life = estimate_half_life(&points);
        Self { points, half_life }
    }
}

/// 對 `ln|IC|` 與期限做最小二乘擬合，半衰期為 `ln 2 / -slope`
///
/// 只使用與首個有效點同號且非零的點；少於兩個點或斜率非負時返回 `None`。
pub fn estimate_half_life(points: &[DecayPoint]) -> Option<f64> {
    let valid: Vec<(f64, f64)> = points
        .iter()
        .filter(|p| p.mean_ic.is_finite() && p.mean_ic != 0.0)
        .map(|p| (p.horizon as f64, p.mean_ic))
        .collect();
    let sign = valid.first()?.1.signum();

    let fit: Vec<(f64, f64)> = valid
        .into_iter()
        .filter(|(_, ic)| ic.signum() == sign)
        .map(|(h, ic)| (h, ic.abs().ln()))
        .collect();
    if fit.len() < 2 {
        return None;
    }

    let n = fit.len() as f64;
    let mean_x = fit.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = fit.iter().map(|(_, y)| y).sum::<f64>() / n;
    let sxx: f64 = fit.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    let sxy: f64 = fit.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    (slope < 0.0).then(|| std::f64::consts::LN_2 / -slope)
}
