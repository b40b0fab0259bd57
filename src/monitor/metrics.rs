use metrics::{counter, histogram};
use std::time::Duration;

/// 監控指標命名空間
pub const METRIC_NAMESPACE: &str = "pit_backtest";

/// 回測結束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    HaltedEarly,
    Cancelled,
    Failed,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Completed => "completed",
            RunOutcome::HaltedEarly => "halted_early",
            RunOutcome::Cancelled => "cancelled",
            RunOutcome::Failed => "failed",
        }
    }
}

/// 回測監控指標記錄器
///
/// 未安裝 `metrics` 記錄器時所有調用都是空操作。
pub struct BacktestMetrics;

impl BacktestMetrics {
    /// 記錄回測啟動
    pub fn record_run_started() {
        counter!(format!("{}.runs", METRIC_NAMESPACE)).increment(1);
    }

    /// 記錄處理完一個日期
    pub fn record_date_processed() {
        counter!(format!("{}.dates_processed", METRIC_NAMESPACE)).increment(1);
    }

    /// 記錄回測結束及耗時
    ///
    /// # Arguments
    /// * `outcome` - 結束方式
    /// * `duration` - 從鎖定快照到結束的時間
    pub fn record_run_finished(outcome: RunOutcome, duration: Duration) {
        match outcome {
            RunOutcome::HaltedEarly => {
                counter!(format!("{}.halted_early", METRIC_NAMESPACE)).increment(1);
            }
            RunOutcome::Cancelled => {
                counter!(format!("{}.cancelled", METRIC_NAMESPACE)).increment(1);
            }
            RunOutcome::Failed => {
                counter!(format!("{}.failed", METRIC_NAMESPACE)).increment(1);
            }
            RunOutcome::Completed => {}
        }

        histogram!(
            format!("{}.run_duration_ms", METRIC_NAMESPACE),
            "outcome" => outcome.as_str()
        )
        .record(duration.as_secs_f64() * 1000.0);
    }
}
