// monitor.rs - 監控模組：日誌初始化與運行指標

pub mod logger;
pub mod metrics;

// 重新導出常用元素，使其可直接從 monitor 模組使用
pub use logger::{build_filter, init_logging};
pub use metrics::{BacktestMetrics, RunOutcome, METRIC_NAMESPACE};
