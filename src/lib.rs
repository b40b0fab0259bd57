// 模組定義
pub mod backtest;
pub mod config;
pub mod data_provider;
pub mod domain_types;
pub mod monitor;
pub mod snapshot;

// 重新導出常用類型
pub use backtest::{
    AlphaStrategy, BacktestError, BacktestRequest, BacktestResult, JobCancelled, PitBacktester,
    RunHooks, RunTermination,
};
pub use config::{BacktesterConfig, EngineConfig};
pub use data_provider::{PitViolationError, RawDataProvider};
pub use domain_types::{FundamentalRecord, PriceRecord, Signal, WeightMethod};
pub use snapshot::{Snapshot, SnapshotService};
