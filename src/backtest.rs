//! 回測模組
//!
//! 此模組負責在鎖定的數據快照上逐日評估 alpha 信號，計算遠期收益、
//! 信息係數、組合權重與收益，並匯總換手率、衰減曲線等結果。

pub mod accumulator;
pub mod alpha;
pub mod cancel;
pub mod decay;
pub mod engine;
pub mod error;
pub mod forward_return;
pub mod metrics;
pub mod portfolio;
pub mod progress;
pub mod results;
pub mod state;
pub mod turnover;

// 重新導出主要類型和結構
pub use alpha::{AlphaError, AlphaStrategy, FundamentalRatioAlpha, MomentumAlpha};
pub use cancel::{CancelCheck, JobCancelled, ProgressSink, RunHooks};
pub use decay::{DecayCurve, DecayPoint};
pub use engine::{BacktestRequest, PitBacktester};
pub use error::BacktestError;
pub use forward_return::{forward_returns, ForwardReturnError};
pub use progress::{Clock, ProgressClock, ProgressThrottle, SystemClock};
pub use results::{BacktestResult, RunTermination, SummaryStats};
pub use state::RunPhase;
pub use turnover::{TurnoverPoint, TurnoverSummary};
