pub mod records;
pub mod signal;
pub mod types;

pub use records::{FundamentalRecord, PriceRecord};
pub use signal::{DailyIc, DailySignals, DailyWeights, ForwardReturn, PortfolioReturn, Signal};
pub use types::{DatasetKind, EntityId, ParseWeightMethodError, WeightMethod};
