/// 配置管理模組
///
/// 本模組負責加載與驗證回測引擎配置。
/// 配置按環境從 `config/<env>.toml` 讀取，並允許 `PIT_BACKTEST__*` 環境變數覆蓋。
pub mod loader;
pub mod types;
pub mod validation;

// 重新導出常用組件
pub use loader::{ConfigLoader, Environment};
pub use types::*;
pub use validation::{ValidationError, ValidationUtils, Validator};
