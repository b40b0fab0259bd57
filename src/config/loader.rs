use config::{Config, ConfigError, Environment as ConfigEnvironment, File};
use std::env;
use std::path::Path;
use tracing::debug;

use crate::config::types::BacktesterConfig;
use crate::config::validation::Validator;

/// 選擇運行環境的環境變數
pub const ENV_VAR: &str = "PIT_BACKTEST_ENV";

/// 環境變數覆蓋配置時使用的前綴
pub const ENV_PREFIX: &str = "PIT_BACKTEST";

/// 環境類型枚舉
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// 從環境變數取得當前環境設定
    pub fn from_env() -> Self {
        match env::var(ENV_VAR)
            .unwrap_or_else(|_| "development".into())
            .to_lowercase()
            .as_str()
        {
            "production" => Environment::Production,
            _ => Environment::Development,
        }
    }

    /// 轉換為配置文件名
    pub fn as_filename(&self) -> &'static str {
        match self {
            Environment::Development => "development.toml",
            Environment::Production => "production.toml",
        }
    }
}

/// 配置加載器，負責根據環境加載適當的配置
pub struct ConfigLoader;

impl ConfigLoader {
    /// 從 `CONFIG_DIR`（預設 `config`）載入指定環境的配置
    pub fn load(env: Environment) -> Result<Config, ConfigError> {
        let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "config".into());
        Self::load_from(Path::new(&config_dir), env)
    }

    /// 從指定目錄載入配置；文件不存在時只使用預設值與環境變數
    pub fn load_from(dir: &Path, env: Environment) -> Result<Config, ConfigError> {
        let config_path = dir.join(env.as_filename());
        debug!("載入配置文件: {}", config_path.display());

        Config::builder()
            .add_source(File::from(config_path).required(false))
            // 環境變數優先級高於文件配置
            .add_source(
                ConfigEnvironment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
    }
}

impl BacktesterConfig {
    /// 從環境變數指定的環境加載配置
    pub fn load_from_env() -> Result<Self, ConfigError> {
        Self::from_source(ConfigLoader::load(Environment::from_env())?)
    }

    /// 從指定目錄與環境加載配置
    pub fn load_from(dir: &Path, env: Environment) -> Result<Self, ConfigError> {
        Self::from_source(ConfigLoader::load_from(dir, env)?)
    }

    fn from_source(source: Config) -> Result<Self, ConfigError> {
        let config: BacktesterConfig = source.try_deserialize()?;

        config
            .validate()
            .map_err(|err| ConfigError::Message(err.to_string()))?;
        debug!("配置驗證通過");

        Ok(config)
    }
}
