// monitor/logger.rs - 日誌初始化

use anyhow::{anyhow, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::LogConfig;

/// 由配置構建過濾器；`RUST_LOG` 存在時優先
pub fn build_filter(log_config: &LogConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let level = match log_config.level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info", // 默認為INFO
    };

    EnvFilter::try_new(level).map_err(|e| anyhow!("無效的日誌級別 {}: {}", level, e))
}

/// 安裝全局 tracing 訂閱者；已安裝時直接返回
pub fn init_logging(log_config: &LogConfig) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let filter = build_filter(log_config)?;
    let builder = FmtSubscriber::builder().with_env_filter(filter);

    let installed = match log_config.format.to_lowercase().as_str() {
        "compact" => tracing::subscriber::set_global_default(builder.compact().finish()),
        "full" => tracing::subscriber::set_global_default(builder.finish()),
        _ => tracing::subscriber::set_global_default(builder.pretty().finish()),
    };
    installed.map_err(|e| anyhow!("設置日誌系統失敗: {}", e))?;

    info!("日誌系統初始化完成");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_build_filter_from_config() {
        std::env::remove_var("RUST_LOG");
        let config = LogConfig {
            level: "DEBUG".to_string(),
            format: "compact".to_string(),
        };
        let filter = build_filter(&config).unwrap();
        assert!(filter.to_string().contains("debug"));
    }

    #[test]
    #[serial]
    fn test_init_logging_is_idempotent() {
        let config = LogConfig::default();
        assert!(init_logging(&config).is_ok());
        assert!(init_logging(&config).is_ok());
    }
}
