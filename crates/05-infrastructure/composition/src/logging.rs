//! 日志初始化

use infrastructure_common::{ConfigError, InfrastructureError, InfrastructureResult};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别或过滤指令，例如 `info` 或 `di_impl=debug,info`
    pub level: String,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }

    /// 解析过滤指令
    pub fn filter(&self) -> Result<EnvFilter, ConfigError> {
        EnvFilter::try_new(&self.level).map_err(|e| ConfigError::ValidationError {
            message: format!("无效的日志级别 '{}': {}", self.level, e),
        })
    }
}

/// 初始化日志系统
///
/// 已经安装过全局 subscriber 时返回 `Ok(false)`。
/// 设置了 `RUST_LOG` 环境变量时以其为准。
pub fn initialize_logging(config: &LoggingConfig) -> InfrastructureResult<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => config.filter()?,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.show_target)
        .with_thread_ids(config.show_thread_ids)
        .with_file(config.show_file)
        .with_line_number(config.show_line_number);

    let installed = if config.json_format {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };

    match installed {
        Ok(()) => {
            info!("日志系统初始化完成");
            Ok(true)
        }
        Err(e) if tracing::dispatcher::has_been_set() => {
            tracing::debug!("日志系统已初始化，跳过: {}", e);
            Ok(false)
        }
        Err(e) => Err(InfrastructureError::BootstrapFailed {
            message: format!("日志初始化失败: {}", e),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(LoggingConfig::development().level, "debug");
        assert!(LoggingConfig::production().json_format);
        assert!(!LoggingConfig::default().json_format);
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let config = LoggingConfig {
            level: "di_impl=loud".to_string(),
            ..LoggingConfig::default()
        };
        assert!(matches!(
            config.filter(),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_repeated_initialization_is_tolerated() {
        let config = LoggingConfig::default();
        initialize_logging(&config).unwrap();
        assert!(!initialize_logging(&config).unwrap());
    }
}
