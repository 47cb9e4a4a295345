//! 容器配置加载
//!
//! 优先级从低到高：默认值、TOML 文件、环境变量、代码中的覆盖值。

use crate::logging::LoggingConfig;
use config::{Config, Environment, File, FileFormat, Value};
use di_abstractions::ContainerConfig;
use infrastructure_common::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 默认的环境变量前缀
pub const DEFAULT_ENV_PREFIX: &str = "AUTOWIRE";

/// 环境变量中的层级分隔符，例如 `AUTOWIRE__CONTAINER__ROOT_PACKAGE`
pub const ENV_SEPARATOR: &str = "__";

/// 应用配置
///
/// ```toml
/// [container]
/// root_package = "example_app"
/// max_resolution_depth = 32
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// 容器配置
    pub container: ContainerConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

impl ContainerSettings {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.container.max_resolution_depth == 0 {
            return Err(ConfigError::ValidationError {
                message: "container.max_resolution_depth 必须大于 0".to_string(),
            });
        }
        self.logging.filter()?;
        Ok(())
    }
}

/// 配置加载器
#[derive(Debug, Clone, Default)]
pub struct SettingsLoader {
    files: Vec<PathBuf>,
    env_prefix: Option<String>,
    overrides: Vec<(String, Value)>,
}

impl SettingsLoader {
    /// 创建加载器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加 TOML 配置文件，文件必须存在
    pub fn add_toml(&mut self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        debug!("添加 TOML 配置文件: {}", path.display());
        self.files.push(path.to_path_buf());
        Ok(())
    }

    /// 读取带前缀的环境变量
    pub fn with_env_prefix(&mut self, prefix: impl Into<String>) {
        self.env_prefix = Some(prefix.into());
    }

    /// 设置覆盖值，优先级最高
    pub fn set_override(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.overrides.push((key.into(), value.into()));
    }

    /// 加载并验证配置
    pub fn load(&self) -> ConfigResult<ContainerSettings> {
        let mut builder = Config::builder();

        for path in &self.files {
            builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Toml));
        }

        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            );
        }

        for (key, value) in &self.overrides {
            builder = builder
                .set_override(key.as_str(), value.clone())
                .map_err(parse_error)?;
        }

        let settings: ContainerSettings = builder
            .build()
            .map_err(parse_error)?
            .try_deserialize()
            .map_err(parse_error)?;
        settings.validate()?;

        info!(
            "配置加载完成: root_package={}, max_resolution_depth={}",
            settings.container.root_package, settings.container.max_resolution_depth
        );
        Ok(settings)
    }
}

fn parse_error(error: config::ConfigError) -> ConfigError {
    ConfigError::ParseError {
        source: Box::new(error),
    }
}
