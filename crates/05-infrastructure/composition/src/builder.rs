//! 应用上下文构建器

use crate::context::ApplicationContext;
use crate::logging::{initialize_logging, LoggingConfig};
use crate::settings::{SettingsLoader, DEFAULT_ENV_PREFIX};
use di_impl::Container;
use infrastructure_common::{ComponentCatalog, InfrastructureError, InfrastructureResult};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// 应用上下文构建器
///
/// 使用建造者模式组装配置、日志和容器。
pub struct ApplicationContextBuilder {
    /// 配置加载器
    loader: SettingsLoader,
    /// 组件目录，默认使用全局目录
    catalog: Option<Arc<ComponentCatalog>>,
    /// 代码中指定的日志配置
    logging_config: Option<LoggingConfig>,
    /// 是否初始化日志
    logging_enabled: bool,
    /// 是否在构建时完成扫描和单例创建
    eager: bool,
}

impl ApplicationContextBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            loader: SettingsLoader::new(),
            catalog: None,
            logging_config: None,
            logging_enabled: false, // 测试中避免重复安装 subscriber
            eager: false,
        }
    }

    /// 设置扫描根模块路径
    pub fn root_package(mut self, root: impl Into<String>) -> Self {
        self.loader
            .set_override("container.root_package", root.into());
        self
    }

    /// 添加 TOML 配置文件
    pub fn add_config_toml<P: AsRef<Path>>(mut self, path: P) -> InfrastructureResult<Self> {
        self.loader.add_toml(path)?;
        Ok(self)
    }

    /// 添加环境变量配置源
    pub fn add_config_env_vars(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        info!("添加环境变量配置源，前缀: {}", prefix);
        self.loader.with_env_prefix(prefix);
        self
    }

    /// 使用指定的组件目录
    pub fn with_catalog(mut self, catalog: Arc<ComponentCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// 设置最大解析深度
    pub fn max_resolution_depth(mut self, depth: usize) -> Self {
        let depth = i64::try_from(depth).unwrap_or(i64::MAX);
        self.loader
            .set_override("container.max_resolution_depth", depth);
        self
    }

    /// 就绪时是否记录装配计划
    pub fn log_wiring(mut self, enabled: bool) -> Self {
        self.loader.set_override("container.log_wiring", enabled);
        self
    }

    /// 配置日志并启用日志初始化
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = Some(config);
        self.logging_enabled = true;
        self
    }

    /// 按配置文件中的日志配置初始化日志
    pub fn enable_logging(mut self) -> Self {
        self.logging_enabled = true;
        self
    }

    /// 自动配置开发环境
    pub fn auto_configure_development(mut self) -> Self {
        info!("自动配置开发环境");

        if Path::new("./autowire.dev.toml").is_file()
            && self.loader.add_toml("./autowire.dev.toml").is_ok()
        {
            debug!("添加开发环境配置: autowire.dev.toml");
        }
        self.loader.with_env_prefix(DEFAULT_ENV_PREFIX);

        self.with_logging(LoggingConfig::development()).log_wiring(true)
    }

    /// 自动配置生产环境
    pub fn auto_configure_production(mut self) -> Self {
        info!("自动配置生产环境");

        if Path::new("./autowire.prod.toml").is_file()
            && self.loader.add_toml("./autowire.prod.toml").is_ok()
        {
            debug!("添加生产环境配置: autowire.prod.toml");
        }
        self.loader.with_env_prefix(DEFAULT_ENV_PREFIX);

        // 生产环境在启动时暴露装配错误
        self.with_logging(LoggingConfig::production()).eager(true)
    }

    /// 构建时立即完成扫描、建图和单例创建
    pub fn eager(mut self, eager: bool) -> Self {
        self.eager = eager;
        self
    }

    /// 构建应用上下文
    pub fn build(self) -> InfrastructureResult<ApplicationContext> {
        let mut settings = self.loader.load()?;
        if let Some(logging) = self.logging_config {
            settings.logging = logging;
        }

        if self.logging_enabled {
            initialize_logging(&settings.logging)?;
        }

        if settings.container.root_package.is_empty() {
            return Err(InfrastructureError::BootstrapFailed {
                message: "未配置扫描根路径 container.root_package".to_string(),
            });
        }

        info!("开始构建应用上下文: {}", settings.container.root_package);

        let catalog = self.catalog.unwrap_or_else(ComponentCatalog::global);
        let container = Container::with_catalog(settings.container.clone(), catalog);

        if self.eager {
            container.initialize()?;
        }

        info!("应用上下文构建完成");
        Ok(ApplicationContext::new(container, settings))
    }
}

impl Default for ApplicationContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
