//! # 容器组合层
//!
//! 负责把配置加载、日志初始化和依赖注入容器组合成可直接使用的应用上下文。
//!
//! ## 主要功能
//!
//! - **配置加载**: TOML 文件、`AUTOWIRE__` 前缀的环境变量和代码中的覆盖值
//! - **日志初始化**: 基于 `tracing-subscriber`，支持文本和 JSON 输出
//! - **应用上下文**: 持有共享的容器，按类型或名称获取组件
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::prelude::*;
//! use std::sync::Arc;
//!
//! #[derive(Component, Default)]
//! pub struct Clock;
//!
//! #[derive(Component)]
//! pub struct Calendar {
//!     #[inject]
//!     clock: Arc<Clock>,
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let context = ApplicationContext::builder()
//!         .root_package(module_path!())
//!         .build()?;
//!
//!     let calendar = context.get_instance::<Calendar>()?;
//!     let clock = context.get_instance::<Clock>()?;
//!     assert!(Arc::ptr_eq(&calendar.clock, &clock));
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod logging;
pub mod settings;

pub use builder::ApplicationContextBuilder;
pub use context::ApplicationContext;
pub use logging::{initialize_logging, LoggingConfig};
pub use settings::{ContainerSettings, SettingsLoader, DEFAULT_ENV_PREFIX};

pub use infrastructure_common::InfrastructureError;

/// 常用类型
pub mod prelude {
    pub use crate::{ApplicationContext, ApplicationContextBuilder, LoggingConfig};
    pub use component_macros::Component;
    pub use di_abstractions::{ContainerConfig, DiContainer};
    pub use di_impl::Container;
    pub use infrastructure_common::{
        Autowired, Component, ComponentCatalog, ComponentDescriptor, ConstructorArgs,
        DependencyError, DependencyResult, Inject, InfrastructureError, Lifetime,
    };
}
