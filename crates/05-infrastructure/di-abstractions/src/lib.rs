//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义组件扫描、依赖图构建和实例创建的核心接口。
//!
//! ## 核心接口
//!
//! - [`ComponentScanner`] - 组件扫描器接口
//! - [`DependencyGraphBuilder`] - 依赖图构建器接口
//! - [`InstanceFactory`] - 实例工厂接口
//! - [`DiContainer`] - 容器门面接口
//!
//! ## 核心数据结构
//!
//! - [`DependencyGraph`] - 依赖图（所需类型到候选组件的映射以及每个注入点的边）
//! - [`InstanceRegistry`] - 单例实例注册表

pub mod container;
pub mod factory;
pub mod graph;
pub mod registry;
pub mod scanner;

pub use container::*;
pub use factory::*;
pub use graph::*;
pub use registry::*;
pub use scanner::*;
