//! # Infrastructure Common
//!
//! 这个 crate 提供了 Autowire 容器的组件模型和公共类型。
//!
//! ## 核心组件
//!
//! - [`Component`] - 可由容器管理的组件 trait
//! - [`ComponentDescriptor`] - 组件描述符（类型、注入点、生命周期）
//! - [`InjectionPoint`] - 构造器 / 字段 / setter 注入点
//! - [`Autowired`] - 字段注入槽
//! - [`ComponentCatalog`] - 静态组件注册表，供扫描器使用
//! - [`ComponentConventions`] - 命名约定
//!
//! ## 设计原则
//!
//! - 注入元数据在编译期声明，运行期只做类型擦除后的装配
//! - 组件发现基于显式注册表，而不是运行期的包遍历
//! - 错误通过 [`DependencyError`] 返回给调用方，不在内部吞掉

pub mod component;
pub mod conventions;
pub mod discovery;
pub mod errors;
pub mod injection;
pub mod lifecycle;
pub mod metadata;

pub use component::*;
pub use conventions::*;
pub use discovery::*;
pub use errors::*;
pub use injection::*;
pub use lifecycle::*;
pub use metadata::*;
