//! # 依赖注入具体实现
//!
//! 提供组件目录扫描器、依赖图构建器、实例工厂以及容器门面。
//!
//! ```ignore
//! use di_abstractions::{ContainerConfig, DiContainer};
//! use di_impl::Container;
//!
//! let container = Container::new(ContainerConfig::new("my_app::questions"));
//! let service = container.get_instance::<QuestionService>()?;
//! ```

pub mod container;
pub mod factory;
pub mod graph_builder;
pub mod scanner;

pub use container::Container;
pub use factory::DefaultInstanceFactory;
pub use graph_builder::DefaultGraphBuilder;
pub use scanner::CatalogScanner;
