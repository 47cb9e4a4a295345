//! # Component Macros
//!
//! 这个 crate 提供了 `#[derive(Component)]`，在编译时生成组件描述符，
//! 并在程序启动时把组件登记到全局组件目录。
//!
//! 使用该宏的 crate 需要依赖 `infrastructure-common` 和 `ctor`。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::Component;
//! use infrastructure_common::Autowired;
//! use std::sync::Arc;
//!
//! pub trait QuestionRepository: Send + Sync {}
//!
//! #[derive(Component, Default)]
//! #[component(provides = "dyn QuestionRepository")]
//! pub struct InMemoryQuestionRepository;
//!
//! impl QuestionRepository for InMemoryQuestionRepository {}
//!
//! #[derive(Component)]
//! #[component(setter(set_audit = "AuditLog", optional))]
//! pub struct QuestionService {
//!     #[inject]
//!     repository: Arc<dyn QuestionRepository>,
//!     #[autowired]
//!     answers: Autowired<AnswerService>,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod component;
mod utils;

/// 组件派生宏
///
/// # 结构体参数 `#[component(...)]`
///
/// - `name = "..."` - 组件名称，默认为类型名，用作限定符
/// - `lifetime = "singleton" | "prototype"`，或简写 `singleton` / `prototype`
/// - `disabled` - 扫描时跳过该组件
/// - `provides = "dyn Trait"` - 可以按该接口类型解析，可重复
/// - `setter(method = "Type", optional, qualifier = "name")` - setter 注入点，可重复
///
/// # 字段参数
///
/// - `#[inject]` - 构造器注入，字段类型为 `Arc<T>`，`Option<Arc<T>>` 表示可选
/// - `#[autowired]` - 字段注入，字段类型为 `Autowired<T>`
///
/// 两者都接受 `optional` 和 `qualifier = "name"`。其余字段使用 `Default` 初始化。
#[proc_macro_derive(Component, attributes(component, inject, autowired))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    component::derive_component_impl(input)
}
