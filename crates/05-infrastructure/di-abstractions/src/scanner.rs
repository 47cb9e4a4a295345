//! 组件扫描器抽象接口
//!
//! 提供按扫描根路径发现组件的能力

use infrastructure_common::{ComponentDescriptor, DependencyResult};
use std::sync::Arc;

/// 组件扫描器 trait
///
/// 只返回描述符，不创建任何实例。
pub trait ComponentScanner: Send + Sync {
    /// 扫描根模块路径下的组件
    ///
    /// 根路径为空、不是合法的模块路径或其下没有任何已登记的组件时返回扫描错误。
    fn scan(&self, root: &str) -> DependencyResult<Vec<Arc<ComponentDescriptor>>>;

    /// 获取扫描器名称
    fn name(&self) -> &str;
}

/// 扫描选项
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// 是否按命名约定挑选组件
    pub use_conventions: bool,
    /// 是否按命名约定推断未声明的生命周期
    pub infer_lifetimes: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            use_conventions: true,
            infer_lifetimes: true,
        }
    }
}
