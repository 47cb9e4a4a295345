//! 依赖注入容器抽象接口
//!
//! 提供依赖注入容器的核心抽象

use chrono::{DateTime, Utc};
use infrastructure_common::{
    ComponentDescriptor, ContainerState, DependencyError, DependencyResult, Resolved, TypeInfo,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 依赖注入容器 trait
///
/// 首次请求时触发 扫描 -> 构建 -> 实例化 流程，之后复用缓存的依赖图和单例。
pub trait DiContainer: Send + Sync {
    /// 解析所需类型的实例，返回值内部为 `Arc<T>`
    fn resolve(&self, required: &TypeInfo, qualifier: Option<&str>) -> DependencyResult<Resolved>;

    /// 是否有组件能满足该类型
    fn contains_type(&self, required: &TypeInfo) -> bool;

    /// 当前状态
    fn state(&self) -> ContainerState;

    /// 统计信息
    fn stats(&self) -> ContainerStats;

    /// 扫描得到的所有组件
    fn registered_components(&self) -> Vec<Arc<ComponentDescriptor>>;

    /// 获取实例
    fn get_instance<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
        Self: Sized,
    {
        downcast_resolved::<T>(self.resolve(&TypeInfo::of::<T>(), None)?)
    }

    /// 按组件名称获取实例
    fn get_named<T>(&self, name: &str) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
        Self: Sized,
    {
        downcast_resolved::<T>(self.resolve(&TypeInfo::of::<T>(), Some(name))?)
    }

    /// 获取实例，类型未注册时返回 `None`
    fn try_get_instance<T>(&self) -> DependencyResult<Option<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
        Self: Sized,
    {
        match self.get_instance::<T>() {
            Ok(instance) => Ok(Some(instance)),
            Err(DependencyError::UnresolvedDependency {
                required_by: None, ..
            }) => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// 是否有组件能满足该类型
    fn contains<T>(&self) -> bool
    where
        T: ?Sized + 'static,
        Self: Sized,
    {
        self.contains_type(&TypeInfo::of::<T>())
    }
}

fn downcast_resolved<T>(resolved: Resolved) -> DependencyResult<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    resolved
        .downcast::<T>()
        .map_err(|error| DependencyError::instantiation(std::any::type_name::<T>(), Box::new(error)))
}

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 扫描根模块路径
    pub root_package: String,
    /// 最大解析深度
    pub max_resolution_depth: usize,
    /// 是否在 READY 时记录装配计划
    pub log_wiring: bool,
    /// 是否按命名约定发现组件
    pub use_conventions: bool,
}

impl ContainerConfig {
    /// 以扫描根路径创建配置
    pub fn new(root_package: impl Into<String>) -> Self {
        Self {
            root_package: root_package.into(),
            ..Self::default()
        }
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            root_package: String::new(),
            max_resolution_depth: 64,
            log_wiring: false,
            use_conventions: true,
        }
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerStats {
    /// 已注册组件数量
    pub registered_components: usize,
    /// 活跃单例数量
    pub singleton_instances: usize,
    /// 扫描到就绪的耗时（毫秒）
    pub build_duration_ms: u64,
    /// 进入 READY 状态的时间
    pub ready_at: Option<DateTime<Utc>>,
}
