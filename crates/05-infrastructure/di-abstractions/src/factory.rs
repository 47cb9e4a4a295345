//! 实例工厂抽象接口

use crate::graph::{DependencyGraph, NodeId};
use crate::registry::InstanceRegistry;
use infrastructure_common::{DependencyResult, Instance};

/// 实例工厂 trait
///
/// 按依赖图创建节点的实例：先创建构造器依赖，构造后立即注册单例，
/// 再填充字段和 setter 依赖。失败时撤销本次调用注册的所有实例。
pub trait InstanceFactory: Send + Sync {
    /// 获取或创建节点的实例
    fn instantiate(
        &self,
        node: NodeId,
        graph: &DependencyGraph,
        registry: &mut InstanceRegistry,
    ) -> DependencyResult<Instance>;

    /// 获取工厂名称
    fn name(&self) -> &str;
}
