//! 实例工厂实现

use di_abstractions::{
    DependencyEdge, DependencyGraph, GraphNode, InstanceFactory, InstanceRegistry, NodeId,
};
use infrastructure_common::{
    ConstructorArgs, DependencyError, DependencyResult, Instance, Lifetime, Resolved,
};
use std::sync::Arc;
use tracing::{debug, trace};

/// 默认实例工厂
///
/// 单例在构造完成后、填充字段和 setter 之前注册，
/// 字段注入形成的环因此可以看到尚未完全装配的实例而终止。
#[derive(Debug, Clone)]
pub struct DefaultInstanceFactory {
    max_resolution_depth: usize,
}

impl DefaultInstanceFactory {
    /// 创建实例工厂
    pub fn new(max_resolution_depth: usize) -> Self {
        Self {
            max_resolution_depth,
        }
    }

    fn create(
        &self,
        id: NodeId,
        graph: &DependencyGraph,
        registry: &mut InstanceRegistry,
        depth: usize,
    ) -> DependencyResult<Instance> {
        let node = graph.node(id).ok_or_else(|| DependencyError::Registration {
            type_name: format!("#{id}"),
            message: "依赖图中不存在该节点".to_string(),
        })?;
        let singleton = node.descriptor.lifetime() == Lifetime::Singleton;

        if singleton {
            if let Some(instance) = registry.get(id) {
                return Ok(Arc::clone(instance));
            }
        }

        if depth >= self.max_resolution_depth {
            return Err(DependencyError::instantiation(
                node.descriptor.name(),
                format!("超过最大解析深度 {}", self.max_resolution_depth).into(),
            ));
        }

        let checkpoint = registry.checkpoint();
        match self.assemble(node, singleton, graph, registry, depth) {
            Ok(instance) => Ok(instance),
            Err(error) => {
                let removed = registry.rollback(checkpoint);
                debug!(
                    "组件创建失败: {}, 回滚 {} 个实例",
                    node.descriptor.name(),
                    removed
                );
                Err(error)
            }
        }
    }

    fn assemble(
        &self,
        node: &GraphNode,
        singleton: bool,
        graph: &DependencyGraph,
        registry: &mut InstanceRegistry,
        depth: usize,
    ) -> DependencyResult<Instance> {
        let descriptor = &node.descriptor;

        // 构造器依赖必须先就绪
        let mut args = Vec::new();
        for edge in node.constructor_edges() {
            args.push(self.resolve_edge(edge, graph, registry, depth)?);
        }

        // 构造器依赖的字段可能经由环已经创建了本组件
        if singleton {
            if let Some(existing) = registry.get(node.id) {
                trace!("复用解析构造器依赖期间创建的单例: {}", descriptor.name());
                return Ok(Arc::clone(existing));
            }
        }

        let instance = descriptor
            .construct(ConstructorArgs::new(args))
            .map_err(|source| DependencyError::instantiation(descriptor.name(), source))?;
        trace!("已构造组件: {}", descriptor.name());

        if singleton && !registry.insert(node.id, Arc::clone(descriptor), Arc::clone(&instance)) {
            if let Some(existing) = registry.get(node.id) {
                return Ok(Arc::clone(existing));
            }
        }

        for edge in node.member_edges() {
            let dependency = self.resolve_edge(edge, graph, registry, depth)?;
            let point = node.point(edge);
            point
                .inject(&instance, dependency)
                .map_err(|source| DependencyError::instantiation(descriptor.name(), source))?;
            trace!(
                "已注入 {} 依赖: {}.{}",
                point.kind(),
                descriptor.name(),
                point.member_name()
            );
        }

        Ok(instance)
    }

    fn resolve_edge(
        &self,
        edge: &DependencyEdge,
        graph: &DependencyGraph,
        registry: &mut InstanceRegistry,
        depth: usize,
    ) -> DependencyResult<Option<Resolved>> {
        let Some(candidate) = edge.target else {
            return Ok(None);
        };

        let instance = self.create(candidate.node, graph, registry, depth + 1)?;
        let provider = graph
            .node(candidate.node)
            .and_then(|node| node.descriptor.provides().get(candidate.binding))
            .ok_or_else(|| DependencyError::Registration {
                type_name: format!("#{}", candidate.node),
                message: "组件没有对应的类型绑定".to_string(),
            })?;

        provider
            .cast(&instance)
            .map(Some)
            .ok_or_else(|| {
                DependencyError::instantiation(
                    provider.type_info().full_name,
                    "实例无法转换为所需类型".into(),
                )
            })
    }
}

impl Default for DefaultInstanceFactory {
    fn default() -> Self {
        Self::new(64)
    }
}

impl InstanceFactory for DefaultInstanceFactory {
    fn instantiate(
        &self,
        node: NodeId,
        graph: &DependencyGraph,
        registry: &mut InstanceRegistry,
    ) -> DependencyResult<Instance> {
        self.create(node, graph, registry, 0)
    }

    fn name(&self) -> &str {
        "DefaultInstanceFactory"
    }
}
