//! 依赖图构建
//!
//! 把每个注入点解析到唯一的候选组件，并检测两类不可打破的环：
//! 构造器边上的环，以及经过原型组件的任意环。

use di_abstractions::{
    DependencyEdge, DependencyGraph, DependencyGraphBuilder, GraphNode, NodeId, ProviderIndex,
};
use infrastructure_common::{
    ComponentDescriptor, DependencyError, DependencyResult, Lifetime,
};
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

/// 默认依赖图构建器
#[derive(Debug, Default)]
pub struct DefaultGraphBuilder;

impl DefaultGraphBuilder {
    /// 创建构建器
    pub fn new() -> Self {
        Self
    }

    fn resolve_edges(
        &self,
        descriptor: &ComponentDescriptor,
        providers: &ProviderIndex,
    ) -> DependencyResult<Vec<DependencyEdge>> {
        let mut edges = Vec::with_capacity(descriptor.injection_points().len());

        for (index, point) in descriptor.injection_points().iter().enumerate() {
            let target = match providers.resolve(
                point.required(),
                point.qualifier(),
                Some(descriptor.name()),
            ) {
                Ok(candidate) => Some(candidate),
                Err(DependencyError::UnresolvedDependency { .. }) if point.is_optional() => {
                    debug!(
                        "可选依赖未找到: {}.{} ({})",
                        descriptor.name(),
                        point.member_name(),
                        point.required()
                    );
                    None
                }
                Err(error) => return Err(error),
            };

            edges.push(DependencyEdge {
                point: index,
                kind: point.kind(),
                target,
            });
        }

        Ok(edges)
    }

    /// 在构造器边子图上做深度优先遍历，返回后序（依赖在前）
    fn constructor_order(&self, nodes: &[GraphNode]) -> DependencyResult<Vec<NodeId>> {
        let mut marks = vec![Mark::Unvisited; nodes.len()];
        let mut stack = Vec::new();
        let mut order = Vec::with_capacity(nodes.len());

        for node in nodes {
            if marks[node.id] == Mark::Unvisited {
                self.visit(node.id, nodes, &mut marks, &mut stack, &mut order)?;
            }
        }

        Ok(order)
    }

    fn visit(
        &self,
        current: NodeId,
        nodes: &[GraphNode],
        marks: &mut [Mark],
        stack: &mut Vec<NodeId>,
        order: &mut Vec<NodeId>,
    ) -> DependencyResult<()> {
        match marks[current] {
            Mark::Done => return Ok(()),
            Mark::Visiting => {
                // 检测到构造器循环依赖
                let start = stack
                    .iter()
                    .position(|&id| id == current)
                    .unwrap_or_default();
                let mut cycle = stack[start..].to_vec();
                cycle.push(current);
                return Err(circular(nodes, &cycle));
            }
            Mark::Unvisited => {}
        }

        marks[current] = Mark::Visiting;
        stack.push(current);

        for edge in nodes[current].constructor_edges() {
            if let Some(target) = edge.target {
                self.visit(target.node, nodes, marks, stack, order)?;
            }
        }

        stack.pop();
        marks[current] = Mark::Done;
        order.push(current);
        Ok(())
    }

    /// 原型组件不会被提前注册，因此经过原型组件的任何环都无法终止
    fn check_prototype_cycles(&self, nodes: &[GraphNode]) -> DependencyResult<()> {
        for node in nodes {
            if node.descriptor.lifetime() != Lifetime::Prototype {
                continue;
            }

            let mut visited = vec![false; nodes.len()];
            let mut path = vec![node.id];
            if self.find_path_back(node.id, node.id, nodes, &mut visited, &mut path) {
                path.push(node.id);
                return Err(circular(nodes, &path));
            }
        }

        Ok(())
    }

    fn find_path_back(
        &self,
        start: NodeId,
        current: NodeId,
        nodes: &[GraphNode],
        visited: &mut [bool],
        path: &mut Vec<NodeId>,
    ) -> bool {
        for edge in &nodes[current].edges {
            let Some(target) = edge.target else {
                continue;
            };
            if target.node == start {
                return true;
            }
            if visited[target.node] {
                continue;
            }

            visited[target.node] = true;
            path.push(target.node);
            if self.find_path_back(start, target.node, nodes, visited, path) {
                return true;
            }
            path.pop();
        }

        false
    }
}

fn circular(nodes: &[GraphNode], cycle: &[NodeId]) -> DependencyError {
    let dependency_chain = cycle
        .iter()
        .map(|&id| nodes[id].descriptor.name())
        .collect::<Vec<_>>()
        .join(" -> ");
    error!("检测到循环依赖: {}", dependency_chain);
    DependencyError::CircularDependency { dependency_chain }
}

impl DependencyGraphBuilder for DefaultGraphBuilder {
    fn build(&self, descriptors: Vec<Arc<ComponentDescriptor>>) -> DependencyResult<DependencyGraph> {
        let providers = ProviderIndex::from_descriptors(&descriptors);

        let mut nodes: Vec<GraphNode> = descriptors
            .into_iter()
            .enumerate()
            .map(|(id, descriptor)| GraphNode::new(id, descriptor))
            .collect();

        for node in &mut nodes {
            node.edges = self.resolve_edges(&node.descriptor, &providers)?;
        }

        let order = self.constructor_order(&nodes)?;
        self.check_prototype_cycles(&nodes)?;

        let edge_count: usize = nodes.iter().map(|node| node.edges.len()).sum();
        info!("依赖图构建完成: {} 个组件, {} 条依赖边", nodes.len(), edge_count);

        Ok(DependencyGraph::new(nodes, providers, order))
    }
}
