//! 依赖图抽象
//!
//! 依赖图把每个注入点解析到唯一的候选组件。
//! 构造器边上不允许存在环，字段和 setter 边可以成环。

use infrastructure_common::{
    ComponentDescriptor, DependencyError, DependencyResult, InjectionKind, InjectionPoint,
    TypeInfo,
};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

/// 依赖图节点标识（描述符在扫描结果中的位置）
pub type NodeId = usize;

/// 满足某个所需类型的候选组件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// 提供依赖的节点
    pub node: NodeId,
    /// 所用的类型绑定在描述符 `provides()` 中的位置
    pub binding: usize,
}

/// 依赖边：一个注入点到其候选组件
#[derive(Debug, Clone)]
pub struct DependencyEdge {
    /// 注入点在描述符 `injection_points()` 中的位置
    pub point: usize,
    /// 注入类型
    pub kind: InjectionKind,
    /// 解析结果，可选注入点未解析时为 `None`
    pub target: Option<Candidate>,
}

/// 依赖图节点
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// 节点标识
    pub id: NodeId,
    /// 组件描述符
    pub descriptor: Arc<ComponentDescriptor>,
    /// 按注入点声明顺序排列的边
    pub edges: Vec<DependencyEdge>,
}

impl GraphNode {
    /// 创建没有边的节点
    pub fn new(id: NodeId, descriptor: Arc<ComponentDescriptor>) -> Self {
        Self {
            id,
            descriptor,
            edges: Vec::new(),
        }
    }

    /// 边对应的注入点
    pub fn point(&self, edge: &DependencyEdge) -> &InjectionPoint {
        &self.descriptor.injection_points()[edge.point]
    }

    /// 构造器边
    pub fn constructor_edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.edges.iter().filter(|edge| edge.kind.is_constructor())
    }

    /// 字段和 setter 边
    pub fn member_edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.edges.iter().filter(|edge| !edge.kind.is_constructor())
    }
}

#[derive(Debug, Clone)]
struct Provider {
    candidate: Candidate,
    name: String,
}

/// 所需类型到候选组件的索引
#[derive(Debug, Clone, Default)]
pub struct ProviderIndex {
    providers: HashMap<TypeId, Vec<Provider>>,
}

impl ProviderIndex {
    /// 根据描述符提供的类型建立索引
    pub fn from_descriptors(descriptors: &[Arc<ComponentDescriptor>]) -> Self {
        let mut providers: HashMap<TypeId, Vec<Provider>> = HashMap::new();

        for (node, descriptor) in descriptors.iter().enumerate() {
            for (binding, provided) in descriptor.provides().iter().enumerate() {
                providers
                    .entry(provided.type_info().id)
                    .or_default()
                    .push(Provider {
                        candidate: Candidate { node, binding },
                        name: descriptor.name().to_string(),
                    });
            }
        }

        Self { providers }
    }

    /// 能够满足该类型的所有候选
    pub fn candidates(&self, type_id: TypeId) -> Vec<Candidate> {
        self.providers
            .get(&type_id)
            .map(|providers| providers.iter().map(|provider| provider.candidate).collect())
            .unwrap_or_default()
    }

    /// 将所需类型解析为唯一的候选组件
    ///
    /// 先按限定名过滤；没有候选时返回 `UnresolvedDependency`，
    /// 多于一个候选时返回 `AmbiguousDependency`。
    pub fn resolve(
        &self,
        required: &TypeInfo,
        qualifier: Option<&str>,
        required_by: Option<&str>,
    ) -> DependencyResult<Candidate> {
        let matching: Vec<&Provider> = self
            .providers
            .get(&required.id)
            .map(|providers| {
                providers
                    .iter()
                    .filter(|provider| qualifier.map_or(true, |name| provider.name == name))
                    .collect()
            })
            .unwrap_or_default();

        match matching.as_slice() {
            [] => Err(DependencyError::UnresolvedDependency {
                type_name: required.full_name.to_string(),
                qualifier: qualifier.map(str::to_string),
                required_by: required_by.map(str::to_string),
            }),
            [provider] => Ok(provider.candidate),
            providers => Err(DependencyError::AmbiguousDependency {
                type_name: required.full_name.to_string(),
                qualifier: qualifier.map(str::to_string),
                required_by: required_by.map(str::to_string),
                candidates: providers
                    .iter()
                    .map(|provider| provider.name.clone())
                    .collect(),
            }),
        }
    }
}

/// 依赖图
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    nodes: Vec<GraphNode>,
    providers: ProviderIndex,
    instantiation_order: Vec<NodeId>,
}

impl DependencyGraph {
    /// 创建依赖图
    ///
    /// `instantiation_order` 是构造器边子图的后序遍历结果。
    pub fn new(
        nodes: Vec<GraphNode>,
        providers: ProviderIndex,
        instantiation_order: Vec<NodeId>,
    ) -> Self {
        Self {
            nodes,
            providers,
            instantiation_order,
        }
    }

    /// 所有节点
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// 获取节点
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// 节点数量
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 是否没有节点
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 依赖先于依赖者的实例化顺序
    pub fn instantiation_order(&self) -> &[NodeId] {
        &self.instantiation_order
    }

    /// 将所需类型解析为唯一的候选组件
    pub fn resolve(
        &self,
        required: &TypeInfo,
        qualifier: Option<&str>,
    ) -> DependencyResult<Candidate> {
        self.providers.resolve(required, qualifier, None)
    }

    /// 是否存在能满足该类型的组件
    pub fn provides(&self, type_id: TypeId) -> bool {
        !self.providers.candidates(type_id).is_empty()
    }
}

/// 依赖图构建器 trait
pub trait DependencyGraphBuilder: Send + Sync {
    /// 根据扫描得到的描述符构建依赖图
    ///
    /// 注入点无法解析时返回 `UnresolvedDependency`，候选不唯一时返回
    /// `AmbiguousDependency`，构造器边成环时返回 `CircularDependency`。
    fn build(&self, descriptors: Vec<Arc<ComponentDescriptor>>) -> DependencyResult<DependencyGraph>;
}
