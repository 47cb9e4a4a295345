//! 容器门面实现
//!
//! 状态流转: `Uninitialized -> Scanned -> Built -> Ready`。
//! 扫描和构建失败会被记住并在之后的每次请求中原样返回；
//! 实例化失败时容器停留在 `Built`，下一次请求会重新尝试实例化。

use crate::factory::DefaultInstanceFactory;
use crate::graph_builder::DefaultGraphBuilder;
use crate::scanner::CatalogScanner;
use chrono::Utc;
use di_abstractions::{
    ComponentScanner, ContainerConfig, ContainerStats, DependencyGraph, DependencyGraphBuilder,
    DiContainer, InstanceFactory, InstanceRegistry, ScanOptions,
};
use infrastructure_common::{
    ComponentCatalog, ComponentDescriptor, ContainerState, DependencyError, DependencyResult,
    Lifetime, Resolved, TypeInfo,
};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

enum Pipeline {
    Uninitialized,
    Scanned(Vec<Arc<ComponentDescriptor>>),
    Built(Arc<DependencyGraph>),
    Ready,
    ScanFailed(DependencyError),
    BuildFailed(DependencyError),
}

impl Pipeline {
    fn state(&self) -> ContainerState {
        match self {
            Self::Uninitialized => ContainerState::Uninitialized,
            Self::Scanned(_) => ContainerState::Scanned,
            Self::Built(_) => ContainerState::Built,
            Self::Ready => ContainerState::Ready,
            Self::ScanFailed(_) => ContainerState::ScanFailed,
            Self::BuildFailed(_) => ContainerState::BuildFailed,
        }
    }
}

struct ReadyContext {
    graph: Arc<DependencyGraph>,
    registry: Arc<InstanceRegistry>,
    stats: ContainerStats,
}

/// 依赖注入容器
///
/// 构建阶段只运行一次，由第一个请求实例的线程完成；
/// 进入 READY 之后的读取不再加锁，可以被多个线程并发调用。
pub struct Container {
    config: ContainerConfig,
    scanner: Box<dyn ComponentScanner>,
    graph_builder: Box<dyn DependencyGraphBuilder>,
    factory: Box<dyn InstanceFactory>,
    pipeline: RwLock<Pipeline>,
    ready: OnceCell<ReadyContext>,
}

impl Container {
    /// 扫描全局组件目录的容器
    pub fn new(config: ContainerConfig) -> Self {
        Self::with_catalog(config, ComponentCatalog::global())
    }

    /// 扫描指定组件目录的容器
    pub fn with_catalog(config: ContainerConfig, catalog: Arc<ComponentCatalog>) -> Self {
        let scanner = CatalogScanner::new(catalog).with_options(ScanOptions {
            use_conventions: config.use_conventions,
            ..ScanOptions::default()
        });
        let factory = DefaultInstanceFactory::new(config.max_resolution_depth);

        Self::with_parts(
            config,
            Box::new(scanner),
            Box::new(DefaultGraphBuilder::new()),
            Box::new(factory),
        )
    }

    /// 使用自定义的扫描器、图构建器和工厂
    pub fn with_parts(
        config: ContainerConfig,
        scanner: Box<dyn ComponentScanner>,
        graph_builder: Box<dyn DependencyGraphBuilder>,
        factory: Box<dyn InstanceFactory>,
    ) -> Self {
        Self {
            config,
            scanner,
            graph_builder,
            factory,
            pipeline: RwLock::new(Pipeline::Uninitialized),
            ready: OnceCell::new(),
        }
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 立即运行 扫描 -> 构建 -> 实例化 流程
    pub fn initialize(&self) -> DependencyResult<()> {
        self.ready_context().map(|_| ())
    }

    fn ready_context(&self) -> DependencyResult<&ReadyContext> {
        if let Some(context) = self.ready.get() {
            return Ok(context);
        }

        let mut pipeline = self.pipeline.write();
        if let Some(context) = self.ready.get() {
            return Ok(context);
        }

        let started = Instant::now();
        self.scan(&mut pipeline);
        self.build(&mut pipeline);

        let graph = match &*pipeline {
            Pipeline::Built(graph) => Arc::clone(graph),
            Pipeline::ScanFailed(error) | Pipeline::BuildFailed(error) => {
                return Err(error.clone())
            }
            other => {
                return Err(DependencyError::Registration {
                    type_name: "Container".to_string(),
                    message: format!("容器处于意外状态: {:?}", other.state()),
                })
            }
        };

        let registry = self.instantiate_singletons(&graph)?;

        let stats = ContainerStats {
            registered_components: graph.len(),
            singleton_instances: registry.len(),
            build_duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            ready_at: Some(Utc::now()),
        };
        info!(
            "容器就绪: {} 个组件, {} 个单例, 耗时 {} ms",
            stats.registered_components, stats.singleton_instances, stats.build_duration_ms
        );

        if self.config.log_wiring {
            log_wiring(&graph);
        }

        *pipeline = Pipeline::Ready;
        Ok(self.ready.get_or_init(|| ReadyContext {
            graph,
            registry: Arc::new(registry),
            stats,
        }))
    }

    fn scan(&self, pipeline: &mut Pipeline) {
        if !matches!(pipeline, Pipeline::Uninitialized) {
            return;
        }

        info!("开始扫描组件: {}", self.config.root_package);
        *pipeline = match self.scanner.scan(&self.config.root_package) {
            Ok(descriptors) => Pipeline::Scanned(descriptors),
            Err(error) => {
                error!("组件扫描失败: {}", error);
                Pipeline::ScanFailed(error)
            }
        };
    }

    fn build(&self, pipeline: &mut Pipeline) {
        let Pipeline::Scanned(descriptors) = pipeline else {
            return;
        };

        let descriptors = std::mem::take(descriptors);
        *pipeline = match self.graph_builder.build(descriptors) {
            Ok(graph) => Pipeline::Built(Arc::new(graph)),
            Err(error) => {
                error!("依赖图构建失败: {}", error);
                Pipeline::BuildFailed(error)
            }
        };
    }

    fn instantiate_singletons(&self, graph: &DependencyGraph) -> DependencyResult<InstanceRegistry> {
        let mut registry = InstanceRegistry::new();

        for &node in graph.instantiation_order() {
            let singleton = graph
                .node(node)
                .is_some_and(|node| node.descriptor.lifetime() == Lifetime::Singleton);
            if !singleton {
                continue;
            }

            if let Err(error) = self.factory.instantiate(node, graph, &mut registry) {
                error!("单例实例化失败，容器保持 BUILT 状态: {}", error);
                return Err(error);
            }
        }

        Ok(registry)
    }
}

fn log_wiring(graph: &DependencyGraph) {
    for node in graph.nodes() {
        let targets: Vec<String> = node
            .edges
            .iter()
            .map(|edge| {
                let target = edge
                    .target
                    .and_then(|candidate| graph.node(candidate.node))
                    .map_or("<未解析>", |target| target.descriptor.name());
                format!("{}:{} <- {}", edge.kind, node.point(edge).member_name(), target)
            })
            .collect();
        info!(
            "装配 {} ({}): [{}]",
            node.descriptor.name(),
            node.descriptor.lifetime(),
            targets.join(", ")
        );
    }
}

impl DiContainer for Container {
    fn resolve(&self, required: &TypeInfo, qualifier: Option<&str>) -> DependencyResult<Resolved> {
        let context = self.ready_context()?;
        let candidate = context.graph.resolve(required, qualifier)?;
        let node = context
            .graph
            .node(candidate.node)
            .ok_or_else(|| DependencyError::Registration {
                type_name: required.full_name.to_string(),
                message: "依赖图中不存在候选节点".to_string(),
            })?;

        let instance = match node.descriptor.lifetime() {
            Lifetime::Singleton => context
                .registry
                .get(candidate.node)
                .cloned()
                .ok_or_else(|| DependencyError::Registration {
                    type_name: node.descriptor.type_info().full_name.to_string(),
                    message: "单例尚未创建".to_string(),
                })?,
            Lifetime::Prototype => {
                debug!("创建原型实例: {}", node.descriptor.name());
                let mut scratch = InstanceRegistry::layered(Arc::clone(&context.registry));
                self.factory
                    .instantiate(candidate.node, &context.graph, &mut scratch)?
            }
        };

        node.descriptor
            .provides()
            .get(candidate.binding)
            .and_then(|provided| provided.cast(&instance))
            .ok_or_else(|| {
                DependencyError::instantiation(required.full_name, "实例无法转换为所需类型".into())
            })
    }

    fn contains_type(&self, required: &TypeInfo) -> bool {
        self.ready_context()
            .map(|context| context.graph.provides(required.id))
            .unwrap_or(false)
    }

    fn state(&self) -> ContainerState {
        self.pipeline.read().state()
    }

    fn stats(&self) -> ContainerStats {
        if let Some(context) = self.ready.get() {
            return context.stats.clone();
        }

        ContainerStats {
            registered_components: self.registered_components().len(),
            ..ContainerStats::default()
        }
    }

    fn registered_components(&self) -> Vec<Arc<ComponentDescriptor>> {
        if let Some(context) = self.ready.get() {
            return descriptors_of(&context.graph);
        }

        match &*self.pipeline.read() {
            Pipeline::Scanned(descriptors) => descriptors.clone(),
            Pipeline::Built(graph) => descriptors_of(graph),
            _ => Vec::new(),
        }
    }
}

fn descriptors_of(graph: &DependencyGraph) -> Vec<Arc<ComponentDescriptor>> {
    graph
        .nodes()
        .iter()
        .map(|node| Arc::clone(&node.descriptor))
        .collect()
}

impl Drop for Container {
    fn drop(&mut self) {
        let Some(context) = self.ready.take() else {
            return;
        };

        let released = context.registry.len();
        match Arc::try_unwrap(context.registry) {
            Ok(mut registry) => registry.clear(),
            Err(_) => debug!("注册表仍被引用，延迟释放单例"),
        }
        info!("容器已拆除，释放 {} 个单例", released);
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("root_package", &self.config.root_package)
            .field("state", &self.state())
            .field("scanner", &self.scanner.name())
            .field("factory", &self.factory.name())
            .finish()
    }
}
