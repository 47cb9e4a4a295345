//! 基于组件目录的扫描器

use di_abstractions::{ComponentScanner, ScanOptions};
use infrastructure_common::{
    is_valid_module_path, is_within_module, ComponentCatalog, ComponentConventions,
    ComponentDescriptor, DependencyError, DependencyResult,
};
use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// 组件目录扫描器
///
/// 从 [`ComponentCatalog`] 中挑选模块路径位于扫描根路径之下的组件。
#[derive(Debug)]
pub struct CatalogScanner {
    catalog: Arc<ComponentCatalog>,
    conventions: ComponentConventions,
    options: ScanOptions,
}

impl CatalogScanner {
    /// 扫描指定目录
    pub fn new(catalog: Arc<ComponentCatalog>) -> Self {
        Self {
            catalog,
            conventions: ComponentConventions::default(),
            options: ScanOptions::default(),
        }
    }

    /// 扫描全局目录
    pub fn global() -> Self {
        Self::new(ComponentCatalog::global())
    }

    /// 设置扫描选项
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// 设置命名约定
    pub fn with_conventions(mut self, conventions: ComponentConventions) -> Self {
        self.conventions = conventions;
        self
    }

    fn is_candidate(&self, descriptor: &ComponentDescriptor) -> bool {
        descriptor.is_marked()
            || !descriptor.injection_points().is_empty()
            || (self.options.use_conventions
                && self.conventions.is_candidate(descriptor.type_info()))
    }

    fn prepare(&self, descriptor: ComponentDescriptor) -> DependencyResult<ComponentDescriptor> {
        if descriptor.name().trim().is_empty() {
            return Err(DependencyError::Registration {
                type_name: descriptor.type_info().full_name.to_string(),
                message: "组件名称不能为空".to_string(),
            });
        }

        if descriptor.declared_lifetime().is_some() || !self.options.infer_lifetimes {
            return Ok(descriptor);
        }

        match self.conventions.infer_lifetime(descriptor.type_info()) {
            Some(lifetime) => {
                trace!("按约定推断生命周期: {} -> {}", descriptor.name(), lifetime);
                Ok(descriptor.with_lifetime(lifetime))
            }
            None => Ok(descriptor),
        }
    }
}

impl ComponentScanner for CatalogScanner {
    fn scan(&self, root: &str) -> DependencyResult<Vec<Arc<ComponentDescriptor>>> {
        let root = root.trim();
        if root.is_empty() {
            return Err(DependencyError::scan(root, "扫描根路径为空"));
        }
        if !is_valid_module_path(root) {
            return Err(DependencyError::scan(root, "扫描根路径不是合法的模块路径"));
        }

        let in_scope: Vec<ComponentDescriptor> = self
            .catalog
            .descriptors()
            .into_iter()
            .filter(|descriptor| is_within_module(descriptor.module_path(), root))
            .collect();

        if in_scope.is_empty() {
            return Err(DependencyError::scan(root, "扫描根路径下没有任何已登记的组件"));
        }

        let mut seen: HashSet<TypeId> = HashSet::new();
        let mut selected = Vec::new();

        for descriptor in in_scope {
            if !descriptor.is_enabled() {
                debug!("跳过已禁用的组件: {}", descriptor.name());
                continue;
            }
            if !self.is_candidate(&descriptor) {
                trace!("不是组件候选: {}", descriptor.type_info());
                continue;
            }
            if !seen.insert(descriptor.type_info().id) {
                warn!("组件重复注册，忽略后续注册: {}", descriptor.type_info());
                continue;
            }

            let descriptor = self.prepare(descriptor)?;
            debug!(
                "发现组件: {} ({}, {} 个注入点)",
                descriptor.name(),
                descriptor.lifetime(),
                descriptor.injection_points().len()
            );
            selected.push(Arc::new(descriptor));
        }

        info!("扫描完成: {} 下发现 {} 个组件", root, selected.len());
        Ok(selected)
    }

    fn name(&self) -> &str {
        "CatalogScanner"
    }
}
