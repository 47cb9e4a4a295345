//! 组件发现机制
//!
//! 组件在程序启动时把描述符工厂登记到 [`ComponentCatalog`]，
//! 扫描器再按模块路径从目录中挑选组件。

use crate::component::{Component, ComponentDescriptor};
use crate::metadata::TypeInfo;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 描述符工厂
pub type DescriptorFactory = Arc<dyn Fn() -> ComponentDescriptor + Send + Sync>;

struct CatalogEntry {
    type_info: TypeInfo,
    factory: DescriptorFactory,
}

/// 组件目录
///
/// 静态注册表：`#[derive(Component)]` 生成的代码在程序启动时写入全局目录，
/// 测试和应用也可以显式创建本地目录。
#[derive(Default)]
pub struct ComponentCatalog {
    entries: RwLock<Vec<CatalogEntry>>,
}

/// 全局组件目录
static GLOBAL_CATALOG: Lazy<Arc<ComponentCatalog>> = Lazy::new(|| Arc::new(ComponentCatalog::new()));

impl ComponentCatalog {
    /// 创建空目录
    pub fn new() -> Self {
        Self::default()
    }

    /// 进程级全局目录
    pub fn global() -> Arc<ComponentCatalog> {
        Arc::clone(&GLOBAL_CATALOG)
    }

    /// 注册组件
    pub fn register<C: Component>(&self) -> &Self {
        self.push(TypeInfo::of::<C>(), Arc::new(C::descriptor))
    }

    /// 使用自定义工厂注册描述符
    pub fn register_with<F>(&self, factory: F) -> &Self
    where
        F: Fn() -> ComponentDescriptor + Send + Sync + 'static,
    {
        let type_info = *factory().type_info();
        self.push(type_info, Arc::new(factory))
    }

    fn push(&self, type_info: TypeInfo, factory: DescriptorFactory) -> &Self {
        debug!("注册组件到目录: {}", type_info);
        self.entries.write().push(CatalogEntry { type_info, factory });
        self
    }

    /// 按注册顺序生成所有描述符
    pub fn descriptors(&self) -> Vec<ComponentDescriptor> {
        let factories: Vec<DescriptorFactory> = self
            .entries
            .read()
            .iter()
            .map(|entry| Arc::clone(&entry.factory))
            .collect();

        // 在锁外调用工厂
        factories.iter().map(|factory| factory()).collect()
    }

    /// 目录中是否登记了该类型
    pub fn contains<C: 'static>(&self) -> bool {
        let type_info = TypeInfo::of::<C>();
        self.entries
            .read()
            .iter()
            .any(|entry| entry.type_info == type_info)
    }

    /// 已登记的条目数量
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// 目录是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl fmt::Debug for ComponentCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&'static str> = self
            .entries
            .read()
            .iter()
            .map(|entry| entry.type_info.full_name)
            .collect();
        f.debug_struct("ComponentCatalog")
            .field("components", &names)
            .finish()
    }
}

/// 把组件注册到全局目录
///
/// 由 `#[derive(Component)]` 生成的启动函数调用。
pub fn register_component<C: Component>() {
    GLOBAL_CATALOG.register::<C>();
}
