//! 应用上下文

use crate::builder::ApplicationContextBuilder;
use crate::settings::ContainerSettings;
use di_abstractions::{ContainerStats, DiContainer};
use di_impl::Container;
use infrastructure_common::{ContainerState, DependencyResult};
use std::sync::Arc;
use tracing::info;

/// 应用上下文
///
/// 持有已配置的容器和加载得到的配置。
/// 容器通过 `Arc` 共享，可以在多个线程或任务之间传递。
#[derive(Debug, Clone)]
pub struct ApplicationContext {
    container: Arc<Container>,
    settings: ContainerSettings,
}

impl ApplicationContext {
    /// 创建应用上下文构建器
    pub fn builder() -> ApplicationContextBuilder {
        ApplicationContextBuilder::new()
    }

    pub(crate) fn new(container: Container, settings: ContainerSettings) -> Self {
        Self {
            container: Arc::new(container),
            settings,
        }
    }

    /// 获取容器
    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// 获取配置
    pub fn settings(&self) -> &ContainerSettings {
        &self.settings
    }

    /// 按类型获取组件
    pub fn get_instance<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.container.get_instance::<T>()
    }

    /// 按组件名称获取组件
    pub fn get_named<T>(&self, name: &str) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.container.get_named::<T>(name)
    }

    /// 容器状态
    pub fn state(&self) -> ContainerState {
        self.container.state()
    }

    /// 容器统计信息
    pub fn stats(&self) -> ContainerStats {
        self.container.stats()
    }

    /// 关闭上下文
    ///
    /// 仍有其他 `Arc<Container>` 持有者时，单例在最后一个持有者释放时才被清理。
    pub fn shutdown(self) {
        let stats = self.container.stats();
        info!(
            "关闭应用上下文: {} 个组件, {} 个单例",
            stats.registered_components, stats.singleton_instances
        );
        drop(self.container);
    }
}
