//! 单例实例注册表
//!
//! 保存已创建的单例。条目在首次解析时创建，只在回滚或容器拆除时移除。

use crate::graph::NodeId;
use infrastructure_common::{ComponentDescriptor, Instance};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// 注册表中的条目
#[derive(Clone)]
pub struct RegisteredInstance {
    /// 所属节点
    pub node: NodeId,
    /// 组件描述符
    pub descriptor: Arc<ComponentDescriptor>,
    /// 实例
    pub instance: Instance,
}

/// 回滚点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// 单例实例注册表
///
/// 按创建顺序记录条目，回滚和拆除都按相反顺序进行。
/// 拆除时先清空所有字段注入槽再释放实例，字段注入形成的环因此能够被回收。
/// setter 持有的引用不会被清空。
#[derive(Default)]
pub struct InstanceRegistry {
    parent: Option<Arc<InstanceRegistry>>,
    entries: HashMap<NodeId, RegisteredInstance>,
    order: Vec<NodeId>,
}

impl InstanceRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建叠加在已冻结注册表之上的临时注册表
    ///
    /// 查找先查自身再查父注册表，写入只进入自身。
    pub fn layered(parent: Arc<InstanceRegistry>) -> Self {
        Self {
            parent: Some(parent),
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// 获取节点的实例
    pub fn get(&self, node: NodeId) -> Option<&Instance> {
        self.entries
            .get(&node)
            .map(|entry| &entry.instance)
            .or_else(|| self.parent.as_ref().and_then(|parent| parent.get(node)))
    }

    /// 是否已有节点的实例
    pub fn contains(&self, node: NodeId) -> bool {
        self.get(node).is_some()
    }

    /// 注册实例，节点已存在时返回 `false` 且不覆盖
    pub fn insert(
        &mut self,
        node: NodeId,
        descriptor: Arc<ComponentDescriptor>,
        instance: Instance,
    ) -> bool {
        if self.contains(node) {
            return false;
        }

        trace!("注册单例实例: {}", descriptor.name());
        self.entries.insert(
            node,
            RegisteredInstance {
                node,
                descriptor,
                instance,
            },
        );
        self.order.push(node);
        true
    }

    /// 记录回滚点
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.order.len())
    }

    /// 移除回滚点之后注册的所有实例，返回移除的数量
    pub fn rollback(&mut self, checkpoint: Checkpoint) -> usize {
        if checkpoint.0 >= self.order.len() {
            return 0;
        }

        let removed: Vec<NodeId> = self.order.drain(checkpoint.0..).rev().collect();
        let released = self.release(&removed);
        debug!("回滚 {} 个单例实例", released);
        released
    }

    /// 自身持有的实例数量（不含父注册表）
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// 自身是否为空
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 按创建顺序遍历自身持有的实例
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredInstance> {
        self.order.iter().filter_map(|node| self.entries.get(node))
    }

    /// 释放所有实例
    pub fn clear(&mut self) {
        let all: Vec<NodeId> = self.order.drain(..).rev().collect();
        let released = self.release(&all);
        if released > 0 {
            debug!("释放 {} 个单例实例", released);
        }
    }

    fn release(&mut self, nodes: &[NodeId]) -> usize {
        for node in nodes {
            if let Some(entry) = self.entries.get(node) {
                entry.descriptor.release_members(&entry.instance);
            }
        }

        nodes
            .iter()
            .filter_map(|node| self.entries.remove(node))
            .count()
    }
}

impl Drop for InstanceRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|entry| entry.descriptor.name()).collect();
        f.debug_struct("InstanceRegistry")
            .field("instances", &names)
            .field("layered", &self.parent.is_some())
            .finish()
    }
}
