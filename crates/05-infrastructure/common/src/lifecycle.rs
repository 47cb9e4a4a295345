//! 组件生命周期管理

use std::fmt;

/// 组件生命周期类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
    /// 单例模式 - 容器生命周期内只创建一个实例
    #[default]
    Singleton,
    /// 原型模式 - 每次请求或注入都创建新实例
    Prototype,
}

impl Lifetime {
    /// 从字符串解析生命周期（用于宏参数和配置）
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "singleton" => Some(Self::Singleton),
            "prototype" | "transient" => Some(Self::Prototype),
            _ => None,
        }
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singleton => f.write_str("singleton"),
            Self::Prototype => f.write_str("prototype"),
        }
    }
}

/// 容器生命周期状态
///
/// 正常流转: `Uninitialized -> Scanned -> Built -> Ready`。
/// `ScanFailed` 和 `BuildFailed` 为终止状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerState {
    /// 未初始化
    #[default]
    Uninitialized,
    /// 已扫描组件
    Scanned,
    /// 依赖图已构建
    Built,
    /// 所有单例已创建，可以并发读取
    Ready,
    /// 扫描失败
    ScanFailed,
    /// 依赖图构建失败
    BuildFailed,
}

impl ContainerState {
    /// 是否为终止的失败状态
    pub fn is_failed(self) -> bool {
        matches!(self, Self::ScanFailed | Self::BuildFailed)
    }
}
