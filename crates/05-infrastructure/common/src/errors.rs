//! 错误类型定义

use std::sync::Arc;
use thiserror::Error;

/// 组件构造或注入过程中产生的底层错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

/// 依赖注入错误类型
///
/// 所有变体都可以克隆：扫描和构建阶段的失败会被容器记住，
/// 之后的每次 `get_instance` 调用都原样返回同一个错误。
#[derive(Error, Debug, Clone)]
pub enum DependencyError {
    #[error("组件扫描失败: {root}, 原因: {message}")]
    Scan { root: String, message: String },

    #[error("无法解析依赖: {type_name}{}", describe_origin(.qualifier, .required_by))]
    UnresolvedDependency {
        type_name: String,
        qualifier: Option<String>,
        required_by: Option<String>,
    },

    #[error("依赖存在多个候选: {type_name}{}, 候选组件: {}", describe_origin(.qualifier, .required_by), join_names(.candidates))]
    AmbiguousDependency {
        type_name: String,
        qualifier: Option<String>,
        required_by: Option<String>,
        candidates: Vec<String>,
    },

    #[error("循环依赖检测到: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("组件创建失败: {type_name}, 原因: {source}")]
    Instantiation {
        type_name: String,
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    #[error("组件注册失败: {type_name}, 原因: {message}")]
    Registration { type_name: String, message: String },
}

impl DependencyError {
    /// 创建扫描错误
    pub fn scan(root: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Scan {
            root: root.into(),
            message: message.into(),
        }
    }

    /// 创建实例化错误，包装原始原因
    pub fn instantiation(type_name: impl Into<String>, source: BoxError) -> Self {
        Self::Instantiation {
            type_name: type_name.into(),
            source: Arc::from(source),
        }
    }

    /// 是否为扫描或构建阶段的配置错误
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, Self::Instantiation { .. })
    }
}

fn describe_origin(qualifier: &Option<String>, required_by: &Option<String>) -> String {
    let mut origin = String::new();
    if let Some(qualifier) = qualifier {
        origin.push_str(&format!(" (限定名: {qualifier})"));
    }
    if let Some(required_by) = required_by {
        origin.push_str(&format!(" (被 {required_by} 依赖)"));
    }
    origin
}

fn join_names(names: &[String]) -> String {
    names.join(", ")
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
