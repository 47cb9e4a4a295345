//! 注入点定义
//!
//! 描述依赖需要被注入的位置：构造器参数、字段或 setter。

use crate::errors::BoxError;
use crate::metadata::TypeInfo;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// 类型擦除后的组件实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 将依赖写入已构造实例的函数
pub type MemberInjector = Arc<dyn Fn(&Instance, Option<Resolved>) -> Result<(), BoxError> + Send + Sync>;

/// 清理实例中已注入字段的函数，用于拆除容器时打破引用环
pub type MemberReleaser = Arc<dyn Fn(&Instance) + Send + Sync>;

/// 注入类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InjectionKind {
    /// 构造器注入：实例创建之前必须就绪
    Constructor,
    /// 字段注入：实例创建之后填充
    Field,
    /// setter 注入：实例创建之后调用
    Setter,
}

impl InjectionKind {
    /// 是否为构造器边（硬依赖）
    pub fn is_constructor(self) -> bool {
        self == Self::Constructor
    }
}

impl fmt::Display for InjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constructor => f.write_str("constructor"),
            Self::Field => f.write_str("field"),
            Self::Setter => f.write_str("setter"),
        }
    }
}

/// 注入选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inject {
    /// 成员名称（参数名、字段名或 setter 方法名）
    pub member: String,
    /// 是否可选
    pub optional: bool,
    /// 限定组件名称
    pub qualifier: Option<String>,
}

impl Inject {
    /// 创建新的注入选项
    pub fn new(member: impl Into<String>) -> Self {
        Self {
            member: member.into(),
            optional: false,
            qualifier: None,
        }
    }

    /// 标记为可选依赖
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// 设置限定组件名称
    pub fn qualifier(mut self, name: impl Into<String>) -> Self {
        self.qualifier = Some(name.into());
        self
    }
}

impl From<&str> for Inject {
    fn from(member: &str) -> Self {
        Self::new(member)
    }
}

impl From<String> for Inject {
    fn from(member: String) -> Self {
        Self::new(member)
    }
}

/// 注入点
///
/// 由所属的 [`ComponentDescriptor`](crate::ComponentDescriptor) 独占。
#[derive(Clone)]
pub struct InjectionPoint {
    kind: InjectionKind,
    required: TypeInfo,
    options: Inject,
    injector: Option<MemberInjector>,
    releaser: Option<MemberReleaser>,
}

impl InjectionPoint {
    pub(crate) fn constructor(required: TypeInfo, options: Inject) -> Self {
        Self {
            kind: InjectionKind::Constructor,
            required,
            options,
            injector: None,
            releaser: None,
        }
    }

    pub(crate) fn member(
        kind: InjectionKind,
        required: TypeInfo,
        options: Inject,
        injector: MemberInjector,
        releaser: Option<MemberReleaser>,
    ) -> Self {
        Self {
            kind,
            required,
            options,
            injector: Some(injector),
            releaser,
        }
    }

    /// 注入类型
    pub fn kind(&self) -> InjectionKind {
        self.kind
    }

    /// 所需的依赖类型
    pub fn required(&self) -> &TypeInfo {
        &self.required
    }

    /// 成员名称
    pub fn member_name(&self) -> &str {
        &self.options.member
    }

    /// 是否可选
    pub fn is_optional(&self) -> bool {
        self.options.optional
    }

    /// 限定组件名称
    pub fn qualifier(&self) -> Option<&str> {
        self.options.qualifier.as_deref()
    }

    /// 将依赖写入已构造的实例（仅字段和 setter 注入点）
    pub fn inject(&self, target: &Instance, dependency: Option<Resolved>) -> Result<(), BoxError> {
        match &self.injector {
            Some(injector) => injector(target, dependency),
            None => Err(Box::new(InjectionError::NotAMember {
                member: self.options.member.clone(),
            })),
        }
    }

    /// 清理实例中的注入字段
    pub fn release(&self, target: &Instance) {
        if let Some(releaser) = &self.releaser {
            releaser(target);
        }
    }
}

impl fmt::Debug for InjectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionPoint")
            .field("kind", &self.kind)
            .field("required", &self.required.full_name)
            .field("member", &self.options.member)
            .field("optional", &self.options.optional)
            .field("qualifier", &self.options.qualifier)
            .finish()
    }
}

/// 注入过程中的类型错误
#[derive(Error, Debug)]
pub enum InjectionError {
    #[error("构造器参数不足: 第 {position} 个参数不存在")]
    ArgumentsExhausted { position: usize },

    #[error("必需的依赖缺失: {expected}")]
    MissingRequired { expected: &'static str },

    #[error("依赖类型不匹配: 期望 {expected}")]
    TypeMismatch { expected: &'static str },

    #[error("目标实例类型不匹配: 期望 {expected}")]
    TargetMismatch { expected: &'static str },

    #[error("注入点 {member} 不是字段或 setter")]
    NotAMember { member: String },
}

/// 已解析并转换为所需类型的依赖
///
/// 内部保存 `Arc<T>`，其中 `T` 可以是具体类型或 `dyn Trait`。
pub struct Resolved(Box<dyn Any + Send + Sync>);

impl Resolved {
    /// 包装一个已转换的依赖
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self(Box::new(value))
    }

    /// 取回 `Arc<T>`
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(self) -> Result<Arc<T>, InjectionError> {
        self.0
            .downcast::<Arc<T>>()
            .map(|boxed| *boxed)
            .map_err(|_| InjectionError::TypeMismatch {
                expected: std::any::type_name::<T>(),
            })
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolved(..)")
    }
}

/// 构造器参数
///
/// 按注入点声明顺序依次取出依赖。
#[derive(Debug)]
pub struct ConstructorArgs {
    values: std::vec::IntoIter<Option<Resolved>>,
    position: usize,
}

impl ConstructorArgs {
    /// 创建构造器参数
    pub fn new(values: Vec<Option<Resolved>>) -> Self {
        Self {
            values: values.into_iter(),
            position: 0,
        }
    }

    /// 取出下一个必需依赖
    pub fn next<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<T>, InjectionError> {
        self.next_optional::<T>()?
            .ok_or(InjectionError::MissingRequired {
                expected: std::any::type_name::<T>(),
            })
    }

    /// 取出下一个可选依赖
    pub fn next_optional<T: ?Sized + Send + Sync + 'static>(
        &mut self,
    ) -> Result<Option<Arc<T>>, InjectionError> {
        self.position += 1;
        match self.values.next() {
            None => Err(InjectionError::ArgumentsExhausted {
                position: self.position,
            }),
            Some(None) => Ok(None),
            Some(Some(resolved)) => resolved.downcast::<T>().map(Some),
        }
    }
}

/// 字段注入槽
///
/// 实例创建后由容器填充；容器拆除时会被清空，
/// 因此字段注入形成的引用环不会泄漏。
pub struct Autowired<T: ?Sized> {
    slot: RwLock<Option<Arc<T>>>,
}

impl<T: ?Sized> Autowired<T> {
    /// 创建空的注入槽
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// 获取已注入的依赖
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.read().clone()
    }

    /// 是否已注入
    pub fn is_wired(&self) -> bool {
        self.slot.read().is_some()
    }

    /// 写入依赖
    pub fn wire(&self, value: Arc<T>) {
        *self.slot.write() = Some(value);
    }

    /// 清空注入槽，返回原有的依赖
    pub fn clear(&self) -> Option<Arc<T>> {
        self.slot.write().take()
    }
}

impl<T: ?Sized> Default for Autowired<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Autowired<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Autowired")
            .field("type", &std::any::type_name::<T>())
            .field("wired", &self.is_wired())
            .finish()
    }
}
