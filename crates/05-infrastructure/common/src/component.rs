//! 组件基础接口定义
//!
//! 提供组件描述符以及声明注入元数据的构建器

use crate::errors::BoxError;
use crate::injection::{
    Autowired, ConstructorArgs, Inject, InjectionError, InjectionKind, InjectionPoint, Instance,
    MemberInjector, MemberReleaser, Resolved,
};
use crate::lifecycle::Lifetime;
use crate::metadata::TypeInfo;
use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 组件基础 trait
///
/// 所有由容器管理的组件都必须实现此 trait，通常通过 `#[derive(Component)]` 生成。
pub trait Component: Send + Sync + 'static {
    /// 组件描述符
    fn descriptor() -> ComponentDescriptor
    where
        Self: Sized;
}

/// 组件构造函数类型
pub type ComponentConstructor =
    Arc<dyn Fn(ConstructorArgs) -> Result<Instance, BoxError> + Send + Sync>;

/// 将具体实例转换为接口类型的函数
pub type InterfaceCast = Arc<dyn Fn(&Instance) -> Option<Resolved> + Send + Sync>;

/// 组件可以满足的类型（自身的具体类型或接口类型）
#[derive(Clone)]
pub struct ProvidedType {
    type_info: TypeInfo,
    cast: InterfaceCast,
}

impl ProvidedType {
    /// 提供的类型
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 将实例转换为该类型
    pub fn cast(&self, instance: &Instance) -> Option<Resolved> {
        (self.cast)(instance)
    }
}

impl fmt::Debug for ProvidedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProvidedType")
            .field(&self.type_info.full_name)
            .finish()
    }
}

/// 组件描述符
///
/// 扫描阶段创建，之后不再修改。
#[derive(Clone)]
pub struct ComponentDescriptor {
    type_info: TypeInfo,
    name: String,
    module_path: &'static str,
    lifetime: Option<Lifetime>,
    marked: bool,
    enabled: bool,
    injection_points: Vec<InjectionPoint>,
    provides: Vec<ProvidedType>,
    constructor: ComponentConstructor,
}

impl ComponentDescriptor {
    /// 开始构建组件 `C` 的描述符
    pub fn builder<C: Send + Sync + 'static>() -> ComponentDescriptorBuilder<C> {
        ComponentDescriptorBuilder::new()
    }

    /// 组件的具体类型
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 组件名称，用于限定名匹配
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 组件所在的模块路径
    pub fn module_path(&self) -> &'static str {
        self.module_path
    }

    /// 生命周期，未声明时默认为单例
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime.unwrap_or_default()
    }

    /// 显式声明（或由约定推断）的生命周期
    pub fn declared_lifetime(&self) -> Option<Lifetime> {
        self.lifetime
    }

    /// 返回设置了生命周期的副本
    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// 是否显式标记为组件
    pub fn is_marked(&self) -> bool {
        self.marked
    }

    /// 是否启用
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 按声明顺序排列的注入点
    pub fn injection_points(&self) -> &[InjectionPoint] {
        &self.injection_points
    }

    /// 构造器注入点
    pub fn constructor_points(&self) -> impl Iterator<Item = &InjectionPoint> {
        self.injection_points
            .iter()
            .filter(|point| point.kind() == InjectionKind::Constructor)
    }

    /// 字段和 setter 注入点
    pub fn member_points(&self) -> impl Iterator<Item = &InjectionPoint> {
        self.injection_points
            .iter()
            .filter(|point| point.kind() != InjectionKind::Constructor)
    }

    /// 组件可以满足的所有类型，第一个总是自身的具体类型
    pub fn provides(&self) -> &[ProvidedType] {
        &self.provides
    }

    /// 查找组件提供的指定类型
    pub fn provided(&self, type_id: TypeId) -> Option<&ProvidedType> {
        self.provides
            .iter()
            .find(|provided| provided.type_info.id == type_id)
    }

    /// 调用构造函数创建实例
    pub fn construct(&self, args: ConstructorArgs) -> Result<Instance, BoxError> {
        (self.constructor)(args)
    }

    /// 清空实例中所有字段注入槽
    pub fn release_members(&self, instance: &Instance) {
        for point in &self.injection_points {
            point.release(instance);
        }
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("type", &self.type_info.full_name)
            .field("name", &self.name)
            .field("module_path", &self.module_path)
            .field("lifetime", &self.lifetime)
            .field("marked", &self.marked)
            .field("enabled", &self.enabled)
            .field("injection_points", &self.injection_points)
            .field("provides", &self.provides)
            .finish()
    }
}

/// 组件描述符构建器
///
/// ```ignore
/// let descriptor = ComponentDescriptor::builder::<QuestionService>()
///     .constructor_arg::<dyn QuestionRepository>("repository")
///     .field::<AnswerService, _>("answers", |service| &service.answers)
///     .build(|args| {
///         Ok(QuestionService {
///             repository: args.next::<dyn QuestionRepository>()?,
///             answers: Autowired::new(),
///         })
///     });
/// ```
pub struct ComponentDescriptorBuilder<C> {
    type_info: TypeInfo,
    name: Option<String>,
    module_path: Option<&'static str>,
    lifetime: Option<Lifetime>,
    marked: bool,
    enabled: bool,
    injection_points: Vec<InjectionPoint>,
    provides: Vec<ProvidedType>,
    _component: PhantomData<fn() -> C>,
}

impl<C: Send + Sync + 'static> ComponentDescriptorBuilder<C> {
    fn new() -> Self {
        Self {
            type_info: TypeInfo::of::<C>(),
            name: None,
            module_path: None,
            lifetime: None,
            marked: false,
            enabled: true,
            injection_points: Vec::new(),
            provides: Vec::new(),
            _component: PhantomData,
        }
    }

    /// 设置组件名称（默认为类型的简短名称）
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 设置模块路径（默认从类型名称推导）
    pub fn module_path(mut self, module_path: &'static str) -> Self {
        self.module_path = Some(module_path);
        self
    }

    /// 声明生命周期
    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// 显式标记为组件
    pub fn marked(mut self) -> Self {
        self.marked = true;
        self
    }

    /// 禁用组件，扫描时会被跳过
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// 声明构造器注入点，按调用顺序对应 [`ConstructorArgs`] 中的参数
    pub fn constructor_arg<D: ?Sized + Send + Sync + 'static>(
        mut self,
        inject: impl Into<Inject>,
    ) -> Self {
        self.injection_points
            .push(InjectionPoint::constructor(TypeInfo::of::<D>(), inject.into()));
        self
    }

    /// 声明字段注入点
    pub fn field<D, F>(mut self, inject: impl Into<Inject>, slot: F) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
        F: for<'a> Fn(&'a C) -> &'a Autowired<D> + Send + Sync + 'static,
    {
        let slot = Arc::new(slot);

        let wire = Arc::clone(&slot);
        let injector: MemberInjector = Arc::new(move |target, dependency| {
            let component = downcast_target::<C>(target)?;
            if let Some(dependency) = dependency {
                (*wire)(component).wire(dependency.downcast::<D>()?);
            }
            Ok(())
        });

        let releaser: MemberReleaser = Arc::new(move |target| {
            if let Ok(component) = downcast_target::<C>(target) {
                (*slot)(component).clear();
            }
        });

        self.injection_points.push(InjectionPoint::member(
            InjectionKind::Field,
            TypeInfo::of::<D>(),
            inject.into(),
            injector,
            Some(releaser),
        ));
        self
    }

    /// 声明 setter 注入点
    ///
    /// 可选依赖未解析时 setter 不会被调用。
    pub fn setter<D, F>(mut self, inject: impl Into<Inject>, setter: F) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
        F: Fn(&C, Arc<D>) + Send + Sync + 'static,
    {
        let injector: MemberInjector = Arc::new(move |target, dependency| {
            let component = downcast_target::<C>(target)?;
            if let Some(dependency) = dependency {
                setter(component, dependency.downcast::<D>()?);
            }
            Ok(())
        });

        self.injection_points.push(InjectionPoint::member(
            InjectionKind::Setter,
            TypeInfo::of::<D>(),
            inject.into(),
            injector,
            None,
        ));
        self
    }

    /// 声明组件实现的接口类型
    pub fn provides<I, F>(mut self, cast: F) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<C>) -> Arc<I> + Send + Sync + 'static,
    {
        self.provides.push(ProvidedType {
            type_info: TypeInfo::of::<I>(),
            cast: Arc::new(move |instance| {
                Arc::clone(instance)
                    .downcast::<C>()
                    .ok()
                    .map(|component| Resolved::new(cast(component)))
            }),
        });
        self
    }

    /// 使用构造函数完成构建
    pub fn build<F>(self, constructor: F) -> ComponentDescriptor
    where
        F: Fn(&mut ConstructorArgs) -> Result<C, BoxError> + Send + Sync + 'static,
    {
        let mut provides = Vec::with_capacity(self.provides.len() + 1);
        provides.push(ProvidedType {
            type_info: self.type_info,
            cast: Arc::new(|instance| {
                Arc::clone(instance)
                    .downcast::<C>()
                    .ok()
                    .map(Resolved::new)
            }),
        });
        provides.extend(self.provides);

        ComponentDescriptor {
            name: self
                .name
                .unwrap_or_else(|| self.type_info.short_name().to_string()),
            module_path: self
                .module_path
                .unwrap_or_else(|| self.type_info.module_path()),
            type_info: self.type_info,
            lifetime: self.lifetime,
            marked: self.marked,
            enabled: self.enabled,
            injection_points: self.injection_points,
            provides,
            constructor: Arc::new(move |mut args| {
                let component = constructor(&mut args)?;
                Ok(Arc::new(component) as Instance)
            }),
        }
    }

    /// 使用 `Default` 作为构造函数完成构建
    pub fn build_default(self) -> ComponentDescriptor
    where
        C: Default,
    {
        self.build(|_| Ok(C::default()))
    }
}

fn downcast_target<C: 'static>(target: &Instance) -> Result<&C, InjectionError> {
    target
        .downcast_ref::<C>()
        .ok_or(InjectionError::TargetMismatch {
            expected: std::any::type_name::<C>(),
        })
}
