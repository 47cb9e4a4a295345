//! 容器端到端集成测试
//!
//! 每个测试使用独立的组件目录，组件以 `module_path` 区分扫描范围。

use di_abstractions::{ContainerConfig, DiContainer};
use di_impl::Container;
use infrastructure_common::{
    Autowired, BoxError, ComponentCatalog, ComponentDescriptor, ContainerState, DependencyError,
    Inject, Lifetime,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

fn container(root: &str, catalog: ComponentCatalog) -> Container {
    Container::with_catalog(ContainerConfig::new(root), Arc::new(catalog))
}

/// 构造器依赖 A -> B
mod constructor {
    use super::*;

    #[derive(Debug, Default)]
    pub struct B;

    #[derive(Debug)]
    pub struct A {
        pub b: Arc<B>,
    }

    pub fn catalog() -> ComponentCatalog {
        let catalog = ComponentCatalog::new();
        catalog
            .register_with(|| {
                ComponentDescriptor::builder::<A>()
                    .module_path("scenarios::constructor")
                    .constructor_arg::<B>("b")
                    .build(|args| Ok(A { b: args.next::<B>()? }))
            })
            .register_with(|| {
                ComponentDescriptor::builder::<B>()
                    .module_path("scenarios::constructor")
                    .marked()
                    .build_default()
            });
        catalog
    }
}

#[test]
fn test_constructor_dependency_is_the_shared_singleton() {
    let container = container("scenarios::constructor", constructor::catalog());

    let a = container.get_instance::<constructor::A>().unwrap();
    let b = container.get_instance::<constructor::B>().unwrap();

    assert!(Arc::ptr_eq(&a.b, &b));
    assert!(Arc::ptr_eq(&a, &container.get_instance::<constructor::A>().unwrap()));
    assert_eq!(container.state(), ContainerState::Ready);
}

/// 构造器互相依赖
mod constructor_cycle {
    use super::*;

    pub struct A {
        _b: Arc<B>,
    }

    pub struct B {
        _a: Arc<A>,
    }

    pub fn catalog() -> ComponentCatalog {
        let catalog = ComponentCatalog::new();
        catalog
            .register_with(|| {
                ComponentDescriptor::builder::<A>()
                    .module_path("scenarios::constructor_cycle")
                    .constructor_arg::<B>("b")
                    .build(|args| Ok(A { _b: args.next::<B>()? }))
            })
            .register_with(|| {
                ComponentDescriptor::builder::<B>()
                    .module_path("scenarios::constructor_cycle")
                    .constructor_arg::<A>("a")
                    .build(|args| Ok(B { _a: args.next::<A>()? }))
            });
        catalog
    }
}

#[test]
fn test_constructor_cycle_fails_the_build() {
    let container = container("scenarios::constructor_cycle", constructor_cycle::catalog());

    let error = container.get_instance::<constructor_cycle::A>().err().unwrap();
    match &error {
        DependencyError::CircularDependency { dependency_chain } => {
            assert!(
                dependency_chain == "A -> B -> A" || dependency_chain == "B -> A -> B",
                "{dependency_chain}"
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(container.state(), ContainerState::BuildFailed);

    // 失败状态是粘滞的
    let again = container.get_instance::<constructor_cycle::B>().err().unwrap();
    assert_eq!(again.to_string(), error.to_string());
    assert_eq!(container.state(), ContainerState::BuildFailed);
}

/// 同一接口的多个实现
mod ambiguous {
    use super::*;

    pub trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    #[derive(Default)]
    pub struct English;

    impl Greeter for English {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    #[derive(Default)]
    pub struct French;

    impl Greeter for French {
        fn greet(&self) -> &'static str {
            "bonjour"
        }
    }

    pub struct Host {
        pub greeter: Arc<dyn Greeter>,
    }

    pub fn catalog(qualifier: Option<&'static str>) -> ComponentCatalog {
        let catalog = ComponentCatalog::new();
        catalog
            .register_with(|| {
                ComponentDescriptor::builder::<English>()
                    .module_path("scenarios::ambiguous")
                    .marked()
                    .provides::<dyn Greeter, _>(|english| -> Arc<dyn Greeter> { english })
                    .build_default()
            })
            .register_with(|| {
                ComponentDescriptor::builder::<French>()
                    .name("french")
                    .module_path("scenarios::ambiguous")
                    .marked()
                    .provides::<dyn Greeter, _>(|french| -> Arc<dyn Greeter> { french })
                    .build_default()
            })
            .register_with(move || {
                let inject = qualifier.map_or_else(
                    || Inject::new("greeter"),
                    |name| Inject::new("greeter").qualifier(name),
                );
                ComponentDescriptor::builder::<Host>()
                    .module_path("scenarios::ambiguous")
                    .constructor_arg::<dyn Greeter>(inject)
                    .build(|args| {
                        Ok(Host {
                            greeter: args.next::<dyn Greeter>()?,
                        })
                    })
            });
        catalog
    }
}

#[test]
fn test_two_implementations_are_ambiguous() {
    let container = container("scenarios::ambiguous", ambiguous::catalog(None));

    match container.get_instance::<ambiguous::Host>().err().unwrap() {
        DependencyError::AmbiguousDependency {
            type_name,
            required_by,
            mut candidates,
            ..
        } => {
            assert!(type_name.contains("Greeter"));
            assert_eq!(required_by.as_deref(), Some("Host"));
            candidates.sort();
            assert_eq!(candidates, vec!["English".to_string(), "french".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(container.state(), ContainerState::BuildFailed);
}

#[test]
fn test_qualifier_selects_one_implementation() {
    let container = container("scenarios::ambiguous", ambiguous::catalog(Some("french")));

    let host = container.get_instance::<ambiguous::Host>().unwrap();
    assert_eq!(host.greeter.greet(), "bonjour");

    let english = container
        .get_named::<dyn ambiguous::Greeter>("English")
        .unwrap();
    assert_eq!(english.greet(), "hello");

    assert!(matches!(
        container.get_instance::<dyn ambiguous::Greeter>(),
        Err(DependencyError::AmbiguousDependency { .. })
    ));
}

#[test]
fn test_unregistered_type_is_unresolved() {
    struct NeverRegistered;

    let container = container("scenarios::constructor", constructor::catalog());

    match container.get_instance::<NeverRegistered>().err().unwrap() {
        DependencyError::UnresolvedDependency {
            type_name,
            required_by,
            ..
        } => {
            assert!(type_name.contains("NeverRegistered"));
            assert!(required_by.is_none());
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(container.try_get_instance::<NeverRegistered>().unwrap().is_none());
    assert!(!container.contains::<NeverRegistered>());
    assert_eq!(container.state(), ContainerState::Ready);
}

#[test]
fn test_missing_dependency_names_the_type() {
    struct Missing;
    struct NeedsMissing;

    let catalog = ComponentCatalog::new();
    catalog.register_with(|| {
        ComponentDescriptor::builder::<NeedsMissing>()
            .module_path("scenarios::missing")
            .constructor_arg::<Missing>("missing")
            .build(|args| {
                args.next::<Missing>()?;
                Ok(NeedsMissing)
            })
    });
    let container = container("scenarios::missing", catalog);

    match container.get_instance::<NeedsMissing>().err().unwrap() {
        DependencyError::UnresolvedDependency {
            type_name,
            required_by,
            ..
        } => {
            assert!(type_name.contains("Missing"));
            assert_eq!(required_by.as_deref(), Some("NeedsMissing"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(container.state(), ContainerState::BuildFailed);
}

/// 字段注入形成的环
mod field_cycle {
    use super::*;

    #[derive(Default)]
    pub struct A {
        pub b: Autowired<B>,
    }

    #[derive(Default)]
    pub struct B {
        pub c: Autowired<C>,
        pub a: Autowired<A>,
    }

    #[derive(Default)]
    pub struct C {
        pub a: Autowired<A>,
    }

    pub fn catalog(three_nodes: bool) -> ComponentCatalog {
        let catalog = ComponentCatalog::new();
        catalog
            .register_with(|| {
                ComponentDescriptor::builder::<A>()
                    .module_path("scenarios::field_cycle")
                    .field::<B, _>("b", |a| &a.b)
                    .build_default()
            })
            .register_with(move || {
                let builder = ComponentDescriptor::builder::<B>().module_path("scenarios::field_cycle");
                if three_nodes {
                    builder.field::<C, _>("c", |b| &b.c).build_default()
                } else {
                    builder.field::<A, _>("a", |b| &b.a).build_default()
                }
            });
        if three_nodes {
            catalog.register_with(|| {
                ComponentDescriptor::builder::<C>()
                    .module_path("scenarios::field_cycle")
                    .field::<A, _>("a", |c| &c.a)
                    .build_default()
            });
        }
        catalog
    }
}

#[test]
fn test_two_node_field_cycle_round_trip() {
    let container = container("scenarios::field_cycle", field_cycle::catalog(false));

    let a = container.get_instance::<field_cycle::A>().unwrap();
    let b = container.get_instance::<field_cycle::B>().unwrap();

    assert!(Arc::ptr_eq(&a.b.get().unwrap(), &b));
    assert!(Arc::ptr_eq(&b.a.get().unwrap(), &a));
}

#[test]
fn test_three_node_field_cycle_round_trip() {
    let container = container("scenarios::field_cycle", field_cycle::catalog(true));

    let a = container.get_instance::<field_cycle::A>().unwrap();
    let b = container.get_instance::<field_cycle::B>().unwrap();
    let c = container.get_instance::<field_cycle::C>().unwrap();

    assert!(Arc::ptr_eq(&a.b.get().unwrap(), &b));
    assert!(Arc::ptr_eq(&b.c.get().unwrap(), &c));
    assert!(Arc::ptr_eq(&c.a.get().unwrap(), &a));
    assert!(!b.a.is_wired());
    assert_eq!(container.stats().singleton_instances, 3);
}

#[test]
fn test_teardown_releases_field_cycle() {
    let container = container("scenarios::field_cycle", field_cycle::catalog(true));

    let (a, c): (Weak<field_cycle::A>, Weak<field_cycle::C>) = {
        let a = container.get_instance::<field_cycle::A>().unwrap();
        let c = container.get_instance::<field_cycle::C>().unwrap();
        (Arc::downgrade(&a), Arc::downgrade(&c))
    };
    assert!(a.upgrade().is_some());

    drop(container);

    assert!(a.upgrade().is_none());
    assert!(c.upgrade().is_none());
}

/// 字段依赖绕回正在解析构造器参数的单例: Z 字段 -> X, X 构造器 -> Y, Y 字段 -> X
mod mixed_cycle {
    use super::*;

    pub static X_CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

    #[derive(Default)]
    pub struct Z {
        pub x: Autowired<X>,
    }

    pub struct X {
        pub y: Arc<Y>,
    }

    #[derive(Default)]
    pub struct Y {
        pub x: Autowired<X>,
    }

    pub fn catalog() -> ComponentCatalog {
        let catalog = ComponentCatalog::new();
        catalog
            .register_with(|| {
                ComponentDescriptor::builder::<Z>()
                    .module_path("scenarios::mixed_cycle")
                    .field::<X, _>("x", |z| &z.x)
                    .build_default()
            })
            .register_with(|| {
                ComponentDescriptor::builder::<X>()
                    .module_path("scenarios::mixed_cycle")
                    .constructor_arg::<Y>("y")
                    .build(|args| {
                        X_CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
                        Ok(X { y: args.next::<Y>()? })
                    })
            })
            .register_with(|| {
                ComponentDescriptor::builder::<Y>()
                    .module_path("scenarios::mixed_cycle")
                    .field::<X, _>("x", |y| &y.x)
                    .build_default()
            });
        catalog
    }
}

#[test]
fn test_field_cycle_through_constructor_builds_each_singleton_once() {
    let container = container("scenarios::mixed_cycle", mixed_cycle::catalog());

    let z = container.get_instance::<mixed_cycle::Z>().unwrap();
    let x = container.get_instance::<mixed_cycle::X>().unwrap();
    let y = container.get_instance::<mixed_cycle::Y>().unwrap();

    assert_eq!(mixed_cycle::X_CONSTRUCTED.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&z.x.get().unwrap(), &x));
    assert!(Arc::ptr_eq(&y.x.get().unwrap(), &x));
    assert!(Arc::ptr_eq(&x.y, &y));
    assert_eq!(container.stats().singleton_instances, 3);
}

/// setter 注入与可选依赖
mod members {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    pub struct Clock;

    pub struct Audit;

    #[derive(Default)]
    pub struct Scheduler {
        pub clock: Mutex<Option<Arc<Clock>>>,
        pub audit: Mutex<Option<Arc<Audit>>>,
        pub fallback: Autowired<Audit>,
    }

    impl Scheduler {
        pub fn set_clock(&self, clock: Arc<Clock>) {
            *self.clock.lock() = Some(clock);
        }

        pub fn set_audit(&self, audit: Arc<Audit>) {
            *self.audit.lock() = Some(audit);
        }
    }

    pub struct Reporter {
        pub audit: Option<Arc<Audit>>,
        pub clock: Arc<Clock>,
    }

    pub fn catalog() -> ComponentCatalog {
        let catalog = ComponentCatalog::new();
        catalog
            .register_with(|| {
                ComponentDescriptor::builder::<Clock>()
                    .module_path("scenarios::members")
                    .marked()
                    .build_default()
            })
            .register_with(|| {
                ComponentDescriptor::builder::<Scheduler>()
                    .module_path("scenarios::members")
                    .setter::<Clock, _>("set_clock", Scheduler::set_clock)
                    .setter::<Audit, _>(Inject::new("set_audit").optional(), Scheduler::set_audit)
                    .field::<Audit, _>(Inject::new("fallback").optional(), |s| &s.fallback)
                    .build_default()
            })
            .register_with(|| {
                ComponentDescriptor::builder::<Reporter>()
                    .module_path("scenarios::members")
                    .constructor_arg::<Audit>(Inject::new("audit").optional())
                    .constructor_arg::<Clock>("clock")
                    .build(|args| {
                        Ok(Reporter {
                            audit: args.next_optional::<Audit>()?,
                            clock: args.next::<Clock>()?,
                        })
                    })
            });
        catalog
    }
}

#[test]
fn test_setter_injection() {
    let container = container("scenarios::members", members::catalog());

    let scheduler = container.get_instance::<members::Scheduler>().unwrap();
    let clock = container.get_instance::<members::Clock>().unwrap();

    let injected = scheduler.clock.lock().clone().unwrap();
    assert!(Arc::ptr_eq(&injected, &clock));
}

#[test]
fn test_optional_points_left_empty() {
    let container = container("scenarios::members", members::catalog());

    let scheduler = container.get_instance::<members::Scheduler>().unwrap();
    assert!(scheduler.audit.lock().is_none());
    assert!(!scheduler.fallback.is_wired());

    let reporter = container.get_instance::<members::Reporter>().unwrap();
    assert!(reporter.audit.is_none());
    assert!(Arc::ptr_eq(
        &reporter.clock,
        &container.get_instance::<members::Clock>().unwrap()
    ));
}

/// 原型组件
mod prototype {
    use super::*;

    #[derive(Default)]
    pub struct Config;

    pub struct Session {
        pub config: Arc<Config>,
    }

    #[derive(Default)]
    pub struct Loop {
        pub again: Autowired<Loop>,
    }

    pub fn catalog(with_loop: bool) -> ComponentCatalog {
        let catalog = ComponentCatalog::new();
        catalog
            .register_with(|| {
                ComponentDescriptor::builder::<Config>()
                    .module_path("scenarios::prototype")
                    .marked()
                    .build_default()
            })
            .register_with(|| {
                ComponentDescriptor::builder::<Session>()
                    .module_path("scenarios::prototype")
                    .lifetime(Lifetime::Prototype)
                    .constructor_arg::<Config>("config")
                    .build(|args| {
                        Ok(Session {
                            config: args.next::<Config>()?,
                        })
                    })
            });
        if with_loop {
            catalog.register_with(|| {
                ComponentDescriptor::builder::<Loop>()
                    .module_path("scenarios::prototype")
                    .lifetime(Lifetime::Prototype)
                    .field::<Loop, _>("again", |l| &l.again)
                    .build_default()
            });
        }
        catalog
    }
}

#[test]
fn test_prototype_creates_new_instances_with_shared_singletons() {
    let container = container("scenarios::prototype", prototype::catalog(false));

    let first = container.get_instance::<prototype::Session>().unwrap();
    let second = container.get_instance::<prototype::Session>().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first.config, &second.config));
    assert_eq!(container.stats().singleton_instances, 1);
}

#[test]
fn test_prototype_field_cycle_is_rejected() {
    let container = container("scenarios::prototype", prototype::catalog(true));

    assert!(matches!(
        container.get_instance::<prototype::Session>(),
        Err(DependencyError::CircularDependency { .. })
    ));
    assert_eq!(container.state(), ContainerState::BuildFailed);
}

/// 实例化失败后回滚并允许重试
mod flaky {
    use super::*;

    pub static READY: AtomicBool = AtomicBool::new(false);
    pub static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

    #[derive(Default)]
    pub struct Pool;

    pub struct Database {
        pub pool: Arc<Pool>,
    }

    pub struct Repository {
        pub database: Arc<Database>,
    }

    pub fn catalog() -> ComponentCatalog {
        let catalog = ComponentCatalog::new();
        catalog
            .register_with(|| {
                ComponentDescriptor::builder::<Pool>()
                    .module_path("scenarios::flaky")
                    .marked()
                    .build(|_| {
                        CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
                        Ok(Pool)
                    })
            })
            .register_with(|| {
                ComponentDescriptor::builder::<Database>()
                    .module_path("scenarios::flaky")
                    .constructor_arg::<Pool>("pool")
                    .build(|args| {
                        let pool = args.next::<Pool>()?;
                        if !READY.load(Ordering::SeqCst) {
                            return Err::<Database, BoxError>("数据库尚未启动".into());
                        }
                        Ok(Database { pool })
                    })
            })
            .register_with(|| {
                ComponentDescriptor::builder::<Repository>()
                    .module_path("scenarios::flaky")
                    .constructor_arg::<Database>("database")
                    .build(|args| {
                        Ok(Repository {
                            database: args.next::<Database>()?,
                        })
                    })
            });
        catalog
    }
}

#[test]
fn test_failed_instantiation_rolls_back_and_retries() {
    let container = container("scenarios::flaky", flaky::catalog());

    match container.get_instance::<flaky::Repository>().err().unwrap() {
        DependencyError::Instantiation { type_name, source } => {
            assert_eq!(type_name, "Database");
            assert_eq!(source.to_string(), "数据库尚未启动");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(container.state(), ContainerState::Built);
    assert_eq!(container.stats().singleton_instances, 0);

    flaky::READY.store(true, Ordering::SeqCst);

    let repository = container.get_instance::<flaky::Repository>().unwrap();
    let pool = container.get_instance::<flaky::Pool>().unwrap();
    assert!(Arc::ptr_eq(&repository.database.pool, &pool));
    assert_eq!(container.state(), ContainerState::Ready);
    assert_eq!(container.stats().singleton_instances, 3);
    // 第一次尝试创建的 Pool 随失败的注册表一起丢弃
    assert_eq!(flaky::CONSTRUCTED.load(Ordering::SeqCst), 2);
}

#[test]
fn test_scan_errors_are_sticky() {
    for root in ["", "scenarios::", "scenarios::nowhere"] {
        let container = container(root, constructor::catalog());

        assert!(matches!(
            container.get_instance::<constructor::A>(),
            Err(DependencyError::Scan { .. })
        ));
        assert_eq!(container.state(), ContainerState::ScanFailed);
        assert!(matches!(
            container.get_instance::<constructor::B>(),
            Err(DependencyError::Scan { .. })
        ));
        assert!(container.registered_components().is_empty());
    }
}

/// 并发读取
mod concurrent {
    use super::*;

    pub static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

    pub struct Counter;

    pub fn catalog() -> ComponentCatalog {
        let catalog = ComponentCatalog::new();
        catalog.register_with(|| {
            ComponentDescriptor::builder::<Counter>()
                .module_path("scenarios::concurrent")
                .marked()
                .build(|_| {
                    CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
                    Ok(Counter)
                })
        });
        catalog
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_requests_build_once() {
    let container = Arc::new(container("scenarios::concurrent", concurrent::catalog()));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let container = Arc::clone(&container);
        handles.push(tokio::task::spawn_blocking(move || {
            container.get_instance::<concurrent::Counter>()
        }));
    }

    let mut instances = Vec::new();
    for handle in handles {
        instances.push(handle.await.unwrap().unwrap());
    }

    assert!(instances.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    assert_eq!(concurrent::CONSTRUCTED.load(Ordering::SeqCst), 1);
    assert_eq!(container.state(), ContainerState::Ready);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reads_after_ready() {
    let container = Arc::new(container("scenarios::constructor", constructor::catalog()));
    container.initialize().unwrap();
    let expected = container.get_instance::<constructor::A>().unwrap();

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..32 {
        let container = Arc::clone(&container);
        tasks.spawn(async move { container.get_instance::<constructor::A>() });
    }

    while let Some(joined) = tasks.join_next().await {
        let instance = joined.unwrap().unwrap();
        assert!(Arc::ptr_eq(&instance, &expected));
    }
}
