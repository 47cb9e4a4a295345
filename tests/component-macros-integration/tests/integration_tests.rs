//! `#[derive(Component)]` 生成的描述符与全局目录登记

use component_macros::Component;
use di_abstractions::{ContainerConfig, DiContainer};
use di_impl::Container;
use infrastructure_common::{
    Autowired, Component, ComponentCatalog, DependencyError, InjectionKind, Lifetime,
};
use std::sync::Arc;

fn container(root: &str) -> Container {
    Container::new(ContainerConfig::new(root))
}

mod shop {
    use super::*;
    use parking_lot::Mutex;

    pub trait PriceSource: Send + Sync {
        fn price(&self, item: &str) -> u32;
    }

    #[derive(Debug, Default, Component)]
    #[component(provides = "dyn PriceSource")]
    pub struct FixedPrices;

    impl PriceSource for FixedPrices {
        fn price(&self, item: &str) -> u32 {
            u32::try_from(item.len()).unwrap_or(u32::MAX) * 100
        }
    }

    #[derive(Debug, Default, Component)]
    #[component(name = "audit")]
    pub struct AuditLog {
        pub entries: Mutex<Vec<String>>,
    }

    #[derive(Component)]
    #[component(setter(set_audit = "AuditLog", qualifier = "audit"))]
    pub struct CartService {
        #[inject]
        pub prices: Arc<dyn PriceSource>,
        #[inject(optional)]
        pub discounts: Option<Arc<Discounts>>,
        #[autowired]
        pub checkout: Autowired<CheckoutService>,
        pub audit: Mutex<Option<Arc<AuditLog>>>,
    }

    impl CartService {
        pub fn set_audit(&self, audit: Arc<AuditLog>) {
            *self.audit.lock() = Some(audit);
        }

        pub fn total(&self, items: &[&str]) -> u32 {
            items.iter().map(|item| self.prices.price(item)).sum()
        }
    }

    #[derive(Component)]
    pub struct CheckoutService {
        #[autowired]
        pub cart: Autowired<CartService>,
        #[autowired(qualifier = "audit")]
        pub audit: Autowired<AuditLog>,
    }

    impl CheckoutService {
        pub fn checkout(&self, items: &[&str]) -> Option<u32> {
            let total = self.cart.get()?.total(items);
            self.audit.get()?.entries.lock().push(format!("checkout {total}"));
            Some(total)
        }
    }

    /// 不在目录中的可选依赖
    pub struct Discounts;

    #[derive(Debug, Default, Component)]
    #[component(prototype)]
    pub struct Receipt {
        pub lines: Mutex<Vec<String>>,
    }

    #[derive(Debug, Default, Component)]
    #[component(disabled)]
    pub struct LegacyPrices;
}

#[test]
fn test_descriptor_reflects_attributes() {
    let descriptor = shop::CartService::descriptor();

    assert_eq!(descriptor.name(), "CartService");
    assert!(descriptor.is_marked());
    assert!(descriptor.is_enabled());
    assert_eq!(descriptor.module_path(), "integration_tests::shop");
    assert_eq!(descriptor.lifetime(), Lifetime::Singleton);

    let points: Vec<(InjectionKind, &str, bool)> = descriptor
        .injection_points()
        .iter()
        .map(|point| (point.kind(), point.member_name(), point.is_optional()))
        .collect();
    assert_eq!(
        points,
        vec![
            (InjectionKind::Constructor, "prices", false),
            (InjectionKind::Constructor, "discounts", true),
            (InjectionKind::Field, "checkout", false),
            (InjectionKind::Setter, "set_audit", false),
        ]
    );

    let setter = &descriptor.injection_points()[3];
    assert_eq!(setter.qualifier(), Some("audit"));
}

#[test]
fn test_descriptor_lifetimes_and_names() {
    assert_eq!(shop::AuditLog::descriptor().name(), "audit");
    assert_eq!(shop::Receipt::descriptor().lifetime(), Lifetime::Prototype);
    assert!(!shop::LegacyPrices::descriptor().is_enabled());
    assert!(shop::FixedPrices::descriptor()
        .provided(std::any::TypeId::of::<dyn shop::PriceSource>())
        .is_some());
}

#[test]
fn test_components_are_registered_at_startup() {
    let catalog = ComponentCatalog::global();

    assert!(catalog.contains::<shop::CartService>());
    assert!(catalog.contains::<shop::CheckoutService>());
    assert!(catalog.contains::<shop::LegacyPrices>());
    assert!(catalog.len() >= 7);
}

#[test]
fn test_generated_wiring() {
    let container = container("integration_tests::shop");

    let cart = container.get_instance::<shop::CartService>().unwrap();
    let checkout = container.get_instance::<shop::CheckoutService>().unwrap();
    let audit = container.get_named::<shop::AuditLog>("audit").unwrap();

    assert!(cart.discounts.is_none());
    assert!(Arc::ptr_eq(&cart.checkout.get().unwrap(), &checkout));
    assert!(Arc::ptr_eq(&checkout.cart.get().unwrap(), &cart));
    assert!(Arc::ptr_eq(cart.audit.lock().as_ref().unwrap(), &audit));

    assert_eq!(checkout.checkout(&["tea", "cake"]), Some(700));
    assert_eq!(audit.entries.lock().as_slice(), ["checkout 700".to_string()]);

    let prices = container.get_instance::<dyn shop::PriceSource>().unwrap();
    assert_eq!(prices.price("milk"), 400);
}

#[test]
fn test_generated_prototype_and_disabled() {
    let container = container("integration_tests::shop");

    let first = container.get_instance::<shop::Receipt>().unwrap();
    let second = container.get_instance::<shop::Receipt>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    first.lines.lock().push("tea".to_string());
    assert!(second.lines.lock().is_empty());

    assert!(matches!(
        container.get_instance::<shop::LegacyPrices>(),
        Err(DependencyError::UnresolvedDependency { .. })
    ));
    // 五个启用的组件，其中 Receipt 是原型
    assert_eq!(container.stats().registered_components, 5);
    assert_eq!(container.stats().singleton_instances, 4);
}

mod broken {
    use super::*;

    #[derive(Component)]
    pub struct First {
        #[inject]
        pub _second: Arc<Second>,
    }

    #[derive(Component)]
    pub struct Second {
        #[inject]
        pub _first: Arc<First>,
    }
}

#[test]
fn test_generated_constructor_cycle_is_reported() {
    let container = container("integration_tests::broken");

    match container.get_instance::<broken::First>() {
        Err(DependencyError::CircularDependency { dependency_chain }) => {
            assert!(dependency_chain.contains("First -> Second"));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("constructor cycle was wired"),
    }
}
