//! Unit tests for the registry core functionality
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bindery::*;

#[derive(Debug, PartialEq)]
struct TestService {
    value: i32,
}

trait Named: Send + Sync {
    fn name(&self) -> &'static str;
}

struct NamedImpl;

impl Named for NamedImpl {
    fn name(&self) -> &'static str {
        "impl"
    }
}

#[test]
fn test_register_instance_and_resolve() {
    let registry = Registry::new();
    registry.init(AutoDiscovery::Disabled).unwrap();

    let original = Arc::new(TestService { value: 42 });
    registry.register_instance::<TestService>(Arc::clone(&original)).unwrap();

    // Every resolve returns the registered instance
    let service1 = registry.resolve::<TestService>().unwrap();
    let service2 = registry.resolve::<TestService>().unwrap();

    assert_eq!(service1.value, 42);
    assert!(Arc::ptr_eq(&service1, &original));
    assert!(Arc::ptr_eq(&service1, &service2));
}

#[test]
fn test_register_eager_constructs_immediately() {
    let registry = Registry::new();
    registry.init(AutoDiscovery::Disabled).unwrap();

    let constructions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructions);
    registry
        .register_eager::<TestService, _>(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(TestService { value: 7 }))
        })
        .unwrap();

    // Constructed during registration, not during resolve
    assert_eq!(constructions.load(Ordering::SeqCst), 1);

    let service1 = registry.resolve::<TestService>().unwrap();
    let service2 = registry.resolve::<TestService>().unwrap();
    assert!(Arc::ptr_eq(&service1, &service2));
    assert_eq!(constructions.load(Ordering::SeqCst), 1);
}

#[test]
fn test_register_lazy_constructs_on_first_resolve() {
    let registry = Registry::new();
    registry.init(AutoDiscovery::Disabled).unwrap();

    let constructions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructions);
    registry
        .register_lazy::<TestService, _>(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(TestService { value: 42 }))
        })
        .unwrap();

    // Nothing constructed yet
    assert_eq!(constructions.load(Ordering::SeqCst), 0);
    assert!(registry.is_registered::<TestService>());

    let service1 = registry.resolve::<TestService>().unwrap();
    assert_eq!(constructions.load(Ordering::SeqCst), 1);

    // Cached from here on
    let service2 = registry.resolve::<TestService>().unwrap();
    assert!(Arc::ptr_eq(&service1, &service2));
    assert_eq!(constructions.load(Ordering::SeqCst), 1);
}

#[test]
fn test_register_factory_constructs_every_resolve() {
    let registry = Registry::new();
    registry.init(AutoDiscovery::Disabled).unwrap();

    let constructions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructions);
    registry
        .register_factory::<TestService, _>(move || {
            let value = counter.fetch_add(1, Ordering::SeqCst) as i32;
            Ok(Arc::new(TestService { value }))
        })
        .unwrap();

    let service1 = registry.resolve::<TestService>().unwrap();
    let service2 = registry.resolve::<TestService>().unwrap();

    // Different instances every time
    assert!(!Arc::ptr_eq(&service1, &service2));
    assert_ne!(service1.value, service2.value);
    assert_eq!(constructions.load(Ordering::SeqCst), 2);
}

#[test]
fn test_resolve_before_init_fails() {
    let registry = Registry::new();

    let result = registry.resolve::<TestService>();
    assert!(matches!(result, Err(RegistryError::NotInitialized)));
}

#[test]
fn test_resolve_unregistered_contract_fails() {
    let registry = Registry::new();
    registry.init(AutoDiscovery::Disabled).unwrap();

    let result = registry.resolve::<TestService>();
    assert!(matches!(result, Err(RegistryError::NotRegistered { .. })));
}

#[test]
fn test_duplicate_registration_rejected() {
    let registry = Registry::new();
    registry.init(AutoDiscovery::Disabled).unwrap();

    registry
        .register_instance::<TestService>(Arc::new(TestService { value: 42 }))
        .unwrap();

    // Second registration fails regardless of lifecycle
    let result =
        registry.register_lazy::<TestService, _>(|| Ok(Arc::new(TestService { value: 24 })));
    assert!(matches!(result, Err(RegistryError::AlreadyRegistered { .. })));

    // The original binding is untouched
    let service = registry.resolve::<TestService>().unwrap();
    assert_eq!(service.value, 42);
}

#[test]
fn test_init_twice_fails() {
    let registry = Registry::new();

    registry.init(AutoDiscovery::Disabled).unwrap();
    let result = registry.init(AutoDiscovery::Disabled);
    assert!(matches!(result, Err(RegistryError::AlreadyInitialized)));
}

#[test]
fn test_register_self_initializes() {
    let registry = Registry::new();
    assert!(!registry.is_initialized());

    registry
        .register_instance::<TestService>(Arc::new(TestService { value: 1 }))
        .unwrap();

    assert!(registry.is_initialized());
    assert_eq!(registry.resolve::<TestService>().unwrap().value, 1);

    // Self-initialization consumed the once-only init
    let result = registry.init(AutoDiscovery::Disabled);
    assert!(matches!(result, Err(RegistryError::AlreadyInitialized)));
}

#[test]
fn test_is_registered_has_no_side_effects() {
    let registry = Registry::new();

    // Query on an uninitialized registry answers false without initializing
    assert!(!registry.is_registered::<TestService>());
    assert!(!registry.is_initialized());
    assert!(matches!(
        registry.resolve::<TestService>(),
        Err(RegistryError::NotInitialized)
    ));

    registry
        .register_instance::<TestService>(Arc::new(TestService { value: 5 }))
        .unwrap();
    assert!(registry.is_registered::<TestService>());

    // Lazy bindings count as registered before construction
    let constructions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructions);
    registry
        .register_lazy::<Vec<u8>, _>(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Vec::new()))
        })
        .unwrap();
    assert!(registry.is_registered::<Vec<u8>>());
    assert_eq!(constructions.load(Ordering::SeqCst), 0);
}

#[test]
fn test_trait_object_contract() {
    let registry = Registry::new();
    registry.init(AutoDiscovery::Disabled).unwrap();

    registry
        .register_instance::<dyn Named>(Arc::new(NamedImpl))
        .unwrap();

    assert!(registry.is_registered::<dyn Named>());
    let named = registry.resolve::<dyn Named>().unwrap();
    assert_eq!(named.name(), "impl");

    // The concrete type is not a contract of its own
    assert!(!registry.is_registered::<NamedImpl>());
}

#[test]
fn test_register_with_dispatches_lifecycle() {
    let registry = Registry::new();
    registry.init(AutoDiscovery::Disabled).unwrap();

    let constructions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructions);
    registry
        .register_with::<TestService, _>(Lifecycle::Lazy, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(TestService { value: 3 }))
        })
        .unwrap();

    // Lazy dispatch: nothing constructed until resolve
    assert_eq!(constructions.load(Ordering::SeqCst), 0);
    registry.resolve::<TestService>().unwrap();
    assert_eq!(constructions.load(Ordering::SeqCst), 1);

    registry
        .register_with::<Vec<u8>, _>(Lifecycle::Factory, || Ok(Arc::new(Vec::new())))
        .unwrap();
    let first = registry.resolve::<Vec<u8>>().unwrap();
    let second = registry.resolve::<Vec<u8>>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_eager_activation_failure_leaves_no_binding() {
    let registry = Registry::new();
    registry.init(AutoDiscovery::Disabled).unwrap();

    let result =
        registry.register_eager::<TestService, _>(|| Err(anyhow::anyhow!("constructor failed")));
    assert!(matches!(result, Err(RegistryError::Activation { .. })));

    // No partial entry; the contract can be registered again
    assert!(!registry.is_registered::<TestService>());
    registry
        .register_instance::<TestService>(Arc::new(TestService { value: 9 }))
        .unwrap();
    assert_eq!(registry.resolve::<TestService>().unwrap().value, 9);
}

#[test]
fn test_lazy_activation_failure_allows_retry() {
    let registry = Registry::new();
    registry.init(AutoDiscovery::Disabled).unwrap();

    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    registry
        .register_lazy::<TestService, _>(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(anyhow::anyhow!("transient failure"))
            } else {
                Ok(Arc::new(TestService { value: 11 }))
            }
        })
        .unwrap();

    // First resolve surfaces the failure and caches nothing
    let result = registry.resolve::<TestService>();
    assert!(matches!(result, Err(RegistryError::Activation { .. })));
    assert!(registry.is_registered::<TestService>());

    // The retry succeeds and the instance is cached from then on
    let service1 = registry.resolve::<TestService>().unwrap();
    let service2 = registry.resolve::<TestService>().unwrap();
    assert_eq!(service1.value, 11);
    assert!(Arc::ptr_eq(&service1, &service2));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_factory_activation_failure_is_per_resolve() {
    let registry = Registry::new();
    registry.init(AutoDiscovery::Disabled).unwrap();

    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    registry
        .register_factory::<TestService, _>(move || {
            if counter.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                Err(anyhow::anyhow!("flaky"))
            } else {
                Ok(Arc::new(TestService { value: 1 }))
            }
        })
        .unwrap();

    assert!(matches!(
        registry.resolve::<TestService>(),
        Err(RegistryError::Activation { .. })
    ));
    assert!(registry.resolve::<TestService>().is_ok());
}

#[test]
fn test_contract_diagnostics() {
    let registry = Registry::new();
    assert_eq!(registry.contract_count(), 0);
    assert!(registry.contracts().is_empty());

    registry.init(AutoDiscovery::Disabled).unwrap();
    assert_eq!(registry.contract_count(), 0);

    registry
        .register_instance::<TestService>(Arc::new(TestService { value: 1 }))
        .unwrap();
    registry
        .register_instance::<dyn Named>(Arc::new(NamedImpl))
        .unwrap();

    assert_eq!(registry.contract_count(), 2);
    let contracts = registry.contracts();
    assert!(contracts.iter().any(|name| name.contains("TestService")));
    assert!(contracts.iter().any(|name| name.contains("Named")));
}

#[test]
fn test_builder_pattern() {
    let registry = RegistryBuilder::new()
        .register_instance::<TestService>(Arc::new(TestService { value: 42 }))
        .unwrap()
        .register_lazy::<Vec<u8>, _>(|| Ok(Arc::new(vec![1, 2, 3])))
        .unwrap()
        .build();

    assert!(registry.is_initialized());
    assert_eq!(registry.contract_count(), 2);
    assert_eq!(registry.resolve::<TestService>().unwrap().value, 42);
    assert_eq!(*registry.resolve::<Vec<u8>>().unwrap(), vec![1, 2, 3]);

    // The builder already initialized the registry
    let result = registry.init(AutoDiscovery::Disabled);
    assert!(matches!(result, Err(RegistryError::AlreadyInitialized)));
}

#[test]
fn test_builder_applies_provider() {
    struct CoreProvider;

    impl ContractProvider for CoreProvider {
        fn name(&self) -> &'static str {
            "core"
        }

        fn register(&self, registry: &Registry) -> RegistryResult<()> {
            registry.register_instance::<TestService>(Arc::new(TestService { value: 77 }))
        }
    }

    let registry = RegistryBuilder::new().apply(&CoreProvider).unwrap().build();

    assert!(registry.is_registered::<TestService>());
    assert_eq!(registry.resolve::<TestService>().unwrap().value, 77);
}

#[test]
fn test_builder_surfaces_duplicate_registration() {
    let result = RegistryBuilder::new()
        .register_instance::<TestService>(Arc::new(TestService { value: 1 }))
        .and_then(|builder| {
            builder.register_instance::<TestService>(Arc::new(TestService { value: 2 }))
        });

    assert!(matches!(result, Err(RegistryError::AlreadyRegistered { .. })));
}

#[test]
fn test_error_messages_name_the_contract() {
    let registry = Registry::new();
    registry.init(AutoDiscovery::Disabled).unwrap();

    let err = registry.resolve::<TestService>().unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Contract not registered"));
    assert!(message.contains("TestService"));

    assert_eq!(
        RegistryError::AlreadyInitialized.to_string(),
        "Registry already initialized"
    );
    assert_eq!(
        RegistryError::NotInitialized.to_string(),
        "Registry not initialized"
    );
}
