use instance_locator::{IgnoreReporter, Locator, LocatorError, LocatorResult, SlotState, TypeKey};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn recording_locator() -> (Locator, Arc<Mutex<Vec<LocatorError>>>) {
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    let locator = Locator::with_reporter(Arc::new(move |e: &LocatorError| {
        sink.lock().unwrap().push(e.clone());
    }));
    (locator, errors)
}

#[test]
fn test_repeated_get_returns_same_instance() {
    let locator = Locator::new();
    locator.register_factory(|_| 42usize).unwrap();
    locator.register_factory(|_| "hello".to_string()).unwrap();

    let num1 = locator.get::<usize>().unwrap();
    let num2 = locator.get::<usize>().unwrap();
    let str1 = locator.get::<String>().unwrap();
    let str2 = locator.get::<String>().unwrap();

    assert_eq!(*num1, 42);
    assert_eq!(*str1, "hello");
    assert!(Arc::ptr_eq(&num1, &num2)); // Same instance
    assert!(Arc::ptr_eq(&str1, &str2)); // Same instance
}

#[test]
fn test_unregistered_lookup_reports_and_fails() {
    let (locator, errors) = recording_locator();

    let result = locator.get::<u64>();

    assert_eq!(
        result.unwrap_err(),
        LocatorError::NoDependencyRegistered(TypeKey::of::<u64>())
    );
    assert_eq!(
        *errors.lock().unwrap(),
        vec![LocatorError::NoDependencyRegistered(TypeKey::of::<u64>())]
    );
}

#[test]
#[should_panic(expected = "no dependency registered")]
fn test_default_reporter_panics_on_missing_dependency() {
    let locator = Locator::new();
    let _ = locator.get::<u64>();
}

#[test]
fn test_factory_with_dependencies() {
    #[derive(Debug)]
    struct Config {
        port: u16,
    }

    #[derive(Debug)]
    struct Server {
        config: Arc<Config>,
        name: String,
    }

    let locator = Locator::new();
    locator.register_factory(|_| Config { port: 8080 }).unwrap();
    locator
        .register_factory(|l| Server {
            config: l.get().unwrap(),
            name: "MyServer".to_string(),
        })
        .unwrap();

    let server = locator.get::<Server>().unwrap();
    let config = locator.get::<Config>().unwrap();

    assert_eq!(server.config.port, 8080);
    assert_eq!(server.name, "MyServer");
    assert!(Arc::ptr_eq(&server.config, &config));
}

#[test]
fn test_dependency_built_by_dependent_factory_is_the_singleton() {
    struct A;
    struct B {
        a: Arc<A>,
    }

    let a_calls = Arc::new(AtomicUsize::new(0));
    let counter = a_calls.clone();

    let locator = Locator::new();
    locator
        .register_factory(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            A
        })
        .unwrap();
    locator.register_factory(|l| B { a: l.get().unwrap() }).unwrap();

    // B first: A gets built from inside B's factory.
    let b = locator.get::<B>().unwrap();
    let a = locator.get::<A>().unwrap();

    assert!(Arc::ptr_eq(&b.a, &a));
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_contextual_resolution() {
    struct Clock {
        tz: &'static str,
    }

    let locator = Locator::new();
    locator.register_factory(|_| Clock { tz: "UTC" }).unwrap();

    let clock: Arc<Clock> = locator.get().unwrap();
    let same = locator.get_keyed::<Clock>(&TypeKey::of::<Clock>()).unwrap();

    assert_eq!(clock.tz, "UTC");
    assert!(Arc::ptr_eq(&clock, &same));
}

#[test]
fn test_try_factory_propagates_and_retries() {
    #[derive(Debug)]
    struct Token(String);
    #[derive(Debug)]
    struct Client {
        token: Arc<Token>,
    }

    let (locator, errors) = recording_locator();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    locator
        .register_try_factory(move |l| -> LocatorResult<Client> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Client { token: l.get()? })
        })
        .unwrap();

    // Token is missing: the inner lookup reports once, the error passes through unchanged.
    let err = locator.get::<Client>().unwrap_err();
    assert_eq!(err, LocatorError::NoDependencyRegistered(TypeKey::of::<Token>()));
    assert_eq!(errors.lock().unwrap().len(), 1);
    assert_eq!(
        locator.slot_state(&TypeKey::of::<Client>()),
        Some(SlotState::Uninitialized)
    );

    locator.register_factory(|_| Token("secret".to_string())).unwrap();
    let client = locator.get::<Client>().unwrap();

    assert_eq!(client.token.0, "secret");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_get_any_returns_erased_instance() {
    let locator = Locator::with_reporter(Arc::new(IgnoreReporter));
    locator.register_factory(|_| 9i32).unwrap();

    let any = locator.get_any(&TypeKey::of::<i32>()).unwrap();
    let typed = locator.get::<i32>().unwrap();

    assert_eq!(any.downcast_ref::<i32>(), Some(&9));
    assert!(Arc::ptr_eq(&any.downcast::<i32>().unwrap(), &typed));
    assert!(locator.get_any(&TypeKey::named("Nope")).is_err());
}

#[test]
fn test_weak_locator_breaks_cycles() {
    use instance_locator::WeakLocator;

    struct Navigator {
        locator: WeakLocator,
    }

    let locator = Locator::new();
    locator
        .register_factory(|l| Navigator {
            locator: l.downgrade(),
        })
        .unwrap();

    let nav = locator.get::<Navigator>().unwrap();
    let upgraded = nav.locator.upgrade().unwrap();
    assert!(upgraded.ptr_eq(&locator));
    drop(upgraded);

    drop(locator);
    assert!(nav.locator.upgrade().is_none());
}

#[test]
fn test_introspection() {
    let locator = Locator::new();
    assert!(locator.is_empty());

    locator.register_factory(|_| 1u8).unwrap();
    locator.register_injector(|_, _: &mut u16| {}).unwrap();

    assert_eq!(locator.len(), 1);
    assert!(locator.contains(&TypeKey::of::<u8>()));
    assert!(!locator.contains(&TypeKey::of::<u16>()));
    assert!(locator.has_injector(&TypeKey::of::<u16>()));
    assert_eq!(locator.keys(), vec![TypeKey::of::<u8>()]);
    assert_eq!(locator.slot_state(&TypeKey::of::<u16>()), None);
}
