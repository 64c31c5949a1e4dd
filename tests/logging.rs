use instance_locator::{Locator, LocatorError, TracingReporter, TypeKey};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("instance_locator=trace"))
        .with_test_writer()
        .try_init();
}

#[test]
fn test_tracing_reporter_lets_caller_handle_errors() {
    init_tracing();
    let locator = Locator::with_reporter(Arc::new(TracingReporter));

    locator.register_factory(|_| 3u8).unwrap();
    assert!(matches!(
        locator.register_factory(|_| 4u8),
        Err(LocatorError::TooManyFactories(_))
    ));
    assert_eq!(
        locator.get::<u16>().unwrap_err(),
        LocatorError::NoDependencyRegistered(TypeKey::of::<u16>())
    );
    assert_eq!(*locator.get::<u8>().unwrap(), 3);
}

#[test]
fn test_resolution_with_subscriber_installed() {
    init_tracing();
    let locator = Locator::new();

    locator.register_factory(|_| String::from("logged")).unwrap();
    locator
        .register_injector(|_, s: &mut String| s.push('!'))
        .unwrap();

    assert_eq!(*locator.get::<String>().unwrap(), "logged!");
    assert!(!locator.apply_injector(&mut 0u32));
}
