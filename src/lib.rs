//! # instance-locator
//!
//! Thread-safe, type-keyed instance locator: a registry that lazily constructs,
//! caches and injects dependencies identified by type.
//!
//! ## Features
//!
//! - **Lazy factories**: built on first demand, exactly once, then cached
//! - **Weak shared instances**: externally owned values the locator never keeps alive
//! - **Injectors**: populate freshly built values (or any instance) from other dependencies
//! - **Write-once registration**: a key can be registered once; conflicts are reported
//! - **Thread-safe**: one factory run per key even when many threads race for it
//! - **Pluggable error reporting**: panic, log, or ignore, with `Result`s either way
//!
//! ## Quick Start
//!
//! ```rust
//! use instance_locator::Locator;
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let locator = Locator::new();
//! locator.register_factory(|_| Database {
//!     connection_string: "postgres://localhost".to_string(),
//! }).unwrap();
//! locator.register_factory(|l| UserService {
//!     db: l.get().unwrap(),
//! }).unwrap();
//!
//! let users = locator.get::<UserService>().unwrap();
//! assert_eq!(users.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Shared Instances
//!
//! ```rust
//! use instance_locator::{IgnoreReporter, Locator, LocatorError};
//! use std::sync::Arc;
//!
//! struct Session { user: String }
//!
//! let locator = Locator::with_reporter(Arc::new(IgnoreReporter));
//! let session = Arc::new(Session { user: "ada".to_string() });
//! locator.register_shared(&session).unwrap();
//!
//! assert_eq!(locator.get::<Session>().unwrap().user, "ada");
//!
//! drop(session);
//! assert!(matches!(
//!     locator.get::<Session>(),
//!     Err(LocatorError::SharedInstanceExpired(_))
//! ));
//! ```
//!
//! ## Injectors
//!
//! ```rust
//! use instance_locator::Locator;
//! use std::sync::Arc;
//!
//! struct Api;
//!
//! #[derive(Default)]
//! struct ProfileScreen {
//!     api: Option<Arc<Api>>,
//! }
//!
//! let locator = Locator::new();
//! locator.register_factory(|_| Api).unwrap();
//! locator.register_factory(|_| ProfileScreen::default()).unwrap();
//! locator.register_injector(|l, screen: &mut ProfileScreen| {
//!     screen.api = Some(l.get().unwrap());
//! }).unwrap();
//!
//! // Injected before `get` returns.
//! assert!(locator.get::<ProfileScreen>().unwrap().api.is_some());
//! ```

pub mod assembly;
pub mod builder;
pub mod error;
pub mod key;
pub mod locator;
pub mod reporter;
pub mod slot;

// Internal modules
mod internal;

// Re-export core types
pub use assembly::{assembly, Assembly, FnAssembly};
pub use builder::LocatorBuilder;
pub use error::{LocatorError, LocatorResult};
pub use key::{key_of_type, TypeKey};
pub use locator::{Locator, WeakLocator};
pub use reporter::{ErrorReporter, IgnoreReporter, PanicReporter, TracingReporter};
pub use slot::{AnyArc, AnyValue, SlotState};

#[cfg(test)]
mod tests {
    use super::*;
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
    fn test_factory_resolution() {
        let locator = Locator::new();
        locator.register_factory(|_| 42usize).unwrap();

        let a = locator.get::<usize>().unwrap();
        let b = locator.get::<usize>().unwrap();

        assert_eq!(*a, 42);
        assert!(Arc::ptr_eq(&a, &b)); // Same instance
    }

    #[test]
    fn test_factory_runs_lazily() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let locator = Locator::new();
        locator
            .register_factory(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                String::from("built")
            })
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(locator.slot_state(&TypeKey::of::<String>()), Some(SlotState::Uninitialized));

        locator.get::<String>().unwrap();
        locator.get::<String>().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(locator.slot_state(&TypeKey::of::<String>()), Some(SlotState::Initialized));
    }

    #[test]
    fn test_keyed_wrong_type() {
        let (locator, errors) = recording_locator();
        let key = TypeKey::named("Counter");
        locator
            .register_factory_keyed(key, |_| Box::new(7u32) as Box<AnyValue>)
            .unwrap();

        let err = locator.get_keyed::<String>(&key).unwrap_err();
        assert!(matches!(err, LocatorError::FactoryReturnedWrongType { .. }));

        // The value was still built and cached; a second wrong lookup hits the cache.
        let err = locator.get_keyed::<String>(&key).unwrap_err();
        assert!(matches!(err, LocatorError::StoredValueWrongType { .. }));

        assert_eq!(*locator.get_keyed::<u32>(&key).unwrap(), 7);
        assert_eq!(errors.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let locator = Locator::new();
        let clone = locator.clone();
        clone.register_factory(|_| 1u8).unwrap();

        assert!(locator.ptr_eq(&clone));
        assert!(Arc::ptr_eq(&locator.get::<u8>().unwrap(), &clone.get::<u8>().unwrap()));
    }

    #[test]
    fn test_debug_lists_keys() {
        let locator = Locator::new();
        locator.register_factory(|_| 0u16).unwrap();
        locator.register_injector(|_, _: &mut u16| {}).unwrap();

        let debug = format!("{:?}", locator);
        assert!(debug.contains("u16"));
        assert!(debug.starts_with("Locator"));
    }
}
