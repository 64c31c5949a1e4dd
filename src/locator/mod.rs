//! The locator: registration, resolution and injection.
//!
//! This module contains the [`Locator`] type, which owns the instance slots
//! and injectors for one application or test context.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;
use std::thread;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace, warn};

use crate::builder::LocatorBuilder;
use crate::error::{LocatorError, LocatorResult};
use crate::internal::BuildGuard;
use crate::key::TypeKey;
use crate::reporter::{ErrorReporter, PanicReporter};
use crate::slot::{AnyArc, AnyValue, Factory, Injector, InstanceSlot, SlotState, Tables};

pub mod weak;
pub use weak::WeakLocator;

/// Thread-safe, type-keyed instance locator.
///
/// A `Locator` lazily constructs, caches and injects dependencies identified by
/// a [`TypeKey`]. Each key holds at most one instance slot and at most one
/// injector, and both are write-once for the locator's lifetime.
///
/// # Registration modes
///
/// - **Factory**: run on first demand, the result is cached and every later
///   lookup returns the same `Arc`.
/// - **Shared**: an `Arc` owned elsewhere, referenced weakly. Once the owner
///   drops it, lookups fail with [`LocatorError::SharedInstanceExpired`].
/// - **Injector**: runs once on each value a factory builds, before the value
///   is handed out, and on demand through [`apply_injector`](Self::apply_injector).
///
/// # Thread Safety
///
/// `Locator` is `Send + Sync` and cheap to clone (clones share state). One
/// mutex guards both tables, but factories, injectors and the error reporter
/// always run with it released, so they may resolve other keys from the same
/// locator. Concurrent lookups of a key that is being built wait for the
/// running factory instead of starting their own: a factory runs at most once.
///
/// A factory that resolves its own key on the same thread panics. Two threads
/// whose factories resolve each other's keys deadlock.
///
/// # Examples
///
/// ```
/// use instance_locator::Locator;
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let locator = Locator::new();
/// locator.register_factory(|_| Database { url: "postgres://localhost".to_string() }).unwrap();
/// locator.register_factory(|l| UserService { db: l.get().unwrap() }).unwrap();
///
/// let users: Arc<UserService> = locator.get().unwrap();
/// let db: Arc<Database> = locator.get().unwrap();
/// assert!(Arc::ptr_eq(&users.db, &db));
/// assert_eq!(db.url, "postgres://localhost");
/// ```
pub struct Locator {
    inner: Arc<LocatorInner>,
}

pub(crate) struct LocatorInner {
    tables: Mutex<Tables>,
    /// Signalled whenever a `Building` slot settles.
    built: Condvar,
    reporter: Arc<dyn ErrorReporter>,
}

impl LocatorInner {
    pub(crate) fn finish_build(&self, key: TypeKey, slot: InstanceSlot) {
        self.tables.lock().slots.insert(key, slot);
        self.built.notify_all();
    }
}

/// Where a resolved value came from, which decides the mismatch error.
#[derive(Debug, Clone, Copy)]
enum Origin {
    Built,
    Stored,
    Shared,
}

impl Origin {
    fn mismatch(self, key: TypeKey, expected: &'static str) -> LocatorError {
        match self {
            Origin::Built => LocatorError::FactoryReturnedWrongType { key, expected },
            Origin::Stored => LocatorError::StoredValueWrongType { key, expected },
            Origin::Shared => LocatorError::SharedInstanceWrongType { key, expected },
        }
    }
}

enum Step {
    Ready(AnyArc, Origin),
    Missing,
    Expired,
    Wait,
    Recursive,
    Build(Factory),
}

impl Locator {
    /// Creates an empty locator that panics on every reported error.
    pub fn new() -> Self {
        Self::with_reporter(Arc::new(PanicReporter))
    }

    /// Creates an empty locator with a custom error reporter.
    pub fn with_reporter(reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            inner: Arc::new(LocatorInner {
                tables: Mutex::new(Tables::default()),
                built: Condvar::new(),
                reporter,
            }),
        }
    }

    /// Starts configuring a locator. See [`LocatorBuilder`].
    pub fn builder() -> LocatorBuilder {
        LocatorBuilder::new()
    }

    /// Non-owning handle, for values that need to refer back to the locator.
    pub fn downgrade(&self) -> WeakLocator {
        WeakLocator::new(Arc::downgrade(&self.inner))
    }

    /// True if both handles share the same state.
    pub fn ptr_eq(&self, other: &Locator) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn from_inner(inner: Arc<LocatorInner>) -> Self {
        Self { inner }
    }

    fn fail<T>(&self, error: LocatorError) -> LocatorResult<T> {
        self.inner.reporter.report(&error);
        Err(error)
    }

    // ----- Registration -----

    /// Registers a lazy factory for `T`.
    ///
    /// The factory runs on the first lookup of `T`, receives this locator to
    /// resolve its own dependencies, and its result is cached from then on.
    ///
    /// # Errors
    ///
    /// [`LocatorError::TooManyFactories`] if `T` already has a factory or
    /// shared instance. The existing registration is left untouched.
    pub fn register_factory<T, F>(&self, factory: F) -> LocatorResult<()>
    where
        T: Send + Sync + 'static,
        F: Fn(&Locator) -> T + Send + Sync + 'static,
    {
        let erased: Factory = Arc::new(move |locator: &Locator| -> LocatorResult<Box<AnyValue>> {
            Ok(Box::new(factory(locator)))
        });
        self.insert_slot(TypeKey::of::<T>(), InstanceSlot::Uninitialized(erased))
    }

    /// Registers a lazy factory for `T` that may fail.
    ///
    /// An error returned by the factory is passed through to the caller of
    /// [`get`](Self::get) as is, and the slot stays unbuilt so a later lookup
    /// runs the factory again.
    ///
    /// ```
    /// use instance_locator::{Locator, LocatorResult};
    /// use std::sync::Arc;
    ///
    /// struct Config { port: u16 }
    /// struct Server { config: Arc<Config> }
    ///
    /// let locator = Locator::new();
    /// locator.register_factory(|_| Config { port: 8080 }).unwrap();
    /// locator.register_try_factory(|l| -> LocatorResult<Server> {
    ///     Ok(Server { config: l.get()? })
    /// }).unwrap();
    ///
    /// assert_eq!(locator.get::<Server>().unwrap().config.port, 8080);
    /// ```
    pub fn register_try_factory<T, F>(&self, factory: F) -> LocatorResult<()>
    where
        T: Send + Sync + 'static,
        F: Fn(&Locator) -> LocatorResult<T> + Send + Sync + 'static,
    {
        let erased: Factory = Arc::new(move |locator: &Locator| -> LocatorResult<Box<AnyValue>> {
            factory(locator).map(|value| Box::new(value) as Box<AnyValue>)
        });
        self.insert_slot(TypeKey::of::<T>(), InstanceSlot::Uninitialized(erased))
    }

    /// Registers a type-erased factory under an arbitrary key.
    ///
    /// Lookups through [`get_keyed`](Self::get_keyed) check the built value
    /// against the requested type and fail with
    /// [`LocatorError::FactoryReturnedWrongType`] on a mismatch.
    pub fn register_factory_keyed<F>(&self, key: TypeKey, factory: F) -> LocatorResult<()>
    where
        F: Fn(&Locator) -> Box<AnyValue> + Send + Sync + 'static,
    {
        let erased: Factory =
            Arc::new(move |locator: &Locator| -> LocatorResult<Box<AnyValue>> { Ok(factory(locator)) });
        self.insert_slot(key, InstanceSlot::Uninitialized(erased))
    }

    /// Registers an externally owned instance of `T`, referenced weakly.
    ///
    /// The locator never keeps `instance` alive. Once every owner has dropped
    /// it, lookups fail with [`LocatorError::SharedInstanceExpired`].
    ///
    /// # Errors
    ///
    /// [`LocatorError::TooManyFactories`] if `T` is already registered.
    pub fn register_shared<T>(&self, instance: &Arc<T>) -> LocatorResult<()>
    where
        T: Send + Sync + 'static,
    {
        let erased: AnyArc = instance.clone();
        self.register_shared_keyed(TypeKey::of::<T>(), &erased)
    }

    /// Type-erased form of [`register_shared`](Self::register_shared).
    pub fn register_shared_keyed(&self, key: TypeKey, instance: &AnyArc) -> LocatorResult<()> {
        self.insert_slot(key, InstanceSlot::Shared(Arc::downgrade(instance)))
    }

    /// Registers the injector for `T`.
    ///
    /// The injector receives every `T` a factory builds, mutably and before
    /// any caller sees it, so it can fill in fields from other dependencies.
    /// It never runs on shared instances or on cached values.
    ///
    /// # Errors
    ///
    /// [`LocatorError::TooManyInjectors`] if `T` already has an injector. The
    /// first injector stays active.
    pub fn register_injector<T, F>(&self, injector: F) -> LocatorResult<()>
    where
        T: Send + Sync + 'static,
        F: Fn(&Locator, &mut T) + Send + Sync + 'static,
    {
        let key = TypeKey::of::<T>();
        let erased: Injector = Arc::new(move |locator: &Locator, value: &mut AnyValue| -> bool {
            match value.downcast_mut::<T>() {
                Some(value) => {
                    injector(locator, value);
                    true
                }
                None => {
                    warn!(key = %key, expected = type_name::<T>(), "injector skipped, value has another type");
                    false
                }
            }
        });
        self.insert_injector(key, erased)
    }

    /// Registers a type-erased injector under an arbitrary key.
    pub fn register_injector_keyed<F>(&self, key: TypeKey, injector: F) -> LocatorResult<()>
    where
        F: Fn(&Locator, &mut AnyValue) + Send + Sync + 'static,
    {
        let erased: Injector = Arc::new(move |locator: &Locator, value: &mut AnyValue| -> bool {
            injector(locator, value);
            true
        });
        self.insert_injector(key, erased)
    }

    fn insert_slot(&self, key: TypeKey, slot: InstanceSlot) -> LocatorResult<()> {
        let kind = slot.kind();
        let inserted = self.inner.tables.lock().insert_slot(key, slot);
        if inserted {
            debug!(key = %key, kind, "registered");
            Ok(())
        } else {
            self.fail(LocatorError::TooManyFactories(key))
        }
    }

    fn insert_injector(&self, key: TypeKey, injector: Injector) -> LocatorResult<()> {
        let inserted = self.inner.tables.lock().insert_injector(key, injector);
        if inserted {
            debug!(key = %key, "registered injector");
            Ok(())
        } else {
            self.fail(LocatorError::TooManyInjectors(key))
        }
    }

    // ----- Resolution -----

    /// Resolves `T`, building it on first use.
    ///
    /// The key is inferred from the requested type, so the type can come from
    /// context: `let db: Arc<Database> = locator.get()?;`.
    ///
    /// # Errors
    ///
    /// - [`LocatorError::NoDependencyRegistered`] if `T` was never registered.
    /// - [`LocatorError::SharedInstanceExpired`] if `T` is a shared instance
    ///   whose owner dropped it.
    /// - Whatever a fallible factory returned.
    pub fn get<T>(&self) -> LocatorResult<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.get_keyed(&TypeKey::of::<T>())
    }

    /// Resolves the value stored under `key` as a `T`.
    ///
    /// Besides the errors of [`get`](Self::get), a value that is not a `T`
    /// fails with the wrong-type error matching where the value came from.
    pub fn get_keyed<T>(&self, key: &TypeKey) -> LocatorResult<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let (value, origin) = self.resolve(key)?;
        match value.downcast::<T>() {
            Ok(value) => Ok(value),
            Err(_) => self.fail(origin.mismatch(*key, type_name::<T>())),
        }
    }

    /// Resolves the value stored under `key` without a type check.
    pub fn get_any(&self, key: &TypeKey) -> LocatorResult<AnyArc> {
        self.resolve(key).map(|(value, _)| value)
    }

    fn resolve(&self, key: &TypeKey) -> LocatorResult<(AnyArc, Origin)> {
        let current = thread::current().id();
        let mut tables = self.inner.tables.lock();
        loop {
            let step = match tables.slots.get(key) {
                None => Step::Missing,
                Some(InstanceSlot::Initialized(value)) => Step::Ready(value.clone(), Origin::Stored),
                Some(InstanceSlot::Shared(weak)) => match weak.upgrade() {
                    Some(value) => Step::Ready(value, Origin::Shared),
                    None => Step::Expired,
                },
                Some(InstanceSlot::Building { owner, .. }) if *owner == current => Step::Recursive,
                Some(InstanceSlot::Building { .. }) => Step::Wait,
                Some(InstanceSlot::Uninitialized(factory)) => Step::Build(factory.clone()),
            };

            match step {
                Step::Ready(value, origin) => {
                    trace!(key = %key, ?origin, "resolved");
                    return Ok((value, origin));
                }
                Step::Missing => {
                    drop(tables);
                    return self.fail(LocatorError::NoDependencyRegistered(*key));
                }
                Step::Expired => {
                    drop(tables);
                    return self.fail(LocatorError::SharedInstanceExpired(*key));
                }
                Step::Recursive => {
                    drop(tables);
                    panic!("[instance-locator] {} was requested again while its own factory is running", key);
                }
                Step::Wait => {
                    trace!(key = %key, "waiting for construction on another thread");
                    self.inner.built.wait(&mut tables);
                }
                Step::Build(factory) => {
                    tables.slots.insert(
                        *key,
                        InstanceSlot::Building { factory: factory.clone(), owner: current },
                    );
                    drop(tables);
                    return self.construct(*key, factory).map(|value| (value, Origin::Built));
                }
            }
        }
    }

    /// Runs the factory and injector for `key`, which the caller has already
    /// marked as `Building`.
    fn construct(&self, key: TypeKey, factory: Factory) -> LocatorResult<AnyArc> {
        let guard = BuildGuard::new(&self.inner, key, factory.clone());
        debug!(key = %key, "constructing");

        let mut value = factory(self)?;
        if let Some(injector) = self.injector(&key) {
            debug!(key = %key, "injecting");
            injector(self, &mut *value);
        }

        let value: AnyArc = Arc::from(value);
        guard.publish(value.clone());
        debug!(key = %key, "constructed");
        Ok(value)
    }

    fn injector(&self, key: &TypeKey) -> Option<Injector> {
        self.inner.tables.lock().injector(key)
    }

    // ----- Injection -----

    /// Runs the injector registered for `T` on `instance`.
    ///
    /// Returns `false` when `T` has no injector. That is not an error and
    /// nothing is reported: callers use this to opportunistically inject
    /// objects that may or may not have one.
    ///
    /// ```
    /// use instance_locator::Locator;
    /// use std::sync::Arc;
    ///
    /// struct Theme { name: &'static str }
    /// #[derive(Default)]
    /// struct Screen { theme: Option<Arc<Theme>> }
    ///
    /// let locator = Locator::new();
    /// locator.register_factory(|_| Theme { name: "dark" }).unwrap();
    /// locator.register_injector(|l, screen: &mut Screen| {
    ///     screen.theme = l.get().ok();
    /// }).unwrap();
    ///
    /// let mut screen = Screen::default();
    /// assert!(locator.apply_injector(&mut screen));
    /// assert_eq!(screen.theme.unwrap().name, "dark");
    /// assert!(!locator.apply_injector(&mut 5u8));
    /// ```
    pub fn apply_injector<T>(&self, instance: &mut T) -> bool
    where
        T: Send + Sync + 'static,
    {
        self.apply_injector_keyed(&TypeKey::of::<T>(), instance)
    }

    /// Runs the injector registered under `key` on a type-erased instance.
    ///
    /// Returns `false` when there is no injector for `key`, or when a typed
    /// injector is handed a value of another type.
    pub fn apply_injector_keyed(&self, key: &TypeKey, instance: &mut AnyValue) -> bool {
        match self.injector(key) {
            Some(injector) => injector(self, instance),
            None => {
                trace!(key = %key, "no injector");
                false
            }
        }
    }

    // ----- Introspection -----

    /// True if `key` has an instance slot.
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.inner.tables.lock().slots.contains_key(key)
    }

    /// True if `key` has an injector.
    pub fn has_injector(&self, key: &TypeKey) -> bool {
        self.inner.tables.lock().injectors.contains_key(key)
    }

    /// Current state of the slot for `key`, if any.
    pub fn slot_state(&self, key: &TypeKey) -> Option<SlotState> {
        self.inner.tables.lock().slots.get(key).map(InstanceSlot::state)
    }

    /// Number of instance slots.
    pub fn len(&self) -> usize {
        self.inner.tables.lock().slots.len()
    }

    /// True if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of every instance slot, in no particular order.
    pub fn keys(&self) -> Vec<TypeKey> {
        self.inner.tables.lock().slots.keys().copied().collect()
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let tables = self.inner.tables.lock();
        let mut s = String::new();
        s.push_str("=== Locator Debug ===\n");
        s.push_str("Slots:\n");
        for (key, slot) in &tables.slots {
            s.push_str(&format!("  {}: {:?}\n", key, slot.state()));
        }
        s.push_str("Injectors:\n");
        for key in tables.injectors.keys() {
            s.push_str(&format!("  {}\n", key));
        }
        s
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Locator {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.inner.tables.lock();
        let slots: Vec<&'static str> = tables.slots.keys().map(TypeKey::display_name).collect();
        let injectors: Vec<&'static str> =
            tables.injectors.keys().map(TypeKey::display_name).collect();
        f.debug_struct("Locator")
            .field("slots", &slots)
            .field("injectors", &injectors)
            .finish()
    }
}
