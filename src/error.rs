//! Error types for the instance locator.

use thiserror::Error;

use crate::key::TypeKey;

/// Locator errors
///
/// Every variant is recoverable by contract: the locator hands it to the
/// configured [`ErrorReporter`](crate::ErrorReporter) and also returns it to
/// the caller. Whether an error is fatal is the reporter's policy.
///
/// # Examples
///
/// ```rust
/// use instance_locator::{IgnoreReporter, Locator, LocatorError, TypeKey};
/// use std::sync::Arc;
///
/// struct Missing;
///
/// let locator = Locator::with_reporter(Arc::new(IgnoreReporter));
/// match locator.get::<Missing>() {
///     Err(LocatorError::NoDependencyRegistered(key)) => {
///         assert_eq!(key, TypeKey::of::<Missing>());
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    /// Lookup of a key with no slot
    #[error("no dependency registered for {0}")]
    NoDependencyRegistered(TypeKey),
    /// A freshly built value is not of the requested type
    #[error("factory for {key} did not produce a {expected}")]
    FactoryReturnedWrongType { key: TypeKey, expected: &'static str },
    /// The weakly referenced shared instance has been dropped by its owner
    #[error("shared instance for {0} has expired")]
    SharedInstanceExpired(TypeKey),
    /// The shared instance is alive but not of the requested type
    #[error("shared instance for {key} is not a {expected}")]
    SharedInstanceWrongType { key: TypeKey, expected: &'static str },
    /// The cached instance is not of the requested type
    #[error("stored instance for {key} is not a {expected}")]
    StoredValueWrongType { key: TypeKey, expected: &'static str },
    /// An instance slot already exists for the key
    #[error("an instance is already registered for {0}")]
    TooManyFactories(TypeKey),
    /// An injector already exists for the key
    #[error("an injector is already registered for {0}")]
    TooManyInjectors(TypeKey),
}

impl LocatorError {
    /// The key the failed operation was addressing.
    pub fn key(&self) -> &TypeKey {
        match self {
            LocatorError::NoDependencyRegistered(key)
            | LocatorError::SharedInstanceExpired(key)
            | LocatorError::TooManyFactories(key)
            | LocatorError::TooManyInjectors(key) => key,
            LocatorError::FactoryReturnedWrongType { key, .. }
            | LocatorError::SharedInstanceWrongType { key, .. }
            | LocatorError::StoredValueWrongType { key, .. } => key,
        }
    }

    /// True for the errors raised by a second registration attempt.
    pub fn is_registration_conflict(&self) -> bool {
        matches!(
            self,
            LocatorError::TooManyFactories(_) | LocatorError::TooManyInjectors(_)
        )
    }
}

/// Result type for locator operations
pub type LocatorResult<T> = Result<T, LocatorError>;
