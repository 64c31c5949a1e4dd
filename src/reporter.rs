//! Error reporters for recoverable locator misuse.
//!
//! Every [`LocatorError`] raised by a locator is handed to its reporter before
//! being returned to the caller. The reporter decides the policy: the default
//! [`PanicReporter`] treats every error as a failed assertion, while
//! [`TracingReporter`] and [`IgnoreReporter`] let the caller branch on the
//! returned `Result` instead.

use crate::error::LocatorError;

/// Sink for locator errors.
///
/// Reporters are called synchronously on the thread that hit the error and
/// never while the locator's internal lock is held, so a reporter may call
/// back into the locator.
///
/// Any `Fn(&LocatorError) + Send + Sync` closure is a reporter.
///
/// # Examples
///
/// ```
/// use instance_locator::{Locator, LocatorError};
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = seen.clone();
/// let locator = Locator::with_reporter(Arc::new(move |e: &LocatorError| {
///     sink.lock().unwrap().push(e.clone());
/// }));
///
/// assert!(locator.get::<u64>().is_err());
/// assert_eq!(seen.lock().unwrap().len(), 1);
/// ```
pub trait ErrorReporter: Send + Sync {
    /// Called once for every error the locator raises.
    fn report(&self, error: &LocatorError);
}

impl<F> ErrorReporter for F
where
    F: Fn(&LocatorError) + Send + Sync,
{
    fn report(&self, error: &LocatorError) {
        self(error)
    }
}

/// Default reporter: every error is a programming bug.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanicReporter;

impl ErrorReporter for PanicReporter {
    fn report(&self, error: &LocatorError) {
        panic!("[instance-locator] {}", error);
    }
}

/// Reporter that logs through `tracing` and lets the caller handle the `Result`.
///
/// # Examples
///
/// ```
/// use instance_locator::{Locator, TracingReporter};
/// use std::sync::Arc;
///
/// let locator = Locator::with_reporter(Arc::new(TracingReporter));
/// assert!(locator.get::<String>().is_err());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &LocatorError) {
        tracing::error!(key = %error.key(), %error, "locator error");
    }
}

/// Reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreReporter;

impl ErrorReporter for IgnoreReporter {
    fn report(&self, _error: &LocatorError) {}
}
