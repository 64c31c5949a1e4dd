//! Locator configuration.

use std::sync::Arc;

use crate::assembly::Assembly;
use crate::error::LocatorResult;
use crate::locator::Locator;
use crate::reporter::{ErrorReporter, PanicReporter};

/// Builder for a [`Locator`].
///
/// Collects the error reporter and a list of assemblies, then creates the
/// locator and applies the assemblies in the order they were added.
///
/// # Examples
///
/// ```
/// use instance_locator::{assembly, Locator, TracingReporter};
/// use std::sync::Arc;
///
/// struct Clock;
/// struct Scheduler { clock: Arc<Clock> }
///
/// let locator = Locator::builder()
///     .reporter(Arc::new(TracingReporter))
///     .assembly(assembly("time", |l| l.register_factory(|_| Clock)))
///     .assembly(assembly("jobs", |l| {
///         l.register_factory(|l| Scheduler { clock: l.get().unwrap() })
///     }))
///     .build()
///     .unwrap();
///
/// assert!(locator.get::<Scheduler>().is_ok());
/// ```
pub struct LocatorBuilder {
    reporter: Arc<dyn ErrorReporter>,
    assemblies: Vec<Box<dyn Assembly>>,
}

impl LocatorBuilder {
    /// Builder with the panicking reporter and no assemblies.
    pub fn new() -> Self {
        Self {
            reporter: Arc::new(PanicReporter),
            assemblies: Vec::new(),
        }
    }

    /// Sets the error reporter.
    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Queues an assembly.
    pub fn assembly<A: Assembly + 'static>(mut self, assembly: A) -> Self {
        self.assemblies.push(Box::new(assembly));
        self
    }

    /// Creates the locator and applies the queued assemblies in order.
    ///
    /// # Errors
    ///
    /// The first error returned by an assembly. Later assemblies are not applied.
    pub fn build(self) -> LocatorResult<Locator> {
        let locator = Locator::with_reporter(self.reporter);
        locator.apply_assemblies(self.assemblies.iter().map(|a| &**a))?;
        Ok(locator)
    }
}

impl Default for LocatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LocatorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.assemblies.iter().map(|a| a.name()).collect();
        f.debug_struct("LocatorBuilder").field("assemblies", &names).finish()
    }
}
