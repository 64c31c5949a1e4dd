//! Assemblies: named, deferred groups of registrations.
//!
//! An assembly bundles the registrations of one feature area so they can be
//! applied to a locator together. Assemblies are applied in order against the
//! same locator, so a later assembly can rely on what an earlier one
//! registered. There is no isolation between them: two assemblies registering
//! the same key collide like any other double registration.

use crate::error::LocatorResult;
use crate::locator::Locator;

/// A named group of registrations.
///
/// # Example
///
/// ```rust
/// use instance_locator::{Assembly, Locator, LocatorResult};
/// use std::sync::Arc;
///
/// struct Config { url: String }
/// struct Repository { config: Arc<Config> }
///
/// struct StorageAssembly;
///
/// impl Assembly for StorageAssembly {
///     fn name(&self) -> &str {
///         "storage"
///     }
///
///     fn assemble(&self, locator: &Locator) -> LocatorResult<()> {
///         locator.register_factory(|_| Config { url: "sqlite://app.db".to_string() })?;
///         locator.register_factory(|l| Repository { config: l.get().unwrap() })?;
///         Ok(())
///     }
/// }
///
/// # fn main() -> LocatorResult<()> {
/// let locator = Locator::new();
/// locator.apply_assembly(&StorageAssembly)?;
/// assert_eq!(locator.get::<Repository>()?.config.url, "sqlite://app.db");
/// # Ok(())
/// # }
/// ```
pub trait Assembly: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Registers this assembly's factories, shared instances and injectors.
    fn assemble(&self, locator: &Locator) -> LocatorResult<()>;
}

/// Assembly backed by a closure. Built with [`assembly`].
pub struct FnAssembly<F> {
    name: String,
    assemble: F,
}

impl<F> Assembly for FnAssembly<F>
where
    F: Fn(&Locator) -> LocatorResult<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn assemble(&self, locator: &Locator) -> LocatorResult<()> {
        (self.assemble)(locator)
    }
}

impl<F> std::fmt::Debug for FnAssembly<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAssembly").field("name", &self.name).finish()
    }
}

/// Wraps a closure as a named assembly.
///
/// ```rust
/// use instance_locator::{assembly, Locator};
///
/// let numbers = assembly("numbers", |l| l.register_factory(|_| 42u32));
///
/// let locator = Locator::new();
/// locator.apply_assemblies([&numbers]).unwrap();
/// assert_eq!(*locator.get::<u32>().unwrap(), 42);
/// ```
pub fn assembly<F>(name: impl Into<String>, assemble: F) -> FnAssembly<F>
where
    F: Fn(&Locator) -> LocatorResult<()> + Send + Sync,
{
    FnAssembly { name: name.into(), assemble }
}

impl Locator {
    /// Applies one assembly to this locator.
    pub fn apply_assembly<A: Assembly + ?Sized>(&self, assembly: &A) -> LocatorResult<&Self> {
        tracing::debug!(assembly = assembly.name(), "applying assembly");
        assembly.assemble(self)?;
        Ok(self)
    }

    /// Applies assemblies in order, stopping at the first error.
    pub fn apply_assemblies<'a, I, A>(&self, assemblies: I) -> LocatorResult<()>
    where
        I: IntoIterator<Item = &'a A>,
        A: Assembly + ?Sized + 'a,
    {
        for assembly in assemblies {
            self.apply_assembly(assembly)?;
        }
        Ok(())
    }
}
