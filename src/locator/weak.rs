//! Non-owning locator handle.

use std::sync::Weak;

use super::{Locator, LocatorInner};

/// Weak counterpart of [`Locator`].
///
/// A value built by the locator is owned by the locator. If that value also
/// kept a strong `Locator` clone, neither would ever be freed. Values that need
/// to resolve dependencies later hold a `WeakLocator` instead.
///
/// # Examples
///
/// ```
/// use instance_locator::{Locator, WeakLocator};
/// use std::sync::Arc;
///
/// struct Router { locator: WeakLocator }
///
/// let locator = Locator::new();
/// locator.register_factory(|l| Router { locator: l.downgrade() }).unwrap();
///
/// let router = locator.get::<Router>().unwrap();
/// assert!(router.locator.upgrade().is_some());
///
/// drop(locator);
/// assert!(router.locator.upgrade().is_none());
/// ```
#[derive(Clone, Default)]
pub struct WeakLocator {
    inner: Weak<LocatorInner>,
}

impl WeakLocator {
    pub(crate) fn new(inner: Weak<LocatorInner>) -> Self {
        Self { inner }
    }

    /// The locator, if any strong handle to it is still alive.
    pub fn upgrade(&self) -> Option<Locator> {
        self.inner.upgrade().map(Locator::from_inner)
    }
}

impl std::fmt::Debug for WeakLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakLocator")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
