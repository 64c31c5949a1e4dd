//! In-progress construction guard.

use crate::key::TypeKey;
use crate::locator::LocatorInner;
use crate::slot::{AnyArc, Factory, InstanceSlot};

/// Owns a key's `Building` marker while its factory and injector run.
///
/// [`publish`](Self::publish) moves the slot to `Initialized`. If the guard is
/// dropped without publishing (the factory returned an error or unwound), the
/// slot goes back to `Uninitialized` with the same factory. Both paths wake
/// every thread waiting on the key.
pub(crate) struct BuildGuard<'a> {
    inner: &'a LocatorInner,
    key: TypeKey,
    factory: Option<Factory>,
}

impl<'a> BuildGuard<'a> {
    pub(crate) fn new(inner: &'a LocatorInner, key: TypeKey, factory: Factory) -> Self {
        Self { inner, key, factory: Some(factory) }
    }

    pub(crate) fn publish(mut self, value: AnyArc) {
        self.factory = None;
        self.inner.finish_build(self.key, InstanceSlot::Initialized(value));
    }
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        if let Some(factory) = self.factory.take() {
            tracing::debug!(key = %self.key, "construction abandoned, slot reset");
            self.inner.finish_build(self.key, InstanceSlot::Uninitialized(factory));
        }
    }
}
