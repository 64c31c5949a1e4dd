//! Instance slots and the tables that hold them.

use std::any::Any;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Weak};
use std::thread::ThreadId;

use crate::error::LocatorResult;
use crate::key::TypeKey;
use crate::locator::Locator;

/// Type-erased value as stored by the locator.
pub type AnyValue = dyn Any + Send + Sync;

/// Type-erased shared instance.
pub type AnyArc = Arc<AnyValue>;

pub(crate) type AnyWeak = Weak<AnyValue>;

pub(crate) type Factory = Arc<dyn Fn(&Locator) -> LocatorResult<Box<AnyValue>> + Send + Sync>;

/// Returns whether the injector accepted the value.
pub(crate) type Injector = Arc<dyn Fn(&Locator, &mut AnyValue) -> bool + Send + Sync>;

/// One slot per key. Only moves forward, except `Building` which falls back
/// to `Uninitialized` when the factory fails.
pub(crate) enum InstanceSlot {
    Uninitialized(Factory),
    Building { factory: Factory, owner: ThreadId },
    Initialized(AnyArc),
    Shared(AnyWeak),
}

impl InstanceSlot {
    pub(crate) fn state(&self) -> SlotState {
        match self {
            InstanceSlot::Uninitialized(_) => SlotState::Uninitialized,
            InstanceSlot::Building { .. } => SlotState::Building,
            InstanceSlot::Initialized(_) => SlotState::Initialized,
            InstanceSlot::Shared(weak) => SlotState::Shared { alive: weak.strong_count() > 0 },
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            InstanceSlot::Uninitialized(_) | InstanceSlot::Building { .. } => "factory",
            InstanceSlot::Initialized(_) => "instance",
            InstanceSlot::Shared(_) => "shared",
        }
    }
}

/// Observable state of an instance slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Factory registered, never run to completion
    Uninitialized,
    /// Factory currently running on some thread
    Building,
    /// Value built and cached
    Initialized,
    /// Weakly referenced external instance
    Shared {
        /// Whether the owner still holds the instance
        alive: bool,
    },
}

/// Both lookup tables. Always accessed through the locator's mutex.
#[derive(Default)]
pub(crate) struct Tables {
    pub(crate) slots: HashMap<TypeKey, InstanceSlot>,
    pub(crate) injectors: HashMap<TypeKey, Injector>,
}

impl Tables {
    /// Write-once insert. Returns false and leaves the table untouched if the
    /// key already has a slot.
    pub(crate) fn insert_slot(&mut self, key: TypeKey, slot: InstanceSlot) -> bool {
        match self.slots.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(slot);
                true
            }
        }
    }

    /// Write-once insert, same rule as [`insert_slot`](Self::insert_slot).
    pub(crate) fn insert_injector(&mut self, key: TypeKey, injector: Injector) -> bool {
        match self.injectors.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(injector);
                true
            }
        }
    }

    pub(crate) fn injector(&self, key: &TypeKey) -> Option<Injector> {
        self.injectors.get(key).cloned()
    }
}
