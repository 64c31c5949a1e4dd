//! Type keys for slot and injector lookup.

use std::any::TypeId;
use std::fmt;

/// Key for slot and injector storage and lookup.
///
/// Every registration in a [`Locator`](crate::Locator) is stored under exactly
/// one key, and the same key addresses both the instance slot and the injector
/// for a type.
///
/// # Key Types
///
/// - **Type**: derived from a Rust type with [`TypeKey::of`]. Equality and
///   hashing look at the `TypeId` only; the name is kept for diagnostics.
/// - **Named**: a stable runtime type identifier, for collaborators that only
///   know a class name (for example a view-hierarchy walker).
///
/// A `Type` key and a `Named` key never compare equal, even when the name
/// matches. Callers that mix both must agree on one form per type.
///
/// # Examples
///
/// ```rust
/// use instance_locator::TypeKey;
///
/// struct Database;
///
/// let key = TypeKey::of::<Database>();
/// assert_eq!(key, TypeKey::of::<Database>());
/// assert!(key.display_name().ends_with("Database"));
///
/// let named = TypeKey::named("LoginViewController");
/// assert_eq!(named.to_string(), "LoginViewController");
/// assert_ne!(named, key);
/// ```
#[derive(Debug, Clone, Copy)]
pub enum TypeKey {
    /// Concrete Rust type with its `TypeId` and name
    Type(TypeId, &'static str),
    /// Runtime type identifier string
    Named(&'static str),
}

impl TypeKey {
    /// Key for the Rust type `T`.
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeKey::Type(TypeId::of::<T>(), std::any::type_name::<T>())
    }

    /// Key for a runtime type identifier.
    pub const fn named(name: &'static str) -> Self {
        TypeKey::Named(name)
    }

    /// The type or identifier name, for logs and error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            TypeKey::Type(_, name) => name,
            TypeKey::Named(name) => name,
        }
    }

    /// The `TypeId` for keys derived from a Rust type.
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            TypeKey::Type(id, _) => Some(*id),
            TypeKey::Named(_) => None,
        }
    }
}

// TypeId-only comparison for concrete types
impl PartialEq for TypeKey {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeKey::Type(a, _), TypeKey::Type(b, _)) => a == b,
            (TypeKey::Named(a), TypeKey::Named(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for TypeKey {}

impl std::hash::Hash for TypeKey {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            TypeKey::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            TypeKey::Named(name) => {
                1u8.hash(state);
                name.hash(state);
            }
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Shorthand for [`TypeKey::of`].
#[inline(always)]
pub fn key_of_type<T: ?Sized + 'static>() -> TypeKey {
    TypeKey::of::<T>()
}
