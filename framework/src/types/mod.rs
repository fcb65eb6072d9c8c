//! Type identity for erased components.
//!
//! Components are stored as trait objects, so the framework keeps its own notion of a type: a
//! [`TypeName`] and a [`TypeHierarchy`] of single-parent edges between type names. Together
//! they answer "is this component a kind of X" without relying on the host language's
//! inheritance.

mod hierarchy;

pub use hierarchy::TypeHierarchy;

use std::{
    borrow::Borrow,
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

/// The name of a component type.
///
/// Type names are compared, ordered and hashed by their contents, never by the address of the
/// underlying string, so two separately declared `"Mesh"` literals name the same type. A
/// `TypeName` borrows as `str`, which lets registries be queried with names read at runtime
/// from configuration.
#[derive(Clone, Copy)]
pub struct TypeName(&'static str);

impl TypeName {
    /// The root of every component hierarchy.
    pub const COMPONENT: TypeName = TypeName("Component");

    /// Construct a type name from a static string.
    #[inline]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The textual name.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl PartialEq for TypeName {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for TypeName {}

impl PartialEq<str> for TypeName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TypeName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialOrd for TypeName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(other.0)
    }
}

impl Hash for TypeName {
    // Must agree with `str`'s hash for the `Borrow<str>` lookups to work.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl Borrow<str> for TypeName {
    fn borrow(&self) -> &str {
        self.0
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        self.0
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeName({:?})", self.0)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
