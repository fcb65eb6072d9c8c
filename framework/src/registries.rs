//! The start-up registries shared by every run.

use std::fmt;

use crate::{
    component::{
        ComponentRegistry, ComponentType, DEFAULT_VERSION, Handle, Typed, default_constructor,
    },
    error::Result,
    types::{TypeHierarchy, TypeName},
};

/// The type hierarchy and the component registry, created once and passed by reference to
/// every factory and session.
///
/// Both registries are `Send + Sync` and only need `&self` to register into, so one value may be
/// shared by sessions on different threads.
#[derive(Default)]
pub struct Registries {
    hierarchy: TypeHierarchy,
    components: ComponentRegistry,
}

impl Registries {
    #[inline]
    pub fn new() -> Self {
        Self {
            hierarchy: TypeHierarchy::new(),
            components: ComponentRegistry::new(),
        }
    }

    #[inline]
    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    #[inline]
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Register a concrete type: its hierarchy edge and its default constructor.
    pub fn register<T: ComponentType>(&self) -> Result<()> {
        self.register_abstract::<T>()?;
        self.components
            .register(T::TYPE, DEFAULT_VERSION, default_constructor::<T>, T::metadata)
    }

    /// Register a type that only exists in the hierarchy.
    pub fn register_abstract<T: Typed>(&self) -> Result<()> {
        if T::TYPE == TypeName::COMPONENT {
            return Ok(());
        }
        self.hierarchy.register_parent(T::TYPE, T::PARENT)
    }

    /// Determine if a type has a default constructor.
    #[inline]
    pub fn is_concrete(&self, type_name: &str) -> bool {
        self.components.contains_type(type_name)
    }

    /// Create a component of a registered type under `name`.
    pub fn instantiate(&self, type_name: &str, name: &str) -> Result<Handle> {
        self.components.instantiate(type_name, DEFAULT_VERSION, name)
    }

    /// Verify that a live component may be used as an `expected`.
    pub fn check_type(&self, handle: &Handle, expected: &str) -> Result<()> {
        self.hierarchy
            .check_type(handle.name(), handle.type_name(), expected)
    }

    /// Write the tree of types below `type_name`, marking each one concrete or abstract.
    pub fn print_descendants(&self, type_name: &str, out: &mut impl fmt::Write) -> fmt::Result {
        self.print_tree(type_name, 0, out)
    }

    fn print_tree(&self, type_name: &str, depth: usize, out: &mut impl fmt::Write) -> fmt::Result {
        let kind = if self.is_concrete(type_name) {
            "Concrete"
        } else {
            "Abstract"
        };
        writeln!(out, "{:indent$}{type_name} ({kind})", "", indent = depth * 2)?;
        for child in self.hierarchy.children(type_name) {
            self.print_tree(child.as_str(), depth + 1, out)?;
        }
        Ok(())
    }
}
