//! Parent-pointer forest of component types.
//!
//! [`TypeHierarchy`] maps each type name to its single parent. A type with no entry is a root.
//! The structure is populated while types are registered at start-up and only read afterwards.
//! Reads are lock-free through `DashMap` and registration only needs `&self`, so one hierarchy
//! may be shared by sessions on different threads.
//!
//! # Example
//!
//! ```rust,ignore
//! let hierarchy = TypeHierarchy::new();
//! hierarchy.register_parent(TypeName::new("FeMesh"), TypeName::new("Mesh"))?;
//! hierarchy.register_parent(TypeName::new("Mesh"), TypeName::COMPONENT)?;
//!
//! assert!(hierarchy.is_ancestor("FeMesh", "Component"));
//! assert!(!hierarchy.is_ancestor("Mesh", "Mesh"));
//! assert!(hierarchy.is_instance("Mesh", "Mesh"));
//! ```

use std::fmt;

use dashmap::DashMap;

use crate::{
    error::{Error, Result},
    types::TypeName,
};

/// A thread-safe registry of child → parent edges between component types.
#[derive(Default)]
pub struct TypeHierarchy {
    /// Child type to parent type. At most one parent per child.
    parents: DashMap<TypeName, TypeName>,
}

impl TypeHierarchy {
    /// Create a new, empty hierarchy.
    #[inline]
    pub fn new() -> Self {
        Self {
            parents: DashMap::new(),
        }
    }

    /// Record that `child` inherits from `parent`.
    ///
    /// Registering the same edge again is a no-op. Giving a type a second, different parent is
    /// rejected and the first edge is kept, as is any edge that would make a type its own
    /// ancestor.
    pub fn register_parent(&self, child: TypeName, parent: TypeName) -> Result<()> {
        // Walk before taking the entry: the walk reads other shards and must not hold a lock.
        if child == parent || self.is_ancestor(parent.as_str(), child.as_str()) {
            return Err(Error::HierarchyCycle { child, parent });
        }

        match self.parents.entry(child) {
            dashmap::Entry::Occupied(occupied) => {
                let existing = *occupied.get();
                if existing == parent {
                    Ok(())
                } else {
                    Err(Error::ConflictingParent {
                        child,
                        existing,
                        requested: parent,
                    })
                }
            }
            dashmap::Entry::Vacant(vacant) => {
                vacant.insert(parent);
                Ok(())
            }
        }
    }

    /// Get the registered parent of a type, if any.
    #[inline]
    pub fn parent(&self, ty: &str) -> Option<TypeName> {
        self.parents.get(ty).map(|entry| *entry.value())
    }

    /// Determine if `candidate` appears in the ancestor chain of `child`.
    ///
    /// The walk starts at the first registered parent of `child`, so a type is never its own
    /// ancestor. Use [`is_instance`](Self::is_instance) for downcast checks.
    pub fn is_ancestor(&self, child: &str, candidate: &str) -> bool {
        let mut current = self.parent(child);
        while let Some(ty) = current {
            if ty == candidate {
                return true;
            }
            current = self.parent(ty.as_str());
        }
        false
    }

    /// Determine if a value of type `actual` may be used as an `expected`.
    #[inline]
    pub fn is_instance(&self, actual: &str, expected: &str) -> bool {
        actual == expected || self.is_ancestor(actual, expected)
    }

    /// Verify that the component `name` of type `actual` may be used as an `expected`.
    pub fn check_type(&self, name: &str, actual: TypeName, expected: &str) -> Result<()> {
        if self.is_instance(actual.as_str(), expected) {
            return Ok(());
        }
        Err(Error::TypeMismatch {
            name: name.to_string(),
            requested: expected.to_string(),
            actual,
            requested_ancestors: self.ancestors(expected),
        })
    }

    /// The ancestor chain of a type, nearest parent first.
    pub fn ancestors(&self, ty: &str) -> Vec<TypeName> {
        let mut chain = Vec::new();
        let mut current = self.parent(ty);
        while let Some(parent) = current {
            chain.push(parent);
            current = self.parent(parent.as_str());
        }
        chain
    }

    /// The types registered directly under `ty`, sorted by name.
    ///
    /// There is no child index; this scans every edge.
    pub fn children(&self, ty: &str) -> Vec<TypeName> {
        let mut children: Vec<TypeName> = self
            .parents
            .iter()
            .filter(|entry| *entry.value() == ty)
            .map(|entry| *entry.key())
            .collect();
        children.sort();
        children
    }

    /// Write the ancestor chain of `ty`, one type per line.
    pub fn print_ancestors(&self, ty: &str, out: &mut impl fmt::Write) -> fmt::Result {
        writeln!(out, "Type '{ty}' inherits from:")?;
        for parent in self.ancestors(ty) {
            writeln!(out, "\t{parent}")?;
        }
        Ok(())
    }

    /// Determine if `ty` has a registered parent.
    #[inline]
    pub fn contains(&self, ty: &str) -> bool {
        self.parents.contains_key(ty)
    }

    /// The number of registered edges.
    #[inline]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Check if no edges are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const MESH: TypeName = TypeName::new("Mesh");
    const FE_MESH: TypeName = TypeName::new("FeMesh");
    const SWARM: TypeName = TypeName::new("Swarm");

    fn mesh_family() -> TypeHierarchy {
        let hierarchy = TypeHierarchy::new();
        hierarchy.register_parent(MESH, TypeName::COMPONENT).unwrap();
        hierarchy.register_parent(FE_MESH, MESH).unwrap();
        hierarchy.register_parent(SWARM, TypeName::COMPONENT).unwrap();
        hierarchy
    }

    // ==================== Ancestry ====================

    #[test]
    fn registered_edges_are_ancestors() {
        // Given
        let hierarchy = mesh_family();

        // Then
        assert!(hierarchy.is_ancestor("FeMesh", "Mesh"));
        assert!(hierarchy.is_ancestor("FeMesh", "Component"));
        assert!(hierarchy.is_ancestor("Mesh", "Component"));
    }

    #[test]
    fn ancestry_is_not_symmetric() {
        let hierarchy = mesh_family();
        assert!(!hierarchy.is_ancestor("Mesh", "FeMesh"));
        assert!(!hierarchy.is_ancestor("Component", "Mesh"));
    }

    #[test]
    fn a_type_is_not_its_own_ancestor_but_is_an_instance_of_itself() {
        let hierarchy = mesh_family();
        assert!(!hierarchy.is_ancestor("Mesh", "Mesh"));
        assert!(hierarchy.is_instance("Mesh", "Mesh"));
        assert!(hierarchy.is_instance("FeMesh", "Mesh"));
        assert!(!hierarchy.is_instance("Swarm", "Mesh"));
    }

    #[test]
    fn unknown_types_are_roots() {
        let hierarchy = mesh_family();
        assert_eq!(hierarchy.parent("Unknown"), None);
        assert!(!hierarchy.is_ancestor("Unknown", "Component"));
        assert!(hierarchy.ancestors("Unknown").is_empty());
    }

    #[test]
    fn ancestors_are_nearest_first() {
        let hierarchy = mesh_family();
        assert_eq!(hierarchy.ancestors("FeMesh"), vec![MESH, TypeName::COMPONENT]);
    }

    #[test]
    fn children_scan_finds_direct_descendants_only() {
        let hierarchy = mesh_family();
        assert_eq!(hierarchy.children("Component"), vec![MESH, SWARM]);
        assert_eq!(hierarchy.children("Mesh"), vec![FE_MESH]);
        assert!(hierarchy.children("FeMesh").is_empty());
    }

    // ==================== Registration ====================

    #[test]
    fn re_registering_the_same_edge_is_allowed() {
        // Given
        let hierarchy = mesh_family();

        // When
        let result = hierarchy.register_parent(FE_MESH, MESH);

        // Then
        assert!(result.is_ok());
        assert_eq!(hierarchy.len(), 3);
    }

    #[test]
    fn conflicting_parent_is_rejected_and_first_edge_kept() {
        // Given
        let hierarchy = mesh_family();

        // When
        let result = hierarchy.register_parent(FE_MESH, SWARM);

        // Then
        assert!(matches!(
            result,
            Err(Error::ConflictingParent { existing, .. }) if existing == MESH
        ));
        assert_eq!(hierarchy.parent("FeMesh"), Some(MESH));
    }

    #[test]
    fn cycles_are_rejected() {
        let hierarchy = mesh_family();
        assert!(matches!(
            hierarchy.register_parent(TypeName::COMPONENT, FE_MESH),
            Err(Error::HierarchyCycle { .. })
        ));
        assert!(matches!(
            hierarchy.register_parent(SWARM, SWARM),
            Err(Error::HierarchyCycle { .. })
        ));
    }

    // ==================== Type checks ====================

    #[test]
    fn check_type_accepts_descendants() {
        let hierarchy = mesh_family();
        assert!(hierarchy.check_type("mesh", FE_MESH, "Mesh").is_ok());
    }

    #[test]
    fn check_type_reports_requested_and_actual() {
        // Given
        let hierarchy = mesh_family();

        // When
        let error = hierarchy.check_type("particles", SWARM, "FeMesh").unwrap_err();

        // Then
        match &error {
            Error::TypeMismatch {
                name,
                requested,
                actual,
                requested_ancestors,
            } => {
                assert_eq!(name, "particles");
                assert_eq!(requested, "FeMesh");
                assert_eq!(*actual, SWARM);
                assert_eq!(requested_ancestors, &vec![MESH, TypeName::COMPONENT]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(error.to_string().contains("'particles' as 'FeMesh'"));
    }

    #[test]
    fn print_ancestors_lists_chain() {
        let hierarchy = mesh_family();
        let mut out = String::new();
        hierarchy.print_ancestors("FeMesh", &mut out).unwrap();
        assert_eq!(out, "Type 'FeMesh' inherits from:\n\tMesh\n\tComponent\n");
    }

    // ==================== Concurrent Registration ====================

    #[test]
    fn concurrent_registration_of_the_same_edge() {
        // Given
        let hierarchy = Arc::new(TypeHierarchy::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let hierarchy = Arc::clone(&hierarchy);
                thread::spawn(move || hierarchy.register_parent(FE_MESH, MESH).is_ok())
            })
            .collect();

        // When
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Then
        assert!(results.iter().all(|ok| *ok));
        assert_eq!(hierarchy.len(), 1);
    }
}
