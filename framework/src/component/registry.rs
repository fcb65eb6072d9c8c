use std::{
    collections::BTreeMap,
    sync::{PoisonError, RwLock},
};

use crate::{
    component::{Component, Handle, Meta},
    error::{Error, Result},
    similar::{self, SUGGESTION_COUNT},
    types::TypeName,
};

/// The version registered when a type does not name one.
pub const DEFAULT_VERSION: &str = "0";

/// Creates a component with its default configuration.
pub type DefaultConstructor = fn(&str) -> Box<dyn Component>;

/// Produces the metadata of a component type.
pub type MetaFn = fn() -> Meta;

#[derive(Clone, Copy)]
struct Registration {
    constructor: DefaultConstructor,
    metadata: MetaFn,
}

/// A thread-safe map from (type name, version) to a default constructor and a metadata function.
///
/// Entries are kept ordered by type name then version, which is the order [`types`](Self::types)
/// reports them in. Registration happens once per type at start-up; lookups take a read lock.
#[derive(Default)]
pub struct ComponentRegistry {
    types: RwLock<BTreeMap<TypeName, BTreeMap<&'static str, Registration>>>,
}

impl ComponentRegistry {
    /// Create a new, empty registry.
    #[inline]
    pub fn new() -> Self {
        Self {
            types: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register the constructor and metadata function of a (type, version) pair.
    ///
    /// Registering a pair twice fails and leaves the first registration intact.
    pub fn register(
        &self,
        type_name: TypeName,
        version: &'static str,
        constructor: DefaultConstructor,
        metadata: MetaFn,
    ) -> Result<()> {
        let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
        let versions = types.entry(type_name).or_default();
        if versions.contains_key(version) {
            return Err(Error::DuplicateRegistration {
                type_name: type_name.to_string(),
                version: version.to_string(),
            });
        }
        versions.insert(
            version,
            Registration {
                constructor,
                metadata,
            },
        );
        log::debug!("registered constructor for '{type_name}' (version '{version}')");
        Ok(())
    }

    fn registration(&self, type_name: &str, version: &str) -> Option<Registration> {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
        types.get(type_name)?.get(version).copied()
    }

    /// Get the default constructor of a (type, version) pair.
    #[inline]
    pub fn lookup(&self, type_name: &str, version: &str) -> Option<DefaultConstructor> {
        self.registration(type_name, version)
            .map(|registration| registration.constructor)
    }

    /// Get the metadata of a (type, version) pair.
    pub fn metadata(&self, type_name: &str, version: &str) -> Option<Meta> {
        self.registration(type_name, version)
            .map(|registration| (registration.metadata)())
    }

    /// Get the default constructor of a (type, version) pair, failing with the most similar
    /// registered type names if there is none.
    pub fn assert_lookup(&self, type_name: &str, version: &str) -> Result<DefaultConstructor> {
        if let Some(constructor) = self.lookup(type_name, version) {
            return Ok(constructor);
        }
        Err(self.unknown_type(type_name))
    }

    /// Create a component of a registered type with its default constructor.
    ///
    /// The handle carries the registered type name, so it outlives the string it was looked up
    /// with.
    pub fn instantiate(&self, type_name: &str, version: &str, name: &str) -> Result<Handle> {
        let found = {
            let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
            types.get_key_value(type_name).and_then(|(key, versions)| {
                versions
                    .get(version)
                    .map(|registration| (*key, registration.constructor))
            })
        };
        let (type_name, constructor) = found.ok_or_else(|| self.unknown_type(type_name))?;
        Ok(Handle::from_boxed(name, type_name, constructor(name)))
    }

    fn unknown_type(&self, type_name: &str) -> Error {
        let types = self.types();
        Error::UnknownType {
            requested: type_name.to_string(),
            suggestions: similar::rank(
                type_name,
                types.iter().map(TypeName::as_str),
                SUGGESTION_COUNT,
            ),
        }
    }

    /// Determine if any version of `type_name` is registered.
    pub fn contains_type(&self, type_name: &str) -> bool {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
        types.get(type_name).is_some_and(|versions| !versions.is_empty())
    }

    /// All registered type names, in order.
    pub fn types(&self) -> Vec<TypeName> {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
        types
            .iter()
            .filter(|(_, versions)| !versions.is_empty())
            .map(|(type_name, _)| *type_name)
            .collect()
    }

    /// All registered (type, version) pairs, in order.
    pub fn entries(&self) -> Vec<(TypeName, &'static str)> {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
        types
            .iter()
            .flat_map(|(type_name, versions)| {
                versions.keys().map(move |version| (*type_name, *version))
            })
            .collect()
    }

    /// The number of registered (type, version) pairs.
    pub fn len(&self) -> usize {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
        types.values().map(BTreeMap::len).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentType, Typed, default_constructor};
    use crate::testing::{Bar, Foo};

    fn registry() -> ComponentRegistry {
        let registry = ComponentRegistry::new();
        registry
            .register(Foo::TYPE, DEFAULT_VERSION, default_constructor::<Foo>, Foo::metadata)
            .unwrap();
        registry
            .register(Bar::TYPE, DEFAULT_VERSION, default_constructor::<Bar>, Bar::metadata)
            .unwrap();
        registry
    }

    #[test]
    fn lookup_finds_registered_pairs() {
        // Given
        let registry = registry();

        // Then
        assert!(registry.lookup("Foo", DEFAULT_VERSION).is_some());
        assert!(registry.lookup("Foo", "1").is_none());
        assert!(registry.lookup("Baz", DEFAULT_VERSION).is_none());
        assert_eq!(registry.metadata("Bar", DEFAULT_VERSION).unwrap().type_name, Bar::TYPE);
    }

    #[test]
    fn duplicate_registration_is_rejected_and_first_kept() {
        // Given
        let registry = registry();

        // When
        let result = registry.register(
            Foo::TYPE,
            DEFAULT_VERSION,
            default_constructor::<Bar>,
            Bar::metadata,
        );

        // Then
        assert!(matches!(result, Err(Error::DuplicateRegistration { .. })));
        assert_eq!(registry.metadata("Foo", DEFAULT_VERSION).unwrap().type_name, Foo::TYPE);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn versions_are_independent_entries() {
        let registry = registry();
        registry
            .register(Foo::TYPE, "1", default_constructor::<Foo>, Foo::metadata)
            .unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.types(), vec![Bar::TYPE, Foo::TYPE]);
        assert_eq!(
            registry.entries(),
            vec![(Bar::TYPE, "0"), (Foo::TYPE, "0"), (Foo::TYPE, "1")]
        );
    }

    #[test]
    fn instantiate_uses_the_registered_type_name() {
        // Given
        let registry = registry();
        let requested = String::from("Foo");

        // When
        let handle = registry.instantiate(&requested, DEFAULT_VERSION, "foo").unwrap();

        // Then
        assert_eq!(handle.name(), "foo");
        assert_eq!(handle.type_name(), Foo::TYPE);
        assert!(handle.borrow_as::<Foo>().is_some());
        assert!(matches!(
            registry.instantiate("Baz", DEFAULT_VERSION, "baz"),
            Err(Error::UnknownType { .. })
        ));
    }

    #[test]
    fn assert_lookup_suggests_similar_types() {
        // Given
        let registry = registry();

        // When
        let error = registry.assert_lookup("Fooo", DEFAULT_VERSION).err().unwrap();

        // Then
        let suggestions = error.suggestions();
        assert_eq!(suggestions[0].name(), "Foo");
        assert!((suggestions[0].score() - 75.0).abs() < 1e-4);
        assert!(suggestions.len() <= SUGGESTION_COUNT);
    }

    #[test]
    fn concurrent_lookups_share_the_registry() {
        let registry = std::sync::Arc::new(registry());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = std::sync::Arc::clone(&registry);
                std::thread::spawn(move || registry.contains_type("Foo"))
            })
            .collect();
        assert!(handles.into_iter().all(|h| h.join().unwrap()));
    }
}
