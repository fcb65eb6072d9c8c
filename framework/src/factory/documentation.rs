use std::{any::Any, fmt, mem};

use crate::{
    component::Handle,
    error::Result,
    factory::Factory,
    live::LiveRegistry,
    registries::Registries,
    types::TypeName,
};

/// The resolution strategy a dependency was requested with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    ByName { name: String },
    ByKey { key: String },
    ByNameWithKeyFallback { trial: String, fallback_key: String },
    ByList { list_key: String, max: usize },
}

/// One dependency request made by a construct phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub kind: RequestKind,
    pub expected: TypeName,
    pub essential: bool,
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.essential { "" } else { "Non-" };
        match &self.kind {
            RequestKind::ByName { name } => write!(
                f,
                "{prefix}Essential Component - Type '{}' - Name = '{name}'",
                self.expected
            ),
            RequestKind::ByKey { key } => write!(
                f,
                "{prefix}Essential Component - Type '{}' - Key = '{key}'",
                self.expected
            ),
            RequestKind::ByNameWithKeyFallback {
                trial,
                fallback_key,
            } => write!(
                f,
                "{prefix}Essential Component - Type '{}' - Trial Name = '{trial}' - Fall back key = '{fallback_key}'",
                self.expected
            ),
            RequestKind::ByList { list_key, .. } => write!(
                f,
                "{prefix}Essential Components of type '{}' in list named '{list_key}'",
                self.expected
            ),
        }
    }
}

/// One parameter read made by a construct phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub key: String,
    pub kind: &'static str,
    pub default: String,
    /// Read from the root dictionary rather than the component's own section.
    pub root: bool,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.root {
            write!(f, "Root Dictionary ")?;
        }
        write!(
            f,
            "Parameter - Key '{}' - Type '{}' - Default = {}",
            self.key, self.kind, self.default
        )
    }
}

/// The dependency document of one component type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Documentation {
    pub type_name: TypeName,
    pub parent: Option<TypeName>,
    pub requests: Vec<Request>,
    pub parameters: Vec<Parameter>,
}

impl fmt::Display for Documentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Class '{}'", self.type_name)?;
        if let Some(parent) = self.parent {
            writeln!(f, "\tParent - {parent}")?;
        }
        for request in &self.requests {
            writeln!(f, "\t{request}")?;
        }
        for parameter in &self.parameters {
            writeln!(f, "\t{parameter}")?;
        }
        Ok(())
    }
}

/// A factory that constructs nothing and records every request made of it.
///
/// Running a type's construct phase against this factory produces the type's dependency
/// document. Every resolution returns absent and every getter returns its default.
pub struct DocumentationFactory<'a> {
    registries: &'a Registries,
    live: LiveRegistry,
    requests: Vec<Request>,
    parameters: Vec<Parameter>,
}

impl<'a> DocumentationFactory<'a> {
    pub fn new(registries: &'a Registries) -> Self {
        Self {
            registries,
            live: LiveRegistry::new(),
            requests: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// Document one registered type.
    ///
    /// A default instance is created, registered with this factory's own live registry while
    /// its construct phase is forced against the factory, and released afterwards.
    pub fn document_type(&mut self, type_name: &str) -> Result<Documentation> {
        let handle = self.registries.instantiate(type_name, type_name)?;
        self.requests.clear();
        self.parameters.clear();

        self.live.add(handle.clone())?;
        let result = handle.construct(self, &mut (), true);
        self.live.remove_entry_only(handle.name());
        result?;

        let type_name = handle.type_name();
        Ok(Documentation {
            type_name,
            parent: self.registries.hierarchy().parent(type_name.as_str()),
            requests: mem::take(&mut self.requests),
            parameters: mem::take(&mut self.parameters),
        })
    }

    /// Document every registered type, in registry order.
    pub fn document_all(&mut self) -> Result<Vec<Documentation>> {
        self.registries
            .components()
            .types()
            .into_iter()
            .map(|type_name| self.document_type(type_name.as_str()))
            .collect()
    }

    #[inline]
    pub fn live(&self) -> &LiveRegistry {
        &self.live
    }

    fn request(&mut self, kind: RequestKind, expected: TypeName, essential: bool) {
        let request = Request {
            kind,
            expected,
            essential,
        };
        log::info!("{request}");
        self.requests.push(request);
    }

    fn parameter<T: fmt::Display>(
        &mut self,
        key: &str,
        kind: &'static str,
        default: T,
        root: bool,
    ) -> T {
        let parameter = Parameter {
            key: key.to_string(),
            kind,
            default: default.to_string(),
            root,
        };
        log::info!("{parameter}");
        self.parameters.push(parameter);
        default
    }
}

impl Factory for DocumentationFactory<'_> {
    fn construct_by_name(
        &mut self,
        name: &str,
        expected: TypeName,
        essential: bool,
        _data: &mut dyn Any,
    ) -> Result<Option<Handle>> {
        self.request(
            RequestKind::ByName {
                name: name.to_string(),
            },
            expected,
            essential,
        );
        Ok(None)
    }

    fn construct_by_key(
        &mut self,
        _parent: &str,
        key: &str,
        expected: TypeName,
        essential: bool,
        _data: &mut dyn Any,
    ) -> Result<Option<Handle>> {
        self.request(
            RequestKind::ByKey {
                key: key.to_string(),
            },
            expected,
            essential,
        );
        Ok(None)
    }

    fn construct_by_name_with_key_fallback(
        &mut self,
        _parent: &str,
        trial: &str,
        fallback_key: &str,
        expected: TypeName,
        essential: bool,
        _data: &mut dyn Any,
    ) -> Result<Option<Handle>> {
        self.request(
            RequestKind::ByNameWithKeyFallback {
                trial: trial.to_string(),
                fallback_key: fallback_key.to_string(),
            },
            expected,
            essential,
        );
        Ok(None)
    }

    fn construct_by_list(
        &mut self,
        _parent: &str,
        list_key: &str,
        max: usize,
        expected: TypeName,
        essential: bool,
        _data: &mut dyn Any,
    ) -> Result<Vec<Option<Handle>>> {
        self.request(
            RequestKind::ByList {
                list_key: list_key.to_string(),
                max,
            },
            expected,
            essential,
        );
        Ok(Vec::new())
    }

    fn get_double(&mut self, _component: &str, key: &str, default: f64) -> Result<f64> {
        Ok(self.parameter(key, "double", default, false))
    }

    fn get_int(&mut self, _component: &str, key: &str, default: i64) -> Result<i64> {
        Ok(self.parameter(key, "int", default, false))
    }

    fn get_unsigned(&mut self, _component: &str, key: &str, default: u64) -> Result<u64> {
        Ok(self.parameter(key, "unsigned int", default, false))
    }

    fn get_bool(&mut self, _component: &str, key: &str, default: bool) -> Result<bool> {
        Ok(self.parameter(key, "bool", default, false))
    }

    fn get_string(&mut self, _component: &str, key: &str, default: &str) -> Result<String> {
        Ok(self.parameter(key, "string", default, false).to_string())
    }

    fn root_double(&mut self, key: &str, default: f64) -> Result<f64> {
        Ok(self.parameter(key, "double", default, true))
    }

    fn root_int(&mut self, key: &str, default: i64) -> Result<i64> {
        Ok(self.parameter(key, "int", default, true))
    }

    fn root_unsigned(&mut self, key: &str, default: u64) -> Result<u64> {
        Ok(self.parameter(key, "unsigned int", default, true))
    }

    fn root_bool(&mut self, key: &str, default: bool) -> Result<bool> {
        Ok(self.parameter(key, "bool", default, true))
    }

    fn root_string(&mut self, key: &str, default: &str) -> Result<String> {
        Ok(self.parameter(key, "string", default, true).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Typed;
    use crate::error::Error;
    use crate::testing::{self, Bar, Foo};

    #[test]
    fn records_every_request_of_a_construct_phase() {
        // Given
        let registries = testing::registries();
        let mut factory = DocumentationFactory::new(&registries);

        // When
        let doc = factory.document_type("Foo").unwrap();

        // Then
        assert_eq!(doc.type_name, Foo::TYPE);
        assert_eq!(doc.parent, Some(TypeName::COMPONENT));
        assert_eq!(
            doc.requests,
            vec![Request {
                kind: RequestKind::ByKey { key: "Bar".into() },
                expected: Bar::TYPE,
                essential: false,
            }]
        );
        assert_eq!(doc.parameters[0].key, "scale");
        assert_eq!(doc.parameters[0].default, "1");
    }

    #[test]
    fn documentation_renders_the_dependency_document() {
        let registries = testing::registries();
        let mut factory = DocumentationFactory::new(&registries);

        let text = factory.document_type("Group").unwrap().to_string();

        assert_eq!(
            text,
            "Class 'Group'\n\
             \tParent - Component\n\
             \tEssential Components of type 'Component' in list named 'Members'\n\
             \tParameter - Key 'max' - Type 'unsigned int' - Default = 8\n"
        );
    }

    #[test]
    fn essential_dependencies_resolve_to_absent() {
        // Given - a link would fail with a real factory if its essential lookup failed
        let registries = testing::registries();
        let mut factory = DocumentationFactory::new(&registries);

        // When
        let doc = factory.document_type("Link").unwrap();

        // Then
        assert_eq!(doc.requests.len(), 1);
        assert_eq!(
            doc.requests[0].to_string(),
            "Non-Essential Component - Type 'Link' - Key = 'Next'"
        );
        assert!(factory.live().is_empty());
    }

    #[test]
    fn types_can_be_documented_repeatedly() {
        let registries = testing::registries();
        let mut factory = DocumentationFactory::new(&registries);
        let first = factory.document_type("Group").unwrap();
        let second = factory.document_type("Group").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn document_all_covers_every_registered_type() {
        let registries = testing::registries();
        let mut factory = DocumentationFactory::new(&registries);

        let docs = factory.document_all().unwrap();

        let names: Vec<_> = docs.iter().map(|doc| doc.type_name).collect();
        assert_eq!(names, registries.components().types());
    }

    #[test]
    fn unknown_types_cannot_be_documented() {
        let registries = testing::registries();
        let mut factory = DocumentationFactory::new(&registries);
        assert!(matches!(
            factory.document_type("Nope"),
            Err(Error::UnknownType { .. })
        ));
    }
}
