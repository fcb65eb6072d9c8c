//! Descriptive metadata for component types.
//!
//! Every concrete type registers a metadata function alongside its constructor. The metadata
//! names the type's dependencies and parameters so a configuration can be checked against it
//! without constructing anything.

use std::fmt;

use crate::{
    component::Typed,
    config::{Dictionary, TYPE_KEY},
    types::TypeName,
};

/// A dependency a component type resolves from its sub-dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaDependency {
    /// The key in the component's sub-dictionary.
    pub name: &'static str,
    /// The expected type of the resolved component.
    pub type_name: TypeName,
    pub description: &'static str,
    pub essential: bool,
}

/// A scalar parameter a component type reads from its sub-dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaParam {
    pub name: &'static str,
    /// The kind of value, e.g. `"double"`.
    pub type_name: &'static str,
    pub description: &'static str,
    /// The default, rendered as text.
    pub default: String,
}

/// Metadata describing a component type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    pub type_name: TypeName,
    pub parent: TypeName,
    pub project: &'static str,
    pub location: &'static str,
    pub web: &'static str,
    pub copyright: &'static str,
    pub license: &'static str,
    pub description: &'static str,
    pub dependencies: Vec<MetaDependency>,
    pub params: Vec<MetaParam>,
}

impl Meta {
    /// Start the metadata of a type with empty descriptive fields.
    pub fn of<T: Typed>() -> Self {
        Self::new(T::TYPE, T::PARENT)
    }

    pub fn new(type_name: TypeName, parent: TypeName) -> Self {
        Self {
            type_name,
            parent,
            project: "",
            location: "",
            web: "",
            copyright: "",
            license: "",
            description: "",
            dependencies: Vec::new(),
            params: Vec::new(),
        }
    }

    pub fn project(
        mut self,
        project: &'static str,
        location: &'static str,
        web: &'static str,
    ) -> Self {
        self.project = project;
        self.location = location;
        self.web = web;
        self
    }

    pub fn license(mut self, copyright: &'static str, license: &'static str) -> Self {
        self.copyright = copyright;
        self.license = license;
        self
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Add a dependency entry.
    pub fn dependency(
        mut self,
        name: &'static str,
        type_name: TypeName,
        essential: bool,
        description: &'static str,
    ) -> Self {
        self.dependencies.push(MetaDependency {
            name,
            type_name,
            description,
            essential,
        });
        self
    }

    /// Add a parameter entry.
    pub fn param(
        mut self,
        name: &'static str,
        type_name: &'static str,
        default: impl fmt::Display,
        description: &'static str,
    ) -> Self {
        self.params.push(MetaParam {
            name,
            type_name,
            description,
            default: default.to_string(),
        });
        self
    }

    /// The essential dependencies, in declaration order.
    pub fn essential(&self) -> impl Iterator<Item = &MetaDependency> {
        self.dependencies.iter().filter(|dep| dep.essential)
    }

    /// The optional dependencies, in declaration order.
    pub fn optional(&self) -> impl Iterator<Item = &MetaDependency> {
        self.dependencies.iter().filter(|dep| !dep.essential)
    }

    /// Compare a component's sub-dictionary against this metadata.
    pub fn validate(&self, name: &str, section: Option<&Dictionary>) -> Validation {
        let mut validation = Validation {
            name: name.to_string(),
            type_name: self.type_name,
            missing: Vec::new(),
            unexpected: Vec::new(),
            params: Vec::new(),
        };
        let Some(section) = section else {
            validation.missing = self.essential().map(|dep| dep.name).collect();
            return validation;
        };

        validation.missing = self
            .essential()
            .filter(|dep| !section.contains_key(dep.name))
            .map(|dep| dep.name)
            .collect();
        for key in section.keys() {
            if key == TYPE_KEY {
                continue;
            }
            if self.params.iter().any(|param| param.name == key) {
                validation.params.push(key.to_string());
            } else if !self.dependencies.iter().any(|dep| dep.name == key) {
                validation.unexpected.push(key.to_string());
            }
        }
        validation
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Type: {}", self.type_name)?;
        writeln!(f, "Project: {}", self.project)?;
        writeln!(f, "Location: {}", self.location)?;
        writeln!(f, "Project Web: {}", self.web)?;
        writeln!(f, "Copyright: {}", self.copyright)?;
        writeln!(f, "License: {}", self.license)?;
        writeln!(f, "Parent: {}", self.parent)?;
        writeln!(f, "Description: {}", self.description)?;

        writeln!(f, "Essential dependencies")?;
        for dep in self.essential() {
            writeln!(f, "\t{} ({}): {}", dep.name, dep.type_name, dep.description)?;
        }
        writeln!(f, "Optional dependencies")?;
        for dep in self.optional() {
            writeln!(f, "\t{} ({}): {}", dep.name, dep.type_name, dep.description)?;
        }
        writeln!(f, "All params")?;
        for param in &self.params {
            writeln!(
                f,
                "\t{} ({}, default {}): {}",
                param.name, param.type_name, param.default, param.description
            )?;
        }
        Ok(())
    }
}

/// The outcome of checking one component's configuration against its type's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub name: String,
    pub type_name: TypeName,
    /// Essential dependencies with no entry.
    pub missing: Vec<&'static str>,
    /// Keys that are neither a dependency nor a parameter.
    pub unexpected: Vec<String>,
    /// Parameters that were given explicitly.
    pub params: Vec<String>,
}

impl Validation {
    /// A configuration is valid when no essential dependency is missing.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Component '{}' of type '{}' is {}",
            self.name,
            self.type_name,
            if self.is_valid() { "valid" } else { "invalid" }
        )?;
        for missing in &self.missing {
            writeln!(f, "\tmissing essential dependency '{missing}'")?;
        }
        for unexpected in &self.unexpected {
            writeln!(f, "\tunexpected entry '{unexpected}'")?;
        }
        Ok(())
    }
}
