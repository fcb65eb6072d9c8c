//! Error types for the component framework.
//!
//! Every condition the framework treats as fatal is surfaced as an [`Error`] and propagated to
//! the driver, which decides how to terminate. Non-essential lookups never produce errors; they
//! resolve to `None` or an empty list instead.

use std::fmt;

use crate::{component::Phase, similar::Suggestion, types::TypeName};

/// Convenience result alias used throughout the framework.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while registering, creating, wiring or driving components.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A (type, version) pair was registered twice.
    #[error(
        "attempting to enter duplicate constructors for type '{type_name}' (version '{version}'); \
         this should only be done once per type"
    )]
    DuplicateRegistration { type_name: String, version: String },

    /// No default constructor is registered for the requested type.
    #[error("cannot find default constructor function for type '{requested}'{}", Suggestions(.suggestions))]
    UnknownType {
        requested: String,
        suggestions: Vec<Suggestion>,
    },

    /// Two live components were given the same name.
    #[error("trying to instantiate two components with the name of '{name}'; each component's name must be unique")]
    DuplicateName { name: String },

    /// An essential dependency is not live.
    #[error("cannot find essential component '{name}'{}", Suggestions(.suggestions))]
    MissingComponent {
        name: String,
        suggestions: Vec<Suggestion>,
    },

    /// A component has no sub-dictionary in the component list.
    #[error("can't find sub-dictionary for component '{component}'")]
    MissingSection { component: String },

    /// An essential key is absent from a component's sub-dictionary.
    #[error("component '{component}' cannot find essential entry with key '{key}'")]
    MissingKey { component: String, key: String },

    /// An essential list is absent from a component's sub-dictionary.
    #[error("component '{component}' cannot find list '{key}'")]
    MissingList { component: String, key: String },

    /// A configuration value does not have the expected shape.
    #[error("entry '{key}' of component '{component}' should be a {expected}")]
    InvalidValue {
        component: String,
        key: String,
        expected: &'static str,
    },

    /// A component was requested as a type it does not descend from.
    #[error(
        "trying to cast '{name}' as '{requested}' when it is actually of type '{actual}' \
         ('{requested}' inherits from: {}); either the hierarchy for this type is incorrect \
         or this object has been cast incorrectly",
        Chain(.requested_ancestors)
    )]
    TypeMismatch {
        name: String,
        requested: String,
        actual: TypeName,
        requested_ancestors: Vec<TypeName>,
    },

    /// A type was given a second, different parent.
    #[error("type '{child}' already inherits from '{existing}', cannot also inherit from '{requested}'")]
    ConflictingParent {
        child: TypeName,
        existing: TypeName,
        requested: TypeName,
    },

    /// Registering the edge would make a type its own ancestor.
    #[error("registering '{parent}' as the parent of '{child}' would create a cycle in the type hierarchy")]
    HierarchyCycle { child: TypeName, parent: TypeName },

    /// A dependency was requested while it was still being constructed.
    #[error("dependency cycle while constructing components: {}", .chain.join(" -> "))]
    ConstructionCycle { chain: Vec<String> },

    /// The component is already borrowed, typically because one of its own phases is running.
    #[error("component '{name}' is busy and cannot run its {phase} phase")]
    ComponentBusy { name: String, phase: Phase },

    /// The component's type does not support duplication.
    #[error("component '{name}' of type '{type_name}' cannot be duplicated")]
    NotDuplicable { name: String, type_name: TypeName },

    /// A phase function reported a failure.
    #[error("component '{name}' failed: {message}")]
    Component { name: String, message: String },

    /// The configuration document could not be read.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Construct a failure raised by component code.
    pub fn component(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Component {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// The ranked name suggestions carried by this error, if any.
    pub fn suggestions(&self) -> &[Suggestion] {
        match self {
            Error::UnknownType { suggestions, .. }
            | Error::MissingComponent { suggestions, .. } => suggestions,
            _ => &[],
        }
    }
}

/// Renders a suggestion list as the "did you mean" block of an error message.
struct Suggestions<'a>(&'a [Suggestion]);

impl fmt::Display for Suggestions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        write!(f, "\nCould you have meant one of these?")?;
        for suggestion in self.0 {
            write!(f, "\n\t{suggestion}")?;
        }
        Ok(())
    }
}

struct Chain<'a>(&'a [TypeName]);

impl fmt::Display for Chain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "nothing");
        }
        for (index, ty) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{ty}")?;
        }
        Ok(())
    }
}
