//! A configuration-driven component framework.
//!
//! Every subsystem of a simulation is a named, typed [`Component`]. A run reads a nested
//! [`config::Dictionary`], creates the components it declares from their registered default
//! constructors, lets each one resolve its dependencies through a [`factory::Factory`] and then
//! drives all of them through the build, initialise, execute and destroy phases.
//!
//! ```rust,ignore
//! let registries = Registries::new();
//! registries.register::<Mesh>()?;
//! registries.register::<Solver>()?;
//!
//! let root = Dictionary::from_json_str(&text)?;
//! let mut session = Session::new(&registries, &root);
//! session.run(&mut ())?;
//! session.finish();
//! ```

// Lets the derive macros name this crate as `::strata_framework` from inside it.
extern crate self as strata_framework;

pub mod component;
pub mod config;
pub mod error;
pub mod factory;
pub mod live;
pub mod registries;
pub mod session;
pub mod similar;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use component::{Component, ComponentType, Handle, Phase, Stage, Typed};
pub use config::{Dictionary, Value};
pub use error::{Error, Result};
pub use factory::{ComponentFactory, ConstructContext, DocumentationFactory, Factory};
pub use live::LiveRegistry;
pub use registries::Registries;
pub use session::Session;
pub use types::{TypeHierarchy, TypeName};
