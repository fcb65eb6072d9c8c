//! Components and their lifecycle.
//!
//! A component is a named, typed unit of the simulation that is created from configuration,
//! wired to the components it depends on and then advanced through five phases:
//!
//! | Phase | Flag | Purpose |
//! |---|---|---|
//! | construct | [`Phases::CONSTRUCTED`] | read parameters and resolve dependencies |
//! | build | [`Phases::BUILT`] | allocate |
//! | initialise | [`Phases::INITIALISED`] | set initial values |
//! | execute | [`Phases::EXECUTED`] | do the work |
//! | destroy | [`Phases::DESTROYED`] | release resources |
//!
//! Each phase runs at most once unless it is forced. The framework does not enforce their order;
//! the driver does.

mod handle;
mod meta;
mod registry;

pub use handle::Handle;
pub use meta::{Meta, MetaDependency, MetaParam, Validation};
pub use registry::{ComponentRegistry, DEFAULT_VERSION, DefaultConstructor, MetaFn};
pub use strata_macros::Typed;

use std::{any::Any, fmt};

use bitflags::bitflags;

use crate::{error::Result, factory::ConstructContext, live::LiveRegistry, types::TypeName};

/// Static type identity of a component type.
///
/// Usually derived:
///
/// ```rust,ignore
/// #[derive(Typed)]
/// #[component(name = "FeMesh", parent = "Mesh")]
/// struct FeMesh { .. }
/// ```
pub trait Typed {
    /// The name the type is registered and configured under.
    const TYPE: TypeName;

    /// The name of the parent type in the hierarchy.
    const PARENT: TypeName;
}

/// Stands for "any component" where a dependency may be of any type.
pub enum AnyComponent {}

impl Typed for AnyComponent {
    const TYPE: TypeName = TypeName::COMPONENT;
    const PARENT: TypeName = TypeName::COMPONENT;
}

/// The behaviour of a component.
///
/// Only [`construct`](Self::construct) is required; every other phase defaults to doing nothing.
/// Components are stored erased as `Box<dyn Component>` inside a [`Handle`], which tracks which
/// phases have run.
pub trait Component: Any {
    /// Read parameters and resolve dependencies through the factory.
    fn construct(&mut self, cx: &mut ConstructContext<'_>) -> Result<()>;

    fn build(&mut self, data: &mut dyn Any) -> Result<()> {
        let _ = data;
        Ok(())
    }

    fn initialise(&mut self, data: &mut dyn Any) -> Result<()> {
        let _ = data;
        Ok(())
    }

    fn execute(&mut self, data: &mut dyn Any) -> Result<()> {
        let _ = data;
        Ok(())
    }

    fn destroy(&mut self, data: &mut dyn Any) -> Result<()> {
        let _ = data;
        Ok(())
    }

    /// Called once when the live registry is torn down.
    ///
    /// A component that owns other live components may remove them from `live` here. The
    /// registry continues with whatever entries remain.
    fn delete(&mut self, live: &mut LiveRegistry) {
        let _ = live;
    }

    /// Produce an independent copy of this component, if the type supports it.
    fn duplicate(&self) -> Option<Box<dyn Component>> {
        None
    }
}

/// A concrete component type the factory can create from a type name.
pub trait ComponentType: Component + Typed + Sized {
    /// Create an instance with default configuration. Parameters and dependencies are read
    /// later, in the construct phase.
    fn new_default(name: &str) -> Self;

    /// Describe the type's dependencies and parameters.
    fn metadata() -> Meta {
        Meta::of::<Self>()
    }
}

/// The default constructor of a [`ComponentType`], in the form the registry stores.
pub fn default_constructor<T: ComponentType>(name: &str) -> Box<dyn Component> {
    Box::new(T::new_default(name))
}

/// One of the five lifecycle phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Construct,
    Build,
    Initialise,
    Execute,
    Destroy,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Construct,
        Phase::Build,
        Phase::Initialise,
        Phase::Execute,
        Phase::Destroy,
    ];

    /// The flag recording that this phase has run.
    #[inline]
    pub const fn flag(self) -> Phases {
        match self {
            Phase::Construct => Phases::CONSTRUCTED,
            Phase::Build => Phases::BUILT,
            Phase::Initialise => Phases::INITIALISED,
            Phase::Execute => Phases::EXECUTED,
            Phase::Destroy => Phases::DESTROYED,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Construct => "construct",
            Phase::Build => "build",
            Phase::Initialise => "initialise",
            Phase::Execute => "execute",
            Phase::Destroy => "destroy",
        })
    }
}

bitflags! {
    /// The phases a component has completed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Phases: u8 {
        const CONSTRUCTED = 1 << 0;
        const BUILT = 1 << 1;
        const INITIALISED = 1 << 2;
        const EXECUTED = 1 << 3;
        const DESTROYED = 1 << 4;
    }
}

/// The furthest point a component has reached in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Uninitialised,
    Constructed,
    Built,
    Initialised,
    Executed,
    Destroyed,
}

impl From<Phases> for Stage {
    fn from(phases: Phases) -> Self {
        if phases.contains(Phases::DESTROYED) {
            Stage::Destroyed
        } else if phases.contains(Phases::EXECUTED) {
            Stage::Executed
        } else if phases.contains(Phases::INITIALISED) {
            Stage::Initialised
        } else if phases.contains(Phases::BUILT) {
            Stage::Built
        } else if phases.contains(Phases::CONSTRUCTED) {
            Stage::Constructed
        } else {
            Stage::Uninitialised
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_is_the_furthest_completed_phase() {
        assert_eq!(Stage::from(Phases::empty()), Stage::Uninitialised);
        assert_eq!(Stage::from(Phases::CONSTRUCTED), Stage::Constructed);
        assert_eq!(
            Stage::from(Phases::CONSTRUCTED | Phases::BUILT | Phases::INITIALISED),
            Stage::Initialised
        );
        // Out of order phases still report the furthest one.
        assert_eq!(Stage::from(Phases::EXECUTED), Stage::Executed);
        assert_eq!(Stage::from(Phases::all()), Stage::Destroyed);
    }

    #[test]
    fn every_phase_has_a_distinct_flag() {
        let all = Phase::ALL
            .iter()
            .fold(Phases::empty(), |acc, phase| acc | phase.flag());
        assert_eq!(all, Phases::all());
        assert_eq!(Phase::Initialise.to_string(), "initialise");
    }
}
