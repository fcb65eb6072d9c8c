use std::{
    any::Any,
    cell::{Cell, Ref, RefCell, RefMut},
    fmt,
    rc::Rc,
};

use crate::{
    component::{Component, Phase, Phases, Stage, Typed},
    error::{Error, Result},
    factory::{ConstructContext, Factory},
    live::LiveRegistry,
    types::TypeName,
};

struct Slot {
    name: String,
    type_name: TypeName,
    phases: Cell<Phases>,
    constructing: Cell<bool>,
    inner: RefCell<Box<dyn Component>>,
}

/// A shared reference to a live component.
///
/// A handle owns the component's name, its runtime type name and the record of which lifecycle
/// phases have run. Cloning a handle shares the component; it is dropped once the last handle
/// is. Dependencies are held as handles, so a component stays alive as long as anything that
/// depends on it does.
#[derive(Clone)]
pub struct Handle(Rc<Slot>);

impl Handle {
    /// Wrap a component value under `name`.
    pub fn new<T: Component + Typed>(name: impl Into<String>, component: T) -> Self {
        Self::from_boxed(name, T::TYPE, Box::new(component))
    }

    /// Wrap an already erased component, as produced by a default constructor.
    pub fn from_boxed(
        name: impl Into<String>,
        type_name: TypeName,
        component: Box<dyn Component>,
    ) -> Self {
        Self(Rc::new(Slot {
            name: name.into(),
            type_name,
            phases: Cell::new(Phases::empty()),
            constructing: Cell::new(false),
            inner: RefCell::new(component),
        }))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    #[inline]
    pub fn type_name(&self) -> TypeName {
        self.0.type_name
    }

    /// The phases that have completed.
    #[inline]
    pub fn phases(&self) -> Phases {
        self.0.phases.get()
    }

    #[inline]
    pub fn has_run(&self, phase: Phase) -> bool {
        self.phases().contains(phase.flag())
    }

    #[inline]
    pub fn is_constructed(&self) -> bool {
        self.has_run(Phase::Construct)
    }

    #[inline]
    pub fn is_built(&self) -> bool {
        self.has_run(Phase::Build)
    }

    #[inline]
    pub fn is_initialised(&self) -> bool {
        self.has_run(Phase::Initialise)
    }

    #[inline]
    pub fn is_executed(&self) -> bool {
        self.has_run(Phase::Execute)
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.has_run(Phase::Destroy)
    }

    /// The furthest stage reached.
    #[inline]
    pub fn stage(&self) -> Stage {
        Stage::from(self.phases())
    }

    /// Determine if the construct phase is currently running.
    #[inline]
    pub fn is_constructing(&self) -> bool {
        self.0.constructing.get()
    }

    /// Run the construct phase against `factory`.
    ///
    /// While it runs the handle is marked as under construction, so a factory can detect a
    /// dependency that leads back to this component.
    pub fn construct(
        &self,
        factory: &mut dyn Factory,
        data: &mut dyn Any,
        force: bool,
    ) -> Result<()> {
        self.run(Phase::Construct, force, |component| {
            self.0.constructing.set(true);
            let mut cx = ConstructContext::new(&self.0.name, factory, data);
            let result = component.construct(&mut cx);
            self.0.constructing.set(false);
            result
        })
    }

    pub fn build(&self, data: &mut dyn Any, force: bool) -> Result<()> {
        self.run(Phase::Build, force, |component| component.build(data))
    }

    pub fn initialise(&self, data: &mut dyn Any, force: bool) -> Result<()> {
        self.run(Phase::Initialise, force, |component| component.initialise(data))
    }

    pub fn execute(&self, data: &mut dyn Any, force: bool) -> Result<()> {
        self.run(Phase::Execute, force, |component| component.execute(data))
    }

    pub fn destroy(&self, data: &mut dyn Any, force: bool) -> Result<()> {
        self.run(Phase::Destroy, force, |component| component.destroy(data))
    }

    fn run(
        &self,
        phase: Phase,
        force: bool,
        f: impl FnOnce(&mut dyn Component) -> Result<()>,
    ) -> Result<()> {
        if self.has_run(phase) && !force {
            return Ok(());
        }
        let mut component = self
            .0
            .inner
            .try_borrow_mut()
            .map_err(|_| Error::ComponentBusy {
                name: self.0.name.clone(),
                phase,
            })?;

        log::trace!("{phase} '{}' ({})", self.0.name, self.0.type_name);
        f(&mut **component)?;
        self.0.phases.set(self.phases() | phase.flag());
        Ok(())
    }

    /// Run the component's teardown hook.
    pub(crate) fn delete(&self, live: &mut LiveRegistry) {
        match self.0.inner.try_borrow_mut() {
            Ok(mut component) => component.delete(live),
            Err(_) => log::warn!("component '{}' is busy and was not deleted", self.0.name),
        }
    }

    /// Copy the component under a new name, keeping the completed phases.
    ///
    /// Returns `None` if the type does not support duplication.
    pub fn duplicate(&self, name: impl Into<String>) -> Option<Handle> {
        let copy = self.0.inner.try_borrow().ok()?.duplicate()?;
        let handle = Self::from_boxed(name, self.0.type_name, copy);
        handle.0.phases.set(self.phases());
        Some(handle)
    }

    /// Borrow the component as its concrete type.
    ///
    /// Returns `None` if the component is of another type or is mutably borrowed.
    pub fn borrow_as<T: Component>(&self) -> Option<Ref<'_, T>> {
        let inner = self.0.inner.try_borrow().ok()?;
        Ref::filter_map(inner, |component| {
            let any: &dyn Any = &**component;
            any.downcast_ref::<T>()
        })
        .ok()
    }

    /// Mutably borrow the component as its concrete type.
    pub fn borrow_mut_as<T: Component>(&self) -> Option<RefMut<'_, T>> {
        let inner = self.0.inner.try_borrow_mut().ok()?;
        RefMut::filter_map(inner, |component| {
            let any: &mut dyn Any = &mut **component;
            any.downcast_mut::<T>()
        })
        .ok()
    }

    /// Determine if two handles share the same component.
    #[inline]
    pub fn ptr_eq(&self, other: &Handle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// The number of handles sharing this component.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("name", &self.0.name)
            .field("type_name", &self.0.type_name)
            .field("stage", &self.stage())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Dictionary;
    use crate::factory::ComponentFactory;
    use crate::testing::{self, Bar, Foo};

    #[test]
    fn new_handle_is_uninitialised() {
        // Given
        let handle = Handle::new("bar", Bar::named("bar"));

        // Then
        assert_eq!(handle.name(), "bar");
        assert_eq!(handle.type_name(), Bar::TYPE);
        assert_eq!(handle.stage(), Stage::Uninitialised);
        assert!(!handle.is_constructing());
        assert_eq!(handle.ref_count(), 1);
    }

    #[test]
    fn phases_run_once_unless_forced() {
        // Given
        testing::take_events();
        let handle = Handle::new("bar", Bar::named("bar"));

        // When
        handle.build(&mut (), false).unwrap();
        handle.build(&mut (), false).unwrap();
        handle.build(&mut (), true).unwrap();

        // Then
        assert_eq!(testing::take_events(), vec!["build:bar", "build:bar"]);
        assert!(handle.is_built());
        assert_eq!(handle.borrow_as::<Bar>().unwrap().builds, 2);
    }

    #[test]
    fn construct_runs_once_unless_forced() {
        // Given
        testing::take_events();
        let registries = testing::registries();
        let root = Dictionary::from_json_str(r#"{ "components": { "bar": { "Type": "Bar" } } }"#)
            .unwrap();
        let mut factory = ComponentFactory::new(&registries, &root);
        let handle = Handle::new("bar", Bar::named("bar"));

        // When
        handle.construct(&mut factory, &mut (), false).unwrap();
        handle.construct(&mut factory, &mut (), false).unwrap();
        handle.build(&mut (), false).unwrap();
        handle.construct(&mut factory, &mut (), true).unwrap();

        // Then
        assert_eq!(
            testing::take_events(),
            vec!["construct:bar", "build:bar", "construct:bar"]
        );
        assert!(handle.is_constructed());
        assert!(handle.is_built());
        assert!(!handle.is_constructing());
    }

    #[test]
    fn forcing_does_not_reset_other_flags() {
        let handle = Handle::new("bar", Bar::named("bar"));
        handle.build(&mut (), false).unwrap();
        handle.initialise(&mut (), false).unwrap();

        handle.build(&mut (), true).unwrap();

        assert_eq!(handle.phases(), Phases::BUILT | Phases::INITIALISED);
        assert_eq!(handle.stage(), Stage::Initialised);
    }

    #[test]
    fn phases_may_run_out_of_order() {
        let handle = Handle::new("bar", Bar::named("bar"));
        handle.execute(&mut (), false).unwrap();
        assert!(handle.is_executed());
        assert!(!handle.is_built());
        assert_eq!(handle.stage(), Stage::Executed);
    }

    #[test]
    fn failed_phase_leaves_flag_clear() {
        // Given
        let handle = Handle::new("bar", Bar { fail_build: true, ..Bar::named("bar") });

        // When
        let result = handle.build(&mut (), false);

        // Then
        assert!(matches!(result, Err(Error::Component { .. })));
        assert!(!handle.is_built());
    }

    #[test]
    fn phase_on_a_borrowed_component_is_busy() {
        // Given
        let handle = Handle::new("bar", Bar::named("bar"));
        let _guard = handle.borrow_mut_as::<Bar>().unwrap();

        // When
        let result = handle.initialise(&mut (), false);

        // Then
        assert!(matches!(
            result,
            Err(Error::ComponentBusy { phase: Phase::Initialise, .. })
        ));
    }

    #[test]
    fn run_data_reaches_the_component() {
        let handle = Handle::new("bar", Bar::named("bar"));
        let mut steps = 0u32;
        handle.execute(&mut steps, false).unwrap();
        assert_eq!(steps, 1);
    }

    #[test]
    fn borrow_as_checks_the_concrete_type() {
        let handle = Handle::new("bar", Bar::named("bar"));
        assert!(handle.borrow_as::<Bar>().is_some());
        assert!(handle.borrow_as::<Foo>().is_none());
    }

    #[test]
    fn clones_share_the_component() {
        // Given
        let handle = Handle::new("bar", Bar::named("bar"));
        let other = handle.clone();

        // When
        other.build(&mut (), false).unwrap();

        // Then
        assert!(handle.is_built());
        assert!(handle.ptr_eq(&other));
        assert_eq!(handle.ref_count(), 2);
        drop(other);
        assert_eq!(handle.ref_count(), 1);
    }

    #[test]
    fn duplicate_copies_value_and_flags() {
        // Given
        let handle = Handle::new("foo", Foo::with_scale(2.5));
        handle.build(&mut (), false).unwrap();

        // When
        let copy = handle.duplicate("foo-copy").unwrap();

        // Then
        assert_eq!(copy.name(), "foo-copy");
        assert!(copy.is_built());
        assert!(!copy.ptr_eq(&handle));
        assert_eq!(copy.borrow_as::<Foo>().unwrap().scale, 2.5);
    }

    #[test]
    fn types_without_duplicate_cannot_be_copied() {
        let handle = Handle::new("bar", Bar::named("bar"));
        assert!(handle.duplicate("bar-copy").is_none());
    }
}
