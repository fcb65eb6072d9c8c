//! Configuration-driven dependency resolution.
//!
//! A component's construct phase asks a [`Factory`] for its dependencies and parameters. Two
//! factories exist: [`ComponentFactory`] resolves against the live components of a run and
//! constructs dependencies on demand, while [`DocumentationFactory`] resolves nothing and
//! instead records what a type asks for, which is how the dependency documentation of a type
//! is produced.

mod component;
mod documentation;

pub use component::ComponentFactory;
pub use documentation::{Documentation, DocumentationFactory, Parameter, Request, RequestKind};

use std::any::Any;

use crate::{
    component::{Handle, Typed},
    error::Result,
    types::TypeName,
};

/// The resolution capability handed to a component's construct phase.
///
/// Non-essential lookups that find nothing return `Ok(None)` (or an empty list). Every other
/// failure, including an essential dependency that cannot be resolved, is an error.
pub trait Factory {
    /// Resolve the live component `name`, constructing it first if necessary, and check that it
    /// is an `expected`.
    fn construct_by_name(
        &mut self,
        name: &str,
        expected: TypeName,
        essential: bool,
        data: &mut dyn Any,
    ) -> Result<Option<Handle>>;

    /// Resolve the component named by the string at `key` in `parent`'s sub-dictionary.
    fn construct_by_key(
        &mut self,
        parent: &str,
        key: &str,
        expected: TypeName,
        essential: bool,
        data: &mut dyn Any,
    ) -> Result<Option<Handle>>;

    /// Resolve `trial` by name if it is live, and by `fallback_key` otherwise.
    fn construct_by_name_with_key_fallback(
        &mut self,
        parent: &str,
        trial: &str,
        fallback_key: &str,
        expected: TypeName,
        essential: bool,
        data: &mut dyn Any,
    ) -> Result<Option<Handle>>;

    /// Resolve every name in the list at `list_key` of `parent`'s sub-dictionary, keeping at
    /// most `max` of them.
    ///
    /// The output has one slot per kept name, in list order. A non-essential name that is not
    /// live leaves `None` in its slot.
    fn construct_by_list(
        &mut self,
        parent: &str,
        list_key: &str,
        max: usize,
        expected: TypeName,
        essential: bool,
        data: &mut dyn Any,
    ) -> Result<Vec<Option<Handle>>>;

    /// Read a double from `component`'s sub-dictionary.
    ///
    /// A string that does not read as a number names an entry of the root dictionary instead;
    /// the same holds for the other numeric getters.
    fn get_double(&mut self, component: &str, key: &str, default: f64) -> Result<f64>;

    fn get_int(&mut self, component: &str, key: &str, default: i64) -> Result<i64>;

    fn get_unsigned(&mut self, component: &str, key: &str, default: u64) -> Result<u64>;

    fn get_bool(&mut self, component: &str, key: &str, default: bool) -> Result<bool>;

    fn get_string(&mut self, component: &str, key: &str, default: &str) -> Result<String>;

    fn root_double(&mut self, key: &str, default: f64) -> Result<f64>;

    fn root_int(&mut self, key: &str, default: i64) -> Result<i64>;

    fn root_unsigned(&mut self, key: &str, default: u64) -> Result<u64>;

    fn root_bool(&mut self, key: &str, default: bool) -> Result<bool>;

    fn root_string(&mut self, key: &str, default: &str) -> Result<String>;
}

/// Everything a component's construct phase has access to.
///
/// The context is scoped to one component: its key and list lookups read that component's own
/// sub-dictionary.
pub struct ConstructContext<'a> {
    name: &'a str,
    factory: &'a mut dyn Factory,
    data: &'a mut dyn Any,
}

impl<'a> ConstructContext<'a> {
    pub fn new(name: &'a str, factory: &'a mut dyn Factory, data: &'a mut dyn Any) -> Self {
        Self {
            name,
            factory,
            data,
        }
    }

    /// The name of the component being constructed.
    #[inline]
    pub fn name(&self) -> &str {
        self.name
    }

    #[inline]
    pub fn factory(&mut self) -> &mut dyn Factory {
        &mut *self.factory
    }

    /// The run data shared by every phase.
    #[inline]
    pub fn data(&mut self) -> &mut dyn Any {
        &mut *self.data
    }

    /// The run data as a concrete type.
    pub fn data_as<T: Any>(&mut self) -> Option<&mut T> {
        self.data.downcast_mut::<T>()
    }

    /// Resolve a live component by name.
    pub fn by_name<T: Typed>(&mut self, name: &str, essential: bool) -> Result<Option<Handle>> {
        self.factory
            .construct_by_name(name, T::TYPE, essential, &mut *self.data)
    }

    /// Resolve the component named at `key` of this component's sub-dictionary.
    pub fn by_key<T: Typed>(&mut self, key: &str, essential: bool) -> Result<Option<Handle>> {
        self.factory
            .construct_by_key(self.name, key, T::TYPE, essential, &mut *self.data)
    }

    /// Resolve `trial` by name if it is live, else through `fallback_key`.
    pub fn by_name_or_key<T: Typed>(
        &mut self,
        trial: &str,
        fallback_key: &str,
        essential: bool,
    ) -> Result<Option<Handle>> {
        self.factory.construct_by_name_with_key_fallback(
            self.name,
            trial,
            fallback_key,
            T::TYPE,
            essential,
            &mut *self.data,
        )
    }

    /// Resolve every component named in the list at `list_key`, keeping at most `max`.
    ///
    /// Slots line up with the list; use [`by_list_packed`](Self::by_list_packed) to drop the
    /// absent ones.
    pub fn by_list<T: Typed>(
        &mut self,
        list_key: &str,
        max: usize,
        essential: bool,
    ) -> Result<Vec<Option<Handle>>> {
        self.factory
            .construct_by_list(self.name, list_key, max, T::TYPE, essential, &mut *self.data)
    }

    /// Like [`by_list`](Self::by_list) but keeps only the components that resolved.
    pub fn by_list_packed<T: Typed>(
        &mut self,
        list_key: &str,
        max: usize,
        essential: bool,
    ) -> Result<Vec<Handle>> {
        Ok(self
            .by_list::<T>(list_key, max, essential)?
            .into_iter()
            .flatten()
            .collect())
    }

    pub fn double(&mut self, key: &str, default: f64) -> Result<f64> {
        self.factory.get_double(self.name, key, default)
    }

    pub fn int(&mut self, key: &str, default: i64) -> Result<i64> {
        self.factory.get_int(self.name, key, default)
    }

    pub fn unsigned(&mut self, key: &str, default: u64) -> Result<u64> {
        self.factory.get_unsigned(self.name, key, default)
    }

    pub fn boolean(&mut self, key: &str, default: bool) -> Result<bool> {
        self.factory.get_bool(self.name, key, default)
    }

    pub fn string(&mut self, key: &str, default: &str) -> Result<String> {
        self.factory.get_string(self.name, key, default)
    }
}
