//! The components instantiated for one run.

use std::any::Any;

use crate::{
    component::Handle,
    error::{Error, Result},
    similar::{self, Suggestion},
};

/// An ordered registry of live components, each under a unique name.
///
/// Entries are kept in the order they were added, which is the order the bulk phase operations
/// visit them in.
#[derive(Debug, Default)]
pub struct LiveRegistry {
    entries: Vec<Handle>,
}

impl LiveRegistry {
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a live component. Names must be unique; on a clash the existing entry is kept.
    pub fn add(&mut self, handle: Handle) -> Result<()> {
        if self.contains(handle.name()) {
            return Err(Error::DuplicateName {
                name: handle.name().to_string(),
            });
        }
        log::debug!("live: added '{}' ({})", handle.name(), handle.type_name());
        self.entries.push(handle);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Handle> {
        self.entries.iter().find(|handle| handle.name() == name)
    }

    #[inline]
    pub fn at(&self, index: usize) -> Option<&Handle> {
        self.entries.get(index)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Handle::name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Handle> {
        self.entries.iter()
    }

    /// Remove an entry without running its teardown hook.
    ///
    /// The component itself lives on for as long as other handles to it exist.
    pub fn remove_entry_only(&mut self, name: &str) -> Option<Handle> {
        let index = self.entries.iter().position(|handle| handle.name() == name)?;
        Some(self.entries.remove(index))
    }

    /// Run the build phase of every entry that has not been built.
    pub fn build_all(&self, data: &mut dyn Any) -> Result<()> {
        self.for_each(data, |handle, data| handle.build(data, false))
    }

    /// Run the initialise phase of every entry that has not been initialised.
    pub fn initialise_all(&self, data: &mut dyn Any) -> Result<()> {
        self.for_each(data, |handle, data| handle.initialise(data, false))
    }

    pub fn execute_all(&self, data: &mut dyn Any) -> Result<()> {
        self.for_each(data, |handle, data| handle.execute(data, false))
    }

    pub fn destroy_all(&self, data: &mut dyn Any) -> Result<()> {
        self.for_each(data, |handle, data| handle.destroy(data, false))
    }

    fn for_each(
        &self,
        data: &mut dyn Any,
        mut f: impl FnMut(&Handle, &mut dyn Any) -> Result<()>,
    ) -> Result<()> {
        let mut index = 0;
        while let Some(handle) = self.entries.get(index) {
            f(handle, data)?;
            index += 1;
        }
        Ok(())
    }

    /// Tear down every entry.
    ///
    /// The first remaining entry is taken out, its teardown hook runs against the registry and
    /// the registry's handle is released. A hook may remove other entries; the loop re-reads
    /// what is left on every pass and ends when the registry is empty.
    pub fn delete_all(&mut self) {
        log::debug!("live: deleting {} components", self.entries.len());
        while !self.entries.is_empty() {
            let handle = self.entries.remove(0);
            handle.delete(self);
        }
    }

    /// Copy `handle` and register the copy as its name followed by `suffix`.
    pub fn duplicate(&mut self, handle: &Handle, suffix: &str) -> Result<Handle> {
        let name = format!("{}{suffix}", handle.name());
        let copy = handle.duplicate(name).ok_or_else(|| Error::NotDuplicable {
            name: handle.name().to_string(),
            type_name: handle.type_name(),
        })?;
        self.add(copy.clone())?;
        Ok(copy)
    }

    /// The live names most similar to `name`.
    pub fn similar(&self, name: &str, count: usize) -> Vec<Suggestion> {
        similar::rank(name, self.names(), count)
    }
}
