//! Drives one run from configuration to teardown.

use std::any::Any;

use crate::{
    component::Handle,
    config::Dictionary,
    error::Result,
    factory::ComponentFactory,
    live::LiveRegistry,
    registries::Registries,
};

/// One run of the framework over a configuration.
///
/// [`run`](Self::run) creates every declared component, constructs them and then bulk-drives
/// the remaining phases in order. [`finish`](Self::finish) tears the live registry down.
pub struct Session<'a> {
    factory: ComponentFactory<'a>,
}

impl<'a> Session<'a> {
    pub fn new(registries: &'a Registries, root: &'a Dictionary) -> Self {
        Self {
            factory: ComponentFactory::new(registries, root),
        }
    }

    #[inline]
    pub fn factory(&self) -> &ComponentFactory<'a> {
        &self.factory
    }

    #[inline]
    pub fn factory_mut(&mut self) -> &mut ComponentFactory<'a> {
        &mut self.factory
    }

    #[inline]
    pub fn live(&self) -> &LiveRegistry {
        self.factory.live()
    }

    /// Register a component created by the host before the run starts.
    ///
    /// A declared component of the same name is then not created again.
    pub fn add(&mut self, handle: Handle) -> Result<()> {
        self.factory.live_mut().add(handle)
    }

    /// Create, construct, build, initialise, execute and destroy every component.
    pub fn run(&mut self, data: &mut dyn Any) -> Result<()> {
        log::info!("creating components");
        self.factory.create_all()?;

        log::info!("constructing components");
        self.factory.construct_all(data)?;

        let live = self.factory.live();
        log::info!("building {} components", live.len());
        live.build_all(data)?;

        log::info!("initialising {} components", live.len());
        live.initialise_all(data)?;

        log::info!("executing {} components", live.len());
        live.execute_all(data)?;

        log::info!("destroying {} components", live.len());
        live.destroy_all(data)?;
        Ok(())
    }

    /// Tear down every live component.
    pub fn finish(mut self) {
        log::info!("deleting {} components", self.live().len());
        self.factory.live_mut().delete_all();
    }
}
