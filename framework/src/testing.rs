//! Component types shared by the unit tests.
//!
//! Every phase a fixture runs is recorded as `"<phase>:<name>"` in a per-thread event log, so
//! tests can assert on the order phases ran in.

use std::{any::Any, cell::RefCell};

use crate::{
    component::{AnyComponent, Component, ComponentType, Handle, Meta, Typed},
    error::{Error, Result},
    factory::ConstructContext,
    live::LiveRegistry,
    registries::Registries,
};

thread_local! {
    static EVENTS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

pub fn record(event: impl Into<String>) {
    EVENTS.with(|events| events.borrow_mut().push(event.into()));
}

/// Drain the event log of the current thread.
pub fn take_events() -> Vec<String> {
    EVENTS.with(|events| std::mem::take(&mut *events.borrow_mut()))
}

/// Registries holding every fixture type.
pub fn registries() -> Registries {
    let registries = Registries::new();
    registries.register::<Foo>().unwrap();
    registries.register::<Bar>().unwrap();
    registries.register::<SubFoo>().unwrap();
    registries.register::<Link>().unwrap();
    registries.register::<Group>().unwrap();
    registries.register_abstract::<Shape>().unwrap();
    registries.register::<Circle>().unwrap();
    registries
}

/// Optionally depends on a [`Bar`] and reads a `scale`.
#[derive(Typed, Clone, Default)]
pub struct Foo {
    pub name: String,
    pub bar: Option<Handle>,
    pub scale: f64,
}

impl Foo {
    pub fn with_scale(scale: f64) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }
}

impl Component for Foo {
    fn construct(&mut self, cx: &mut ConstructContext<'_>) -> Result<()> {
        self.bar = cx.by_key::<Bar>("Bar", false)?;
        self.scale = cx.double("scale", 1.0)?;
        record(format!("construct:{}", self.name));
        Ok(())
    }

    fn duplicate(&self) -> Option<Box<dyn Component>> {
        Some(Box::new(self.clone()))
    }
}

impl ComponentType for Foo {
    fn new_default(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    fn metadata() -> Meta {
        Meta::of::<Self>()
            .description("Test component with an optional dependency")
            .dependency("Bar", Bar::TYPE, false, "an optional bar")
            .param("scale", "double", 1.0, "a scale factor")
    }
}

/// Records every phase it runs. Fails its construct phase when configured with `"fail": true`.
#[derive(Typed, Default)]
pub struct Bar {
    pub name: String,
    pub builds: u32,
    pub fail_build: bool,
}

impl Bar {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

impl Component for Bar {
    fn construct(&mut self, cx: &mut ConstructContext<'_>) -> Result<()> {
        if cx.boolean("fail", false)? {
            return Err(Error::component(cx.name(), "asked to fail"));
        }
        record(format!("construct:{}", self.name));
        Ok(())
    }

    fn build(&mut self, _data: &mut dyn Any) -> Result<()> {
        if self.fail_build {
            return Err(Error::component(&self.name, "build failed"));
        }
        self.builds += 1;
        record(format!("build:{}", self.name));
        Ok(())
    }

    fn initialise(&mut self, _data: &mut dyn Any) -> Result<()> {
        record(format!("initialise:{}", self.name));
        Ok(())
    }

    fn execute(&mut self, data: &mut dyn Any) -> Result<()> {
        if let Some(steps) = data.downcast_mut::<u32>() {
            *steps += 1;
        }
        record(format!("execute:{}", self.name));
        Ok(())
    }

    fn destroy(&mut self, _data: &mut dyn Any) -> Result<()> {
        record(format!("destroy:{}", self.name));
        Ok(())
    }

    fn delete(&mut self, _live: &mut LiveRegistry) {
        record(format!("delete:{}", self.name));
    }
}

impl ComponentType for Bar {
    fn new_default(name: &str) -> Self {
        Self::named(name)
    }
}

/// A [`Foo`] subtype with an essential `Partner`.
#[derive(Typed)]
#[component(parent = "Foo")]
pub struct SubFoo {
    pub name: String,
    pub partner: Option<Handle>,
}

impl Component for SubFoo {
    fn construct(&mut self, cx: &mut ConstructContext<'_>) -> Result<()> {
        self.partner = cx.by_key::<Bar>("Partner", true)?;
        record(format!("construct:{}", self.name));
        Ok(())
    }
}

impl ComponentType for SubFoo {
    fn new_default(name: &str) -> Self {
        Self {
            name: name.to_string(),
            partner: None,
        }
    }

    fn metadata() -> Meta {
        Meta::of::<Self>().dependency("Partner", Bar::TYPE, true, "the partner")
    }
}

/// One element of a chain, optionally pointing at the `Next`.
#[derive(Typed)]
pub struct Link {
    pub name: String,
    pub next: Option<Handle>,
}

impl Component for Link {
    fn construct(&mut self, cx: &mut ConstructContext<'_>) -> Result<()> {
        self.next = cx.by_key::<Link>("Next", false)?;
        record(format!("construct:{}", self.name));
        Ok(())
    }
}

impl ComponentType for Link {
    fn new_default(name: &str) -> Self {
        Self {
            name: name.to_string(),
            next: None,
        }
    }

    fn metadata() -> Meta {
        Meta::of::<Self>().dependency("Next", Link::TYPE, false, "the next link")
    }
}

/// Owns the components listed under `Members` and removes them from the live registry when it
/// is deleted.
#[derive(Typed)]
pub struct Group {
    pub name: String,
    pub members: Vec<Handle>,
    pub owned: Vec<String>,
}

impl Group {
    pub fn owning(name: &str, members: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            members: Vec::new(),
            owned: members.iter().map(|member| member.to_string()).collect(),
        }
    }
}

impl Component for Group {
    fn construct(&mut self, cx: &mut ConstructContext<'_>) -> Result<()> {
        let max = usize::try_from(cx.unsigned("max", 8)?).unwrap_or(usize::MAX);
        self.members = cx.by_list_packed::<AnyComponent>("Members", max, true)?;
        self.owned = self
            .members
            .iter()
            .map(|member| member.name().to_string())
            .collect();
        record(format!("construct:{}", self.name));
        Ok(())
    }

    fn delete(&mut self, live: &mut LiveRegistry) {
        record(format!("delete:{}", self.name));
        for member in &self.owned {
            live.remove_entry_only(member);
        }
    }
}

impl ComponentType for Group {
    fn new_default(name: &str) -> Self {
        Self::owning(name, &[])
    }

    fn metadata() -> Meta {
        Meta::of::<Self>()
            .dependency("Members", AnyComponent::TYPE, true, "the owned components")
            .param("max", "unsigned int", 8, "the most members kept")
    }
}

/// Only exists in the hierarchy.
#[derive(Typed)]
pub struct Shape;

#[derive(Typed)]
#[component(parent = "Shape")]
pub struct Circle;

impl Component for Circle {
    fn construct(&mut self, _cx: &mut ConstructContext<'_>) -> Result<()> {
        Ok(())
    }
}

impl ComponentType for Circle {
    fn new_default(_name: &str) -> Self {
        Circle
    }
}
