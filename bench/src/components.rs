//! Component types used across benchmarks.

use strata_framework::{Component, ComponentType, ConstructContext, Handle, Result, Typed};

/// One element of a chain of nodes. Resolves its `Next` by key and reads a `weight`.
#[derive(Typed)]
pub struct Node {
    pub next: Option<Handle>,
    pub weight: f64,
}

impl Component for Node {
    fn construct(&mut self, cx: &mut ConstructContext<'_>) -> Result<()> {
        self.next = cx.by_key::<Node>("Next", false)?;
        self.weight = cx.double("weight", 1.0)?;
        Ok(())
    }
}

impl ComponentType for Node {
    fn new_default(_name: &str) -> Self {
        Self {
            next: None,
            weight: 0.0,
        }
    }
}

/// Fan-in over a list of nodes.
#[derive(Typed)]
pub struct Hub {
    pub nodes: Vec<Handle>,
}

impl Component for Hub {
    fn construct(&mut self, cx: &mut ConstructContext<'_>) -> Result<()> {
        self.nodes = cx.by_list_packed::<Node>("Nodes", usize::MAX, true)?;
        Ok(())
    }
}

impl ComponentType for Hub {
    fn new_default(_name: &str) -> Self {
        Self { nodes: Vec::new() }
    }
}
