use std::any::Any;

use strata_framework::{
    Component, ComponentType, ConstructContext, Dictionary, DocumentationFactory, Handle,
    Registries, Result, Session, Typed, TypeName, component::Meta,
};

const CONFIG: &str = r#"{
    "dt": 0.25,
    "components": {
        "solver": { "Type": "Solver", "Mesh": "mesh", "Fields": ["temperature", "pressure"], "dt": "dt" },
        "mesh": { "Type": "Mesh", "resolution": 16 },
        "temperature": { "Type": "Field", "Mesh": "mesh", "initial": 300.0 },
        "pressure": { "Type": "Field", "Mesh": "mesh", "initial": 1.0 }
    }
}"#;

/// Counts the steps every solver takes.
#[derive(Default)]
struct Run {
    steps: u64,
}

#[derive(Typed)]
struct Mesh {
    resolution: u64,
    nodes: Vec<f64>,
}

impl Component for Mesh {
    fn construct(&mut self, cx: &mut ConstructContext<'_>) -> Result<()> {
        self.resolution = cx.unsigned("resolution", 8)?;
        Ok(())
    }

    fn build(&mut self, _data: &mut dyn Any) -> Result<()> {
        let n = self.resolution as usize + 1;
        self.nodes = (0..n).map(|i| i as f64 / self.resolution as f64).collect();
        Ok(())
    }
}

impl ComponentType for Mesh {
    fn new_default(_name: &str) -> Self {
        Self {
            resolution: 0,
            nodes: Vec::new(),
        }
    }

    fn metadata() -> Meta {
        Meta::of::<Self>().param("resolution", "unsigned int", 8, "cells along the domain")
    }
}

#[derive(Typed)]
struct Field {
    mesh: Option<Handle>,
    initial: f64,
    values: Vec<f64>,
}

impl Component for Field {
    fn construct(&mut self, cx: &mut ConstructContext<'_>) -> Result<()> {
        self.mesh = cx.by_key::<Mesh>("Mesh", true)?;
        self.initial = cx.double("initial", 0.0)?;
        Ok(())
    }

    fn initialise(&mut self, _data: &mut dyn Any) -> Result<()> {
        let nodes = self
            .mesh
            .as_ref()
            .and_then(|mesh| mesh.borrow_as::<Mesh>().map(|mesh| mesh.nodes.len()))
            .unwrap_or(0);
        self.values = vec![self.initial; nodes];
        Ok(())
    }
}

impl ComponentType for Field {
    fn new_default(_name: &str) -> Self {
        Self {
            mesh: None,
            initial: 0.0,
            values: Vec::new(),
        }
    }
}

#[derive(Typed)]
struct Solver {
    name: String,
    fields: Vec<Handle>,
    dt: f64,
}

impl Component for Solver {
    fn construct(&mut self, cx: &mut ConstructContext<'_>) -> Result<()> {
        cx.by_key::<Mesh>("Mesh", true)?;
        self.fields = cx.by_list_packed::<Field>("Fields", usize::MAX, true)?;
        self.dt = cx.double("dt", 0.1)?;
        Ok(())
    }

    fn execute(&mut self, data: &mut dyn Any) -> Result<()> {
        for field in &self.fields {
            if let Some(mut field) = field.borrow_mut_as::<Field>() {
                for value in &mut field.values {
                    *value *= 1.0 - self.dt;
                }
            }
        }
        if let Some(run) = data.downcast_mut::<Run>() {
            run.steps += 1;
        }
        println!("{}: advanced {} fields by dt = {}", self.name, self.fields.len(), self.dt);
        Ok(())
    }
}

impl ComponentType for Solver {
    fn new_default(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
            dt: 0.0,
        }
    }

    fn metadata() -> Meta {
        Meta::of::<Self>()
            .dependency("Mesh", TypeName::new("Mesh"), true, "the discretisation")
            .dependency("Fields", TypeName::new("Field"), true, "the fields to advance")
            .param("dt", "double", 0.1, "time step")
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let registries = Registries::new();
    registries.register::<Mesh>()?;
    registries.register::<Field>()?;
    registries.register::<Solver>()?;

    let root = Dictionary::from_json_str(CONFIG)?;
    let mut session = Session::new(&registries, &root);
    let mut run = Run::default();
    session.run(&mut run)?;
    println!("{} components, {} solver steps", session.live().len(), run.steps);
    session.finish();

    let mut docs = DocumentationFactory::new(&registries);
    print!("{}", docs.document_type("Solver")?);
    Ok(())
}
