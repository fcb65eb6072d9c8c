//! A small diffusion model built out of components.

use std::any::Any;

use strata_framework::{
    Component, ComponentType, ConstructContext, Error, Handle, Registries, Result, Typed,
    component::Meta,
};

pub fn register(registries: &Registries) -> Result<()> {
    registries.register::<Mesh>()?;
    registries.register::<Field>()?;
    registries.register_abstract::<Boundary>()?;
    registries.register::<FixedValue>()?;
    registries.register::<ZeroGradient>()?;
    registries.register::<Diffusion>()?;
    registries.register::<Monitor>()?;
    Ok(())
}

/// A uniform one-dimensional mesh over `[0, length]`.
#[derive(Typed)]
pub struct Mesh {
    cells: u64,
    length: f64,
    nodes: Vec<f64>,
}

impl Mesh {
    pub fn spacing(&self) -> f64 {
        self.length / self.cells.max(1) as f64
    }
}

impl Component for Mesh {
    fn construct(&mut self, cx: &mut ConstructContext<'_>) -> Result<()> {
        self.cells = cx.unsigned("cells", 10)?;
        self.length = cx.double("length", 1.0)?;
        if self.cells == 0 {
            return Err(Error::component(cx.name(), "a mesh needs at least one cell"));
        }
        Ok(())
    }

    fn build(&mut self, _data: &mut dyn Any) -> Result<()> {
        let spacing = self.spacing();
        self.nodes = (0..=self.cells).map(|i| i as f64 * spacing).collect();
        Ok(())
    }
}

impl ComponentType for Mesh {
    fn new_default(_name: &str) -> Self {
        Self {
            cells: 0,
            length: 0.0,
            nodes: Vec::new(),
        }
    }

    fn metadata() -> Meta {
        Meta::of::<Self>()
            .description("Uniform one-dimensional mesh")
            .param("cells", "unsigned int", 10, "number of cells")
            .param("length", "double", 1.0, "domain length")
    }
}

/// Nodal values defined on a mesh.
#[derive(Typed)]
pub struct Field {
    mesh: Option<Handle>,
    initial: f64,
    values: Vec<f64>,
}

impl Field {
    pub fn values(&self) -> &[f64] {
        &self.values
    }
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

    fn metadata() -> Meta {
        Meta::of::<Self>()
            .description("Nodal field")
            .dependency("Mesh", Mesh::TYPE, true, "the mesh the field lives on")
            .param("initial", "double", 0.0, "initial value")
    }
}

/// Any condition applied at the two ends of a field.
#[derive(Typed)]
pub struct Boundary;

/// Pins both ends of the field to a value.
#[derive(Typed)]
#[component(parent = "Boundary")]
pub struct FixedValue {
    value: f64,
}

impl Component for FixedValue {
    fn construct(&mut self, cx: &mut ConstructContext<'_>) -> Result<()> {
        self.value = cx.double("value", 0.0)?;
        Ok(())
    }
}

impl ComponentType for FixedValue {
    fn new_default(_name: &str) -> Self {
        Self { value: 0.0 }
    }

    fn metadata() -> Meta {
        Meta::of::<Self>().param("value", "double", 0.0, "the pinned value")
    }
}

/// Copies the neighbouring value onto each end.
#[derive(Typed)]
#[component(parent = "Boundary")]
pub struct ZeroGradient;

impl Component for ZeroGradient {
    fn construct(&mut self, _cx: &mut ConstructContext<'_>) -> Result<()> {
        Ok(())
    }
}

impl ComponentType for ZeroGradient {
    fn new_default(_name: &str) -> Self {
        Self
    }
}

fn apply(boundary: &Handle, values: &mut [f64]) {
    let Some(last) = values.len().checked_sub(1) else {
        return;
    };
    if let Some(fixed) = boundary.borrow_as::<FixedValue>() {
        values[0] = fixed.value;
        values[last] = fixed.value;
    } else if boundary.borrow_as::<ZeroGradient>().is_some() && last > 1 {
        values[0] = values[1];
        values[last] = values[last - 1];
    }
}

/// Explicit diffusion of every listed field.
#[derive(Typed)]
pub struct Diffusion {
    name: String,
    fields: Vec<Handle>,
    boundaries: Vec<Handle>,
    diffusivity: f64,
    dt: f64,
    steps: u64,
}

impl Component for Diffusion {
    fn construct(&mut self, cx: &mut ConstructContext<'_>) -> Result<()> {
        self.fields = cx.by_list_packed::<Field>("Fields", usize::MAX, true)?;
        self.boundaries = cx.by_list_packed::<Boundary>("Boundaries", usize::MAX, false)?;
        self.diffusivity = cx.double("diffusivity", 1.0)?;
        self.dt = cx.double("dt", 0.001)?;
        self.steps = cx.unsigned("steps", 100)?;
        Ok(())
    }

    fn execute(&mut self, _data: &mut dyn Any) -> Result<()> {
        for field in &self.fields {
            let Some(mut field) = field.borrow_mut_as::<Field>() else {
                continue;
            };
            let spacing = field
                .mesh
                .as_ref()
                .and_then(|mesh| mesh.borrow_as::<Mesh>().map(|mesh| mesh.spacing()))
                .unwrap_or(1.0);
            let alpha = self.diffusivity * self.dt / (spacing * spacing);
            if alpha > 0.5 {
                log::warn!("{}: explicit step is unstable (alpha = {alpha:.3})", self.name);
            }
            for _ in 0..self.steps {
                let previous = field.values.clone();
                for i in 1..previous.len().saturating_sub(1) {
                    let laplacian = previous[i - 1] - 2.0 * previous[i] + previous[i + 1];
                    field.values[i] = previous[i] + alpha * laplacian;
                }
                for boundary in &self.boundaries {
                    apply(boundary, &mut field.values);
                }
            }
        }
        log::info!("{}: advanced {} fields {} steps", self.name, self.fields.len(), self.steps);
        Ok(())
    }
}

impl ComponentType for Diffusion {
    fn new_default(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
            boundaries: Vec::new(),
            diffusivity: 0.0,
            dt: 0.0,
            steps: 0,
        }
    }

    fn metadata() -> Meta {
        Meta::of::<Self>()
            .description("Explicit finite-difference diffusion")
            .dependency("Fields", Field::TYPE, true, "fields to diffuse")
            .dependency("Boundaries", Boundary::TYPE, false, "conditions applied after each step")
            .param("diffusivity", "double", 1.0, "diffusion coefficient")
            .param("dt", "double", 0.001, "time step")
            .param("steps", "unsigned int", 100, "steps per execution")
    }
}

/// Reports the range of a field once the run has executed.
///
/// Watches the component named `<name>Field` when one exists, otherwise the one named by its
/// `Field` entry.
#[derive(Typed)]
pub struct Monitor {
    name: String,
    field: Option<Handle>,
}

impl Component for Monitor {
    fn construct(&mut self, cx: &mut ConstructContext<'_>) -> Result<()> {
        let trial = format!("{}Field", cx.name());
        self.field = cx.by_name_or_key::<Field>(&trial, "Field", true)?;
        Ok(())
    }

    fn destroy(&mut self, _data: &mut dyn Any) -> Result<()> {
        let Some(field) = self.field.as_ref() else {
            return Ok(());
        };
        if let Some(values) = field.borrow_as::<Field>() {
            let (min, max) = values
                .values()
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
            println!("{}: '{}' spans [{min:.4}, {max:.4}]", self.name, field.name());
        }
        Ok(())
    }
}

impl ComponentType for Monitor {
    fn new_default(name: &str) -> Self {
        Self {
            name: name.to_string(),
            field: None,
        }
    }

    fn metadata() -> Meta {
        Meta::of::<Self>()
            .description("Field range reporter")
            .dependency("Field", Field::TYPE, true, "the watched field")
    }
}
