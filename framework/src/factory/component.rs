use std::any::Any;

use crate::{
    component::{DEFAULT_VERSION, Handle, Meta, Validation},
    config::{COMPONENTS_KEY, Dictionary, TYPE_KEY, Value},
    error::{Error, Result},
    factory::Factory,
    live::LiveRegistry,
    registries::Registries,
    similar::SUGGESTION_COUNT,
    types::TypeName,
};

/// The name reported for parameters read from the root dictionary.
const ROOT: &str = "root";

/// Resolves dependencies against the live components of one run.
///
/// The factory borrows the configuration and the registries, and owns the run's
/// [`LiveRegistry`]. Resolving a component that has not been constructed constructs it on the
/// spot, so dependencies are always constructed before they are handed out.
pub struct ComponentFactory<'a> {
    registries: &'a Registries,
    root: &'a Dictionary,
    components: Option<&'a Dictionary>,
    live: LiveRegistry,
    /// Names whose construct phase is running, outermost first.
    in_progress: Vec<String>,
}

impl<'a> ComponentFactory<'a> {
    /// Create a factory over `root`. The component list is read from its `components` entry.
    pub fn new(registries: &'a Registries, root: &'a Dictionary) -> Self {
        Self {
            registries,
            root,
            components: root.get_dictionary(COMPONENTS_KEY),
            live: LiveRegistry::new(),
            in_progress: Vec::new(),
        }
    }

    /// Replace the component list.
    pub fn set_component_dictionary(&mut self, components: Option<&'a Dictionary>) {
        self.components = components;
    }

    #[inline]
    pub fn registries(&self) -> &'a Registries {
        self.registries
    }

    #[inline]
    pub fn root(&self) -> &'a Dictionary {
        self.root
    }

    #[inline]
    pub fn components(&self) -> Option<&'a Dictionary> {
        self.components
    }

    #[inline]
    pub fn live(&self) -> &LiveRegistry {
        &self.live
    }

    #[inline]
    pub fn live_mut(&mut self) -> &mut LiveRegistry {
        &mut self.live
    }

    pub fn into_live(self) -> LiveRegistry {
        self.live
    }

    /// The sub-dictionary of a declared component.
    pub fn section(&self, component: &str) -> Option<&'a Dictionary> {
        self.components?.get_dictionary(component)
    }

    fn require_section(&self, component: &str) -> Result<&'a Dictionary> {
        self.section(component).ok_or_else(|| Error::MissingSection {
            component: component.to_string(),
        })
    }

    /// Instantiate every declared component that is not already live, in declaration order.
    ///
    /// Returns the number of components created.
    pub fn create_all(&mut self) -> Result<usize> {
        let Some(components) = self.components else {
            log::warn!("no '{COMPONENTS_KEY}' entry in the configuration; nothing to create");
            return Ok(0);
        };

        let mut created = 0;
        for (name, value) in components.iter() {
            if self.live.contains(name) {
                log::debug!("'{name}' is already live; skipping creation");
                continue;
            }
            let type_name = value
                .as_dictionary()
                .and_then(|section| section.get_str(TYPE_KEY))
                .ok_or_else(|| Error::MissingKey {
                    component: name.to_string(),
                    key: TYPE_KEY.to_string(),
                })?;
            let handle = self
                .registries
                .components()
                .instantiate(type_name, DEFAULT_VERSION, name)?;
            self.live.add(handle)?;
            created += 1;
        }
        log::info!("created {created} components");
        Ok(created)
    }

    /// Construct every declared live component that has not been constructed yet.
    pub fn construct_all(&mut self, data: &mut dyn Any) -> Result<()> {
        let Some(components) = self.components else {
            return Ok(());
        };
        for name in components.keys() {
            if let Some(handle) = self.live.get(name).cloned()
                && !handle.is_constructed()
            {
                self.construct_handle(&handle, data)?;
            }
        }
        Ok(())
    }

    fn construct_handle(&mut self, handle: &Handle, data: &mut dyn Any) -> Result<()> {
        if handle.is_constructed() {
            return Ok(());
        }
        if handle.is_constructing() {
            let start = self
                .in_progress
                .iter()
                .position(|name| name == handle.name())
                .unwrap_or(0);
            let mut chain = self.in_progress[start..].to_vec();
            chain.push(handle.name().to_string());
            return Err(Error::ConstructionCycle { chain });
        }

        log::debug!("constructing '{}' ({})", handle.name(), handle.type_name());
        self.in_progress.push(handle.name().to_string());
        let result = handle.construct(self, data, false);
        self.in_progress.pop();
        result
    }

    /// Check a live component's configuration against its type's metadata.
    pub fn validate(&self, name: &str) -> Result<Validation> {
        let handle = self.live.get(name).ok_or_else(|| Error::MissingComponent {
            name: name.to_string(),
            suggestions: self.live.similar(name, SUGGESTION_COUNT),
        })?;
        let type_name = handle.type_name();
        let meta = self
            .registries
            .components()
            .metadata(type_name.as_str(), DEFAULT_VERSION)
            .unwrap_or_else(|| {
                let parent = self
                    .registries
                    .hierarchy()
                    .parent(type_name.as_str())
                    .unwrap_or(TypeName::COMPONENT);
                Meta::new(type_name, parent)
            });
        Ok(meta.validate(name, self.section(name)))
    }

    /// Validate every declared live component.
    pub fn validate_all(&self) -> Result<Vec<Validation>> {
        let Some(components) = self.components else {
            return Ok(Vec::new());
        };
        components
            .keys()
            .filter(|name| self.live.contains(name))
            .map(|name| self.validate(name))
            .collect()
    }

    fn parameter(&self, component: &str, key: &str) -> Result<Option<&'a Value>> {
        Ok(self.require_section(component)?.get(key))
    }

    fn numeric<T>(
        &self,
        component: &str,
        key: &str,
        default: T,
        expected: &'static str,
        convert: fn(&Value) -> Option<T>,
    ) -> Result<T> {
        let Some(mut value) = self.parameter(component, key)? else {
            log::trace!("'{component}': parameter '{key}' not given, using default");
            return Ok(default);
        };
        if value.is_reference()
            && let Some(reference) = value.as_str()
        {
            match self.root.get(reference) {
                Some(target) => {
                    log::trace!("'{component}': parameter '{key}' points to root key '{reference}'");
                    value = target;
                }
                None => return Ok(default),
            }
        }
        convert(value).ok_or_else(|| invalid(component, key, expected))
    }

    fn root_value<T>(
        &self,
        key: &str,
        default: T,
        expected: &'static str,
        convert: fn(&Value) -> Option<T>,
    ) -> Result<T> {
        match self.root.get(key) {
            Some(value) => convert(value).ok_or_else(|| invalid(ROOT, key, expected)),
            None => Ok(default),
        }
    }
}

fn invalid(component: &str, key: &str, expected: &'static str) -> Error {
    Error::InvalidValue {
        component: component.to_string(),
        key: key.to_string(),
        expected,
    }
}

/// Render a scalar as text. Lists and dictionaries have no string form.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Integer(_) | Value::Double(_) => Some(value.to_string()),
        Value::List(_) | Value::Dictionary(_) => None,
    }
}

impl Factory for ComponentFactory<'_> {
    fn construct_by_name(
        &mut self,
        name: &str,
        expected: TypeName,
        essential: bool,
        data: &mut dyn Any,
    ) -> Result<Option<Handle>> {
        let Some(handle) = self.live.get(name).cloned() else {
            if essential {
                return Err(Error::MissingComponent {
                    name: name.to_string(),
                    suggestions: self.live.similar(name, SUGGESTION_COUNT),
                });
            }
            log::debug!("non-essential component '{name}' is not live");
            return Ok(None);
        };

        self.construct_handle(&handle, data)?;
        self.registries
            .hierarchy()
            .check_type(name, handle.type_name(), expected.as_str())?;
        Ok(Some(handle))
    }

    fn construct_by_key(
        &mut self,
        parent: &str,
        key: &str,
        expected: TypeName,
        essential: bool,
        data: &mut dyn Any,
    ) -> Result<Option<Handle>> {
        let section = self.require_section(parent)?;
        let Some(value) = section.get(key) else {
            if essential {
                return Err(Error::MissingKey {
                    component: parent.to_string(),
                    key: key.to_string(),
                });
            }
            return Ok(None);
        };
        let name = value
            .as_str()
            .ok_or_else(|| invalid(parent, key, "component name"))?;
        self.construct_by_name(name, expected, essential, data)
    }

    fn construct_by_name_with_key_fallback(
        &mut self,
        parent: &str,
        trial: &str,
        fallback_key: &str,
        expected: TypeName,
        essential: bool,
        data: &mut dyn Any,
    ) -> Result<Option<Handle>> {
        if self.live.contains(trial) {
            self.construct_by_name(trial, expected, essential, data)
        } else {
            self.construct_by_key(parent, fallback_key, expected, essential, data)
        }
    }

    fn construct_by_list(
        &mut self,
        parent: &str,
        list_key: &str,
        max: usize,
        expected: TypeName,
        essential: bool,
        data: &mut dyn Any,
    ) -> Result<Vec<Option<Handle>>> {
        let section = self.require_section(parent)?;
        let Some(value) = section.get(list_key) else {
            if essential {
                return Err(Error::MissingList {
                    component: parent.to_string(),
                    key: list_key.to_string(),
                });
            }
            return Ok(Vec::new());
        };
        let list = value
            .as_list()
            .ok_or_else(|| invalid(parent, list_key, "list of component names"))?;

        let mut handles = Vec::with_capacity(list.len().min(max));
        for entry in list.iter().take(max) {
            let name = entry
                .as_str()
                .ok_or_else(|| invalid(parent, list_key, "list of component names"))?;
            handles.push(self.construct_by_name(name, expected, essential, data)?);
        }
        Ok(handles)
    }

    fn get_double(&mut self, component: &str, key: &str, default: f64) -> Result<f64> {
        self.numeric(component, key, default, "double", Value::as_double)
    }

    fn get_int(&mut self, component: &str, key: &str, default: i64) -> Result<i64> {
        self.numeric(component, key, default, "integer", Value::as_int)
    }

    fn get_unsigned(&mut self, component: &str, key: &str, default: u64) -> Result<u64> {
        self.numeric(component, key, default, "unsigned integer", Value::as_unsigned)
    }

    fn get_bool(&mut self, component: &str, key: &str, default: bool) -> Result<bool> {
        match self.parameter(component, key)? {
            Some(value) => value.as_bool().ok_or_else(|| invalid(component, key, "bool")),
            None => Ok(default),
        }
    }

    fn get_string(&mut self, component: &str, key: &str, default: &str) -> Result<String> {
        match self.parameter(component, key)? {
            Some(value) => scalar_string(value).ok_or_else(|| invalid(component, key, "string")),
            None => Ok(default.to_string()),
        }
    }

    fn root_double(&mut self, key: &str, default: f64) -> Result<f64> {
        self.root_value(key, default, "double", Value::as_double)
    }

    fn root_int(&mut self, key: &str, default: i64) -> Result<i64> {
        self.root_value(key, default, "integer", Value::as_int)
    }

    fn root_unsigned(&mut self, key: &str, default: u64) -> Result<u64> {
        self.root_value(key, default, "unsigned integer", Value::as_unsigned)
    }

    fn root_bool(&mut self, key: &str, default: bool) -> Result<bool> {
        self.root_value(key, default, "bool", Value::as_bool)
    }

    fn root_string(&mut self, key: &str, default: &str) -> Result<String> {
        match self.root.get(key) {
            Some(value) => scalar_string(value).ok_or_else(|| invalid(ROOT, key, "string")),
            None => Ok(default.to_string()),
        }
    }
}
