//! Parsed configuration consumed by the factory.
//!
//! The framework never reads a configuration file itself. It is handed an already-parsed,
//! nested [`Dictionary`] whose `components` entry lists every component to create:
//!
//! ```json
//! {
//!     "gravity": 9.81,
//!     "components": {
//!         "mesh":   { "Type": "FeMesh", "resolution": 32 },
//!         "solver": { "Type": "Solver", "Mesh": "mesh", "tolerance": "gravity" }
//!     }
//! }
//! ```
//!
//! Entries keep their declaration order, which is the order components are created and
//! constructed in.

mod value;

pub use value::Value;

use std::fmt;

use indexmap::{IndexMap, map::Entry};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, MapAccess, Visitor},
};

use crate::error::Result;

/// The key of the root entry that holds the component list.
pub const COMPONENTS_KEY: &str = "components";

/// The key of a component's sub-dictionary that names its type.
pub const TYPE_KEY: &str = "Type";

/// An ordered string-keyed map of configuration values.
///
/// Deserializing rejects a key that appears twice in the same map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dictionary(IndexMap<String, Value>);

impl Dictionary {
    /// Create a new, empty dictionary.
    #[inline]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Parse a dictionary from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get the value stored under `key`.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get the string stored under `key`. Values of any other kind are treated as absent.
    #[inline]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Get the list stored under `key`.
    #[inline]
    pub fn get_list(&self, key: &str) -> Option<&[Value]> {
        self.get(key).and_then(Value::as_list)
    }

    /// Get the sub-dictionary stored under `key`.
    #[inline]
    pub fn get_dictionary(&self, key: &str) -> Option<&Dictionary> {
        self.get(key).and_then(Value::as_dictionary)
    }

    /// Get the value under `key` converted by `convert`, or `default` if it is absent or does
    /// not convert.
    pub fn get_or<T>(&self, key: &str, default: T, convert: impl FnOnce(&Value) -> Option<T>) -> T {
        self.get(key).and_then(convert).unwrap_or(default)
    }

    /// Insert a value, replacing any existing value under `key` in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Iterate over the keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'de> Deserialize<'de> for Dictionary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DictionaryVisitor)
    }
}

struct DictionaryVisitor;

impl<'de> Visitor<'de> for DictionaryVisitor {
    type Value = Dictionary;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map with unique keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Dictionary, A::Error> {
        let mut entries = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            match entries.entry(key) {
                Entry::Occupied(entry) => {
                    return Err(de::Error::custom(format_args!(
                        "duplicate key '{}'",
                        entry.key()
                    )));
                }
                Entry::Vacant(entry) => {
                    entry.insert(value);
                }
            }
        }
        Ok(Dictionary(entries))
    }
}
