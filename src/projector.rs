//! Configuration projection
//!
//! Flattens a configuration object into dotted string properties so the
//! context can resolve `${...}` placeholders against it.
//!
//! Keys follow one convention:
//!
//! - a mapping child `k` under path `P` becomes `P.k` (or `k` at the top level)
//! - a sequence element `i` under path `P` becomes `P[i]`
//! - a sequence also gets an entry at `P` itself, its elements comma-joined
//! - a mapping never gets an entry at its own path
//!
//! ```rust
//! use injector_bundle::{ConfigurationPropertySource, ObjectMapper};
//! use serde_json::json;
//!
//! let config = json!({
//!     "test": { "first": "test1", "second": ["test2", "test3"], "third": 4 }
//! });
//! let source = ConfigurationPropertySource::new(&config, &ObjectMapper::new()).unwrap();
//!
//! assert_eq!(source.lookup("test.first"), Some("test1"));
//! assert_eq!(source.lookup("test.second[1]"), Some("test3"));
//! assert_eq!(source.lookup("test.second"), Some("test2,test3"));
//! assert_eq!(source.lookup("test.third"), Some("4"));
//! assert_eq!(source.lookup("test"), None);
//! ```

use crate::ObjectMapper;
use crate::property::PropertySource;
use ahash::AHashMap;
use serde::Serialize;
use serde_json::{Map, Value};

#[cfg(feature = "logging")]
use tracing::debug;

/// Name the projection is installed under in the context's property sources
pub const CONFIGURATION_PROPERTY_SOURCE_NAME: &str = "dwConfigurationPropertySource";

/// Immutable, flattened view of a configuration object.
///
/// Built once from a snapshot of the configuration; the configuration tree
/// is dropped after projection.
#[derive(Debug, Clone)]
pub struct ConfigurationPropertySource {
    properties: AHashMap<String, String>,
}

impl ConfigurationPropertySource {
    /// Project `configuration` through `mapper`.
    ///
    /// Fails if the mapper cannot turn the configuration into a mapping.
    pub fn new<C: Serialize + ?Sized>(configuration: &C, mapper: &ObjectMapper) -> serde_json::Result<Self> {
        let root = mapper.to_mapping(configuration)?;

        let mut projection = Projection {
            mapper,
            properties: AHashMap::new(),
        };
        projection.walk_mapping(&root, "");

        #[cfg(feature = "logging")]
        debug!(
            target: "injector_bundle",
            properties = projection.properties.len(),
            "Projected configuration into properties"
        );

        Ok(Self {
            properties: projection.properties,
        })
    }

    /// The projected value for an exact key.
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Every projected key, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.properties.keys().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl PropertySource for ConfigurationPropertySource {
    fn name(&self) -> &str {
        CONFIGURATION_PROPERTY_SOURCE_NAME
    }

    fn property(&self, key: &str) -> Option<String> {
        self.lookup(key).map(str::to_owned)
    }

    fn property_names(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }

    fn contains_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }
}

/// Working state of one projection
struct Projection<'a> {
    mapper: &'a ObjectMapper,
    properties: AHashMap<String, String>,
}

impl Projection<'_> {
    /// Later writes to the same key win.
    #[inline]
    fn emit(&mut self, path: String, value: String) {
        self.properties.insert(path, value);
    }

    fn walk(&mut self, node: &Value, path: String) {
        match node {
            Value::Object(map) => self.walk_mapping(map, &path),
            Value::Array(items) => {
                let joined = items
                    .iter()
                    .map(|item| self.mapper.text_of(item))
                    .collect::<Vec<_>>()
                    .join(",");

                self.emit(path.clone(), joined);

                for (index, item) in items.iter().enumerate() {
                    self.walk(item, format!("{path}[{index}]"));
                }
            }
            Value::String(text) => self.emit(path, text.clone()),
            Value::Null => self.emit(path, String::new()),
            Value::Bool(_) | Value::Number(_) => {
                let text = self.mapper.text_of(node);
                self.emit(path, text);
            }
        }
    }

    fn walk_mapping(&mut self, map: &Map<String, Value>, path: &str) {
        for (key, value) in map {
            self.walk(value, child_path(path, key));
        }
    }
}

/// Keys are copied verbatim; a key that starts with `[` attaches without a dot.
fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else if key.starts_with('[') {
        format!("{path}{key}")
    } else {
        format!("{path}.{key}")
    }
}
