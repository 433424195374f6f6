//! Property sources
//!
//! A property source is a named key/value table the context consults when
//! it resolves `${...}` placeholders. Sources are ordered and the first one
//! holding a key wins.

use ahash::AHashMap;
use std::sync::{Arc, RwLock};

#[cfg(feature = "logging")]
use tracing::debug;

/// A named, enumerable table of string properties.
pub trait PropertySource: Send + Sync {
    /// Name of the source, unique within a [`PropertySources`] list
    fn name(&self) -> &str;

    /// The value for `key`, if this source defines it
    fn property(&self, key: &str) -> Option<String>;

    /// Every key this source defines, in no particular order
    fn property_names(&self) -> Vec<String>;

    fn contains_property(&self, key: &str) -> bool {
        self.property(key).is_some()
    }
}

/// A property source backed by a plain map.
#[derive(Debug, Clone, Default)]
pub struct MapPropertySource {
    name: String,
    properties: AHashMap<String, String>,
}

impl MapPropertySource {
    pub fn new(name: impl Into<String>, properties: AHashMap<String, String>) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }

    /// Build from key/value pairs
    pub fn from_pairs<K, V, I>(name: impl Into<String>, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::new(
            name,
            pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        )
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn property(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned()
    }

    fn property_names(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }

    fn contains_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }
}

/// An ordered, shared list of property sources.
///
/// Adding a source whose name is already present replaces the old one.
#[derive(Default)]
pub struct PropertySources {
    sources: RwLock<Vec<Arc<dyn PropertySource>>>,
}

impl PropertySources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a source with the highest precedence.
    pub fn add_first(&self, source: Arc<dyn PropertySource>) {
        #[cfg(feature = "logging")]
        debug!(
            target: "injector_bundle",
            source = source.name(),
            "Adding property source with highest precedence"
        );

        let mut sources = self.sources.write().unwrap_or_else(|e| e.into_inner());
        sources.retain(|s| s.name() != source.name());
        sources.insert(0, source);
    }

    /// Install a source with the lowest precedence.
    pub fn add_last(&self, source: Arc<dyn PropertySource>) {
        #[cfg(feature = "logging")]
        debug!(
            target: "injector_bundle",
            source = source.name(),
            "Adding property source with lowest precedence"
        );

        let mut sources = self.sources.write().unwrap_or_else(|e| e.into_inner());
        sources.retain(|s| s.name() != source.name());
        sources.push(source);
    }

    /// Remove a source by name, returning it if present.
    pub fn remove(&self, name: &str) -> Option<Arc<dyn PropertySource>> {
        let mut sources = self.sources.write().unwrap_or_else(|e| e.into_inner());
        let index = sources.iter().position(|s| s.name() == name)?;
        Some(sources.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn PropertySource>> {
        let sources = self.sources.read().unwrap_or_else(|e| e.into_inner());
        sources.iter().find(|s| s.name() == name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Source names, highest precedence first
    pub fn names(&self) -> Vec<String> {
        let sources = self.sources.read().unwrap_or_else(|e| e.into_inner());
        sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// The value from the first source that defines `key`
    pub fn property(&self, key: &str) -> Option<String> {
        let sources = self.sources.read().unwrap_or_else(|e| e.into_inner());
        sources.iter().find_map(|s| s.property(key))
    }

    pub fn len(&self) -> usize {
        self.sources.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for PropertySources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertySources").field("names", &self.names()).finish()
    }
}
