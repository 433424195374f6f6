//! The host JSON mapper
//!
//! Converts configuration objects to and from generic JSON trees. The
//! projector relies on it for the tree it walks and for the text of
//! non-scalar list elements.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// JSON object mapper shared by the host and, once registered, by beans.
#[derive(Debug, Clone, Default)]
pub struct ObjectMapper {
    pretty: bool,
}

impl ObjectMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent output of [`write_value_as_string`](Self::write_value_as_string)
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Convert any serializable value to a generic tree.
    pub fn to_tree<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<Value> {
        serde_json::to_value(value)
    }

    /// Convert a value to a generic mapping.
    ///
    /// Fails when the value does not serialize to a JSON object.
    pub fn to_mapping<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<Map<String, Value>> {
        match self.to_tree(value)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "expected a mapping at the top level, found {}",
                kind_of(&other)
            ))),
        }
    }

    /// Build a typed value back from a tree.
    pub fn from_tree<T: DeserializeOwned>(&self, tree: Value) -> serde_json::Result<T> {
        serde_json::from_value(tree)
    }

    /// Parse a typed value from JSON text.
    pub fn read_value<T: DeserializeOwned>(&self, text: &str) -> serde_json::Result<T> {
        serde_json::from_str(text)
    }

    pub fn write_value_as_string<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }

    /// Default text form of a tree node.
    ///
    /// Strings come back verbatim, `null` as the empty string, numbers and
    /// booleans in their JSON lexical form, containers as compact JSON.
    pub fn text_of(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(_) | Value::Object(_) => value.to_string(),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
