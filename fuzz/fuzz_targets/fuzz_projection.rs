#![no_main]

//! Fuzz target for configuration projection
//!
//! Builds arbitrary configuration trees and checks that every scalar leaf
//! and every list can be read back from the projection.

use arbitrary::Arbitrary;
use injector_bundle::{ConfigurationPropertySource, ObjectMapper};
use libfuzzer_sys::fuzz_target;
use serde_json::{Map, Number, Value};

const MAX_DEPTH: usize = 6;

/// Configuration node; keys come from a small alphabet so that no two paths
/// can collapse into the same property name
#[derive(Debug, Arbitrary)]
enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Node>),
    Map(Vec<(u8, Node)>),
}

fn key(byte: u8) -> String {
    char::from(b'a' + byte % 6).to_string()
}

fn to_value(node: &Node, depth: usize) -> Value {
    if depth > MAX_DEPTH {
        return Value::Null;
    }
    match node {
        Node::Null => Value::Null,
        Node::Bool(b) => Value::Bool(*b),
        Node::Int(i) => Value::from(*i),
        Node::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        Node::Text(s) => Value::String(s.clone()),
        Node::List(items) => Value::Array(items.iter().map(|n| to_value(n, depth + 1)).collect()),
        Node::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(k, n)| (key(*k), to_value(n, depth + 1)))
                .collect::<Map<_, _>>(),
        ),
    }
}

fn check(source: &ConfigurationPropertySource, mapper: &ObjectMapper, value: &Value, path: &str) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let child = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                check(source, mapper, v, &child);
            }
        }
        Value::Array(items) => {
            let joined: Vec<String> = items.iter().map(|v| mapper.text_of(v)).collect();
            assert_eq!(source.lookup(path), Some(joined.join(",").as_str()));
            for (i, item) in items.iter().enumerate() {
                check(source, mapper, item, &format!("{path}[{i}]"));
            }
        }
        scalar => assert_eq!(source.lookup(path), Some(mapper.text_of(scalar).as_str())),
    }
}

fuzz_target!(|entries: Vec<(u8, Node)>| {
    let root = to_value(&Node::Map(entries), 0);
    let mapper = ObjectMapper::new();

    let source = ConfigurationPropertySource::new(&root, &mapper).expect("a mapping always projects");
    check(&source, &mapper, &root, "");

    let again = ConfigurationPropertySource::new(&root, &mapper).expect("a mapping always projects");
    assert_eq!(source.len(), again.len());
    for name in source.names() {
        assert_eq!(source.lookup(name), again.lookup(name));
    }
});
