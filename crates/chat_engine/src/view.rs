//! Read-only mapping view over a provider response of unknown shape.

use chat_provider::RawResponse;
use serde_json::{Map, Value};

/// Canonical key/value view of one response object.
///
/// The concrete representation is resolved once, at construction. Every
/// lookup afterwards is a plain mapping read that yields `None` when the key
/// is absent or holds a value of another type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseView {
    mapping: Map<String, Value>,
    shape: &'static str,
}

impl ResponseView {
    pub fn new(raw: RawResponse) -> Self {
        let shape = raw.shape_name();
        let mapping = match raw {
            RawResponse::Dumpable(value) => match value.dump_mapping() {
                Ok(mapping) => mapping,
                Err(error) => {
                    tracing::debug!(%error, "response dump failed; using empty mapping");
                    Map::new()
                }
            },
            RawResponse::DictLike(value) => value.to_dict().into_iter().collect(),
            RawResponse::Mapping(mapping) => mapping,
            RawResponse::Opaque(Value::Object(mapping)) => mapping,
            RawResponse::Opaque(other) => {
                tracing::debug!(value = %other, "response is not a mapping; using empty mapping");
                Map::new()
            }
        };

        Self { mapping, shape }
    }

    /// Builds a view straight from a JSON value.
    pub fn from_value(value: Value) -> Self {
        Self::new(RawResponse::from_value(value))
    }

    /// Name of the representation the view was built from.
    pub fn shape(&self) -> &'static str {
        self.shape
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.mapping.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.get(key).and_then(Value::as_array)
    }

    pub fn get_object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.get(key).and_then(Value::as_object)
    }

    pub fn as_mapping(&self) -> &Map<String, Value> {
        &self.mapping
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Indented JSON rendering of the mapping, for diagnostics.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.mapping).unwrap_or_else(|error| {
            tracing::debug!(%error, "failed to render response mapping");
            "{}".to_string()
        })
    }
}

/// Mapping-shaped value's string field.
pub(crate) fn field_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.as_object()?.get(key)?.as_str()
}

/// Mapping-shaped value's array field.
pub(crate) fn field_array<'a>(value: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    value.as_object()?.get(key)?.as_array()
}
