//! Vertex in the property graph.

use serde::{Deserialize, Serialize};
use super::{PropertyMap, Value};
use crate::{Error, Result};

/// Caller-supplied vertex identifier, unique across the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub String);

impl VertexId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VertexId {
    fn from(id: &str) -> Self { VertexId(id.to_owned()) }
}

impl From<String> for VertexId {
    fn from(id: String) -> Self { VertexId(id) }
}

impl From<&VertexId> for VertexId {
    fn from(id: &VertexId) -> Self { id.clone() }
}

/// A vertex in the property graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub properties: PropertyMap,
}

impl Vertex {
    pub fn new(id: impl Into<VertexId>) -> Self {
        Self {
            id: id.into(),
            properties: PropertyMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Render as a flat JSON object: every property plus the vertex `id`.
    ///
    /// A stored property literally named `id` is shadowed by the identity.
    /// The projection is lossy for non-finite floats: JSON has no NaN or
    /// infinity, so those properties render as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        let mut object: serde_json::Map<String, serde_json::Value> = self
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
            .collect();
        object.insert("id".into(), serde_json::Value::String(self.id.0.clone()));
        serde_json::Value::Object(object)
    }

    /// Build a vertex from a flat JSON object carrying its identity under `id`.
    ///
    /// Numeric ids are accepted and stringified; the remaining keys become
    /// properties.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(mut object) = json else {
            return Err(Error::InvalidArgument("vertex body must be a JSON object".into()));
        };

        let id = match object.remove("id") {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(other) => {
                return Err(Error::InvalidArgument(format!("invalid vertex id {other}")));
            }
            None => return Err(Error::InvalidArgument("missing \"id\" in body".into())),
        };
        if id.is_empty() {
            return Err(Error::InvalidArgument("missing \"id\" in body".into()));
        }

        let mut properties = PropertyMap::with_capacity(object.len());
        for (key, value) in object {
            properties.insert(key, Value::try_from(value)?);
        }

        Ok(Self { id: VertexId(id), properties })
    }
}
