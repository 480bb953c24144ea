//! Weighted, labeled edge in the property graph.

use serde::{Deserialize, Serialize};
use super::VertexId;
use crate::{Error, Result};

/// Opaque edge identifier, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A directed edge carrying a relationship-strength `weight` in `[0, 1]`.
///
/// At most one edge exists per `(src, dst, label)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub src: VertexId,
    pub dst: VertexId,
    pub label: String,
    pub weight: f64,
}

impl Edge {
    pub fn new(
        id: EdgeId,
        src: impl Into<VertexId>,
        dst: impl Into<VertexId>,
        label: impl Into<String>,
        weight: f64,
    ) -> Self {
        Self {
            id,
            src: src.into(),
            dst: dst.into(),
            label: label.into(),
            weight,
        }
    }
}

/// Check that `weight` is a finite probability in `[0, 1]`.
pub fn validate_weight(weight: f64) -> Result<f64> {
    if weight.is_finite() && (0.0..=1.0).contains(&weight) {
        Ok(weight)
    } else {
        Err(Error::InvalidArgument(format!(
            "weight {weight} outside [0.0, 1.0]"
        )))
    }
}
