//! Relationship upsert: one `knows` edge per ordered pair of people.

use tracing::info;

use crate::model::{Edge, KNOWS, VertexId, validate_weight};
use crate::storage::{GraphStore, UpsertOutcome};
use crate::{Error, Result};

/// Weight given to a relationship when the caller leaves it out.
pub const DEFAULT_WEIGHT: f64 = 0.5;

/// Parse an optional textual weight, defaulting to `0.5`.
pub fn parse_weight(raw: Option<&str>) -> Result<f64> {
    let weight = match raw {
        None => DEFAULT_WEIGHT,
        Some(text) => text.trim().parse::<f64>().map_err(|e| {
            Error::InvalidArgument(format!("weight {text:?} is not a number: {e}"))
        })?,
    };
    validate_weight(weight)
}

/// Create `from -[knows]-> to` with `weight`, or replace the weight of the
/// edge already there. The reverse direction is never touched.
///
/// Both endpoints must exist; the first missing one is reported as
/// `NotFound`. The lookup-and-write is delegated to the store's atomic
/// `upsert_edge`, so concurrent callers on the same pair cannot create two
/// edges.
pub async fn upsert_relationship<S: GraphStore>(
    store: &S,
    tx: &mut S::Tx,
    from: &VertexId,
    to: &VertexId,
    weight: f64,
) -> Result<(Edge, UpsertOutcome)> {
    validate_weight(weight)?;
    for id in [from, to] {
        if store.get_vertex(tx, id).await?.is_none() {
            return Err(Error::NotFound(id.to_string()));
        }
    }

    let (edge, outcome) = store.upsert_edge(tx, from, to, KNOWS, weight).await?;
    match outcome {
        UpsertOutcome::Created => info!(%from, %to, weight, edge = %edge.id, "created relationship"),
        UpsertOutcome::Updated => info!(%from, %to, weight, edge = %edge.id, "updated relationship"),
    }
    Ok((edge, outcome))
}
