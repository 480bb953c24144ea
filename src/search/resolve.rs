//! Candidate filtering, deduplication and vertex resolution.

use hashbrown::HashSet;
use tracing::warn;

use crate::model::{Vertex, VertexId};
use crate::storage::GraphStore;
use crate::Result;

use super::Candidate;

/// Resolved search result.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// One vertex per distinct retained candidate, in first-seen order.
    pub vertices: Vec<Vertex>,
    /// Candidates at or above the retention threshold, before dedup.
    pub retained: usize,
    /// Distinct vertices that vanished before they could be resolved.
    pub omitted: usize,
}

/// Keep candidates scoring at least `retain_threshold`, one id per vertex.
///
/// Which of several qualifying candidates wins is irrelevant: every one of
/// them already passed the threshold. The returned count is the number of
/// candidates that passed, duplicates included.
pub fn retain_and_dedup(
    candidates: impl IntoIterator<Item = Candidate>,
    retain_threshold: f64,
) -> (Vec<VertexId>, usize) {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    let mut retained = 0;

    for candidate in candidates {
        if candidate.score < retain_threshold {
            continue;
        }
        retained += 1;
        if seen.insert(candidate.vertex.clone()) {
            ids.push(candidate.vertex);
        }
    }

    (ids, retained)
}

/// Filter and dedup `candidates`, then load each surviving vertex.
///
/// A vertex deleted between expansion and resolution is dropped from the
/// result instead of failing the call.
pub async fn resolve_candidates<S: GraphStore>(
    store: &S,
    tx: &S::Tx,
    candidates: impl IntoIterator<Item = Candidate>,
    retain_threshold: f64,
) -> Result<Resolution> {
    let (ids, retained) = retain_and_dedup(candidates, retain_threshold);

    let mut resolution = Resolution {
        vertices: Vec::with_capacity(ids.len()),
        retained,
        omitted: 0,
    };
    for id in ids {
        match store.get_vertex(tx, &id).await? {
            Some(vertex) => resolution.vertices.push(vertex),
            None => {
                warn!(vertex = %id, "candidate vanished before resolution, omitting");
                resolution.omitted += 1;
            }
        }
    }

    Ok(resolution)
}
