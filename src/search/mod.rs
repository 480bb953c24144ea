//! # Weighted Associate Search
//!
//! Level-by-level expansion of weighted paths from a start vertex.
//!
//! A path instance carries the product of the edge weights it has walked.
//! Every hop emits a candidate for the vertex it lands on, *then* decides
//! whether the path keeps going:
//!
//! ```text
//! (v, a) --w--> (u, b = a * w)
//!     emit (u, b)                 always
//!     enqueue (u, b)              only if b >= decay_threshold
//! ```
//!
//! Weights lie in `[0, 1]`, so scores never increase along a path. With a
//! positive decay threshold every path stops after a bounded number of hops,
//! unless it runs around a cycle of weight-1 edges. `max_rounds` (default
//! [`DEFAULT_MAX_ROUNDS`]) rejects that case with `SearchLimitExceeded`.
//!
//! Filtering by the retention threshold and deduplication live in
//! [`resolve`].

pub mod resolve;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{KNOWS, Vertex, VertexId};
use crate::storage::GraphStore;
use crate::{Error, Result};

pub use resolve::{Resolution, resolve_candidates, retain_and_dedup};

/// Decay threshold used when the caller does not supply one.
pub const DEFAULT_DECAY_THRESHOLD: f64 = 0.5;

/// Minimum score a candidate needs to be reported.
pub const DEFAULT_RETAIN_THRESHOLD: f64 = 0.5;

/// Expansion rounds allowed before a search is abandoned.
///
/// Paths only survive this long on weights within a hair of 1.0
/// (`0.99^64 ≈ 0.53`) or on a cycle of weight-1 edges, which never decays.
pub const DEFAULT_MAX_ROUNDS: usize = 64;

// ============================================================================
// Configuration
// ============================================================================

/// Parameters of one associate search.
///
/// `decay_threshold` decides which paths keep expanding, `retain_threshold`
/// decides which candidates are reported. The two are independent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Minimum path score to keep expanding. Must be in `(0, 1]`.
    pub decay_threshold: f64,
    /// Minimum candidate score to appear in the result. Must be in `[0, 1]`.
    pub retain_threshold: f64,
    /// Hard cap on expansion rounds. `None` relies on score decay alone and
    /// never returns on a cycle of weight-1 edges.
    pub max_rounds: Option<usize>,
    /// Edge label to walk.
    pub label: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            decay_threshold: DEFAULT_DECAY_THRESHOLD,
            retain_threshold: DEFAULT_RETAIN_THRESHOLD,
            max_rounds: Some(DEFAULT_MAX_ROUNDS),
            label: KNOWS.to_owned(),
        }
    }
}

impl SearchConfig {
    pub fn with_decay_threshold(mut self, threshold: f64) -> Self {
        self.decay_threshold = threshold;
        self
    }

    pub fn with_retain_threshold(mut self, threshold: f64) -> Self {
        self.retain_threshold = threshold;
        self
    }

    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    /// Check both thresholds against their domains.
    ///
    /// A non-positive decay threshold would let a cycle of weight-1 edges
    /// expand forever, so it is rejected rather than clamped.
    pub fn validate(&self) -> Result<()> {
        validate_decay_threshold(self.decay_threshold)?;
        if !(self.retain_threshold.is_finite() && (0.0..=1.0).contains(&self.retain_threshold)) {
            return Err(Error::InvalidArgument(format!(
                "retain threshold {} outside [0.0, 1.0]",
                self.retain_threshold
            )));
        }
        if self.max_rounds == Some(0) {
            return Err(Error::InvalidArgument("max_rounds must be at least 1".into()));
        }
        Ok(())
    }
}

/// Check that a decay threshold lies in `(0, 1]`.
pub fn validate_decay_threshold(threshold: f64) -> Result<f64> {
    if threshold.is_finite() && threshold > 0.0 && threshold <= 1.0 {
        Ok(threshold)
    } else {
        Err(Error::InvalidArgument(format!(
            "decay threshold {threshold} outside (0.0, 1.0]"
        )))
    }
}

/// Parse an optional textual decay threshold, defaulting to `0.5`.
pub fn parse_threshold(raw: Option<&str>) -> Result<f64> {
    let threshold = match raw {
        None => DEFAULT_DECAY_THRESHOLD,
        Some(text) => text.trim().parse::<f64>().map_err(|e| {
            Error::InvalidArgument(format!("threshold {text:?} is not a number: {e}"))
        })?,
    };
    validate_decay_threshold(threshold)
}

// ============================================================================
// Path instances and candidates
// ============================================================================

/// One traversal thread: where it stands and the score it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct PathInstance {
    pub vertex: VertexId,
    pub score: f64,
}

impl PathInstance {
    /// The path sitting on the start vertex, before any hop.
    pub fn origin(vertex: VertexId) -> Self {
        Self { vertex, score: 1.0 }
    }

    /// Walk one edge of weight `weight` to `target`.
    pub fn hop(&self, target: VertexId, weight: f64) -> Self {
        Self { vertex: target, score: self.score * weight }
    }
}

/// A vertex reached by some path, with that path's score.
///
/// Several candidates may name the same vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub vertex: VertexId,
    pub score: f64,
}

impl From<&PathInstance> for Candidate {
    fn from(path: &PathInstance) -> Self {
        Self { vertex: path.vertex.clone(), score: path.score }
    }
}

/// Everything one search emitted.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    /// All candidates from all rounds, unfiltered, with duplicates.
    pub candidates: Vec<Candidate>,
    /// Number of rounds that expanded a non-empty frontier.
    pub rounds: usize,
}

// ============================================================================
// Frontier engine
// ============================================================================

/// Expand weighted paths from `start` until the frontier empties.
///
/// Each round reads the outgoing edges of the whole frontier in one batch.
/// Returning to `start` extends the path as usual but is not reported as a
/// candidate.
///
/// Fails with `NotFound` if `start` does not exist, `InvalidArgument` for an
/// invalid configuration, and `SearchLimitExceeded` if `max_rounds` rounds
/// pass with paths still alive.
pub async fn expand_frontier<S: GraphStore>(
    store: &S,
    tx: &S::Tx,
    start: &VertexId,
    config: &SearchConfig,
) -> Result<Expansion> {
    config.validate()?;
    if store.get_vertex(tx, start).await?.is_none() {
        return Err(Error::NotFound(start.to_string()));
    }

    let mut frontier = vec![PathInstance::origin(start.clone())];
    let mut expansion = Expansion::default();

    while !frontier.is_empty() {
        if let Some(limit) = config.max_rounds {
            if expansion.rounds >= limit {
                warn!(%start, rounds = limit, alive = frontier.len(), "search round limit hit");
                return Err(Error::SearchLimitExceeded { rounds: limit });
            }
        }
        expansion.rounds += 1;

        let tips: Vec<VertexId> = frontier.iter().map(|p| p.vertex.clone()).collect();
        let adjacency = store.outgoing_edges_batch(tx, &tips, &config.label).await?;

        let mut next = Vec::new();
        for (path, neighbors) in frontier.iter().zip(adjacency) {
            for (target, weight) in neighbors {
                let step = path.hop(target, weight);
                if step.vertex != *start {
                    expansion.candidates.push(Candidate::from(&step));
                }
                if step.score >= config.decay_threshold {
                    next.push(step);
                }
            }
        }

        debug!(
            round = expansion.rounds,
            frontier = frontier.len(),
            next = next.len(),
            candidates = expansion.candidates.len(),
            "expanded frontier"
        );
        frontier = next;
    }

    Ok(expansion)
}

// ============================================================================
// Full search
// ============================================================================

/// Counters describing one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub rounds: usize,
    pub candidates: usize,
    pub retained: usize,
    pub omitted: usize,
}

/// Associates of a person plus how the search got there.
#[derive(Debug, Clone, Default)]
pub struct SearchReport {
    pub associates: Vec<Vertex>,
    pub stats: SearchStats,
}

/// Expand from `start`, then filter, dedup and resolve the candidates.
pub async fn find_associates<S: GraphStore>(
    store: &S,
    tx: &S::Tx,
    start: &VertexId,
    config: &SearchConfig,
) -> Result<SearchReport> {
    let expansion = expand_frontier(store, tx, start, config).await?;
    let candidates = expansion.candidates.len();
    let resolution =
        resolve_candidates(store, tx, expansion.candidates, config.retain_threshold).await?;

    Ok(SearchReport {
        stats: SearchStats {
            rounds: expansion.rounds,
            candidates,
            retained: resolution.retained,
            omitted: resolution.omitted,
        },
        associates: resolution.vertices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyMap;
    use crate::storage::MemoryStore;
    use crate::tx::TxMode;

    async fn graph(vertices: &[&str], edges: &[(&str, &str, f64)]) -> MemoryStore {
        let db = MemoryStore::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).await.unwrap();
        for v in vertices {
            db.create_vertex(&mut tx, VertexId::from(*v), PropertyMap::new()).await.unwrap();
        }
        for (from, to, w) in edges {
            db.create_edge(&mut tx, &VertexId::from(*from), &VertexId::from(*to), KNOWS, *w)
                .await
                .unwrap();
        }
        db.commit_tx(tx).await.unwrap();
        db
    }

    async fn search(db: &MemoryStore, start: &str, config: &SearchConfig) -> Result<Expansion> {
        let tx = db.begin_tx(TxMode::ReadOnly).await.unwrap();
        expand_frontier(db, &tx, &VertexId::from(start), config).await
    }

    fn score_of(expansion: &Expansion, vertex: &str) -> Vec<f64> {
        expansion
            .candidates
            .iter()
            .filter(|c| c.vertex.as_str() == vertex)
            .map(|c| c.score)
            .collect()
    }

    #[tokio::test]
    async fn test_emit_before_stop() {
        let db = graph(&["A", "B", "C"], &[("A", "B", 0.6), ("B", "C", 0.6)]).await;
        let expansion = search(&db, "A", &SearchConfig::default()).await.unwrap();

        assert_eq!(score_of(&expansion, "B"), vec![0.6]);
        let c = score_of(&expansion, "C");
        assert_eq!(c.len(), 1);
        assert!((c[0] - 0.36).abs() < 1e-12);
        // A expands, then B expands; C never does
        assert_eq!(expansion.rounds, 2);
    }

    #[tokio::test]
    async fn test_stopped_path_does_not_expand_further() {
        let db = graph(
            &["A", "B", "C", "D"],
            &[("A", "B", 0.6), ("B", "C", 0.6), ("C", "D", 1.0)],
        )
        .await;
        let expansion = search(&db, "A", &SearchConfig::default()).await.unwrap();
        assert!(score_of(&expansion, "D").is_empty());
    }

    #[tokio::test]
    async fn test_threshold_equality_keeps_expanding() {
        let db = graph(&["A", "B", "C"], &[("A", "B", 0.5), ("B", "C", 1.0)]).await;
        let expansion = search(&db, "A", &SearchConfig::default()).await.unwrap();
        assert_eq!(score_of(&expansion, "C"), vec![0.5]);
    }

    #[tokio::test]
    async fn test_duplicates_are_kept() {
        let db = graph(
            &["A", "B", "C"],
            &[("A", "B", 0.9), ("A", "C", 0.9), ("B", "C", 0.9)],
        )
        .await;
        let expansion = search(&db, "A", &SearchConfig::default()).await.unwrap();
        assert_eq!(score_of(&expansion, "C").len(), 2);
    }

    #[tokio::test]
    async fn test_start_vertex_is_not_a_candidate() {
        let db = graph(&["A", "B"], &[("A", "B", 0.9), ("B", "A", 0.9)]).await;
        let expansion = search(&db, "A", &SearchConfig::default()).await.unwrap();
        assert!(score_of(&expansion, "A").is_empty());
        // A -> B -> A -> B keeps going until the score falls below 0.5
        assert!(score_of(&expansion, "B").len() > 1);
    }

    #[tokio::test]
    async fn test_cycle_with_decaying_edge_terminates() {
        // Two weight-1 edges and one 0.9 edge: the loop loses 10% per lap
        let db = graph(
            &["A", "B", "C"],
            &[("A", "B", 1.0), ("B", "C", 1.0), ("C", "A", 0.9)],
        )
        .await;
        let config = SearchConfig::default().with_decay_threshold(0.5);
        let expansion = search(&db, "A", &config).await.unwrap();

        // 0.9^k >= 0.5 holds for k <= 6; each lap is three hops
        assert!(expansion.rounds <= 3 * 7 + 1);
        assert!(expansion.candidates.iter().all(|c| c.score <= 1.0));
    }

    #[tokio::test]
    async fn test_weight_one_cycle_hits_round_limit() {
        let db = graph(&["A", "B"], &[("A", "B", 1.0), ("B", "A", 1.0)]).await;
        let config = SearchConfig::default().with_max_rounds(16);
        let err = search(&db, "A", &config).await.unwrap_err();
        assert!(matches!(err, Error::SearchLimitExceeded { rounds: 16 }));
    }

    #[tokio::test]
    async fn test_weight_one_cycle_rejected_by_default() {
        let db = graph(&["A", "B"], &[("A", "B", 1.0), ("B", "A", 1.0)]).await;
        let err = search(&db, "A", &SearchConfig::default()).await.unwrap_err();
        assert!(matches!(err, Error::SearchLimitExceeded { rounds: DEFAULT_MAX_ROUNDS }));
    }

    #[tokio::test]
    async fn test_missing_start() {
        let db = graph(&["A"], &[]).await;
        let err = search(&db, "ghost", &SearchConfig::default()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(ref id) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_non_positive_decay_rejected() {
        let db = graph(&["A"], &[]).await;
        for bad in [0.0, -0.5, 1.5, f64::NAN] {
            let config = SearchConfig::default().with_decay_threshold(bad);
            let err = search(&db, "A", &config).await.unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "threshold {bad}");
        }
    }

    #[tokio::test]
    async fn test_isolated_start_has_no_candidates() {
        let db = graph(&["A"], &[]).await;
        let expansion = search(&db, "A", &SearchConfig::default()).await.unwrap();
        assert!(expansion.candidates.is_empty());
        assert_eq!(expansion.rounds, 1);
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold(None).unwrap(), 0.5);
        assert_eq!(parse_threshold(Some("0.25")).unwrap(), 0.25);
        assert_eq!(parse_threshold(Some(" 1 ")).unwrap(), 1.0);
        assert!(matches!(parse_threshold(Some("abc")), Err(Error::InvalidArgument(_))));
        assert!(matches!(parse_threshold(Some("0")), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_config_from_json_fills_defaults() {
        let config: SearchConfig = serde_json::from_str(r#"{"decay_threshold": 0.3}"#).unwrap();
        assert_eq!(config.decay_threshold, 0.3);
        assert_eq!(config.retain_threshold, DEFAULT_RETAIN_THRESHOLD);
        assert_eq!(config.label, KNOWS);
        assert_eq!(config.max_rounds, Some(DEFAULT_MAX_ROUNDS));
        assert!(config.validate().is_ok());
    }
}
