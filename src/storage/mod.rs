//! # Graph Store Trait
//!
//! This is THE contract between the associate search and any storage engine.
//! The search engine and the relationship upsert only ever talk to a store
//! through this trait; a store's connection lifecycle stays behind it.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory for testing/embedding |

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::model::*;
use crate::tx::{Transaction, TxMode};
use crate::{Error, Result};

pub use memory::MemoryStore;

// ============================================================================
// Store Configuration
// ============================================================================

/// Configuration selecting a store implementation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    /// In-memory (no persistence)
    #[default]
    Memory,
}

impl StoreConfig {
    /// Parse a store configuration from JSON, e.g. `{"kind": "memory"}`.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

// ============================================================================
// Upsert outcome
// ============================================================================

/// What an edge upsert did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpsertOutcome {
    /// No matching edge existed; a new one was created.
    Created,
    /// The existing edge kept its identity and had its weight replaced.
    Updated,
}

/// Outgoing `(target, weight)` pairs of a single vertex.
pub type Neighbors = Vec<(VertexId, f64)>;

// ============================================================================
// GraphStore Trait
// ============================================================================

/// The minimal store contract the core runs against.
///
/// Lookups return `Ok(None)` for missing vertices/edges; mapping that to
/// `Error::NotFound` is the caller's decision. A store that cannot be
/// reached reports `Error::StoreUnavailable`.
#[async_trait]
pub trait GraphStore: Send + Sync + 'static {
    /// The session type for this store.
    type Tx: Transaction;

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Shut down the store. Later sessions fail with `StoreUnavailable`.
    async fn shutdown(&self) -> Result<()>;

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Acquire a session.
    async fn begin_tx(&self, mode: TxMode) -> Result<Self::Tx>;

    /// Release a session after success.
    async fn commit_tx(&self, tx: Self::Tx) -> Result<()>;

    /// Release a session after failure.
    async fn rollback_tx(&self, tx: Self::Tx) -> Result<()>;

    // ========================================================================
    // Vertex CRUD
    // ========================================================================

    /// Get a vertex by id. Returns None if not found.
    async fn get_vertex(&self, tx: &Self::Tx, id: &VertexId) -> Result<Option<Vertex>>;

    /// Create a vertex together with its properties in one step.
    /// Fails with `Conflict` if the id is taken.
    async fn create_vertex(
        &self,
        tx: &mut Self::Tx,
        id: VertexId,
        props: PropertyMap,
    ) -> Result<Vertex>;

    /// Replace every property of a vertex. No merge with the old map.
    async fn replace_vertex_properties(
        &self,
        tx: &mut Self::Tx,
        id: &VertexId,
        props: PropertyMap,
    ) -> Result<()>;

    /// Return all vertices.
    async fn all_vertices(&self, tx: &Self::Tx) -> Result<Vec<Vertex>>;

    // ========================================================================
    // Edge CRUD
    // ========================================================================

    /// Find the edge `from -[label]-> to`, if any. Direction matters.
    async fn find_edge(
        &self,
        tx: &Self::Tx,
        from: &VertexId,
        to: &VertexId,
        label: &str,
    ) -> Result<Option<Edge>>;

    /// Create an edge. Fails with `Conflict` if `(from, to, label)` already
    /// has one.
    async fn create_edge(
        &self,
        tx: &mut Self::Tx,
        from: &VertexId,
        to: &VertexId,
        label: &str,
        weight: f64,
    ) -> Result<Edge>;

    /// Replace the weight of an existing edge in place.
    async fn set_edge_weight(&self, tx: &mut Self::Tx, id: EdgeId, weight: f64) -> Result<()>;

    /// Atomically create `from -[label]-> to` or replace its weight.
    ///
    /// The lookup and the write must not interleave with another writer on
    /// the same `(from, to, label)`; that is what keeps the at-most-one-edge
    /// invariant under concurrent callers.
    async fn upsert_edge(
        &self,
        tx: &mut Self::Tx,
        from: &VertexId,
        to: &VertexId,
        label: &str,
        weight: f64,
    ) -> Result<(Edge, UpsertOutcome)>;

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Outgoing `(target, weight)` pairs of a vertex for one label.
    /// Unknown vertices have no neighbors.
    async fn outgoing_edges(
        &self,
        tx: &Self::Tx,
        id: &VertexId,
        label: &str,
    ) -> Result<Neighbors>;

    /// Outgoing edges for a whole frontier, one entry per input id, in order.
    ///
    /// Stores that can skew between reads should answer this from a single
    /// snapshot. Default falls back to sequential `outgoing_edges` calls.
    async fn outgoing_edges_batch(
        &self,
        tx: &Self::Tx,
        ids: &[VertexId],
        label: &str,
    ) -> Result<Vec<Neighbors>> {
        let mut result = Vec::with_capacity(ids.len());
        for id in ids {
            result.push(self.outgoing_edges(tx, id, label).await?);
        }
        Ok(result)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Total number of vertices.
    async fn vertex_count(&self, tx: &Self::Tx) -> Result<u64>;

    /// Total number of edges.
    async fn edge_count(&self, tx: &Self::Tx) -> Result<u64>;

    // ========================================================================
    // Administration
    // ========================================================================

    /// Drop every vertex and edge.
    async fn drop_all(&self, tx: &mut Self::Tx) -> Result<()>;
}

/// Reject writes through a read-only session.
pub(crate) fn ensure_writable<T: Transaction>(tx: &T) -> Result<()> {
    if tx.is_writable() {
        Ok(())
    } else {
        Err(Error::Storage(format!("{} is read-only", tx.id())))
    }
}
