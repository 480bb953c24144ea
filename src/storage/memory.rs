//! In-memory graph store.
//!
//! This is the reference implementation of `GraphStore`.
//! It uses simple HashMaps protected by RwLock.
//!
//! ## Limitations
//!
//! - **No real transactions**: `commit_tx()` and `rollback_tx()` are no-ops.
//!   Writes are applied immediately. Rollback does NOT undo mutations.
//! - **Single-step atomicity only**: each trait call is atomic on its own
//!   (vertex creation with properties, edge upsert), multi-call sequences
//!   are not.
//!
//! Lock order is always `vertices` before `edges`.
//!
//! Use this store for:
//! - Testing the search engine and the relationship upsert
//! - Embedding the associate search in applications that don't need persistence

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use parking_lot::RwLock;
use async_trait::async_trait;
use tracing::debug;

use crate::model::*;
use crate::tx::{Transaction, TxMode, TxId};
use crate::{Error, Result};
use super::{GraphStore, Neighbors, StoreConfig, UpsertOutcome, ensure_writable};

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory property graph storage. Cloning shares the same graph.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    vertices: RwLock<HashMap<VertexId, Vertex>>,
    edges: RwLock<EdgeTable>,
    next_edge_id: AtomicU64,
    next_tx_id: AtomicU64,
    open: AtomicBool,
}

/// `(src, dst, label)` — the uniqueness key of an edge.
type EdgeKey = (VertexId, VertexId, String);

#[derive(Default)]
struct EdgeTable {
    by_id: HashMap<EdgeId, Edge>,
    by_key: HashMap<EdgeKey, EdgeId>,
    /// vertex id → ids of edges leaving it
    outgoing: HashMap<VertexId, Vec<EdgeId>>,
}

impl EdgeTable {
    fn key(from: &VertexId, to: &VertexId, label: &str) -> EdgeKey {
        (from.clone(), to.clone(), label.to_owned())
    }

    fn lookup(&self, from: &VertexId, to: &VertexId, label: &str) -> Option<&Edge> {
        self.by_key
            .get(&Self::key(from, to, label))
            .and_then(|id| self.by_id.get(id))
    }

    fn insert(&mut self, edge: Edge) {
        self.by_key.insert(Self::key(&edge.src, &edge.dst, &edge.label), edge.id);
        self.outgoing.entry(edge.src.clone()).or_default().push(edge.id);
        self.by_id.insert(edge.id, edge);
    }

    fn neighbors(&self, id: &VertexId, label: &str) -> Neighbors {
        self.outgoing
            .get(id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|eid| self.by_id.get(eid))
                    .filter(|e| e.label == label)
                    .map(|e| (e.dst.clone(), e.weight))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                vertices: RwLock::new(HashMap::new()),
                edges: RwLock::new(EdgeTable::default()),
                next_edge_id: AtomicU64::new(1),
                next_tx_id: AtomicU64::new(1),
                open: AtomicBool::new(true),
            }),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        match config {
            StoreConfig::Memory => Self::new(),
        }
    }

    fn next_edge_id(&self) -> EdgeId {
        EdgeId(self.inner.next_edge_id.fetch_add(1, Ordering::Relaxed))
    }

    fn require_endpoints(
        vertices: &HashMap<VertexId, Vertex>,
        from: &VertexId,
        to: &VertexId,
    ) -> Result<()> {
        if !vertices.contains_key(from) {
            return Err(Error::NotFound(from.to_string()));
        }
        if !vertices.contains_key(to) {
            return Err(Error::NotFound(to.to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// MemoryTx
// ============================================================================

/// In-memory session (just a marker — no real MVCC).
pub struct MemoryTx {
    id: TxId,
    mode: TxMode,
}

impl Transaction for MemoryTx {
    fn mode(&self) -> TxMode { self.mode }
    fn id(&self) -> TxId { self.id }
}

// ============================================================================
// GraphStore impl
// ============================================================================

#[async_trait]
impl GraphStore for MemoryStore {
    type Tx = MemoryTx;

    async fn shutdown(&self) -> Result<()> {
        self.inner.open.store(false, Ordering::Release);
        Ok(())
    }

    async fn begin_tx(&self, mode: TxMode) -> Result<MemoryTx> {
        if !self.inner.open.load(Ordering::Acquire) {
            return Err(Error::StoreUnavailable("memory store is shut down".into()));
        }
        let id = TxId(self.inner.next_tx_id.fetch_add(1, Ordering::Relaxed));
        Ok(MemoryTx { id, mode })
    }

    /// No-op: memory store applies writes immediately, not on commit.
    async fn commit_tx(&self, _tx: MemoryTx) -> Result<()> { Ok(()) }

    /// WARNING: No-op. Mutations applied during this session are NOT reverted.
    async fn rollback_tx(&self, _tx: MemoryTx) -> Result<()> { Ok(()) }

    // ========================================================================
    // Vertex CRUD
    // ========================================================================

    async fn get_vertex(&self, _tx: &MemoryTx, id: &VertexId) -> Result<Option<Vertex>> {
        Ok(self.inner.vertices.read().get(id).cloned())
    }

    async fn create_vertex(
        &self,
        tx: &mut MemoryTx,
        id: VertexId,
        props: PropertyMap,
    ) -> Result<Vertex> {
        ensure_writable(tx)?;
        let mut vertices = self.inner.vertices.write();
        if vertices.contains_key(&id) {
            return Err(Error::Conflict(id.to_string()));
        }
        let vertex = Vertex { id: id.clone(), properties: props };
        vertices.insert(id, vertex.clone());
        Ok(vertex)
    }

    async fn replace_vertex_properties(
        &self,
        tx: &mut MemoryTx,
        id: &VertexId,
        props: PropertyMap,
    ) -> Result<()> {
        ensure_writable(tx)?;
        let mut vertices = self.inner.vertices.write();
        let vertex = vertices.get_mut(id).ok_or_else(|| Error::NotFound(id.to_string()))?;
        vertex.properties = props;
        Ok(())
    }

    async fn all_vertices(&self, _tx: &MemoryTx) -> Result<Vec<Vertex>> {
        let mut all: Vec<Vertex> = self.inner.vertices.read().values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    // ========================================================================
    // Edge CRUD
    // ========================================================================

    async fn find_edge(
        &self,
        _tx: &MemoryTx,
        from: &VertexId,
        to: &VertexId,
        label: &str,
    ) -> Result<Option<Edge>> {
        Ok(self.inner.edges.read().lookup(from, to, label).cloned())
    }

    async fn create_edge(
        &self,
        tx: &mut MemoryTx,
        from: &VertexId,
        to: &VertexId,
        label: &str,
        weight: f64,
    ) -> Result<Edge> {
        ensure_writable(tx)?;
        validate_weight(weight)?;

        let vertices = self.inner.vertices.read();
        Self::require_endpoints(&vertices, from, to)?;

        let mut edges = self.inner.edges.write();
        if edges.lookup(from, to, label).is_some() {
            return Err(Error::Conflict(format!("{from} -[{label}]-> {to}")));
        }
        let edge = Edge::new(self.next_edge_id(), from, to, label, weight);
        edges.insert(edge.clone());
        Ok(edge)
    }

    async fn set_edge_weight(&self, tx: &mut MemoryTx, id: EdgeId, weight: f64) -> Result<()> {
        ensure_writable(tx)?;
        validate_weight(weight)?;
        let mut edges = self.inner.edges.write();
        let edge = edges.by_id.get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("edge {id}")))?;
        edge.weight = weight;
        Ok(())
    }

    async fn upsert_edge(
        &self,
        tx: &mut MemoryTx,
        from: &VertexId,
        to: &VertexId,
        label: &str,
        weight: f64,
    ) -> Result<(Edge, UpsertOutcome)> {
        ensure_writable(tx)?;
        validate_weight(weight)?;

        let vertices = self.inner.vertices.read();
        Self::require_endpoints(&vertices, from, to)?;

        // Lookup and write under one write guard
        let mut guard = self.inner.edges.write();
        let edges = &mut *guard;
        let existing = edges.by_key.get(&EdgeTable::key(from, to, label)).copied();
        if let Some(edge) = existing.and_then(|id| edges.by_id.get_mut(&id)) {
            edge.weight = weight;
            debug!(edge = %edge.id, %from, %to, weight, "updated edge weight");
            return Ok((edge.clone(), UpsertOutcome::Updated));
        }

        let edge = Edge::new(self.next_edge_id(), from, to, label, weight);
        debug!(edge = %edge.id, %from, %to, weight, "created edge");
        edges.insert(edge.clone());
        Ok((edge, UpsertOutcome::Created))
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    async fn outgoing_edges(
        &self,
        _tx: &MemoryTx,
        id: &VertexId,
        label: &str,
    ) -> Result<Neighbors> {
        Ok(self.inner.edges.read().neighbors(id, label))
    }

    /// One read guard for the whole frontier, so every tip sees the same graph.
    async fn outgoing_edges_batch(
        &self,
        _tx: &MemoryTx,
        ids: &[VertexId],
        label: &str,
    ) -> Result<Vec<Neighbors>> {
        let edges = self.inner.edges.read();
        Ok(ids.iter().map(|id| edges.neighbors(id, label)).collect())
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    async fn vertex_count(&self, _tx: &MemoryTx) -> Result<u64> {
        Ok(self.inner.vertices.read().len() as u64)
    }

    async fn edge_count(&self, _tx: &MemoryTx) -> Result<u64> {
        Ok(self.inner.edges.read().by_id.len() as u64)
    }

    // ========================================================================
    // Administration
    // ========================================================================

    async fn drop_all(&self, tx: &mut MemoryTx) -> Result<()> {
        ensure_writable(tx)?;
        let mut vertices = self.inner.vertices.write();
        let mut edges = self.inner.edges.write();
        vertices.clear();
        *edges = EdgeTable::default();
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn with_people(db: &MemoryStore, ids: &[&str]) -> MemoryTx {
        let mut tx = db.begin_tx(TxMode::ReadWrite).await.unwrap();
        for id in ids {
            db.create_vertex(&mut tx, VertexId::from(*id), PropertyMap::new()).await.unwrap();
        }
        tx
    }

    #[tokio::test]
    async fn test_create_and_get_vertex() {
        let db = MemoryStore::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).await.unwrap();

        let mut props = PropertyMap::new();
        props.insert("name".into(), Value::from("Ada"));

        let id = VertexId::from("1");
        db.create_vertex(&mut tx, id.clone(), props).await.unwrap();
        let vertex = db.get_vertex(&tx, &id).await.unwrap().unwrap();

        assert_eq!(vertex.get("name"), Some(&Value::from("Ada")));
    }

    #[tokio::test]
    async fn test_duplicate_vertex_conflicts() {
        let db = MemoryStore::new();
        let mut tx = with_people(&db, &["1"]).await;

        let err = db.create_vertex(&mut tx, VertexId::from("1"), PropertyMap::new()).await;
        assert!(matches!(err, Err(Error::Conflict(ref id)) if id == "1"));
        assert_eq!(db.vertex_count(&tx).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_replace_properties_drops_old_keys() {
        let db = MemoryStore::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).await.unwrap();
        let id = VertexId::from("1");
        let mut props = PropertyMap::new();
        props.insert("name".into(), Value::from("Ada"));
        props.insert("age".into(), Value::from(36));
        db.create_vertex(&mut tx, id.clone(), props).await.unwrap();

        let mut replacement = PropertyMap::new();
        replacement.insert("name".into(), Value::from("Grace"));
        db.replace_vertex_properties(&mut tx, &id, replacement).await.unwrap();

        let vertex = db.get_vertex(&tx, &id).await.unwrap().unwrap();
        assert_eq!(vertex.get("name"), Some(&Value::from("Grace")));
        assert!(vertex.get("age").is_none());
    }

    #[tokio::test]
    async fn test_create_edge_is_unique_per_direction() {
        let db = MemoryStore::new();
        let mut tx = with_people(&db, &["a", "b"]).await;
        let (a, b) = (VertexId::from("a"), VertexId::from("b"));

        db.create_edge(&mut tx, &a, &b, KNOWS, 0.4).await.unwrap();
        let dup = db.create_edge(&mut tx, &a, &b, KNOWS, 0.9).await;
        assert!(matches!(dup, Err(Error::Conflict(_))));

        // Reverse direction is a distinct edge
        db.create_edge(&mut tx, &b, &a, KNOWS, 0.9).await.unwrap();
        assert_eq!(db.edge_count(&tx).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_create_edge_requires_endpoints() {
        let db = MemoryStore::new();
        let mut tx = with_people(&db, &["a"]).await;
        let err = db
            .create_edge(&mut tx, &VertexId::from("a"), &VertexId::from("zz"), KNOWS, 0.5)
            .await;
        assert!(matches!(err, Err(Error::NotFound(ref id)) if id == "zz"));
    }

    #[tokio::test]
    async fn test_upsert_edge_keeps_identity() {
        let db = MemoryStore::new();
        let mut tx = with_people(&db, &["a", "b"]).await;
        let (a, b) = (VertexId::from("a"), VertexId::from("b"));

        let (first, outcome) = db.upsert_edge(&mut tx, &a, &b, KNOWS, 0.7).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Created);

        let (second, outcome) = db.upsert_edge(&mut tx, &a, &b, KNOWS, 0.2).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(first.id, second.id);

        let stored = db.find_edge(&tx, &a, &b, KNOWS).await.unwrap().unwrap();
        assert_eq!(stored.weight, 0.2);
        assert_eq!(db.edge_count(&tx).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_set_edge_weight_validates() {
        let db = MemoryStore::new();
        let mut tx = with_people(&db, &["a", "b"]).await;
        let edge = db
            .create_edge(&mut tx, &VertexId::from("a"), &VertexId::from("b"), KNOWS, 0.5)
            .await
            .unwrap();

        assert!(matches!(
            db.set_edge_weight(&mut tx, edge.id, 1.5).await,
            Err(Error::InvalidArgument(_))
        ));
        db.set_edge_weight(&mut tx, edge.id, 0.9).await.unwrap();
        let rel = db
            .find_edge(&tx, &VertexId::from("a"), &VertexId::from("b"), KNOWS)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rel.weight, 0.9);
    }

    #[tokio::test]
    async fn test_outgoing_edges_filter_by_label() {
        let db = MemoryStore::new();
        let mut tx = with_people(&db, &["a", "b", "c"]).await;
        let (a, b, c) = (VertexId::from("a"), VertexId::from("b"), VertexId::from("c"));

        db.create_edge(&mut tx, &a, &b, KNOWS, 0.8).await.unwrap();
        db.create_edge(&mut tx, &a, &c, "works_with", 0.3).await.unwrap();
        db.create_edge(&mut tx, &c, &a, KNOWS, 0.3).await.unwrap();

        let out = db.outgoing_edges(&tx, &a, KNOWS).await.unwrap();
        assert_eq!(out, vec![(b.clone(), 0.8)]);

        let batch = db.outgoing_edges_batch(&tx, &[a, c.clone(), b], KNOWS).await.unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[1], vec![(VertexId::from("a"), 0.3)]);
        assert!(batch[2].is_empty());
    }

    #[tokio::test]
    async fn test_read_only_session_rejects_writes() {
        let db = MemoryStore::new();
        let mut tx = db.begin_tx(TxMode::ReadOnly).await.unwrap();
        let err = db.create_vertex(&mut tx, VertexId::from("1"), PropertyMap::new()).await;
        assert!(matches!(err, Err(Error::Storage(_))));
    }

    #[tokio::test]
    async fn test_drop_all() {
        let db = MemoryStore::new();
        let mut tx = with_people(&db, &["a", "b"]).await;
        db.create_edge(&mut tx, &VertexId::from("a"), &VertexId::from("b"), KNOWS, 0.5)
            .await
            .unwrap();

        db.drop_all(&mut tx).await.unwrap();
        assert_eq!(db.vertex_count(&tx).await.unwrap(), 0);
        assert_eq!(db.edge_count(&tx).await.unwrap(), 0);
        assert!(db.outgoing_edges(&tx, &VertexId::from("a"), KNOWS).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_makes_store_unavailable() {
        let db = MemoryStore::new();
        db.shutdown().await.unwrap();
        assert!(matches!(
            db.begin_tx(TxMode::ReadOnly).await,
            Err(Error::StoreUnavailable(_))
        ));
    }
}
