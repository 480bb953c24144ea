//! # associate-graph — Weighted Known-Associate Search
//!
//! A person/`knows` property graph with one analytical query: find every
//! associate of a person reachable through chains of decaying relationship
//! strength.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphStore` is the contract between the search and storage
//! 2. **Clean DTOs**: `Vertex`, `Edge`, `Value` cross all boundaries
//! 3. **Two thresholds**: expansion (decay) and reporting (retention) are independent
//! 4. **Atomic upsert**: the at-most-one-edge invariant is enforced by the store
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use associate_graph::{Associates, PropertyMap, Value};
//!
//! # async fn example() -> associate_graph::Result<()> {
//! let graph = Associates::open_memory();
//!
//! let mut props = PropertyMap::new();
//! props.insert("name".into(), Value::from("Ada"));
//! graph.create_person("1", props).await?;
//! graph.create_person("2", PropertyMap::new()).await?;
//! graph.upsert_relationship("1", "2", 0.8).await?;
//!
//! for person in graph.find_known_associates("1", 0.5).await? {
//!     println!("{}", person.to_json());
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod tx;
pub mod search;
pub mod relationship;
pub mod person;
pub mod config;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{
    Vertex, VertexId, Edge, EdgeId, Value, PropertyMap, KNOWS,
};

pub use storage::{GraphStore, MemoryStore, StoreConfig, UpsertOutcome};

pub use tx::{Transaction, TxMode, TxId};

pub use search::{
    SearchConfig, SearchReport, SearchStats, Candidate, PathInstance,
    DEFAULT_DECAY_THRESHOLD, DEFAULT_RETAIN_THRESHOLD, DEFAULT_MAX_ROUNDS, parse_threshold,
};

pub use relationship::{DEFAULT_WEIGHT, parse_weight};

pub use config::AssociatesConfig;

use tracing::{info, warn};

// ============================================================================
// Top-level handle
// ============================================================================

/// The primary entry point. Wraps a store and runs every operation inside
/// its own session.
pub struct Associates<S: GraphStore> {
    store: S,
    search: SearchConfig,
}

impl<S: GraphStore> Associates<S> {
    /// Create a handle over the given store with default search settings.
    pub fn with_store(store: S) -> Self {
        Self { store, search: SearchConfig::default() }
    }

    /// Replace the default search settings.
    pub fn with_search_config(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Access the underlying store (for advanced use).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Default search settings; the decay threshold is overridden per call.
    pub fn search_config(&self) -> &SearchConfig {
        &self.search
    }

    /// Create or update the `knows` edge `from -> to`.
    pub async fn upsert_relationship(
        &self,
        from: impl Into<VertexId>,
        to: impl Into<VertexId>,
        weight: f64,
    ) -> Result<()> {
        let (from, to) = (from.into(), to.into());
        info!(%from, %to, weight, "upserting relationship");

        let mut tx = self.store.begin_tx(TxMode::ReadWrite).await?;
        let result =
            relationship::upsert_relationship(&self.store, &mut tx, &from, &to, weight).await;
        self.finish(tx, result).await.map(|_| ())
    }

    /// Associates of `person`: vertices reached by a path whose score stays
    /// at or above the configured retention threshold. Paths stop expanding
    /// once their score falls below `decay_threshold`.
    ///
    /// A graph where paths never decay (a reachable cycle of weight-1 edges)
    /// fails with `SearchLimitExceeded` once `max_rounds` is reached.
    pub async fn find_known_associates(
        &self,
        person: impl Into<VertexId>,
        decay_threshold: f64,
    ) -> Result<Vec<Vertex>> {
        let config = self.search.clone().with_decay_threshold(decay_threshold);
        let report = self.search_report(person, &config).await?;
        Ok(report.associates)
    }

    /// Run a search with an explicit configuration and keep its counters.
    pub async fn search_report(
        &self,
        person: impl Into<VertexId>,
        config: &SearchConfig,
    ) -> Result<SearchReport> {
        let person = person.into();
        info!(%person, decay = config.decay_threshold, retain = config.retain_threshold,
            "searching known associates");

        let tx = self.store.begin_tx(TxMode::ReadOnly).await?;
        let result = search::find_associates(&self.store, &tx, &person, config).await;
        let report = self.finish(tx, result).await?;

        info!(%person, found = report.associates.len(), rounds = report.stats.rounds,
            "retrieved known associates");
        Ok(report)
    }

    /// Create a person with its properties in one step.
    pub async fn create_person(
        &self,
        id: impl Into<VertexId>,
        properties: PropertyMap,
    ) -> Result<Vertex> {
        let mut tx = self.store.begin_tx(TxMode::ReadWrite).await?;
        let result = person::create_person(&self.store, &mut tx, id.into(), properties).await;
        self.finish(tx, result).await
    }

    /// Create a person from a flat JSON object carrying its `id`.
    pub async fn create_person_json(&self, body: serde_json::Value) -> Result<Vertex> {
        let vertex = Vertex::from_json(body)?;
        self.create_person(vertex.id, vertex.properties).await
    }

    /// Load one person, or fail with `NotFound`.
    pub async fn get_person(&self, id: impl Into<VertexId>) -> Result<Vertex> {
        let tx = self.store.begin_tx(TxMode::ReadOnly).await?;
        let result = person::get_person(&self.store, &tx, &id.into()).await;
        self.finish(tx, result).await
    }

    /// Replace all properties of a person. No merge with the old ones.
    pub async fn replace_person(
        &self,
        id: impl Into<VertexId>,
        properties: PropertyMap,
    ) -> Result<()> {
        let mut tx = self.store.begin_tx(TxMode::ReadWrite).await?;
        let result = person::replace_person(&self.store, &mut tx, &id.into(), properties).await;
        self.finish(tx, result).await
    }

    /// Every person in the store, ordered by id.
    pub async fn list_persons(&self) -> Result<Vec<Vertex>> {
        let tx = self.store.begin_tx(TxMode::ReadOnly).await?;
        let result = person::list_persons(&self.store, &tx).await;
        self.finish(tx, result).await
    }

    /// Drop every person and relationship.
    pub async fn clear(&self) -> Result<()> {
        let mut tx = self.store.begin_tx(TxMode::ReadWrite).await?;
        let result = self.store.drop_all(&mut tx).await;
        self.finish(tx, result).await?;
        info!("cleared graph");
        Ok(())
    }

    /// Release a session: commit on success, roll back on failure.
    async fn finish<T>(&self, tx: S::Tx, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.store.commit_tx(tx).await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = self.store.rollback_tx(tx).await {
                    warn!(error = %rollback, "rollback failed");
                }
                warn!(error = %err, "operation failed");
                Err(err)
            }
        }
    }
}

/// In-memory graph for testing and embedding.
impl Associates<MemoryStore> {
    pub fn open_memory() -> Self {
        Self::with_store(MemoryStore::new())
    }

    pub fn open(config: &AssociatesConfig) -> Result<Self> {
        config.search.validate()?;
        Ok(Self::with_store(MemoryStore::from_config(&config.store))
            .with_search_config(config.search.clone()))
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Search still expanding after {rounds} rounds")]
    SearchLimitExceeded { rounds: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
