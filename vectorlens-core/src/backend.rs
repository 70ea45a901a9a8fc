//! The collection backend trait: one contract, a live and a simulated implementation.

use async_trait::async_trait;

use crate::analytics::{CollectionSummary, DuplicateReport, Graph, SourceCounts, TimelinePage};
use crate::error::Result;
use crate::types::{
    Collection, DeleteReceipt, Heartbeat, Page, QueryResult, StoreReceipt, StoreRequest,
    SyncReport,
};

/// Which implementation a backend is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendMode {
    /// Talks to a real vector store and analytics proxy.
    Live,
    /// Serves the built-in fixture dataset.
    Simulated,
}

impl BackendMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendMode::Live => "live",
            BackendMode::Simulated => "simulated",
        }
    }
}

impl std::fmt::Display for BackendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform access to a vector-embedding document store.
///
/// Every operation has exactly one live and one simulated implementation;
/// an implementation never falls through to the other mode mid-call.
///
/// # Example
///
/// ```rust,ignore
/// use vectorlens_core::{CollectionBackend, SimulatedBackend};
///
/// let backend = SimulatedBackend::new();
/// let names = backend.list_collections().await?;
/// let hits = backend.query(&names[0], "kubernetes", 5).await?;
/// ```
#[async_trait]
pub trait CollectionBackend: Send + Sync {
    /// Which implementation this is.
    fn mode(&self) -> BackendMode;

    /// Liveness check.
    async fn heartbeat(&self) -> Result<Heartbeat>;

    /// Collection names in backend order.
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Describe a collection by name, including its current count.
    async fn describe_collection(&self, name: &str) -> Result<Collection>;

    /// A page of raw chunks. An offset past the end yields an empty page.
    async fn get_page(&self, collection_id: &str, limit: usize, offset: usize) -> Result<Page>;

    /// Every chunk in the collection, optionally with embeddings.
    async fn get_all(&self, collection_id: &str, include_embeddings: bool) -> Result<Page>;

    /// The `top_k` nearest chunks to `text`, ascending by distance.
    async fn query(&self, collection: &str, text: &str, top_k: usize) -> Result<QueryResult>;

    /// Delete chunks by id.
    async fn delete(&self, collection: &str, ids: &[String]) -> Result<DeleteReceipt>;

    /// Store a new chunk.
    async fn store(&self, request: &StoreRequest) -> Result<StoreReceipt>;

    /// Group near-identical chunks among the first `sample_size`.
    async fn find_duplicates(
        &self,
        collection: &str,
        threshold: f32,
        sample_size: usize,
    ) -> Result<DuplicateReport>;

    /// Build a relationship graph over the first `sample_size` chunks.
    async fn build_graph(&self, collection: &str, sample_size: usize, threshold: f32)
    -> Result<Graph>;

    /// Chunks ordered newest first.
    async fn timeline(&self, collection: &str, offset: usize, limit: usize) -> Result<TimelinePage>;

    /// Chunk counts per source.
    async fn sources(&self, collection: &str) -> Result<SourceCounts>;

    /// Every collection with its size.
    async fn collection_summaries(&self) -> Result<Vec<CollectionSummary>>;

    /// Trigger an external sync.
    async fn sync(&self) -> Result<SyncReport>;
}
