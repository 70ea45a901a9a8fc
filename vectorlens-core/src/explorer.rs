//! The collection access facade handed to callers once a backend is resolved.

use std::sync::Arc;

use tracing::debug;

use crate::analytics::{CollectionSummary, DuplicateReport, Graph, SourceCounts, TimelinePage};
use crate::backend::{BackendMode, CollectionBackend};
use crate::config::LensConfig;
use crate::error::{LensError, Result};
use crate::types::{
    Collection, DeleteReceipt, Heartbeat, Page, QueryResult, StoreReceipt, StoreRequest,
    SyncReport,
};

/// Uniform access to collections in whichever mode was selected at startup.
///
/// Inputs are validated here, before any backend sees them, so invalid calls
/// never reach the network. Cloning is cheap and clones share the backend.
#[derive(Clone)]
pub struct Explorer {
    backend: Arc<dyn CollectionBackend>,
    config: Arc<LensConfig>,
}

impl std::fmt::Debug for Explorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Explorer").field("mode", &self.mode()).field("config", &self.config).finish()
    }
}

impl Explorer {
    /// Wrap an already-selected backend with default settings.
    pub fn new(backend: Arc<dyn CollectionBackend>) -> Self {
        Self { backend, config: Arc::new(LensConfig::default()) }
    }

    /// Replace the settings used by the `*_default` helpers.
    pub fn with_config(mut self, config: LensConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn mode(&self) -> BackendMode {
        self.backend.mode()
    }

    pub fn config(&self) -> &LensConfig {
        &self.config
    }

    pub async fn heartbeat(&self) -> Result<Heartbeat> {
        debug!(mode = %self.mode(), "heartbeat");
        self.backend.heartbeat().await
    }

    pub async fn list_collections(&self) -> Result<Vec<String>> {
        debug!(mode = %self.mode(), "list_collections");
        self.backend.list_collections().await
    }

    pub async fn describe_collection(&self, name: &str) -> Result<Collection> {
        debug!(mode = %self.mode(), collection = name, "describe_collection");
        self.backend.describe_collection(name).await
    }

    /// A page of raw chunks addressed by collection id.
    pub async fn get_page(&self, collection_id: &str, limit: usize, offset: usize) -> Result<Page> {
        debug!(mode = %self.mode(), collection_id, limit, offset, "get_page");
        self.backend.get_page(collection_id, limit, offset).await
    }

    /// The first page using the configured page size.
    pub async fn first_page(&self, collection_id: &str) -> Result<Page> {
        self.get_page(collection_id, self.config.page_size, 0).await
    }

    pub async fn get_all(&self, collection_id: &str, include_embeddings: bool) -> Result<Page> {
        debug!(mode = %self.mode(), collection_id, include_embeddings, "get_all");
        self.backend.get_all(collection_id, include_embeddings).await
    }

    /// Nearest chunks to `text`. Blank text is allowed; `top_k` must be positive.
    pub async fn query(&self, collection: &str, text: &str, top_k: usize) -> Result<QueryResult> {
        if top_k == 0 {
            return Err(LensError::InvalidInput("top_k must be greater than 0".to_string()));
        }
        debug!(mode = %self.mode(), collection, top_k, "query");
        self.backend.query(collection, text, top_k).await
    }

    /// Delete chunks by id. An empty list succeeds without contacting the backend.
    pub async fn delete(&self, collection: &str, ids: &[String]) -> Result<DeleteReceipt> {
        if ids.is_empty() {
            return Ok(DeleteReceipt { success: true, deleted: 0 });
        }
        debug!(mode = %self.mode(), collection, count = ids.len(), "delete");
        self.backend.delete(collection, ids).await
    }

    pub async fn store(&self, request: &StoreRequest) -> Result<StoreReceipt> {
        request.validate()?;
        debug!(mode = %self.mode(), source = ?request.source, "store");
        self.backend.store(request).await
    }

    pub async fn find_duplicates(
        &self,
        collection: &str,
        threshold: f32,
        sample_size: usize,
    ) -> Result<DuplicateReport> {
        check_threshold(threshold)?;
        debug!(mode = %self.mode(), collection, threshold, sample_size, "find_duplicates");
        self.backend.find_duplicates(collection, threshold, sample_size).await
    }

    /// Duplicate scan with the configured threshold and sample size.
    pub async fn find_duplicates_default(&self, collection: &str) -> Result<DuplicateReport> {
        self.find_duplicates(
            collection,
            self.config.duplicate_threshold,
            self.config.duplicate_sample_size,
        )
        .await
    }

    pub async fn build_graph(&self, collection: &str, sample_size: usize, threshold: f32) -> Result<Graph> {
        check_threshold(threshold)?;
        debug!(mode = %self.mode(), collection, sample_size, threshold, "build_graph");
        self.backend.build_graph(collection, sample_size, threshold).await
    }

    /// Graph with the configured sample size and threshold.
    pub async fn build_graph_default(&self, collection: &str) -> Result<Graph> {
        self.build_graph(collection, self.config.graph_sample_size, self.config.graph_threshold)
            .await
    }

    pub async fn timeline(&self, collection: &str, offset: usize, limit: usize) -> Result<TimelinePage> {
        debug!(mode = %self.mode(), collection, offset, limit, "timeline");
        self.backend.timeline(collection, offset, limit).await
    }

    pub async fn sources(&self, collection: &str) -> Result<SourceCounts> {
        debug!(mode = %self.mode(), collection, "sources");
        self.backend.sources(collection).await
    }

    pub async fn collection_summaries(&self) -> Result<Vec<CollectionSummary>> {
        debug!(mode = %self.mode(), "collection_summaries");
        self.backend.collection_summaries().await
    }

    pub async fn sync(&self) -> Result<SyncReport> {
        debug!(mode = %self.mode(), "sync");
        self.backend.sync().await
    }
}

fn check_threshold(threshold: f32) -> Result<()> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(LensError::InvalidInput(format!(
            "threshold must be a finite, non-negative number, got {threshold}"
        )));
    }
    Ok(())
}
