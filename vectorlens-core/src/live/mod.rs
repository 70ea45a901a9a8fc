//! Live backend: the vector store's REST API for raw access, the analytics
//! proxy for search, writes and derived views.

pub mod chroma;
pub mod proxy;
pub mod wire;

use async_trait::async_trait;

pub use chroma::ChromaClient;
pub use proxy::ProxyClient;
pub use wire::{CollectionDescriptor, GetRequest};

use crate::analytics::{CollectionSummary, DuplicateReport, Graph, SourceCounts, TimelinePage};
use crate::backend::{BackendMode, CollectionBackend};
use crate::config::LensConfig;
use crate::error::Result;
use crate::types::{
    Collection, DeleteReceipt, Heartbeat, Page, QueryResult, StoreReceipt, StoreRequest,
    SyncReport,
};

/// [`CollectionBackend`] over a running vector store and analytics proxy.
#[derive(Debug, Clone)]
pub struct LiveBackend {
    chroma: ChromaClient,
    proxy: ProxyClient,
}

impl LiveBackend {
    /// Build both clients over one shared HTTP connection pool.
    pub fn new(config: &LensConfig) -> Result<Self> {
        let client = config.http_client()?;
        Ok(Self {
            chroma: ChromaClient::with_client(client.clone(), config),
            proxy: ProxyClient::with_client(client, config),
        })
    }
}

#[async_trait]
impl CollectionBackend for LiveBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::Live
    }

    async fn heartbeat(&self) -> Result<Heartbeat> {
        self.chroma.heartbeat().await
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let descriptors = self.chroma.list_collections().await?;
        Ok(descriptors.into_iter().map(|d| d.name).collect())
    }

    async fn describe_collection(&self, name: &str) -> Result<Collection> {
        self.chroma.describe(name).await
    }

    async fn get_page(&self, collection_id: &str, limit: usize, offset: usize) -> Result<Page> {
        self.chroma.get(collection_id, &GetRequest::new(Some(limit), Some(offset), false)).await
    }

    async fn get_all(&self, collection_id: &str, include_embeddings: bool) -> Result<Page> {
        // No limit: the store returns every chunk.
        self.chroma.get(collection_id, &GetRequest::new(None, None, include_embeddings)).await
    }

    async fn query(&self, collection: &str, text: &str, top_k: usize) -> Result<QueryResult> {
        self.proxy.query(collection, text, top_k).await
    }

    async fn delete(&self, collection: &str, ids: &[String]) -> Result<DeleteReceipt> {
        self.proxy.delete(collection, ids).await
    }

    async fn store(&self, request: &StoreRequest) -> Result<StoreReceipt> {
        self.proxy.store(request).await
    }

    async fn find_duplicates(
        &self,
        collection: &str,
        threshold: f32,
        sample_size: usize,
    ) -> Result<DuplicateReport> {
        self.proxy.duplicates(collection, threshold, sample_size).await
    }

    async fn build_graph(&self, collection: &str, sample_size: usize, threshold: f32) -> Result<Graph> {
        self.proxy.graph(collection, sample_size, threshold).await
    }

    async fn timeline(&self, collection: &str, offset: usize, limit: usize) -> Result<TimelinePage> {
        self.proxy.timeline(collection, offset, limit).await
    }

    async fn sources(&self, collection: &str) -> Result<SourceCounts> {
        self.proxy.sources(collection).await
    }

    async fn collection_summaries(&self) -> Result<Vec<CollectionSummary>> {
        self.proxy.collections().await
    }

    async fn sync(&self) -> Result<SyncReport> {
        self.proxy.sync().await
    }
}
