//! Analytics computed over the vector store's REST API.
//!
//! Raw data comes from the store; duplicate clusters and graph links are
//! derived here from stored embeddings with cosine distance.

use std::time::Duration;

use tokio::process::Command;
use tracing::{info, warn};
use vectorlens_core::live::GetRequest;
use vectorlens_core::{
    Chunk, ChromaClient, CollectionSummary, DeleteReceipt, DuplicateReport, Graph, LensError,
    Metadata, QueryResult, SourceCounts, StoreReceipt, StoreRequest, SyncReport,
    TimelinePage, build_graph, cosine_distance, detect_duplicates, source_counts, summarize,
    timeline_page,
};

use crate::config::ProxyConfig;
use crate::error::{ProxyError, Result};

/// Upper bound on a `/sync` run.
pub const SYNC_TIMEOUT: Duration = Duration::from_secs(60);

/// Every proxy operation, independent of HTTP.
#[derive(Debug, Clone)]
pub struct AnalyticsService {
    chroma: ChromaClient,
    default_collection: String,
    sync_command: Option<Vec<String>>,
}

impl AnalyticsService {
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        Ok(Self::with_client(ChromaClient::new(&config.upstream)?, config))
    }

    pub fn with_client(chroma: ChromaClient, config: &ProxyConfig) -> Self {
        Self {
            chroma,
            default_collection: config.default_collection.clone(),
            sync_command: config.sync_command.clone(),
        }
    }

    /// The collection a request addresses, falling back to the default.
    pub fn collection_or_default<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.filter(|name| !name.is_empty()).unwrap_or(&self.default_collection)
    }

    async fn resolve_id(&self, collection: &str) -> Result<String> {
        Ok(self.chroma.get_collection(collection).await?.id)
    }

    async fn all_chunks(&self, collection_id: &str, include_embeddings: bool) -> Result<Vec<Chunk>> {
        let page = self.chroma.get(collection_id, &GetRequest::new(None, None, include_embeddings)).await?;
        Ok(page.into_chunks())
    }

    async fn sample_with_embeddings(&self, collection_id: &str, sample_size: usize) -> Result<Vec<Chunk>> {
        let request = GetRequest::new(Some(sample_size), None, true);
        Ok(self.chroma.get(collection_id, &request).await?.into_chunks())
    }

    pub async fn query(&self, collection: &str, text: &str, n_results: usize) -> Result<QueryResult> {
        if n_results == 0 {
            return Err(LensError::InvalidInput("n_results must be greater than 0".into()).into());
        }
        let id = self.resolve_id(collection).await?;
        Ok(self.chroma.query_text(&id, text, n_results).await?)
    }

    pub async fn timeline(&self, collection: &str, offset: usize, limit: usize) -> Result<TimelinePage> {
        let id = self.resolve_id(collection).await?;
        let chunks = self.all_chunks(&id, false).await?;
        Ok(timeline_page(&chunks, offset, limit))
    }

    pub async fn sources(&self, collection: &str) -> Result<SourceCounts> {
        let id = self.resolve_id(collection).await?;
        Ok(source_counts(&self.all_chunks(&id, false).await?))
    }

    /// Cluster the first `sample_size` chunks by cosine distance of their embeddings.
    ///
    /// Chunks without an embedding never match anything.
    pub async fn duplicates(
        &self,
        collection: &str,
        threshold: f32,
        sample_size: usize,
    ) -> Result<DuplicateReport> {
        check_threshold(threshold)?;
        let id = self.resolve_id(collection).await?;
        let total = self.chroma.count(&id).await?;
        let sample = self.sample_with_embeddings(&id, sample_size).await?;

        let groups = detect_duplicates(&sample, threshold, |a, b| {
            embedding_distance(a, b).unwrap_or(f32::INFINITY)
        });
        info!(collection, scanned = sample.len(), groups = groups.len(), "duplicate scan finished");
        Ok(DuplicateReport { groups, scanned: sample.len(), total })
    }

    pub async fn delete(&self, collection: &str, ids: &[String]) -> Result<DeleteReceipt> {
        if ids.is_empty() {
            return Err(ProxyError::BadRequest("ids is required".into()));
        }
        let id = self.resolve_id(collection).await?;
        self.chroma.delete(&id, ids).await?;
        info!(collection, deleted = ids.len(), "chunks deleted");
        Ok(DeleteReceipt { success: true, deleted: ids.len() })
    }

    /// Link sampled chunks whose embeddings are within `threshold`, distances rounded to 4 places.
    pub async fn graph(&self, collection: &str, sample_size: usize, threshold: f32) -> Result<Graph> {
        check_threshold(threshold)?;
        let id = self.resolve_id(collection).await?;
        let sample = self.sample_with_embeddings(&id, sample_size).await?;
        let graph = embedding_graph(&sample, threshold);
        info!(collection, nodes = graph.nodes.len(), links = graph.links.len(), "graph built");
        Ok(graph)
    }

    pub async fn collections(&self) -> Result<Vec<CollectionSummary>> {
        let mut summaries = Vec::new();
        for descriptor in self.chroma.list_collections().await? {
            let chunks = self.all_chunks(&descriptor.id, false).await?;
            summaries.push(summarize(&descriptor.name, &chunks));
        }
        Ok(summaries)
    }

    /// Upsert one chunk into the default collection under a content-derived id.
    pub async fn store(&self, request: &StoreRequest) -> Result<StoreReceipt> {
        request.validate()?;
        let resolved = request.resolve(chrono::Utc::now().date_naive());
        let chunk_id = resolved.chunk_id();

        let mut metadata = Metadata::new();
        metadata.insert("hnsw:space".into(), "cosine".into());
        let descriptor =
            self.chroma.get_or_create_collection(&self.default_collection, Some(&metadata)).await?;
        self.chroma
            .upsert(
                &descriptor.id,
                std::slice::from_ref(&chunk_id),
                std::slice::from_ref(&resolved.text),
                &[resolved.metadata()],
            )
            .await?;
        let chunks = self.chroma.count(&descriptor.id).await?;
        info!(collection = %self.default_collection, id = %chunk_id, chunks, "chunk stored");

        Ok(StoreReceipt {
            success: true,
            id: chunk_id,
            collection: Some(self.default_collection.clone()),
            chunks,
        })
    }

    /// Run the configured sync command and report its combined output.
    pub async fn sync(&self) -> Result<SyncReport> {
        let Some((program, args)) = self.sync_command.as_deref().and_then(<[String]>::split_first)
        else {
            return Ok(SyncReport {
                success: false,
                output: Vec::new(),
                summary: "no sync command configured".to_string(),
            });
        };

        let mut command = Command::new(program);
        command.args(args).kill_on_drop(true);
        let output = tokio::time::timeout(SYNC_TIMEOUT, command.output())
            .await
            .map_err(|_| ProxyError::Sync(format!("timed out after {}s", SYNC_TIMEOUT.as_secs())))?
            .map_err(|e| ProxyError::Sync(format!("failed to run {program}: {e}")))?;

        let combined = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        let lines: Vec<String> = combined.trim().lines().map(str::to_string).collect();
        let summary = lines.last().cloned().unwrap_or_else(|| "Unknown".to_string());
        if !output.status.success() {
            warn!(status = %output.status, %summary, "sync command failed");
        }
        Ok(SyncReport { success: output.status.success(), output: lines, summary })
    }

    /// Reference to the store client, for probing upstream health.
    pub fn chroma(&self) -> &ChromaClient {
        &self.chroma
    }
}

fn embedding_distance(a: &Chunk, b: &Chunk) -> Option<f32> {
    match (&a.embedding, &b.embedding) {
        (Some(x), Some(y)) => Some(cosine_distance(x, y)),
        _ => None,
    }
}

/// Compare raw distances against `threshold`; only the reported values are rounded.
fn embedding_graph(sample: &[Chunk], threshold: f32) -> Graph {
    let mut graph = build_graph(sample, threshold, embedding_distance);
    for link in &mut graph.links {
        link.distance = round4(link.distance);
    }
    graph
}

fn round4(distance: f32) -> f32 {
    (distance * 10_000.0).round() / 10_000.0
}

fn check_threshold(threshold: f32) -> Result<()> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(LensError::InvalidInput(format!("invalid threshold {threshold}")).into());
    }
    Ok(())
}
