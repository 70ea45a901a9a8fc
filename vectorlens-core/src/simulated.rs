//! Simulated backend serving the fixture dataset.
//!
//! Fixture data is immutable: `delete`, `store` and `sync` report success
//! without changing anything.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::analytics::{
    self, CollectionSummary, DuplicateReport, Graph, SourceCounts, TimelinePage,
};
use crate::backend::{BackendMode, CollectionBackend};
use crate::error::{LensError, Result};
use crate::fixture::{FixtureCollection, FixtureDataset};
use crate::similarity::{SimilarityApproximator, cosine_distance};
use crate::types::{
    Chunk, Collection, DeleteReceipt, Heartbeat, Page, QueryResult, ScoredChunk, StoreReceipt,
    StoreRequest, SyncReport,
};

/// [`CollectionBackend`] over an in-process [`FixtureDataset`].
///
/// # Example
///
/// ```rust,ignore
/// use vectorlens_core::{CollectionBackend, SimulatedBackend};
///
/// let backend = SimulatedBackend::new();
/// let page = backend.get_page("demo-col-001", 10, 0).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    dataset: Arc<FixtureDataset>,
    approximator: SimilarityApproximator,
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedBackend {
    /// A backend over the built-in dataset.
    pub fn new() -> Self {
        Self::with_dataset(FixtureDataset::builtin())
    }

    /// A backend over a custom dataset.
    pub fn with_dataset(dataset: Arc<FixtureDataset>) -> Self {
        Self { dataset, approximator: SimilarityApproximator::new() }
    }

    fn named(&self, name: &str) -> Result<&FixtureCollection> {
        self.dataset
            .by_name(name)
            .ok_or_else(|| LensError::NotFound(format!("collection '{name}'")))
    }

    fn referenced(&self, collection_ref: &str) -> Result<&FixtureCollection> {
        self.dataset
            .by_ref(collection_ref)
            .ok_or_else(|| LensError::NotFound(format!("collection '{collection_ref}'")))
    }

    /// Cosine distance when both chunks carry embeddings, otherwise the
    /// approximator scoring the candidate's text against the anchor's.
    fn pair_distance(&self, anchor: &Chunk, candidate: &Chunk) -> f32 {
        match (&anchor.embedding, &candidate.embedding) {
            (Some(a), Some(b)) => cosine_distance(a, b),
            _ => self.approximator.score(&candidate.document, &anchor.document),
        }
    }
}

fn searchable_text(chunk: &Chunk) -> String {
    let metadata = serde_json::to_string(&chunk.metadata).unwrap_or_default();
    format!("{} {metadata}", chunk.document)
}

fn prefix(collection: &FixtureCollection, sample_size: usize) -> &[Chunk] {
    &collection.chunks[..sample_size.min(collection.chunks.len())]
}

#[async_trait]
impl CollectionBackend for SimulatedBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::Simulated
    }

    async fn heartbeat(&self) -> Result<Heartbeat> {
        Ok(Heartbeat(json!({ "mode": "simulated", "collections": self.dataset.collections().len() })))
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        Ok(self.dataset.collections().iter().map(|c| c.name.clone()).collect())
    }

    async fn describe_collection(&self, name: &str) -> Result<Collection> {
        Ok(self.named(name)?.describe())
    }

    async fn get_page(&self, collection_id: &str, limit: usize, offset: usize) -> Result<Page> {
        let collection = self.referenced(collection_id)?;
        Ok(Page::from_chunks(collection.chunks.iter().skip(offset).take(limit), false))
    }

    async fn get_all(&self, collection_id: &str, include_embeddings: bool) -> Result<Page> {
        let collection = self.referenced(collection_id)?;
        Ok(Page::from_chunks(&collection.chunks, include_embeddings))
    }

    async fn query(&self, collection: &str, text: &str, top_k: usize) -> Result<QueryResult> {
        let collection = self.named(collection)?;
        let mut matches: Vec<ScoredChunk> = collection
            .chunks
            .iter()
            .map(|chunk| ScoredChunk {
                chunk: chunk.without_embedding(),
                distance: self.approximator.score(&searchable_text(chunk), text),
            })
            .collect();
        matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        matches.truncate(top_k);
        Ok(QueryResult { matches })
    }

    async fn delete(&self, collection: &str, ids: &[String]) -> Result<DeleteReceipt> {
        self.named(collection)?;
        Ok(DeleteReceipt { success: true, deleted: ids.len() })
    }

    async fn store(&self, request: &StoreRequest) -> Result<StoreReceipt> {
        request.validate()?;
        let resolved = request.resolve(chrono::Utc::now().date_naive());
        Ok(StoreReceipt { success: true, id: resolved.chunk_id(), collection: None, chunks: 0 })
    }

    async fn find_duplicates(
        &self,
        collection: &str,
        threshold: f32,
        sample_size: usize,
    ) -> Result<DuplicateReport> {
        let collection = self.named(collection)?;
        let sample = prefix(collection, sample_size);
        let groups =
            analytics::detect_duplicates(sample, threshold, |a, b| self.pair_distance(a, b));
        info!(
            collection = %collection.name,
            scanned = sample.len(),
            groups = groups.len(),
            "duplicate scan finished"
        );
        Ok(DuplicateReport { groups, scanned: sample.len(), total: collection.chunks.len() })
    }

    async fn build_graph(&self, collection: &str, sample_size: usize, threshold: f32) -> Result<Graph> {
        let collection = self.named(collection)?;
        let graph = analytics::build_graph(
            prefix(collection, sample_size),
            threshold,
            analytics::tag_overlap_distance,
        );
        info!(
            collection = %collection.name,
            nodes = graph.nodes.len(),
            links = graph.links.len(),
            "graph built"
        );
        Ok(graph)
    }

    async fn timeline(&self, collection: &str, offset: usize, limit: usize) -> Result<TimelinePage> {
        let collection = self.named(collection)?;
        Ok(analytics::timeline_page(&collection.chunks, offset, limit))
    }

    async fn sources(&self, collection: &str) -> Result<SourceCounts> {
        Ok(analytics::source_counts(&self.named(collection)?.chunks))
    }

    async fn collection_summaries(&self) -> Result<Vec<CollectionSummary>> {
        Ok(self
            .dataset
            .collections()
            .iter()
            .map(|c| analytics::summarize(&c.name, &c.chunks))
            .collect())
    }

    async fn sync(&self) -> Result<SyncReport> {
        Ok(SyncReport {
            success: true,
            output: Vec::new(),
            summary: "simulated mode: nothing to sync".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_collection_is_not_found() {
        let backend = SimulatedBackend::new();
        let err = backend.describe_collection("missing").await.unwrap_err();
        assert!(matches!(err, LensError::NotFound(_)));
        assert!(matches!(backend.get_page("missing", 5, 0).await, Err(LensError::NotFound(_))));
    }

    #[tokio::test]
    async fn pages_resolve_by_id_or_name() {
        let backend = SimulatedBackend::new();
        let by_id = backend.get_page("demo-col-001", 3, 0).await.unwrap();
        let by_name = backend.get_page("ai-agent-memories", 3, 0).await.unwrap();
        assert_eq!(by_id, by_name);
        assert_eq!(by_id.ids, vec!["mem-001", "mem-002", "mem-003"]);
    }

    #[tokio::test]
    async fn store_is_a_no_op_with_a_stable_id() {
        let backend = SimulatedBackend::new();
        let request = StoreRequest { date: Some("2025-01-15".into()), ..StoreRequest::new("fact") };
        let first = backend.store(&request).await.unwrap();
        let second = backend.store(&request).await.unwrap();
        assert!(first.success);
        assert_eq!(first.id, second.id);
        assert_eq!(backend.describe_collection("ai-agent-memories").await.unwrap().count, 20);
    }

    #[tokio::test]
    async fn graph_links_follow_shared_tags() {
        let backend = SimulatedBackend::new();
        let graph = backend.build_graph("ai-agent-memories", 100, 0.15).await.unwrap();
        assert_eq!(graph.nodes.len(), 20);
        for link in &graph.links {
            assert!(link.distance < 0.15);
            assert_ne!(link.source, link.target);
        }
    }

    #[tokio::test]
    async fn serves_a_custom_dataset() {
        let chunk = Chunk {
            id: "only".into(),
            document: "lonely chunk".into(),
            metadata: crate::types::Metadata::new(),
            embedding: Some(vec![0.5, 0.5]),
        };
        let dataset = FixtureDataset::new(vec![FixtureCollection {
            id: "col-x".into(),
            name: "custom".into(),
            metadata: crate::types::Metadata::new(),
            chunks: vec![chunk],
        }]);
        let backend = SimulatedBackend::with_dataset(Arc::new(dataset));
        assert_eq!(backend.list_collections().await.unwrap(), vec!["custom".to_string()]);

        let all = backend.get_all("col-x", true).await.unwrap();
        assert_eq!(all.embeddings, Some(vec![vec![0.5, 0.5]]));
        let report = backend.find_duplicates("custom", 0.1, 10).await.unwrap();
        assert!(report.groups.is_empty());
        assert_eq!(report.scanned, 1);
    }

    #[tokio::test]
    async fn summaries_cover_every_collection() {
        let backend = SimulatedBackend::new();
        let summaries = backend.collection_summaries().await.unwrap();
        let names: Vec<_> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["ai-agent-memories", "knowledge-base"]);
        assert_eq!(summaries[0].count, 20);
        assert_eq!(summaries[1].count, 10);
    }
}
