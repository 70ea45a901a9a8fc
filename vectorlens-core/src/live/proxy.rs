//! Client for the analytics proxy service.
//!
//! Every endpoint is a `POST` with a JSON body keyed by `collection`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::analytics::{CollectionSummary, DuplicateReport, Graph, SourceCounts, TimelinePage};
use crate::config::LensConfig;
use crate::error::Result;
use crate::live::wire::{NestedQueryResult, send_json};
use crate::types::{DeleteReceipt, QueryResult, StoreReceipt, StoreRequest, SyncReport};

#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: reqwest::Client,
    base: String,
}

impl ProxyClient {
    pub fn with_client(client: reqwest::Client, config: &LensConfig) -> Self {
        Self { client, base: config.proxy_base.clone() }
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{path}", self.base);
        send_json(self.client.post(&url).json(body), &url).await
    }

    pub async fn query(&self, collection: &str, text: &str, n_results: usize) -> Result<QueryResult> {
        let body = json!({ "collection": collection, "query": text, "n_results": n_results });
        let nested: NestedQueryResult = self.post("/query", &body).await?;
        Ok(nested.into_result())
    }

    pub async fn timeline(&self, collection: &str, offset: usize, limit: usize) -> Result<TimelinePage> {
        let body = json!({ "collection": collection, "offset": offset, "limit": limit });
        self.post("/timeline", &body).await
    }

    pub async fn sources(&self, collection: &str) -> Result<SourceCounts> {
        self.post("/sources", &json!({ "collection": collection })).await
    }

    pub async fn duplicates(
        &self,
        collection: &str,
        threshold: f32,
        sample_size: usize,
    ) -> Result<DuplicateReport> {
        let body = json!({
            "collection": collection,
            "threshold": threshold,
            "sample_size": sample_size,
        });
        self.post("/duplicates", &body).await
    }

    pub async fn delete(&self, collection: &str, ids: &[String]) -> Result<DeleteReceipt> {
        self.post("/delete", &json!({ "collection": collection, "ids": ids })).await
    }

    pub async fn graph(&self, collection: &str, sample_size: usize, threshold: f32) -> Result<Graph> {
        let body = json!({
            "collection": collection,
            "sample_size": sample_size,
            "threshold": threshold,
        });
        self.post("/graph", &body).await
    }

    pub async fn collections(&self) -> Result<Vec<CollectionSummary>> {
        self.post("/collections", &json!({})).await
    }

    pub async fn store(&self, request: &StoreRequest) -> Result<StoreReceipt> {
        self.post("/store", request).await
    }

    pub async fn sync(&self) -> Result<SyncReport> {
        self.post("/sync", &json!({})).await
    }
}
