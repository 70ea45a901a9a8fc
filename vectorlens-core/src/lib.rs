//! # vectorlens-core
//!
//! Data access and derived analytics for exploring a vector-embedding document store.
//!
//! ## Overview
//!
//! A session starts with a connectivity probe. If the store answers its heartbeat,
//! every call goes to the [`LiveBackend`]; otherwise the [`SimulatedBackend`] serves
//! a built-in fixture dataset. Callers only see the resolved [`Explorer`].
//!
//! - [`Explorer`] - list, describe, page, fetch-all, query, delete, store
//! - [`detect_duplicates`] - anchor/similar clusters under a distance threshold
//! - [`build_graph`] - node/link graph over a bounded sample
//! - [`SimilarityApproximator`] - term-overlap scoring used without a live store
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vectorlens_core::{LensConfig, connect};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let explorer = connect(&LensConfig::from_env()?).await?;
//!     for name in explorer.list_collections().await? {
//!         let hits = explorer.query(&name, "kubernetes", 5).await?;
//!         println!("{name}: {} matches", hits.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod backend;
pub mod config;
pub mod error;
pub mod explorer;
pub mod fixture;
pub mod live;
pub mod probe;
pub mod similarity;
pub mod simulated;
pub mod types;

pub use analytics::{
    CollectionSummary, DuplicateGroup, DuplicateReport, Graph, GraphLink, GraphNode,
    SourceCounts, TimelineEntry, TimelinePage, build_graph, detect_duplicates, source_counts,
    summarize, tag_overlap_distance, timeline_page,
};
pub use backend::{BackendMode, CollectionBackend};
pub use config::{LensConfig, LensConfigBuilder};
pub use error::{LensError, Result};
pub use explorer::Explorer;
pub use fixture::{FixtureCollection, FixtureDataset};
pub use live::{ChromaClient, LiveBackend, ProxyClient};
pub use probe::{ConnectivityProbe, connect};
pub use similarity::{SimilarityApproximator, cosine_distance, cosine_similarity};
pub use simulated::SimulatedBackend;
pub use types::{
    Chunk, Collection, DeleteReceipt, Heartbeat, Metadata, Page, QueryResult, ResolvedStore,
    ScoredChunk, StoreReceipt, StoreRequest, SyncReport, similarity_percent,
};
