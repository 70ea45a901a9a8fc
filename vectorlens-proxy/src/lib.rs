//! `vectorlens-proxy` serves analytics over a vector store: semantic search,
//! duplicate clusters, relationship graphs, timelines, ingestion and sync.
//! Every endpoint is a `POST` taking a JSON body keyed by `collection`.

pub mod config;
pub mod error;
pub mod server;
pub mod service;

pub use config::ProxyConfig;
pub use error::{ProxyError, Result};
pub use server::{AppState, app_router, run_server};
pub use service::AnalyticsService;
