//! One-shot connectivity probe that picks the backend for the session.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::backend::{BackendMode, CollectionBackend};
use crate::config::LensConfig;
use crate::error::Result;
use crate::explorer::Explorer;
use crate::live::{ChromaClient, LiveBackend};
use crate::simulated::SimulatedBackend;

/// Checks once whether the live store answers its heartbeat.
///
/// The outcome is memoized: concurrent first callers share a single request,
/// and later calls return the cached mode without touching the network.
#[derive(Debug)]
pub struct ConnectivityProbe {
    chroma: ChromaClient,
    resolved: OnceCell<BackendMode>,
}

impl ConnectivityProbe {
    pub fn new(config: &LensConfig) -> Result<Self> {
        Ok(Self { chroma: ChromaClient::new(config)?, resolved: OnceCell::new() })
    }

    /// `true` when the live backend is reachable.
    pub async fn check(&self) -> bool {
        self.mode().await == BackendMode::Live
    }

    /// The selected mode. Any heartbeat failure selects simulated mode.
    pub async fn mode(&self) -> BackendMode {
        *self
            .resolved
            .get_or_init(|| async {
                match self.chroma.heartbeat().await {
                    Ok(_) => BackendMode::Live,
                    Err(e) => {
                        warn!(error = %e, "live backend unavailable, using fixture data");
                        BackendMode::Simulated
                    }
                }
            })
            .await
    }
}

/// Probe the configured backend and return an [`Explorer`] bound to the
/// selected implementation for the rest of the session.
///
/// # Example
///
/// ```rust,ignore
/// let config = LensConfig::from_env()?;
/// let explorer = vectorlens_core::connect(&config).await?;
/// println!("running in {} mode", explorer.mode());
/// ```
pub async fn connect(config: &LensConfig) -> Result<Explorer> {
    let probe = ConnectivityProbe::new(config)?;
    let mode = probe.mode().await;
    info!(%mode, api_base = %config.api_base, "backend selected");

    let backend: Arc<dyn CollectionBackend> = match mode {
        BackendMode::Live => Arc::new(LiveBackend::new(config)?),
        BackendMode::Simulated => Arc::new(SimulatedBackend::new()),
    };
    Ok(Explorer::new(backend).with_config(config.clone()))
}
