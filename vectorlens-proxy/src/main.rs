use tracing_subscriber::EnvFilter;
use vectorlens_proxy::{ProxyConfig, run_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ProxyConfig::from_env()?;
    run_server(config).await
}
