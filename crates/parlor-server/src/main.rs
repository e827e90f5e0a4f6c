//! Coordinator binary.

use parlor_core::MatchBook;
use parlor_server::{Config, Server};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;

    info!(
        "starting parlor-server on {}:{} (max_clients = {}, match_size = {})",
        config.bind_addr, config.port, config.max_clients, config.match_size
    );

    let matches = MatchBook::new(config.match_size);
    let server = Server::bind(&config, matches).await?;
    server.run().await
}
