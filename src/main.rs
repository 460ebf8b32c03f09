//! Standalone user registry server.
//!
//! Binds to `USER_REGISTRY_HOST:USER_REGISTRY_PORT` (default `0.0.0.0:8080`)
//! and serves until Ctrl+C.

use user_registry::{ServiceConfig, UserRegistryServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServiceConfig::from_env()?;
    let server = UserRegistryServer::new(config).await?;

    tracing::info!("API explorer at {}{}/", server.url(), user_registry::docs::SWAGGER_PATH);
    tracing::info!("Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    server.shutdown().await?;

    Ok(())
}
