use anyhow::Context;
use portal_client::PortalClient;
use portal_core::config::api_timeout_from_env_value;
use portal_core::constants::{DEFAULT_SITE_URL, DEFAULT_STORAGE_URL};
use portal_core::PortalConfig;
use portal_web::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the portal site
///
/// Resolves configuration from the environment once, builds the API client, and serves the
/// site router.
///
/// # Environment Variables
/// - `PORTAL_API_BASE_URL`: base URL of the remote REST API (required)
/// - `PORTAL_SITE_URL`: public origin used in deep links (default: "http://localhost:3000")
/// - `PORTAL_STORAGE_URL`: origin for relative image paths (default: "http://localhost:8000/storage")
/// - `PORTAL_API_TIMEOUT_SECS`: API request timeout in seconds (default: 10)
/// - `PORTAL_REST_ADDR`: listen address (default: "0.0.0.0:3000")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration is invalid or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("portal=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Ok(api_base_url) = std::env::var("PORTAL_API_BASE_URL") else {
        anyhow::bail!("PORTAL_API_BASE_URL must be set");
    };
    let site_url = std::env::var("PORTAL_SITE_URL").unwrap_or_else(|_| DEFAULT_SITE_URL.into());
    let storage_url =
        std::env::var("PORTAL_STORAGE_URL").unwrap_or_else(|_| DEFAULT_STORAGE_URL.into());
    let timeout = api_timeout_from_env_value(std::env::var("PORTAL_API_TIMEOUT_SECS").ok())?;
    let rest_addr = std::env::var("PORTAL_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let config =
        PortalConfig::new(&api_base_url, &site_url, timeout)?.with_storage_url(&storage_url)?;
    let client = PortalClient::new(&config)?;

    tracing::info!("++ Starting portal on {}", rest_addr);
    tracing::info!("++ Using API at {}", config.api_base_url());

    let app = portal_web::router(AppState::new(Arc::new(client), Arc::new(config)));

    let listener = tokio::net::TcpListener::bind(&rest_addr)
        .await
        .with_context(|| format!("binding {rest_addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
