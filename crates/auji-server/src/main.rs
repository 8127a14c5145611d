use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use auji_core::{ScrapeConfig, ThrottledFetcher};
use auji_db::{Database, DatabaseConfig};
use auji_server::routes;
use auji_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("auji=info".parse()?))
        .with_target(false)
        .init();

    let port = std::env::var("AUJI_SERVER_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");
    let admin_token = std::env::var("AUJI_ADMIN_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());

    let db = Database::connect(&DatabaseConfig::from_env()?).await?;
    db.migrate().await?;

    let config = ScrapeConfig::from_env()?;
    let fetcher = ThrottledFetcher::new(page_fetcher::open(&config).await?, config.page_delay);

    let mut state = AppState::new(db.job_repo(), db.profile_repo(), fetcher, config);
    match admin_token {
        Some(token) => state = state.with_admin_token(token),
        None => tracing::warn!("AUJI_ADMIN_TOKEN not set; scrape endpoints are disabled"),
    }
    let state = Arc::new(state);
    let shutdown = state.shutdown.clone();

    let app = routes::router(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    page_fetcher::close(state.fetcher.inner()).await;
    Ok(())
}

/// Resolves on Ctrl+C and cancels running scrapes so they stop after their current page.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
    }
    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}

#[cfg(feature = "browser")]
mod page_fetcher {
    use auji_client::BrowserFetcher;
    use auji_core::ScrapeConfig;

    pub async fn open(config: &ScrapeConfig) -> anyhow::Result<BrowserFetcher> {
        BrowserFetcher::with_timeouts(config.page_timeout * 2, config.page_timeout)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }

    pub async fn close(fetcher: &BrowserFetcher) {
        if let Err(e) = fetcher.close().await {
            tracing::warn!(error = %e, "Browser did not shut down cleanly");
        }
    }
}

#[cfg(not(feature = "browser"))]
mod page_fetcher {
    use auji_client::ReqwestFetcher;
    use auji_core::ScrapeConfig;

    pub async fn open(config: &ScrapeConfig) -> anyhow::Result<ReqwestFetcher> {
        tracing::warn!("Built without the `browser` feature; listings are fetched without rendering");
        ReqwestFetcher::with_timeout(config.page_timeout).map_err(|e| anyhow::anyhow!(e))
    }

    pub async fn close(_fetcher: &ReqwestFetcher) {}
}
