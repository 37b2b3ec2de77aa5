//! fortune-service: versioned CRUD over an in-memory store
//!
//! Demonstrates the revision-service core wired behind axum: conditional
//! GET/HEAD, optimistic-concurrency PUT/DELETE via `If-Match`, create-only
//! POST with a server-generated id, and per-resource OPTIONS.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use revision_service::handler::ResourceHandler;
use revision_service::policy::ResourcePolicy;
use revision_service::store::MemoryStore;

use fortune_service::{handlers, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_new(&config.service.log_level)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let policy = ResourcePolicy::new("/fortune/v1")
        .gone_when_missing(config.resource.gone_when_missing);
    let state = AppState {
        fortunes: Arc::new(ResourceHandler::new(MemoryStore::new(), policy)),
    };

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/fortune/v1",
            axum::routing::post(handlers::create).options(handlers::options),
        )
        .route(
            "/fortune/v1/{id}",
            get(handlers::read)
                .head(handlers::head)
                .put(handlers::upsert)
                .delete(handlers::remove)
                .patch(handlers::patch)
                .options(handlers::options),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.service.port));
    tracing::info!("Starting {} on {}", config.service.name, addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    tracing::info!("Shutdown signal received, draining requests...");
}
