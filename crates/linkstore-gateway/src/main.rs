//! Linkstore gateway: users, platform primitives and the professional network over HTTP.
//! Storage is etcd (JSON gateway) or an embedded sled directory, chosen by configuration.

mod app;
mod error;
mod handlers;

use linkstore_core::{open_backend, KvAdapter, LinkstoreConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[linkstore-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = LinkstoreConfig::load().map_err(|e| {
        tracing::error!(target: "linkstore::gateway", error = %e, "invalid configuration");
        e
    })?;

    let backend = open_backend(&config.store).map_err(|e| {
        tracing::error!(target: "linkstore::gateway", error = %e, "failed to open key-value backend");
        e
    })?;
    let kv = KvAdapter::new(backend);
    let backend_name = kv.backend_name();
    let state = Arc::new(app::AppState::new(kv, &config.network));
    let router = app::build_app(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        target: "linkstore::gateway",
        app = %config.app_name,
        addr = %addr,
        backend = backend_name,
        skill_lookup = ?config.network.skill_lookup,
        "listening"
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!(target: "linkstore::gateway", "shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(target: "linkstore::gateway", error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
    tracing::info!(target: "linkstore::gateway", "shutdown initiated (Ctrl+C received)");
}
