//! Mahjong settle binary entrypoint wiring the form API, notification stream and store.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mahjong_settle::{
    config::AppConfig,
    dao::{
        kv_store::{
            KeyValueStore,
            file::{FileStore, FileStoreConfig},
            memory::MemoryStore,
        },
        settlement_gateway::HttpSettlementGateway,
    },
    routes,
    services::form_service,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = open_store(&config).await?;
    let gateway = HttpSettlementGateway::new().context("building HTTP client")?;

    let app_state = AppState::new(&config, store, Arc::new(gateway));
    if let Err(err) = form_service::restore(&app_state).await {
        // A malformed record must not keep the form from opening.
        warn!(error = %err, "failed to restore form; starting blank");
    }

    let app = build_router(app_state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Open the file store when a path is configured, the in-memory store otherwise.
async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    match &config.store_path {
        Some(path) => {
            let store = FileStore::open(FileStoreConfig::new(path.clone()))
                .await
                .with_context(|| format!("opening store at {}", path.display()))?;
            info!(path = %path.display(), "using file store");
            Ok(Arc::new(store))
        }
        None => {
            warn!("no store path configured; form contents will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
