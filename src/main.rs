use axum::extract::Request;
use axum::{Router, ServiceExt};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pamps::config::{AppConfig, AppMode, StoreBackend};
use pamps::http;
use pamps::infra::{db::Db, memory::MemoryStore, postgres::PgStore, store::Store};
use pamps::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let store: Arc<dyn Store> = match config.store_backend {
        StoreBackend::Postgres => {
            let db = Db::connect(&config).await?;
            if config.app_mode == AppMode::Migrate {
                db.migrate(&config.migrations_dir).await?;
                return Ok(());
            }
            Arc::new(PgStore::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState {
        store,
        paseto_access_key: config.paseto_access_key,
        paseto_refresh_key: config.paseto_refresh_key,
        access_ttl_minutes: config.access_ttl_minutes,
        refresh_ttl_days: config.refresh_ttl_days,
    };

    let app: Router = http::router(state).layer(TraceLayer::new_for_http());
    let app = http::service(app);
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!("listening on {}", config.http_addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
