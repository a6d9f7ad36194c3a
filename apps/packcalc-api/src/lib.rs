//! # Packcalc API
//!
//! HTTP server in front of the pack optimizer and its calculation log.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Packcalc API Server                             │
//! │                                                                         │
//! │  Client ───► axum Router (8080) ───► PackService ───► PackStore        │
//! │               │                          │              │               │
//! │               ├── TraceLayer             │              ├── SQLite      │
//! │               └── CorsLayer              ▼              └── memory      │
//! │                                    spawn_blocking                       │
//! │                                    (optimizer + deadline)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `PORT` - HTTP port (default: 8080)
//! - `BIND_ADDR` - Interface to bind (default: 0.0.0.0)
//! - `DATABASE_PATH` - SQLite file; unset selects the in-memory store
//! - `DEFAULT_PACKS` - Catalog seeded into an empty store (default: 250,500,1000,2000,5000)
//! - `MAX_SEARCH_LIMIT` - Largest optimizer search window (default: 10000000)
//! - `CALCULATION_TIMEOUT_MS` - Optimizer deadline, 0 disables (default: 5000)
//! - `DB_MAX_CONNECTIONS` - SQLite pool size (default: 5)
//! - `RUST_LOG` - Log filter (default: info,packcalc=debug,sqlx=warn)

pub mod config;
pub mod error;
pub mod routes;
pub mod service;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use packcalc_db::{seed_catalog_if_empty, DbConfig, MemoryStore, PackStore, SqliteStore};

// Re-exports
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ErrorCode};
pub use service::{PackService, ServiceError, ServiceResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: PackService,
}

impl AppState {
    pub fn new(service: PackService) -> Self {
        AppState { service }
    }
}

/// Builds the HTTP router with tracing and CORS applied.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(routes::health))
        .route("/packs", get(routes::get_packs).post(routes::set_packs))
        .route("/calculate", post(routes::calculate))
        .route("/calculations", get(routes::list_calculations))
        .route("/calculations/{id}", get(routes::get_calculation))
        .fallback(routes::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the built-in default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,packcalc=debug,sqlx=warn"));

    // A second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Opens the configured store.
///
/// Falls back to [`MemoryStore`] when no database path is set or the SQLite
/// file cannot be opened.
pub async fn open_store(config: &ApiConfig) -> Arc<dyn PackStore> {
    let Some(path) = &config.database_path else {
        warn!("DATABASE_PATH not set, using in-memory store");
        return Arc::new(MemoryStore::new());
    };

    let db_config = DbConfig::new(path.clone()).max_connections(config.db_max_connections);
    match SqliteStore::connect(db_config).await {
        Ok(store) => {
            info!(path = %path.display(), "Using SQLite store");
            Arc::new(store)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "SQLite unavailable, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    }
}

/// Builds the service described by `config` on top of `store`.
pub fn build_service(config: &ApiConfig, store: Arc<dyn PackStore>) -> PackService {
    PackService::new(store)
        .with_max_search_limit(config.max_search_limit)
        .with_timeout(config.calculation_timeout)
}

/// Runs the server until Ctrl+C or SIGTERM.
pub async fn run(config: ApiConfig) -> anyhow::Result<()> {
    let store = open_store(&config).await;

    seed_catalog_if_empty(&*store, &config.default_packs).await?;

    let service = build_service(&config, store);
    let app = build_router(AppState::new(service));

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Packcalc API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Packcalc API stopped");
    Ok(())
}

/// Resolves on the first of Ctrl+C or SIGTERM.
///
/// A handler that cannot be installed never resolves, leaving the other one
/// in charge.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use packcalc_db::CatalogStore;

    #[tokio::test]
    async fn test_open_store_without_path_uses_memory() {
        let store = open_store(&ApiConfig::default()).await;

        assert!(store.read_catalog().await.unwrap().is_empty());
        assert!(seed_catalog_if_empty(&*store, &[250, 500]).await.unwrap());
        assert_eq!(store.read_catalog().await.unwrap(), vec![250, 500]);
    }

    #[tokio::test]
    async fn test_open_store_with_sqlite_file() {
        let path = std::env::temp_dir().join(format!("packcalc-api-{}.db", std::process::id()));
        let config = ApiConfig {
            database_path: Some(path.clone()),
            ..ApiConfig::default()
        };

        let store = open_store(&config).await;
        store.replace_catalog(&[23, 31, 53]).await.unwrap();
        drop(store);

        let reopened = open_store(&config).await;
        assert_eq!(reopened.read_catalog().await.unwrap(), vec![23, 31, 53]);

        drop(reopened);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_build_service_applies_limits() {
        let config = ApiConfig {
            max_search_limit: 1_000,
            ..ApiConfig::default()
        };
        let store: Arc<dyn PackStore> = Arc::new(MemoryStore::with_catalog(&[250]).unwrap());
        let service = build_service(&config, store);

        assert!(service.calculate(751).await.is_ok());
        assert!(matches!(
            service.calculate(10_000).await,
            Err(ServiceError::Core(_))
        ));
    }
}
