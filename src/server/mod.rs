//! HTTP surface: a thin axum router over the catalog and fetch engine.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /` | front-end page |
//! | `GET /health` | liveness |
//! | `GET /api/papers` | paginated, filtered listing |
//! | `GET /api/filters` | distinct filter values |
//! | `GET /api/stats` | counts by subject, year, type |
//! | `GET /api/download/{id}` | single PDF (placeholder on failure) |
//! | `POST /api/download-zip` | ZIP of selected ids |
//! | `POST /api/download-filtered` | ZIP of a filter's matches |
//! | `GET /api/check/{id}` | per-mirror availability |

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::{DOWNLOAD_STATUS_HEADER, check_batch_size};

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::catalog::Catalog;
use crate::fetch::{DEFAULT_BATCH_CONCURRENCY, FetchEngine};

/// Default maximum number of papers in one ZIP request.
pub const DEFAULT_MAX_BATCH_PAPERS: usize = 100;

/// Request-level policy for the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Per-request concurrency for ZIP batches.
    pub batch_concurrency: usize,
    /// Largest accepted ZIP batch.
    pub max_batch_papers: usize,
    /// Directory holding `index.html` and static assets.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            max_batch_papers: DEFAULT_MAX_BATCH_PAPERS,
            static_dir: None,
        }
    }
}

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Paper catalog.
    pub catalog: Arc<Catalog>,
    /// Fetch engine (owns the success cache and shared pool).
    pub engine: FetchEngine,
    /// Request policy.
    pub settings: Arc<ServerSettings>,
}

impl AppState {
    /// Bundles the catalog, engine and settings.
    #[must_use]
    pub fn new(catalog: Catalog, engine: FetchEngine, settings: ServerSettings) -> Self {
        Self {
            catalog: Arc::new(catalog),
            engine,
            settings: Arc::new(settings),
        }
    }
}

/// Builds the application router.
pub fn create_router(state: AppState) -> Router {
    let static_dir = state.settings.static_dir.clone();

    let mut router = Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/papers", get(handlers::list_papers))
        .route("/api/filters", get(handlers::filters))
        .route("/api/stats", get(handlers::stats))
        .route("/api/download/{id}", get(handlers::download_paper))
        .route("/api/download-zip", post(handlers::download_zip))
        .route("/api/download-filtered", post(handlers::download_filtered))
        .route("/api/check/{id}", get(handlers::check_paper));

    if let Some(dir) = static_dir {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the router on `listener` until Ctrl-C.
///
/// # Errors
///
/// Returns the IO error if the server fails.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, papers = state.catalog.len(), "server listening");
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
