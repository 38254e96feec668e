//! HTTP API for the document store.
//!
//! | Route | Method | Input |
//! |---|---|---|
//! | `/api/read` | GET | `?fileName=` (inline PDF) |
//! | `/api/read-text` | GET | `?fileName=` |
//! | `/api/write` | POST | `{fileName, content}` |
//! | `/api/append` | POST | `{fileName, content}` |
//! | `/api/rename` | PUT | `{oldName, newName}` |
//! | `/api/delete` | DELETE | `?fileName=` |
//! | `/api/create-dir` | POST | `{dirName}` |
//! | `/api/delete-dir` | DELETE | `?dirName=` |
//!
//! Successful mutations answer `{"message": ...}`; failures answer
//! `{"error": ...}` with a 4xx/5xx status.

pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::routing::{delete, get, post, put};
use log::info;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::storage::DocumentStore;

/// Shared state handed to every handler.
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Arc<Self> {
        Arc::new(Self { store })
    }
}

/// Build the application router.
///
/// When `static_dir` is set, unmatched paths are served from it so the
/// browser UI and the API share one origin.
#[must_use]
pub fn router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/api/read", get(handlers::read_inline))
        .route("/api/read-text", get(handlers::read_text))
        .route("/api/write", post(handlers::write))
        .route("/api/append", post(handlers::append))
        .route("/api/rename", put(handlers::rename))
        .route("/api/delete", delete(handlers::delete))
        .route("/api/create-dir", post(handlers::create_dir))
        .route("/api/delete-dir", delete(handlers::delete_dir));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(cors).with_state(state)
}

/// Start the HTTP server and run until it fails.
///
/// # Errors
///
/// Returns an error if the address is invalid, the port cannot be bound, or
/// the server stops with an I/O error.
pub async fn serve<S>(store: S, listen: &str, static_dir: Option<&Path>) -> anyhow::Result<()>
where
    S: DocumentStore + 'static,
{
    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("Invalid listen address: {listen}"))?;

    let app = router(AppState::new(Arc::new(store)), static_dir);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot bind {addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);
    if let Some(dir) = static_dir {
        info!("Serving static files from {}", dir.display());
    }

    axum::serve(listener, app).await?;
    Ok(())
}
