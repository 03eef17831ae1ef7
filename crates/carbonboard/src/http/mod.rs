//! HTTP surface for carbonboard.
//!
//! Routes map form posts and page requests onto the [`EmissionRepository`]
//! and render the results through the [`Renderer`]. Both are built once at
//! startup and shared through [`AppState`].

mod forms;
mod handlers;
mod request_tracing;
mod response;

use std::future::Future;
use std::sync::Arc;

use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::repository::{EmissionRepository, SqliteRepository};
use crate::views::Renderer;

pub use response::AppError;

/// Shared handles every request handler needs.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Record repository.
    pub repo: Arc<dyn EmissionRepository>,
    /// Page renderer.
    pub renderer: Arc<Renderer>,
}

impl AppState {
    /// Bundle a repository and a renderer.
    #[must_use]
    pub fn new(repo: Arc<dyn EmissionRepository>, renderer: Renderer) -> Self {
        Self {
            repo,
            renderer: Arc::new(renderer),
        }
    }

    /// Open the configured database and template directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the templates
    /// fail to load.
    pub fn from_config(config: &Config) -> Result<Self> {
        let repo = SqliteRepository::open(config.database_path())?;
        let renderer = Renderer::new(
            config.templates.directory.clone(),
            config.templates.live_reload,
        )?;
        Ok(Self::new(Arc::new(repo), renderer))
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::index_handler).post(handlers::find_handler),
        )
        .route("/insert", post(handlers::insert_handler))
        .route("/detail/:model", get(handlers::detail_handler))
        .route("/delete/:id", post(handlers::delete_handler))
        .route("/edit", post(handlers::edit_handler))
        .route("/year", get(handlers::year_handler))
        .route("/sort", get(handlers::sort_handler))
        .route("/reverseSort", get(handlers::reverse_sort_handler))
        .layer(from_fn(request_tracing::trace_requests))
        .with_state(state)
}

/// Serve the application on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Server is running on http://{}", addr);
    }
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Server stopped");
    Ok(())
}
