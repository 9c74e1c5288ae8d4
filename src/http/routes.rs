use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes; anything unmatched is looked up in `public_dir`
pub fn create_router(state: AppState, public_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        // Client pages
        .route("/host", get(handlers::host))
        .route("/participant", get(handlers::participant))
        // Webhooks
        .route(
            "/callback",
            get(handlers::callback_probe).post(handlers::callback),
        )
        // Archive control
        .route("/history", get(handlers::history))
        .route("/download/:archive_id", get(handlers::download))
        .route("/start", post(handlers::start_archive))
        .route("/startold", post(handlers::start_archive_direct))
        .route("/stop/:archive_id", get(handlers::stop_archive))
        .route("/delete/:archive_id", get(handlers::delete_archive))
        .fallback_service(ServeDir::new(public_dir))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
