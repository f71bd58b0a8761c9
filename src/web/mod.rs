// src/web/mod.rs
// Web server layer

pub mod api;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::web::state::AppState;

/// Largest accepted upload, enforced by the upload handler
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Create the web server router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes (REST)
    let api_router = Router::new()
        .route("/upload", post(api::upload))
        .route("/chat", post(api::chat))
        .route("/chat/history", get(api::get_chat_history))
        .route("/chat/clear", post(api::clear_chat_history))
        .route("/feedback", post(api::submit_feedback))
        .route("/status", get(api::get_status))
        .with_state(state.clone());

    Router::new()
        // Health check at root level
        .route("/health", get(api::health))

        // API routes
        .nest("/api", api_router)

        // The framework limit sits above the upload handler's own cap, so
        // oversized files reach that check instead of a bare 413
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES * 2))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
