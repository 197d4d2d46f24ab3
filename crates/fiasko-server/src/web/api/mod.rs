pub mod auth;
pub mod middleware;
pub mod posts;

use crate::state::AppState;
use axum::response::IntoResponse;
use axum::{
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// GET /api/health -- liveness probe
async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

pub fn build_api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        // Auth routes
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Exhibit routes: public museum feed, the owner's attic, and the
        // ownership-checked privacy switch
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route("/posts/mine", get(posts::list_mine))
        .route("/posts/{id}/privacy", patch(posts::toggle_privacy))
        .with_state(state)
}
