use crate::{handlers, AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Creates the Axum router and associates routes with handlers.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/memes", get(handlers::list_memes).post(handlers::create_meme))
        .route("/api/memes/search", get(handlers::search_memes))
        .route("/api/memes/trending", get(handlers::trending_memes))
        .route("/api/memes/tags/popular", get(handlers::popular_tags))
        .route("/api/memes/tags/suggest", get(handlers::suggest_tags))
        .route("/api/memes/tag/{tag}", get(handlers::memes_by_tag))
        .route("/api/memes/{id}", get(handlers::get_meme))
        .route("/api/memes/{id}/upvote", post(handlers::upvote_meme))
        .route("/api/memes/{id}/download", post(handlers::download_meme))
        // Middleware Layers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}
