// Route modules
pub mod story;

use crate::{app_state::AppState, middleware::logging_middleware};
use axum::{extract::DefaultBodyLimit, middleware, routing::post, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.server.max_body_bytes;

    Router::new()
        .nest("/api", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(logging_middleware))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

/// API routes
fn api_routes() -> Router<AppState> {
    Router::new().route("/story", post(story::generate_story))
}
