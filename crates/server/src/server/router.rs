//! Axum router construction.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware::Limits, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
pub fn build(state: AppState, limits: Limits) -> Router {
    Router::new()
        .route("/api/encrypt", post(handlers::encrypt))
        .route("/api/decrypt", post(handlers::decrypt))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(limits.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(limits.request_timeout))
        .layer(CompressionLayer::new())
        .with_state(state)
}
