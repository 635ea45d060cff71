//! Router construction and shared application state.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use policylens_runtime::BriefGenerator;

use crate::handlers;

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<BriefGenerator>,
}

/// Build the application router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/brief", post(handlers::create_brief))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
