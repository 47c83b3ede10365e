//! API route configuration.

use crate::api::handlers::{health_handler, metadata_handler, redirect_handler, shorten_handler};
use crate::api::middleware::rate_limit;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// All service routes.
///
/// # Endpoints
///
/// - `POST /shorten`      - Create a short code (rate limited per caller)
/// - `GET  /fetch/{code}` - Stored URL and metadata as JSON
/// - `GET  /health`       - Store and cache connectivity
/// - `GET  /{code}`       - Permanent redirect to the stored URL
pub fn routes(state: AppState) -> Router {
    let shorten = Router::new()
        .route("/shorten", post(shorten_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ));

    Router::new()
        .merge(shorten)
        .route("/health", get(health_handler))
        .route("/fetch/{code}", get(metadata_handler))
        .route("/{code}", get(redirect_handler))
        .with_state(state)
}
