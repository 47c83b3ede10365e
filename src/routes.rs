//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /shorten`      - Create a short code (rate limited)
//! - `GET  /fetch/{code}` - Stored URL and metadata
//! - `GET  /health`       - Health check: database and cache
//! - `GET  /{code}`       - Short link redirect
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Fixed window per `User-Agent`, shared through the cache
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Routes with tracing applied, without path normalization.
pub fn router(state: AppState) -> Router {
    api::routes::routes(state).layer(tracing::layer())
}
