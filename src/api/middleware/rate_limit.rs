//! Per-caller rate limiting middleware.
//!
//! Callers are identified by their `User-Agent` header; the counter lives in
//! the shared cache store so every instance sees the same window.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde_json::json;

use crate::{error::AppError, state::AppState, utils::user_agent::extract_user_agent};

/// Admits or rejects the request before it reaches the handler.
///
/// # Errors
///
/// - **429 Too Many Requests** when the caller exhausted the window
/// - **503 Service Unavailable** when the counter cannot be updated
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/shorten", post(shorten_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    headers: HeaderMap,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = extract_user_agent(&headers);

    if !st.rate_limiter.admit(&identity).await? {
        return Err(AppError::rate_limited(
            "Too many requests",
            json!({ "limit": st.rate_limiter.max_requests() }),
        ));
    }

    Ok(next.run(req).await)
}
