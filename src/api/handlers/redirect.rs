//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::debug;

use crate::api::middleware::tracing::record_short_code;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve the code through the cache-aside repository
/// 2. Return `301 Moved Permanently` with the stored URL in `Location`
///
/// Expired codes are answered from the negative cache entry without touching
/// the database.
///
/// # Errors
///
/// - **404 Not Found**: the short code doesn't exist
/// - **410 Gone**: the link has expired
/// - **503 Service Unavailable**: cache or database unreachable
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    record_short_code(&code);
    let record = state.shortener.get_url_by_code(&code).await?;

    debug!("Redirecting {} -> {}", code, record.original_url);

    Ok((
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, record.original_url)],
    ))
}
