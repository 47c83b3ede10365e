//! Handler for short code metadata lookups.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::url::UrlMetadataResponse;
use crate::api::middleware::tracing::record_short_code;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the stored URL and record metadata without redirecting.
///
/// # Endpoint
///
/// `GET /fetch/{code}`
///
/// # Response
///
/// ```json
/// {
///   "url": "https://example.com/some/rather/long/path",
///   "metadata": {
///     "short_code": "X088r5mw",
///     "created_at": "2025-03-14T15:09:26Z",
///     "expire_at": "2025-03-14T16:09:26Z"
///   }
/// }
/// ```
///
/// # Errors
///
/// Same as [`super::redirect_handler`]: 404, 410 or 503.
pub async fn metadata_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UrlMetadataResponse>, AppError> {
    record_short_code(&code);
    let record = state.shortener.get_url_by_code(&code).await?;
    Ok(Json(record.into()))
}
