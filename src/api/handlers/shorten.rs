//! Handler for the shortening endpoint.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::middleware::tracing::record_short_code;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::user_agent::extract_user_agent;

/// Creates a short code for a long URL.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/rather/long/path",
///   "expire_in": 60
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "message": "success",
///   "short_url": "https://sho.rt/X088r5mw",
///   "expire_at": "2025-03-14 16:09:26"
/// }
/// ```
///
/// # Errors
///
/// - **400 Bad Request**: invalid URL or negative `expire_in`
/// - **409 Conflict**: the generated code is already in use
/// - **503 Service Unavailable**: cache or database unreachable
pub async fn shorten_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;
    ensure_web_url(&payload.url)?;

    let identity = extract_user_agent(&headers);
    let shortened = state
        .shortener
        .create_short_url(&payload.url, payload.expire_in.unwrap_or(0), &identity)
        .await?;
    record_short_code(&shortened.code);

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse {
            message: "success".to_string(),
            short_url: format!("{}{}", state.short_url_prefix, shortened.code),
            expire_at: shortened.expiry_message,
        }),
    ))
}

/// Accepts only absolute `http`/`https` URLs with a host.
fn ensure_web_url(raw: &str) -> Result<(), AppError> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() })))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::bad_request(
            "Only http and https URLs are supported",
            json!({ "scheme": parsed.scheme() }),
        ));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::bad_request("URL must have a host", json!({})));
    }

    Ok(())
}
