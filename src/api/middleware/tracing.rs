//! HTTP request/response tracing middleware.

use axum::http::Request;
use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span};

/// Name of the per-request span.
pub const REQUEST_SPAN: &str = "request";

/// Span field holding the short code a request creates or resolves.
pub const SHORT_CODE_FIELD: &str = "short_code";

/// Builds the per-request span.
///
/// Only the URI path is recorded; query strings never reach the logs.
/// `short_code` starts empty and is filled in by the handlers through
/// [`record_short_code`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "request",
            method = %request.method(),
            path = %request.uri().path(),
            version = ?request.version(),
            short_code = tracing::field::Empty,
        )
    }
}

/// Records `code` on the current request span.
pub fn record_short_code(code: &str) {
    Span::current().record(SHORT_CODE_FIELD, code);
}

pub type HttpTraceLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    RequestSpan,
    DefaultOnRequest,
    DefaultOnResponse,
>;

/// Creates a tracing middleware for HTTP requests.
///
/// # Logging Behavior
///
/// **On Request:**
/// - Creates a [`RequestSpan`] at `INFO` level with:
///   - HTTP method
///   - URI path
///   - HTTP version
///   - Short code, once a handler records it
///
/// **On Response:**
/// - Logs at `INFO` level with:
///   - Status code
///   - Latency in milliseconds
///
/// # Example Logs
///
/// ```text
/// INFO request{method=GET path=/X088r5mw version=HTTP/1.1}: started processing request
/// INFO request{method=GET path=/X088r5mw version=HTTP/1.1 short_code=X088r5mw}: finished processing request latency=2 ms status=301
/// ```
pub fn layer() -> HttpTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(RequestSpan)
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ManualClock;
    use crate::infrastructure::cache::MemoryCache;
    use crate::infrastructure::persistence::MemoryUrlRepository;
    use crate::routes::router;
    use crate::state::{AppState, StateOptions};
    use axum::body::Body;
    use axum::http::{StatusCode, header};
    use std::fmt::Debug;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;
    use tracing::field::{Field, Visit};
    use tracing::span::{Attributes, Id, Record};
    use tracing::Subscriber;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Collects the fields of every request span.
    #[derive(Clone, Default)]
    struct SpanFields(Arc<Mutex<Vec<(String, String)>>>);

    impl SpanFields {
        fn get(&self, name: &str) -> Option<String> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value.clone())
        }

        fn push(&self, values: impl FnOnce(&mut dyn Visit)) {
            let mut fields = self.0.lock().unwrap();
            values(&mut FieldVisitor(&mut fields));
        }
    }

    struct FieldVisitor<'a>(&'a mut Vec<(String, String)>);

    impl Visit for FieldVisitor<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.push((field.name().to_string(), value.to_string()));
        }

        fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
            self.0.push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    impl<S: Subscriber> Layer<S> for SpanFields {
        fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
            if attrs.metadata().name() == REQUEST_SPAN {
                self.push(|visitor| attrs.record(visitor));
            }
        }

        fn on_record(&self, _id: &Id, values: &Record<'_>, _ctx: Context<'_, S>) {
            self.push(|visitor| values.record(visitor));
        }
    }

    fn state() -> AppState {
        let clock = ManualClock::default();
        AppState::new(
            Arc::new(MemoryUrlRepository::new()),
            Arc::new(MemoryCache::new(Arc::new(clock.clone()))),
            Arc::new(clock),
            StateOptions::default(),
        )
    }

    #[test]
    fn test_request_span_declares_short_code() {
        let fields = SpanFields::default();
        let subscriber = tracing_subscriber::registry().with(fields);
        let _guard = tracing::subscriber::set_default(subscriber);

        let request = Request::get("/abc?secret=1").body(()).unwrap();
        let span = RequestSpan.make_span(&request);

        let metadata = span.metadata().unwrap();
        assert_eq!(metadata.name(), REQUEST_SPAN);
        assert_eq!(*metadata.level(), Level::INFO);
        assert!(metadata.fields().field(SHORT_CODE_FIELD).is_some());
        assert!(metadata.fields().field("path").is_some());
    }

    #[tokio::test]
    async fn test_lookup_records_short_code_and_path() {
        let fields = SpanFields::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(fields.clone()));

        let response = router(state())
            .oneshot(Request::get("/fetch/X088r5mw?utm=1").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(fields.get("path").as_deref(), Some("/fetch/X088r5mw"));
        assert_eq!(fields.get(SHORT_CODE_FIELD).as_deref(), Some("X088r5mw"));
    }

    #[tokio::test]
    async fn test_shorten_records_created_code() {
        let fields = SpanFields::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(fields.clone()));

        let response = router(state())
            .oneshot(
                Request::post("/shorten")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::USER_AGENT, "trace-test/1.0")
                    .body(Body::from(
                        r#"{"url":"https://example.com/very/long/path/value"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let code = fields.get(SHORT_CODE_FIELD).unwrap();
        assert!(!code.is_empty());
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
