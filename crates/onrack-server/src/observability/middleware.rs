//! Request-id propagation and HTTP metrics middleware.

use axum::{
    body::Body,
    extract::{MatchedPath, Request},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use super::metrics::{HttpLabels, METRICS};

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID extension type.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Tags every request with an id, reusing `x-request-id` when the client
/// sent one, and echoes it on the response.
///
/// Install with `axum::middleware::from_fn(request_id_middleware)`.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
    );

    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Records request count and latency labelled by matched route.
///
/// Installed with `route_layer`, so only requests that hit an API route are
/// counted.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());

    METRICS.begin_request();
    let response = next.run(request).await;
    let elapsed = started.elapsed();

    let labels = HttpLabels {
        method,
        route,
        status: response.status().as_u16(),
    };
    tracing::debug!(
        method = %labels.method,
        route = %labels.route,
        status = labels.status,
        elapsed_ms = elapsed.as_millis() as u64,
        "API request served"
    );
    METRICS.finish_request(labels, elapsed.as_secs_f64());

    response
}

/// Serves the Prometheus scrape endpoint.
pub async fn metrics_handler() -> Response<Body> {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        METRICS.encode(),
    )
        .into_response()
}
