use axum::{
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

/// Metrics label for requests that never reached an API route
/// (static images, unknown paths).
const UNROUTED: &str = "unrouted";

/// Route template of the handler that produced a response, e.g.
/// `/api/products/{id}`.
#[derive(Debug, Clone)]
pub struct RouteLabel(pub String);

/// Copies the matched route template onto the response.
///
/// Installed with `route_layer`, so it only runs once routing succeeded and
/// `MatchedPath` is available.
pub async fn tag_matched_route(req: Request, next: Next) -> Response {
    let label = req
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| RouteLabel(mp.as_str().to_string()));

    let mut response = next.run(req).await;
    if let Some(label) = label {
        response.extensions_mut().insert(label);
    }
    response
}

/// Runs every request inside a `request` span and emits one
/// "Request finished" event plus the HTTP metrics.
///
/// The span carries an empty `user_id` that the session layer fills in.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %method,
        path = %path,
        user_id = tracing::field::Empty,
    );

    async move {
        let response = next.run(req).await;
        let status = response.status().as_u16();

        let route = response
            .extensions()
            .get::<RouteLabel>()
            .map_or(UNROUTED, |label| label.0.as_str());

        let labels = [
            ("method", method),
            ("route", route.to_string()),
            ("status", status.to_string()),
        ];
        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(start.elapsed().as_secs_f64());

        info!(
            event = "http_request_finished",
            route = %route,
            status_code = status,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("same-origin"),
    );

    response
}
