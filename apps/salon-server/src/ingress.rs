//! HTTP edge: request ids, tracing spans, timeouts, CORS and body limits
//! wrapped around whatever routes the modules registered.

use std::time::Duration;

use axum::http::{HeaderName, Request};
use axum::middleware::{from_fn, Next};
use axum::response::{Json, Response};
use axum::{body::Body, routing::get, Router};
use runtime::ServerConfig;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;
use tracing::Span;

#[derive(Clone, Debug)]
pub struct XRequestId(pub String);

pub fn request_id_header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

#[derive(Clone, Default)]
pub struct MakeReqId;

impl MakeRequestId for MakeReqId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = nanoid::nanoid!();
        Some(RequestId::new(id.parse().ok()?))
    }
}

/// Stores the request id in extensions and records it on the current span.
pub async fn push_req_id_to_extensions(mut req: Request<Body>, next: Next) -> Response {
    let rid = req
        .headers()
        .get(request_id_header())
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| "n/a".to_string());

    req.extensions_mut().insert(XRequestId(rid.clone()));
    Span::current().record("request_id", tracing::field::display(&rid));

    next.run(req).await
}

fn make_span(req: &Request<Body>) -> Span {
    let rid = req
        .headers()
        .get(request_id_header())
        .and_then(|v| v.to_str().ok())
        .unwrap_or("n/a");
    tracing::info_span!(
        "http_request",
        method = %req.method(),
        uri = %req.uri().path(),
        version = ?req.version(),
        request_id = %rid,
        status = Empty,
        latency_ms = Empty
    )
}

fn on_response(res: &Response, latency: Duration, span: &Span) {
    span.record("status", res.status().as_u16());
    span.record("latency_ms", u64::try_from(latency.as_millis()).unwrap_or(u64::MAX));
    tracing::debug!(parent: span, status = res.status().as_u16(), "request finished");
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Add `/health` and wrap the router in the edge middleware stack.
///
/// Outermost to innermost: PropagateRequestId, SetRequestId,
/// push_req_id_to_extensions, Trace, Timeout, CORS, BodyLimit.
pub fn with_edge_layers(router: Router, cfg: &ServerConfig) -> Router {
    let mut router = router.route("/health", get(health_check));

    // axum applies the last `.layer` outermost, so add innermost first
    router = router.layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));

    if cfg.cors_permissive {
        router = router.layer(CorsLayer::permissive());
    }

    if cfg.timeout_sec > 0 {
        router = router.layer(TimeoutLayer::new(Duration::from_secs(cfg.timeout_sec)));
    }

    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_span)
                .on_response(on_response),
        )
        .layer(from_fn(push_req_id_to_extensions))
        .layer(SetRequestIdLayer::new(request_id_header(), MakeReqId))
        .layer(PropagateRequestIdLayer::new(request_id_header()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn cfg() -> ServerConfig {
        ServerConfig::default()
    }

    #[tokio::test]
    async fn health_reports_healthy_and_assigns_request_id() {
        let app = with_edge_layers(Router::new(), &cfg());
        let res = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let rid = res.headers().get("x-request-id").expect("request id header");
        assert!(!rid.to_str().unwrap().is_empty());

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let v: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["status"], "healthy");
    }

    #[tokio::test]
    async fn client_request_id_is_propagated() {
        let app = with_edge_layers(Router::new(), &cfg());
        let res = app
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.headers().get("x-request-id").unwrap(), "abc-123");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let mut c = cfg();
        c.body_limit_bytes = 16;
        let app = with_edge_layers(
            Router::new().route("/echo", axum::routing::post(|body: String| async move { body })),
            &c,
        );
        let res = app
            .oneshot(
                Request::post("/echo")
                    .body(Body::from("x".repeat(64)))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
