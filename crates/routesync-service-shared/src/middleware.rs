//! Request correlation, HTTP metrics and CORS for the route service.
//!
//! Every request passing [`MetricsLayer`] carries a [`RequestId`] (taken from
//! `x-request-id` or freshly generated), runs inside a `request` span and gets
//! the same ID echoed on the response. HTTP series are labelled by the matched
//! route template, so unknown URLs collapse into one `unmatched` series:
//!
//! - `http_requests_total{method, route, status}`
//! - `http_request_duration_seconds{method, route}`

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::extract::{FromRequestParts, MatchedPath};
use http::{request::Parts, HeaderMap, HeaderName, HeaderValue, Method, Request, Response};
use pin_project_lite::pin_project;
use tower::{Layer, Service};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info_span, Span};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const UNMATCHED_ROUTE: &str = "unmatched";

/// Correlation ID attached to logs and problem responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// A fresh UUID v7, so IDs sort by arrival time.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Resolves to the ID [`MetricsLayer`] assigned. Without the layer the header
/// is read directly.
impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<RequestId>() {
            Some(id) => Ok(id.clone()),
            None => Ok(extract_or_generate_request_id(&parts.headers)),
        }
    }
}

/// Blank or non-UTF-8 header values are replaced with a generated ID.
pub fn extract_or_generate_request_id(headers: &HeaderMap) -> RequestId {
    match headers.get(REQUEST_ID_HEADER).map(HeaderValue::to_str) {
        Some(Ok(id)) if !id.trim().is_empty() => RequestId::from(id.trim()),
        _ => RequestId::generate(),
    }
}

/// The browser frontend calls from another origin without credentials.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

/// Labels and start time of one in-flight request.
#[derive(Debug)]
struct RequestRecord {
    started: Instant,
    method: String,
    route: String,
}

impl RequestRecord {
    fn start<B>(req: &Request<B>) -> Self {
        let route = req
            .extensions()
            .get::<MatchedPath>()
            .map_or(UNMATCHED_ROUTE, MatchedPath::as_str);
        Self {
            started: Instant::now(),
            method: req.method().as_str().to_string(),
            route: route.to_string(),
        }
    }

    /// Record the outcome. `None` means the inner service failed.
    fn finish(&self, status: Option<u16>) {
        let elapsed = self.started.elapsed().as_secs_f64();
        let class = status.map_or("5xx", status_class);

        metrics::histogram!(
            "http_request_duration_seconds",
            "method" => self.method.clone(),
            "route" => self.route.clone()
        )
        .record(elapsed);
        metrics::counter!(
            "http_requests_total",
            "method" => self.method.clone(),
            "route" => self.route.clone(),
            "status" => class
        )
        .increment(1);

        let latency_ms = elapsed * 1000.0;
        match status {
            Some(status) => tracing::info!(status, latency_ms, "request completed"),
            None => tracing::error!(latency_ms, "request failed"),
        }
    }
}

fn status_class(status: u16) -> &'static str {
    match status / 100 {
        1 => "1xx",
        2 => "2xx",
        3 => "3xx",
        4 => "4xx",
        _ => "5xx",
    }
}

/// Tower layer adding request IDs, spans and HTTP metrics.
#[derive(Debug, Clone, Copy)]
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for MetricsService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = TrackedResponse<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let record = RequestRecord::start(&req);
        let request_id = extract_or_generate_request_id(req.headers());
        req.extensions_mut().insert(request_id.clone());

        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %record.method,
            route = %record.route,
        );
        let inner = {
            let _enter = span.enter();
            self.inner.call(req)
        };

        TrackedResponse {
            inner,
            record,
            request_id,
            span,
        }
    }
}

pin_project! {
    /// Response future that echoes the request ID and records metrics.
    pub struct TrackedResponse<F> {
        #[pin]
        inner: F,
        record: RequestRecord,
        request_id: RequestId,
        span: Span,
    }
}

impl<F, ResBody, E> Future for TrackedResponse<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let _enter = this.span.enter();

        let mut result = match this.inner.poll(cx) {
            Poll::Ready(result) => result,
            Poll::Pending => return Poll::Pending,
        };

        match &mut result {
            Ok(response) => {
                if let Ok(value) = HeaderValue::from_str(this.request_id.as_str()) {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }
                this.record.finish(Some(response.status().as_u16()));
            }
            Err(_) => this.record.finish(None),
        }

        Poll::Ready(result)
    }
}
