//! Forwarding `/proxy/{path}` to the downstream service

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::{Path, RawQuery, State};
use axum::response::Response;
use axum::routing::{any, get};
use bytes::Bytes;
use faultkit::{ApiError, ExceptionHandlingConfig, Failure, FailureBoundary};
use faultkit_http::{HttpService, RequestBody};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, Method, Request};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::util::BoxCloneSyncService;
use tower::{BoxError, ServiceBuilder};
use tower_http::trace::TraceLayer;

/// Downstream HTTP client, type-erased so tests can stub it.
pub type Downstream = BoxCloneSyncService<Request<RequestBody>, Response<Body>, BoxError>;

#[derive(Clone)]
pub struct AppState {
    downstream: HttpService<Downstream>,
    base_url: Arc<str>,
}

impl AppState {
    #[must_use]
    pub fn new(downstream: HttpService<Downstream>, base_url: &str) -> Self {
        Self {
            downstream,
            base_url: base_url.trim_end_matches('/').into(),
        }
    }
}

/// hyper client with a per-call timeout; an elapsed timeout is a cancellation.
#[must_use]
pub fn http_client(timeout: Duration) -> Downstream {
    let client = Client::builder(TokioExecutor::new()).build_http::<RequestBody>();
    let svc = ServiceBuilder::new()
        .timeout(timeout)
        .map_response(|resp: Response<Incoming>| resp.map(Body::new))
        .service(client);
    BoxCloneSyncService::new(svc)
}

#[must_use]
pub fn router(state: AppState, config: &ExceptionHandlingConfig) -> Router {
    let routes = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/proxy/{*path}", any(forward))
        .with_state(state)
        .layer(TraceLayer::new_for_http());
    FailureBoundary::from_config(config).install(routes)
}

async fn forward(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let uri = match query {
        Some(q) => format!("{}/{path}?{q}", state.base_url),
        None => format!("{}/{path}", state.base_url),
    };

    let mut builder = Request::builder().method(method).uri(uri);
    for name in [ACCEPT, CONTENT_TYPE] {
        if let Some(value) = headers.get(&name) {
            builder = builder.header(name, value);
        }
    }
    let request = builder.body(Full::new(body)).map_err(Failure::from_error)?;

    Ok(state.downstream.send(request).await?)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use faultkit::problem::texts;
    use faultkit_http::ConverterChain;
    use http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;
    use tracing_test::traced_test;

    fn stub<F>(reply: F) -> AppState
    where
        F: Fn(Request<RequestBody>) -> Result<Response<Body>, BoxError> + Clone + Send + Sync + 'static,
    {
        let svc = tower::service_fn(move |req: Request<RequestBody>| {
            let reply = reply.clone();
            async move { reply(req) }
        });
        let downstream = HttpService::new(BoxCloneSyncService::new(svc), ConverterChain::default());
        AppState::new(downstream, "http://users.internal/")
    }

    async fn call(state: AppState, uri: &str) -> (StatusCode, Bytes) {
        let resp = router(state, &ExceptionHandlingConfig::default())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.into_body().collect().await.unwrap().to_bytes())
    }

    #[tokio::test]
    async fn success_is_relayed() {
        let state = stub(|req| {
            assert_eq!(req.uri(), "http://users.internal/users/1?expand=roles");
            Ok(Response::new(Body::from(r#"{"name":"Ada"}"#)))
        });
        let (status, body) = call(state, "/proxy/users/1?expand=roles").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], br#"{"name":"Ada"}"#);
    }

    #[tokio::test]
    #[traced_test]
    async fn downstream_problem_is_normalized() {
        let state = stub(|_req| {
            Ok(http::Response::builder()
                .status(503)
                .body(Body::from(r#"{"title":"Down for maintenance","status":503}"#))
                .unwrap())
        });
        let (status, body) = call(state, "/proxy/users/1").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["title"], "Down for maintenance");
        assert_eq!(body["status"], 503);
        assert!(logs_contain("Related service returned a problem"));
    }

    #[tokio::test]
    async fn unreachable_downstream_is_bad_gateway() {
        let state = stub(|_req| Err("connection refused".into()));
        let (status, body) = call(state, "/proxy/users/1").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["title"], texts::RELATED_SERVICE);
        assert_eq!(body["status"], 502);
    }

    #[tokio::test]
    async fn health_is_served_locally() {
        let state = stub(|_req| unreachable!("health must not hit downstream"));
        let (status, body) = call(state, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"ok");
    }
}
