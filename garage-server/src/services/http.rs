use std::time::Duration;

use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

pub type OneshotResult =
    Result<http::Response<axum::body::Body>, Box<dyn std::error::Error + Send + Sync>>;

/// Request ids are snowflake ids, same generator as row ids
#[derive(Clone, Copy, Default)]
struct MakeSnowflakeId;

impl MakeRequestId for MakeSnowflakeId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        http::HeaderValue::from_str(&shared::util::snowflake_id().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// HTTP access log middleware
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let started = std::time::Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        target: "http_access",
        request_id = %request_id,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "{} {} {}",
        method,
        uri,
        response.status()
    );

    response
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        // CRM
        .merge(crate::api::customers::router())
        .merge(crate::api::technicians::router())
        .merge(crate::api::inquiries::router())
        // Workshop
        .merge(crate::api::jobs::router())
        .merge(crate::api::inventory::router())
        .merge(crate::api::appointments::router())
        // Billing
        .merge(crate::api::invoices::router())
        // Messaging
        .merge(crate::api::templates::router())
        .merge(crate::api::notifications::router())
        // Reporting
        .merge(crate::api::dashboard::router())
}

/// Router with state and the full middleware stack
pub fn build_router(state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);
    build_app()
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeSnowflakeId))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
}

/// Drive a single request through the router, without a listener
pub async fn oneshot(router: Router, request: http::Request<axum::body::Body>) -> OneshotResult {
    use tower::ServiceExt;
    let response = router.oneshot(request).await?;
    Ok(response)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Router fixtures for API tests

    use axum::Router;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use serde_json::Value;

    use crate::core::{Config, ServerState};
    use crate::db::DbService;

    pub async fn test_router() -> Router {
        let db = DbService::in_memory().await.unwrap();
        super::build_router(ServerState::new(Config::in_memory(), db.pool))
    }

    /// Send a request; returns the status and the JSON body (`Null` when empty)
    pub async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (http::StatusCode, Value) {
        let mut builder = http::Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(http::header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = super::oneshot(router.clone(), builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{send, test_router};
    use http::StatusCode;

    #[tokio::test]
    async fn responses_carry_request_id() {
        let router = test_router().await;
        let request = http::Request::builder()
            .uri("/health")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = super::oneshot(router, request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let router = test_router().await;
        let (status, _) = send(&router, "GET", "/api/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
