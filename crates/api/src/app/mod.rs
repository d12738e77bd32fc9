//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the auth orchestrator and its collaborators
//! - `routes/`: HTTP handlers
//! - `dto.rs`: the response envelope
//! - `cookies.rs`: session cookie encoding and parsing
//! - `errors.rs`: the single mapping from `AuthError` to HTTP

use std::sync::Arc;

use axum::{middleware::{from_fn, from_fn_with_state}, routing::get, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod cookies;
pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AuthServices, Session};

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: Arc<AuthServices>) -> Router {
    // Gate: role resolver runs first (outer layer), then token checks.
    let protected = Router::new()
        .route("/profile", get(routes::profile::profile))
        .route_layer(from_fn_with_state(services.clone(), middleware::auth_middleware));

    let api = Router::new()
        .nest("/auth", routes::auth::router())
        .merge(protected)
        .route_layer(from_fn_with_state(services.clone(), middleware::role_middleware));

    Router::new()
        .route("/", get(routes::system::home))
        .route("/health", get(routes::system::health))
        .nest("/api", api)
        .fallback(routes::system::not_found)
        .layer(ServiceBuilder::new().layer(from_fn(middleware::trace_requests)))
        .with_state(services)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use ridegate_auth::TokenSecret;
    use ridegate_infra::AppConfig;

    fn app() -> Router {
        let mut config = AppConfig::with_secret(TokenSecret::new("router-secret").unwrap());
        config.bcrypt_cost = 4;
        let (services, _ledger) = AuthServices::in_memory(&config).unwrap();
        build_app(Arc::new(services))
    }

    async fn send(req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = app().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn health_needs_no_role() {
        let (status, _) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn home_returns_welcome_envelope() {
        let (status, body) = send(Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn unknown_route_is_enveloped_404() {
        let (status, body) = send(Request::get("/nope").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Route not found");
    }

    #[tokio::test]
    async fn unknown_api_route_is_404_not_role_error() {
        let (status, _) = send(Request::get("/api/nope").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_role_is_rejected_before_the_gate() {
        let req = Request::get("/api/profile")
            .header("x-auth-role", "driver")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "role_invalid");
        assert_eq!(body["message"], "Role is invalid; it can only be a user or captain");
    }

    #[tokio::test]
    async fn gate_without_token_is_unauthorized() {
        let req = Request::get("/api/profile")
            .header("x-auth-role", "user")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(req).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "no_token");
    }
}
