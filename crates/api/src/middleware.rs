use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use tracing::info;

use ridegate_auth::{AuthError, Role};

use crate::app::cookies::session_token;
use crate::app::errors::auth_error_response;
use crate::app::services::AuthServices;
use crate::context::{ActorContext, RoleContext};

pub const ROLE_HEADER: &str = "x-auth-role";

/// Logs one line per request with method, path, status and latency.
pub async fn trace_requests(req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let res = next.run(req).await;

    info!(
        %method,
        path = %path,
        status = res.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );
    res
}

/// Role Resolver: reads `X-Auth-Role` and attaches a [`RoleContext`].
pub async fn role_middleware(
    State(services): State<Arc<AuthServices>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let role = resolve_role(req.headers()).map_err(|err| auth_error_response(&err, services.env()))?;

    req.extensions_mut().insert(RoleContext::new(role));
    Ok(next.run(req).await)
}

/// Protected-resource gate. Must run inside [`role_middleware`].
pub async fn auth_middleware(
    State(services): State<Arc<AuthServices>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let reject = |err: AuthError| auth_error_response(&err, services.env());

    let role = req
        .extensions()
        .get::<RoleContext>()
        .map(RoleContext::role)
        .ok_or_else(|| reject(AuthError::RoleMissing))?;

    let token = extract_token(req.headers());
    let actor = services
        .authenticate(role, token.as_deref())
        .await
        .map_err(reject)?;

    req.extensions_mut().insert(ActorContext::new(actor));
    Ok(next.run(req).await)
}

fn resolve_role(headers: &HeaderMap) -> Result<Role, AuthError> {
    let raw = match headers.get(ROLE_HEADER) {
        None => None,
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| AuthError::RoleInvalid(String::from_utf8_lossy(value.as_bytes()).into_owned()))?,
        ),
    };
    Ok(Role::resolve(raw)?)
}

/// Session token from the `token` cookie, else from `Authorization: Bearer`.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    session_token(headers).or_else(|| extract_bearer(headers).map(str::to_owned))
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
