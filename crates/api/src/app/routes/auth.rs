use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::Value;

use ridegate_auth::{AuthError, FieldViolation};

use crate::app::cookies::{clear_session_cookie, session_cookie};
use crate::app::dto::Envelope;
use crate::app::errors::auth_error_response;
use crate::app::services::{AuthServices, Session};
use crate::context::RoleContext;
use crate::middleware::extract_token;

pub fn router() -> Router<Arc<AuthServices>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout).get(logout))
}

pub async fn register(
    State(services): State<Arc<AuthServices>>,
    Extension(ctx): Extension<RoleContext>,
    jar: CookieJar,
    body: Bytes,
) -> Result<Response, Response> {
    let role = ctx.role();
    let reject = |err: AuthError| auth_error_response(&err, services.env());

    let payload = parse_json(&body).map_err(reject)?;
    let session = services.register(role, &payload).await.map_err(reject)?;

    Ok(session_response(
        &services,
        jar,
        StatusCode::CREATED,
        format!("{} registered successfully", role.label()),
        session,
    ))
}

pub async fn login(
    State(services): State<Arc<AuthServices>>,
    Extension(ctx): Extension<RoleContext>,
    jar: CookieJar,
    body: Bytes,
) -> Result<Response, Response> {
    let role = ctx.role();
    let reject = |err: AuthError| auth_error_response(&err, services.env());

    let payload = parse_json(&body).map_err(reject)?;
    let session = services.login(role, &payload).await.map_err(reject)?;

    Ok(session_response(
        &services,
        jar,
        StatusCode::OK,
        format!("{} logged in successfully", role.label()),
        session,
    ))
}

/// The session cookie is cleared on every outcome, including a 401 for a
/// missing token.
pub async fn logout(
    State(services): State<Arc<AuthServices>>,
    Extension(ctx): Extension<RoleContext>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Response {
    let jar = jar.add(clear_session_cookie(services.env().is_production()));

    match services.logout(ctx.role(), extract_token(&headers).as_deref()) {
        Ok(()) => (StatusCode::OK, jar, Json(Envelope::ok("Logged out successfully"))).into_response(),
        Err(err) => (jar, auth_error_response(&err, services.env())).into_response(),
    }
}

/// Empty bodies are treated as `{}` so that every missing field is reported.
fn parse_json(body: &Bytes) -> Result<Value, AuthError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body)
        .map_err(|err| AuthError::ValidationFailed(vec![FieldViolation::new("body", err.to_string())]))
}

fn session_response(
    services: &AuthServices,
    jar: CookieJar,
    status: StatusCode,
    message: String,
    session: Session,
) -> Response {
    let jar = jar.add(session_cookie(
        session.token.token.clone(),
        session.token.ttl,
        services.env().is_production(),
    ));

    let body = Envelope::ok(message)
        .with_token(session.token.token)
        .with_actor(session.actor);

    (status, jar, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_an_empty_object() {
        assert_eq!(parse_json(&Bytes::from_static(b"  ")).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn malformed_body_names_the_body_field() {
        let err = parse_json(&Bytes::from_static(b"{\"email\":")).unwrap_err();
        let fields: Vec<_> = err.violations().unwrap().iter().map(|v| v.field.to_string()).collect();
        assert_eq!(fields, vec!["body"]);
    }
}
