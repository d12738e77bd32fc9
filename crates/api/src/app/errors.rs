use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use ridegate_auth::AuthError;
use ridegate_infra::AppEnv;

use crate::app::dto::Envelope;

/// Render an [`AuthError`] as the JSON envelope.
///
/// This is the only place auth failures become HTTP. Internal detail is
/// attached as `stack` for 500s in development and dropped everywhere else.
pub fn auth_error_response(err: &AuthError, env: AppEnv) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut body = Envelope::failure(err.code(), err.message());
    if let Some(violations) = err.violations() {
        body = body.with_errors(violations.to_vec());
    }
    if status == StatusCode::INTERNAL_SERVER_ERROR && env.is_development() {
        body = body.with_stack(format!("{err:?}"));
    }

    (status, Json(body)).into_response()
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (status, Json(Envelope::failure(code, message))).into_response()
}
