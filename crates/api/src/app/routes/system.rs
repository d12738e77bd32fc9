use axum::{http::StatusCode, response::Response, Json};

use crate::app::dto::Envelope;
use crate::app::errors::json_error;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn home() -> Json<Envelope> {
    Json(Envelope::ok("The server is working!"))
}

pub async fn not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "not_found", "Route not found")
}
