//! Success envelope shared by every product endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub const FETCHED: &str = "Data fetched successfully";
pub const CREATED: &str = "Product created successfully";
pub const UPDATED: &str = "Product updated successfully";
pub const DELETED: &str = "Product deleted successfully";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessEnvelope<T> {
    pub message: String,
    pub status_code: u16,
    pub data: Option<T>,
}

pub fn ok<T: Serialize>(data: T) -> Response {
    respond(StatusCode::OK, FETCHED, Some(data))
}

pub fn created<T: Serialize>(data: T) -> Response {
    respond(StatusCode::CREATED, CREATED, Some(data))
}

pub fn accepted<T: Serialize>(message: &str, data: Option<T>) -> Response {
    respond(StatusCode::ACCEPTED, message, data)
}

/// The HTTP status always equals `statusCode` in the body.
pub fn respond<T: Serialize>(status: StatusCode, message: &str, data: Option<T>) -> Response {
    (
        status,
        Json(SuccessEnvelope {
            message: message.to_string(),
            status_code: status.as_u16(),
            data,
        }),
    )
        .into_response()
}
