//! Canned error responses. Every one carries `Cache-Control: no-cache`.

use super::payload::ErrorBody;
use super::ApiResponse;
use axum::http::StatusCode;

pub const ALLOW_POST: &str = "POST";
pub const ALLOW_GET_HEAD: &str = "GET, HEAD";
pub const ALLOW_POST_GET_HEAD: &str = "POST, GET, HEAD";

pub fn error(status: StatusCode, code: &str, message: &str) -> ApiResponse {
    let body = ErrorBody {
        code: code.to_string(),
        message: message.to_string(),
    };
    ApiResponse::json(status, &body).no_cache()
}

pub fn bad_request() -> ApiResponse {
    error(StatusCode::BAD_REQUEST, "badRequest", "Invalid endpoint")
}

pub fn invalid_argument(message: &str) -> ApiResponse {
    error(StatusCode::BAD_REQUEST, "invalidArgument", message)
}

pub fn map_not_found() -> ApiResponse {
    error(StatusCode::NOT_FOUND, "mapNotFound", "Map not found")
}

pub fn missing_token() -> ApiResponse {
    error(
        StatusCode::UNAUTHORIZED,
        "invalidToken",
        "Authorization header is missing",
    )
}

pub fn unknown_token() -> ApiResponse {
    error(
        StatusCode::UNAUTHORIZED,
        "invalidToken",
        "Player token has not been found",
    )
}

pub fn post_only() -> ApiResponse {
    error(
        StatusCode::METHOD_NOT_ALLOWED,
        "invalidMethod",
        "Only POST method is expected",
    )
    .allow(ALLOW_POST)
}

pub fn get_or_head_only() -> ApiResponse {
    error(
        StatusCode::METHOD_NOT_ALLOWED,
        "invalidMethod",
        "Only GET and HEAD methods are expected",
    )
    .allow(ALLOW_GET_HEAD)
}

pub fn post_get_or_head_only() -> ApiResponse {
    error(
        StatusCode::METHOD_NOT_ALLOWED,
        "invalidMethod",
        "Only POST, GET and HEAD methods are expected",
    )
    .allow(ALLOW_POST_GET_HEAD)
}
