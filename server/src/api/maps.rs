//! Read-only map endpoints. Served from the catalog copy, never the game lock.

use super::payload::MapSummary;
use super::{errors, ApiContext, ApiRequest, ApiResponse};
use axum::http::StatusCode;
use model::Map;

/// `GET /api/v1/maps`: `[{id, name}]` in load order.
pub fn list(context: &ApiContext, request: &ApiRequest) -> ApiResponse {
    if !request.is_get_or_head() {
        return errors::get_or_head_only();
    }

    let summaries: Vec<MapSummary<'_>> = context
        .maps
        .iter()
        .map(|map| MapSummary::from(&**map))
        .collect();
    ApiResponse::json(StatusCode::OK, &summaries).no_cache()
}

/// `GET /api/v1/maps/{id}`: the full map definition.
pub fn get(context: &ApiContext, request: &ApiRequest, id: &str) -> ApiResponse {
    if !request.is_get_or_head() {
        return errors::get_or_head_only();
    }

    match context.maps.get(id) {
        Some(map) => ApiResponse::json::<Map>(StatusCode::OK, map).no_cache(),
        None => errors::map_not_found(),
    }
}
