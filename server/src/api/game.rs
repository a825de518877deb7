//! Endpoints that read or change the running game.
//!
//! Each handler validates the request (method, credentials, body) before it
//! touches the shared game, then holds the lock only for the model call.

use super::payload::{
    ActionRequest, DogState, JoinRequest, JoinResponse, PlayerName, PlayersResponse,
    StateResponse, TickRequest,
};
use super::{errors, ApiContext, ApiRequest, ApiResponse};
use axum::http::{header, Method, StatusCode};
use log::debug;
use model::{Game, GameError, Player};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;

const BEARER_PREFIX: &str = "Bearer ";

/// Token carried by an `Authorization: Bearer <token>` header. Padding or
/// inner whitespace makes the header malformed.
fn bearer_token(request: &ApiRequest) -> Option<&str> {
    let token = request
        .header(&header::AUTHORIZATION)?
        .strip_prefix(BEARER_PREFIX)?;
    let malformed = token.is_empty() || token.contains(|c: char| c.is_ascii_whitespace());
    (!malformed).then_some(token)
}

/// Whether the request declares a JSON body. Media type parameters are ignored.
fn is_json(request: &ApiRequest) -> bool {
    request
        .header(&header::CONTENT_TYPE)
        .and_then(|value| value.split(';').next())
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case("application/json"))
}

fn parse_body<T: DeserializeOwned>(request: &ApiRequest, message: &str) -> Result<T, ApiResponse> {
    serde_json::from_slice(&request.body).map_err(|err| {
        debug!("Rejected body for {}: {}", request.path(), err);
        errors::invalid_argument(message)
    })
}

fn empty_ok() -> ApiResponse {
    ApiResponse::json(StatusCode::OK, &json!({})).no_cache()
}

/// Looks up the player behind the request's bearer token.
fn authorize<'a>(game: &'a Game, token: &str) -> Result<&'a Player, ApiResponse> {
    game.player_by_token(token).ok_or_else(errors::unknown_token)
}

/// `POST /api/v1/game/join`
pub async fn join(context: &ApiContext, request: &ApiRequest) -> ApiResponse {
    if request.method != Method::POST {
        return errors::post_only();
    }
    let body: JoinRequest = match parse_body(request, "Join game request parse error") {
        Ok(body) => body,
        Err(response) => return response,
    };

    let mut game = context.game.write().await;
    match game.join(&body.map_id, &body.user_name) {
        Ok((player, token)) => {
            let response = JoinResponse {
                auth_token: &token,
                player_id: player.id(),
            };
            ApiResponse::json(StatusCode::OK, &response).no_cache()
        }
        Err(GameError::EmptyUsername) => errors::invalid_argument("Invalid name"),
        Err(GameError::UnknownMap(_)) => errors::map_not_found(),
        Err(err) => errors::invalid_argument(&err.to_string()),
    }
}

/// `GET /api/v1/game/players`: names of everyone on the caller's map.
pub async fn players(context: &ApiContext, request: &ApiRequest) -> ApiResponse {
    if !request.is_get_or_head() {
        return errors::get_or_head_only();
    }
    let Some(token) = bearer_token(request) else {
        return errors::missing_token();
    };

    let game = context.game.read().await;
    let player = match authorize(&game, token) {
        Ok(player) => player,
        Err(response) => return response,
    };

    let players: PlayersResponse<'_> = game
        .session(player.map_id().as_str())
        .into_iter()
        .flat_map(|session| session.dogs())
        .map(|dog| (dog.id(), PlayerName { name: dog.name() }))
        .collect();
    ApiResponse::json(StatusCode::OK, &players).no_cache()
}

/// `GET /api/v1/game/state`: position, velocity and facing of every dog on
/// the caller's map.
pub async fn state(context: &ApiContext, request: &ApiRequest) -> ApiResponse {
    if !request.is_get_or_head() {
        return errors::get_or_head_only();
    }
    let Some(token) = bearer_token(request) else {
        return errors::missing_token();
    };

    let game = context.game.read().await;
    let player = match authorize(&game, token) {
        Ok(player) => player,
        Err(response) => return response,
    };

    let players: BTreeMap<_, _> = game
        .session(player.map_id().as_str())
        .into_iter()
        .flat_map(|session| session.dogs())
        .map(|dog| {
            let state = DogState {
                pos: dog.position(),
                speed: dog.velocity(),
                dir: dog.direction(),
            };
            (dog.id(), state)
        })
        .collect();
    ApiResponse::json(StatusCode::OK, &StateResponse { players }).no_cache()
}

/// `POST /api/v1/game/player/action`: turns or stops the caller's dog.
///
/// GET and HEAD are accepted as well.
pub async fn action(context: &ApiContext, request: &ApiRequest) -> ApiResponse {
    if request.method != Method::POST && !request.is_get_or_head() {
        return errors::post_get_or_head_only();
    }
    let Some(token) = bearer_token(request) else {
        return errors::missing_token();
    };
    if !is_json(request) {
        return errors::invalid_argument("Invalid content type");
    }
    let body: ActionRequest = match parse_body(request, "Failed to parse action") {
        Ok(body) => body,
        Err(response) => return response,
    };

    let mut game = context.game.write().await;
    let player = match authorize(&game, token) {
        Ok(player) => player.clone(),
        Err(response) => return response,
    };
    game.set_velocity(&player, body.movement.direction());
    empty_ok()
}

/// `POST /api/v1/game/tick`: advances the clock by hand. Only available when
/// no background ticker is running.
pub async fn tick(context: &ApiContext, request: &ApiRequest) -> ApiResponse {
    if request.method != Method::POST {
        return errors::post_only();
    }
    if context.auto_tick {
        return errors::bad_request();
    }
    let body: TickRequest = match parse_body(request, "Failed to parse tick request") {
        Ok(body) => body,
        Err(response) => return response,
    };

    context
        .game
        .write()
        .await
        .tick(Duration::from_millis(body.time_delta));
    empty_ok()
}
