//! JSON bodies exchanged with clients.

use model::{Direction, DogId, Map, Move, Token, Vector2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "mapId")]
    pub map_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    #[serde(rename = "move")]
    pub movement: Move,
}

/// Manual clock advance, in milliseconds.
#[derive(Debug, Deserialize)]
pub struct TickRequest {
    #[serde(rename = "timeDelta")]
    pub time_delta: u64,
}

#[derive(Debug, Serialize)]
pub struct JoinResponse<'a> {
    #[serde(rename = "authToken")]
    pub auth_token: &'a Token,
    #[serde(rename = "playerId")]
    pub player_id: DogId,
}

#[derive(Debug, Serialize)]
pub struct MapSummary<'a> {
    pub id: &'a str,
    pub name: &'a str,
}

impl<'a> From<&'a Map> for MapSummary<'a> {
    fn from(map: &'a Map) -> Self {
        Self {
            id: map.id().as_str(),
            name: map.name(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlayerName<'a> {
    pub name: &'a str,
}

/// `{"<id>": {"name": ...}}`, keyed in ascending id order.
pub type PlayersResponse<'a> = BTreeMap<DogId, PlayerName<'a>>;

#[derive(Debug, Serialize)]
pub struct DogState {
    pub pos: Vector2,
    pub speed: Vector2,
    pub dir: Direction,
}

#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub players: BTreeMap<DogId, DogState>,
}

/// Body of every non-2xx API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
