use super::{errors, game, maps, ApiRequest, ApiResponse};
use crate::SharedGame;
use model::MapCatalog;

const MAPS_PATH: &str = "/api/v1/maps";
const MAP_PREFIX: &str = "/api/v1/maps/";
const JOIN_PATH: &str = "/api/v1/game/join";
const PLAYERS_PATH: &str = "/api/v1/game/players";
const STATE_PATH: &str = "/api/v1/game/state";
const ACTION_PATH: &str = "/api/v1/game/player/action";
const TICK_PATH: &str = "/api/v1/game/tick";
const API_PREFIX: &str = "/api/";

/// API endpoints in dispatch order.
///
/// Every `/api/` path not claimed by an earlier endpoint lands on
/// [`Endpoint::Fallthrough`], so no API path ever reaches static file serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ListMaps,
    GetMap,
    Join,
    Players,
    State,
    Action,
    Tick,
    Fallthrough,
}

impl Endpoint {
    pub const ALL: [Endpoint; 8] = [
        Endpoint::ListMaps,
        Endpoint::GetMap,
        Endpoint::Join,
        Endpoint::Players,
        Endpoint::State,
        Endpoint::Action,
        Endpoint::Tick,
        Endpoint::Fallthrough,
    ];

    pub fn matches(self, path: &str) -> bool {
        match self {
            Endpoint::ListMaps => path == MAPS_PATH,
            Endpoint::GetMap => path.len() > MAP_PREFIX.len() && path.starts_with(MAP_PREFIX),
            Endpoint::Join => path == JOIN_PATH,
            Endpoint::Players => path == PLAYERS_PATH,
            Endpoint::State => path == STATE_PATH,
            Endpoint::Action => path == ACTION_PATH,
            Endpoint::Tick => path == TICK_PATH,
            Endpoint::Fallthrough => path.starts_with(API_PREFIX),
        }
    }

    /// First endpoint claiming `path`, or `None` for non-API targets.
    pub fn resolve(path: &str) -> Option<Endpoint> {
        Self::ALL.into_iter().find(|endpoint| endpoint.matches(path))
    }
}

/// Everything the endpoints need to answer a request.
#[derive(Clone)]
pub struct ApiContext {
    /// Read-only copy of the loaded maps, served without taking the game lock.
    pub maps: MapCatalog,
    pub game: SharedGame,
    /// Set when a background ticker drives the clock; disables the tick endpoint.
    pub auto_tick: bool,
}

impl ApiContext {
    pub fn new(maps: MapCatalog, game: SharedGame, auto_tick: bool) -> Self {
        Self {
            maps,
            game,
            auto_tick,
        }
    }
}

pub struct ApiRouter {
    context: ApiContext,
}

impl ApiRouter {
    pub fn new(context: ApiContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &ApiContext {
        &self.context
    }

    /// Answers an API request. Returns `None` when the target is not an API
    /// path and should be served as a static file instead.
    pub async fn dispatch(&self, request: &ApiRequest) -> Option<ApiResponse> {
        let path = request.path();
        let endpoint = Endpoint::resolve(path)?;
        let context = &self.context;

        let response = match endpoint {
            Endpoint::ListMaps => maps::list(context, request),
            Endpoint::GetMap => maps::get(context, request, &path[MAP_PREFIX.len()..]),
            Endpoint::Join => game::join(context, request).await,
            Endpoint::Players => game::players(context, request).await,
            Endpoint::State => game::state(context, request).await,
            Endpoint::Action => game::action(context, request).await,
            Endpoint::Tick => game::tick(context, request).await,
            Endpoint::Fallthrough => errors::bad_request(),
        };
        Some(response)
    }
}
