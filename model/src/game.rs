use crate::error::GameError;
use crate::geometry::{Coord, Map, MapCatalog, MapId, Orientation, Point};
use crate::session::{Direction, Dog, DogId, GameSession, Player, Vector2};
use crate::token::{issue_token, Token};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use std::collections::HashMap;
use std::time::Duration;

/// Speed used by maps that do not declare their own, in map units per second.
pub const DEFAULT_DOG_SPEED: f64 = 1.0;

/// How far a dog may stray past a road's centre line or end point.
pub const ROAD_HALF_WIDTH: f64 = 0.4;

/// Randomness source for spawn points and tokens.
pub type GameRng = Box<dyn RngCore + Send + Sync>;

/// Owns every map, session, player and token.
///
/// All mutation goes through `&mut self`; the server keeps the registry
/// behind a single lock so joins, moves and ticks never interleave.
pub struct Game {
    maps: MapCatalog,
    sessions: HashMap<MapId, GameSession>,
    tokens: HashMap<Token, Player>,
    default_dog_speed: f64,
    randomize_spawn_points: bool,
    next_dog_id: DogId,
    rng: GameRng,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates an empty registry seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates an empty registry drawing spawn points and tokens from `rng`.
    pub fn with_rng(rng: impl RngCore + Send + Sync + 'static) -> Self {
        Self {
            maps: MapCatalog::new(),
            sessions: HashMap::new(),
            tokens: HashMap::new(),
            default_dog_speed: DEFAULT_DOG_SPEED,
            randomize_spawn_points: false,
            next_dog_id: DogId::new(0),
            rng: Box::new(rng),
        }
    }

    pub fn default_dog_speed(&self) -> f64 {
        self.default_dog_speed
    }

    pub fn set_default_dog_speed(&mut self, speed: f64) {
        self.default_dog_speed = speed;
    }

    pub fn randomize_spawn_points(&self) -> bool {
        self.randomize_spawn_points
    }

    pub fn set_randomize_spawn_points(&mut self, randomize: bool) {
        self.randomize_spawn_points = randomize;
    }

    /// Id handed to the next dog. Ids only ever grow from here.
    pub fn next_dog_id(&self) -> DogId {
        self.next_dog_id
    }

    pub fn set_next_dog_id(&mut self, id: DogId) {
        self.next_dog_id = id;
    }

    pub fn add_map(&mut self, map: Map) -> Result<(), GameError> {
        let id = map.id().clone();
        self.maps.add(map)?;
        info!("Loaded map {}", id);
        Ok(())
    }

    pub fn maps(&self) -> &MapCatalog {
        &self.maps
    }

    pub fn map(&self, id: &str) -> Option<&Map> {
        self.maps.get(id).map(|map| map.as_ref())
    }

    /// Speed of dogs on `map`, falling back to the game default.
    pub fn dog_speed(&self, map: &Map) -> f64 {
        map.dog_speed().unwrap_or(self.default_dog_speed)
    }

    pub fn session(&self, map_id: &str) -> Option<&GameSession> {
        self.sessions.get(map_id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn player_count(&self) -> usize {
        self.tokens.len()
    }

    /// Spawns a dog for `user_name` on `map_id` and issues the token that
    /// controls it. The map's session is created on first join.
    pub fn join(&mut self, map_id: &str, user_name: &str) -> Result<(Player, Token), GameError> {
        if user_name.is_empty() {
            return Err(GameError::EmptyUsername);
        }
        let map = self
            .maps
            .get(map_id)
            .ok_or_else(|| GameError::UnknownMap(MapId::from(map_id)))?;

        let position = spawn_point(map, self.randomize_spawn_points, self.rng.as_mut());
        let id = self.next_dog_id;
        self.next_dog_id = id.next();

        let session = self
            .sessions
            .entry(map.id().clone())
            .or_insert_with(|| GameSession::new(map.id().clone()));
        session.add_dog(Dog::new(id, user_name, position));

        let player = Player::new(id, map.id().clone());
        let token = issue_token(self.rng.as_mut());
        self.tokens.insert(token.clone(), player.clone());

        info!(
            "Player {} ({}) joined map {} at ({:.2}, {:.2})",
            id,
            user_name,
            map.id(),
            position.x,
            position.y
        );
        Ok((player, token))
    }

    pub fn player_by_token(&self, token: &str) -> Option<&Player> {
        self.tokens.get(token)
    }

    pub fn dog(&self, player: &Player) -> Option<&Dog> {
        self.sessions.get(player.map_id())?.dog(player.id())
    }

    /// Points the player's dog in `direction` at the map's speed, or stops it
    /// for `None`. Stopping keeps the dog's current facing.
    pub fn set_velocity(&mut self, player: &Player, direction: Option<Direction>) {
        let speed = match self.maps.get(player.map_id().as_str()) {
            Some(map) => self.dog_speed(map),
            None => return,
        };
        let Some(dog) = self
            .sessions
            .get_mut(player.map_id().as_str())
            .and_then(|session| session.dog_mut(player.id()))
        else {
            return;
        };

        match direction {
            Some(direction) => {
                dog.set_velocity(direction.velocity(speed));
                dog.set_direction(direction);
            }
            None => dog.set_velocity(Vector2::ZERO),
        }
    }

    /// Players on `map_id` in ascending id order.
    pub fn players(&self, map_id: &str) -> Vec<Player> {
        self.sessions
            .get(map_id)
            .map(|session| {
                session
                    .dogs()
                    .map(|dog| Player::new(dog.id(), session.map_id().clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Advances every moving dog by `elapsed`, keeping it on its road.
    pub fn tick(&mut self, elapsed: Duration) {
        let seconds = elapsed.as_secs_f64();
        let mut moved = 0;

        for session in self.sessions.values_mut() {
            let Some(map) = self.maps.get(session.map_id().as_str()) else {
                continue;
            };
            for dog in session.dogs_mut() {
                if advance(dog, map, seconds) {
                    moved += 1;
                }
            }
        }

        debug!("Tick of {}ms moved {} dogs", elapsed.as_millis(), moved);
    }
}

/// Road start of the first road, or a uniformly random point on a uniformly
/// random road when `randomize` is set.
fn spawn_point<R: Rng + ?Sized>(map: &Map, randomize: bool, rng: &mut R) -> Vector2 {
    let road = if randomize {
        map.roads().choose(rng)
    } else {
        map.roads().first()
    };
    let Some(road) = road else {
        return Vector2::ZERO;
    };

    if !randomize {
        let start = road.start();
        return Vector2::new(start.x as f64, start.y as f64);
    }

    let (low, high) = road.span();
    let along = rng.gen_range(low as f64..=high as f64);
    let start = road.start();
    if road.is_horizontal() {
        Vector2::new(along, start.y as f64)
    } else {
        Vector2::new(start.x as f64, along)
    }
}

/// Moves one dog along the axis of its velocity. Returns whether it moved.
///
/// The dog is bounded by the road covering its rounded position on that
/// axis, widened by [`ROAD_HALF_WIDTH`]. Without such a road it may only
/// shift within the width of the road it is crossing. Hitting a bound pins
/// the dog there and stops it.
fn advance(dog: &mut Dog, map: &Map, seconds: f64) -> bool {
    let velocity = dog.velocity();
    if velocity.is_zero() {
        return false;
    }

    let position = dog.position();
    let current = Point::new(position.x.round() as Coord, position.y.round() as Coord);
    let moved = position.add(&velocity.scale(seconds));
    let (orientation, along, candidate) = if velocity.x != 0.0 {
        (Orientation::Horizontal, position.x, moved.x)
    } else {
        (Orientation::Vertical, position.y, moved.y)
    };

    let (low, high) = match map.road_at(orientation, current) {
        Some(road) => {
            let (start, end) = road.span();
            (start as f64 - ROAD_HALF_WIDTH, end as f64 + ROAD_HALF_WIDTH)
        }
        None => {
            let centre = along.round();
            (centre - ROAD_HALF_WIDTH, centre + ROAD_HALF_WIDTH)
        }
    };

    let (along, stopped) = if candidate > along && candidate > high {
        (high, true)
    } else if candidate < along && candidate < low {
        (low, true)
    } else {
        (candidate, false)
    };

    let position = match orientation {
        Orientation::Horizontal => Vector2::new(along, position.y),
        Orientation::Vertical => Vector2::new(position.x, along),
    };
    dog.set_position(position);
    if stopped {
        dog.set_velocity(Vector2::ZERO);
    }
    true
}
