//! Runtime entities: dogs, the sessions that own them and the players that
//! control them.

use crate::geometry::MapId;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Represents a vector in 2D map space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    /// Grows to the east.
    pub x: f64,
    /// Grows to the south.
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn scale(&self, scalar: f64) -> Vector2 {
        Vector2 {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    pub fn add(&self, other: &Vector2) -> Vector2 {
        Vector2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

/// Serialized as a two-element array `[x, y]`.
impl Serialize for Vector2 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.x, self.y).serialize(serializer)
    }
}

/// Facing direction of a dog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "W")]
    West,
    #[serde(rename = "E")]
    East,
}

impl Direction {
    /// Velocity of a dog heading this way at `speed` map units per second.
    pub fn velocity(self, speed: f64) -> Vector2 {
        match self {
            Direction::North => Vector2::new(0.0, -speed),
            Direction::South => Vector2::new(0.0, speed),
            Direction::West => Vector2::new(-speed, 0.0),
            Direction::East => Vector2::new(speed, 0.0),
        }
    }
}

/// Movement command sent by a player: `"L"`, `"R"`, `"U"`, `"D"` or `""` to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Move {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "U")]
    Up,
    #[serde(rename = "D")]
    Down,
    #[serde(rename = "")]
    Stop,
}

impl Move {
    /// Direction the command turns the dog to; `None` means stop.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Move::Left => Some(Direction::West),
            Move::Right => Some(Direction::East),
            Move::Up => Some(Direction::North),
            Move::Down => Some(Direction::South),
            Move::Stop => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DogId(u64);

impl DogId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for DogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The entity a player steers around the map.
///
/// New dogs stand still and face north.
#[derive(Debug, Clone, PartialEq)]
pub struct Dog {
    id: DogId,
    name: String,
    position: Vector2,
    velocity: Vector2,
    direction: Direction,
}

impl Dog {
    pub fn new(id: DogId, name: impl Into<String>, position: Vector2) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            velocity: Vector2::ZERO,
            direction: Direction::North,
        }
    }

    pub fn id(&self) -> DogId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    pub fn velocity(&self) -> Vector2 {
        self.velocity
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_position(&mut self, position: Vector2) {
        self.position = position;
    }

    pub fn set_velocity(&mut self, velocity: Vector2) {
        self.velocity = velocity;
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }
}

/// Live instance of one map. Owns every dog that joined it.
#[derive(Debug, Clone)]
pub struct GameSession {
    map_id: MapId,
    dogs: BTreeMap<DogId, Dog>,
}

impl GameSession {
    pub fn new(map_id: MapId) -> Self {
        Self {
            map_id,
            dogs: BTreeMap::new(),
        }
    }

    pub fn map_id(&self) -> &MapId {
        &self.map_id
    }

    pub fn add_dog(&mut self, dog: Dog) {
        self.dogs.insert(dog.id(), dog);
    }

    pub fn dog(&self, id: DogId) -> Option<&Dog> {
        self.dogs.get(&id)
    }

    pub fn dog_mut(&mut self, id: DogId) -> Option<&mut Dog> {
        self.dogs.get_mut(&id)
    }

    /// Dogs in ascending id order.
    pub fn dogs(&self) -> impl Iterator<Item = &Dog> {
        self.dogs.values()
    }

    pub fn dogs_mut(&mut self) -> impl Iterator<Item = &mut Dog> {
        self.dogs.values_mut()
    }

    pub fn len(&self) -> usize {
        self.dogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dogs.is_empty()
    }
}

/// Handle binding a participant to one dog in one session.
///
/// The dog itself stays owned by its session; a player only names it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Player {
    id: DogId,
    map_id: MapId,
}

impl Player {
    pub fn new(id: DogId, map_id: MapId) -> Self {
        Self { id, map_id }
    }

    /// Same value as the controlled dog's id.
    pub fn id(&self) -> DogId {
        self.id
    }

    pub fn map_id(&self) -> &MapId {
        &self.map_id
    }
}
