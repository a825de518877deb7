//! # Game Model
//!
//! Everything the server knows about the world, independent of how requests
//! reach it.
//!
//! - [`geometry`]: immutable maps built from roads, buildings and offices,
//!   with a per-axis point-to-road lookup.
//! - [`session`]: dogs, the sessions that own them and the players that
//!   steer them.
//! - [`game`]: the registry holding maps, sessions, players and tokens, and
//!   the movement tick that walks dogs along their roads.
//! - [`token`]: bearer token issuance.
//!
//! The registry takes its randomness as an injected generator so spawn points
//! and tokens are reproducible under a fixed seed.

pub mod error;
pub mod game;
pub mod geometry;
pub mod session;
pub mod token;

pub use error::GameError;
pub use game::{Game, GameRng, DEFAULT_DOG_SPEED, ROAD_HALF_WIDTH};
pub use geometry::{
    Building, Coord, Map, MapCatalog, MapId, Offset, Office, OfficeId, Orientation, Point,
    Rectangle, Road, Size,
};
pub use session::{Direction, Dog, DogId, GameSession, Move, Player, Vector2};
pub use token::{issue_token, Token};
