//! # Game Server Library
//!
//! HTTP front end for the dog roads game. It owns the single shared game
//! instance, routes API requests to it and serves the web client's static
//! files for everything else.
//!
//! ## Core Responsibilities
//!
//! ### Request Dispatch
//! Every request is decoded into an [`api::ApiRequest`] and handed to the
//! [`api::ApiRouter`], which tries its endpoints in a fixed order. Any path
//! under `/api/` always gets a JSON answer; other targets go to
//! [`static_files`].
//!
//! ### Serialized Game Access
//! The game lives behind one [`SharedGame`] lock. Joins, moves and ticks take
//! it for writing, the players and state endpoints for reading. Map listings
//! are answered from a catalog copy and never touch the lock.
//!
//! ### Time
//! With a tick period configured, a [`ticker::Ticker`] advances the game by
//! the real time elapsed between ticks. Without one, clients drive the clock
//! through `POST /api/v1/game/tick`.
//!
//! ## Module Organization
//!
//! ### API Module (`api`)
//! Endpoint contracts, payload shapes and the canned error responses.
//!
//! ### Transport Module (`http`)
//! axum application with a single catch-all handler, request/response
//! logging and graceful shutdown.
//!
//! ### Configuration Module (`config`)
//! Command line arguments and the JSON game file.
//!
//! ### Logging Module (`logging`)
//! JSON line formatter for `env_logger` and the lifecycle log events.

pub mod api;
pub mod config;
pub mod http;
pub mod logging;
pub mod static_files;
pub mod ticker;

use model::Game;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The game instance shared by every request handler and the ticker.
pub type SharedGame = Arc<RwLock<Game>>;

pub fn shared(game: Game) -> SharedGame {
    Arc::new(RwLock::new(game))
}
