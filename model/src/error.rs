use crate::geometry::{MapId, OfficeId};
use thiserror::Error;

/// Failures reported by the map builder and the game registry.
///
/// `DuplicateMap` and `DuplicateOffice` only occur while the world is being
/// loaded; the other variants are caused by client input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("map with id `{0}` already exists")]
    DuplicateMap(MapId),

    #[error("office `{office}` is declared twice on map `{map}`")]
    DuplicateOffice { map: MapId, office: OfficeId },

    #[error("map `{0}` not found")]
    UnknownMap(MapId),

    #[error("user name is empty")]
    EmptyUsername,
}
