//! Error types for the camp simulation.

use hecs::Entity;
use thiserror::Error;

use crate::components::BuildingKind;

/// Rejected housing operations. State is left unchanged whenever one of
/// these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HousingError {
    #[error("house {house:?} is already full ({max} occupants)")]
    FullHouse { house: Entity, max: u32 },

    #[error("house {house:?} has no occupants to remove")]
    EmptyHouse { house: Entity },

    #[error("entity {0:?} is not a house")]
    UnknownHouse(Entity),

    #[error("entity {0:?} is not a living refugee")]
    UnknownRefugee(Entity),

    #[error("refugee {refugee:?} does not live in house {house:?}")]
    NotResident { refugee: Entity, house: Entity },

    #[error("refugee {0:?} already has a residence")]
    AlreadyHoused(Entity),
}

/// Errors surfaced by [`crate::engine::CampEngine`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid camp config: {}", .0.join("; "))]
    Config(Vec<String>),

    #[error("cannot afford {kind:?}: costs {price}, {funds} available")]
    InsufficientFunds {
        kind: BuildingKind,
        price: i64,
        funds: i64,
    },

    #[error("entity {0:?} is not a completed building of the expected kind")]
    UnknownBuilding(Entity),

    #[error(transparent)]
    Housing(#[from] HousingError),
}
