//! Resilience Core - refugee camp simulation engine
//!
//! An ECS-based simulation of a refugee camp: refugees arrive in waves, are
//! processed at reception, housed or registered homeless, and their vitals
//! drift toward what their shelter, water and food provide.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Refugees, houses, water points, food points
//! - **Components**: Pure data attached to entities (Refugee, Vitals, House, Site, ...)
//! - **Systems**: Logic that queries and updates components
//!
//! Housing is the one place with cross-entity invariants. Houses own their
//! occupant lists and [`housing::HousingRegistry`] is the only writer of both
//! the lists and the refugees' residence back-pointers.
//!
//! # Example
//!
//! ```rust,no_run
//! use resilience_core::prelude::*;
//!
//! let mut engine = CampEngine::new(CampConfig::default()).unwrap();
//! engine.place_building(BuildingKind::House, Site::new(0.0, 0.0)).unwrap();
//!
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//!     for event in engine.drain_events() {
//!         println!("{:?}", event);
//!     }
//! }
//! ```

pub mod clock;
pub mod components;
pub mod economy;
pub mod engine;
pub mod error;
pub mod housing;
pub mod scheduler;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{CampEngine, CampEvent, WellbeingReport};
    pub use crate::error::{EngineError, HousingError};
    pub use crate::housing::{AllocationReport, HousingRegistry};
    pub use resilience_logic::config::CampConfig;
    pub use resilience_logic::occupancy::{Capacity, Occupancy};
}
