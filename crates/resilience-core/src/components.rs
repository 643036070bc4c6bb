//! Components attached to camp entities.
//!
//! Refugees carry [`Refugee`] + [`Vitals`]. Buildings carry [`Building`],
//! [`Site`] and [`Durability`]; houses add [`House`], water and food points
//! add [`ServicePoint`].
//!
//! The house owns the authoritative occupant list. The refugee's
//! [`Residence`] is a back-pointer that only the housing module writes.

use hecs::Entity;
use resilience_logic::occupancy::{Capacity, Occupancy};
use resilience_logic::stat::Stat;
use resilience_logic::vitals::{wellbeing_from, Shelter};
use serde::{Deserialize, Serialize};

/// Position on the camp ground plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub x: f32,
    pub z: f32,
}

impl Site {
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    pub fn distance(&self, other: &Site) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    House,
    WaterPoint,
    FoodPoint,
}

/// Common building state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    /// Upgrade level, starting at 0.
    pub level: u32,
    /// False until the construction timer has elapsed.
    pub completed: bool,
}

impl Building {
    pub fn new(kind: BuildingKind) -> Self {
        Self {
            kind,
            level: 0,
            completed: false,
        }
    }
}

/// Structural health of a building. For houses this is the shelter quality
/// refugee health trends toward; for water and food points it is the
/// service level they provide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Durability(pub Stat);

/// Marks a water or food point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServicePoint {
    pub radius: f32,
}

/// A residential building.
#[derive(Debug, Clone, PartialEq)]
pub struct House {
    capacity: Capacity,
    /// Move-in order; the front is the earliest arrival.
    occupants: Vec<Entity>,
    water_sources: Vec<Entity>,
    food_sources: Vec<Entity>,
}

impl House {
    pub fn new(capacity: Capacity) -> Self {
        Self {
            capacity,
            occupants: Vec::new(),
            water_sources: Vec::new(),
            food_sources: Vec::new(),
        }
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn preferred(&self) -> u32 {
        self.capacity.preferred
    }

    pub fn max(&self) -> u32 {
        self.capacity.max
    }

    pub fn occupants(&self) -> &[Entity] {
        &self.occupants
    }

    pub fn occupant_count(&self) -> u32 {
        self.occupants.len() as u32
    }

    pub fn occupancy(&self) -> Occupancy {
        self.capacity.classify(self.occupant_count())
    }

    pub fn is_full(&self) -> bool {
        self.occupant_count() >= self.capacity.max
    }

    pub fn is_over_preferred(&self) -> bool {
        self.occupant_count() > self.capacity.preferred
    }

    pub fn water_sources(&self) -> &[Entity] {
        &self.water_sources
    }

    pub fn food_sources(&self) -> &[Entity] {
        &self.food_sources
    }

    pub(crate) fn set_capacity(&mut self, capacity: Capacity) {
        self.capacity = capacity;
    }

    pub(crate) fn push_occupant(&mut self, refugee: Entity) {
        self.occupants.push(refugee);
    }

    pub(crate) fn pop_earliest(&mut self) -> Option<Entity> {
        if self.occupants.is_empty() {
            None
        } else {
            Some(self.occupants.remove(0))
        }
    }

    pub(crate) fn take_occupant(&mut self, refugee: Entity) -> bool {
        match self.occupants.iter().position(|&r| r == refugee) {
            Some(i) => {
                self.occupants.remove(i);
                true
            }
            None => false,
        }
    }

    pub(crate) fn add_water_source(&mut self, source: Entity) {
        if !self.water_sources.contains(&source) {
            self.water_sources.push(source);
        }
    }

    pub(crate) fn add_food_source(&mut self, source: Entity) {
        if !self.food_sources.contains(&source) {
            self.food_sources.push(source);
        }
    }
}

/// Where a refugee has been assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Residence {
    /// Registered homeless at the reception center.
    Homeless,
    House(Entity),
}

/// A person in the camp.
#[derive(Debug, Clone, PartialEq)]
pub struct Refugee {
    residence: Option<Residence>,
    alive: bool,
}

impl Refugee {
    pub fn new() -> Self {
        Self {
            residence: None,
            alive: true,
        }
    }

    /// `None` while in transit (arrived, not yet assigned or just evicted).
    pub fn residence(&self) -> Option<Residence> {
        self.residence
    }

    pub fn house(&self) -> Option<Entity> {
        match self.residence {
            Some(Residence::House(h)) => Some(h),
            _ => None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn shelter(&self) -> Shelter {
        match self.residence {
            None => Shelter::InTransit,
            Some(Residence::Homeless) => Shelter::Homeless,
            Some(Residence::House(_)) => Shelter::Housed,
        }
    }

    pub(crate) fn set_residence(&mut self, residence: Option<Residence>) {
        self.residence = residence;
    }

    pub(crate) fn mark_dead(&mut self) {
        self.alive = false;
    }
}

impl Default for Refugee {
    fn default() -> Self {
        Self::new()
    }
}

/// Refugee wellbeing stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub health: Stat,
    pub hydration: Stat,
    pub food: Stat,
    pub hygiene: Stat,
    /// Derived from health and hydration after every update.
    pub wellbeing: Stat,
    /// Tick time accumulated toward the next stat update.
    pub(crate) timer: f32,
}

impl Vitals {
    /// All stats full on `[0, max]`.
    pub fn new(max: i32) -> Self {
        Self {
            health: Stat::full(max),
            hydration: Stat::full(max),
            food: Stat::full(max),
            hygiene: Stat::full(max),
            wellbeing: Stat::full(max),
            timer: 0.0,
        }
    }

    /// Recompute wellbeing; returns true if it sits at its floor.
    pub fn refresh_wellbeing(&mut self) -> bool {
        let value = wellbeing_from(self.health.current(), self.hydration.current());
        self.wellbeing.set(value);
        self.wellbeing.is_at_floor()
    }
}

impl Default for Vitals {
    fn default() -> Self {
        Self::new(100)
    }
}
