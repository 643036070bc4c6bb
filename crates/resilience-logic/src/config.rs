//! Camp configuration: clock, vitals rates, income, events, arrivals and blueprints.
//!
//! Every section has sensible defaults so a partial JSON document is enough
//! to start a camp. [`CampConfig::validate`] reports problems instead of
//! panicking so tooling can print all of them at once.

use serde::{Deserialize, Serialize};

use crate::occupancy::Capacity;
use crate::stat::{BAD_THRESHOLD, GOOD_THRESHOLD};
use crate::vitals::Step;

/// Top-level camp configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampConfig {
    /// Seed for every random draw in the simulation.
    pub seed: u64,
    pub clock: ClockConfig,
    pub vitals: VitalsConfig,
    pub income: IncomeConfig,
    pub events: EventConfig,
    pub arrivals: ArrivalConfig,
    pub reception: ReceptionConfig,
    pub blueprints: BlueprintCatalog,
}

impl Default for CampConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            clock: ClockConfig::default(),
            vitals: VitalsConfig::default(),
            income: IncomeConfig::default(),
            events: EventConfig::default(),
            arrivals: ArrivalConfig::default(),
            reception: ReceptionConfig::default(),
            blueprints: BlueprintCatalog::default(),
        }
    }
}

// ============================================================================
// CLOCK
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Scaled seconds that make up one in-game month.
    pub seconds_per_month: f32,
    /// Speed multiplier applied to real time (0 stops time).
    pub time_multiplier: f32,
    /// Start with time stopped.
    pub start_paused: bool,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            seconds_per_month: 120.0,
            time_multiplier: 1.0,
            start_paused: false,
        }
    }
}

// ============================================================================
// VITALS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsConfig {
    /// Tick time accumulated between stat updates.
    pub update_stat_timer: f32,
    /// Upper bound of every refugee stat; all start full.
    pub stat_max: i32,
    pub health: Step,
    pub hydration: Step,
    pub food: Step,
    pub hygiene: Step,
    /// Hydration handed to registered homeless per stat update by the reception water point.
    pub homeless_hydration_relief: i32,
    pub good_threshold: i32,
    pub bad_threshold: i32,
}

impl Default for VitalsConfig {
    fn default() -> Self {
        let unit = Step {
            increase: 1,
            decrease: 1,
        };
        Self {
            update_stat_timer: 2.0,
            stat_max: 100,
            health: unit,
            hydration: unit,
            food: unit,
            hygiene: unit,
            homeless_hydration_relief: 0,
            good_threshold: GOOD_THRESHOLD,
            bad_threshold: BAD_THRESHOLD,
        }
    }
}

// ============================================================================
// INCOME
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeConfig {
    pub starting_funds: i64,
    /// Weight of camp success in monthly income.
    pub success_weight: f64,
    /// Weight of camp need in monthly income.
    pub need_weight: f64,
    /// Scale of monthly income, based off the cheapest building.
    pub multiplier: i64,
}

impl Default for IncomeConfig {
    fn default() -> Self {
        Self {
            starting_funds: 100,
            success_weight: 0.5,
            need_weight: 0.5,
            multiplier: 50,
        }
    }
}

// ============================================================================
// RANDOM EVENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Chance (percent) the ratchet resets to whenever an event starts.
    pub min_chance: u32,
    /// Ceiling of the ratchet (percent).
    pub max_chance: u32,
    /// Added to the chance after every idle roll.
    pub delta_chance: u32,
    /// Roll on every tick rather than every `tick_time`.
    pub tick_every_tick: bool,
    /// Tick time between rolls when `tick_every_tick` is off.
    pub tick_time: f32,
    pub events: Vec<RandomEventSpec>,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            min_chance: 0,
            max_chance: 100,
            delta_chance: 1,
            tick_every_tick: true,
            tick_time: 1.0,
            events: Vec::new(),
        }
    }
}

/// One possible random event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomEventSpec {
    pub name: String,
    /// Relative likelihood among all events. 0 disables the event.
    pub weight: u32,
    pub effects: Vec<EffectSpec>,
}

/// One effect of an event, applied after `delay_ticks` of tick time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSpec {
    #[serde(default)]
    pub delay_ticks: f32,
    pub kind: EffectKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectKind {
    /// Grant (or, if negative, take) funds.
    AddFunds { amount: i64 },
    /// A group of refugees shows up at reception.
    RefugeeArrival { count: u32 },
    /// Damage (or, if negative, repair) every completed house.
    ShelterDamage { amount: i32 },
}

// ============================================================================
// ARRIVALS & RECEPTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrivalConfig {
    /// Tick time before the first wave.
    pub pause_at_start: f32,
    pub waves: Vec<ArrivalWave>,
}

impl Default for ArrivalConfig {
    fn default() -> Self {
        Self {
            pause_at_start: 2.0,
            waves: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrivalWave {
    pub count: u32,
    /// Tick time until the following wave.
    pub ticks_to_next: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceptionConfig {
    /// Tick time needed to process one refugee.
    pub time_to_process: f32,
}

impl Default for ReceptionConfig {
    fn default() -> Self {
        Self {
            time_to_process: 2.0,
        }
    }
}

// ============================================================================
// BLUEPRINTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BlueprintCatalog {
    pub house: HouseBlueprint,
    pub water: ServiceBlueprint,
    pub food: ServiceBlueprint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseBlueprint {
    pub price: i64,
    pub construction_ticks: f32,
    pub preferred: u32,
    pub max: u32,
    pub shelter_health: i32,
    pub upgrade_price: i64,
    pub upgrade_multiplier: f32,
}

impl HouseBlueprint {
    pub fn capacity(&self) -> Capacity {
        Capacity::new(self.preferred, self.max)
    }
}

impl Default for HouseBlueprint {
    fn default() -> Self {
        Self {
            price: 20,
            construction_ticks: 5.0,
            preferred: 4,
            max: 8,
            shelter_health: 100,
            upgrade_price: 30,
            upgrade_multiplier: 1.5,
        }
    }
}

/// Water pump or food distribution point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceBlueprint {
    pub price: i64,
    pub construction_ticks: f32,
    /// Houses strictly within this distance are served.
    pub radius: f32,
    pub health: i32,
}

impl Default for ServiceBlueprint {
    fn default() -> Self {
        Self {
            price: 15,
            construction_ticks: 5.0,
            radius: 10.0,
            health: 100,
        }
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

impl CampConfig {
    /// Every problem found, empty when the config is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if !(self.clock.seconds_per_month > 0.0) {
            problems.push("clock.seconds_per_month must be positive".to_string());
        }
        if !(self.clock.time_multiplier >= 0.0) {
            problems.push("clock.time_multiplier must not be negative".to_string());
        }
        if !(self.vitals.update_stat_timer >= 0.0) {
            problems.push("vitals.update_stat_timer must not be negative".to_string());
        }
        if self.vitals.stat_max <= 0 {
            problems.push("vitals.stat_max must be positive".to_string());
        }
        if self.vitals.bad_threshold > self.vitals.good_threshold {
            problems.push("vitals.bad_threshold exceeds good_threshold".to_string());
        }

        let ev = &self.events;
        if ev.min_chance > ev.max_chance {
            problems.push(format!(
                "events.min_chance ({}) exceeds max_chance ({})",
                ev.min_chance, ev.max_chance
            ));
        }
        if ev.max_chance > 100 {
            problems.push("events.max_chance is a percentage and must be <= 100".to_string());
        }
        if !ev.tick_every_tick && !(ev.tick_time >= 0.0) {
            problems.push("events.tick_time must not be negative".to_string());
        }
        for (i, e) in ev.events.iter().enumerate() {
            if e.name.trim().is_empty() {
                problems.push(format!("events.events[{}] has an empty name", i));
            }
            if e.effects.is_empty() {
                problems.push(format!("event '{}' has no effects", e.name));
            }
            if e.effects.iter().any(|f| !(f.delay_ticks >= 0.0)) {
                problems.push(format!("event '{}' has a negative effect delay", e.name));
            }
        }

        if !(self.arrivals.pause_at_start >= 0.0)
            || self.arrivals.waves.iter().any(|w| !(w.ticks_to_next >= 0.0))
        {
            problems.push("arrival timings must not be negative".to_string());
        }
        if !(self.reception.time_to_process >= 0.0) {
            problems.push("reception.time_to_process must not be negative".to_string());
        }

        let house = &self.blueprints.house;
        if house.preferred > house.max {
            problems.push(format!(
                "house preferred occupancy ({}) exceeds max ({})",
                house.preferred, house.max
            ));
        }
        if !(house.upgrade_multiplier >= 1.0) {
            problems.push("house.upgrade_multiplier must be at least 1".to_string());
        }
        for (label, bp) in [("water", &self.blueprints.water), ("food", &self.blueprints.food)] {
            if !(bp.radius >= 0.0) {
                problems.push(format!("{}.radius must not be negative", label));
            }
            if bp.price < 0 {
                problems.push(format!("{}.price must not be negative", label));
            }
        }
        if house.price < 0 || house.upgrade_price < 0 {
            problems.push("house prices must not be negative".to_string());
        }

        problems
    }
}
