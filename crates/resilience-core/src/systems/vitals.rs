//! Vitals system - moves refugee stats toward what their shelter provides
//!
//! Every refugee accumulates tick time and updates once per
//! `update_stat_timer`. What an update does depends on where they live:
//!
//! | Shelter    | health              | hydration           | food              | hygiene   |
//! |------------|---------------------|---------------------|-------------------|-----------|
//! | in transit | falls               | falls               | falls             | falls     |
//! | homeless   | falls               | reception relief    | -                 | -         |
//! | housed     | toward shelter      | toward best water   | toward best food  | rises     |
//!
//! Wellbeing is recomputed afterwards; a refugee whose wellbeing hits its
//! floor dies.

use std::collections::HashMap;

use hecs::{Entity, World};
use log::{debug, info};
use resilience_logic::config::VitalsConfig;
use resilience_logic::vitals::{approach, best_source, Shelter};

use crate::components::{Durability, House, Refugee, Vitals};
use crate::housing::HousingRegistry;

/// What a house offers its occupants this update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HouseTargets {
    pub shelter: i32,
    pub water: i32,
    pub food: i32,
}

/// Read shelter, water and food levels for every registered house.
pub fn house_targets(world: &World, houses: &[Entity]) -> HashMap<Entity, HouseTargets> {
    let durability = |e: Entity| world.get::<&Durability>(e).map(|d| d.0.current()).ok();

    let mut targets = HashMap::with_capacity(houses.len());
    for &house in houses {
        let Ok(h) = world.get::<&House>(house) else {
            continue;
        };
        targets.insert(
            house,
            HouseTargets {
                shelter: durability(house).unwrap_or(0),
                water: best_source(h.water_sources().iter().filter_map(|&s| durability(s))),
                food: best_source(h.food_sources().iter().filter_map(|&s| durability(s))),
            },
        );
    }
    targets
}

/// Advance every living refugee's stat timer by `delta` and apply due
/// updates. Returns the refugees whose wellbeing reached its floor.
pub fn vitals_system(
    world: &mut World,
    houses: &[Entity],
    config: &VitalsConfig,
    delta: f32,
) -> Vec<Entity> {
    let targets = house_targets(world, houses);
    let mut dying = Vec::new();

    for (entity, (refugee, vitals)) in world.query_mut::<(&Refugee, &mut Vitals)>() {
        if !refugee.is_alive() {
            continue;
        }
        vitals.timer += delta;
        if vitals.timer < config.update_stat_timer {
            continue;
        }
        vitals.timer = 0.0;

        match refugee.shelter() {
            Shelter::InTransit => decay_all(vitals, config),
            Shelter::Homeless => {
                vitals.health.subtract(config.health.decrease);
                vitals.hydration.add(config.homeless_hydration_relief);
            }
            Shelter::Housed => {
                let t = refugee
                    .house()
                    .and_then(|h| targets.get(&h).copied())
                    .unwrap_or_default();
                approach(&mut vitals.health, t.shelter, config.health);
                approach(&mut vitals.hydration, t.water, config.hydration);
                approach(&mut vitals.food, t.food, config.food);
                vitals.hygiene.add(config.hygiene.increase);
            }
        }

        if vitals.refresh_wellbeing() {
            dying.push(entity);
        }
    }
    dying
}

fn decay_all(vitals: &mut Vitals, config: &VitalsConfig) {
    vitals.health.subtract(config.health.decrease);
    vitals.hydration.subtract(config.hydration.decrease);
    vitals.food.subtract(config.food.decrease);
    vitals.hygiene.subtract(config.hygiene.decrease);
}

/// Remove a dead refugee from housing and mark it dead. Returns false if it
/// was already dead or is not a refugee.
pub fn bury(world: &mut World, registry: &mut HousingRegistry, refugee: Entity) -> bool {
    match world.get::<&Refugee>(refugee) {
        Ok(r) if r.is_alive() => {}
        _ => return false,
    }
    if let Some(previous) = registry.evict(world, refugee) {
        debug!("{:?} left {:?} on death", refugee, previous);
    }
    if let Ok(mut r) = world.get::<&mut Refugee>(refugee) {
        r.mark_dead();
    }
    info!("refugee {:?} died", refugee);
    true
}
