//! Events system - random camp events driven by a chance ratchet
//!
//! While no event is running the director rolls against the current chance.
//! A failed roll raises the chance by `delta_chance` up to `max_chance`; a
//! success picks an event by weight and resets the chance to `min_chance`.
//! The event stays active until every one of its effects has been applied.

use log::{debug, info, warn};
use rand::Rng;
use resilience_logic::config::{EffectSpec, EventConfig, RandomEventSpec};
use resilience_logic::odds::{pick_weighted, ratchet, roll_succeeds, total_weight};

/// The event currently in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEvent {
    pub index: usize,
    /// Effect indices not yet applied.
    pending: Vec<usize>,
}

impl ActiveEvent {
    pub fn pending_effects(&self) -> &[usize] {
        &self.pending
    }
}

#[derive(Debug, Clone)]
pub struct EventDirector {
    config: EventConfig,
    weights: Vec<u32>,
    current_chance: u32,
    tick_time_passed: f32,
    active: Option<ActiveEvent>,
}

impl EventDirector {
    pub fn new(config: EventConfig) -> Self {
        let weights = config.events.iter().map(|e| e.weight).collect();
        Self {
            current_chance: config.min_chance,
            weights,
            config,
            tick_time_passed: 0.0,
            active: None,
        }
    }

    pub fn current_chance(&self) -> u32 {
        self.current_chance
    }

    pub fn active(&self) -> Option<&ActiveEvent> {
        self.active.as_ref()
    }

    pub fn spec(&self, index: usize) -> Option<&RandomEventSpec> {
        self.config.events.get(index)
    }

    pub fn effects(&self, index: usize) -> &[EffectSpec] {
        self.spec(index).map(|s| s.effects.as_slice()).unwrap_or(&[])
    }

    /// Spend `delta` of tick time. Returns the index of an event that started.
    pub fn tick<R: Rng>(&mut self, delta: f32, rng: &mut R) -> Option<usize> {
        if self.active.is_some() {
            return None;
        }
        if !self.config.tick_every_tick {
            self.tick_time_passed += delta;
            if self.tick_time_passed < self.config.tick_time {
                return None;
            }
            self.tick_time_passed = 0.0;
        }

        if self.current_chance > 0 {
            let draw = rng.gen_range(0..100);
            if roll_succeeds(self.current_chance, draw) {
                debug!("event roll {} under chance {}", draw, self.current_chance);
                if let Some(index) = self.trigger(rng) {
                    return Some(index);
                }
            }
        }

        self.current_chance = ratchet(
            self.current_chance,
            self.config.delta_chance,
            self.config.min_chance,
            self.config.max_chance,
        );
        None
    }

    /// Start a weighted-random event right away, if none is running.
    pub fn trigger<R: Rng>(&mut self, rng: &mut R) -> Option<usize> {
        if self.active.is_some() {
            return None;
        }
        let total = total_weight(&self.weights);
        if total == 0 {
            warn!("no random event has a positive weight");
            return None;
        }
        let index = pick_weighted(&self.weights, rng.gen_range(0..total))?;
        self.start(index)
    }

    /// Start a specific event. Returns `None` if one is already running or
    /// the index is unknown.
    pub fn start(&mut self, index: usize) -> Option<usize> {
        if self.active.is_some() {
            return None;
        }
        let spec = self.config.events.get(index)?;
        info!("random event started: {}", spec.name);
        self.active = Some(ActiveEvent {
            index,
            pending: (0..spec.effects.len()).collect(),
        });
        self.current_chance = self.config.min_chance;
        Some(index)
    }

    /// Record an applied effect. Returns the event index once its last
    /// effect is done and the event has ended.
    pub fn complete_effect(&mut self, effect: usize) -> Option<usize> {
        let active = self.active.as_mut()?;
        active.pending.retain(|&e| e != effect);
        self.finish_if_done()
    }

    /// End the active event if it has nothing left to apply.
    pub fn finish_if_done(&mut self) -> Option<usize> {
        if !self.active.as_ref()?.pending.is_empty() {
            return None;
        }
        let ended = self.active.take()?;
        if let Some(spec) = self.config.events.get(ended.index) {
            info!("random event ended: {}", spec.name);
        }
        self.current_chance = self.config.min_chance;
        Some(ended.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use resilience_logic::config::EffectKind;

    fn event(name: &str, weight: u32, effects: usize) -> RandomEventSpec {
        RandomEventSpec {
            name: name.to_string(),
            weight,
            effects: (0..effects)
                .map(|i| EffectSpec {
                    delay_ticks: i as f32,
                    kind: EffectKind::AddFunds { amount: 10 },
                })
                .collect(),
        }
    }

    fn director(min: u32, max: u32, delta: u32, events: Vec<RandomEventSpec>) -> EventDirector {
        EventDirector::new(EventConfig {
            min_chance: min,
            max_chance: max,
            delta_chance: delta,
            events,
            ..Default::default()
        })
    }

    #[test]
    fn test_chance_ratchets_while_idle() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut d = director(0, 3, 1, vec![event("donation", 1, 1)]);
        assert_eq!(d.tick(1.0, &mut rng), None);
        assert_eq!(d.current_chance(), 1);
    }

    #[test]
    fn test_zero_max_chance_never_fires() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut d = director(0, 0, 5, vec![event("donation", 1, 1)]);
        for _ in 0..500 {
            assert_eq!(d.tick(1.0, &mut rng), None);
        }
        assert_eq!(d.current_chance(), 0);
    }

    #[test]
    fn test_certain_chance_starts_and_resets() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut d = director(100, 100, 0, vec![event("storm", 1, 2)]);
        assert_eq!(d.tick(1.0, &mut rng), Some(0));
        assert_eq!(d.active().map(|a| a.pending_effects().len()), Some(2));
        assert_eq!(d.tick(1.0, &mut rng), None, "one event at a time");

        assert_eq!(d.complete_effect(0), None);
        assert_eq!(d.complete_effect(1), Some(0));
        assert!(d.active().is_none());
        assert_eq!(d.current_chance(), 100);
    }

    #[test]
    fn test_zero_weight_events_are_never_picked() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut d = director(0, 100, 0, vec![event("never", 0, 1), event("always", 5, 1)]);
        for _ in 0..50 {
            assert_eq!(d.trigger(&mut rng), Some(1));
            d.complete_effect(0);
        }
    }

    #[test]
    fn test_all_zero_weights_start_nothing() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut d = director(100, 100, 0, vec![event("never", 0, 1)]);
        assert_eq!(d.tick(1.0, &mut rng), None);
        assert!(d.active().is_none());
    }

    #[test]
    fn test_effectless_event_ends_on_finish_check() {
        let mut d = director(0, 100, 0, vec![event("rumor", 1, 0)]);
        assert_eq!(d.start(0), Some(0));
        assert_eq!(d.finish_if_done(), Some(0));
        assert!(d.active().is_none());
    }

    #[test]
    fn test_interval_rolling() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut d = EventDirector::new(EventConfig {
            min_chance: 0,
            max_chance: 50,
            delta_chance: 10,
            tick_every_tick: false,
            tick_time: 2.0,
            events: vec![event("donation", 1, 1)],
        });
        d.tick(1.0, &mut rng);
        assert_eq!(d.current_chance(), 0, "no roll before tick_time");
        d.tick(1.0, &mut rng);
        assert_eq!(d.current_chance(), 10);
    }
}
