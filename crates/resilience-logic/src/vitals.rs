//! Pure refugee vitals rules.
//!
//! Each stat is nudged toward a target derived from the infrastructure a
//! refugee has access to. Linear steps only, no smoothing.

use serde::{Deserialize, Serialize};

use crate::stat::{Stat, StatChange};

/// Where a refugee currently lives, as far as vitals are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shelter {
    /// Walking between reception and a house. Everything decays.
    InTransit,
    /// Registered homeless at the reception center.
    Homeless,
    /// Living in a completed house.
    Housed,
}

/// Fixed step sizes for one stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub increase: i32,
    pub decrease: i32,
}

/// Move `stat` one step toward `target`.
///
/// Below target: rise by `increase`, stopping at the target.
/// Above target: fall by `decrease`. At target: unchanged.
pub fn approach(stat: &mut Stat, target: i32, step: Step) -> StatChange {
    let current = stat.current();
    if current < target {
        stat.set(current.saturating_add(step.increase).min(target))
    } else if current > target {
        stat.subtract(step.decrease)
    } else {
        stat.set(current)
    }
}

/// Highest current value among a set of source stats, 0 when there are none.
pub fn best_source(sources: impl IntoIterator<Item = i32>) -> i32 {
    sources.into_iter().max().unwrap_or(0).max(0)
}

/// Overall wellbeing: mean of health and hydration, rounded down.
pub fn wellbeing_from(health: i32, hydration: i32) -> i32 {
    health.saturating_add(hydration).div_euclid(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Step = Step {
        increase: 3,
        decrease: 2,
    };

    #[test]
    fn test_approach_rises_to_target_without_overshoot() {
        let mut s = Stat::new(0, 100, 48);
        approach(&mut s, 50, STEP);
        assert_eq!(s.current(), 50);
        approach(&mut s, 50, STEP);
        assert_eq!(s.current(), 50);
    }

    #[test]
    fn test_approach_falls_when_above_target() {
        let mut s = Stat::new(0, 100, 60);
        let change = approach(&mut s, 10, STEP);
        assert_eq!(s.current(), 58);
        assert_eq!(change.delta(), -2);
    }

    #[test]
    fn test_approach_respects_floor() {
        let mut s = Stat::new(0, 100, 1);
        approach(&mut s, -40, STEP);
        assert_eq!(s.current(), 0);
    }

    #[test]
    fn test_best_source() {
        assert_eq!(best_source(vec![]), 0);
        assert_eq!(best_source(vec![10, 80, 40]), 80);
        assert_eq!(best_source(vec![-5]), 0);
    }

    #[test]
    fn test_wellbeing_mean_rounds_down() {
        assert_eq!(wellbeing_from(100, 100), 100);
        assert_eq!(wellbeing_from(51, 50), 50);
        assert_eq!(wellbeing_from(50, 51), 50);
        assert_eq!(wellbeing_from(0, 1), 0);
        assert_eq!(wellbeing_from(0, 0), 0);
    }
}
