//! Housing crowding classification.
//!
//! A house is in exactly one crowding state, derived purely from
//! `(occupants, preferred, max)`. Registries cache this as an index and
//! recompute it after every occupancy change instead of mirroring moves.

use serde::{Deserialize, Serialize};

/// Crowding state of a house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupancy {
    /// Fewer occupants than the preferred level. First choice for new arrivals.
    BelowPreferred,
    /// At or above preferred but with room left.
    BelowMax,
    /// No room left.
    Full,
}

impl Occupancy {
    pub fn classify(count: u32, preferred: u32, max: u32) -> Self {
        if count < preferred {
            Self::BelowPreferred
        } else if count < max {
            Self::BelowMax
        } else {
            Self::Full
        }
    }

    pub fn has_room(self) -> bool {
        !matches!(self, Self::Full)
    }
}

/// Preferred/max pair for one house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub preferred: u32,
    pub max: u32,
}

impl Capacity {
    /// Build a capacity, raising `max` to `preferred` when it is smaller.
    pub fn new(preferred: u32, max: u32) -> Self {
        Self {
            preferred,
            max: max.max(preferred),
        }
    }

    pub fn classify(&self, count: u32) -> Occupancy {
        Occupancy::classify(count, self.preferred, self.max)
    }

    /// Occupants above the preferred level, available to move elsewhere.
    pub fn excess(&self, count: u32) -> u32 {
        count.saturating_sub(self.preferred)
    }

    /// Multiply both thresholds, rounding half away from zero.
    pub fn scaled(&self, multiplier: f32) -> Self {
        let scale = |v: u32| (v as f32 * multiplier).round().max(0.0) as u32;
        Self::new(scale(self.preferred), scale(self.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(Occupancy::classify(0, 2, 4), Occupancy::BelowPreferred);
        assert_eq!(Occupancy::classify(1, 2, 4), Occupancy::BelowPreferred);
        assert_eq!(Occupancy::classify(2, 2, 4), Occupancy::BelowMax);
        assert_eq!(Occupancy::classify(3, 2, 4), Occupancy::BelowMax);
        assert_eq!(Occupancy::classify(4, 2, 4), Occupancy::Full);
    }

    #[test]
    fn test_zero_capacity_house_is_full() {
        assert_eq!(Occupancy::classify(0, 0, 0), Occupancy::Full);
        assert!(!Occupancy::Full.has_room());
    }

    #[test]
    fn test_preferred_equal_to_max() {
        assert_eq!(Occupancy::classify(2, 3, 3), Occupancy::BelowPreferred);
        assert_eq!(Occupancy::classify(3, 3, 3), Occupancy::Full);
    }

    #[test]
    fn test_exactly_one_state_for_all_counts() {
        let cap = Capacity::new(3, 6);
        let states: Vec<_> = (0..=6).map(|c| cap.classify(c)).collect();
        assert_eq!(
            states,
            vec![
                Occupancy::BelowPreferred,
                Occupancy::BelowPreferred,
                Occupancy::BelowPreferred,
                Occupancy::BelowMax,
                Occupancy::BelowMax,
                Occupancy::BelowMax,
                Occupancy::Full,
            ]
        );
    }

    #[test]
    fn test_capacity_normalizes_and_scales() {
        let cap = Capacity::new(5, 2);
        assert_eq!(cap.max, 5);
        let up = Capacity::new(4, 6).scaled(1.5);
        assert_eq!(up, Capacity::new(6, 9));
        let odd = Capacity::new(3, 5).scaled(1.5);
        assert_eq!(odd, Capacity::new(5, 8));
        assert_eq!(Capacity::new(2, 4).excess(5), 3);
        assert_eq!(Capacity::new(2, 4).excess(1), 0);
    }
}
