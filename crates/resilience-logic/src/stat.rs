//! Bounded integer stats for health, hydration, food, hygiene and wellbeing.
//!
//! A [`Stat`] keeps `min <= current <= max` after every write. Arithmetic that
//! would leave the range is clamped, never rejected. Each write to `current`
//! returns a [`StatChange`] so the owner can react (death, colour, UI).

use serde::{Deserialize, Serialize};

/// Default threshold at or above which a stat is considered good.
pub const GOOD_THRESHOLD: i32 = 70;

/// Default threshold at or below which a stat is considered bad.
pub const BAD_THRESHOLD: i32 = 30;

/// Bounded numeric value with clamped arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    min: i32,
    max: i32,
    current: i32,
}

/// Notification produced by every write to a stat's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatChange {
    pub previous: i32,
    pub current: i32,
}

impl StatChange {
    pub fn delta(&self) -> i32 {
        self.current - self.previous
    }

    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Coarse quality band used by status displays and income weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatBand {
    Good,
    Okay,
    Bad,
}

impl Stat {
    /// Create a stat. `max` is raised to `min` if smaller, and `current` is
    /// clamped into the resulting range.
    pub fn new(min: i32, max: i32, current: i32) -> Self {
        let max = max.max(min);
        Self {
            min,
            max,
            current: current.clamp(min, max),
        }
    }

    /// A stat on `[0, max]` starting full.
    pub fn full(max: i32) -> Self {
        Self::new(0, max, max)
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    /// Add `amount`. Negative amounts subtract.
    pub fn add(&mut self, amount: i32) -> StatChange {
        if amount < 0 {
            return self.subtract(amount.saturating_neg());
        }
        let previous = self.current;
        self.current = self.current.saturating_add(amount).min(self.max);
        StatChange {
            previous,
            current: self.current,
        }
    }

    /// Subtract `amount`. Negative amounts add.
    pub fn subtract(&mut self, amount: i32) -> StatChange {
        if amount < 0 {
            return self.add(amount.saturating_neg());
        }
        let previous = self.current;
        self.current = self.current.saturating_sub(amount).max(self.min);
        StatChange {
            previous,
            current: self.current,
        }
    }

    /// Set the current value, clamped to the bounds.
    pub fn set(&mut self, value: i32) -> StatChange {
        let previous = self.current;
        self.current = value.clamp(self.min, self.max);
        StatChange {
            previous,
            current: self.current,
        }
    }

    /// Fill to the maximum.
    pub fn restore(&mut self) -> StatChange {
        self.set(self.max)
    }

    /// Move the upper bound. It never drops below `min`; `current` follows it down.
    pub fn set_max(&mut self, value: i32) {
        self.max = value.max(self.min);
        self.current = self.current.min(self.max);
    }

    /// Move the lower bound. It never rises above `max`; `current` follows it up.
    pub fn set_min(&mut self, value: i32) {
        self.min = value.min(self.max);
        self.current = self.current.max(self.min);
    }

    pub fn is_at_floor(&self) -> bool {
        self.current <= self.min
    }

    pub fn is_at_ceiling(&self) -> bool {
        self.current >= self.max
    }

    /// Position of `current` within the range, 0.0 at the floor and 1.0 at the ceiling.
    pub fn fraction(&self) -> f32 {
        let span = self.max - self.min;
        if span <= 0 {
            return 1.0;
        }
        (self.current - self.min) as f32 / span as f32
    }

    pub fn band(&self, good: i32, bad: i32) -> StatBand {
        if self.current >= good {
            StatBand::Good
        } else if self.current <= bad {
            StatBand::Bad
        } else {
            StatBand::Okay
        }
    }
}

impl Default for Stat {
    fn default() -> Self {
        Self::full(100)
    }
}
