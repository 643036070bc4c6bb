//! Tick clock - turns real frame time into camp ticks and months.
//!
//! The host pumps the clock once per frame with the real elapsed seconds.
//! While time is passing the scaled delta becomes one `Tick`; once a month's
//! worth of tick time has built up the accumulator resets and a
//! `MonthPassed` follows. While stopped, deltas are zero and nothing fires.

use resilience_logic::config::ClockConfig;

/// Notifications emitted by [`TickClock::pump`], in firing order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockEvent {
    Tick { delta: f32 },
    MonthPassed { month: u32 },
}

#[derive(Debug, Clone)]
pub struct TickClock {
    current_month: u32,
    is_time_passing: bool,
    seconds_per_month: f32,
    multiplier: f32,
    passed_this_month: f32,
    delta_time: f32,
}

impl TickClock {
    pub fn new(config: &ClockConfig) -> Self {
        Self {
            current_month: 1,
            is_time_passing: !config.start_paused,
            seconds_per_month: config.seconds_per_month,
            multiplier: config.time_multiplier.max(0.0),
            passed_this_month: 0.0,
            delta_time: 0.0,
        }
    }

    /// Advance by `real_seconds` of wall time.
    pub fn pump(&mut self, real_seconds: f32) -> Vec<ClockEvent> {
        let mut events = Vec::new();
        if !self.is_time_passing {
            self.delta_time = 0.0;
            return events;
        }

        self.delta_time = real_seconds.max(0.0) * self.multiplier;
        if self.delta_time > 0.0 {
            self.passed_this_month += self.delta_time;
            events.push(ClockEvent::Tick {
                delta: self.delta_time,
            });
        }

        if self.passed_this_month >= self.seconds_per_month {
            self.passed_this_month = 0.0;
            self.current_month += 1;
            events.push(ClockEvent::MonthPassed {
                month: self.current_month,
            });
        }
        events
    }

    /// Tick time advanced by the last pump; zero while stopped.
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn current_month(&self) -> u32 {
        self.current_month
    }

    pub fn passed_this_month(&self) -> f32 {
        self.passed_this_month
    }

    pub fn is_time_passing(&self) -> bool {
        self.is_time_passing
    }

    /// Start or stop time. Returns true if the state changed.
    pub fn set_time_passing(&mut self, passing: bool) -> bool {
        if self.is_time_passing == passing {
            return false;
        }
        self.is_time_passing = passing;
        if !passing {
            self.delta_time = 0.0;
        }
        true
    }

    pub fn time_multiplier(&self) -> f32 {
        self.multiplier
    }

    /// Change the speed. Negative values are ignored. Returns true if changed.
    pub fn set_time_multiplier(&mut self, multiplier: f32) -> bool {
        if !(multiplier >= 0.0) || multiplier == self.multiplier {
            return false;
        }
        self.multiplier = multiplier;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(seconds_per_month: f32) -> TickClock {
        TickClock::new(&ClockConfig {
            seconds_per_month,
            ..Default::default()
        })
    }

    #[test]
    fn test_pump_emits_scaled_tick() {
        let mut c = clock(100.0);
        c.set_time_multiplier(2.0);
        let events = c.pump(0.5);
        assert_eq!(events, vec![ClockEvent::Tick { delta: 1.0 }]);
        assert!((c.delta_time() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_stopped_clock_is_silent() {
        let mut c = clock(10.0);
        assert!(c.set_time_passing(false));
        assert!(!c.set_time_passing(false));
        assert!(c.pump(5.0).is_empty());
        assert_eq!(c.delta_time(), 0.0);
        assert_eq!(c.passed_this_month(), 0.0);
    }

    #[test]
    fn test_zero_multiplier_emits_no_tick() {
        let mut c = clock(10.0);
        assert!(c.set_time_multiplier(0.0));
        assert!(c.pump(5.0).is_empty());
    }

    #[test]
    fn test_negative_multiplier_is_ignored() {
        let mut c = clock(10.0);
        assert!(!c.set_time_multiplier(-1.0));
        assert_eq!(c.time_multiplier(), 1.0);
    }

    #[test]
    fn test_month_passes_and_accumulator_resets() {
        let mut c = clock(3.0);
        assert_eq!(c.pump(2.0).len(), 1);
        let events = c.pump(2.0);
        assert_eq!(
            events,
            vec![
                ClockEvent::Tick { delta: 2.0 },
                ClockEvent::MonthPassed { month: 2 }
            ]
        );
        assert_eq!(c.current_month(), 2);
        assert_eq!(c.passed_this_month(), 0.0);
    }
}
