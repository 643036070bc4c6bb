//! Tick-time waits.
//!
//! Each timer is a `(remaining, payload)` record counted down by the tick
//! delta. A timer fires on the first advance that brings `remaining` to zero
//! or below. Cancelling drops the record; nothing already fired is undone.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer<T> {
    id: TimerId,
    remaining: f32,
    payload: T,
}

#[derive(Debug, Clone)]
pub struct TickScheduler<T> {
    next_id: u64,
    timers: Vec<Timer<T>>,
}

impl<T> TickScheduler<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            timers: Vec::new(),
        }
    }

    /// Fire `payload` after `ticks` of tick time.
    pub fn schedule(&mut self, ticks: f32, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            remaining: ticks.max(0.0),
            payload,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let i = self.timers.iter().position(|t| t.id == id)?;
        Some(self.timers.remove(i).payload)
    }

    pub fn remaining(&self, id: TimerId) -> Option<f32> {
        self.timers.iter().find(|t| t.id == id).map(|t| t.remaining)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Count every timer down by `delta`; return the payloads that fired,
    /// in scheduling order.
    pub fn advance(&mut self, delta: f32) -> Vec<T> {
        let mut fired = Vec::new();
        let mut waiting = Vec::with_capacity(self.timers.len());
        for mut timer in self.timers.drain(..) {
            timer.remaining -= delta;
            if timer.remaining <= 0.0 {
                fired.push(timer.payload);
            } else {
                waiting.push(timer);
            }
        }
        self.timers = waiting;
        fired
    }
}

impl<T> Default for TickScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
