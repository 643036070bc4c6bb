//! Reception system - processes arrivals one at a time
//!
//! New refugees queue at the reception center. The refugee at the front is
//! processed after `time_to_process` of tick time and then handed to housing.

use std::collections::VecDeque;

use hecs::Entity;
use resilience_logic::config::ReceptionConfig;

#[derive(Debug, Clone)]
pub struct ReceptionCenter {
    time_to_process: f32,
    queue: VecDeque<Entity>,
    /// Refugee currently at the desk.
    current: Option<Entity>,
    progress: f32,
}

impl ReceptionCenter {
    pub fn new(config: &ReceptionConfig) -> Self {
        Self {
            time_to_process: config.time_to_process.max(0.0),
            queue: VecDeque::new(),
            current: None,
            progress: 0.0,
        }
    }

    pub fn enqueue(&mut self, refugee: Entity) {
        self.queue.push_back(refugee);
    }

    /// Refugees waiting, including the one being processed.
    pub fn waiting(&self) -> usize {
        self.queue.len() + usize::from(self.current.is_some())
    }

    pub fn is_idle(&self) -> bool {
        self.waiting() == 0
    }

    /// Drop a refugee from the line (e.g. on death). Returns true if found.
    pub fn withdraw(&mut self, refugee: Entity) -> bool {
        if self.current == Some(refugee) {
            self.current = None;
            self.progress = 0.0;
            return true;
        }
        let before = self.queue.len();
        self.queue.retain(|&r| r != refugee);
        self.queue.len() != before
    }

    /// Spend `delta` of tick time at the desk. Returns the refugees whose
    /// processing finished, in queue order.
    pub fn advance(&mut self, delta: f32) -> Vec<Entity> {
        let mut processed = Vec::new();
        if self.current.is_none() {
            self.current = self.queue.pop_front();
            self.progress = 0.0;
        }
        if self.current.is_none() {
            return processed;
        }

        self.progress += delta;
        while let Some(refugee) = self.current {
            if self.progress < self.time_to_process {
                break;
            }
            processed.push(refugee);
            self.progress -= self.time_to_process;
            self.current = self.queue.pop_front();
        }
        if self.current.is_none() {
            self.progress = 0.0;
        }
        processed
    }
}
