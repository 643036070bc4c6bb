//! Pure camp rules for Resilience.
//!
//! This crate holds the rules of the refugee camp that do not depend on an
//! entity store, a clock, or a game engine. Functions take plain data and
//! return results, so they are unit-testable on their own and shared by the
//! simulation crate and the headless harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Camp configuration (clock, vitals, income, events, blueprints) |
//! | [`income`] | Monthly income from camp size and wellbeing |
//! | [`occupancy`] | Crowding classification of houses |
//! | [`odds`] | Random event chance ratchet and weighted selection |
//! | [`stat`] | Bounded integer stats with clamped arithmetic |
//! | [`vitals`] | Stat approach rule and wellbeing mean |

pub mod config;
pub mod income;
pub mod occupancy;
pub mod odds;
pub mod stat;
pub mod vitals;
