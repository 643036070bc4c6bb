//! Monthly camp income.
//!
//! Income has two parts: a success term that grows with the wellbeing of the
//! population, and a need term that grows with its size. Both are logarithmic
//! so a bigger camp earns more, but with diminishing returns.

use serde::{Deserialize, Serialize};

/// Camp statistics feeding the income formula.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CampSnapshot {
    /// Living refugees in the camp.
    pub volume: u32,
    /// Mean wellbeing of the living refugees.
    pub average_wellbeing: f64,
    /// Refugees resettled out of the camp (always 0 for now).
    pub resettled: u32,
}

/// Breakdown of one month's income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyIncome {
    pub success: i64,
    pub need: i64,
}

impl MonthlyIncome {
    pub fn total(&self) -> i64 {
        self.success + self.need
    }
}

/// Compute the month's income.
///
/// - `success_weight`: weight of camp success (0..1)
/// - `need_weight`: weight of camp need (0..1)
/// - `multiplier`: scale, roughly the price of the cheapest building
///
/// Logarithms of non-positive values contribute 0.
pub fn monthly_income(
    snapshot: &CampSnapshot,
    success_weight: f64,
    need_weight: f64,
    multiplier: i64,
) -> MonthlyIncome {
    let success_base =
        snapshot.average_wellbeing * snapshot.volume as f64 + snapshot.resettled as f64;
    let success = success_weight * safe_ln(success_base) * multiplier as f64;
    let need = (need_weight * safe_ln(snapshot.volume as f64) + 1.0) * multiplier as f64;
    MonthlyIncome {
        success: success.round() as i64,
        need: need.round() as i64,
    }
}

fn safe_ln(x: f64) -> f64 {
    if x > 0.0 {
        x.ln()
    } else {
        0.0
    }
}
