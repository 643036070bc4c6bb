//! Camp treasury.
//!
//! Funds only move through [`Treasury::spend`] (building costs, which must be
//! affordable) and [`Treasury::deposit`] (monthly income and event grants,
//! which may be negative and can push the balance below zero).

use log::debug;
use resilience_logic::income::{monthly_income, CampSnapshot, MonthlyIncome};
use resilience_logic::config::IncomeConfig;

#[derive(Debug, Clone)]
pub struct Treasury {
    funds: i64,
    config: IncomeConfig,
}

impl Treasury {
    pub fn new(config: IncomeConfig) -> Self {
        Self {
            funds: config.starting_funds,
            config,
        }
    }

    pub fn funds(&self) -> i64 {
        self.funds
    }

    pub fn can_spend(&self, amount: i64) -> bool {
        amount <= self.funds
    }

    /// Deduct `amount` if affordable. Returns false and leaves funds alone otherwise.
    pub fn spend(&mut self, amount: i64) -> bool {
        if !self.can_spend(amount) {
            return false;
        }
        self.funds -= amount;
        debug!("spent {}, {} left", amount, self.funds);
        true
    }

    pub fn deposit(&mut self, amount: i64) {
        self.funds = self.funds.saturating_add(amount);
    }

    /// Compute and deposit the month's income.
    pub fn collect_monthly_income(&mut self, snapshot: &CampSnapshot) -> MonthlyIncome {
        let income = monthly_income(
            snapshot,
            self.config.success_weight,
            self.config.need_weight,
            self.config.multiplier,
        );
        self.deposit(income.total());
        income
    }
}
