//! Savings growth with monthly compounding.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::round_cents;

/// Savings calculator input.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SavingsInput {
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100_000_000.0, message = "Initial deposit must be between 0 and 100,000,000"))]
    pub initial: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 1_000_000.0, message = "Monthly contribution must be between 0 and 1,000,000"))]
    pub monthly_contribution: f64,

    #[validate(range(min = 0.0, max = 50.0, message = "Return must be between 0 and 50 percent"))]
    pub annual_return_percent: f64,

    #[validate(range(min = 1, max = 60, message = "Years must be between 1 and 60"))]
    pub years: u32,
}

/// Balance at the end of one projection year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsYear {
    pub year: u32,
    pub contributions: f64,
    pub growth: f64,
    pub balance: f64,
}

/// Savings calculator result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsResult {
    pub final_balance: f64,
    pub total_contributions: f64,
    pub total_growth: f64,
    pub yearly: Vec<SavingsYear>,
}

/// Projects the balance month by month. Contributions land at month end,
/// after that month's interest.
pub fn calculate(input: &SavingsInput) -> SavingsResult {
    let monthly_rate = input.annual_return_percent / 100.0 / 12.0;
    let mut balance = input.initial;
    let mut contributions = input.initial;
    let mut yearly = Vec::with_capacity(input.years as usize);

    for year in 1..=input.years {
        for _ in 0..12 {
            balance += balance * monthly_rate;
            balance += input.monthly_contribution;
            contributions += input.monthly_contribution;
        }

        yearly.push(SavingsYear {
            year,
            contributions: round_cents(contributions),
            growth: round_cents(balance - contributions),
            balance: round_cents(balance),
        });
    }

    SavingsResult {
        final_balance: round_cents(balance),
        total_contributions: round_cents(contributions),
        total_growth: round_cents(balance - contributions),
        yearly,
    }
}
