//! RESP projection with the basic Canada Education Savings Grant.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::round_cents;

/// CESG matches this share of each year's contribution.
pub const CESG_MATCH_RATE: f64 = 0.20;
/// Annual contribution room that attracts the grant.
pub const CESG_ELIGIBLE_CONTRIBUTION: f64 = 2_500.0;
/// Maximum grant per year.
pub const CESG_ANNUAL_MAX: f64 = 500.0;
/// Lifetime grant limit per beneficiary.
pub const CESG_LIFETIME_MAX: f64 = 7_200.0;
/// Projection ends when the beneficiary turns this age.
pub const PROJECTION_END_AGE: u32 = 18;

/// RESP calculator input.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RespInput {
    #[validate(range(min = 0, max = 17, message = "Child age must be between 0 and 17"))]
    pub child_age: u32,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 10_000_000.0, message = "Balance must be between 0 and 10,000,000"))]
    pub current_balance: f64,

    #[validate(range(min = 0.0, max = 50_000.0, message = "Annual contribution must be between 0 and 50,000"))]
    pub annual_contribution: f64,

    #[validate(range(min = 0.0, max = 20.0, message = "Return must be between 0 and 20 percent"))]
    pub annual_return_percent: f64,

    /// Grants already received, counted against the lifetime limit.
    #[serde(default)]
    #[validate(range(min = 0.0, max = 7_200.0, message = "Grants received must be between 0 and 7,200"))]
    pub grants_received: f64,
}

/// One projection year, ending on the child's birthday `age`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespYear {
    pub age: u32,
    pub contribution: f64,
    pub grant: f64,
    pub balance: f64,
}

/// RESP calculator result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespResult {
    pub years: u32,
    pub final_balance: f64,
    pub total_contributions: f64,
    pub total_grants: f64,
    pub total_growth: f64,
    pub yearly: Vec<RespYear>,
}

/// Grant earned on a single year's contribution given grants already paid.
pub fn annual_grant(contribution: f64, grants_so_far: f64) -> f64 {
    let matched = contribution.min(CESG_ELIGIBLE_CONTRIBUTION) * CESG_MATCH_RATE;
    let room = (CESG_LIFETIME_MAX - grants_so_far).max(0.0);
    matched.min(CESG_ANNUAL_MAX).min(room)
}

/// Projects contributions, grants and growth until the child turns 18.
/// Contributions and grants are deposited at the start of each year.
pub fn calculate(input: &RespInput) -> RespResult {
    let rate = input.annual_return_percent / 100.0;
    let start_age = input.child_age.min(PROJECTION_END_AGE - 1);
    let years = PROJECTION_END_AGE - start_age;

    let mut balance = input.current_balance;
    let mut grants_lifetime = input.grants_received;
    let mut total_contributions = 0.0;
    let mut total_grants = 0.0;
    let mut yearly = Vec::with_capacity(years as usize);

    for age in start_age..PROJECTION_END_AGE {
        let grant = annual_grant(input.annual_contribution, grants_lifetime);
        grants_lifetime += grant;
        total_grants += grant;
        total_contributions += input.annual_contribution;

        balance = (balance + input.annual_contribution + grant) * (1.0 + rate);

        yearly.push(RespYear {
            age: age + 1,
            contribution: round_cents(input.annual_contribution),
            grant: round_cents(grant),
            balance: round_cents(balance),
        });
    }

    let total_growth = balance - input.current_balance - total_contributions - total_grants;

    RespResult {
        years,
        final_balance: round_cents(balance),
        total_contributions: round_cents(total_contributions),
        total_grants: round_cents(total_grants),
        total_growth: round_cents(total_growth),
        yearly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(age: u32, contribution: f64, rate: f64) -> RespInput {
        RespInput {
            child_age: age,
            current_balance: 0.0,
            annual_contribution: contribution,
            annual_return_percent: rate,
            grants_received: 0.0,
        }
    }

    #[test]
    fn test_annual_grant_caps() {
        assert_eq!(annual_grant(1_000.0, 0.0), 200.0);
        assert_eq!(annual_grant(2_500.0, 0.0), 500.0);
        assert_eq!(annual_grant(10_000.0, 0.0), 500.0);
        assert_eq!(annual_grant(2_500.0, 7_000.0), 200.0);
        assert_eq!(annual_grant(2_500.0, 7_200.0), 0.0);
    }

    #[test]
    fn test_lifetime_grant_limit_from_birth() {
        let result = calculate(&input(0, 2_500.0, 0.0));
        assert_eq!(result.years, 18);
        assert_eq!(result.total_contributions, 45_000.0);
        assert_eq!(result.total_grants, 7_200.0);
        assert_eq!(result.final_balance, 52_200.0);
        assert_eq!(result.total_growth, 0.0);
        assert_eq!(result.yearly[14].grant, 200.0);
        assert_eq!(result.yearly[15].grant, 0.0);
    }

    #[test]
    fn test_last_eligible_year() {
        let result = calculate(&input(17, 2_500.0, 0.0));
        assert_eq!(result.years, 1);
        assert_eq!(result.total_grants, 500.0);
        assert_eq!(result.yearly[0].age, 18);
    }

    #[test]
    fn test_growth_compounds_on_grants() {
        let result = calculate(&input(10, 2_000.0, 5.0));
        assert_eq!(result.years, 8);
        assert_eq!(result.total_grants, 3_200.0);
        assert!(result.total_growth > 0.0);
        let sum = result.total_contributions + result.total_grants + result.total_growth;
        assert!((sum - result.final_balance).abs() < 0.02);
    }

    #[test]
    fn test_prior_grants_count_against_limit() {
        let mut resp = input(5, 2_500.0, 0.0);
        resp.grants_received = 6_000.0;
        let result = calculate(&resp);
        assert_eq!(result.total_grants, 1_200.0);
    }

    #[test]
    fn test_validation() {
        assert!(input(3, 2_500.0, 5.0).validate().is_ok());
        assert!(input(18, 2_500.0, 5.0).validate().is_err());
        assert!(input(3, -10.0, 5.0).validate().is_err());
        assert!(input(3, 2_500.0, 25.0).validate().is_err());
    }
}
