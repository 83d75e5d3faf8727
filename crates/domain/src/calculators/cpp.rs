//! CPP retirement pension start-age comparison.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::round_cents;

/// Maximum monthly CPP retirement pension at 65 for 2022.
pub const MAX_MONTHLY_AT_65_2022: f64 = 1_253.59;
/// Permanent reduction per month started before 65.
pub const EARLY_REDUCTION_PER_MONTH: f64 = 0.006;
/// Permanent increase per month deferred after 65.
pub const LATE_INCREASE_PER_MONTH: f64 = 0.007;
pub const STANDARD_AGE: u32 = 65;

fn default_monthly_at_65() -> f64 {
    MAX_MONTHLY_AT_65_2022
}

fn default_life_expectancy() -> u32 {
    85
}

/// CPP calculator input.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "snake_case")]
#[validate(schema(function = "validate_cpp_input", skip_on_field_errors = true))]
pub struct CppInput {
    #[validate(range(min = 60, max = 70, message = "Start age must be between 60 and 70"))]
    pub start_age: u32,

    #[serde(default = "default_monthly_at_65")]
    #[validate(range(min = 0.0, max = 5_000.0, message = "Monthly amount at 65 must be between 0 and 5,000"))]
    pub monthly_at_65: f64,

    #[serde(default = "default_life_expectancy")]
    #[validate(range(min = 60, max = 110, message = "Life expectancy must be between 60 and 110"))]
    pub life_expectancy: u32,
}

fn validate_cpp_input(input: &CppInput) -> Result<(), ValidationError> {
    if input.life_expectancy < input.start_age {
        let mut err = ValidationError::new("life_expectancy");
        err.message = Some("Life expectancy cannot be before the start age".into());
        return Err(err);
    }
    Ok(())
}

/// Benefit figures for one start age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CppScenario {
    pub start_age: u32,
    pub adjustment_percent: f64,
    pub monthly_benefit: f64,
    pub annual_benefit: f64,
    pub lifetime_total: f64,
}

/// CPP calculator result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CppResult {
    pub selected: CppScenario,
    pub at_65: CppScenario,
    /// Selected lifetime total minus the start-at-65 lifetime total.
    pub lifetime_difference: f64,
}

/// Adjustment factor relative to the age-65 amount, e.g. `-0.36` at 60.
pub fn adjustment_factor(start_age: u32) -> f64 {
    let months = (start_age as i64 - STANDARD_AGE as i64) * 12;
    if months < 0 {
        months as f64 * EARLY_REDUCTION_PER_MONTH
    } else {
        months as f64 * LATE_INCREASE_PER_MONTH
    }
}

fn scenario(start_age: u32, monthly_at_65: f64, life_expectancy: u32) -> CppScenario {
    let factor = adjustment_factor(start_age);
    let monthly = monthly_at_65 * (1.0 + factor);
    let years_paid = life_expectancy.saturating_sub(start_age);

    CppScenario {
        start_age,
        adjustment_percent: (factor * 1000.0).round() / 10.0,
        monthly_benefit: round_cents(monthly),
        annual_benefit: round_cents(monthly * 12.0),
        lifetime_total: round_cents(monthly * 12.0 * years_paid as f64),
    }
}

/// Compares the chosen start age against starting at 65.
pub fn calculate(input: &CppInput) -> CppResult {
    let selected = scenario(input.start_age, input.monthly_at_65, input.life_expectancy);
    let at_65 = scenario(STANDARD_AGE, input.monthly_at_65, input.life_expectancy);
    let lifetime_difference = round_cents(selected.lifetime_total - at_65.lifetime_total);

    CppResult {
        selected,
        at_65,
        lifetime_difference,
    }
}
