//! Federal marginal tax bracket lookup (Canada, 2022 tax year).

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{format_dollars, round_cents};

/// A bracket: income up to and including `upper` is taxed at `rate`.
/// The top bracket has no upper bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub upper: Option<f64>,
    pub rate: f64,
}

/// 2022 federal brackets.
pub const FEDERAL_BRACKETS_2022: [Bracket; 5] = [
    Bracket { upper: Some(50_197.0), rate: 0.15 },
    Bracket { upper: Some(100_392.0), rate: 0.205 },
    Bracket { upper: Some(155_625.0), rate: 0.26 },
    Bracket { upper: Some(221_708.0), rate: 0.29 },
    Bracket { upper: None, rate: 0.33 },
];

/// 2022 federal basic personal amount, credited at the lowest rate.
pub const BASIC_PERSONAL_AMOUNT_2022: f64 = 14_398.0;

/// Tax calculator input.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct TaxInput {
    #[validate(range(min = 0.0, max = 100_000_000.0, message = "Income must be between 0 and 100,000,000"))]
    pub annual_income: f64,
}

/// Tax owed within one bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketTax {
    pub bracket: String,
    pub rate_percent: f64,
    pub taxable_in_bracket: f64,
    pub tax: f64,
}

/// Tax calculator result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxResult {
    pub marginal_rate_percent: f64,
    pub bracket: String,
    pub gross_tax: f64,
    pub basic_personal_credit: f64,
    pub federal_tax: f64,
    pub average_rate_percent: f64,
    pub breakdown: Vec<BracketTax>,
}

/// Human readable label for a bracket index: `"$50,198 - $100,392"`, `"$221,709 and up"`.
pub fn bracket_label(index: usize) -> String {
    let lower = if index == 0 {
        0.0
    } else {
        FEDERAL_BRACKETS_2022[index - 1].upper.unwrap_or(0.0) + 1.0
    };

    match FEDERAL_BRACKETS_2022[index].upper {
        Some(upper) => format!("{} - {}", format_dollars(lower), format_dollars(upper)),
        None => format!("{} and up", format_dollars(lower)),
    }
}

/// Index of the bracket containing `income`. Upper bounds are inclusive.
pub fn bracket_index(income: f64) -> usize {
    FEDERAL_BRACKETS_2022
        .iter()
        .position(|b| b.upper.map_or(true, |upper| income <= upper))
        .unwrap_or(FEDERAL_BRACKETS_2022.len() - 1)
}

fn rate_percent(rate: f64) -> f64 {
    (rate * 1000.0).round() / 10.0
}

/// Looks up the marginal bracket and computes progressive federal tax.
pub fn calculate(input: &TaxInput) -> TaxResult {
    let income = input.annual_income.max(0.0);
    let index = bracket_index(income);

    let mut lower = 0.0;
    let mut gross_tax = 0.0;
    let mut breakdown = Vec::new();

    for (i, bracket) in FEDERAL_BRACKETS_2022.iter().enumerate() {
        if income <= lower {
            break;
        }
        let top = bracket.upper.map_or(income, |upper| income.min(upper));
        let taxable = top - lower;
        let tax = taxable * bracket.rate;
        gross_tax += tax;

        breakdown.push(BracketTax {
            bracket: bracket_label(i),
            rate_percent: rate_percent(bracket.rate),
            taxable_in_bracket: round_cents(taxable),
            tax: round_cents(tax),
        });

        match bracket.upper {
            Some(upper) => lower = upper,
            None => break,
        }
    }

    let credit = BASIC_PERSONAL_AMOUNT_2022.min(income) * FEDERAL_BRACKETS_2022[0].rate;
    let federal_tax = (gross_tax - credit).max(0.0);
    let average_rate_percent = if income > 0.0 {
        (federal_tax / income * 10_000.0).round() / 100.0
    } else {
        0.0
    };

    TaxResult {
        marginal_rate_percent: rate_percent(FEDERAL_BRACKETS_2022[index].rate),
        bracket: bracket_label(index),
        gross_tax: round_cents(gross_tax),
        basic_personal_credit: round_cents(credit),
        federal_tax: round_cents(federal_tax),
        average_rate_percent,
        breakdown,
    }
}
