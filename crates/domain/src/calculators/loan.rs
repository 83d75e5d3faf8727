//! Fixed-payment loan amortization.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::round_cents;

fn default_payments_per_year() -> u32 {
    12
}

/// Loan calculator input.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct LoanInput {
    #[validate(
        custom(function = "shared::validation::validate_positive"),
        range(max = 100_000_000.0, message = "Amount must be at most 100,000,000")
    )]
    pub amount: f64,

    #[validate(range(min = 0.0, max = 100.0, message = "Rate must be between 0 and 100 percent"))]
    pub annual_rate_percent: f64,

    #[validate(range(min = 1, max = 50, message = "Term must be between 1 and 50 years"))]
    pub term_years: u32,

    #[serde(default = "default_payments_per_year")]
    #[validate(custom(function = "validate_payments_per_year"))]
    pub payments_per_year: u32,
}

/// Monthly, bi-weekly or weekly payments.
pub fn validate_payments_per_year(value: u32) -> Result<(), ValidationError> {
    if matches!(value, 12 | 26 | 52) {
        Ok(())
    } else {
        let mut err = ValidationError::new("payments_per_year");
        err.message = Some("Payments per year must be 12, 26 or 52".into());
        Err(err)
    }
}

/// One row of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub balance: f64,
}

/// Totals for one year of the loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanYearSummary {
    pub year: u32,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub ending_balance: f64,
}

/// Loan calculator result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanResult {
    pub payment: f64,
    pub periods: u32,
    pub total_interest: f64,
    pub total_paid: f64,
    pub schedule: Vec<AmortizationRow>,
    pub yearly: Vec<LoanYearSummary>,
}

/// Payment that retires `principal` over `periods` at periodic rate `rate`.
pub fn periodic_payment(principal: f64, rate: f64, periods: u32) -> f64 {
    if periods == 0 {
        return 0.0;
    }
    if rate == 0.0 {
        return principal / periods as f64;
    }
    principal * rate / (1.0 - (1.0 + rate).powi(-(periods as i32)))
}

/// Builds the full amortization schedule.
///
/// Internal arithmetic is unrounded; the final period pays off whatever balance
/// remains so the schedule always closes at zero.
pub fn calculate(input: &LoanInput) -> LoanResult {
    let per_year = input.payments_per_year.max(1);
    let periods = input.term_years * per_year;
    let rate = input.annual_rate_percent / 100.0 / per_year as f64;
    let payment = periodic_payment(input.amount, rate, periods);

    let mut balance = input.amount;
    let mut total_interest = 0.0;
    let mut schedule = Vec::with_capacity(periods as usize);
    let mut yearly = Vec::with_capacity(input.term_years as usize);
    let mut year_principal = 0.0;
    let mut year_interest = 0.0;

    for period in 1..=periods {
        let interest = balance * rate;
        let principal = if period == periods {
            balance
        } else {
            payment - interest
        };
        balance -= principal;
        if period == periods {
            balance = 0.0;
        }

        total_interest += interest;
        year_principal += principal;
        year_interest += interest;

        schedule.push(AmortizationRow {
            period,
            payment: round_cents(principal + interest),
            principal: round_cents(principal),
            interest: round_cents(interest),
            balance: round_cents(balance.max(0.0)),
        });

        if period % per_year == 0 {
            yearly.push(LoanYearSummary {
                year: period / per_year,
                principal_paid: round_cents(year_principal),
                interest_paid: round_cents(year_interest),
                ending_balance: round_cents(balance.max(0.0)),
            });
            year_principal = 0.0;
            year_interest = 0.0;
        }
    }

    LoanResult {
        payment: round_cents(payment),
        periods,
        total_interest: round_cents(total_interest),
        total_paid: round_cents(input.amount + total_interest),
        schedule,
        yearly,
    }
}

/// Renders the schedule as CSV for the lead confirmation attachment.
pub fn schedule_csv(result: &LoanResult) -> String {
    let mut csv = String::from("period,payment,principal,interest,balance\n");
    for row in &result.schedule {
        csv.push_str(&format!(
            "{},{:.2},{:.2},{:.2},{:.2}\n",
            row.period, row.payment, row.principal, row.interest, row.balance
        ));
    }
    csv
}
