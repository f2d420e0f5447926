use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::time_value::checked_product;
use crate::types::*;
use crate::{CalcError, CalcResult};

pub const DEFAULT_EMPLOYEE_RATE: Rate = dec!(0.11);
pub const EMPLOYER_RATE_LOWER_WAGE: Rate = dec!(0.13);
pub const EMPLOYER_RATE_HIGHER_WAGE: Rate = dec!(0.12);
/// Monthly wage at or below which the higher employer share applies.
pub const EMPLOYER_RATE_WAGE_THRESHOLD: Money = dec!(5000);

const RETIREMENT_SHARE: Rate = dec!(0.75);
const WELLBEING_SHARE: Rate = dec!(0.15);
const FLEXIBLE_SHARE: Rate = dec!(0.10);
const MAX_AGE: u32 = 100;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpfProjectionInput {
    pub current_age: u32,
    pub retirement_age: u32,
    #[serde(default)]
    pub current_balance: Money,
    pub monthly_salary: Money,
    /// Defaults to 11%.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_rate: Option<Rate>,
    /// Defaults to 13% up to RM5,000 a month and 12% above, re-evaluated as
    /// the salary grows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employer_rate: Option<Rate>,
    /// Yearly salary growth (0.03 = 3%).
    #[serde(default)]
    pub annual_increment: Rate,
    /// Declared dividend (0.055 = 5.5%).
    pub dividend_rate: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpfYear {
    pub age: u32,
    pub opening_balance: Money,
    pub monthly_salary: Money,
    pub contributions: Money,
    pub dividend: Money,
    pub closing_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSplit {
    pub retirement_account: Money,
    pub wellbeing_account: Money,
    pub flexible_account: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpfProjectionResult {
    pub years: Vec<EpfYear>,
    pub final_balance: Money,
    pub total_contributions: Money,
    pub total_dividends: Money,
    pub account_split: AccountSplit,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project an EPF balance to retirement.
///
/// Contributions arrive evenly through the year, so on average they earn half
/// a year's dividend: dividend = (opening + contributions / 2) · rate.
pub fn project_epf(
    input: &EpfProjectionInput,
) -> CalcResult<ComputationOutput<EpfProjectionResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let employee_rate = input.employee_rate.unwrap_or(DEFAULT_EMPLOYEE_RATE);
    let mut salary = input.monthly_salary;
    let mut balance = input.current_balance;
    let mut total_contributions = Decimal::ZERO;
    let mut total_dividends = Decimal::ZERO;
    let mut years = Vec::with_capacity((input.retirement_age - input.current_age) as usize);

    for age in input.current_age..input.retirement_age {
        let employer_rate = input.employer_rate.unwrap_or_else(|| default_employer_rate(salary));
        let opening = balance;
        let contributions = checked_product(
            salary,
            dec!(12) * (employee_rate + employer_rate),
            "EPF contributions",
        )?;
        let credited = checked_sum(opening, contributions / dec!(2), "EPF dividend base")?;
        let dividend = checked_product(credited, input.dividend_rate, "EPF dividend")?;
        balance = checked_sum(
            checked_sum(opening, contributions, "EPF balance")?,
            dividend,
            "EPF balance",
        )?;

        total_contributions = checked_sum(total_contributions, contributions, "EPF contributions")?;
        total_dividends = checked_sum(total_dividends, dividend, "EPF dividends")?;
        years.push(EpfYear {
            age,
            opening_balance: opening,
            monthly_salary: salary,
            contributions,
            dividend,
            closing_balance: balance,
        });

        salary = checked_product(salary, Decimal::ONE + input.annual_increment, "EPF salary")?;
    }

    if input.monthly_salary.is_zero() {
        warnings.push("No salary: balance grows by dividends only".into());
    }

    let output = EpfProjectionResult {
        years,
        final_balance: balance,
        total_contributions,
        total_dividends,
        account_split: AccountSplit {
            retirement_account: balance * RETIREMENT_SHARE,
            wellbeing_account: balance * WELLBEING_SHARE,
            flexible_account: balance * FLEXIBLE_SHARE,
        },
    };

    let elapsed_us = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "EPF retirement projection (annual dividend, mid-year contributions)",
        &serde_json::json!({
            "employee_rate": employee_rate.to_string(),
            "employer_rate": input.employer_rate.map(|r| r.to_string()),
            "annual_increment": input.annual_increment.to_string(),
            "dividend_rate": input.dividend_rate.to_string(),
        }),
        warnings,
        elapsed_us,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn default_employer_rate(monthly_salary: Money) -> Rate {
    if monthly_salary <= EMPLOYER_RATE_WAGE_THRESHOLD {
        EMPLOYER_RATE_LOWER_WAGE
    } else {
        EMPLOYER_RATE_HIGHER_WAGE
    }
}

fn validate_input(input: &EpfProjectionInput) -> CalcResult<()> {
    if input.retirement_age <= input.current_age {
        return Err(CalcError::invalid(
            "retirement_age",
            "Retirement age must be after the current age",
        ));
    }
    if input.retirement_age > MAX_AGE {
        return Err(CalcError::invalid(
            "retirement_age",
            format!("Retirement age cannot exceed {MAX_AGE}"),
        ));
    }
    if input.current_balance < Decimal::ZERO {
        return Err(CalcError::invalid("current_balance", "Balance cannot be negative"));
    }
    if input.monthly_salary < Decimal::ZERO {
        return Err(CalcError::invalid("monthly_salary", "Salary cannot be negative"));
    }
    for (field, rate) in [
        ("employee_rate", input.employee_rate),
        ("employer_rate", input.employer_rate),
        ("dividend_rate", Some(input.dividend_rate)),
    ] {
        if let Some(r) = rate {
            if r < Decimal::ZERO || r > Decimal::ONE {
                return Err(CalcError::invalid(field, "Rate must be in [0, 1]"));
            }
        }
    }
    if input.annual_increment < Decimal::ZERO || input.annual_increment > Decimal::ONE {
        return Err(CalcError::invalid(
            "annual_increment",
            "Salary increment must be in [0, 1]",
        ));
    }
    Ok(())
}

fn checked_sum(a: Decimal, b: Decimal, context: &str) -> CalcResult<Decimal> {
    a.checked_add(b).ok_or_else(|| CalcError::Overflow {
        context: context.into(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
