pub mod flat_rate;
pub mod payoff;
pub mod reducing;

use rust_decimal::Decimal;

use crate::time_value::validate_rate_and_tenure;
use crate::types::{LoanParameters, Money, Percent, Years};
use crate::{CalcError, CalcResult};

pub(crate) const MONTHS_PER_YEAR: u32 = 12;

/// Reject non-positive principal or tenure and negative rates.
pub(crate) fn validate_terms(
    principal: Money,
    annual_rate_percent: Percent,
    tenure_years: u32,
) -> CalcResult<()> {
    if principal <= Decimal::ZERO {
        return Err(CalcError::invalid("principal", "Principal must be positive"));
    }
    validate_rate_and_tenure(annual_rate_percent, tenure_years)
}

/// Elapsed time must satisfy 0 <= elapsed < tenure.
pub(crate) fn validate_elapsed(elapsed_years: Years, tenure_years: u32) -> CalcResult<()> {
    if elapsed_years < Decimal::ZERO {
        return Err(CalcError::invalid(
            "elapsed_years",
            "Elapsed years cannot be negative",
        ));
    }
    if elapsed_years >= Decimal::from(tenure_years) {
        return Err(CalcError::invalid(
            "elapsed_years",
            format!("Elapsed years must be less than the {tenure_years}-year tenure"),
        ));
    }
    Ok(())
}

/// Validate a full parameter set, returning the elapsed years (0 when unset).
pub(crate) fn validate_loan(params: &LoanParameters) -> CalcResult<Years> {
    validate_terms(
        params.principal,
        params.annual_rate_percent,
        params.tenure_years,
    )?;
    let elapsed = params.elapsed_years.unwrap_or(Decimal::ZERO);
    validate_elapsed(elapsed, params.tenure_years)?;
    Ok(elapsed)
}

pub(crate) fn total_months(tenure_years: u32) -> u32 {
    tenure_years * MONTHS_PER_YEAR
}

pub(crate) fn years_to_months(years: Years) -> Decimal {
    years * Decimal::from(MONTHS_PER_YEAR)
}
