use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{total_months, validate_elapsed, validate_terms, years_to_months};
use crate::time_value::solve_periodic_rate;
use crate::types::*;
use crate::{CalcError, CalcResult};

/// Hire-purchase tenures above this draw a warning on the car loan calculator.
const MAX_HIRE_PURCHASE_YEARS: u32 = 9;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleLoanInput {
    pub vehicle_price: Money,
    /// Down payment as a percentage of the price (10 = 10%).
    #[serde(default)]
    pub down_payment_percent: Percent,
    pub flat_rate_percent: Percent,
    pub tenure_years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleLoanOutput {
    pub down_payment: Money,
    pub financed_amount: Money,
    pub amortization: AmortizationResult,
    /// Reducing-balance rate that yields the same instalment.
    pub effective_annual_rate_percent: Percent,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Flat-rate (simple interest) amortization for vehicle and personal loans.
///
/// Interest is charged on the original principal for the whole term, so the
/// balance at any point is the unpaid fraction of principal plus interest:
/// `remaining_months / total_months · (principal + total_interest)`.
/// `params.annual_rate_percent` is not consulted; flat-rate loans are quoted
/// by `flat_rate_percent` alone.
pub fn compute_flat_rate_amortization(
    params: &LoanParameters,
    flat_rate_percent: Percent,
) -> CalcResult<ComputationOutput<AmortizationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let output = flat_rate_result(params, flat_rate_percent, &mut warnings)?;

    let elapsed_us = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Flat-rate amortization (interest on original principal, proportional balance)",
        &serde_json::json!({
            "principal": params.principal.to_string(),
            "flat_rate_percent": flat_rate_percent.to_string(),
            "tenure_years": params.tenure_years,
            "elapsed_years": params.elapsed_years.unwrap_or(Decimal::ZERO).to_string(),
        }),
        warnings,
        elapsed_us,
        output,
    ))
}

/// Effective annual rate (reducing-balance equivalent, in percent) of a
/// flat-rate loan.
pub fn effective_annual_rate(
    principal: Money,
    flat_rate_percent: Percent,
    tenure_years: u32,
) -> CalcResult<Percent> {
    validate_terms(principal, flat_rate_percent, tenure_years)?;
    let n = total_months(tenure_years);
    let interest = flat_total_interest(principal, flat_rate_percent, tenure_years);
    let payment = (principal + interest) / Decimal::from(n);
    let periodic = solve_periodic_rate(principal, payment, n)?;
    Ok(periodic * dec!(12) * dec!(100))
}

/// Car loan: down payment, financed amount, flat-rate instalment and the
/// equivalent effective rate.
pub fn compute_vehicle_loan(
    input: &VehicleLoanInput,
) -> CalcResult<ComputationOutput<VehicleLoanOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.vehicle_price <= Decimal::ZERO {
        return Err(CalcError::invalid(
            "vehicle_price",
            "Vehicle price must be positive",
        ));
    }
    if input.down_payment_percent < Decimal::ZERO || input.down_payment_percent >= dec!(100) {
        return Err(CalcError::invalid(
            "down_payment_percent",
            "Down payment must be at least 0% and below 100%",
        ));
    }
    if input.tenure_years > MAX_HIRE_PURCHASE_YEARS {
        warnings.push(format!(
            "Tenure of {} years exceeds the usual {MAX_HIRE_PURCHASE_YEARS}-year hire-purchase limit",
            input.tenure_years
        ));
    }

    let down_payment = input.vehicle_price * input.down_payment_percent / dec!(100);
    let financed_amount = input.vehicle_price - down_payment;
    let params = LoanParameters {
        principal: financed_amount,
        annual_rate_percent: input.flat_rate_percent,
        tenure_years: input.tenure_years,
        elapsed_years: None,
    };
    let amortization = flat_rate_result(&params, input.flat_rate_percent, &mut warnings)?;
    let effective = effective_annual_rate(
        financed_amount,
        input.flat_rate_percent,
        input.tenure_years,
    )?;

    let output = VehicleLoanOutput {
        down_payment,
        financed_amount,
        amortization,
        effective_annual_rate_percent: effective,
    };

    let elapsed_us = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Vehicle hire-purchase (flat rate)",
        &serde_json::json!({
            "vehicle_price": input.vehicle_price.to_string(),
            "down_payment_percent": input.down_payment_percent.to_string(),
            "flat_rate_percent": input.flat_rate_percent.to_string(),
            "tenure_years": input.tenure_years,
        }),
        warnings,
        elapsed_us,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

pub(crate) fn flat_total_interest(
    principal: Money,
    flat_rate_percent: Percent,
    tenure_years: u32,
) -> Money {
    principal * (flat_rate_percent / dec!(100)) * Decimal::from(tenure_years)
}

fn flat_rate_result(
    params: &LoanParameters,
    flat_rate_percent: Percent,
    warnings: &mut Vec<String>,
) -> CalcResult<AmortizationResult> {
    validate_terms(params.principal, flat_rate_percent, params.tenure_years)?;
    let elapsed = params.elapsed_years.unwrap_or(Decimal::ZERO);
    validate_elapsed(elapsed, params.tenure_years)?;

    if flat_rate_percent.is_zero() {
        warnings.push("Zero flat rate: principal is repaid in equal instalments".into());
    }

    let n = total_months(params.tenure_years);
    let total_interest = flat_total_interest(params.principal, flat_rate_percent, params.tenure_years);
    let total_repayment = params.principal + total_interest;
    let remaining_months = Decimal::from(n) - years_to_months(elapsed);

    Ok(AmortizationResult {
        monthly_payment: total_repayment / Decimal::from(n),
        outstanding_balance: remaining_months / Decimal::from(n) * total_repayment,
        total_interest,
        total_repayment,
        total_months: n,
        remaining_months,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn car_loan() -> LoanParameters {
        LoanParameters {
            principal: dec!(80_000),
            annual_rate_percent: Decimal::ZERO,
            tenure_years: 7,
            elapsed_years: None,
        }
    }

    #[test]
    fn test_car_loan_known_answer() {
        let out = compute_flat_rate_amortization(&car_loan(), dec!(3)).unwrap();
        let r = &out.result;
        assert_eq!(r.total_interest, dec!(16_800));
        assert_eq!(r.total_repayment, dec!(96_800));
        assert!((r.monthly_payment - dec!(1152.38)).abs() < dec!(0.01));
        assert_eq!(r.outstanding_balance, dec!(96_800));
    }

    #[test]
    fn test_proportional_balance() {
        let mut params = car_loan();
        params.elapsed_years = Some(dec!(3));
        let r = compute_flat_rate_amortization(&params, dec!(3)).unwrap().result;
        // 48 of 84 months remain
        assert_eq!(r.remaining_months, dec!(48));
        assert_eq!(r.outstanding_balance, dec!(48) / dec!(84) * dec!(96_800));
    }

    #[test]
    fn test_annual_rate_field_ignored() {
        let mut params = car_loan();
        params.annual_rate_percent = dec!(9);
        let r = compute_flat_rate_amortization(&params, dec!(3)).unwrap().result;
        assert_eq!(r.total_interest, dec!(16_800));
    }

    #[test]
    fn test_elapsed_at_tenure_rejected() {
        let mut params = car_loan();
        params.elapsed_years = Some(dec!(7));
        assert!(compute_flat_rate_amortization(&params, dec!(3)).is_err());
    }

    #[test]
    fn test_effective_rate_exceeds_flat() {
        // A 3% flat rate over 7 years is roughly 5.5% effective.
        let eff = effective_annual_rate(dec!(80_000), dec!(3), 7).unwrap();
        assert!(eff > dec!(5.3) && eff < dec!(5.7), "effective rate {eff}");
    }

    #[test]
    fn test_effective_rate_zero_flat() {
        assert_eq!(effective_annual_rate(dec!(80_000), Decimal::ZERO, 7).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_vehicle_loan_down_payment() {
        let input = VehicleLoanInput {
            vehicle_price: dec!(100_000),
            down_payment_percent: dec!(10),
            flat_rate_percent: dec!(3),
            tenure_years: 9,
        };
        let out = compute_vehicle_loan(&input).unwrap();
        let r = &out.result;
        assert_eq!(r.down_payment, dec!(10_000));
        assert_eq!(r.financed_amount, dec!(90_000));
        assert_eq!(r.amortization.total_interest, dec!(24_300));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_vehicle_loan_long_tenure_warns() {
        let input = VehicleLoanInput {
            vehicle_price: dec!(100_000),
            down_payment_percent: dec!(10),
            flat_rate_percent: dec!(3),
            tenure_years: 10,
        };
        let out = compute_vehicle_loan(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_vehicle_loan_full_down_payment_rejected() {
        let input = VehicleLoanInput {
            vehicle_price: dec!(100_000),
            down_payment_percent: dec!(100),
            flat_rate_percent: dec!(3),
            tenure_years: 5,
        };
        let err = compute_vehicle_loan(&input).unwrap_err();
        match err {
            CalcError::InvalidParameter { field, .. } => assert_eq!(field, "down_payment_percent"),
            other => panic!("Expected InvalidParameter, got {other:?}"),
        }
    }
}
