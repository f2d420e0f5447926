use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{total_months, validate_loan, validate_terms, years_to_months, MONTHS_PER_YEAR};
use crate::time_value::{annuity_payment, monthly_rate, remaining_balance};
use crate::types::*;
use crate::{CalcError, CalcResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// One year of a reducing-balance repayment schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulePeriod {
    pub year: u32,
    pub opening_balance: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub closing_balance: Money,
    pub cumulative_interest: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub monthly_payment: Money,
    pub periods: Vec<SchedulePeriod>,
    pub total_interest: Money,
    pub total_principal: Money,
}

// ---------------------------------------------------------------------------
// Scalar routines
// ---------------------------------------------------------------------------

/// Level monthly instalment for a reducing-balance (annuity) loan.
pub fn monthly_payment(
    principal: Money,
    annual_rate_percent: Percent,
    tenure_years: u32,
) -> CalcResult<Money> {
    validate_terms(principal, annual_rate_percent, tenure_years)?;
    annuity_payment(
        principal,
        monthly_rate(annual_rate_percent),
        total_months(tenure_years),
    )
}

/// Balance still owed after `elapsed_years` of instalments.
///
/// Accepts the closed range `[0, tenure]`: at `elapsed == tenure` the loan is
/// fully repaid and the result is zero up to rounding.
pub fn outstanding_balance(
    principal: Money,
    annual_rate_percent: Percent,
    tenure_years: u32,
    elapsed_years: Years,
) -> CalcResult<Money> {
    validate_terms(principal, annual_rate_percent, tenure_years)?;
    if elapsed_years < Decimal::ZERO || elapsed_years > Decimal::from(tenure_years) {
        return Err(CalcError::invalid(
            "elapsed_years",
            format!("Elapsed years must lie within [0, {tenure_years}]"),
        ));
    }
    remaining_balance(
        principal,
        monthly_rate(annual_rate_percent),
        total_months(tenure_years),
        years_to_months(elapsed_years),
    )
}

/// Interest paid over the full tenure.
pub fn total_interest(
    principal: Money,
    annual_rate_percent: Percent,
    tenure_years: u32,
) -> CalcResult<Money> {
    let payment = monthly_payment(principal, annual_rate_percent, tenure_years)?;
    Ok(payment * Decimal::from(total_months(tenure_years)) - principal)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Monthly instalment, balance at the elapsed point, and lifetime cost of a
/// reducing-balance loan.
pub fn compute_amortization(
    params: &LoanParameters,
) -> CalcResult<ComputationOutput<AmortizationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let elapsed = validate_loan(params)?;

    if params.annual_rate_percent.is_zero() {
        warnings.push("Zero interest rate: principal is repaid in equal instalments".into());
    }

    let n = total_months(params.tenure_years);
    let payment = monthly_payment(params.principal, params.annual_rate_percent, params.tenure_years)?;
    let balance = outstanding_balance(
        params.principal,
        params.annual_rate_percent,
        params.tenure_years,
        elapsed,
    )?;
    let total_repayment = payment * Decimal::from(n);

    let output = AmortizationResult {
        monthly_payment: payment,
        outstanding_balance: balance,
        total_interest: total_repayment - params.principal,
        total_repayment,
        total_months: n,
        remaining_months: Decimal::from(n) - years_to_months(elapsed),
    };

    let elapsed_us = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Reducing-balance annuity amortization",
        &serde_json::json!({
            "principal": params.principal.to_string(),
            "annual_rate_percent": params.annual_rate_percent.to_string(),
            "tenure_years": params.tenure_years,
            "elapsed_years": elapsed.to_string(),
        }),
        warnings,
        elapsed_us,
        output,
    ))
}

/// Year-by-year repayment schedule, iterated month by month.
///
/// The final instalment absorbs accumulated rounding so the schedule always
/// closes at exactly zero.
pub fn build_schedule(params: &LoanParameters) -> CalcResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loan(params)?;
    if params.elapsed_years.is_some() {
        warnings.push("Schedule always starts from the first instalment; elapsed_years ignored".into());
    }
    if params.annual_rate_percent.is_zero() {
        warnings.push("Zero interest rate: principal is repaid in equal instalments".into());
    }

    let r = monthly_rate(params.annual_rate_percent);
    let payment = monthly_payment(params.principal, params.annual_rate_percent, params.tenure_years)?;
    let n = total_months(params.tenure_years);

    let mut periods = Vec::with_capacity(params.tenure_years as usize);
    let mut balance = params.principal;
    let mut cumulative_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;

    for year in 1..=params.tenure_years {
        let opening = balance;
        let mut principal_paid = Decimal::ZERO;
        let mut interest_paid = Decimal::ZERO;

        for month in 1..=MONTHS_PER_YEAR {
            let interest = balance * r;
            let is_last = (year - 1) * MONTHS_PER_YEAR + month == n;
            let principal_part = if is_last {
                balance
            } else {
                (payment - interest).min(balance)
            };
            balance -= principal_part;
            principal_paid += principal_part;
            interest_paid += interest;
        }

        cumulative_interest += interest_paid;
        total_principal += principal_paid;
        periods.push(SchedulePeriod {
            year,
            opening_balance: opening,
            principal_paid,
            interest_paid,
            closing_balance: balance,
            cumulative_interest,
        });
    }

    let output = AmortizationSchedule {
        monthly_payment: payment,
        periods,
        total_interest: cumulative_interest,
        total_principal,
    };

    let elapsed_us = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Reducing-balance repayment schedule (monthly iteration, yearly summary)",
        &serde_json::json!({
            "principal": params.principal.to_string(),
            "annual_rate_percent": params.annual_rate_percent.to_string(),
            "tenure_years": params.tenure_years,
        }),
        warnings,
        elapsed_us,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn home_loan() -> LoanParameters {
        LoanParameters {
            principal: dec!(500_000),
            annual_rate_percent: dec!(4),
            tenure_years: 30,
            elapsed_years: None,
        }
    }

    #[test]
    fn test_monthly_payment_known_answer() {
        let pmt = monthly_payment(dec!(500_000), dec!(4), 30).unwrap();
        assert!((pmt - dec!(2387.08)).abs() < dec!(0.01));
    }

    #[test]
    fn test_outstanding_after_five_years() {
        let bal = outstanding_balance(dec!(500_000), dec!(4), 30, dec!(5)).unwrap();
        assert!((bal - dec!(452_237.57)).abs() < dec!(0.01));
    }

    #[test]
    fn test_outstanding_fractional_year() {
        let at_2 = outstanding_balance(dec!(500_000), dec!(4), 30, dec!(2)).unwrap();
        let at_2_5 = outstanding_balance(dec!(500_000), dec!(4), 30, dec!(2.5)).unwrap();
        let at_3 = outstanding_balance(dec!(500_000), dec!(4), 30, dec!(3)).unwrap();
        assert!(at_2 > at_2_5 && at_2_5 > at_3);
    }

    #[test]
    fn test_outstanding_beyond_tenure_rejected() {
        assert!(outstanding_balance(dec!(500_000), dec!(4), 30, dec!(31)).is_err());
    }

    #[test]
    fn test_zero_rate_branch() {
        let pmt = monthly_payment(dec!(120_000), Decimal::ZERO, 10).unwrap();
        assert_eq!(pmt, dec!(1000));
        assert_eq!(total_interest(dec!(120_000), Decimal::ZERO, 10).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_compute_amortization_fields() {
        let mut params = home_loan();
        params.elapsed_years = Some(dec!(5));
        let out = compute_amortization(&params).unwrap();
        let r = &out.result;
        assert_eq!(r.total_months, 360);
        assert_eq!(r.remaining_months, dec!(300));
        assert_eq!(r.total_repayment, r.monthly_payment * dec!(360));
        assert_eq!(r.total_interest, r.total_repayment - dec!(500_000));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_compute_amortization_rejects_elapsed_at_tenure() {
        let mut params = home_loan();
        params.elapsed_years = Some(dec!(30));
        let err = compute_amortization(&params).unwrap_err();
        match err {
            CalcError::InvalidParameter { field, .. } => assert_eq!(field, "elapsed_years"),
            other => panic!("Expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_compute_amortization_zero_rate_warns() {
        let mut params = home_loan();
        params.annual_rate_percent = Decimal::ZERO;
        let out = compute_amortization(&params).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.result.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_negative_principal_rejected() {
        let mut params = home_loan();
        params.principal = dec!(-1);
        assert!(compute_amortization(&params).is_err());
    }

    #[test]
    fn test_schedule_closes_at_zero() {
        let out = build_schedule(&home_loan()).unwrap();
        let sched = &out.result;
        assert_eq!(sched.periods.len(), 30);
        assert_eq!(sched.periods.last().unwrap().closing_balance, Decimal::ZERO);
        assert!((sched.total_principal - dec!(500_000)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_schedule_matches_closed_form_balance() {
        let sched = build_schedule(&home_loan()).unwrap().result;
        let closed = outstanding_balance(dec!(500_000), dec!(4), 30, dec!(5)).unwrap();
        assert!((sched.periods[4].closing_balance - closed).abs() < dec!(0.000001));
    }

    #[test]
    fn test_schedule_total_interest_matches() {
        let sched = build_schedule(&home_loan()).unwrap().result;
        let expected = total_interest(dec!(500_000), dec!(4), 30).unwrap();
        assert!((sched.total_interest - expected).abs() < dec!(0.01));
    }
}
