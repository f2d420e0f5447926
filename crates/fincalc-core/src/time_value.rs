use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::CalcError;
use crate::types::{Money, Percent, Rate};
use crate::CalcResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_RATE_ITERATIONS: u32 = 100;
const MIN_SOLVER_RATE: Decimal = dec!(0.000000001);
const MAX_SOLVER_RATE: Decimal = dec!(1);

/// Longest loan or financing tenure accepted anywhere in the crate.
pub const MAX_TENURE_YEARS: u32 = 100;

/// Reject negative rates and tenures outside `1..=MAX_TENURE_YEARS`.
pub fn validate_rate_and_tenure(
    annual_rate_percent: Percent,
    tenure_years: u32,
) -> CalcResult<()> {
    if annual_rate_percent < Decimal::ZERO {
        return Err(CalcError::invalid(
            "annual_rate_percent",
            "Interest rate cannot be negative",
        ));
    }
    if tenure_years == 0 || tenure_years > MAX_TENURE_YEARS {
        return Err(CalcError::invalid(
            "tenure_years",
            format!("Tenure must be between 1 and {MAX_TENURE_YEARS} years"),
        ));
    }
    Ok(())
}

/// Checked product, mapping overflow to `CalcError::Overflow`.
pub(crate) fn checked_product(a: Decimal, b: Decimal, context: &str) -> CalcResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| CalcError::Overflow {
        context: context.into(),
    })
}

/// Monthly periodic rate for a quoted annual percentage (4 → 0.04 / 12).
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / dec!(100) / dec!(12)
}

/// Compound growth factor (1 + rate)^periods.
///
/// Whole periods are raised by exact repeated multiplication; fractional
/// periods (e.g. 2.5 years elapsed = 30 months, 1.05 years = 12.6 months)
/// fall back to `powd`.
///
/// The factor must fit in a `Decimal` (about 7.9e28). At monthly compounding
/// that covers any rate up to roughly 60% p.a. over the full 100-year tenure;
/// beyond that the result is `CalcError::Overflow`, never a panic.
pub fn growth_factor(rate: Rate, periods: Decimal) -> CalcResult<Decimal> {
    let base = Decimal::ONE + rate;
    let factor = if periods.fract().is_zero() {
        let n = periods.to_i64().ok_or_else(|| CalcError::Overflow {
            context: format!("growth factor exponent {periods}"),
        })?;
        base.checked_powi(n)
    } else {
        base.checked_powd(periods)
    };
    factor.ok_or_else(|| CalcError::Overflow {
        context: format!("growth factor (1 + {rate})^{periods}"),
    })
}

/// Level payment that amortises `principal` over `periods` at `rate` per period.
pub fn annuity_payment(principal: Money, rate: Rate, periods: u32) -> CalcResult<Money> {
    if periods == 0 {
        return Err(CalcError::invalid("periods", "Number of periods must be > 0"));
    }

    let n = Decimal::from(periods);
    if rate.is_zero() {
        return Ok(principal / n);
    }

    let factor = growth_factor(rate, n)?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(CalcError::DivisionByZero {
            context: "annuity payment factor".into(),
        });
    }

    let scaled = checked_product(principal, rate, "annuity payment")?;
    Ok(checked_product(scaled, factor, "annuity payment")? / denominator)
}

/// Principal that a level `payment` services over `periods` at `rate`.
pub fn annuity_present_value(payment: Money, rate: Rate, periods: u32) -> CalcResult<Money> {
    let n = Decimal::from(periods);
    if rate.is_zero() {
        return checked_product(payment, n, "annuity present value");
    }

    let factor = growth_factor(rate, n)?;
    let denominator = rate * factor;
    if denominator.is_zero() {
        return Err(CalcError::DivisionByZero {
            context: "annuity present value factor".into(),
        });
    }

    Ok(checked_product(payment, factor - Decimal::ONE, "annuity present value")? / denominator)
}

/// Balance left on an annuity loan after `elapsed_periods` of `total_periods`.
///
/// balance = P · [(1+r)^n − (1+r)^m] / [(1+r)^n − 1]
pub fn remaining_balance(
    principal: Money,
    rate: Rate,
    total_periods: u32,
    elapsed_periods: Decimal,
) -> CalcResult<Money> {
    if total_periods == 0 {
        return Err(CalcError::invalid(
            "total_periods",
            "Number of periods must be > 0",
        ));
    }
    let n = Decimal::from(total_periods);
    if elapsed_periods < Decimal::ZERO || elapsed_periods > n {
        return Err(CalcError::invalid(
            "elapsed_periods",
            format!("Elapsed periods must lie within [0, {total_periods}]"),
        ));
    }

    if rate.is_zero() {
        return Ok(principal * (n - elapsed_periods) / n);
    }

    let full = growth_factor(rate, n)?;
    let partial = growth_factor(rate, elapsed_periods)?;
    let denominator = full - Decimal::ONE;
    if denominator.is_zero() {
        return Err(CalcError::DivisionByZero {
            context: "remaining balance factor".into(),
        });
    }

    Ok(checked_product(principal, full - partial, "remaining balance")? / denominator)
}

/// Periodic rate at which a level `payment` over `periods` repays exactly
/// `principal`, found by Newton-Raphson on the annuity present value.
pub fn solve_periodic_rate(principal: Money, payment: Money, periods: u32) -> CalcResult<Rate> {
    if principal <= Decimal::ZERO {
        return Err(CalcError::invalid("principal", "Principal must be positive"));
    }
    if periods == 0 {
        return Err(CalcError::invalid("periods", "Number of periods must be > 0"));
    }

    let n = Decimal::from(periods);
    let total_paid = payment * n;
    if total_paid < principal {
        return Err(CalcError::invalid(
            "payment",
            "Payments do not cover the principal; the implied rate would be negative",
        ));
    }
    if total_paid == principal {
        return Ok(Decimal::ZERO);
    }

    // Start from the constant-ratio approximation 2I / (P(n+1)).
    let mut rate = (dec!(2) * (total_paid - principal) / (principal * (n + Decimal::ONE)))
        .clamp(MIN_SOLVER_RATE, MAX_SOLVER_RATE);
    let mut residual = Decimal::ZERO;

    for i in 0..MAX_RATE_ITERATIONS {
        let factor = growth_factor(rate, n)?;
        let discount = Decimal::ONE / factor;
        let annuity = (Decimal::ONE - discount) / rate;
        residual = payment * annuity - principal;

        if residual.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }

        // d/dr [(1 - (1+r)^-n) / r] = n(1+r)^(-n-1)/r - (1 - (1+r)^-n)/r^2
        let derivative =
            payment * (n * discount / ((Decimal::ONE + rate) * rate) - annuity / rate);
        if derivative.is_zero() {
            return Err(CalcError::NonConvergent {
                function: "periodic rate".into(),
                iterations: i,
                last_delta: residual,
            });
        }

        rate = (rate - residual / derivative).clamp(MIN_SOLVER_RATE, MAX_SOLVER_RATE);
    }

    Err(CalcError::NonConvergent {
        function: "periodic rate".into(),
        iterations: MAX_RATE_ITERATIONS,
        last_delta: residual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
        assert_eq!(monthly_rate(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_growth_factor_whole_and_fractional() {
        assert_eq!(growth_factor(dec!(0.1), dec!(2)).unwrap(), dec!(1.21));
        let half = growth_factor(dec!(0.21), dec!(0.5)).unwrap();
        assert!((half - dec!(1.1)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_annuity_payment_home_loan() {
        let pmt = annuity_payment(dec!(500_000), monthly_rate(dec!(4)), 360).unwrap();
        assert!((pmt - dec!(2387.08)).abs() < dec!(0.01));
    }

    #[test]
    fn test_annuity_payment_zero_rate() {
        let pmt = annuity_payment(dec!(12_000), Decimal::ZERO, 12).unwrap();
        assert_eq!(pmt, dec!(1000));
    }

    #[test]
    fn test_annuity_payment_zero_periods() {
        assert!(annuity_payment(dec!(1000), dec!(0.01), 0).is_err());
    }

    #[test]
    fn test_present_value_inverts_payment() {
        let r = monthly_rate(dec!(4.5));
        let pmt = annuity_payment(dec!(300_000), r, 420).unwrap();
        let pv = annuity_present_value(pmt, r, 420).unwrap();
        assert!((pv - dec!(300_000)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_remaining_balance_endpoints() {
        let r = monthly_rate(dec!(4));
        assert_eq!(
            remaining_balance(dec!(500_000), r, 360, Decimal::ZERO).unwrap(),
            dec!(500_000)
        );
        assert!(remaining_balance(dec!(500_000), r, 360, dec!(360))
            .unwrap()
            .abs()
            < dec!(0.000001));
    }

    #[test]
    fn test_remaining_balance_rejects_overrun() {
        let err = remaining_balance(dec!(1000), dec!(0.01), 12, dec!(13)).unwrap_err();
        match err {
            CalcError::InvalidParameter { field, .. } => assert_eq!(field, "elapsed_periods"),
            other => panic!("Expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_annuity_payment_overflow_is_error() {
        let err = annuity_payment(Decimal::MAX, dec!(0.5), 120).unwrap_err();
        assert!(matches!(err, CalcError::Overflow { .. }));
    }

    #[test]
    fn test_remaining_balance_overflow_is_error() {
        let err = remaining_balance(Decimal::MAX, dec!(0.01), 360, Decimal::ZERO).unwrap_err();
        assert!(matches!(err, CalcError::Overflow { .. }));
    }

    #[test]
    fn test_growth_factor_beyond_decimal_range() {
        // 100% p.a. monthly over 100 years is ~1e41.
        let err = growth_factor(monthly_rate(dec!(100)), dec!(1200)).unwrap_err();
        assert!(matches!(err, CalcError::Overflow { .. }));
        assert!(growth_factor(monthly_rate(dec!(60)), dec!(1200)).is_ok());
    }

    #[test]
    fn test_tenure_bounds_shared() {
        assert!(validate_rate_and_tenure(dec!(4), MAX_TENURE_YEARS).is_ok());
        assert!(validate_rate_and_tenure(dec!(4), MAX_TENURE_YEARS + 1).is_err());
        assert!(validate_rate_and_tenure(dec!(4), 0).is_err());
        assert!(validate_rate_and_tenure(dec!(-1), 30).is_err());
    }

    #[test]
    fn test_solve_periodic_rate_recovers_rate() {
        let r = monthly_rate(dec!(6));
        let pmt = annuity_payment(dec!(50_000), r, 60).unwrap();
        let solved = solve_periodic_rate(dec!(50_000), pmt, 60).unwrap();
        assert!((solved - r).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_solve_periodic_rate_no_interest() {
        let solved = solve_periodic_rate(dec!(1200), dec!(100), 12).unwrap();
        assert_eq!(solved, Decimal::ZERO);
    }

    #[test]
    fn test_solve_periodic_rate_underpayment_rejected() {
        assert!(solve_periodic_rate(dec!(1200), dec!(90), 12).is_err());
    }
}
