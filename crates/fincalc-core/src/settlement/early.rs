use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::recommendation::{RecommendationPolicy, RecommendationTier};
use crate::amortization::flat_rate::flat_total_interest;
use crate::amortization::{reducing, total_months, validate_elapsed, validate_terms, years_to_months};
use crate::types::*;
use crate::{CalcError, CalcResult};

/// Share of unearned interest refunded on early settlement of a flat-rate
/// loan when the lender's own figure is not supplied.
pub const DEFAULT_FLAT_RATE_REBATE: Rate = dec!(0.70);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmortizationStyle {
    /// Annuity loan; `annual_rate_percent` is the effective rate.
    #[default]
    ReducingBalance,
    /// Simple-interest loan; `annual_rate_percent` is the flat rate.
    FlatRate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementInput {
    /// `elapsed_years` is required: the point at which the loan is settled.
    pub loan: LoanParameters,
    #[serde(default)]
    pub style: AmortizationStyle,
    /// Penalty as a fraction of the outstanding balance (0.02 = 2%).
    pub penalty_rate: Rate,
    pub lock_in_years: Years,
    /// Flat-rate loans only; defaults to [`DEFAULT_FLAT_RATE_REBATE`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebate_fraction: Option<Rate>,
    #[serde(default)]
    pub policy: RecommendationPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementResult {
    /// Amount that discharges the loan before any penalty (net of rebate
    /// for flat-rate loans).
    pub outstanding_balance: Money,
    pub penalty_fee: Money,
    pub settlement_amount: Money,
    pub interest_saved: Money,
    pub net_savings: Money,
    pub recommendation_tier: RecommendationTier,
    pub within_lock_in: bool,
    pub remaining_months: Decimal,
    /// What the borrower would still pay by continuing to term.
    pub remaining_payments: Money,
    /// Unearned interest refunded (flat-rate loans; zero otherwise).
    pub interest_rebate: Money,
}

/// Balance and savings figures for one amortization style.
struct StyleFigures {
    outstanding: Money,
    remaining_payments: Money,
    interest_saved: Money,
    rebate: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Settle a loan early: outstanding balance, lock-in penalty, interest saved
/// and whether it is worth doing under the chosen policy.
pub fn compute_settlement(
    input: &SettlementInput,
) -> CalcResult<ComputationOutput<SettlementResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let elapsed = validate_input(input)?;
    let loan = &input.loan;
    let n = total_months(loan.tenure_years);
    let remaining_months = Decimal::from(n) - years_to_months(elapsed);

    let figures = match input.style {
        AmortizationStyle::ReducingBalance => {
            if input.rebate_fraction.is_some() {
                warnings.push("rebate_fraction applies to flat-rate loans only; ignored".into());
            }
            reducing_figures(loan, elapsed, remaining_months)?
        }
        AmortizationStyle::FlatRate => {
            let rebate_fraction = input.rebate_fraction.unwrap_or(DEFAULT_FLAT_RATE_REBATE);
            flat_figures(loan, remaining_months, n, rebate_fraction)
        }
    };

    let within_lock_in = elapsed < input.lock_in_years;
    let penalty_fee = if within_lock_in {
        figures.outstanding * input.penalty_rate
    } else {
        Decimal::ZERO
    };
    let settlement_amount = figures.outstanding + penalty_fee;
    let net_savings = figures.interest_saved - penalty_fee;
    let tier = input.policy.classify(net_savings, figures.outstanding);

    if within_lock_in && !input.penalty_rate.is_zero() {
        warnings.push(format!(
            "Settling within the {}-year lock-in incurs a {}% penalty",
            input.lock_in_years,
            input.penalty_rate * dec!(100)
        ));
    }

    let output = SettlementResult {
        outstanding_balance: figures.outstanding,
        penalty_fee,
        settlement_amount,
        interest_saved: figures.interest_saved,
        net_savings,
        recommendation_tier: tier,
        within_lock_in,
        remaining_months,
        remaining_payments: figures.remaining_payments,
        interest_rebate: figures.rebate,
    };

    let methodology = match input.style {
        AmortizationStyle::ReducingBalance => "Early settlement (reducing-balance annuity)",
        AmortizationStyle::FlatRate => "Early settlement (flat rate, proportional balance with interest rebate)",
    };

    let elapsed_us = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &serde_json::json!({
            "penalty_rate": input.penalty_rate.to_string(),
            "lock_in_years": input.lock_in_years.to_string(),
            "rebate_fraction": input.rebate_fraction.map(|r| r.to_string()),
            "policy": input.policy,
        }),
        warnings,
        elapsed_us,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn reducing_figures(
    loan: &LoanParameters,
    elapsed: Years,
    remaining_months: Decimal,
) -> CalcResult<StyleFigures> {
    let payment = reducing::monthly_payment(loan.principal, loan.annual_rate_percent, loan.tenure_years)?;
    let outstanding = reducing::outstanding_balance(
        loan.principal,
        loan.annual_rate_percent,
        loan.tenure_years,
        elapsed,
    )?;
    let remaining_payments = payment * remaining_months;
    // The payoff figure is pure principal, so all future interest is saved.
    let interest_saved = (remaining_payments - outstanding).max(Decimal::ZERO);
    Ok(StyleFigures {
        outstanding,
        remaining_payments,
        interest_saved,
        rebate: Decimal::ZERO,
    })
}

fn flat_figures(
    loan: &LoanParameters,
    remaining_months: Decimal,
    total_months: u32,
    rebate_fraction: Rate,
) -> StyleFigures {
    let total_interest = flat_total_interest(loan.principal, loan.annual_rate_percent, loan.tenure_years);
    let remaining_share = remaining_months / Decimal::from(total_months);
    let gross = remaining_share * (loan.principal + total_interest);
    let unearned_interest = remaining_share * total_interest;
    let rebate = unearned_interest * rebate_fraction;
    StyleFigures {
        outstanding: gross - rebate,
        remaining_payments: gross,
        interest_saved: rebate,
        rebate,
    }
}

fn validate_input(input: &SettlementInput) -> CalcResult<Years> {
    let loan = &input.loan;
    validate_terms(loan.principal, loan.annual_rate_percent, loan.tenure_years)?;
    let elapsed = loan.elapsed_years.ok_or_else(|| {
        CalcError::invalid("elapsed_years", "Settlement point (elapsed years) is required")
    })?;
    validate_elapsed(elapsed, loan.tenure_years)?;

    if input.penalty_rate < Decimal::ZERO || input.penalty_rate > Decimal::ONE {
        return Err(CalcError::invalid("penalty_rate", "Penalty rate must be in [0, 1]"));
    }
    if input.lock_in_years < Decimal::ZERO {
        return Err(CalcError::invalid(
            "lock_in_years",
            "Lock-in period cannot be negative",
        ));
    }
    if let Some(rebate) = input.rebate_fraction {
        if rebate < Decimal::ZERO || rebate > Decimal::ONE {
            return Err(CalcError::invalid(
                "rebate_fraction",
                "Rebate fraction must be in [0, 1]",
            ));
        }
    }
    input.policy.validate()?;
    Ok(elapsed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
