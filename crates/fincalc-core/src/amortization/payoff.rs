use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::time_value::monthly_rate;
use crate::types::*;
use crate::{CalcError, CalcResult};

/// A balance at or below this is treated as settled.
pub const PAYOFF_EPSILON: Money = dec!(0.01);

/// Iteration ceiling (50 years of monthly statements).
pub const MAX_PAYOFF_MONTHS: u32 = 600;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// How the card issuer sets the monthly minimum payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PaymentRule {
    /// A fraction of the statement balance (0.05 = 5%), never below `floor`.
    PercentageOfBalance { rate: Rate, floor: Money },
    /// The same amount every month.
    FixedAmount { amount: Money },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum PayoffOutcome {
    PaidOff { months: u32 },
    /// The balance was still open at the iteration ceiling.
    NeverPayable { ceiling_months: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffResult {
    pub outcome: PayoffOutcome,
    pub first_payment: Money,
    pub total_paid: Money,
    pub total_interest: Money,
    /// Zero when paid off; the unpaid balance when the ceiling was hit.
    pub remaining_balance: Money,
}

impl PayoffResult {
    /// Months to clear the balance, or `None` when it never clears.
    pub fn months(&self) -> Option<u32> {
        match self.outcome {
            PayoffOutcome::PaidOff { months } => Some(months),
            PayoffOutcome::NeverPayable { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Simulate paying only the minimum each month until the balance clears.
///
/// Each month interest accrues on the running balance, then the required
/// payment is `max(rule amount, interest + 1)` so the balance always falls,
/// capped at what is owed. Stops once the balance is within
/// [`PAYOFF_EPSILON`] of zero or after [`MAX_PAYOFF_MONTHS`] statements.
pub fn simulate_minimum_payoff(
    balance: Money,
    annual_rate_percent: Percent,
    rule: &PaymentRule,
) -> CalcResult<ComputationOutput<PayoffResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(balance, annual_rate_percent, rule)?;

    let r = monthly_rate(annual_rate_percent);
    let mut remaining = balance;
    let mut months: u32 = 0;
    let mut first_payment = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;

    while remaining > PAYOFF_EPSILON && months < MAX_PAYOFF_MONTHS {
        let interest = remaining * r;
        remaining += interest;
        total_interest += interest;

        let rule_amount = match rule {
            PaymentRule::PercentageOfBalance { rate, floor } => (remaining * rate).max(*floor),
            PaymentRule::FixedAmount { amount } => *amount,
        };
        let payment = rule_amount.max(interest + Decimal::ONE).min(remaining);

        if months == 0 {
            first_payment = payment;
        }
        remaining -= payment;
        total_paid += payment;
        months += 1;
    }

    let outcome = if remaining > PAYOFF_EPSILON {
        warnings.push(format!(
            "Balance of {} still outstanding after {MAX_PAYOFF_MONTHS} months",
            remaining.round_dp(2)
        ));
        PayoffOutcome::NeverPayable {
            ceiling_months: MAX_PAYOFF_MONTHS,
        }
    } else {
        remaining = Decimal::ZERO;
        PayoffOutcome::PaidOff { months }
    };

    if let PaymentRule::FixedAmount { amount } = rule {
        if *amount <= balance * r {
            warnings.push(
                "Fixed payment does not cover the first month's interest; interest + 1 is paid instead"
                    .into(),
            );
        }
    }

    let output = PayoffResult {
        outcome,
        first_payment,
        total_paid,
        total_interest,
        remaining_balance: remaining,
    };

    let elapsed_us = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Minimum-payment payoff simulation (monthly accrual)",
        &serde_json::json!({
            "balance": balance.to_string(),
            "annual_rate_percent": annual_rate_percent.to_string(),
            "rule": rule,
            "epsilon": PAYOFF_EPSILON.to_string(),
            "max_months": MAX_PAYOFF_MONTHS,
        }),
        warnings,
        elapsed_us,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_input(balance: Money, annual_rate_percent: Percent, rule: &PaymentRule) -> CalcResult<()> {
    if balance <= Decimal::ZERO {
        return Err(CalcError::invalid("balance", "Balance must be positive"));
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(CalcError::invalid(
            "annual_rate_percent",
            "Interest rate cannot be negative",
        ));
    }
    match rule {
        PaymentRule::PercentageOfBalance { rate, floor } => {
            if *rate <= Decimal::ZERO || *rate > Decimal::ONE {
                return Err(CalcError::invalid(
                    "rate",
                    "Minimum payment rate must be in (0, 1]",
                ));
            }
            if *floor < Decimal::ZERO {
                return Err(CalcError::invalid("floor", "Payment floor cannot be negative"));
            }
        }
        PaymentRule::FixedAmount { amount } => {
            if *amount <= Decimal::ZERO {
                return Err(CalcError::invalid("amount", "Fixed payment must be positive"));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn card_rule() -> PaymentRule {
        PaymentRule::PercentageOfBalance {
            rate: dec!(0.05),
            floor: dec!(25),
        }
    }

    #[test]
    fn test_card_balance_pays_off() {
        let out = simulate_minimum_payoff(dec!(10_000), dec!(18), &card_rule()).unwrap();
        let r = &out.result;
        let months = r.months().unwrap();
        assert!(months > 0 && months < MAX_PAYOFF_MONTHS);
        assert_eq!(r.remaining_balance, Decimal::ZERO);
        // First statement: 10,150 owed, 5% of that
        assert_eq!(r.first_payment, dec!(507.5));
        assert!((r.total_paid - dec!(10_000) - r.total_interest).abs() < dec!(0.01));
    }

    #[test]
    fn test_zero_rate_card() {
        let out = simulate_minimum_payoff(dec!(1000), Decimal::ZERO, &card_rule()).unwrap();
        assert_eq!(out.result.total_interest, Decimal::ZERO);
        assert!(out.result.months().is_some());
    }

    #[test]
    fn test_fixed_amount_clears() {
        let rule = PaymentRule::FixedAmount { amount: dec!(500) };
        let out = simulate_minimum_payoff(dec!(1000), Decimal::ZERO, &rule).unwrap();
        assert_eq!(out.result.outcome, PayoffOutcome::PaidOff { months: 2 });
    }

    #[test]
    fn test_tiny_fixed_payment_never_payable() {
        // 150/month interest; payment is floored at interest + 1, so the
        // balance shrinks by about a ringgit a month.
        let rule = PaymentRule::FixedAmount { amount: dec!(10) };
        let out = simulate_minimum_payoff(dec!(10_000), dec!(18), &rule).unwrap();
        assert_eq!(
            out.result.outcome,
            PayoffOutcome::NeverPayable {
                ceiling_months: MAX_PAYOFF_MONTHS
            }
        );
        assert!(out.result.months().is_none());
        assert!(out.result.remaining_balance > Decimal::ZERO);
        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn test_invalid_rule_rejected() {
        let rule = PaymentRule::PercentageOfBalance {
            rate: dec!(1.5),
            floor: dec!(25),
        };
        assert!(simulate_minimum_payoff(dec!(1000), dec!(18), &rule).is_err());
    }

    #[test]
    fn test_zero_balance_rejected() {
        assert!(simulate_minimum_payoff(Decimal::ZERO, dec!(18), &card_rule()).is_err());
    }
}
