use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::bracket::{evaluate_bracket_schedule, BracketSchedule};
use crate::types::*;
use crate::{CalcError, CalcResult};

/// Stamp duty on the loan agreement, flat on the amount financed.
pub const LOAN_AGREEMENT_STAMP_DUTY_RATE: Rate = dec!(0.005);

/// Minimum solicitor's fee on any conveyancing or loan instrument.
pub const MINIMUM_LEGAL_FEE: Money = dec!(500);

/// Margins of finance above this usually need mortgage insurance or a second look.
const HIGH_MARGIN_OF_FINANCE: Rate = dec!(0.9);

/// Stamp duty on the memorandum of transfer.
pub fn stamp_duty_schedule() -> BracketSchedule {
    BracketSchedule::from_table(
        &[
            (Some(dec!(100_000)), dec!(1)),
            (Some(dec!(500_000)), dec!(2)),
            (Some(dec!(1_000_000)), dec!(3)),
            (None, dec!(4)),
        ],
        None,
    )
}

/// Solicitor's scale fee for the sale and purchase agreement or loan agreement.
pub fn legal_fee_schedule() -> BracketSchedule {
    BracketSchedule::from_table(
        &[(Some(dec!(500_000)), dec!(1.25)), (None, dec!(1))],
        Some(MINIMUM_LEGAL_FEE),
    )
}

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyCostInput {
    pub property_price: Money,
    /// Amount financed. Zero for a cash purchase.
    #[serde(default)]
    pub loan_amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyCostOutput {
    pub down_payment: Money,
    pub transfer_stamp_duty: Money,
    pub loan_stamp_duty: Money,
    pub spa_legal_fee: Money,
    pub loan_legal_fee: Money,
    pub total_fees: Money,
    /// Down payment plus every fee: the cash needed before the keys.
    pub total_upfront_cash: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Upfront costs of a property purchase: transfer and loan stamp duty, legal
/// fees on both agreements, and the down payment.
pub fn compute_property_costs(
    input: &PropertyCostInput,
) -> CalcResult<ComputationOutput<PropertyCostOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.property_price <= Decimal::ZERO {
        return Err(CalcError::invalid(
            "property_price",
            "Property price must be positive",
        ));
    }
    if input.loan_amount < Decimal::ZERO {
        return Err(CalcError::invalid("loan_amount", "Loan amount cannot be negative"));
    }
    if input.loan_amount > input.property_price {
        return Err(CalcError::invalid(
            "loan_amount",
            "Loan amount cannot exceed the property price",
        ));
    }
    if input.loan_amount / input.property_price > HIGH_MARGIN_OF_FINANCE {
        warnings.push("Margin of finance above 90%".into());
    }

    let transfer_stamp_duty = evaluate_bracket_schedule(&stamp_duty_schedule(), input.property_price)?;
    let spa_legal_fee = evaluate_bracket_schedule(&legal_fee_schedule(), input.property_price)?;
    let (loan_stamp_duty, loan_legal_fee) = if input.loan_amount.is_zero() {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        (
            input.loan_amount * LOAN_AGREEMENT_STAMP_DUTY_RATE,
            evaluate_bracket_schedule(&legal_fee_schedule(), input.loan_amount)?,
        )
    };

    let down_payment = input.property_price - input.loan_amount;
    let total_fees = transfer_stamp_duty + loan_stamp_duty + spa_legal_fee + loan_legal_fee;

    let output = PropertyCostOutput {
        down_payment,
        transfer_stamp_duty,
        loan_stamp_duty,
        spa_legal_fee,
        loan_legal_fee,
        total_fees,
        total_upfront_cash: down_payment + total_fees,
    };

    let elapsed_us = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Property purchase upfront costs (progressive stamp duty and legal fee scales)",
        &serde_json::json!({
            "property_price": input.property_price.to_string(),
            "loan_amount": input.loan_amount.to_string(),
            "loan_stamp_duty_rate": LOAN_AGREEMENT_STAMP_DUTY_RATE.to_string(),
            "minimum_legal_fee": MINIMUM_LEGAL_FEE.to_string(),
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

    #[test]
    fn test_statutory_tables_are_valid() {
        let stamp = stamp_duty_schedule();
        assert_eq!(
            BracketSchedule::new(stamp.tiers().to_vec(), stamp.minimum_fee()).unwrap(),
            stamp
        );
        let legal = legal_fee_schedule();
        assert_eq!(
            BracketSchedule::new(legal.tiers().to_vec(), legal.minimum_fee()).unwrap(),
            legal
        );
    }

    #[test]
    fn test_stamp_duty_600k() {
        let duty = evaluate_bracket_schedule(&stamp_duty_schedule(), dec!(600_000)).unwrap();
        assert_eq!(duty, dec!(12_000));
    }

    #[test]
    fn test_stamp_duty_above_one_million() {
        // 1,000 + 8,000 + 15,000 + 4% of 500k
        let duty = evaluate_bracket_schedule(&stamp_duty_schedule(), dec!(1_500_000)).unwrap();
        assert_eq!(duty, dec!(44_000));
    }

    #[test]
    fn test_legal_fee_minimum() {
        let fee = evaluate_bracket_schedule(&legal_fee_schedule(), dec!(20_000)).unwrap();
        assert_eq!(fee, dec!(500));
    }

    #[test]
    fn test_legal_fee_two_tiers() {
        // 6,250 on the first 500k + 1% of 300k
        let fee = evaluate_bracket_schedule(&legal_fee_schedule(), dec!(800_000)).unwrap();
        assert_eq!(fee, dec!(9_250));
    }

    #[test]
    fn test_property_costs_with_loan() {
        let input = PropertyCostInput {
            property_price: dec!(500_000),
            loan_amount: dec!(450_000),
        };
        let out = compute_property_costs(&input).unwrap();
        let r = &out.result;
        assert_eq!(r.down_payment, dec!(50_000));
        assert_eq!(r.transfer_stamp_duty, dec!(9_000));
        assert_eq!(r.loan_stamp_duty, dec!(2_250));
        assert_eq!(r.spa_legal_fee, dec!(6_250));
        assert_eq!(r.loan_legal_fee, dec!(5_625));
        assert_eq!(r.total_fees, dec!(23_125));
        assert_eq!(r.total_upfront_cash, dec!(73_125));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_cash_purchase_has_no_loan_fees() {
        let input = PropertyCostInput {
            property_price: dec!(300_000),
            loan_amount: Decimal::ZERO,
        };
        let r = compute_property_costs(&input).unwrap().result;
        assert_eq!(r.loan_stamp_duty, Decimal::ZERO);
        assert_eq!(r.loan_legal_fee, Decimal::ZERO);
        assert_eq!(r.down_payment, dec!(300_000));
    }

    #[test]
    fn test_full_financing_warns() {
        let input = PropertyCostInput {
            property_price: dec!(300_000),
            loan_amount: dec!(300_000),
        };
        let out = compute_property_costs(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_loan_above_price_rejected() {
        let input = PropertyCostInput {
            property_price: dec!(300_000),
            loan_amount: dec!(300_001),
        };
        assert!(compute_property_costs(&input).is_err());
    }
}
