use fincalc_core::fees::bracket::{
    evaluate_bracket_schedule, evaluate_with_breakdown, BracketSchedule, BracketTier,
};
use fincalc_core::fees::property::{self, PropertyCostInput};
use fincalc_core::CalcError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Bracket schedules
// ===========================================================================

#[test]
fn test_schedule_from_json_derives_bases() {
    let schedule: BracketSchedule = serde_json::from_str(
        r#"{
            "tiers": [
                {"upper_bound": "100000", "marginal_rate_percent": "1"},
                {"upper_bound": "500000", "marginal_rate_percent": "2"},
                {"upper_bound": "1000000", "marginal_rate_percent": "3"},
                {"marginal_rate_percent": "4"}
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(schedule, property::stamp_duty_schedule());
    assert_eq!(schedule.tiers()[2].cumulative_base_amount, dec!(9_000));
}

#[test]
fn test_schedule_with_broken_base_rejected() {
    let err = serde_json::from_str::<BracketSchedule>(
        r#"{
            "tiers": [
                {"upper_bound": "100000", "marginal_rate_percent": "1", "cumulative_base_amount": "0"},
                {"marginal_rate_percent": "2", "cumulative_base_amount": "999"}
            ]
        }"#,
    );
    assert!(err.is_err());
}

#[test]
fn test_new_rejects_decreasing_bounds() {
    let tiers = vec![
        BracketTier {
            upper_bound: Some(dec!(500)),
            marginal_rate_percent: dec!(1),
            cumulative_base_amount: Decimal::ZERO,
        },
        BracketTier {
            upper_bound: Some(dec!(100)),
            marginal_rate_percent: dec!(2),
            cumulative_base_amount: dec!(5),
        },
        BracketTier {
            upper_bound: None,
            marginal_rate_percent: dec!(3),
            cumulative_base_amount: dec!(5),
        },
    ];
    assert!(BracketSchedule::new(tiers, None).is_err());
}

#[test]
fn test_boundary_amount_equal_from_either_tier() {
    let schedule = property::stamp_duty_schedule();
    let at = evaluate_bracket_schedule(&schedule, dec!(500_000)).unwrap();
    let above = evaluate_bracket_schedule(&schedule, dec!(500_000.01)).unwrap();
    assert_eq!(at, dec!(9_000));
    assert_eq!(above, dec!(9_000.0003));
}

#[test]
fn test_breakdown_sums_to_total() {
    let schedule = property::stamp_duty_schedule();
    let eval = evaluate_with_breakdown(&schedule, dec!(1_500_000)).unwrap();
    assert_eq!(eval.portions.len(), 4);
    let sum: Decimal = eval.portions.iter().map(|p| p.charge).sum();
    assert_eq!(sum, eval.total);
    assert_eq!(eval.total, dec!(44_000));
    assert!(!eval.minimum_fee_applied);
}

#[test]
fn test_breakdown_flags_minimum_fee() {
    let eval = evaluate_with_breakdown(&property::legal_fee_schedule(), dec!(10_000)).unwrap();
    assert_eq!(eval.progressive_charge, dec!(125));
    assert_eq!(eval.total, dec!(500));
    assert!(eval.minimum_fee_applied);
}

#[test]
fn test_zero_amount_charges_nothing() {
    let fee = evaluate_bracket_schedule(&property::legal_fee_schedule(), Decimal::ZERO).unwrap();
    assert_eq!(fee, Decimal::ZERO);
}

#[test]
fn test_negative_amount_rejected() {
    match evaluate_bracket_schedule(&property::stamp_duty_schedule(), dec!(-1)).unwrap_err() {
        CalcError::InvalidParameter { field, .. } => assert_eq!(field, "amount"),
        other => panic!("Expected InvalidParameter, got {other:?}"),
    }
}

// ===========================================================================
// Property purchase costs
// ===========================================================================

#[test]
fn test_property_costs_600k_purchase() {
    let input = PropertyCostInput {
        property_price: dec!(600_000),
        loan_amount: dec!(540_000),
    };
    let r = property::compute_property_costs(&input).unwrap().result;
    assert_eq!(r.transfer_stamp_duty, dec!(12_000));
    assert_eq!(r.loan_stamp_duty, dec!(2_700));
    // 6,250 + 1% of 100k
    assert_eq!(r.spa_legal_fee, dec!(7_250));
    // 6,250 + 1% of 40k
    assert_eq!(r.loan_legal_fee, dec!(6_650));
    assert_eq!(r.total_fees, dec!(28_600));
    assert_eq!(r.total_upfront_cash, dec!(88_600));
}

#[test]
fn test_property_costs_from_json_cash_purchase() {
    let input: PropertyCostInput =
        serde_json::from_str(r#"{"property_price": 250000}"#).unwrap();
    let r = property::compute_property_costs(&input).unwrap().result;
    // 1,000 + 2% of 150k
    assert_eq!(r.transfer_stamp_duty, dec!(4_000));
    assert_eq!(r.loan_stamp_duty, Decimal::ZERO);
    assert_eq!(r.spa_legal_fee, dec!(3_125));
}
