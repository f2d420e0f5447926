use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::{CalcError, CalcResult};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One band of a progressive schedule.
///
/// A tier covers `(previous upper bound, upper_bound]`; an amount sitting
/// exactly on a boundary is charged in the lower tier. Because every tier's
/// base equals the charge accumulated below it, the schedule is continuous and
/// the convention only decides which row a boundary amount is reported in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketTier {
    /// `None` for the open-ended top tier.
    pub upper_bound: Option<Money>,
    pub marginal_rate_percent: Percent,
    /// Charge accumulated on all lower tiers.
    pub cumulative_base_amount: Money,
}

/// A validated progressive-rate schedule (stamp duty, legal fees).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBracketSchedule")]
pub struct BracketSchedule {
    tiers: Vec<BracketTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    minimum_fee: Option<Money>,
}

/// Wire form of a schedule. Bases may be omitted and are then derived.
#[derive(Debug, Clone, Deserialize)]
struct RawBracketSchedule {
    tiers: Vec<RawTier>,
    #[serde(default)]
    minimum_fee: Option<Money>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawTier {
    #[serde(default)]
    upper_bound: Option<Money>,
    marginal_rate_percent: Percent,
    #[serde(default)]
    cumulative_base_amount: Option<Money>,
}

/// The slice of an amount charged within one tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierPortion {
    pub lower_bound: Money,
    pub upper_bound: Option<Money>,
    pub taxable_amount: Money,
    pub marginal_rate_percent: Percent,
    pub charge: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketEvaluation {
    pub amount: Money,
    pub portions: Vec<TierPortion>,
    /// Sum of the tier charges before any minimum fee.
    pub progressive_charge: Money,
    pub minimum_fee_applied: bool,
    pub total: Money,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl BracketSchedule {
    /// Build from fully specified tiers, checking ordering and continuity.
    pub fn new(tiers: Vec<BracketTier>, minimum_fee: Option<Money>) -> CalcResult<Self> {
        validate_tiers(&tiers)?;
        validate_minimum_fee(minimum_fee)?;
        let expected = derive_tiers(
            &tiers
                .iter()
                .map(|t| (t.upper_bound, t.marginal_rate_percent))
                .collect::<Vec<_>>(),
        );
        for (i, (given, derived)) in tiers.iter().zip(expected.iter()).enumerate() {
            if given.cumulative_base_amount != derived.cumulative_base_amount {
                return Err(CalcError::invalid(
                    "cumulative_base_amount",
                    format!(
                        "Tier {i} base {} breaks continuity (expected {})",
                        given.cumulative_base_amount, derived.cumulative_base_amount
                    ),
                ));
            }
        }
        Ok(Self { tiers, minimum_fee })
    }

    /// Build from `(upper_bound, marginal_rate_percent)` pairs, deriving each
    /// tier's cumulative base.
    pub fn from_marginal_rates(
        rates: &[(Option<Money>, Percent)],
        minimum_fee: Option<Money>,
    ) -> CalcResult<Self> {
        let tiers = derive_tiers(rates);
        validate_tiers(&tiers)?;
        validate_minimum_fee(minimum_fee)?;
        Ok(Self { tiers, minimum_fee })
    }

    /// Statutory tables are known-good; skip validation.
    pub(crate) fn from_table(rates: &[(Option<Money>, Percent)], minimum_fee: Option<Money>) -> Self {
        Self {
            tiers: derive_tiers(rates),
            minimum_fee,
        }
    }

    pub fn tiers(&self) -> &[BracketTier] {
        &self.tiers
    }

    pub fn minimum_fee(&self) -> Option<Money> {
        self.minimum_fee
    }
}

impl TryFrom<RawBracketSchedule> for BracketSchedule {
    type Error = CalcError;

    fn try_from(raw: RawBracketSchedule) -> Result<Self, Self::Error> {
        let rates: Vec<(Option<Money>, Percent)> = raw
            .tiers
            .iter()
            .map(|t| (t.upper_bound, t.marginal_rate_percent))
            .collect();
        if raw.tiers.iter().all(|t| t.cumulative_base_amount.is_none()) {
            return BracketSchedule::from_marginal_rates(&rates, raw.minimum_fee);
        }
        let derived = derive_tiers(&rates);
        let tiers = raw
            .tiers
            .iter()
            .zip(derived)
            .map(|(t, d)| BracketTier {
                cumulative_base_amount: t.cumulative_base_amount.unwrap_or(d.cumulative_base_amount),
                ..d
            })
            .collect();
        BracketSchedule::new(tiers, raw.minimum_fee)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Charge on `amount` under a progressive schedule.
///
/// Zero yields zero (no minimum fee on a nil amount); any positive charge is
/// raised to the schedule's minimum fee when one is set.
pub fn evaluate_bracket_schedule(schedule: &BracketSchedule, amount: Money) -> CalcResult<Money> {
    validate_amount(amount)?;
    if amount.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let mut lower = Decimal::ZERO;
    for tier in &schedule.tiers {
        let in_tier = match tier.upper_bound {
            Some(upper) => amount <= upper,
            None => true,
        };
        if in_tier {
            let charge =
                tier.cumulative_base_amount + (amount - lower) * tier.marginal_rate_percent / dec!(100);
            return Ok(apply_minimum(charge, schedule.minimum_fee).0);
        }
        if let Some(upper) = tier.upper_bound {
            lower = upper;
        }
    }

    // Only reachable for a schedule whose top tier is bounded and exceeded.
    Err(CalcError::invalid(
        "amount",
        format!("Amount {amount} exceeds the top bracket"),
    ))
}

/// Tier-by-tier breakdown of the charge, as shown in fee tables.
pub fn evaluate_with_breakdown(
    schedule: &BracketSchedule,
    amount: Money,
) -> CalcResult<BracketEvaluation> {
    validate_amount(amount)?;

    let mut portions = Vec::new();
    let mut lower = Decimal::ZERO;
    let mut progressive_charge = Decimal::ZERO;

    for tier in &schedule.tiers {
        if amount <= lower {
            break;
        }
        let ceiling = match tier.upper_bound {
            Some(upper) => amount.min(upper),
            None => amount,
        };
        let taxable = ceiling - lower;
        let charge = taxable * tier.marginal_rate_percent / dec!(100);
        progressive_charge += charge;
        portions.push(TierPortion {
            lower_bound: lower,
            upper_bound: tier.upper_bound,
            taxable_amount: taxable,
            marginal_rate_percent: tier.marginal_rate_percent,
            charge,
        });
        match tier.upper_bound {
            Some(upper) => lower = upper,
            None => break,
        }
    }

    let (total, minimum_fee_applied) = if amount.is_zero() {
        (Decimal::ZERO, false)
    } else {
        apply_minimum(progressive_charge, schedule.minimum_fee)
    };

    Ok(BracketEvaluation {
        amount,
        portions,
        progressive_charge,
        minimum_fee_applied,
        total,
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn derive_tiers(rates: &[(Option<Money>, Percent)]) -> Vec<BracketTier> {
    let mut tiers = Vec::with_capacity(rates.len());
    let mut lower = Decimal::ZERO;
    let mut base = Decimal::ZERO;
    for (upper, rate) in rates {
        tiers.push(BracketTier {
            upper_bound: *upper,
            marginal_rate_percent: *rate,
            cumulative_base_amount: base,
        });
        if let Some(u) = upper {
            base += (*u - lower) * *rate / dec!(100);
            lower = *u;
        }
    }
    tiers
}

fn validate_tiers(tiers: &[BracketTier]) -> CalcResult<()> {
    if tiers.is_empty() {
        return Err(CalcError::invalid("tiers", "Schedule needs at least one tier"));
    }

    let mut previous = Decimal::ZERO;
    for (i, tier) in tiers.iter().enumerate() {
        if tier.marginal_rate_percent < Decimal::ZERO {
            return Err(CalcError::invalid(
                "marginal_rate_percent",
                format!("Tier {i} has a negative rate"),
            ));
        }
        let is_last = i == tiers.len() - 1;
        match tier.upper_bound {
            Some(upper) => {
                if upper <= previous {
                    return Err(CalcError::invalid(
                        "upper_bound",
                        format!("Tier {i} bound {upper} must exceed {previous}"),
                    ));
                }
                if is_last {
                    return Err(CalcError::invalid(
                        "upper_bound",
                        "The last tier must be open-ended",
                    ));
                }
                previous = upper;
            }
            None if !is_last => {
                return Err(CalcError::invalid(
                    "upper_bound",
                    format!("Only the last tier may be open-ended (tier {i})"),
                ));
            }
            None => {}
        }
    }
    Ok(())
}

fn validate_minimum_fee(minimum_fee: Option<Money>) -> CalcResult<()> {
    match minimum_fee {
        Some(fee) if fee < Decimal::ZERO => Err(CalcError::invalid(
            "minimum_fee",
            "Minimum fee cannot be negative",
        )),
        _ => Ok(()),
    }
}

fn validate_amount(amount: Money) -> CalcResult<()> {
    if amount < Decimal::ZERO {
        return Err(CalcError::invalid("amount", "Amount cannot be negative"));
    }
    Ok(())
}

fn apply_minimum(charge: Money, minimum_fee: Option<Money>) -> (Money, bool) {
    match minimum_fee {
        Some(min) if charge < min => (min, true),
        _ => (charge, false),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn two_tier() -> BracketSchedule {
        BracketSchedule::from_marginal_rates(
            &[(Some(dec!(1000)), dec!(10)), (None, dec!(20))],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_bases_derived() {
        let s = two_tier();
        assert_eq!(s.tiers()[0].cumulative_base_amount, Decimal::ZERO);
        assert_eq!(s.tiers()[1].cumulative_base_amount, dec!(100));
    }

    #[test]
    fn test_evaluate_both_tiers() {
        let s = two_tier();
        assert_eq!(evaluate_bracket_schedule(&s, dec!(500)).unwrap(), dec!(50));
        assert_eq!(evaluate_bracket_schedule(&s, dec!(1500)).unwrap(), dec!(200));
    }

    #[test]
    fn test_boundary_amount_in_lower_tier() {
        let s = two_tier();
        assert_eq!(evaluate_bracket_schedule(&s, dec!(1000)).unwrap(), dec!(100));
        let b = evaluate_with_breakdown(&s, dec!(1000)).unwrap();
        assert_eq!(b.portions.len(), 1);
    }

    #[test]
    fn test_zero_amount_skips_minimum() {
        let s = BracketSchedule::from_marginal_rates(&[(None, dec!(1))], Some(dec!(500))).unwrap();
        assert_eq!(evaluate_bracket_schedule(&s, Decimal::ZERO).unwrap(), Decimal::ZERO);
        assert_eq!(evaluate_bracket_schedule(&s, dec!(100)).unwrap(), dec!(500));
    }

    #[test]
    fn test_negative_amount_rejected() {
        assert!(evaluate_bracket_schedule(&two_tier(), dec!(-1)).is_err());
    }

    #[test]
    fn test_breakdown_agrees_with_evaluate() {
        let s = two_tier();
        for amount in [dec!(0), dec!(999.99), dec!(1000), dec!(1000.01), dec!(25_000)] {
            let b = evaluate_with_breakdown(&s, amount).unwrap();
            assert_eq!(b.total, evaluate_bracket_schedule(&s, amount).unwrap());
        }
    }

    #[test]
    fn test_unordered_bounds_rejected() {
        let err = BracketSchedule::from_marginal_rates(
            &[(Some(dec!(1000)), dec!(1)), (Some(dec!(500)), dec!(2)), (None, dec!(3))],
            None,
        )
        .unwrap_err();
        match err {
            CalcError::InvalidParameter { field, .. } => assert_eq!(field, "upper_bound"),
            other => panic!("Expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_bounded_top_tier_rejected() {
        assert!(BracketSchedule::from_marginal_rates(&[(Some(dec!(1000)), dec!(1))], None).is_err());
    }

    #[test]
    fn test_open_tier_in_middle_rejected() {
        assert!(BracketSchedule::from_marginal_rates(
            &[(None, dec!(1)), (Some(dec!(1000)), dec!(2))],
            None
        )
        .is_err());
    }

    #[test]
    fn test_discontinuous_base_rejected() {
        let tiers = vec![
            BracketTier {
                upper_bound: Some(dec!(1000)),
                marginal_rate_percent: dec!(10),
                cumulative_base_amount: Decimal::ZERO,
            },
            BracketTier {
                upper_bound: None,
                marginal_rate_percent: dec!(20),
                cumulative_base_amount: dec!(150),
            },
        ];
        assert!(BracketSchedule::new(tiers, None).is_err());
    }

    #[test]
    fn test_deserialize_derives_bases() {
        let json = r#"{"tiers":[{"upper_bound":"1000","marginal_rate_percent":"10"},{"marginal_rate_percent":"20"}]}"#;
        let s: BracketSchedule = serde_json::from_str(json).unwrap();
        assert_eq!(s, two_tier());
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        let json = r#"{"tiers":[{"upper_bound":"1000","marginal_rate_percent":"10"}]}"#;
        assert!(serde_json::from_str::<BracketSchedule>(json).is_err());
    }
}
