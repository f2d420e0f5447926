use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::nisab::{default_nisab_grams, nisab_value, ZAKAT_RATE};
use crate::types::*;
use crate::{CalcError, CalcResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsZakatInput {
    /// Lowest balance held throughout the haul.
    pub savings: Money,
    pub gold_price_per_gram: Money,
    #[serde(default = "default_nisab_grams")]
    pub nisab_grams: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsZakatResult {
    pub nisab_value: Money,
    pub above_nisab: bool,
    pub zakat_due: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldZakatInput {
    /// Gold kept as savings or investment; always zakatable.
    #[serde(default)]
    pub stored_grams: Decimal,
    /// Jewellery in regular use; zakatable only above the uruf.
    #[serde(default)]
    pub worn_grams: Decimal,
    /// Customary allowance for worn gold, set per state.
    #[serde(default)]
    pub uruf_grams: Decimal,
    pub gold_price_per_gram: Money,
    #[serde(default = "default_nisab_grams")]
    pub nisab_grams: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldZakatResult {
    pub zakatable_grams: Decimal,
    pub zakatable_value: Money,
    pub above_nisab: bool,
    pub zakat_due: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Zakat on savings: 2.5% of the balance once it reaches the gold nisab.
pub fn compute_savings_zakat(
    input: &SavingsZakatInput,
) -> CalcResult<ComputationOutput<SavingsZakatResult>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    if input.savings < Decimal::ZERO {
        return Err(CalcError::invalid("savings", "Savings cannot be negative"));
    }
    let nisab = nisab_value(input.gold_price_per_gram, input.nisab_grams)?;
    let above_nisab = input.savings >= nisab;

    let output = SavingsZakatResult {
        nisab_value: nisab,
        above_nisab,
        zakat_due: if above_nisab {
            input.savings * ZAKAT_RATE
        } else {
            Decimal::ZERO
        },
    };

    let elapsed_us = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Zakat on savings (gold nisab)",
        &serde_json::json!({
            "gold_price_per_gram": input.gold_price_per_gram.to_string(),
            "nisab_grams": input.nisab_grams.to_string(),
            "zakat_rate": ZAKAT_RATE.to_string(),
        }),
        warnings,
        elapsed_us,
        output,
    ))
}

/// Zakat on gold: stored gold plus worn gold above the uruf, due when the
/// zakatable weight reaches the nisab.
pub fn compute_gold_zakat(
    input: &GoldZakatInput,
) -> CalcResult<ComputationOutput<GoldZakatResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    for (field, grams) in [
        ("stored_grams", input.stored_grams),
        ("worn_grams", input.worn_grams),
        ("uruf_grams", input.uruf_grams),
    ] {
        if grams < Decimal::ZERO {
            return Err(CalcError::invalid(field, "Weight cannot be negative"));
        }
    }
    // Validates price and nisab weight.
    nisab_value(input.gold_price_per_gram, input.nisab_grams)?;

    if input.uruf_grams.is_zero() && !input.worn_grams.is_zero() {
        warnings.push("No uruf supplied: all worn gold treated as zakatable".into());
    }

    let zakatable_grams =
        input.stored_grams + (input.worn_grams - input.uruf_grams).max(Decimal::ZERO);
    let zakatable_value = zakatable_grams * input.gold_price_per_gram;
    let above_nisab = zakatable_grams >= input.nisab_grams;

    let output = GoldZakatResult {
        zakatable_grams,
        zakatable_value,
        above_nisab,
        zakat_due: if above_nisab {
            zakatable_value * ZAKAT_RATE
        } else {
            Decimal::ZERO
        },
    };

    let elapsed_us = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Zakat on gold (uruf exemption for worn gold)",
        &serde_json::json!({
            "gold_price_per_gram": input.gold_price_per_gram.to_string(),
            "uruf_grams": input.uruf_grams.to_string(),
            "nisab_grams": input.nisab_grams.to_string(),
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
    use crate::zakat::nisab::NISAB_GOLD_GRAMS;
    use rust_decimal_macros::dec;

    #[test]
    fn test_savings_above_nisab() {
        let input = SavingsZakatInput {
            savings: dec!(50_000),
            gold_price_per_gram: dec!(400),
            nisab_grams: NISAB_GOLD_GRAMS,
        };
        let r = compute_savings_zakat(&input).unwrap().result;
        assert_eq!(r.nisab_value, dec!(34_000));
        assert!(r.above_nisab);
        assert_eq!(r.zakat_due, dec!(1_250));
    }

    #[test]
    fn test_savings_below_nisab() {
        let input = SavingsZakatInput {
            savings: dec!(20_000),
            gold_price_per_gram: dec!(400),
            nisab_grams: NISAB_GOLD_GRAMS,
        };
        let r = compute_savings_zakat(&input).unwrap().result;
        assert!(!r.above_nisab);
        assert_eq!(r.zakat_due, Decimal::ZERO);
    }

    #[test]
    fn test_savings_default_nisab_from_json() {
        let input: SavingsZakatInput =
            serde_json::from_str(r#"{"savings":"34000","gold_price_per_gram":"400"}"#).unwrap();
        assert_eq!(input.nisab_grams, NISAB_GOLD_GRAMS);
        let r = compute_savings_zakat(&input).unwrap().result;
        assert!(r.above_nisab);
    }

    #[test]
    fn test_gold_worn_within_uruf_exempt() {
        let input = GoldZakatInput {
            stored_grams: dec!(50),
            worn_grams: dec!(150),
            uruf_grams: dec!(200),
            gold_price_per_gram: dec!(400),
            nisab_grams: NISAB_GOLD_GRAMS,
        };
        let r = compute_gold_zakat(&input).unwrap().result;
        assert_eq!(r.zakatable_grams, dec!(50));
        assert!(!r.above_nisab);
        assert_eq!(r.zakat_due, Decimal::ZERO);
    }

    #[test]
    fn test_gold_worn_above_uruf() {
        let input = GoldZakatInput {
            stored_grams: dec!(50),
            worn_grams: dec!(250),
            uruf_grams: dec!(200),
            gold_price_per_gram: dec!(400),
            nisab_grams: NISAB_GOLD_GRAMS,
        };
        let r = compute_gold_zakat(&input).unwrap().result;
        assert_eq!(r.zakatable_grams, dec!(100));
        assert_eq!(r.zakatable_value, dec!(40_000));
        assert_eq!(r.zakat_due, dec!(1_000));
    }

    #[test]
    fn test_gold_missing_uruf_warns() {
        let input = GoldZakatInput {
            stored_grams: Decimal::ZERO,
            worn_grams: dec!(100),
            uruf_grams: Decimal::ZERO,
            gold_price_per_gram: dec!(400),
            nisab_grams: NISAB_GOLD_GRAMS,
        };
        let out = compute_gold_zakat(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.result.above_nisab);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let input = GoldZakatInput {
            stored_grams: dec!(-1),
            worn_grams: Decimal::ZERO,
            uruf_grams: Decimal::ZERO,
            gold_price_per_gram: dec!(400),
            nisab_grams: NISAB_GOLD_GRAMS,
        };
        assert!(compute_gold_zakat(&input).is_err());
    }
}
