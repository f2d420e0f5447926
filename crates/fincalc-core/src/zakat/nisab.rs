use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::*;
use crate::{CalcError, CalcResult};

/// Nisab in grams of gold.
pub const NISAB_GOLD_GRAMS: Decimal = dec!(85);

/// Zakat on wealth held for a full lunar year.
pub const ZAKAT_RATE: Rate = dec!(0.025);

pub(crate) fn default_nisab_grams() -> Decimal {
    NISAB_GOLD_GRAMS
}

/// Ringgit value of the nisab at the given gold price.
pub fn nisab_value(gold_price_per_gram: Money, nisab_grams: Decimal) -> CalcResult<Money> {
    if gold_price_per_gram <= Decimal::ZERO {
        return Err(CalcError::invalid(
            "gold_price_per_gram",
            "Gold price must be positive",
        ));
    }
    if nisab_grams <= Decimal::ZERO {
        return Err(CalcError::invalid("nisab_grams", "Nisab weight must be positive"));
    }
    Ok(gold_price_per_gram * nisab_grams)
}
