use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use fincalc_core::zakat::wealth::{self, GoldZakatInput, SavingsZakatInput};

use crate::input::{self, required};

/// Arguments for zakat on savings
#[derive(Args)]
pub struct SavingsArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Lowest savings balance held over the year
    #[arg(long)]
    pub savings: Option<Decimal>,

    /// Current gold price per gram
    #[arg(long)]
    pub gold_price: Option<Decimal>,

    /// Nisab weight in grams of gold
    #[arg(long, default_value = "85")]
    pub nisab_grams: Decimal,
}

/// Arguments for zakat on gold
#[derive(Args)]
pub struct GoldArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Grams of gold kept as savings
    #[arg(long, default_value = "0")]
    pub stored: Decimal,

    /// Grams of jewellery in regular use
    #[arg(long, default_value = "0")]
    pub worn: Decimal,

    /// Uruf allowance for worn gold, in grams
    #[arg(long, default_value = "0")]
    pub uruf: Decimal,

    /// Current gold price per gram
    #[arg(long)]
    pub gold_price: Option<Decimal>,

    /// Nisab weight in grams of gold
    #[arg(long, default_value = "85")]
    pub nisab_grams: Decimal,
}

pub fn run_savings(args: SavingsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let zakat_input: SavingsZakatInput = match input::load(args.input.as_deref())? {
        Some(v) => v,
        None => SavingsZakatInput {
            savings: required(args.savings, "savings")?,
            gold_price_per_gram: required(args.gold_price, "gold-price")?,
            nisab_grams: args.nisab_grams,
        },
    };
    let result = wealth::compute_savings_zakat(&zakat_input)?;
    debug!(above_nisab = result.result.above_nisab, "savings zakat computed");
    Ok(serde_json::to_value(result)?)
}

pub fn run_gold(args: GoldArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let zakat_input: GoldZakatInput = match input::load(args.input.as_deref())? {
        Some(v) => v,
        None => GoldZakatInput {
            stored_grams: args.stored,
            worn_grams: args.worn,
            uruf_grams: args.uruf,
            gold_price_per_gram: required(args.gold_price, "gold-price")?,
            nisab_grams: args.nisab_grams,
        },
    };
    let result = wealth::compute_gold_zakat(&zakat_input)?;
    debug!(above_nisab = result.result.above_nisab, "gold zakat computed");
    Ok(serde_json::to_value(result)?)
}
