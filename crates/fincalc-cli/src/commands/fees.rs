use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use fincalc_core::fees::bracket::{evaluate_with_breakdown, BracketSchedule};
use fincalc_core::fees::property::{self, PropertyCostInput};

use crate::input::{self, required};

/// Arguments for evaluating a custom bracket schedule
#[derive(Args)]
pub struct BracketsArgs {
    /// JSON/YAML file holding `schedule` (tiers, optional minimum_fee) and `amount`
    #[arg(long)]
    pub input: Option<String>,

    /// Override the amount in the input file
    #[arg(long)]
    pub amount: Option<Decimal>,
}

/// Arguments for the statutory stamp duty and legal fee scales
#[derive(Args)]
pub struct ScaleArgs {
    /// Property price or loan amount
    #[arg(long)]
    pub amount: Decimal,
}

/// Arguments for property purchase upfront costs
#[derive(Args)]
pub struct PropertyCostsArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Property price
    #[arg(long, alias = "price")]
    pub property_price: Option<Decimal>,

    /// Amount financed (omit for a cash purchase)
    #[arg(long, alias = "loan", default_value = "0")]
    pub loan_amount: Decimal,
}

#[derive(Deserialize)]
struct BracketRequest {
    schedule: BracketSchedule,
    #[serde(default)]
    amount: Option<Decimal>,
}

pub fn run_brackets(args: BracketsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let req: BracketRequest = input::load(args.input.as_deref())?
        .ok_or("--input (or a piped schedule) is required")?;
    let amount = required(args.amount.or(req.amount), "amount")?;
    let evaluation = evaluate_with_breakdown(&req.schedule, amount)?;
    debug!(tiers = req.schedule.tiers().len(), "custom schedule evaluated");
    Ok(serde_json::to_value(evaluation)?)
}

pub fn run_stamp_duty(args: ScaleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let evaluation = evaluate_with_breakdown(&property::stamp_duty_schedule(), args.amount)?;
    Ok(serde_json::to_value(evaluation)?)
}

pub fn run_legal_fee(args: ScaleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let evaluation = evaluate_with_breakdown(&property::legal_fee_schedule(), args.amount)?;
    Ok(serde_json::to_value(evaluation)?)
}

pub fn run_property_costs(args: PropertyCostsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cost_input: PropertyCostInput = match input::load(args.input.as_deref())? {
        Some(v) => v,
        None => PropertyCostInput {
            property_price: required(args.property_price, "property-price")?,
            loan_amount: args.loan_amount,
        },
    };
    let result = property::compute_property_costs(&cost_input)?;
    debug!(methodology = %result.methodology, "property costs computed");
    Ok(serde_json::to_value(result)?)
}
