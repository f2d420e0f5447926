use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use fincalc_core::amortization::flat_rate::{self, VehicleLoanInput};
use fincalc_core::amortization::payoff::{self, PaymentRule};
use fincalc_core::amortization::reducing;
use fincalc_core::LoanParameters;

use crate::input::{self, required};

/// Loan terms shared by the reducing-balance commands
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (4 = 4%)
    #[arg(long, alias = "rate")]
    pub annual_rate_percent: Option<Decimal>,

    /// Tenure in whole years
    #[arg(long, alias = "tenure")]
    pub tenure_years: Option<u32>,

    /// Years of instalments already paid
    #[arg(long, alias = "elapsed")]
    pub elapsed_years: Option<Decimal>,
}

/// Arguments for flat-rate amortization
#[derive(Args)]
pub struct FlatRateArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Flat interest rate in percent, charged on the original principal
    #[arg(long)]
    pub flat_rate: Option<Decimal>,

    /// Tenure in whole years
    #[arg(long, alias = "tenure")]
    pub tenure_years: Option<u32>,

    /// Years of instalments already paid
    #[arg(long, alias = "elapsed")]
    pub elapsed_years: Option<Decimal>,
}

/// Arguments for a vehicle hire-purchase loan
#[derive(Args)]
pub struct VehicleLoanArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Vehicle price
    #[arg(long, alias = "price")]
    pub vehicle_price: Option<Decimal>,

    /// Down payment in percent of the price
    #[arg(long, alias = "down-payment", default_value = "10")]
    pub down_payment_percent: Decimal,

    /// Flat interest rate in percent
    #[arg(long)]
    pub flat_rate: Option<Decimal>,

    /// Tenure in whole years
    #[arg(long, alias = "tenure")]
    pub tenure_years: Option<u32>,
}

/// Arguments for the minimum-payment payoff simulation
#[derive(Args)]
#[command(group = clap::ArgGroup::new("rule").args(["min_percent", "fixed"]))]
pub struct PayoffArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Opening card balance
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long, alias = "rate")]
    pub annual_rate_percent: Option<Decimal>,

    /// Minimum payment as a fraction of the balance (0.05 = 5%)
    #[arg(long)]
    pub min_percent: Option<Decimal>,

    /// Floor under the percentage minimum
    #[arg(long, default_value = "50")]
    pub floor: Decimal,

    /// Pay the same amount every month instead
    #[arg(long)]
    pub fixed: Option<Decimal>,
}

#[derive(Deserialize)]
struct FlatRateRequest {
    principal: Decimal,
    flat_rate_percent: Decimal,
    tenure_years: u32,
    #[serde(default)]
    elapsed_years: Option<Decimal>,
}

#[derive(Deserialize)]
struct PayoffRequest {
    balance: Decimal,
    annual_rate_percent: Decimal,
    rule: PaymentRule,
}

impl LoanArgs {
    fn into_params(self) -> Result<LoanParameters, Box<dyn std::error::Error>> {
        if let Some(params) = input::load(self.input.as_deref())? {
            return Ok(params);
        }
        Ok(LoanParameters {
            principal: required(self.principal, "principal")?,
            annual_rate_percent: required(self.annual_rate_percent, "annual-rate-percent")?,
            tenure_years: required(self.tenure_years, "tenure-years")?,
            elapsed_years: self.elapsed_years,
        })
    }
}

pub fn run_amortize(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = args.into_params()?;
    let result = reducing::compute_amortization(&params)?;
    debug!(methodology = %result.methodology, "amortization computed");
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = args.into_params()?;
    let result = reducing::build_schedule(&params)?;
    debug!(periods = result.result.periods.len(), "schedule built");
    Ok(serde_json::to_value(result)?)
}

pub fn run_flat_rate(args: FlatRateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let req: FlatRateRequest = match input::load(args.input.as_deref())? {
        Some(r) => r,
        None => FlatRateRequest {
            principal: required(args.principal, "principal")?,
            flat_rate_percent: required(args.flat_rate, "flat-rate")?,
            tenure_years: required(args.tenure_years, "tenure-years")?,
            elapsed_years: args.elapsed_years,
        },
    };
    let params = LoanParameters {
        principal: req.principal,
        annual_rate_percent: req.flat_rate_percent,
        tenure_years: req.tenure_years,
        elapsed_years: req.elapsed_years,
    };
    let result = flat_rate::compute_flat_rate_amortization(&params, req.flat_rate_percent)?;
    debug!(methodology = %result.methodology, "flat-rate amortization computed");
    Ok(serde_json::to_value(result)?)
}

pub fn run_vehicle_loan(args: VehicleLoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input: VehicleLoanInput = match input::load(args.input.as_deref())? {
        Some(v) => v,
        None => VehicleLoanInput {
            vehicle_price: required(args.vehicle_price, "vehicle-price")?,
            down_payment_percent: args.down_payment_percent,
            flat_rate_percent: required(args.flat_rate, "flat-rate")?,
            tenure_years: required(args.tenure_years, "tenure-years")?,
        },
    };
    let result = flat_rate::compute_vehicle_loan(&loan_input)?;
    debug!(
        effective_rate = %result.result.effective_annual_rate_percent,
        "vehicle loan computed"
    );
    Ok(serde_json::to_value(result)?)
}

pub fn run_payoff(args: PayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let req: PayoffRequest = match input::load(args.input.as_deref())? {
        Some(r) => r,
        None => {
            let rule = match (args.min_percent, args.fixed) {
                (_, Some(amount)) => PaymentRule::FixedAmount { amount },
                (Some(rate), None) => PaymentRule::PercentageOfBalance {
                    rate,
                    floor: args.floor,
                },
                (None, None) => return Err("--min-percent or --fixed is required".into()),
            };
            PayoffRequest {
                balance: required(args.balance, "balance")?,
                annual_rate_percent: required(args.annual_rate_percent, "annual-rate-percent")?,
                rule,
            }
        }
    };
    let result = payoff::simulate_minimum_payoff(req.balance, req.annual_rate_percent, &req.rule)?;
    debug!(outcome = ?result.result.outcome, "payoff simulated");
    Ok(serde_json::to_value(result)?)
}
