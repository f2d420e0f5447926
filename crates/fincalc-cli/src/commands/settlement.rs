use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use fincalc_core::settlement::early::{self, AmortizationStyle, SettlementInput};
use fincalc_core::settlement::recommendation::RecommendationPolicy;
use fincalc_core::LoanParameters;

use crate::input::{self, required};

/// Arguments for early settlement
#[derive(Args)]
#[command(group = clap::ArgGroup::new("policy").args(["threshold", "relative_threshold"]))]
pub struct SettlementArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Original loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual rate in percent (the flat rate with --flat)
    #[arg(long, alias = "rate")]
    pub annual_rate_percent: Option<Decimal>,

    /// Tenure in whole years
    #[arg(long, alias = "tenure")]
    pub tenure_years: Option<u32>,

    /// Years already paid when settling
    #[arg(long, alias = "elapsed")]
    pub elapsed_years: Option<Decimal>,

    /// Treat the loan as flat-rate (hire purchase)
    #[arg(long)]
    pub flat: bool,

    /// Penalty as a fraction of the outstanding balance (0.02 = 2%)
    #[arg(long, default_value = "0")]
    pub penalty_rate: Decimal,

    /// Lock-in period in years
    #[arg(long, default_value = "0")]
    pub lock_in_years: Decimal,

    /// Share of unearned interest rebated on a flat-rate loan
    #[arg(long)]
    pub rebate: Option<Decimal>,

    /// Recommend when net savings exceed this amount
    #[arg(long)]
    pub threshold: Option<Decimal>,

    /// Recommend when net savings exceed this fraction of the balance
    #[arg(long)]
    pub relative_threshold: Option<Decimal>,
}

pub fn run_settlement(args: SettlementArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let settle_input: SettlementInput = match input::load(args.input.as_deref())? {
        Some(v) => v,
        None => {
            let policy = match (args.threshold, args.relative_threshold) {
                (Some(amount), _) => RecommendationPolicy::AbsoluteThreshold { amount },
                (None, Some(fraction)) => RecommendationPolicy::RelativeThreshold { fraction },
                (None, None) => RecommendationPolicy::default(),
            };
            SettlementInput {
                loan: LoanParameters {
                    principal: required(args.principal, "principal")?,
                    annual_rate_percent: required(args.annual_rate_percent, "annual-rate-percent")?,
                    tenure_years: required(args.tenure_years, "tenure-years")?,
                    elapsed_years: Some(required(args.elapsed_years, "elapsed-years")?),
                },
                style: if args.flat {
                    AmortizationStyle::FlatRate
                } else {
                    AmortizationStyle::ReducingBalance
                },
                penalty_rate: args.penalty_rate,
                lock_in_years: args.lock_in_years,
                rebate_fraction: args.rebate,
                policy,
            }
        }
    };
    let result = early::compute_settlement(&settle_input)?;
    debug!(
        tier = ?result.result.recommendation_tier,
        within_lock_in = result.result.within_lock_in,
        "settlement computed"
    );
    Ok(serde_json::to_value(result)?)
}
