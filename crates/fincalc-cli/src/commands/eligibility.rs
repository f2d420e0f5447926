use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use fincalc_core::eligibility::dsr::{
    self, Applicant, DsrThresholds, EligibilityInput, PropertySequence,
};

use crate::input::{self, required};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PropertyArg {
    First,
    Second,
    Third,
}

impl From<PropertyArg> for PropertySequence {
    fn from(p: PropertyArg) -> Self {
        match p {
            PropertyArg::First => PropertySequence::First,
            PropertyArg::Second => PropertySequence::Second,
            PropertyArg::Third => PropertySequence::ThirdOrLater,
        }
    }
}

/// Arguments for loan eligibility under a DSR cap
#[derive(Args)]
pub struct EligibilityArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Gross monthly income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Existing monthly debt commitments
    #[arg(long, default_value = "0")]
    pub commitments: Decimal,

    /// Co-applicant monthly income; switches to joint-application thresholds
    #[arg(long)]
    pub co_income: Option<Decimal>,

    /// Co-applicant monthly commitments
    #[arg(long, default_value = "0")]
    pub co_commitments: Decimal,

    /// Maximum debt-service ratio (0.6 = 60%)
    #[arg(long, default_value = "0.6")]
    pub max_dsr: Decimal,

    /// Annual interest rate in percent
    #[arg(long, alias = "rate")]
    pub annual_rate_percent: Option<Decimal>,

    /// Tenure in whole years
    #[arg(long, alias = "tenure")]
    pub tenure_years: Option<u32>,

    /// Which property this is; sets the margin of finance
    #[arg(long, value_enum, default_value = "first")]
    pub property: PropertyArg,

    /// Explicit margin of finance (overrides --property)
    #[arg(long)]
    pub financing_rate: Option<Decimal>,
}

pub fn run_eligibility(args: EligibilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let elig_input: EligibilityInput = match input::load(args.input.as_deref())? {
        Some(v) => v,
        None => {
            let mut applicants = vec![Applicant {
                monthly_income: required(args.income, "income")?,
                monthly_commitments: args.commitments,
            }];
            if let Some(co_income) = args.co_income {
                applicants.push(Applicant {
                    monthly_income: co_income,
                    monthly_commitments: args.co_commitments,
                });
            }
            let household = dsr::combine_applicants(&applicants)?;
            let thresholds = if applicants.len() > 1 {
                DsrThresholds::joint_applicant()
            } else {
                DsrThresholds::single_applicant()
            };
            EligibilityInput {
                total_monthly_income: household.monthly_income,
                existing_monthly_commitments: household.monthly_commitments,
                max_dsr: args.max_dsr,
                annual_rate_percent: required(args.annual_rate_percent, "annual-rate-percent")?,
                tenure_years: required(args.tenure_years, "tenure-years")?,
                max_financing_rate: args
                    .financing_rate
                    .unwrap_or_else(|| PropertySequence::from(args.property).financing_ratio()),
                thresholds,
            }
        }
    };
    let result = dsr::compute_eligibility(&elig_input)?;
    debug!(tier = ?result.result.eligibility_tier, "eligibility computed");
    Ok(serde_json::to_value(result)?)
}
