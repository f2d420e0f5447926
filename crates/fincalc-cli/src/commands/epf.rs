use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use fincalc_core::epf::projection::{self, EpfProjectionInput};

use crate::input::{self, required};

/// Arguments for the EPF retirement projection
#[derive(Args)]
pub struct EpfArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Current age
    #[arg(long)]
    pub age: Option<u32>,

    /// Age at retirement
    #[arg(long, default_value = "60")]
    pub retirement_age: u32,

    /// Current EPF balance
    #[arg(long, default_value = "0")]
    pub balance: Decimal,

    /// Gross monthly salary
    #[arg(long)]
    pub salary: Option<Decimal>,

    /// Employee contribution rate (default 0.11)
    #[arg(long)]
    pub employee_rate: Option<Decimal>,

    /// Employer contribution rate (default 0.13 up to RM5,000, else 0.12)
    #[arg(long)]
    pub employer_rate: Option<Decimal>,

    /// Yearly salary increment (0.03 = 3%)
    #[arg(long, default_value = "0")]
    pub increment: Decimal,

    /// Declared dividend rate (0.055 = 5.5%)
    #[arg(long)]
    pub dividend: Option<Decimal>,
}

pub fn run_epf(args: EpfArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let epf_input: EpfProjectionInput = match input::load(args.input.as_deref())? {
        Some(v) => v,
        None => EpfProjectionInput {
            current_age: required(args.age, "age")?,
            retirement_age: args.retirement_age,
            current_balance: args.balance,
            monthly_salary: required(args.salary, "salary")?,
            employee_rate: args.employee_rate,
            employer_rate: args.employer_rate,
            annual_increment: args.increment,
            dividend_rate: required(args.dividend, "dividend")?,
        },
    };
    let result = projection::project_epf(&epf_input)?;
    debug!(years = result.result.years.len(), "EPF projection computed");
    Ok(serde_json::to_value(result)?)
}
