mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::amortization::{FlatRateArgs, LoanArgs, PayoffArgs, VehicleLoanArgs};
use commands::eligibility::EligibilityArgs;
use commands::epf::EpfArgs;
use commands::fees::{BracketsArgs, PropertyCostsArgs, ScaleArgs};
use commands::settlement::SettlementArgs;
use commands::zakat::{GoldArgs, SavingsArgs};

/// Consumer loan, fee, eligibility and savings calculators
#[derive(Parser)]
#[command(
    name = "fincalc",
    version,
    about = "Consumer loan, fee, eligibility and savings calculators",
    long_about = "Home and car loan amortization, credit card payoff, stamp duty and \
                  legal fees, DSR eligibility, early settlement, zakat and EPF \
                  projections, all in decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log inputs and methodology to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Reducing-balance instalment, balance and total interest
    Amortize(LoanArgs),
    /// Year-by-year repayment schedule
    Schedule(LoanArgs),
    /// Flat-rate (simple interest) amortization
    FlatRate(FlatRateArgs),
    /// Car hire-purchase with effective rate
    VehicleLoan(VehicleLoanArgs),
    /// Months to clear a card balance paying only the minimum
    Payoff(PayoffArgs),
    /// Evaluate a custom progressive bracket schedule
    Brackets(BracketsArgs),
    /// Stamp duty on the instrument of transfer
    StampDuty(ScaleArgs),
    /// Solicitor's scale fee
    LegalFee(ScaleArgs),
    /// Upfront cash needed to buy a property
    PropertyCosts(PropertyCostsArgs),
    /// Maximum loan under a debt-service-ratio cap
    Eligibility(EligibilityArgs),
    /// Early settlement amount, penalty and savings
    Settlement(SettlementArgs),
    /// Zakat on savings
    ZakatSavings(SavingsArgs),
    /// Zakat on gold
    ZakatGold(GoldArgs),
    /// EPF balance projection to retirement
    Epf(EpfArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("fincalc=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::amortization::run_amortize(args),
        Commands::Schedule(args) => commands::amortization::run_schedule(args),
        Commands::FlatRate(args) => commands::amortization::run_flat_rate(args),
        Commands::VehicleLoan(args) => commands::amortization::run_vehicle_loan(args),
        Commands::Payoff(args) => commands::amortization::run_payoff(args),
        Commands::Brackets(args) => commands::fees::run_brackets(args),
        Commands::StampDuty(args) => commands::fees::run_stamp_duty(args),
        Commands::LegalFee(args) => commands::fees::run_legal_fee(args),
        Commands::PropertyCosts(args) => commands::fees::run_property_costs(args),
        Commands::Eligibility(args) => commands::eligibility::run_eligibility(args),
        Commands::Settlement(args) => commands::settlement::run_settlement(args),
        Commands::ZakatSavings(args) => commands::zakat::run_savings(args),
        Commands::ZakatGold(args) => commands::zakat::run_gold(args),
        Commands::Epf(args) => commands::epf::run_epf(args),
        Commands::Version => {
            println!("fincalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
