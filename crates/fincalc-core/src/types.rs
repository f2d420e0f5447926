use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values (single currency, RM on the calculators).
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%).
pub type Rate = Decimal;

/// Rates as quoted to borrowers (4 = 4% p.a.). Converted to a `Rate` before use.
pub type Percent = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Loan terms shared by the amortization and settlement calculators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanParameters {
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub tenure_years: u32,
    /// Time already served on the loan. Must be strictly below the tenure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_years: Option<Years>,
}

/// Headline figures for a loan at a point in its life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub monthly_payment: Money,
    pub outstanding_balance: Money,
    pub total_interest: Money,
    pub total_repayment: Money,
    pub total_months: u32,
    pub remaining_months: Decimal,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
