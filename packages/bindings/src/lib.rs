use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use fincalc_core::amortization::{flat_rate, payoff, reducing};
use fincalc_core::eligibility::dsr;
use fincalc_core::epf::projection;
use fincalc_core::fees::{bracket, property};
use fincalc_core::settlement::early;
use fincalc_core::zakat::wealth;
use fincalc_core::LoanParameters;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: DeserializeOwned>(input_json: &str) -> NapiResult<T> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

fn render<T: Serialize>(output: &T) -> NapiResult<String> {
    serde_json::to_string(output).map_err(to_napi_error)
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
    rule: payoff::PaymentRule,
}

#[derive(Deserialize)]
struct BracketRequest {
    schedule: bracket::BracketSchedule,
    amount: Decimal,
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_amortization(input_json: String) -> NapiResult<String> {
    let input: LoanParameters = parse(&input_json)?;
    render(&reducing::compute_amortization(&input).map_err(to_napi_error)?)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: LoanParameters = parse(&input_json)?;
    render(&reducing::build_schedule(&input).map_err(to_napi_error)?)
}

#[napi]
pub fn flat_rate_amortization(input_json: String) -> NapiResult<String> {
    let req: FlatRateRequest = parse(&input_json)?;
    let params = LoanParameters {
        principal: req.principal,
        annual_rate_percent: req.flat_rate_percent,
        tenure_years: req.tenure_years,
        elapsed_years: req.elapsed_years,
    };
    let output = flat_rate::compute_flat_rate_amortization(&params, req.flat_rate_percent)
        .map_err(to_napi_error)?;
    render(&output)
}

#[napi]
pub fn vehicle_loan(input_json: String) -> NapiResult<String> {
    let input: flat_rate::VehicleLoanInput = parse(&input_json)?;
    render(&flat_rate::compute_vehicle_loan(&input).map_err(to_napi_error)?)
}

#[napi]
pub fn minimum_payoff(input_json: String) -> NapiResult<String> {
    let req: PayoffRequest = parse(&input_json)?;
    let output = payoff::simulate_minimum_payoff(req.balance, req.annual_rate_percent, &req.rule)
        .map_err(to_napi_error)?;
    render(&output)
}

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------

#[napi]
pub fn evaluate_brackets(input_json: String) -> NapiResult<String> {
    let req: BracketRequest = parse(&input_json)?;
    render(&bracket::evaluate_with_breakdown(&req.schedule, req.amount).map_err(to_napi_error)?)
}

#[napi]
pub fn property_costs(input_json: String) -> NapiResult<String> {
    let input: property::PropertyCostInput = parse(&input_json)?;
    render(&property::compute_property_costs(&input).map_err(to_napi_error)?)
}

// ---------------------------------------------------------------------------
// Eligibility & settlement
// ---------------------------------------------------------------------------

#[napi]
pub fn eligibility(input_json: String) -> NapiResult<String> {
    let input: dsr::EligibilityInput = parse(&input_json)?;
    render(&dsr::compute_eligibility(&input).map_err(to_napi_error)?)
}

#[napi]
pub fn early_settlement(input_json: String) -> NapiResult<String> {
    let input: early::SettlementInput = parse(&input_json)?;
    render(&early::compute_settlement(&input).map_err(to_napi_error)?)
}

// ---------------------------------------------------------------------------
// Zakat & EPF
// ---------------------------------------------------------------------------

#[napi]
pub fn savings_zakat(input_json: String) -> NapiResult<String> {
    let input: wealth::SavingsZakatInput = parse(&input_json)?;
    render(&wealth::compute_savings_zakat(&input).map_err(to_napi_error)?)
}

#[napi]
pub fn gold_zakat(input_json: String) -> NapiResult<String> {
    let input: wealth::GoldZakatInput = parse(&input_json)?;
    render(&wealth::compute_gold_zakat(&input).map_err(to_napi_error)?)
}

#[napi]
pub fn epf_projection(input_json: String) -> NapiResult<String> {
    let input: projection::EpfProjectionInput = parse(&input_json)?;
    render(&projection::project_epf(&input).map_err(to_napi_error)?)
}
