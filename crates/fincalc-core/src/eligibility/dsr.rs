use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::time_value::{annuity_present_value, monthly_rate, validate_rate_and_tenure};
use crate::types::*;
use crate::{CalcError, CalcResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Current-DSR cut-offs for the eligibility tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DsrThresholds {
    /// At or above this the applicant is borderline.
    pub borderline_from: Rate,
    /// At or above this the applicant is not eligible.
    pub not_eligible_from: Rate,
}

impl DsrThresholds {
    pub fn single_applicant() -> Self {
        Self {
            borderline_from: dec!(0.45),
            not_eligible_from: dec!(0.60),
        }
    }

    /// Lenders tolerate more existing debt when two incomes service it.
    pub fn joint_applicant() -> Self {
        Self {
            borderline_from: dec!(0.50),
            not_eligible_from: dec!(0.70),
        }
    }
}

impl Default for DsrThresholds {
    fn default() -> Self {
        Self::single_applicant()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EligibilityTier {
    Eligible,
    Borderline,
    NotEligible,
}

/// Which residential property this purchase is for the borrower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertySequence {
    First,
    Second,
    ThirdOrLater,
}

impl PropertySequence {
    /// Maximum margin of finance for the purchase.
    pub fn financing_ratio(self) -> Rate {
        match self {
            PropertySequence::First => dec!(0.9),
            PropertySequence::Second => dec!(0.7),
            PropertySequence::ThirdOrLater => dec!(0.6),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Applicant {
    pub monthly_income: Money,
    #[serde(default)]
    pub monthly_commitments: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityInput {
    pub total_monthly_income: Money,
    #[serde(default)]
    pub existing_monthly_commitments: Money,
    /// Maximum debt-service ratio the lender allows (0.6 = 60%).
    pub max_dsr: Rate,
    pub annual_rate_percent: Percent,
    pub tenure_years: u32,
    /// Margin of finance (0.9 for a first property).
    pub max_financing_rate: Rate,
    #[serde(default)]
    pub thresholds: DsrThresholds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub max_monthly_instalment: Money,
    pub max_loan_amount: Money,
    pub max_property_price: Money,
    pub down_payment_required: Money,
    pub current_dsr: Rate,
    pub projected_dsr: Rate,
    pub eligibility_tier: EligibilityTier,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Tier an applicant by current DSR. No headroom for a new instalment is
/// always NotEligible, whatever the ratio.
pub fn classify(
    current_dsr: Rate,
    max_instalment: Money,
    thresholds: &DsrThresholds,
) -> EligibilityTier {
    if max_instalment <= Decimal::ZERO || current_dsr >= thresholds.not_eligible_from {
        EligibilityTier::NotEligible
    } else if current_dsr >= thresholds.borderline_from {
        EligibilityTier::Borderline
    } else {
        EligibilityTier::Eligible
    }
}

/// Largest principal a monthly `instalment` services over the tenure.
///
/// maxPrincipal = instalment · (1 − (1+r)^−n) / r, or instalment · n at r = 0.
pub fn max_principal_for_instalment(
    instalment: Money,
    annual_rate_percent: Percent,
    tenure_years: u32,
) -> CalcResult<Money> {
    if instalment < Decimal::ZERO {
        return Err(CalcError::invalid("instalment", "Instalment cannot be negative"));
    }
    validate_rate_and_tenure(annual_rate_percent, tenure_years)?;
    annuity_present_value(instalment, monthly_rate(annual_rate_percent), tenure_years * 12)
}

/// Household income and commitments across joint applicants.
pub fn combine_applicants(applicants: &[Applicant]) -> CalcResult<Applicant> {
    if applicants.is_empty() {
        return Err(CalcError::invalid("applicants", "At least one applicant is required"));
    }
    let mut combined = Applicant {
        monthly_income: Decimal::ZERO,
        monthly_commitments: Decimal::ZERO,
    };
    for (i, a) in applicants.iter().enumerate() {
        if a.monthly_income < Decimal::ZERO || a.monthly_commitments < Decimal::ZERO {
            return Err(CalcError::invalid(
                "applicants",
                format!("Applicant {i} has a negative income or commitment"),
            ));
        }
        combined.monthly_income += a.monthly_income;
        combined.monthly_commitments += a.monthly_commitments;
    }
    Ok(combined)
}

/// Maximum serviceable loan and property price under a DSR cap.
pub fn compute_eligibility(
    input: &EligibilityInput,
) -> CalcResult<ComputationOutput<EligibilityResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let income = input.total_monthly_income;
    let commitments = input.existing_monthly_commitments;

    let max_instalment = (income * input.max_dsr - commitments).max(Decimal::ZERO);
    let max_loan = max_principal_for_instalment(
        max_instalment,
        input.annual_rate_percent,
        input.tenure_years,
    )?;
    let max_price = max_loan / input.max_financing_rate;
    let down_payment = max_price * (Decimal::ONE - input.max_financing_rate);

    let current_dsr = commitments / income;
    let projected_dsr = (commitments + max_instalment) / income;
    let tier = classify(current_dsr, max_instalment, &input.thresholds);

    if max_instalment.is_zero() {
        warnings.push("Existing commitments already use the full DSR allowance".into());
    }
    if input.annual_rate_percent.is_zero() {
        warnings.push("Zero interest rate: loan sized as instalment × months".into());
    }

    let output = EligibilityResult {
        max_monthly_instalment: max_instalment,
        max_loan_amount: max_loan,
        max_property_price: max_price,
        down_payment_required: down_payment,
        current_dsr,
        projected_dsr,
        eligibility_tier: tier,
    };

    let elapsed_us = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "DSR-constrained loan eligibility (inverse annuity)",
        &serde_json::json!({
            "max_dsr": input.max_dsr.to_string(),
            "max_financing_rate": input.max_financing_rate.to_string(),
            "annual_rate_percent": input.annual_rate_percent.to_string(),
            "tenure_years": input.tenure_years,
            "borderline_from": input.thresholds.borderline_from.to_string(),
            "not_eligible_from": input.thresholds.not_eligible_from.to_string(),
        }),
        warnings,
        elapsed_us,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &EligibilityInput) -> CalcResult<()> {
    if input.total_monthly_income <= Decimal::ZERO {
        return Err(CalcError::invalid(
            "total_monthly_income",
            "Monthly income must be positive",
        ));
    }
    if input.existing_monthly_commitments < Decimal::ZERO {
        return Err(CalcError::invalid(
            "existing_monthly_commitments",
            "Commitments cannot be negative",
        ));
    }
    if input.max_dsr <= Decimal::ZERO || input.max_dsr > Decimal::ONE {
        return Err(CalcError::invalid("max_dsr", "Maximum DSR must be in (0, 1]"));
    }
    if input.max_financing_rate <= Decimal::ZERO || input.max_financing_rate > Decimal::ONE {
        return Err(CalcError::invalid(
            "max_financing_rate",
            "Financing rate must be in (0, 1]",
        ));
    }
    let t = &input.thresholds;
    if t.borderline_from <= Decimal::ZERO || t.borderline_from > t.not_eligible_from {
        return Err(CalcError::invalid(
            "thresholds",
            "Borderline threshold must be positive and not above the not-eligible threshold",
        ));
    }
    validate_rate_and_tenure(input.annual_rate_percent, input.tenure_years)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
