use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::{CalcError, CalcResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationTier {
    Recommended,
    Marginal,
    NotRecommended,
}

/// Cut-off above which settling early is worth recommending.
///
/// The home-loan calculator compares net savings against a fixed ringgit
/// amount; the car-loan calculator against a share of the balance being
/// settled. Both are kept as distinct policies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RecommendationPolicy {
    /// Recommend when net savings exceed `amount`.
    AbsoluteThreshold { amount: Money },
    /// Recommend when net savings exceed `fraction` of the outstanding balance.
    RelativeThreshold { fraction: Rate },
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        RecommendationPolicy::AbsoluteThreshold { amount: dec!(1000) }
    }
}

impl RecommendationPolicy {
    pub fn validate(&self) -> CalcResult<()> {
        match *self {
            RecommendationPolicy::AbsoluteThreshold { amount } if amount < Decimal::ZERO => Err(
                CalcError::invalid("amount", "Recommendation threshold cannot be negative"),
            ),
            RecommendationPolicy::RelativeThreshold { fraction } if fraction < Decimal::ZERO => Err(
                CalcError::invalid("fraction", "Recommendation fraction cannot be negative"),
            ),
            _ => Ok(()),
        }
    }

    /// Savings above the cut-off are Recommended, any other positive saving
    /// is Marginal, and a break-even or loss is NotRecommended.
    pub fn classify(&self, net_savings: Money, outstanding_balance: Money) -> RecommendationTier {
        let cutoff = match *self {
            RecommendationPolicy::AbsoluteThreshold { amount } => amount,
            RecommendationPolicy::RelativeThreshold { fraction } => outstanding_balance * fraction,
        };
        if net_savings > cutoff {
            RecommendationTier::Recommended
        } else if net_savings > Decimal::ZERO {
            RecommendationTier::Marginal
        } else {
            RecommendationTier::NotRecommended
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_absolute_threshold() {
        let p = RecommendationPolicy::default();
        assert_eq!(p.classify(dec!(1000.01), dec!(5)), RecommendationTier::Recommended);
        assert_eq!(p.classify(dec!(1000), dec!(5)), RecommendationTier::Marginal);
        assert_eq!(p.classify(dec!(0), dec!(5)), RecommendationTier::NotRecommended);
        assert_eq!(p.classify(dec!(-20), dec!(5)), RecommendationTier::NotRecommended);
    }

    #[test]
    fn test_relative_threshold_scales_with_balance() {
        let p = RecommendationPolicy::RelativeThreshold { fraction: dec!(0.05) };
        assert_eq!(p.classify(dec!(600), dec!(10_000)), RecommendationTier::Recommended);
        assert_eq!(p.classify(dec!(600), dec!(20_000)), RecommendationTier::Marginal);
    }

    #[test]
    fn test_policy_serde_tagged() {
        let json = r#"{"type":"RelativeThreshold","fraction":"0.05"}"#;
        let p: RecommendationPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(p, RecommendationPolicy::RelativeThreshold { fraction: dec!(0.05) });
    }

    #[test]
    fn test_negative_threshold_invalid() {
        let p = RecommendationPolicy::AbsoluteThreshold { amount: dec!(-1) };
        assert!(p.validate().is_err());
    }
}
