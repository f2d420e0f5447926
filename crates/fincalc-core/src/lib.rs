pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "fees")]
pub mod fees;

#[cfg(feature = "eligibility")]
pub mod eligibility;

#[cfg(feature = "settlement")]
pub mod settlement;

#[cfg(feature = "zakat")]
pub mod zakat;

#[cfg(feature = "epf")]
pub mod epf;

pub use error::CalcError;
pub use types::*;

/// Standard result type for all fincalc operations
pub type CalcResult<T> = Result<T, CalcError>;
