pub mod amortization;
pub mod eligibility;
pub mod epf;
pub mod fees;
pub mod settlement;
pub mod zakat;
