pub mod bracket;
pub mod property;
