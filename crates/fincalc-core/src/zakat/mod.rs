pub mod nisab;
pub mod wealth;
