pub mod early;
pub mod recommendation;
