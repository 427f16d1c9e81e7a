pub mod inference;
pub mod stats;
