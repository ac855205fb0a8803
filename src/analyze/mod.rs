pub mod analyzer;
pub mod bugs;
mod model;

pub use analyzer::Analyzer;
pub use model::*;
