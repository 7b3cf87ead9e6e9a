pub mod bounds;
pub mod evaluator;
pub mod types;

pub use bounds::{compute_bounds, market_price};
pub use evaluator::evaluate;
pub use types::{ArbitrageParams, ArbitrageResult};
