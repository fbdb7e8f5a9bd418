pub mod fetch_coordinator;
pub mod leg_set;
pub mod market_classifier;
pub mod parlay;

pub use fetch_coordinator::*;
pub use leg_set::*;
pub use market_classifier::*;
pub use parlay::*;
