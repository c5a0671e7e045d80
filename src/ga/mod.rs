pub mod identity;
pub mod individual;
pub mod lifecycle;
pub mod manager;
pub mod operators;

pub use individual::Individual;
pub use manager::{GaManager, FIRST_ELITE_ID};
