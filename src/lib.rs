pub mod config;
pub mod error;
pub mod ga;
pub mod rating;
pub mod workshop;

pub use error::{Result, TunerError};
