//! Search orchestration module
//!
//! Builds searches over the declared models, runs them against the service
//! and keeps individual records in sync with their index.

mod executor;
mod models;

pub use executor::Tanker;
pub use models::*;
