//! Search service networking
//!
//! Client traits for the hosted index service and their HTTP binding.

mod api;
mod client;

pub use api::{ApiClient, IndexClient, SearchOptions, ServiceResult};
pub use client::{HttpApiClient, HttpIndex};
