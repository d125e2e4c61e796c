//! Search results
//!
//! Raw service responses, rehydration into application records and the
//! paginated result wrapper.

mod page;
mod rehydrate;
mod types;

pub use page::SearchResults;
pub use rehydrate::rehydrate;
pub use types::*;
