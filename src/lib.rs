//! Tanker: declarative model indexing for IndexTank-style search services
//!
//! Model types declare which fields, variables and categories they push to a
//! hosted search index. Searches are translated into the service's query
//! syntax and the returned matches are rehydrated into the application's own
//! records, in ranking order, across several model types at once.

pub mod admin;
pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod network;
pub mod query;
pub mod results;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;

pub use admin::{IndexAdmin, ReindexOptions};
pub use config::Settings;
pub use error::{Result, ServiceError, TankerError};
pub use index::{BatchDocument, Document, IndexOptions};
pub use models::{Declaration, IndexConfig, IndexDsl, Model, ModelRegistry, RecordStore};
pub use network::{ApiClient, HttpApiClient, IndexClient};
pub use results::{RawMatch, RawResults, SearchHit, SearchResults};
pub use search::{Bound, FilterRange, SearchRequest, Tanker};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Results per page when nothing else is configured
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Records per bulk upsert while reindexing
pub const DEFAULT_BATCH_SIZE: usize = 200;
