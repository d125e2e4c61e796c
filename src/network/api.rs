//! Search service client traits

use crate::error::ServiceError;
use crate::index::{BatchDocument, IndexOptions};
use crate::results::RawResults;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Result type for service calls
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Query options sent with a search (`start`, `len`, `fetch`, filters, ...)
pub type SearchOptions = BTreeMap<String, String>;

/// Entry point of a search service account
pub trait ApiClient: Send + Sync {
    /// Handle on a named index; no request is made until it is used
    fn get_index(&self, name: &str) -> Arc<dyn IndexClient>;
}

/// Operations on one remote index
#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Index name
    fn name(&self) -> &str;

    async fn exists(&self) -> ServiceResult<bool>;

    async fn create(&self) -> ServiceResult<()>;

    /// Whether a freshly created index has started and accepts requests
    async fn running(&self) -> ServiceResult<bool>;

    async fn delete(&self) -> ServiceResult<()>;

    async fn search(&self, query: &str, options: &SearchOptions) -> ServiceResult<RawResults>;

    async fn add_document(
        &self,
        docid: &str,
        fields: &BTreeMap<String, String>,
        options: &IndexOptions,
    ) -> ServiceResult<()>;

    /// Bulk upsert in a single request
    async fn add_documents(&self, documents: &[BatchDocument]) -> ServiceResult<()>;

    async fn delete_document(&self, docid: &str) -> ServiceResult<()>;

    /// Store a scoring function definition in a numbered slot
    async fn add_function(&self, slot: u32, definition: &str) -> ServiceResult<()>;
}
