//! Model and record store traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// An application record type that can be pushed to a search index
pub trait Model: Send + Sync + 'static {
    /// Type tag stored in `__type` and used as the docid prefix
    const TYPE_NAME: &'static str;

    /// Record identifier, stored in `__id`
    fn id(&self) -> i64;

    /// Named field accessor used by plain `indexes("field")` declarations.
    ///
    /// Unknown fields should return `Value::Null`, which leaves them out of
    /// the document.
    fn field(&self, _name: &str) -> Value {
        Value::Null
    }

    /// Creation time; when present it is sent as the document timestamp
    fn created_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Results per page for searches led by this model
    fn per_page() -> Option<u32> {
        None
    }
}

/// Access to the authoritative copy of a model's records
#[async_trait]
pub trait RecordStore<M: Model>: Send + Sync {
    /// Load the records with the given ids, in any order
    async fn find(&self, ids: &[i64]) -> anyhow::Result<Vec<M>>;

    /// Load every record, optionally restricted to a named scope
    async fn all(&self, scope: Option<&str>) -> anyhow::Result<Vec<M>>;
}
