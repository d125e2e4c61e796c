//! Document mapping
//!
//! Turns model records into the documents, variables and categories pushed
//! to the search index.

mod document;

pub use document::{
    batch_document, build_document, build_index_options, doc_id, BatchDocument, Document,
    IndexOptions, ANY_FIELD, ID_FIELD, TIMESTAMP_FIELD, TYPE_FIELD,
};
pub(crate) use document::flatten_values;
