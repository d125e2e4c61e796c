//! Document and index option builders

use crate::models::{IndexConfig, Model};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Aggregate of every declared field, used for free-text matching
pub const ANY_FIELD: &str = "__any";
/// Type tag field
pub const TYPE_FIELD: &str = "__type";
/// Record id field
pub const ID_FIELD: &str = "__id";
/// Document timestamp field
pub const TIMESTAMP_FIELD: &str = "timestamp";

const ANY_SEPARATOR: &str = " . ";

/// A document ready to be pushed to the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// `"<type> <id>"`
    pub docid: String,
    /// Field values, including the `__any`, `__type` and `__id` tags
    pub fields: BTreeMap<String, String>,
}

impl Document {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn any(&self) -> Option<&str> {
        self.field(ANY_FIELD)
    }

    pub fn timestamp(&self) -> Option<i64> {
        self.field(TIMESTAMP_FIELD).and_then(|t| t.parse().ok())
    }
}

/// Scoring variables and facet categories sent alongside a document.
///
/// A key is absent when the model declares no extractor of that kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<u32, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<BTreeMap<String, String>>,
}

impl IndexOptions {
    pub fn is_empty(&self) -> bool {
        self.variables.is_none() && self.categories.is_none()
    }
}

/// One entry of a bulk upsert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchDocument {
    pub docid: String,
    pub fields: BTreeMap<String, String>,
    #[serde(flatten)]
    pub options: IndexOptions,
}

/// Service-side identifier of a record
pub fn doc_id<M: Model>(record: &M) -> String {
    format!("{} {}", M::TYPE_NAME, record.id())
}

/// Build the document for a record
pub fn build_document<M: Model>(config: &IndexConfig<M>, record: &M) -> Document {
    let mut fields = BTreeMap::new();
    let mut values = Vec::with_capacity(config.fields.len());

    for field in &config.fields {
        if let Some(value) = stringify(&field.extract(record)) {
            values.push(value.clone());
            fields.insert(field.name.clone(), value);
        }
    }

    if let Some(created_at) = record.created_at() {
        fields.insert(TIMESTAMP_FIELD.to_string(), created_at.timestamp().to_string());
    }

    values.sort();
    fields.insert(ANY_FIELD.to_string(), values.join(ANY_SEPARATOR));
    fields.insert(TYPE_FIELD.to_string(), M::TYPE_NAME.to_string());
    fields.insert(ID_FIELD.to_string(), record.id().to_string());

    Document {
        docid: doc_id(record),
        fields,
    }
}

/// Evaluate the variable and category extractors of a record
pub fn build_index_options<M: Model>(config: &IndexConfig<M>, record: &M) -> IndexOptions {
    let variables = (!config.variables.is_empty()).then(|| {
        config
            .variables
            .iter()
            .fold(BTreeMap::new(), |mut acc, extractor| {
                acc.extend(extractor(record));
                acc
            })
    });

    let categories = (!config.categories.is_empty()).then(|| {
        config
            .categories
            .iter()
            .fold(BTreeMap::new(), |mut acc, extractor| {
                acc.extend(extractor(record));
                acc
            })
    });

    IndexOptions {
        variables,
        categories,
    }
}

/// Build the bulk upsert entry for a record
pub fn batch_document<M: Model>(config: &IndexConfig<M>, record: &M) -> BatchDocument {
    let Document { docid, fields } = build_document(config, record);
    BatchDocument {
        docid,
        fields,
        options: build_index_options(config, record),
    }
}

/// Render a field value as index text; `None` for null.
///
/// Lists are flattened and joined with a single space.
pub(crate) fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(render(other)),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(" "),
        other => other.to_string(),
    }
}

/// Flatten nested lists into scalar strings, dropping nulls
pub(crate) fn flatten_values(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                flatten_values(item, out);
            }
        }
        other => out.push(render(other)),
    }
}
