//! Raw search responses and rehydrated hits

use crate::models::Model;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Facet counts: category -> value -> count
pub type Facets = BTreeMap<String, BTreeMap<String, u64>>;

/// Search response as returned by the service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawResults {
    /// Total number of matching documents
    #[serde(default)]
    pub matches: u64,
    /// Matches for the requested page, in ranking order
    #[serde(default)]
    pub results: Vec<RawMatch>,
    /// Facet breakdown, when categories are indexed
    #[serde(default)]
    pub facets: Facets,
}

/// One raw match
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMatch {
    /// `"<type> <id>"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docid: Option<String>,
    /// Fetched `__type` field
    #[serde(rename = "__type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Fetched `__id` field (string on the wire, numeric in some fixtures)
    #[serde(rename = "__id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Any other returned fields
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl RawMatch {
    /// Match carrying a docid only
    pub fn from_docid(docid: impl Into<String>) -> Self {
        Self {
            docid: Some(docid.into()),
            ..Default::default()
        }
    }

    /// Match carrying the `__type`/`__id` tags, plus the matching docid
    pub fn tagged(type_name: impl Into<String>, id: i64) -> Self {
        let type_name = type_name.into();
        Self {
            docid: Some(format!("{} {}", type_name, id)),
            type_name: Some(type_name),
            id: Some(Value::String(id.to_string())),
            fields: BTreeMap::new(),
        }
    }

    fn docid_parts(&self) -> Option<(&str, &str)> {
        self.docid.as_deref().and_then(|docid| docid.rsplit_once(' '))
    }

    /// Type tag, from `__type` or else the docid prefix
    pub fn type_tag(&self) -> Option<&str> {
        self.type_name
            .as_deref()
            .or_else(|| self.docid_parts().map(|(type_name, _)| type_name))
    }

    /// Record id, from `__id` or else the last docid token
    pub fn record_id(&self) -> Option<i64> {
        let from_tag = match self.id {
            Some(Value::String(ref id)) => id.trim().parse().ok(),
            Some(Value::Number(ref id)) => id.as_i64(),
            _ => None,
        };
        from_tag.or_else(|| {
            self.docid_parts()
                .and_then(|(_, id)| id.trim().parse().ok())
        })
    }
}

/// A rehydrated record, in result order
#[derive(Clone)]
pub struct SearchHit {
    type_name: &'static str,
    id: i64,
    record: Arc<dyn Any + Send + Sync>,
}

impl SearchHit {
    pub fn new<M: Model>(record: M) -> Self {
        Self {
            type_name: M::TYPE_NAME,
            id: record.id(),
            record: Arc::new(record),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Whether the hit holds a record of type `M`
    pub fn is<M: Model>(&self) -> bool {
        self.record.is::<M>()
    }

    /// Borrow the record as `M`
    pub fn downcast_ref<M: Model>(&self) -> Option<&M> {
        self.record.downcast_ref::<M>()
    }
}

impl fmt::Debug for SearchHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchHit")
            .field("type_name", &self.type_name)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Dog, Person};
    use serde_json::json;

    #[test]
    fn test_parse_raw_match() {
        let raw: RawMatch = serde_json::from_value(json!({
            "docid": "Person 1",
            "name": "pedro",
            "__type": "Person",
            "__id": "1"
        }))
        .unwrap();

        assert_eq!(raw.type_tag(), Some("Person"));
        assert_eq!(raw.record_id(), Some(1));
        assert_eq!(raw.fields.get("name"), Some(&json!("pedro")));
    }

    #[test]
    fn test_docid_only_match() {
        let raw = RawMatch::from_docid("Dog 7");
        assert_eq!(raw.type_tag(), Some("Dog"));
        assert_eq!(raw.record_id(), Some(7));

        let numeric: RawMatch = serde_json::from_value(json!({"__type": "Cat", "__id": 9})).unwrap();
        assert_eq!(numeric.record_id(), Some(9));

        assert_eq!(RawMatch::default().type_tag(), None);
        assert_eq!(RawMatch::from_docid("nonsense").record_id(), None);
    }

    #[test]
    fn test_hit_downcast() {
        let hit = SearchHit::new(Dog::new(7, "fido"));
        assert!(hit.is::<Dog>());
        assert!(!hit.is::<Person>());
        assert_eq!(hit.downcast_ref::<Dog>().map(|d| d.name.as_str()), Some("fido"));
        assert_eq!(hit.type_name(), "Dog");
        assert_eq!(hit.id(), 7);
    }
}
