//! Search request and filter models

use crate::models::Model;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// One end of a filter range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Bound {
    /// Unbounded, rendered as `*`
    Open,
    Value(f64),
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Open => f.write_str("*"),
            Bound::Value(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for Bound {
    fn from(value: f64) -> Self {
        Bound::Value(value)
    }
}

impl From<i64> for Bound {
    fn from(value: i64) -> Self {
        Bound::Value(value as f64)
    }
}

impl From<i32> for Bound {
    fn from(value: i32) -> Self {
        Bound::Value(f64::from(value))
    }
}

/// A `low:high` range for function or docvar filters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterRange {
    pub low: Bound,
    pub high: Bound,
}

impl FilterRange {
    pub fn new(low: impl Into<Bound>, high: impl Into<Bound>) -> Self {
        Self {
            low: low.into(),
            high: high.into(),
        }
    }

    /// Range with no lower bound
    pub fn at_most(high: impl Into<Bound>) -> Self {
        Self {
            low: Bound::Open,
            high: high.into(),
        }
    }

    /// Range with no upper bound
    pub fn at_least(low: impl Into<Bound>) -> Self {
        Self {
            low: low.into(),
            high: Bound::Open,
        }
    }
}

impl fmt::Display for FilterRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.low, self.high)
    }
}

/// A search over one or more model types sharing an index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Model type names to search
    pub types: Vec<String>,
    /// Free-text query
    pub query: String,
    /// Field conditions appended to the query, in declaration order
    pub conditions: Vec<(String, Vec<Value>)>,
    /// Ranges per scoring function slot
    pub filter_functions: BTreeMap<u32, Vec<FilterRange>>,
    /// Ranges per document variable slot
    pub filter_docvars: BTreeMap<u32, Vec<FilterRange>>,
    /// Category filters, sent as JSON
    pub category_filters: Option<Value>,
    /// Page number (1-indexed)
    pub page: Option<u32>,
    /// Results per page
    pub per_page: Option<u32>,
    /// Extra service options passed through verbatim
    pub options: BTreeMap<String, String>,
}

impl SearchRequest {
    /// Create a request for a free-text query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Create a request from several terms, joined with a space
    pub fn terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: Vec<String> = terms.into_iter().map(|t| t.as_ref().to_string()).collect();
        Self::new(terms.join(" "))
    }

    /// Add a model type to search
    pub fn model<M: Model>(self) -> Self {
        self.type_name(M::TYPE_NAME)
    }

    /// Add a model type by name
    pub fn type_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.types.contains(&name) {
            self.types.push(name);
        }
        self
    }

    /// Require `field` to match every given value
    pub fn condition<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.conditions
            .push((field.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Restrict scoring function `slot` to the given ranges
    pub fn filter_function(mut self, slot: u32, ranges: Vec<FilterRange>) -> Self {
        self.filter_functions.insert(slot, ranges);
        self
    }

    /// Restrict document variable `slot` to the given ranges
    pub fn filter_docvar(mut self, slot: u32, ranges: Vec<FilterRange>) -> Self {
        self.filter_docvars.insert(slot, ranges);
        self
    }

    /// Restrict results to category values
    pub fn category_filters(mut self, filters: Value) -> Self {
        self.category_filters = Some(filters);
        self
    }

    /// Set page number
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page.max(1));
        self
    }

    /// Set results per page
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Pass an option straight to the service
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Dog, Person};
    use serde_json::json;

    #[test]
    fn test_range_rendering() {
        assert_eq!(FilterRange::new(0, 10).to_string(), "0:10");
        assert_eq!(FilterRange::at_most(7).to_string(), "*:7");
        assert_eq!(FilterRange::at_least(2.5).to_string(), "2.5:*");
    }

    #[test]
    fn test_request_builder() {
        let request = SearchRequest::terms(["hey", "there"])
            .model::<Person>()
            .model::<Dog>()
            .model::<Person>()
            .condition("location_id", [1, 2])
            .with_page(0)
            .with_per_page(25);

        assert_eq!(request.query, "hey there");
        assert_eq!(request.types, vec!["Person", "Dog"]);
        assert_eq!(
            request.conditions,
            vec![("location_id".to_string(), vec![json!(1), json!(2)])]
        );
        assert_eq!(request.page, Some(1));
        assert_eq!(request.per_page, Some(25));
    }
}
