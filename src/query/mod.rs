//! Query building
//!
//! Translates a `SearchRequest` into the service's query syntax:
//! - free text is matched against the `__any` aggregate field
//! - the requested model types become a `__type:(A OR B)` clause
//! - field conditions are appended as `field:(value)` clauses
//! - function/docvar ranges become `filter_functionN` / `filter_docvarN`
//! - only the `__type` and `__id` tags are fetched back

use crate::error::{Result, TankerError};
use crate::index::{flatten_values, ANY_FIELD, ID_FIELD, TYPE_FIELD};
use crate::models::ModelRegistry;
use crate::network::SearchOptions;
use crate::search::{FilterRange, SearchRequest};
use serde_json::Value;

/// Query string parameter; never taken from caller options
pub const QUERY_PARAM: &str = "q";

/// Wire-level search ready to send to an index
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltSearch {
    /// Index shared by every requested type
    pub index_name: String,
    /// Query string
    pub query: String,
    /// Query options
    pub options: SearchOptions,
    /// Page number (1-indexed)
    pub page: u32,
    /// Results per page
    pub per_page: u32,
}

/// Builds wire-level searches against a model registry
pub struct QueryBuilder<'a> {
    registry: &'a ModelRegistry,
    default_per_page: u32,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(registry: &'a ModelRegistry) -> Self {
        Self {
            registry,
            default_per_page: crate::DEFAULT_PER_PAGE,
        }
    }

    /// Per-page size used when neither the request nor the lead model sets one
    pub fn with_default_per_page(mut self, per_page: u32) -> Self {
        self.default_per_page = per_page;
        self
    }

    pub fn build(&self, request: &SearchRequest) -> Result<BuiltSearch> {
        let lead = request.types.first().ok_or(TankerError::NoModels)?;

        let mut index_names: Vec<&str> = Vec::new();
        for type_name in &request.types {
            let name = self.registry.index_name(type_name)?;
            if !index_names.contains(&name) {
                index_names.push(name);
            }
        }
        if index_names.len() > 1 {
            return Err(TankerError::MultipleIndexes(
                index_names.into_iter().map(String::from).collect(),
            ));
        }

        let page = request.page.unwrap_or(1).max(1);
        let per_page = match request.per_page {
            Some(per_page) => per_page,
            None => self
                .registry
                .get(lead)?
                .per_page()
                .unwrap_or(self.default_per_page),
        };

        let mut query = format!(
            "{}:({}) {}:({})",
            ANY_FIELD,
            request.query,
            TYPE_FIELD,
            request.types.join(" OR ")
        );
        query.push_str(&condition_clauses(&request.conditions));

        let mut options = request.options.clone();
        options.remove(QUERY_PARAM);
        for (slot, ranges) in &request.filter_functions {
            options.insert(format!("filter_function{}", slot), render_ranges(ranges));
        }
        for (slot, ranges) in &request.filter_docvars {
            options.insert(format!("filter_docvar{}", slot), render_ranges(ranges));
        }
        if let Some(ref filters) = request.category_filters {
            options.insert("category_filters".to_string(), serde_json::to_string(filters)?);
        }
        options.insert("fetch".to_string(), format!("{},{}", TYPE_FIELD, ID_FIELD));
        let start = u64::from(per_page) * u64::from(page - 1);
        options.insert("start".to_string(), start.to_string());
        options.insert("len".to_string(), per_page.to_string());

        Ok(BuiltSearch {
            index_name: index_names[0].to_string(),
            query,
            options,
            page,
            per_page,
        })
    }
}

/// Render field conditions as ` field:(value)` clauses, one per value.
///
/// Repeated values of a field produce repeated clauses, so every value must
/// match.
pub fn condition_clauses(conditions: &[(String, Vec<Value>)]) -> String {
    let mut clauses = String::new();
    for (field, values) in conditions {
        let mut flat = Vec::new();
        for value in values {
            flatten_values(value, &mut flat);
        }
        for value in flat {
            clauses.push_str(&format!(" {}:({})", field, value));
        }
    }
    clauses
}

/// Render ranges as `low:high` pairs separated by commas
pub fn render_ranges(ranges: &[FilterRange]) -> String {
    ranges
        .iter()
        .map(|range| range.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
