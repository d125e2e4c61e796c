//! Declaration DSL for indexable models

use super::traits::Model;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Computes a field value from a record
pub type FieldExtractor<M> = Arc<dyn Fn(&M) -> Value + Send + Sync>;

/// Computes scoring variables (slot -> value) from a record
pub type VariableExtractor<M> = Arc<dyn Fn(&M) -> BTreeMap<u32, f64> + Send + Sync>;

/// Computes facet categories (name -> value) from a record
pub type CategoryExtractor<M> = Arc<dyn Fn(&M) -> BTreeMap<String, String> + Send + Sync>;

type Block<M> = Box<dyn FnOnce(&mut IndexDsl<M>) + Send>;

/// A declared field: either read through `Model::field` or computed
pub struct FieldDef<M> {
    pub name: String,
    pub extractor: Option<FieldExtractor<M>>,
}

impl<M> Clone for FieldDef<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            extractor: self.extractor.clone(),
        }
    }
}

impl<M: Model> FieldDef<M> {
    /// Evaluate the field against a record
    pub fn extract(&self, record: &M) -> Value {
        match self.extractor {
            Some(ref extractor) => extractor(record),
            None => record.field(&self.name),
        }
    }
}

/// Builder handed to declaration blocks
pub struct IndexDsl<M> {
    fields: Vec<FieldDef<M>>,
    variables: Vec<VariableExtractor<M>>,
    categories: Vec<CategoryExtractor<M>>,
    functions: BTreeMap<u32, String>,
}

impl<M: Model> IndexDsl<M> {
    pub(crate) fn new() -> Self {
        Self {
            fields: Vec::new(),
            variables: Vec::new(),
            categories: Vec::new(),
            functions: BTreeMap::new(),
        }
    }

    /// Index a field read through `Model::field`
    pub fn indexes(&mut self, field: impl Into<String>) -> &mut Self {
        self.fields.push(FieldDef {
            name: field.into(),
            extractor: None,
        });
        self
    }

    /// Index a field computed from the record
    pub fn indexes_with<F, V>(&mut self, field: impl Into<String>, extractor: F) -> &mut Self
    where
        F: Fn(&M) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.fields.push(FieldDef {
            name: field.into(),
            extractor: Some(Arc::new(move |record: &M| extractor(record).into())),
        });
        self
    }

    /// Attach scoring variables
    pub fn variables<F>(&mut self, extractor: F) -> &mut Self
    where
        F: Fn(&M) -> BTreeMap<u32, f64> + Send + Sync + 'static,
    {
        self.variables.push(Arc::new(extractor));
        self
    }

    /// Attach facet categories
    pub fn categories<F>(&mut self, extractor: F) -> &mut Self
    where
        F: Fn(&M) -> BTreeMap<String, String> + Send + Sync + 'static,
    {
        self.categories.push(Arc::new(extractor));
        self
    }

    /// Define a scoring function, installed when the index is built
    pub fn function(&mut self, slot: u32, definition: impl Into<String>) -> &mut Self {
        self.functions.insert(slot, definition.into());
        self
    }
}

/// Index configuration of one model type
pub struct IndexConfig<M> {
    pub index_name: String,
    pub fields: Vec<FieldDef<M>>,
    pub variables: Vec<VariableExtractor<M>>,
    pub categories: Vec<CategoryExtractor<M>>,
    pub functions: BTreeMap<u32, String>,
}

impl<M: Model> IndexConfig<M> {
    pub(crate) fn new(index_name: String) -> Self {
        Self {
            index_name,
            fields: Vec::new(),
            variables: Vec::new(),
            categories: Vec::new(),
            functions: BTreeMap::new(),
        }
    }

    /// Fold a declaration block's output into this configuration.
    ///
    /// Fields are keyed by name: a redeclared field replaces the earlier
    /// extractor but keeps its original position. Extractors accumulate and
    /// are merged in declaration order when a document is built.
    pub(crate) fn merge(&mut self, dsl: IndexDsl<M>) {
        for field in dsl.fields {
            match self.fields.iter_mut().find(|f| f.name == field.name) {
                Some(existing) => *existing = field,
                None => self.fields.push(field),
            }
        }
        self.variables.extend(dsl.variables);
        self.categories.extend(dsl.categories);
        self.functions.extend(dsl.functions);
    }

    /// Declared field names in order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

impl<M> fmt::Debug for IndexConfig<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexConfig")
            .field("index_name", &self.index_name)
            .field(
                "fields",
                &self.fields.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            )
            .field("variables", &self.variables.len())
            .field("categories", &self.categories.len())
            .field("functions", &self.functions)
            .finish()
    }
}

/// A `tankit` declaration: an optional index name plus the block to run
pub struct Declaration<M> {
    pub(crate) index_name: Option<String>,
    pub(crate) block: Option<Block<M>>,
}

impl<M: Model> Declaration<M> {
    /// Declaration without an index name; the registry keeps the previous
    /// name or falls back to its default
    pub fn new() -> Self {
        Self {
            index_name: None,
            block: None,
        }
    }

    /// Declaration targeting a named index
    pub fn named(index_name: impl Into<String>) -> Self {
        Self {
            index_name: Some(index_name.into()),
            block: None,
        }
    }

    /// Set the declaration block
    pub fn block<F>(mut self, block: F) -> Self
    where
        F: FnOnce(&mut IndexDsl<M>) + Send + 'static,
    {
        self.block = Some(Box::new(block));
        self
    }
}

impl<M: Model> Default for Declaration<M> {
    fn default() -> Self {
        Self::new()
    }
}
