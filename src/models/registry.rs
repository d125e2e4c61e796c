//! Registry of declared models and their index configuration

use super::dsl::{Declaration, IndexConfig, IndexDsl};
use super::traits::{Model, RecordStore};
use crate::error::{Result, TankerError};
use crate::index::{batch_document, BatchDocument};
use crate::results::SearchHit;
use async_trait::async_trait;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Type-erased view of a registered model, used where only the type tag of
/// a match is known
#[async_trait]
pub(crate) trait RegisteredModel: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn index_name(&self) -> &str;

    fn per_page(&self) -> Option<u32>;

    fn functions(&self) -> &BTreeMap<u32, String>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Bulk-load records by id, one store call
    async fn find(&self, ids: &[i64]) -> Result<Vec<SearchHit>>;

    /// Load every record (optionally scoped) as bulk upsert documents
    async fn batch_documents(&self, scope: Option<&str>) -> Result<Vec<BatchDocument>>;
}

struct ModelEntry<M: Model> {
    config: IndexConfig<M>,
    store: Arc<dyn RecordStore<M>>,
}

#[async_trait]
impl<M: Model> RegisteredModel for ModelEntry<M> {
    fn type_name(&self) -> &'static str {
        M::TYPE_NAME
    }

    fn index_name(&self) -> &str {
        &self.config.index_name
    }

    fn per_page(&self) -> Option<u32> {
        M::per_page()
    }

    fn functions(&self) -> &BTreeMap<u32, String> {
        &self.config.functions
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    async fn find(&self, ids: &[i64]) -> Result<Vec<SearchHit>> {
        let records = self.store.find(ids).await.map_err(TankerError::Store)?;
        Ok(records.into_iter().map(SearchHit::new).collect())
    }

    async fn batch_documents(&self, scope: Option<&str>) -> Result<Vec<BatchDocument>> {
        let records = self.store.all(scope).await.map_err(TankerError::Store)?;
        Ok(records
            .iter()
            .map(|record| batch_document(&self.config, record))
            .collect())
    }
}

/// Registry of all declared models
///
/// Built once at startup, then shared behind an `Arc` with the search
/// executor and the index admin.
pub struct ModelRegistry {
    /// Models by type name
    models: HashMap<String, Box<dyn RegisteredModel>>,
    /// Type names in registration order
    order: Vec<&'static str>,
    /// Index name for declarations that do not supply one
    default_index: Option<String>,
}

impl ModelRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            models: HashMap::new(),
            order: Vec::new(),
            default_index: None,
        }
    }

    /// Create a registry that falls back to `index_name` for unnamed
    /// declarations
    pub fn with_default_index(index_name: impl Into<String>) -> Self {
        Self {
            default_index: Some(index_name.into()),
            ..Self::new()
        }
    }

    /// Create a registry using the settings' default index name
    pub fn from_settings(settings: &crate::config::Settings) -> Self {
        Self {
            default_index: settings.default_index_name(),
            ..Self::new()
        }
    }

    /// Declare (or extend) the index configuration of a model.
    ///
    /// Declaring the same model again merges into the existing
    /// configuration; the index name only changes when the new declaration
    /// names one. The record store is replaced by the latest one given.
    pub fn tankit<M: Model>(
        &mut self,
        store: Arc<dyn RecordStore<M>>,
        declaration: Declaration<M>,
    ) -> Result<()> {
        let Declaration { index_name, block } = declaration;
        let block = block.ok_or_else(|| TankerError::MissingBlock(M::TYPE_NAME.to_string()))?;

        let mut dsl = IndexDsl::new();
        block(&mut dsl);

        if let Some(model) = self.models.get_mut(M::TYPE_NAME) {
            let entry = model
                .as_any_mut()
                .downcast_mut::<ModelEntry<M>>()
                .ok_or_else(|| {
                    TankerError::NotConfigured(format!(
                        "{} (type name already declared by another model)",
                        M::TYPE_NAME
                    ))
                })?;
            if let Some(name) = index_name {
                entry.config.index_name = name;
            }
            entry.config.merge(dsl);
            entry.store = store;
            debug!(
                "Extended {} declaration (index {})",
                M::TYPE_NAME,
                entry.config.index_name
            );
            return Ok(());
        }

        let name = index_name
            .or_else(|| self.default_index.clone())
            .ok_or_else(|| TankerError::MissingIndexName(M::TYPE_NAME.to_string()))?;

        let mut config = IndexConfig::new(name);
        config.merge(dsl);
        debug!("Declared {} on index {}", M::TYPE_NAME, config.index_name);

        self.models
            .insert(M::TYPE_NAME.to_string(), Box::new(ModelEntry { config, store }));
        if !self.order.contains(&M::TYPE_NAME) {
            self.order.push(M::TYPE_NAME);
        }
        Ok(())
    }

    /// Get the configuration of a declared model
    pub fn config<M: Model>(&self) -> Result<&IndexConfig<M>> {
        self.models
            .get(M::TYPE_NAME)
            .and_then(|model| model.as_any().downcast_ref::<ModelEntry<M>>())
            .map(|entry| &entry.config)
            .ok_or_else(|| TankerError::NotConfigured(M::TYPE_NAME.to_string()))
    }

    pub(crate) fn get(&self, type_name: &str) -> Result<&dyn RegisteredModel> {
        self.models
            .get(type_name)
            .map(|model| model.as_ref())
            .ok_or_else(|| TankerError::NotConfigured(type_name.to_string()))
    }

    /// Index name of a declared type
    pub fn index_name(&self, type_name: &str) -> Result<&str> {
        self.get(type_name).map(|model| model.index_name())
    }

    /// Declared type names in registration order
    pub fn model_types(&self) -> Vec<&'static str> {
        self.order.clone()
    }

    /// Distinct index names of all declared models
    pub fn available_indexes(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for type_name in &self.order {
            if let Some(model) = self.models.get(*type_name) {
                let name = model.index_name();
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    /// Scoring functions declared by every model stored in `index_name`
    pub fn functions_for(&self, index_name: &str) -> BTreeMap<u32, String> {
        let mut functions = BTreeMap::new();
        for type_name in &self.order {
            if let Some(model) = self.models.get(*type_name) {
                if model.index_name() == index_name {
                    functions.extend(
                        model
                            .functions()
                            .iter()
                            .map(|(slot, definition)| (*slot, definition.clone())),
                    );
                }
            }
        }
        functions
    }

    /// Check if a type has been declared
    pub fn contains(&self, type_name: &str) -> bool {
        self.models.contains_key(type_name)
    }

    /// Get number of declared models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
