//! Index lifecycle and reindexing
//!
//! Administrative helpers used by offline tools. Every operation here is
//! best effort: failures are logged and swallowed so that loops over several
//! indexes or batches keep going.

use crate::config::{IndexSettings, Settings};
use crate::error::{Result, TankerError};
use crate::models::{Model, ModelRegistry};
use crate::network::{ApiClient, HttpApiClient, IndexClient};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info};

/// Options for reindexing one model type
#[derive(Debug, Clone, Default)]
pub struct ReindexOptions {
    /// Named record scope passed to `RecordStore::all`
    pub scope: Option<String>,
    /// Records per bulk upsert; the settings value when unset
    pub batch_size: Option<usize>,
}

impl ReindexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }
}

/// Index lifecycle helper over the declared models
pub struct IndexAdmin {
    api: Arc<dyn ApiClient>,
    registry: Arc<ModelRegistry>,
    settings: IndexSettings,
}

impl IndexAdmin {
    pub fn new(api: Arc<dyn ApiClient>, registry: Arc<ModelRegistry>) -> Self {
        Self {
            api,
            registry,
            settings: IndexSettings::default(),
        }
    }

    /// Build a helper talking HTTP to the configured service
    pub fn from_settings(settings: &Settings, registry: Arc<ModelRegistry>) -> Result<Self> {
        let api = HttpApiClient::with_settings(&settings.api)?;
        Ok(Self::new(Arc::new(api), registry).with_settings(settings.index.clone()))
    }

    /// Set polling, timeout and batch settings
    pub fn with_settings(mut self, settings: IndexSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Type names of every declared model
    pub fn model_types(&self) -> Vec<&'static str> {
        self.registry.model_types()
    }

    /// Distinct index names used by the declared models
    pub fn available_indexes(&self) -> Vec<String> {
        self.registry.available_indexes()
    }

    /// Whether an index exists; `false` when the service cannot be reached
    pub async fn index_exists(&self, index_name: &str) -> bool {
        match self.api.get_index(index_name).exists().await {
            Ok(exists) => exists,
            Err(e) => {
                error!("There was an error checking the {} index: {}", index_name, e);
                false
            }
        }
    }

    /// Create an index unless it exists, wait for it to start, then install
    /// the scoring functions declared for it
    pub async fn build_index(&self, index_name: &str) {
        if let Err(e) = self.try_build_index(index_name).await {
            error!("There was an error creating the {} index: {}", index_name, e);
        }
    }

    pub(crate) async fn try_build_index(&self, index_name: &str) -> Result<()> {
        let index = self.api.get_index(index_name);
        if index.exists().await? {
            return Ok(());
        }

        info!("Creating {} index", index_name);
        index.create().await?;

        info!("Waiting for the index to be ready");
        self.wait_until_running(index.as_ref()).await?;

        for (slot, definition) in self.registry.functions_for(index_name) {
            debug!("Defining function {} on {}: {}", slot, index_name, definition);
            index.add_function(slot, &definition).await?;
        }
        Ok(())
    }

    async fn wait_until_running(&self, index: &dyn IndexClient) -> Result<()> {
        let poll_interval = self.settings.poll_interval();
        let polling = async {
            loop {
                if index.running().await? {
                    return Ok::<(), TankerError>(());
                }
                sleep(poll_interval).await;
            }
        };

        match timeout(self.settings.ready_timeout(), polling).await {
            Ok(result) => result,
            Err(_) => Err(TankerError::ReadyTimeout {
                index: index.name().to_string(),
                seconds: self.settings.ready_timeout_secs,
            }),
        }
    }

    /// Delete an index if it exists
    pub async fn delete_index(&self, index_name: &str) {
        if let Err(e) = self.try_delete_index(index_name).await {
            error!("There was an error clearing the {} index: {}", index_name, e);
        }
    }

    async fn try_delete_index(&self, index_name: &str) -> Result<()> {
        let index = self.api.get_index(index_name);
        if index.exists().await? {
            info!("Deleting {} index", index_name);
            index.delete().await?;
        }
        Ok(())
    }

    /// Delete and recreate every index used by a declared model
    pub async fn clear_all_indexes(&self) {
        for index_name in self.available_indexes() {
            self.delete_index(&index_name).await;
            self.build_index(&index_name).await;
        }
    }

    /// Push every record of `M` to its index in bulk batches
    pub async fn reindex<M: Model>(&self, options: ReindexOptions) {
        self.reindex_type(M::TYPE_NAME, options).await;
    }

    /// Reindex a declared model by type name
    pub async fn reindex_type(&self, type_name: &str, options: ReindexOptions) {
        if let Err(e) = self.try_reindex_type(type_name, &options).await {
            error!("There was an error reindexing {}: {}", type_name, e);
        }
    }

    async fn try_reindex_type(&self, type_name: &str, options: &ReindexOptions) -> Result<()> {
        info!("Indexing {} model", type_name);
        let model = self.registry.get(type_name)?;
        let index_name = model.index_name();

        if !self.api.get_index(index_name).exists().await? {
            self.build_index(index_name).await;
        }

        let documents = model.batch_documents(options.scope.as_deref()).await?;
        let total = documents.len();
        let batch_size = options.batch_size.unwrap_or(self.settings.batch_size).max(1);
        let index = self.api.get_index(index_name);

        let timer = Instant::now();
        for (idx, batch) in documents.chunks(batch_size).enumerate() {
            let position = idx * batch_size + batch.len();
            match index.add_documents(batch).await {
                Ok(()) => info!("Indexed {} records   {}/{}", batch.len(), position, total),
                Err(e) => error!(
                    "Failed to index {} {} records ({}/{}): {}",
                    batch.len(),
                    type_name,
                    position,
                    total,
                    e
                ),
            }
        }
        info!(
            "Indexed {} {} records in {:.2} seconds",
            total,
            type_name,
            timer.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Reindex every declared model with default options
    pub async fn reindex_all_models(&self) {
        for type_name in self.model_types() {
            self.reindex_type(type_name, ReindexOptions::default()).await;
        }
    }
}
