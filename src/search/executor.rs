//! Search execution and per-record index updates

use crate::config::Settings;
use crate::error::Result;
use crate::index::{batch_document, build_document, build_index_options, doc_id, BatchDocument};
use crate::models::{Model, ModelRegistry};
use crate::network::{ApiClient, HttpApiClient, IndexClient};
use crate::query::QueryBuilder;
use crate::results::{rehydrate, SearchResults};
use crate::search::SearchRequest;
use std::sync::Arc;
use tracing::{debug, info};

/// Search executor and document writer for the declared models
pub struct Tanker {
    /// Search service
    api: Arc<dyn ApiClient>,
    /// Declared models
    registry: Arc<ModelRegistry>,
    /// Results per page when neither the request nor the model sets one
    default_per_page: u32,
}

impl Tanker {
    pub fn new(api: Arc<dyn ApiClient>, registry: Arc<ModelRegistry>) -> Self {
        Self {
            api,
            registry,
            default_per_page: crate::DEFAULT_PER_PAGE,
        }
    }

    /// Build an executor talking HTTP to the configured service
    pub fn from_settings(settings: &Settings, registry: Arc<ModelRegistry>) -> Result<Self> {
        let api = HttpApiClient::with_settings(&settings.api)?;
        Ok(Self::new(Arc::new(api), registry).with_per_page(settings.index.per_page))
    }

    /// Set default results per page
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.default_per_page = per_page;
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn api(&self) -> &Arc<dyn ApiClient> {
        &self.api
    }

    /// Index handle for a declared model
    pub fn index_for<M: Model>(&self) -> Result<Arc<dyn IndexClient>> {
        let config = self.registry.config::<M>()?;
        Ok(self.api.get_index(&config.index_name))
    }

    /// Run a search and load the matching records in ranking order
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        let built = QueryBuilder::new(&self.registry)
            .with_default_per_page(self.default_per_page)
            .build(request)?;

        debug!(
            "Searching {} with {:?} (page {}, {} per page)",
            built.index_name, built.query, built.page, built.per_page
        );
        let index = self.api.get_index(&built.index_name);
        let raw = index.search(&built.query, &built.options).await?;
        debug!("{} matches, {} on this page", raw.matches, raw.results.len());

        let hits = rehydrate(&self.registry, &raw).await?;
        Ok(SearchResults::new(built.page, built.per_page, hits, raw))
    }

    /// Search a single model type
    pub async fn search_model<M: Model>(&self, query: impl Into<String>) -> Result<SearchResults> {
        self.search(&SearchRequest::new(query).model::<M>()).await
    }

    /// Push one record's document, variables and categories
    pub async fn update<M: Model>(&self, record: &M) -> Result<()> {
        let config = self.registry.config::<M>()?;
        let document = build_document(config, record);
        let options = build_index_options(config, record);

        self.api
            .get_index(&config.index_name)
            .add_document(&document.docid, &document.fields, &options)
            .await?;
        debug!("Updated {} in {}", document.docid, config.index_name);
        Ok(())
    }

    /// Remove one record's document
    pub async fn delete<M: Model>(&self, record: &M) -> Result<()> {
        let config = self.registry.config::<M>()?;
        let docid = doc_id(record);

        self.api
            .get_index(&config.index_name)
            .delete_document(&docid)
            .await?;
        debug!("Deleted {} from {}", docid, config.index_name);
        Ok(())
    }

    /// Push several records of one type in a single bulk request.
    ///
    /// Returns `false` without calling the service when `records` is empty.
    pub async fn batch_update<M: Model>(&self, records: &[M]) -> Result<bool> {
        if records.is_empty() {
            return Ok(false);
        }

        let config = self.registry.config::<M>()?;
        let documents: Vec<BatchDocument> = records
            .iter()
            .map(|record| batch_document(config, record))
            .collect();

        self.api
            .get_index(&config.index_name)
            .add_documents(&documents)
            .await?;
        info!(
            "Indexed {} {} records into {}",
            documents.len(),
            M::TYPE_NAME,
            config.index_name
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TankerError;
    use crate::models::Declaration;
    use crate::results::{RawMatch, RawResults};
    use crate::testing::{Cat, Dog, FakeApi, MemoryStore, Person};
    use std::collections::BTreeMap;

    struct Fixture {
        api: Arc<FakeApi>,
        people: Arc<MemoryStore<Person>>,
        dogs: Arc<MemoryStore<Dog>>,
        tanker: Tanker,
    }

    fn fixture() -> Fixture {
        let api = FakeApi::new();
        let people = Arc::new(MemoryStore::new(vec![
            Person::new(1, "pedro", "pan"),
            Person::new(2, "jaime", "lannister"),
            Person::new(3, "arya", "stark"),
        ]));
        let dogs = Arc::new(MemoryStore::new(vec![Dog::new(7, "fido")]));
        let cats = Arc::new(MemoryStore::new(vec![Cat::new(9, "fluffy")]));

        let mut registry = ModelRegistry::new();
        registry
            .tankit::<Person>(
                people.clone(),
                Declaration::named("people").block(|t| {
                    t.indexes("name");
                    t.indexes("last_name");
                    t.categories(|p: &Person| {
                        BTreeMap::from([("initial".to_string(), p.name[..1].to_string())])
                    });
                }),
            )
            .unwrap();
        registry
            .tankit::<Dog>(
                dogs.clone(),
                Declaration::named("animals").block(|t| {
                    t.indexes("name");
                }),
            )
            .unwrap();
        registry
            .tankit::<Cat>(
                cats,
                Declaration::named("animals").block(|t| {
                    t.indexes("name");
                }),
            )
            .unwrap();

        let tanker = Tanker::new(api.clone(), Arc::new(registry));
        Fixture {
            api,
            people,
            dogs,
            tanker,
        }
    }

    #[tokio::test]
    async fn test_search_loads_each_type_once() {
        let fx = fixture();
        fx.api.with_state("people", |state| {
            state.search_response = RawResults {
                matches: 2,
                results: vec![RawMatch::tagged("Person", 3), RawMatch::tagged("Person", 1)],
                ..Default::default()
            };
        });

        let results = fx
            .tanker
            .search(&SearchRequest::new("hey!").model::<Person>())
            .await
            .unwrap();

        let names: Vec<&str> = results.records::<Person>().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["arya", "pedro"]);
        assert_eq!(fx.people.find_calls(), vec![vec![3, 1]]);
        assert_eq!(results.total_entries(), 2);

        let searches = fx.api.with_state("people", |state| state.searches.clone());
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].0, "__any:(hey!) __type:(Person)");
        assert_eq!(searches[0].1.get("fetch").map(String::as_str), Some("__type,__id"));
    }

    #[tokio::test]
    async fn test_search_several_models_keeps_ranking() {
        let fx = fixture();
        fx.api.with_state("animals", |state| {
            state.search_response = RawResults {
                matches: 2,
                results: vec![RawMatch::tagged("Cat", 9), RawMatch::tagged("Dog", 7)],
                facets: BTreeMap::from([(
                    "kind".to_string(),
                    BTreeMap::from([("pet".to_string(), 2)]),
                )]),
            };
        });

        let results = fx
            .tanker
            .search(&SearchRequest::new("pets").model::<Dog>().model::<Cat>())
            .await
            .unwrap();

        let order: Vec<&str> = results.iter().map(|hit| hit.type_name()).collect();
        assert_eq!(order, vec!["Cat", "Dog"]);
        assert_eq!(results.facets()["kind"]["pet"], 2);
    }

    #[tokio::test]
    async fn test_empty_search_skips_store() {
        let fx = fixture();
        let results = fx
            .tanker
            .search(&SearchRequest::new("nothing").model::<Dog>())
            .await
            .unwrap();

        assert!(results.is_empty());
        assert_eq!(results.total_entries(), 0);
        assert!(fx.dogs.find_calls().is_empty());
    }

    #[tokio::test]
    async fn test_search_across_indexes_fails_before_calling_service() {
        let fx = fixture();
        let err = fx
            .tanker
            .search(&SearchRequest::new("hey!").model::<Dog>().model::<Person>())
            .await
            .unwrap_err();

        assert!(matches!(err, TankerError::MultipleIndexes(_)));
        assert!(fx.api.with_state("animals", |state| state.searches.is_empty()));
        assert!(fx.api.with_state("people", |state| state.searches.is_empty()));
    }

    #[tokio::test]
    async fn test_search_model() {
        let fx = fixture();
        fx.tanker.search_model::<Cat>("hey").await.unwrap();

        let searches = fx.api.with_state("animals", |state| state.searches.clone());
        assert_eq!(searches[0].0, "__any:(hey) __type:(Cat)");
    }

    #[tokio::test]
    async fn test_update_pushes_document_and_categories() {
        let fx = fixture();
        fx.tanker.update(&Person::new(1, "pedro", "pan")).await.unwrap();

        let added = fx.api.with_state("people", |state| state.added.clone());
        assert_eq!(added.len(), 1);
        let (docid, fields, options) = &added[0];
        assert_eq!(docid, "Person 1");
        assert_eq!(fields.get("__any").map(String::as_str), Some("pan . pedro"));
        assert_eq!(fields.get("__type").map(String::as_str), Some("Person"));
        assert_eq!(
            options.categories,
            Some(BTreeMap::from([("initial".to_string(), "p".to_string())]))
        );
        assert!(options.variables.is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_docid() {
        let fx = fixture();
        fx.tanker.delete(&Dog::new(7, "fido")).await.unwrap();

        let deleted = fx.api.with_state("animals", |state| state.deleted_docs.clone());
        assert_eq!(deleted, vec!["Dog 7"]);
    }

    #[tokio::test]
    async fn test_batch_update() {
        let fx = fixture();
        assert!(!fx.tanker.batch_update::<Dog>(&[]).await.unwrap());
        assert!(fx.api.with_state("animals", |state| state.batches.is_empty()));

        let pushed = fx
            .tanker
            .batch_update(&[Dog::new(1, "rex"), Dog::new(2, "spot")])
            .await
            .unwrap();
        assert!(pushed);

        let batches = fx.api.with_state("animals", |state| state.batches.clone());
        assert_eq!(batches.len(), 1);
        let docids: Vec<&str> = batches[0].iter().map(|d| d.docid.as_str()).collect();
        assert_eq!(docids, vec!["Dog 1", "Dog 2"]);
    }

    #[tokio::test]
    async fn test_service_errors_propagate() {
        let fx = fixture();
        fx.api.with_state("animals", |state| state.fail_writes = true);
        let err = fx.tanker.delete(&Dog::new(7, "fido")).await.unwrap_err();
        assert!(matches!(err, TankerError::Service(_)));
    }

    #[tokio::test]
    async fn test_undeclared_model_is_not_configured() {
        let api = FakeApi::new();
        let tanker = Tanker::new(api, Arc::new(ModelRegistry::new()));
        let err = tanker.update(&Dog::new(1, "rex")).await.unwrap_err();
        assert!(matches!(err, TankerError::NotConfigured(_)));
    }
}
