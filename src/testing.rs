//! Shared fixtures for unit tests: sample models, an in-memory record store
//! and a scripted search service

use crate::error::ServiceError;
use crate::index::{BatchDocument, IndexOptions};
use crate::models::{Model, RecordStore};
use crate::network::{ApiClient, IndexClient, SearchOptions, ServiceResult};
use crate::results::RawResults;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

pub fn frozen_moment() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2010, 5, 4, 12, 0, 0).unwrap()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub last_name: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Person {
    pub fn new(id: i64, name: &str, last_name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            last_name: last_name.to_string(),
            created_at: Some(frozen_moment()),
        }
    }
}

impl Model for Person {
    const TYPE_NAME: &'static str = "Person";

    fn id(&self) -> i64 {
        self.id
    }

    fn field(&self, name: &str) -> Value {
        match name {
            "name" => Value::from(self.name.clone()),
            "last_name" => Value::from(self.last_name.clone()),
            _ => Value::Null,
        }
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

macro_rules! animal {
    ($name:ident, $tag:literal, $per_page:expr) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            pub id: i64,
            pub name: String,
        }

        impl $name {
            pub fn new(id: i64, name: &str) -> Self {
                Self {
                    id,
                    name: name.to_string(),
                }
            }
        }

        impl Model for $name {
            const TYPE_NAME: &'static str = $tag;

            fn id(&self) -> i64 {
                self.id
            }

            fn field(&self, name: &str) -> Value {
                match name {
                    "name" => Value::from(self.name.clone()),
                    _ => Value::Null,
                }
            }

            fn per_page() -> Option<u32> {
                $per_page
            }
        }
    };
}

animal!(Dog, "Dog", None);
animal!(Cat, "Cat", None);
animal!(Puppy, "Puppy", Some(5));

/// Record store over a fixed list of records.
///
/// `find` returns matches in stored order and records every id list it was
/// called with. The `"even"` scope keeps records with an even id.
pub struct MemoryStore<M> {
    records: Vec<M>,
    find_calls: Mutex<Vec<Vec<i64>>>,
}

impl<M: Model + Clone> MemoryStore<M> {
    pub fn new(records: Vec<M>) -> Self {
        Self {
            records,
            find_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn find_calls(&self) -> Vec<Vec<i64>> {
        self.find_calls.lock().unwrap().clone()
    }
}

impl<M: Model + Clone> Default for MemoryStore<M> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl<M: Model + Clone> RecordStore<M> for MemoryStore<M> {
    async fn find(&self, ids: &[i64]) -> anyhow::Result<Vec<M>> {
        self.find_calls.lock().unwrap().push(ids.to_vec());
        Ok(self
            .records
            .iter()
            .filter(|record| ids.contains(&record.id()))
            .cloned()
            .collect())
    }

    async fn all(&self, scope: Option<&str>) -> anyhow::Result<Vec<M>> {
        match scope {
            None => Ok(self.records.clone()),
            Some("even") => Ok(self
                .records
                .iter()
                .filter(|record| record.id() % 2 == 0)
                .cloned()
                .collect()),
            Some(other) => anyhow::bail!("unknown scope {}", other),
        }
    }
}

/// Everything a `FakeIndex` was asked to do
#[derive(Debug, Default)]
pub struct IndexState {
    pub exists: bool,
    /// Number of `running` polls answered with `false` before the index
    /// reports itself as started
    pub polls_until_running: usize,
    pub running_polls: usize,
    pub created: usize,
    pub deleted: usize,
    pub searches: Vec<(String, SearchOptions)>,
    pub search_response: RawResults,
    pub added: Vec<(String, BTreeMap<String, String>, IndexOptions)>,
    pub batches: Vec<Vec<BatchDocument>>,
    pub deleted_docs: Vec<String>,
    pub functions: Vec<(u32, String)>,
    /// When set, every write call fails with a 500
    pub fail_writes: bool,
}

/// Scripted search service holding one state per index name
#[derive(Default)]
pub struct FakeApi {
    indexes: Mutex<HashMap<String, Arc<FakeIndex>>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn index(&self, name: &str) -> Arc<FakeIndex> {
        self.indexes
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(FakeIndex {
                    name: name.to_string(),
                    state: Mutex::new(IndexState::default()),
                })
            })
            .clone()
    }

    /// Run `f` against the state of index `name`
    pub fn with_state<R>(&self, name: &str, f: impl FnOnce(&mut IndexState) -> R) -> R {
        let index = self.index(name);
        let mut state = index.state.lock().unwrap();
        f(&mut state)
    }
}

impl ApiClient for FakeApi {
    fn get_index(&self, name: &str) -> Arc<dyn IndexClient> {
        self.index(name)
    }
}

pub struct FakeIndex {
    name: String,
    state: Mutex<IndexState>,
}

impl FakeIndex {
    fn write<R>(&self, f: impl FnOnce(&mut IndexState) -> R) -> ServiceResult<R> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(ServiceError::Status {
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(f(&mut state))
    }
}

#[async_trait]
impl IndexClient for FakeIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self) -> ServiceResult<bool> {
        Ok(self.state.lock().unwrap().exists)
    }

    async fn create(&self) -> ServiceResult<()> {
        self.write(|state| {
            state.exists = true;
            state.created += 1;
        })
    }

    async fn running(&self) -> ServiceResult<bool> {
        let mut state = self.state.lock().unwrap();
        state.running_polls += 1;
        Ok(state.running_polls > state.polls_until_running)
    }

    async fn delete(&self) -> ServiceResult<()> {
        self.write(|state| {
            state.exists = false;
            state.deleted += 1;
        })
    }

    async fn search(&self, query: &str, options: &SearchOptions) -> ServiceResult<RawResults> {
        let mut state = self.state.lock().unwrap();
        state.searches.push((query.to_string(), options.clone()));
        Ok(state.search_response.clone())
    }

    async fn add_document(
        &self,
        docid: &str,
        fields: &BTreeMap<String, String>,
        options: &IndexOptions,
    ) -> ServiceResult<()> {
        self.write(|state| {
            state
                .added
                .push((docid.to_string(), fields.clone(), options.clone()))
        })
    }

    async fn add_documents(&self, documents: &[BatchDocument]) -> ServiceResult<()> {
        self.write(|state| state.batches.push(documents.to_vec()))
    }

    async fn delete_document(&self, docid: &str) -> ServiceResult<()> {
        self.write(|state| state.deleted_docs.push(docid.to_string()))
    }

    async fn add_function(&self, slot: u32, definition: &str) -> ServiceResult<()> {
        self.write(|state| state.functions.push((slot, definition.to_string())))
    }
}
