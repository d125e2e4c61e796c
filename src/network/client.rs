//! HTTP client for the IndexTank REST API

use super::api::{ApiClient, IndexClient, SearchOptions, ServiceResult};
use crate::config::ApiSettings;
use crate::error::{ServiceError, TankerError};
use crate::index::{BatchDocument, IndexOptions};
use crate::query::QUERY_PARAM;
use crate::results::RawResults;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Account-level client; hands out per-index handles sharing one connection
/// pool
#[derive(Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: Url,
    credentials: Option<(String, String)>,
}

impl HttpApiClient {
    /// Create a client for an API URL with default settings
    pub fn new(api_url: &str) -> crate::Result<Self> {
        Self::with_settings(&ApiSettings {
            url: Some(api_url.to_string()),
            ..ApiSettings::default()
        })
    }

    /// Create a client from API settings.
    ///
    /// Credentials embedded in the URL (`http://:secret@host`) are stripped
    /// from it and sent as basic auth.
    pub fn with_settings(settings: &ApiSettings) -> crate::Result<Self> {
        let api_url = settings
            .url
            .as_deref()
            .ok_or_else(|| TankerError::NotConfigured("search service URL".to_string()))?;
        let (base_url, credentials) = split_credentials(api_url)?;

        let timeout = settings.request_timeout;
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(ServiceError::InvalidTimeout(timeout).into());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs_f64(timeout))
            .build()
            .map_err(ServiceError::from)?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Base URL without credentials
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Concrete handle on a named index
    pub fn index(&self, name: &str) -> HttpIndex {
        HttpIndex {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            credentials: self.credentials.clone(),
            name: name.to_string(),
        }
    }
}

impl ApiClient for HttpApiClient {
    fn get_index(&self, name: &str) -> Arc<dyn IndexClient> {
        Arc::new(self.index(name))
    }
}

fn split_credentials(api_url: &str) -> ServiceResult<(Url, Option<(String, String)>)> {
    let mut url = Url::parse(api_url).map_err(|e| ServiceError::InvalidUrl(e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ServiceError::InvalidUrl(api_url.to_string()));
    }

    let credentials = match (url.username(), url.password()) {
        ("", None) => None,
        (user, password) => Some((user.to_string(), password.unwrap_or_default().to_string())),
    };

    url.set_username("")
        .and_then(|_| url.set_password(None))
        .map_err(|_| ServiceError::InvalidUrl(api_url.to_string()))?;

    Ok((url, credentials))
}

/// Index metadata returned by `GET /v1/indexes/{name}`
#[derive(Debug, Deserialize)]
struct IndexMetadata {
    #[serde(default)]
    started: bool,
}

/// Handle on one remote index
#[derive(Clone)]
pub struct HttpIndex {
    client: Client,
    base_url: Url,
    credentials: Option<(String, String)>,
    name: String,
}

impl HttpIndex {
    fn endpoint(&self, segments: &[&str]) -> ServiceResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v1", "indexes", self.name.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials {
            Some((ref user, ref password)) => request.basic_auth(user, Some(password)),
            None => request,
        }
    }

    /// Send a request and turn non-success statuses into errors
    async fn send(&self, request: RequestBuilder) -> ServiceResult<Response> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn metadata(&self) -> ServiceResult<IndexMetadata> {
        let url = self.endpoint(&[])?;
        let response = self.send(self.client.get(url)).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl IndexClient for HttpIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self) -> ServiceResult<bool> {
        let url = self.endpoint(&[])?;
        let response = self.authorize(self.client.get(url)).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(ServiceError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn create(&self) -> ServiceResult<()> {
        let url = self.endpoint(&[])?;
        self.send(self.client.put(url)).await?;
        Ok(())
    }

    async fn running(&self) -> ServiceResult<bool> {
        Ok(self.metadata().await?.started)
    }

    async fn delete(&self) -> ServiceResult<()> {
        let url = self.endpoint(&[])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn search(&self, query: &str, options: &SearchOptions) -> ServiceResult<RawResults> {
        let url = self.endpoint(&["search"])?;
        let mut params: Vec<(&str, &str)> = vec![(QUERY_PARAM, query)];
        params.extend(
            options
                .iter()
                .filter(|(k, _)| k.as_str() != QUERY_PARAM)
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );

        debug!("Searching index {} for {}", self.name, query);
        let response = self.send(self.client.get(url).query(&params)).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn add_document(
        &self,
        docid: &str,
        fields: &BTreeMap<String, String>,
        options: &IndexOptions,
    ) -> ServiceResult<()> {
        let url = self.endpoint(&["docs"])?;
        let document = BatchDocument {
            docid: docid.to_string(),
            fields: fields.clone(),
            options: options.clone(),
        };
        self.send(self.client.put(url).json(&document)).await?;
        Ok(())
    }

    async fn add_documents(&self, documents: &[BatchDocument]) -> ServiceResult<()> {
        let url = self.endpoint(&["docs"])?;
        self.send(self.client.put(url).json(documents)).await?;
        Ok(())
    }

    async fn delete_document(&self, docid: &str) -> ServiceResult<()> {
        let url = self.endpoint(&["docs"])?;
        self.send(self.client.delete(url).query(&[("docid", docid)]))
            .await?;
        Ok(())
    }

    async fn add_function(&self, slot: u32, definition: &str) -> ServiceResult<()> {
        let slot = slot.to_string();
        let url = self.endpoint(&["functions", slot.as_str()])?;
        let body = serde_json::json!({ "definition": definition });
        self.send(self.client.put(url).json(&body)).await?;
        Ok(())
    }
}
