//! HTTP adapter for the directory backend.
//!
//! Wraps the listing, lookup, facets, REST dispatch and streaming endpoints using
//! [`reqwest`].

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use userdir_core::filter::FilterCriteria;
use userdir_core::pagination::ResultPage;
use userdir_core::tasks::DispatchAck;
use userdir_core::types::TaskId;
use userdir_core::user::User;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::service::QueryService;

/// HTTP client for one directory backend.
pub struct DirectoryApi {
    client: reqwest::Client,
    api_url: String,
}

/// Filter options served by `GET /api/facets`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    pub nationalities: Vec<String>,
    pub hobbies: Vec<String>,
    pub max_age: u32,
    pub max_page_size: u32,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl DirectoryApi {
    /// Create a client for `api_url`, e.g. `http://host:3001`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    /// Build a client whose requests time out per `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// `GET /api/users` for one page of `criteria`.
    pub async fn list_users(
        &self,
        criteria: &FilterCriteria,
        page: u32,
    ) -> Result<ResultPage<User>, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/users", self.api_url))
            .query(&query_pairs(criteria, page))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `GET /api/users/{id}`. An unknown id is `ClientError::Api` with
    /// status 404.
    pub async fn get_user(&self, id: &str) -> Result<User, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/users/{id}", self.api_url))
            .send()
            .await?;

        let envelope: DataEnvelope<User> = Self::parse_response(response).await?;
        Ok(envelope.data)
    }

    /// `GET /api/facets`.
    pub async fn facets(&self) -> Result<Facets, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/facets", self.api_url))
            .send()
            .await?;

        let envelope: DataEnvelope<Facets> = Self::parse_response(response).await?;
        Ok(envelope.data)
    }

    /// `POST /api/tasks/{id}/dispatch`. The completion is broadcast on the
    /// task socket, not returned here.
    pub async fn dispatch_task(&self, task_id: TaskId) -> Result<DispatchAck, ClientError> {
        let response = self
            .client
            .post(format!("{}/api/tasks/{task_id}/dispatch", self.api_url))
            .send()
            .await?;

        let envelope: DataEnvelope<DispatchAck> = Self::parse_response(response).await?;
        Ok(envelope.data)
    }

    /// `GET /api/stream` as a stream of raw body chunks.
    ///
    /// Chunk boundaries follow the network, not characters; a multi-byte
    /// character may be split across two chunks.
    pub async fn open_stream(
        &self,
    ) -> Result<impl Stream<Item = Result<Vec<u8>, ClientError>> + Send + Unpin, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/stream", self.api_url))
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ClientError::from)))
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Non-2xx responses
    /// become [`ClientError::Api`] carrying the body's `error` message when
    /// it has one, or the raw body otherwise.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read body: {e}>"));
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Check status, then deserialize the JSON body.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl QueryService for DirectoryApi {
    type Record = User;

    async fn query(
        &self,
        criteria: &FilterCriteria,
        page: u32,
    ) -> Result<ResultPage<User>, ClientError> {
        self.list_users(criteria, page).await
    }
}

/// Query string for a listing request. Unset selections are omitted.
fn query_pairs(criteria: &FilterCriteria, page: u32) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
        ("page", page.to_string()),
        ("limit", criteria.page_size.to_string()),
        ("minAge", criteria.min_age.to_string()),
        ("maxAge", criteria.max_age.to_string()),
    ];
    if !criteria.search.is_empty() {
        pairs.push(("search", criteria.search.clone()));
    }
    if let Some(nationality) = &criteria.nationality {
        pairs.push(("nationality", nationality.clone()));
    }
    if let Some(hobby) = &criteria.hobby {
        pairs.push(("hobby", hobby.clone()));
    }
    pairs
}
