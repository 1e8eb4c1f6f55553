//! # HTTP client for the api-server (CLI <-> remote)
//!
//! This module wires the [`PeopleClient`] trait from `apiserver-provider-core` to the real
//! api-server over HTTP/JSON.
//!
//! | call   | request                               |
//! |--------|---------------------------------------|
//! | create | `POST   {endpoint}/api/v1/people`      |
//! | get    | `GET    {endpoint}/api/v1/people/{id}` |
//! | update | `PUT    {endpoint}/api/v1/people/{id}` |
//! | delete | `DELETE {endpoint}/api/v1/people/{id}` |
//!
//! Every non-2xx answer is an error; nothing is retried.

use apiserver_provider_core::contract::{ClientError, PeopleClient, Person};
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use thiserror::Error;

const PEOPLE_PATH: &str = "api/v1/people";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid endpoint {endpoint:?}: {detail}")]
    InvalidEndpoint { endpoint: String, detail: String },

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: String,
        source: reqwest::Error,
    },

    #[error("person {id} not found")]
    NotFound { id: i64 },

    #[error("api-server returned {status} for {method} {url}: {body}")]
    Status {
        method: Method,
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to decode response of {method} {url}: {source}")]
    Decode {
        method: Method,
        url: String,
        source: reqwest::Error,
    },
}

#[derive(Debug, Clone)]
pub struct HttpPeopleClient {
    http: reqwest::Client,
    people_url: String,
}

impl HttpPeopleClient {
    /// Build a client for the api-server at `endpoint` (an absolute http(s) URL).
    pub fn new(endpoint: &str) -> Result<Self, ApiError> {
        let invalid = |detail: String| ApiError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            detail,
        };
        let url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("apiserver-provider/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Build)?;

        let base = url.as_str().trim_end_matches('/');
        tracing::info!(endpoint = base, "Initialized api-server client");
        Ok(Self {
            http,
            people_url: format!("{base}/{PEOPLE_PATH}"),
        })
    }

    fn person_url(&self, id: i64) -> String {
        format!("{}/{id}", self.people_url)
    }

    async fn send(
        &self,
        method: Method,
        url: String,
        id: Option<i64>,
        body: Option<&Person>,
    ) -> Result<reqwest::Response, ApiError> {
        tracing::debug!(%method, %url, ?body, "Sending api-server request");
        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| ApiError::Transport {
            method: method.clone(),
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(ApiError::NotFound { id });
            }
        }
        let body = error_body(response.text().await, &url);
        Err(ApiError::Status {
            method,
            url,
            status,
            body,
        })
    }

    async fn send_json(
        &self,
        method: Method,
        url: String,
        id: Option<i64>,
        body: Option<&Person>,
    ) -> Result<Person, ApiError> {
        let response = self.send(method.clone(), url.clone(), id, body).await?;
        response
            .json::<Person>()
            .await
            .map_err(|source| ApiError::Decode { method, url, source })
    }
}

/// Body of a failed response, or a placeholder when it could not be read.
fn error_body(text: reqwest::Result<String>, url: &str) -> String {
    match text {
        Ok(body) => body.trim().to_string(),
        Err(e) => {
            tracing::warn!(error = %e, %url, "Failed to read error response body");
            format!("<unreadable response body: {e}>")
        }
    }
}

#[async_trait]
impl PeopleClient for HttpPeopleClient {
    async fn create(&self, person: Person) -> Result<Person, ClientError> {
        tracing::info!(name = %person.name, age = person.age, "Creating person");
        let created = self
            .send_json(Method::POST, self.people_url.clone(), None, Some(&person))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "API error creating person");
                e
            })?;
        tracing::info!(id = created.id, "Successfully created person");
        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Person, ClientError> {
        tracing::info!(id, "Fetching person by ID");
        let person = self
            .send_json(Method::GET, self.person_url(id), Some(id), None)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, id, "Failed to fetch person by ID");
                e
            })?;
        Ok(person)
    }

    async fn update(&self, id: i64, person: Person) -> Result<Person, ClientError> {
        tracing::info!(id, "Updating person");
        let body = Person { id, ..person };
        let updated = self
            .send_json(Method::PUT, self.person_url(id), Some(id), Some(&body))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, id, "Failed to update person");
                e
            })?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), ClientError> {
        tracing::info!(id, "Deleting person");
        self.send(Method::DELETE, self.person_url(id), Some(id), None)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, id, "Failed to delete person");
                e
            })?;
        tracing::info!(id, "Successfully deleted person");
        Ok(())
    }
}
