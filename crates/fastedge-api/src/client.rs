//! HTTP client for the FastEdge REST API.
//!
//! Each call makes exactly one attempt. Failures of any kind come back as
//! [`Error::Request`] labelled with the operation that failed.

use crate::enhance::EnhancedApp;
use crate::types::{
    ApiConfig, AppResource, Application, AppsQuery, Binary, Secret, SecretResource, SecretsQuery,
};
use crate::{Error, Result};
use futures::FutureExt;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error as StdError;
use std::path::Path;

const API_PREFIX: &str = "/fastedge/v1";

/// Client for the FastEdge API.
#[derive(Debug, Clone)]
pub struct FastEdgeClient {
    http: Client,
    config: ApiConfig,
}

/// Update bodies repeat the id that is already in the path.
#[derive(Serialize)]
struct WithId<'a, T> {
    id: u64,
    #[serde(flatten)]
    resource: &'a T,
}

impl FastEdgeClient {
    /// Create a new client for the given API endpoint.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| Error::Client(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Application endpoints.
    pub fn apps(&self) -> Apps<'_> {
        Apps { client: self }
    }

    /// Binary endpoints.
    pub fn binaries(&self) -> Binaries<'_> {
        Binaries { client: self }
    }

    /// Secret endpoints.
    pub fn secrets(&self) -> Secrets<'_> {
        Secrets { client: self }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}{}", self.config.api_url, API_PREFIX, path);
        log::debug!("{} {}", method, url);
        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("APIKey {}", self.config.api_key))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        context: &'static str,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| request_error(context, None, &e))?;

        let status = response.status();
        log::debug!("{} -> {}", response.url(), status);
        if !status.is_success() {
            let message = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_str().to_string());
            return Err(Error::Request {
                context,
                status: Some(status.as_u16()),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| request_error(context, Some(status.as_u16()), &e))
    }

    /// GET a list endpoint and unwrap the array stored under `field`.
    async fn list<T: DeserializeOwned, Q: Serialize>(
        &self,
        context: &'static str,
        path: &str,
        query: &Q,
        field: &str,
    ) -> Result<Vec<T>> {
        let request = self.request(Method::GET, path).query(query);
        let envelope: Value = self.send(context, request).await?;
        unwrap_envelope(envelope, field).map_err(|e| Error::Request {
            context,
            status: None,
            message: e.to_string(),
        })
    }
}

/// Application endpoints, borrowed from a [`FastEdgeClient`].
#[derive(Debug, Clone, Copy)]
pub struct Apps<'a> {
    client: &'a FastEdgeClient,
}

impl<'a> Apps<'a> {
    /// Fetch an application by id.
    ///
    /// The returned value can be awaited directly, or extended with
    /// [`EnhancedApp::include_binary`] first.
    pub fn get(&self, id: u64) -> EnhancedApp<'a> {
        let apps = *self;
        EnhancedApp::new(self.client, async move { apps.fetch(id).await }.boxed())
    }

    /// Fetch the first application whose name matches.
    pub fn get_by_name(&self, name: &str) -> EnhancedApp<'a> {
        let apps = *self;
        let name = name.to_string();
        EnhancedApp::new(
            self.client,
            async move { apps.fetch_by_name(name).await }.boxed(),
        )
    }

    /// List applications matching the query.
    pub async fn list(&self, query: &AppsQuery) -> Result<Vec<Application>> {
        self.client
            .list("Error fetching applications", "/apps", query, "apps")
            .await
    }

    /// Create an application.
    pub async fn create(&self, app: &AppResource) -> Result<Application> {
        let request = self.client.request(Method::POST, "/apps").json(app);
        self.client
            .send("Error creating application", request)
            .await
    }

    /// Replace an existing application.
    pub async fn update(&self, id: u64, app: &AppResource) -> Result<Application> {
        let body = WithId { id, resource: app };
        let request = self
            .client
            .request(Method::PUT, &format!("/apps/{}", id))
            .json(&body);
        self.client
            .send("Error updating application", request)
            .await
    }

    async fn fetch(self, id: u64) -> Result<Application> {
        let request = self.client.request(Method::GET, &format!("/apps/{}", id));
        let mut app: Application = self
            .client
            .send("Error fetching application", request)
            .await?;
        app.id = id;
        Ok(app)
    }

    async fn fetch_by_name(self, name: String) -> Result<Application> {
        let query = AppsQuery {
            name: Some(name.clone()),
            ..Default::default()
        };
        let apps = self.list(&query).await?;
        if apps.len() > 1 {
            log::debug!(
                "{} applications match name {:?}, using the first",
                apps.len(),
                name
            );
        }
        apps.into_iter().next().ok_or_else(|| Error::NotFound {
            kind: "Application",
            name,
        })
    }
}

/// Binary endpoints, borrowed from a [`FastEdgeClient`].
#[derive(Debug, Clone, Copy)]
pub struct Binaries<'a> {
    client: &'a FastEdgeClient,
}

impl Binaries<'_> {
    /// Fetch a binary by id.
    pub async fn get(&self, id: u64) -> Result<Binary> {
        let request = self
            .client
            .request(Method::GET, &format!("/binaries/{}", id));
        let mut binary: Binary = self.client.send("Error fetching binary", request).await?;
        binary.id = id;
        Ok(binary)
    }

    /// Upload the WASM file at `path`.
    pub async fn upload(&self, path: impl AsRef<Path>) -> Result<Binary> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| Error::Request {
            context: "Error uploading binary",
            status: None,
            message: e.to_string(),
        })?;
        log::debug!("uploading {} ({} bytes)", path.display(), bytes.len());
        self.upload_bytes(bytes).await
    }

    /// Upload raw WASM bytes.
    pub async fn upload_bytes(&self, bytes: Vec<u8>) -> Result<Binary> {
        let request = self
            .client
            .request(Method::POST, "/binaries/raw")
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes);
        self.client.send("Error uploading binary", request).await
    }
}

/// Secret endpoints, borrowed from a [`FastEdgeClient`].
#[derive(Debug, Clone, Copy)]
pub struct Secrets<'a> {
    client: &'a FastEdgeClient,
}

impl Secrets<'_> {
    /// Fetch a secret, including its slots.
    pub async fn get(&self, id: u64) -> Result<Secret> {
        let request = self
            .client
            .request(Method::GET, &format!("/secrets/{}", id));
        let mut secret: Secret = self.client.send("Error fetching secret", request).await?;
        secret.id = id;
        Ok(secret)
    }

    /// List secrets matching the query. Slots are not included.
    pub async fn list(&self, query: &SecretsQuery) -> Result<Vec<Secret>> {
        self.client
            .list("Error fetching secrets", "/secrets", query, "secrets")
            .await
    }

    /// Fetch the first secret whose name matches.
    pub async fn get_by_name(&self, name: &str) -> Result<Secret> {
        let query = SecretsQuery {
            secret_name: Some(name.to_string()),
            ..Default::default()
        };
        let secrets = self.list(&query).await?;
        if secrets.len() > 1 {
            log::debug!(
                "{} secrets match name {:?}, using the first",
                secrets.len(),
                name
            );
        }
        secrets.into_iter().next().ok_or_else(|| Error::NotFound {
            kind: "Secret",
            name: name.to_string(),
        })
    }

    /// Create a secret.
    pub async fn create(&self, secret: &SecretResource) -> Result<Secret> {
        let request = self.client.request(Method::POST, "/secrets").json(secret);
        self.client.send("Error creating secret", request).await
    }

    /// Patch an existing secret. Slots without a value are deleted.
    pub async fn update(&self, id: u64, secret: &SecretResource) -> Result<Secret> {
        let body = WithId {
            id,
            resource: secret,
        };
        let request = self
            .client
            .request(Method::PATCH, &format!("/secrets/{}", id))
            .json(&body);
        self.client.send("Error updating secret", request).await
    }
}

fn request_error(context: &'static str, status: Option<u16>, err: &reqwest::Error) -> Error {
    let mut message = err.to_string();
    let mut source = StdError::source(err);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    Error::Request {
        context,
        status,
        message,
    }
}

fn unwrap_envelope<T: DeserializeOwned>(
    mut envelope: Value,
    field: &str,
) -> serde_json::Result<Vec<T>> {
    match envelope.get_mut(field).map(Value::take) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(items) => serde_json::from_value(items),
    }
}
