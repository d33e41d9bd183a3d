//! REST client for the remote template store.
//!
//! Routes, relative to the configured base URL:
//!
//! | Operation | Request |
//! |---|---|
//! | create | `POST templates` |
//! | update | `PATCH templates/{id}` |
//! | get | `GET templates/{id}` |
//! | list by product | `GET templates?product_id={id}` |
//! | list by brand | `GET templates?brand_id={id}` |
//! | raster export | `GET templates/{id}/export?format=png&width={w}&height={h}` |

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;
use vitrine_core::{RecordId, TemplateRecord};

use crate::api::{ApiError, NewTemplate, TemplateApi, TemplateUpdate};

/// [`TemplateApi`] over HTTP with optional bearer authentication.
#[derive(Debug, Clone)]
pub struct HttpTemplateApi {
    http: Client,
    base: Url,
    token: Option<String>,
}

impl HttpTemplateApi {
    /// Create a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the URL is malformed or cannot carry a
    /// path, or if the HTTP client fails to build.
    pub fn new(base_url: impl AsRef<str>, token: Option<String>) -> Result<Self, ApiError> {
        let base =
            Url::parse(base_url.as_ref()).map_err(|e| ApiError::Config(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::Config(format!("{base} cannot be a base URL")));
        }

        let http = Client::builder()
            .user_agent(concat!("vitrine-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self { http, base, token })
    }

    /// Use a preconfigured HTTP client.
    #[must_use]
    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Base URL all routes are relative to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Config(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), body = %body, "Template store returned an error");
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::send(builder).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Malformed(e.to_string()))
    }

    async fn list(&self, key: &str, id: RecordId) -> Result<Vec<TemplateRecord>, ApiError> {
        let mut url = self.endpoint(&["templates"])?;
        url.query_pairs_mut().append_pair(key, &id.to_string());
        Self::send_json(self.request(Method::GET, url)).await
    }
}

#[async_trait]
impl TemplateApi for HttpTemplateApi {
    async fn create(&self, template: &NewTemplate) -> Result<TemplateRecord, ApiError> {
        let url = self.endpoint(&["templates"])?;
        Self::send_json(self.request(Method::POST, url).json(template)).await
    }

    async fn update(
        &self,
        id: RecordId,
        update: &TemplateUpdate,
    ) -> Result<TemplateRecord, ApiError> {
        let url = self.endpoint(&["templates", &id.to_string()])?;
        Self::send_json(self.request(Method::PATCH, url).json(update)).await
    }

    async fn get(&self, id: RecordId) -> Result<TemplateRecord, ApiError> {
        let url = self.endpoint(&["templates", &id.to_string()])?;
        Self::send_json(self.request(Method::GET, url)).await
    }

    async fn list_by_product(
        &self,
        product_id: RecordId,
    ) -> Result<Vec<TemplateRecord>, ApiError> {
        self.list("product_id", product_id).await
    }

    async fn list_by_brand(&self, brand_id: RecordId) -> Result<Vec<TemplateRecord>, ApiError> {
        self.list("brand_id", brand_id).await
    }

    async fn export_raster(
        &self,
        id: RecordId,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ApiError> {
        let mut url = self.endpoint(&["templates", &id.to_string(), "export"])?;
        url.query_pairs_mut()
            .append_pair("format", "png")
            .append_pair("width", &width.to_string())
            .append_pair("height", &height.to_string());
        let response = Self::send(self.request(Method::GET, url)).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
