//! REST data-access layer for the storefront backend.
//!
//! # Architecture
//!
//! - One `reqwest` client shared behind an `Arc`, with the bearer token and
//!   timeout baked into its defaults
//! - One module per backend resource (`products`, `orders`, `addresses`,
//!   `shipping`, `users`)
//! - Every public operation returns an [`Envelope`]: transport and server
//!   failures are folded into `success = false` plus a displayable message and
//!   never propagate past this layer
//! - Catalog reads are cached in memory via `moka` (5 minute TTL)
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_client::api::ApiClient;
//!
//! let api = ApiClient::new(&config.api)?;
//!
//! let response = api.find_my_orders().await;
//! if response.success {
//!     for order in response.data.unwrap_or_default() {
//!         println!("#{} {}", order.id, order.total());
//!     }
//! } else {
//!     eprintln!("{}", response.message);
//! }
//! ```

mod addresses;
mod cache;
mod envelope;
mod orders;
mod products;
mod shipping;
mod users;

pub use envelope::{DEFAULT_ERROR_STATUS, Envelope};
pub use orders::{CreateOrderRequest, OrderLine};

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;

use cache::CacheValue;

/// Errors that can occur while talking to the backend.
///
/// These stay inside the data-access layer; callers see an [`Envelope`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error: {status}")]
    Status {
        status: u16,
        body: Option<serde_json::Value>,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A resource URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The configured token cannot be sent as a header.
    #[error("Invalid API token: {0}")]
    InvalidToken(String),
}

impl ApiError {
    /// HTTP status to report, `500` when the transport supplied none.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Status { status, .. } => *status,
            Self::Http(err) => err
                .status()
                .map_or(DEFAULT_ERROR_STATUS, |s| s.as_u16()),
            Self::Parse(_) | Self::Url(_) | Self::InvalidToken(_) => DEFAULT_ERROR_STATUS,
        }
    }

    /// The `message` field of the backend's error body, if it sent one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status {
                body: Some(body), ..
            } => body
                .get("message")
                .and_then(serde_json::Value::as_str)
                .filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }
}

/// Client for the storefront REST backend.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<String, CacheValue>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("cached_entries", &self.inner.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| ApiError::InvalidToken(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// The base URL resource paths resolve against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve a resource path (`orders/42`) against the base URL.
    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Start a request for a resource path.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.inner.client.request(method, self.url(path)?))
    }

    /// `GET` a resource path and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<(u16, T), ApiError> {
        let request = self.request(Method::GET, path)?;
        self.send_json(request).await
    }

    /// Send `body` as JSON with `method` and decode the JSON response.
    async fn send_with_body<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(u16, T), ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(method, path)?.json(body);
        self.send_json(request).await
    }

    /// Send a bodiless request with `method` and decode the JSON response.
    async fn send_without_body<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
    ) -> Result<(u16, T), ApiError> {
        let request = self.request(method, path)?;
        self.send_json(request).await
    }

    /// Send a request and decode a JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<(u16, T), ApiError> {
        let (status, text) = self.send_raw(request).await?;

        let data = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })?;

        Ok((status, data))
    }

    /// Send a request whose body, if any, is ignored.
    async fn send_empty(&self, request: RequestBuilder) -> Result<(u16, ()), ApiError> {
        let (status, _) = self.send_raw(request).await?;
        Ok((status, ()))
    }

    /// Send a request, returning the status and body text of a success response.
    async fn send_raw(&self, request: RequestBuilder) -> Result<(u16, String), ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: serde_json::from_str(&text).ok(),
            });
        }

        Ok((status.as_u16(), text))
    }

    /// Drop every cached catalog entry.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }
}
