// SPDX-License-Identifier: MPL-2.0
//! Access-key aware HTTP client for the NginxPulse API.
//!
//! Every call goes through the same two interception points:
//!
//! - **before sending**, the access key is read fresh from storage and, when
//!   present and non-empty, attached as `X-NginxPulse-Key`;
//! - **on failure**, the outcome is reduced to an [`ApiError`] carrying one
//!   resolved message. A `401` additionally publishes
//!   [`AccessKeyRequired`] on the client's [`EventBus`].
//!
//! Nothing is retried here.
//!
//! # Examples
//!
//! ```no_run
//! use nginxpulse_client::client::ApiClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::builder().base_url("http://127.0.0.1:8089").build()?;
//! let mut expired = client.events().subscribe();
//! match client.get_json::<serde_json::Value>("/api/status").await {
//!     Ok(status) => println!("{status}"),
//!     Err(err) => eprintln!("{err}"),
//! }
//! if let Ok(event) = expired.try_recv() {
//!     eprintln!("re-authenticate: {}", event.message);
//! }
//! # Ok(())
//! # }
//! ```

mod failure;

pub use failure::{Failure, REQUEST_FAILED_KEY};

use crate::config::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
use crate::error::{ApiError, Error, Result};
use crate::events::{AccessKeyRequired, EventBus};
use crate::i18n::LocaleManager;
use crate::storage::{KeyValueStore, ACCESS_KEY_STORAGE};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Header carrying the stored access key.
pub const ACCESS_KEY_HEADER: &str = "X-NginxPulse-Key";

/// Fixed header sent with every call.
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";

pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(DEFAULT_TIMEOUT_MS);

pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    store: Option<Arc<dyn KeyValueStore>>,
    events: EventBus<AccessKeyRequired>,
    i18n: Arc<LocaleManager>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("has_store", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The bus on which `401` responses are announced.
    pub fn events(&self) -> &EventBus<AccessKeyRequired> {
        &self.events
    }

    /// The currently stored access key, if any and non-empty.
    pub fn access_key(&self) -> Option<String> {
        self.store
            .as_ref()?
            .get(ACCESS_KEY_STORAGE)
            .filter(|key| !key.is_empty())
    }

    /// Resolves an API path (optionally with `?query`) against the base URL.
    ///
    /// The path is appended to the base URL's own path, so a base of
    /// `https://host/pulse` maps `/api/status` to `https://host/pulse/api/status`.
    pub fn endpoint(&self, path: &str) -> Url {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            self.base_url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url.set_query(query);
        url
    }

    /// Starts a request for `path`. Send it with [`ApiClient::send`].
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.endpoint(path))
    }

    /// Sends a request through both interception points.
    ///
    /// Success responses are returned untouched.
    pub async fn send(&self, request: RequestBuilder) -> std::result::Result<Response, ApiError> {
        let request = self.authorize(request);
        let (http, request) = request.build_split();
        let request = match request {
            Ok(request) => request,
            Err(err) => return Err(self.reject(Failure::transport(err.to_string()))),
        };

        tracing::debug!(
            method = %request.method(),
            path = request.url().path(),
            "dispatching API request"
        );

        match http.execute(request).await {
            Ok(response) if response.status().is_success() => Ok(response),
            Ok(response) => {
                let status = response.status();
                let body = response.bytes().await.unwrap_or_default();
                Err(self.reject(Failure::from_response(status, &body)))
            }
            Err(err) => Err(self.reject(Failure::transport(self.describe_transport_error(&err)))),
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> std::result::Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        self.decode(response).await
    }

    pub async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q) -> std::result::Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.send(self.request(Method::GET, path).query(query)).await?;
        self.decode(response).await
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> std::result::Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(self.request(Method::POST, path).json(body)).await?;
        self.decode(response).await
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.access_key() {
            Some(key) => request.header(ACCESS_KEY_HEADER, key),
            None => request,
        }
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> std::result::Result<T, ApiError> {
        match response.json::<T>().await {
            Ok(value) => Ok(value),
            Err(err) => Err(self.reject(Failure::transport(err.to_string()))),
        }
    }

    fn describe_transport_error(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!("timeout of {}ms exceeded", self.timeout.as_millis())
        } else {
            err.to_string()
        }
    }

    /// Resolves the failure message and announces `401`s.
    fn reject(&self, failure: Failure) -> ApiError {
        let message = failure.message(|| self.i18n.tr(REQUEST_FAILED_KEY));
        if failure.requires_access_key() {
            let reached = self.events.publish(AccessKeyRequired::new(message.clone()));
            tracing::warn!(%message, subscribers = reached, "access key rejected");
        } else {
            tracing::debug!(status = ?failure.status, %message, "API request failed");
        }
        ApiError::new(message)
    }
}

#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    store: Option<Arc<dyn KeyValueStore>>,
    events: Option<EventBus<AccessKeyRequired>>,
    i18n: Option<Arc<LocaleManager>>,
}

impl ApiClientBuilder {
    /// Starts from the `[api]` section of the settings file.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::default()
            .base_url(config.base_url.clone())
            .timeout(config.timeout())
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Storage holding the access key. Without one, no key is ever sent.
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Shares an existing bus instead of creating a private one.
    pub fn events(mut self, events: EventBus<AccessKeyRequired>) -> Self {
        self.events = Some(events);
        self
    }

    /// Locale state used for the generic failure message.
    pub fn i18n(mut self, i18n: Arc<LocaleManager>) -> Self {
        self.i18n = Some(i18n);
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let raw = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&raw)?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!("unsupported API base URL: {raw}")));
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static(REQUESTED_WITH_VALUE),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .user_agent(concat!("NginxPulse/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(ApiClient {
            http,
            base_url,
            timeout,
            store: self.store,
            events: self.events.unwrap_or_default(),
            i18n: self.i18n.unwrap_or_default(),
        })
    }
}
