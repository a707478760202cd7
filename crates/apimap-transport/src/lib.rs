//! reqwest-backed transport for apimap.
//!
//! [`HttpTransport`] implements the [`Transport`] boundary contract on top of
//! a single shared [`reqwest::Client`], built once from a [`BaseConfig`]
//! (base URL, default headers, default timeout). One transport instance
//! serves every endpoint of a module and is safe for concurrent in-flight
//! requests.
//!
//! Policy choices live here, not in the core:
//!
//! - non-2xx statuses reject with a transport error carrying the status
//! - timeouts come from the base config or per-call overrides
//! - cancellation races the request against the call's [`CancelToken`] and
//!   rejects with the cancellation reason as the error message

use apimap_core::url::value_to_string;
use apimap_core::{ApiError, ApiResult, BoxFuture, DispatchConfig, Transport, TransportResponse};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Base configuration for an [`HttpTransport`], applied to every request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BaseConfig {
    /// Base URL that relative dispatch URLs are resolved against.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Default headers attached to every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Default request timeout.
    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl BaseConfig {
    /// Creates an empty base configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Adds one default header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the default timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A [`Transport`] implementation backed by [`reqwest`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Option<Url>,
}

impl HttpTransport {
    /// Builds a transport from `config`.
    ///
    /// The underlying client is constructed once; clones share it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when the base URL or a default header is
    /// malformed, or when the client cannot be constructed.
    pub fn new(config: BaseConfig) -> ApiResult<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| ApiError::config("baseConfig", format!("invalid base url: {e}")))?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if !config.headers.is_empty() {
            builder = builder.default_headers(header_map(&config.headers)?);
        }

        let client = builder
            .build()
            .map_err(|e| ApiError::config("baseConfig", e.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn request_url(&self, url: &str, extra: &BTreeMap<String, Value>) -> ApiResult<Url> {
        // A per-call `baseURL` passthrough overrides the configured base.
        let base = match extra.get("baseURL").and_then(Value::as_str) {
            Some(raw) => Some(
                Url::parse(raw)
                    .map_err(|e| ApiError::transport(format!("invalid baseURL override: {e}")))?,
            ),
            None => self.base_url.clone(),
        };

        match base {
            Some(base) => base
                .join(url)
                .map_err(|e| ApiError::transport(format!("invalid url '{url}': {e}"))),
            None => Url::parse(url)
                .map_err(|e| ApiError::transport(format!("invalid url '{url}': {e}"))),
        }
    }
}

fn header_map(headers: &BTreeMap<String, String>) -> ApiResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::try_from(name.as_str())
            .map_err(|e| ApiError::config("baseConfig", format!("invalid header '{name}': {e}")))?;
        let value = HeaderValue::try_from(value.as_str())
            .map_err(|e| ApiError::config("baseConfig", format!("invalid header value: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

fn response_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_owned(), v.to_owned()))
        })
        .collect()
}

impl Transport for HttpTransport {
    fn dispatch(&self, config: DispatchConfig) -> BoxFuture<'static, ApiResult<TransportResponse>> {
        let client = self.client.clone();
        let url = self.request_url(&config.url, &config.extra);

        Box::pin(async move {
            let url = url?;
            let method = Method::from_bytes(config.method.to_uppercase().as_bytes())
                .map_err(|_| ApiError::transport(format!("invalid method '{}'", config.method)))?;

            let mut request = client.request(method, url);
            if !config.query.is_empty() {
                let query: Vec<(String, String)> = config
                    .query
                    .iter()
                    .map(|(k, v)| (k.clone(), value_to_string(v)))
                    .collect();
                request = request.query(&query);
            }
            for (name, value) in &config.headers {
                request = request.header(name, value);
            }
            if let Some(timeout) = config.timeout {
                request = request.timeout(timeout);
            }
            if let Some(body) = &config.body {
                request = request.json(body);
            }

            let send = request.send();
            let response = match config.cancel {
                Some(token) => {
                    tokio::select! {
                        reason = token.cancelled() => return Err(ApiError::transport(reason)),
                        result = send => result,
                    }
                }
                None => send.await,
            }
            .map_err(|e| ApiError::transport(e.to_string()))?;

            let status = response.status();
            let headers = response_headers(response.headers());
            let text = response
                .text()
                .await
                .map_err(|e| ApiError::transport(e.to_string()))?;
            let data = if text.is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text).unwrap_or(Value::String(text))
            };

            if !status.is_success() {
                tracing::debug!(status = %status, "transport rejecting non-2xx response");
                return Err(ApiError::transport_status(
                    format!("request failed with status code {}", status.as_u16()),
                    status.as_u16(),
                ));
            }

            Ok(TransportResponse {
                status,
                data,
                headers,
            })
        })
    }
}
