// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API client: the single chokepoint for outbound HTTP calls.
//!
//! Every call:
//! - identifies itself as JSON (`content-type: application/json`)
//! - carries cookies from the client's cookie jar (always on)
//! - reports HTTP 401 to the injected [`UnauthorizedHandler`]
//!
//! No retries and no timeouts are applied here.

use crate::error::{ApiError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Capability for reacting to session loss (HTTP 401).
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(&self);
}

impl<F> UnauthorizedHandler for F
where
    F: Fn() + Send + Sync,
{
    fn on_unauthorized(&self) {
        self()
    }
}

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// JSON body; its presence makes the default method POST
    pub body: Option<Value>,
    /// Explicit method, overriding the GET/POST default
    pub method: Option<Method>,
    /// Extra headers; these win over the defaults
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the body from any serializable value.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self> {
        Ok(self.body(serde_json::to_value(body)?))
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }
}

/// One normalized outbound call, ready to send.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    /// Serialized JSON body
    pub body: Option<String>,
}

impl PendingRequest {
    /// Apply the method, header and body rules to `options`.
    pub fn build(url: Url, options: RequestOptions) -> Result<Self> {
        let body = match options.body {
            None | Some(Value::Null) => None,
            Some(value) => Some(serde_json::to_string(&value)?),
        };

        let method = options.method.unwrap_or_else(|| {
            if body.is_some() {
                Method::POST
            } else {
                Method::GET
            }
        });

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for name in options.headers.keys() {
            headers.remove(name);
        }
        for (name, value) in options.headers.iter() {
            headers.append(name.clone(), value.clone());
        }

        Ok(Self {
            method,
            url,
            headers,
            body,
        })
    }
}

/// Thunderdome API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    /// Prepended to root-relative endpoints, e.g. `/poker`
    path_prefix: String,
    on_unauthorized: Arc<dyn UnauthorizedHandler>,
}

impl ApiClient {
    /// Create a client for `base_url` with its own cookie jar.
    pub fn new(base_url: &str, on_unauthorized: impl UnauthorizedHandler + 'static) -> Result<Self> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Self::with_http(http, base_url, on_unauthorized)
    }

    /// Create a client whose cookies live in `provider`, e.g. a
    /// [`crate::store::PersistentJar`] that survives restarts.
    pub fn with_cookie_provider<C>(
        base_url: &str,
        provider: Arc<C>,
        on_unauthorized: impl UnauthorizedHandler + 'static,
    ) -> Result<Self>
    where
        C: reqwest::cookie::CookieStore + 'static,
    {
        let http = reqwest::Client::builder().cookie_provider(provider).build()?;
        Self::with_http(http, base_url, on_unauthorized)
    }

    fn with_http(
        http: reqwest::Client,
        base_url: &str,
        on_unauthorized: impl UnauthorizedHandler + 'static,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidEndpoint {
            endpoint: base_url.to_string(),
            reason: e.to_string(),
        })?;

        // A path on the base URL acts as the first part of the prefix.
        let path_prefix = base_url.path().trim_end_matches('/').to_string();

        Ok(Self {
            http,
            base_url,
            path_prefix,
            on_unauthorized: Arc::new(on_unauthorized),
        })
    }

    /// Serve every root-relative endpoint under `prefix` as well.
    pub fn with_path_prefix(mut self, prefix: &str) -> Self {
        let prefix = prefix.trim().trim_matches('/');
        if !prefix.is_empty() {
            self.path_prefix.push('/');
            self.path_prefix.push_str(prefix);
        }
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    /// Resolve an endpoint.
    ///
    /// Root-relative endpoints (`/api/...`) get the path prefix; absolute
    /// URLs are used as given.
    pub fn resolve(&self, endpoint: &str) -> Result<Url> {
        let prefixed;
        let target = if endpoint.starts_with('/') && !endpoint.starts_with("//") {
            prefixed = format!("{}{}", self.path_prefix, endpoint);
            prefixed.as_str()
        } else {
            endpoint
        };

        self.base_url
            .join(target)
            .map_err(|e| ApiError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })
    }

    /// Perform a request.
    ///
    /// Resolves with the raw response on success. A 401 triggers the
    /// unauthorized handler and then, like any other non-success status,
    /// returns [`ApiError::Status`] holding the response.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Response> {
        let pending = PendingRequest::build(self.resolve(endpoint)?, options)?;

        tracing::debug!(method = %pending.method, url = %pending.url, "Sending API request");

        let mut builder = self
            .http
            .request(pending.method.clone(), pending.url.clone())
            .headers(pending.headers);
        if let Some(body) = pending.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::debug!(error = %e, url = %pending.url, "API request failed");
            ApiError::Transport(e)
        })?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(url = %pending.url, "Session rejected by server (401)");
            self.on_unauthorized.on_unauthorized();
        }

        if !status.is_success() {
            tracing::debug!(status = %status, url = %pending.url, "API request returned error status");
            return Err(ApiError::from_response(response));
        }

        Ok(response)
    }

    /// GET an endpoint.
    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        self.request(endpoint, RequestOptions::new()).await
    }

    /// POST a JSON body.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<Response> {
        self.request(endpoint, RequestOptions::new().json(body)?)
            .await
    }

    /// Perform a request and decode the JSON response body.
    pub async fn json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        self.request(endpoint, options)
            .await?
            .json()
            .await
            .map_err(ApiError::Decode)
    }
}
