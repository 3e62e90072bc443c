//! HTTP client for the dumb_api REST routes.
//!
//! [`ApiClient`] turns each domain operation into one HTTP call and folds the
//! outcome into an [`ApiResponse`]. The typed operations live in
//! [`crate::endpoints`]; this module holds the shared request plumbing:
//! bearer attachment, JSON and multipart bodies, and envelope decoding.

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::response::{ApiResponse, ErrorBody};
use crate::session::Session;

/// Target of a request: a fixed route, optionally followed by caller-supplied
/// values that must each stay exactly one path segment.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Route<'a> {
    path: &'a str,
    segments: &'a [&'a str],
}

impl<'a> Route<'a> {
    /// `path` followed by `segments`, e.g. `Route::new("/api/user", &[name, "avatar"])`.
    pub(crate) fn new(path: &'a str, segments: &'a [&'a str]) -> Self {
        Self { path, segments }
    }
}

impl<'a> From<&'a str> for Route<'a> {
    fn from(path: &'a str) -> Self {
        Self { path, segments: &[] }
    }
}

/// Request Gateway for the dumb_api service.
///
/// Cheap to clone; clones share the connection pool and the [`Session`], so a
/// login through one clone authenticates all of them.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Client,
    config: Arc<ClientConfig>,
    session: Arc<Session>,
}

impl ApiClient {
    /// Create a gateway with its own session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_session(Arc::new(config), Arc::new(Session::new()))
    }

    /// Create a gateway sharing an existing session, e.g. with a
    /// [`RealtimeChannel`](crate::realtime::RealtimeChannel) built by
    /// [`RealtimeChannel::with_session`](crate::realtime::RealtimeChannel::with_session).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the HTTP client cannot be built.
    pub fn with_session(config: Arc<ClientConfig>, session: Arc<Session>) -> Result<Self> {
        let inner = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ApiError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            config,
            session,
        })
    }

    /// The configuration this gateway was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The session whose token this gateway attaches.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// The bearer token held by the session, if any.
    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    // --- Request building ---

    /// Full URL of `route`. Each segment is percent-encoded on its own, so
    /// `/`, `?` and `#` in a value cannot reach another route.
    fn url_for(&self, route: Route<'_>) -> Result<Url> {
        let endpoint = self.config.endpoint(route.path);
        let mut url =
            Url::parse(&endpoint).map_err(|e| ApiError::InvalidUrl(format!("{endpoint}: {e}")))?;
        if route.segments.is_empty() {
            return Ok(url);
        }

        // "." and ".." are dropped or resolved by URL normalization.
        if let Some(bad) = route
            .segments
            .iter()
            .find(|s| matches!(**s, "" | "." | ".."))
        {
            return Err(ApiError::InvalidUrl(format!(
                "{bad:?} is not a valid path segment"
            )));
        }
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(endpoint.clone()))?
            .extend(route.segments);
        Ok(url)
    }

    /// Build a request for `route`, attaching the bearer token when present.
    fn build_request(&self, method: Method, route: Route<'_>) -> Result<RequestBuilder> {
        let url = self.url_for(route)?;
        debug!("{} {}", method, url.path());

        let builder = self.inner.request(method, url);
        Ok(match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Send a request and return the status plus the raw body text.
    async fn execute(&self, builder: RequestBuilder) -> Result<(StatusCode, String)> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    /// Decode a response into the two-shape envelope.
    ///
    /// 2xx bodies go through `decode`; anything else is read as an
    /// [`ErrorBody`], falling back to the status reason phrase.
    fn envelope<T>(
        status: StatusCode,
        body: &str,
        decode: impl FnOnce(&str) -> serde_json::Result<T>,
    ) -> ApiResponse<T> {
        if status.is_success() {
            return match decode(body) {
                Ok(data) => ApiResponse::Success(data),
                Err(e) => {
                    warn!(status = status.as_u16(), "failed to decode response body: {e}");
                    ApiResponse::failure(e)
                }
            };
        }

        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| status_text(status));
        debug!(status = status.as_u16(), "request failed: {message}");
        ApiResponse::Failure(message)
    }

    async fn call<T>(
        &self,
        builder: Result<RequestBuilder>,
        decode: impl FnOnce(&str) -> serde_json::Result<T>,
    ) -> ApiResponse<T> {
        let builder = match builder {
            Ok(builder) => builder,
            Err(e) => {
                warn!("request not sent: {e}");
                return ApiResponse::failure(e);
            }
        };
        match self.execute(builder).await {
            Ok((status, body)) => Self::envelope(status, &body, decode),
            Err(e) => {
                warn!("request failed before a response arrived: {e}");
                ApiResponse::failure(e)
            }
        }
    }

    // --- Typed helpers used by the endpoint modules ---

    /// GET `route` with query parameters and decode the body as `T`.
    pub(crate) async fn get_json<'a, T: DeserializeOwned>(
        &self,
        route: impl Into<Route<'a>>,
        query: &[(&str, String)],
    ) -> ApiResponse<T> {
        let builder = self
            .build_request(Method::GET, route.into())
            .map(|b| b.query(query));
        self.call(builder, decode_json::<T>).await
    }

    /// Send a JSON body (or none) and decode the response body as `T`.
    pub(crate) async fn send_json<'a, T: DeserializeOwned>(
        &self,
        method: Method,
        route: impl Into<Route<'a>>,
        body: Option<&serde_json::Value>,
    ) -> ApiResponse<T> {
        let builder = self
            .build_request(method, route.into())
            .map(|b| with_json(b, body));
        self.call(builder, decode_json::<T>).await
    }

    /// Send a JSON body (or none); success carries no payload.
    pub(crate) async fn send_unit<'a>(
        &self,
        method: Method,
        route: impl Into<Route<'a>>,
        body: Option<&serde_json::Value>,
    ) -> ApiResponse<()> {
        let builder = self
            .build_request(method, route.into())
            .map(|b| with_json(b, body));
        self.call(builder, |_| Ok(())).await
    }

    /// POST a multipart form and decode the response body as `T`.
    pub(crate) async fn post_multipart_json<'a, T: DeserializeOwned>(
        &self,
        route: impl Into<Route<'a>>,
        form: reqwest::multipart::Form,
    ) -> ApiResponse<T> {
        let builder = self
            .build_request(Method::POST, route.into())
            .map(|b| b.multipart(form));
        self.call(builder, decode_json::<T>).await
    }

    /// POST a multipart form; success carries no payload.
    pub(crate) async fn post_multipart_unit<'a>(
        &self,
        route: impl Into<Route<'a>>,
        form: reqwest::multipart::Form,
    ) -> ApiResponse<()> {
        let builder = self
            .build_request(Method::POST, route.into())
            .map(|b| b.multipart(form));
        self.call(builder, |_| Ok(())).await
    }

    /// GET raw bytes. Any failure, including a non-2xx status, yields `None`.
    pub(crate) async fn get_bytes(&self, route: Route<'_>) -> Option<Vec<u8>> {
        let response = self.get_success(route).await?;
        match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                warn!("failed to read download body: {e}");
                None
            }
        }
    }

    /// GET `route`, returning the response only if it succeeded.
    pub(crate) async fn get_success(&self, route: Route<'_>) -> Option<reqwest::Response> {
        let builder = match self.build_request(Method::GET, route) {
            Ok(builder) => builder,
            Err(e) => {
                warn!("download not sent: {e}");
                return None;
            }
        };
        match builder.send().await {
            Ok(response) if response.status().is_success() => Some(response),
            Ok(response) => {
                debug!(status = response.status().as_u16(), url = %response.url(), "download failed");
                None
            }
            Err(e) => {
                warn!("download failed: {e}");
                None
            }
        }
    }

    /// Record a token from a login-style response.
    pub(crate) fn remember_token(&self, token: Option<&str>) {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.session.set_token(token);
        }
    }
}

fn decode_json<T: DeserializeOwned>(body: &str) -> serde_json::Result<T> {
    serde_json::from_str(body)
}

fn with_json(builder: RequestBuilder, body: Option<&serde_json::Value>) -> RequestBuilder {
    match body {
        Some(body) => builder.json(body),
        None => builder,
    }
}

/// Reason phrase for a status, e.g. `"Not Found"`.
fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
