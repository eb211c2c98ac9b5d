//! Main client implementation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

use crate::api::{EventsApi, WorkflowsApi};
use crate::error::{Error, ErrorResponse, Result};
use crate::types::{TokenRequest, TokenResponse};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the access token on authenticated servers.
const AUTH_HEADER: &str = "X-Authorization";

/// Conductor API client.
///
/// Provides typed access to the Conductor server endpoints. Cloning is cheap;
/// all clones share the HTTP connection pool and the cached access token.
///
/// # Example
///
/// ```no_run
/// use conductor_client::ConductorClient;
///
/// # async fn example() -> conductor_client::Result<()> {
/// let client = ConductorClient::builder()
///     .base_url("http://localhost:8080/api")
///     .credentials("key-id", "key-secret")
///     .build()?;
///
/// client.events().remove("my-handler").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ConductorClient {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for ConductorClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConductorClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

/// Inner client state (shared across clones).
struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    credentials: Option<Credentials>,
    token: OnceCell<String>,
}

/// Key pair exchanged for an access token.
#[derive(Clone)]
struct Credentials {
    key_id: String,
    key_secret: String,
}

impl ConductorClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Whether requests are authenticated with a key pair.
    pub fn is_authenticated(&self) -> bool {
        self.inner.credentials.is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the event handler API.
    pub fn events(&self) -> EventsApi {
        EventsApi::new(self.clone())
    }

    /// Access the workflow API.
    pub fn workflows(&self) -> WorkflowsApi {
        WorkflowsApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL by appending percent-encoded path segments to the base URL.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("cannot append a path to {}", self.inner.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Make a GET request and decode the JSON body.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.url(segments)?;
        let response = self.send(self.inner.http.get(url)).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Make a GET request with query parameters and decode the JSON body.
    pub(crate) async fn get_with_query<T, Q>(&self, segments: &[&str], query: &Q) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let url = self.url(segments)?;
        let request = self.inner.http.get(url).query(query);
        let response = self.send(request).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Make a POST request, ignoring the response body.
    pub(crate) async fn post<B>(&self, segments: &[&str], body: &B) -> Result<()>
    where
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(segments)?;
        self.send(self.inner.http.post(url).json(body)).await?;
        Ok(())
    }

    /// Make a POST request whose response is a plain-text body.
    pub(crate) async fn post_for_text<B>(&self, segments: &[&str], body: &B) -> Result<String>
    where
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(segments)?;
        let response = self.send(self.inner.http.post(url).json(body)).await?;
        Ok(response.text().await?)
    }

    /// Make a PUT request, ignoring the response body.
    pub(crate) async fn put<B>(&self, segments: &[&str], body: &B) -> Result<()>
    where
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(segments)?;
        self.send(self.inner.http.put(url).json(body)).await?;
        Ok(())
    }

    /// Make a DELETE request.
    pub(crate) async fn delete(&self, segments: &[&str]) -> Result<()> {
        let url = self.url(segments)?;
        self.send(self.inner.http.delete(url)).await?;
        Ok(())
    }

    /// Make a DELETE request with query parameters.
    pub(crate) async fn delete_with_query<Q>(&self, segments: &[&str], query: &Q) -> Result<()>
    where
        Q: serde::Serialize + ?Sized,
    {
        let url = self.url(segments)?;
        self.send(self.inner.http.delete(url).query(query)).await?;
        Ok(())
    }

    /// Attach auth and timeout, send, and turn non-2xx responses into errors.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let mut request = request.timeout(self.inner.timeout);
        if let Some(token) = self.access_token().await? {
            request = request.header(AUTH_HEADER, token);
        }

        let response = request.send().await?;
        debug!(
            path = %response.url().path(),
            status = response.status().as_u16(),
            "conductor response"
        );

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Exchange the configured key pair for an access token, once per client.
    async fn access_token(&self) -> Result<Option<&str>> {
        let Some(credentials) = &self.inner.credentials else {
            return Ok(None);
        };

        let token = self
            .inner
            .token
            .get_or_try_init(|| async {
                let url = self.url(&["token"])?;
                debug!(%url, "requesting access token");

                let response = self
                    .inner
                    .http
                    .post(url)
                    .json(&TokenRequest {
                        key_id: credentials.key_id.clone(),
                        key_secret: credentials.key_secret.clone(),
                    })
                    .timeout(self.inner.timeout)
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::Auth(ErrorResponse::message_from_body(status, &body)));
                }

                let body: TokenResponse = response.json().await?;
                Ok(body.token)
            })
            .await?;

        Ok(Some(token.as_str()))
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = ErrorResponse::message_from_body(status, &body);

        match status {
            404 => Error::NotFound(message),
            401 => Error::Auth(message),
            _ => Error::Api { status, message },
        }
    }
}

/// Builder for creating a ConductorClient.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    auth_key: Option<String>,
    auth_secret: Option<String>,
    timeout: Duration,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            auth_key: None,
            auth_secret: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the base URL of the server API, e.g. `http://localhost:8080/api`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the key pair used to obtain an access token.
    pub fn credentials(mut self, key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        self.auth_key = Some(key_id.into());
        self.auth_secret = Some(key_secret.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ConductorClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        let base_url = Url::parse(&base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("{} cannot be used as a base URL", base_url)));
        }

        let credentials = match (self.auth_key, self.auth_secret) {
            (Some(key_id), Some(key_secret)) => Some(Credentials { key_id, key_secret }),
            (None, None) => None,
            _ => {
                return Err(Error::Config(
                    "both auth key and auth secret are required".to_string(),
                ));
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("conductor-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(ConductorClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                credentials,
                token: OnceCell::new(),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
