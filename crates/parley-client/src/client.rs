//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use url::Url;

use crate::api::{MessagesApi, RunsApi, ThreadsApi};
use crate::error::{Error, ErrorResponse, Result};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default base URL for the hosted service.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1/";

/// Default API version for Azure deployments.
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-02-15-preview";

/// Which flavour of the assistants API the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    /// Hosted API: bearer auth, `OpenAI-Beta` header.
    OpenAi,
    /// Azure deployment: `api-key` header, `api-version` query parameter.
    Azure {
        /// Value of the `api-version` query parameter.
        api_version: String,
    },
}

/// Assistant service API client.
///
/// Provides typed access to the thread, message and run endpoints.
///
/// # Example
///
/// ```no_run
/// use parley_client::{CreateThreadRequest, ParleyClient};
///
/// # async fn example() -> parley_client::Result<()> {
/// let client = ParleyClient::builder()
///     .api_key("sk-...")
///     .build()?;
///
/// let thread = client
///     .threads()
///     .create(CreateThreadRequest::with_user_message("Hello"))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ParleyClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    pub(crate) http: reqwest::Client,
    /// Base URL for API requests.
    pub(crate) base_url: Url,
    /// API flavour.
    pub(crate) provider: Provider,
    /// Request timeout.
    pub(crate) timeout: Duration,
}

impl ParleyClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get the API flavour.
    pub fn provider(&self) -> &Provider {
        &self.inner.provider
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the threads API.
    pub fn threads(&self) -> ThreadsApi {
        ThreadsApi::new(self.clone())
    }

    /// Access the messages API.
    pub fn messages(&self) -> MessagesApi {
        MessagesApi::new(self.clone())
    }

    /// Access the runs API.
    pub fn runs(&self) -> RunsApi {
        RunsApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        let mut url = self.inner.base_url.join(path)?;
        if let Provider::Azure { api_version } = &self.inner.provider {
            url.query_pairs_mut().append_pair("api-version", api_version);
        }
        Ok(url)
    }

    /// Make a GET request.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        tracing::trace!(%url, "GET");
        let response = self
            .inner
            .http
            .get(url)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a GET request with query parameters.
    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::trace!(%url, "GET");
        let response = self
            .inner
            .http
            .get(url)
            .query(query)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a POST request.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::trace!(%url, "POST");
        let response = self
            .inner
            .http
            .post(url)
            .json(body)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Handle a response, extracting the body or error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status().is_success() {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>().await {
            Ok(ErrorResponse { error }) => {
                if status == 404 {
                    Error::NotFound(error.message)
                } else if status == 401 {
                    Error::Auth(error.message)
                } else {
                    Error::Api {
                        status,
                        code: error.code(),
                        message: error.message,
                    }
                }
            }
            Err(_) => Error::Api {
                status,
                code: "unknown".to_string(),
                message: format!("HTTP {}", status),
            },
        }
    }
}

/// Builder for creating a ParleyClient.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    provider: Provider,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            provider: Provider::OpenAi,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the base URL (defaults to the hosted API).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Target an Azure deployment at `endpoint`.
    ///
    /// Requests go to `<endpoint>/openai/...` with the given `api-version`.
    pub fn azure(mut self, endpoint: impl Into<String>, api_version: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.base_url = Some(format!("{}/openai/", endpoint.trim_end_matches('/')));
        self.provider = Provider::Azure {
            api_version: api_version.into(),
        };
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ParleyClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| OPENAI_BASE_URL.to_string());

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(key) = &self.api_key {
            let invalid = || Error::Config("Invalid API key".to_string());
            match self.provider {
                Provider::OpenAi => {
                    let value = HeaderValue::from_str(&format!("Bearer {}", key))
                        .map_err(|_| invalid())?;
                    headers.insert(AUTHORIZATION, value);
                }
                Provider::Azure { .. } => {
                    let value = HeaderValue::from_str(key).map_err(|_| invalid())?;
                    headers.insert(HeaderName::from_static("api-key"), value);
                }
            }
        }

        if self.provider == Provider::OpenAi {
            headers.insert(
                HeaderName::from_static("openai-beta"),
                HeaderValue::from_static("assistants=v2"),
            );
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("parley-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;

        Ok(ParleyClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                provider: self.provider,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
