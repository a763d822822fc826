//! Member portal HTTP client

pub mod auth;
pub mod error;
pub mod interceptor;
pub mod profile;
pub mod token_store;

use error::ClientError;
use reqwest::{Client, ClientBuilder, header};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use token_store::{MemoryTokenStore, TokenStore};
use tracing::{debug, warn};

/// API paths
pub mod paths {
    pub const REGISTER: &str = "/api/register/";
    pub const LOGIN: &str = "/api/login/";
    pub const PROFILE: &str = "/api/profile/";
    pub const PROFILE_UPDATE: &str = "/api/profile/update/";
}

const DEFAULT_USER_AGENT: &str = concat!("portal-client/", env!("CARGO_PKG_VERSION"));

/// Callback fired after a 401 has cleared the stored credential
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Member portal API client
///
/// Cheap to clone; clones share the HTTP connection pool and the token
/// store.
#[derive(Clone)]
pub struct PortalClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl fmt::Debug for PortalClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.tokens.is_present())
            .finish_non_exhaustive()
    }
}

impl PortalClient {
    /// Create a new client with default configuration and an in-memory token
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> PortalClientBuilder {
        PortalClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The store the interceptor reads the credential from
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Create a request builder for a path below the base URL
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, url)
            .header(header::ACCEPT, "application/json")
    }

    /// Run the interceptor and send the request
    ///
    /// Transport failures surface as [`ClientError::Network`].
    pub async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let request = interceptor::authorize(request.build()?, self.tokens.as_ref());
        debug!(method = %request.method(), path = request.url().path(), "Sending request");
        Ok(self.client.execute(request).await?)
    }

    /// Execute a request and handle common errors
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()));
        }

        let error = ClientError::from_status(status, &String::from_utf8_lossy(&body));
        if error.is_unauthorized() {
            self.discard_credential();
        }
        Err(error)
    }

    /// Drop the stored credential after the API rejected it
    fn discard_credential(&self) {
        warn!("Credential rejected by the API, clearing it");
        if let Err(e) = self.tokens.clear() {
            warn!("Failed to clear rejected credential: {e}");
        }
        if let Some(hook) = &self.on_unauthorized {
            hook();
        }
    }
}

/// Builder for PortalClient
#[derive(Default)]
pub struct PortalClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    tokens: Option<Arc<dyn TokenStore>>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl PortalClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout (ignored on WASM)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent (ignored on WASM, the browser sets its own)
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set where the credential lives
    pub fn token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Run `hook` whenever a 401 clears the credential
    pub fn on_unauthorized(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    /// Build the client
    pub fn build(self) -> Result<PortalClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        check_base_url(&base_url)?;

        #[cfg(not(target_arch = "wasm32"))]
        let client = {
            let mut builder = ClientBuilder::new()
                .user_agent(self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT));
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            builder.build()?
        };

        #[cfg(target_arch = "wasm32")]
        let client = {
            let _ = (self.timeout, self.user_agent, DEFAULT_USER_AGENT);
            ClientBuilder::new().build()?
        };

        let tokens: Arc<dyn TokenStore> = match self.tokens {
            Some(tokens) => tokens,
            None => Arc::new(MemoryTokenStore::new()),
        };

        Ok(PortalClient {
            client,
            base_url,
            tokens,
            on_unauthorized: self.on_unauthorized,
        })
    }
}

/// The base URL must be absolute http(s); paths are appended to it as text
fn check_base_url(base_url: &str) -> Result<(), ClientError> {
    let url = reqwest::Url::parse(base_url)
        .map_err(|e| ClientError::Configuration(format!("invalid base_url {base_url:?}: {e}")))?;

    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(()),
        "http" | "https" => Err(ClientError::Configuration(format!(
            "base_url {base_url:?} has no host"
        ))),
        scheme => Err(ClientError::Configuration(format!(
            "base_url {base_url:?} must use http or https, not {scheme}"
        ))),
    }
}
