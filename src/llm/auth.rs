//! Authentication for Google Generative Language API calls
//!
//! Both the Gemini model client and the File Search document listing share
//! this credential source:
//! - Static: API key set once at creation (usually `GOOGLE_API_KEY`)
//! - Dynamic: callback that provides fresh credentials before each request,
//!   optionally pointing at a proxy base URL
//!
//! ```ignore
//! let llm = GeminiProvider::with_auth_provider(|| async {
//!     Ok(AuthConfig::with_base_url("proxy-key", "http://localhost:8000/v1beta"))
//! });
//! ```

use anyhow::Result;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Authentication configuration for API requests
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// API key sent as `x-goog-api-key`
    pub api_key: String,
    /// Optional custom base URL (overrides the default API endpoint)
    pub base_url: Option<String>,
}

impl AuthConfig {
    /// Create a new auth config with just an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    /// Create a new auth config with API key and custom base URL
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Some(base_url.into()),
        }
    }
}

/// Boxed future returned by auth providers
pub type AuthFuture<'a> = Pin<Box<dyn Future<Output = Result<AuthConfig>> + Send + 'a>>;

/// Provides authentication credentials before each API request
pub trait AuthProvider: Send + Sync {
    /// Get authentication configuration
    fn get_auth(&self) -> AuthFuture<'_>;
}

/// Wrapper to implement AuthProvider for async closures
pub struct FnAuthProvider<F> {
    func: F,
}

impl<F, Fut> AuthProvider for FnAuthProvider<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<AuthConfig>> + Send + 'static,
{
    fn get_auth(&self) -> AuthFuture<'_> {
        Box::pin((self.func)())
    }
}

/// Create an auth provider from an async closure
pub fn auth_provider<F, Fut>(func: F) -> FnAuthProvider<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<AuthConfig>> + Send + 'static,
{
    FnAuthProvider { func }
}

/// Either static credentials or a provider consulted per request
#[derive(Clone)]
pub(crate) enum AuthSource {
    Static(AuthConfig),
    Dynamic(Arc<dyn AuthProvider>),
}

impl AuthSource {
    pub(crate) async fn get_auth(&self) -> Result<AuthConfig> {
        match self {
            AuthSource::Static(config) => Ok(config.clone()),
            AuthSource::Dynamic(provider) => provider.get_auth().await,
        }
    }
}
