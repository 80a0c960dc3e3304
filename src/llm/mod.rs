//! Generative API client abstractions.
//!
//! The relay depends only on the [`GenerativeClient`] trait. [`GeminiDriver`]
//! is the production implementation speaking the Gemini `generateContent`
//! protocol over HTTPS.
//!
//! # Example
//!
//! ```rust,ignore
//! use sweet_home_chatbot::llm::{GeminiDriver, GeminiSettings};
//!
//! let settings = GeminiSettings::new("https://generativelanguage.googleapis.com", "AIza...");
//! let driver = GeminiDriver::new(settings)?;
//! ```

pub mod gemini;
pub mod provider;
pub mod types;

pub use gemini::GeminiDriver;
pub use provider::Provider;
pub use types::{GenerateContentRequest, GenerateContentResponse};

use crate::error::RelayError;

/// Default API version segment.
pub const DEFAULT_API_VERSION: &str = "v1beta";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Connection and model settings for the generative API.
#[derive(Clone)]
pub struct GeminiSettings {
    /// Base URL, e.g. `https://generativelanguage.googleapis.com`.
    pub base_url: String,
    /// API version segment.
    pub api_version: String,
    /// Model identifier.
    pub model: String,
    /// Credential. Kept server-side only.
    pub api_key: String,
    /// Provider, detected from `base_url`.
    pub provider: Provider,
}

impl std::fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .field("provider", &self.provider)
            .finish()
    }
}

impl GeminiSettings {
    /// Settings with the default model and API version.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            provider: Provider::detect_from_url(&base_url),
            base_url,
            api_version: DEFAULT_API_VERSION.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Override the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API version segment.
    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Full `generateContent` URL.
    #[must_use]
    pub fn generate_url(&self) -> String {
        self.provider
            .build_generate_url(&self.base_url, &self.api_version, &self.model)
    }
}

/// One-shot (non-streaming) content generation.
///
/// Implementations perform exactly one request per call: no retries, no
/// queueing. Every failure is reported as a [`RelayError`].
#[async_trait::async_trait]
pub trait GenerativeClient: Send + Sync + std::fmt::Debug {
    /// Send the request and decode the response body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or an
    /// undecodable body.
    async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, RelayError>;
}
