//! Provider-specific URL layout and authentication.
//!
//! The relay talks to Google's Generative Language API directly, or to a
//! compatible gateway placed in front of it. The two differ only in how the
//! credential travels.

use reqwest::RequestBuilder;

/// Supported generative API providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Google Generative Language API (generativelanguage.googleapis.com).
    GoogleAi,
    /// Gateway exposing the same `generateContent` contract with bearer auth.
    Compatible,
}

impl Provider {
    /// Detect provider from base URL.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sweet_home_chatbot::llm::Provider;
    ///
    /// let provider = Provider::detect_from_url("https://generativelanguage.googleapis.com");
    /// assert_eq!(provider, Provider::GoogleAi);
    /// ```
    #[must_use]
    pub fn detect_from_url(base_url: &str) -> Self {
        if base_url.to_lowercase().contains("googleapis.com") {
            Self::GoogleAi
        } else {
            Self::Compatible
        }
    }

    /// Build the `generateContent` URL.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL (trailing slash tolerated)
    /// * `api_version` - API version segment, e.g. `v1beta`
    /// * `model` - The model name
    #[must_use]
    pub fn build_generate_url(&self, base_url: &str, api_version: &str, model: &str) -> String {
        let base = base_url.trim_end_matches('/');
        let version = api_version.trim_matches('/');
        format!("{base}/{version}/models/{model}:generateContent")
    }

    /// Attach the credential to a request.
    #[must_use]
    pub fn authorize(&self, rb: RequestBuilder, api_key: &str) -> RequestBuilder {
        match self {
            Self::GoogleAi => rb.header("x-goog-api-key", api_key),
            Self::Compatible => rb.bearer_auth(api_key),
        }
    }
}
