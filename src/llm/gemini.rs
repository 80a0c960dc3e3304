//! Gemini `generateContent` driver.
//!
//! This module implements [`GenerativeClient`] for the Generative Language
//! API (`/{version}/models/{model}:generateContent`) as a single
//! request/response call.

use url::Url;

use crate::error::RelayError;

use super::types::{ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse};
use super::{GeminiSettings, GenerativeClient};

/// Driver for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiDriver {
    http: reqwest::Client,
    settings: GeminiSettings,
    endpoint: Url,
}

impl std::fmt::Debug for GeminiDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiDriver")
            .field("settings", &self.settings)
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl GeminiDriver {
    /// Create a driver, validating the endpoint URL up front.
    pub fn new(settings: GeminiSettings) -> Result<Self, RelayError> {
        Self::with_client(reqwest::Client::new(), settings)
    }

    /// Create a driver on top of an existing HTTP client.
    pub fn with_client(http: reqwest::Client, settings: GeminiSettings) -> Result<Self, RelayError> {
        let endpoint = Url::parse(&settings.generate_url())?;
        Ok(Self {
            http,
            settings,
            endpoint,
        })
    }

    /// The resolved endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl GenerativeClient for GeminiDriver {
    async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, RelayError> {
        tracing::debug!(
            name: "llm.request.sent",
            model = %self.settings.model,
            turns = request.contents.len(),
            "Sending generateContent request"
        );

        let rb = self.http.post(self.endpoint.clone()).json(request);
        let rb = self.settings.provider.authorize(rb, &self.settings.api_key);

        let resp = rb.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorEnvelope>(&body).map_or_else(
                |_| String::from_utf8_lossy(&body).trim().to_string(),
                |env| env.describe(),
            );
            return Err(RelayError::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let settings = GeminiSettings::new("not a url", "k");
        assert!(matches!(GeminiDriver::new(settings), Err(RelayError::Endpoint(_))));
    }

    #[test]
    fn test_endpoint_has_no_key_in_query() {
        let driver = GeminiDriver::new(GeminiSettings::new(
            "https://generativelanguage.googleapis.com",
            "AIza-secret",
        ))
        .unwrap();

        assert!(driver.endpoint().query().is_none());
        assert!(!format!("{driver:?}").contains("AIza-secret"));
    }
}
