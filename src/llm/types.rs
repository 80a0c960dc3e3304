//! Request/response bodies of the `generateContent` endpoint.

use serde::{Deserialize, Serialize};

use crate::error::RelayError;
use crate::session::{ConversationTurn, Part};

/// Request body: the full conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    /// Every turn, seed included, in chronological order.
    pub contents: Vec<ConversationTurn>,
}

/// Successful response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    /// Candidate completions; only the first is used.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One candidate completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Generated content; absent when the candidate was blocked.
    #[serde(default)]
    pub content: Option<CandidateContent>,
    /// Why generation stopped (`STOP`, `SAFETY`, ...).
    #[serde(default, rename = "finishReason", skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Content of a candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateContent {
    /// Ordered parts.
    #[serde(default)]
    pub parts: Vec<Part>,
    /// Usually `"model"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate's first part.
    pub fn first_text(&self) -> Result<&str, RelayError> {
        let candidate = self
            .candidates
            .first()
            .ok_or_else(|| RelayError::MalformedResponse("no candidates".to_string()))?;

        let content = candidate.content.as_ref().ok_or_else(|| {
            RelayError::MalformedResponse(format!(
                "candidate has no content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ))
        })?;

        content
            .parts
            .first()
            .and_then(|p| p.text.as_deref())
            .ok_or_else(|| RelayError::MalformedResponse("first part has no text".to_string()))
    }
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEnvelope {
    /// Error details.
    pub error: ApiErrorBody,
}

impl ApiErrorEnvelope {
    /// `STATUS: message`, or just the message when no status name was sent.
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.error.status {
            Some(status) => format!("{status}: {}", self.error.message),
            None => self.error.message.clone(),
        }
    }
}

/// Error details. The numeric `code` mirrors the HTTP status and is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Human readable message.
    pub message: String,
    /// Canonical status name (`INVALID_ARGUMENT`, ...).
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_text_of_first_candidate() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": "Chào bạn!" }, { "text": "ignored" }] } },
                { "content": { "parts": [{ "text": "second candidate" }] } }
            ]
        }))
        .unwrap();

        assert_eq!(resp.first_text().unwrap(), "Chào bạn!");
    }

    #[test]
    fn test_missing_candidates_is_malformed() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(resp.first_text(), Err(RelayError::MalformedResponse(_))));
    }

    #[test]
    fn test_blocked_candidate_is_malformed() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }))
        .unwrap();

        let err = resp.first_text().unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_first_part_without_text_is_malformed() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "AA==", "mimeType": "image/png" } }] } }]
        }))
        .unwrap();

        assert!(resp.first_text().is_err());
    }

    #[test]
    fn test_error_envelope() {
        let env: ApiErrorEnvelope = serde_json::from_value(json!({
            "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
        }))
        .unwrap();

        assert_eq!(env.error.message, "API key not valid.");
        assert_eq!(env.describe(), "INVALID_ARGUMENT: API key not valid.");

        let bare: ApiErrorEnvelope =
            serde_json::from_value(json!({ "error": { "message": "quota" } })).unwrap();
        assert_eq!(bare.describe(), "quota");
    }
}
