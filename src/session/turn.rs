//! Conversation turns as they travel to and from the generative API.

use serde::{Deserialize, Serialize};

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text and images typed into the widget.
    User,
    /// The model, including the seed system prompt.
    Model,
}

/// Base64 binary payload embedded in a part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineData {
    /// Base64 payload without the `data:` prefix.
    pub data: String,
    /// MIME type of the decoded payload.
    #[serde(rename = "mimeType", alias = "mime_type")]
    pub mime_type: String,
}

/// One piece of a turn: text, inline data, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Plain text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Inline attachment.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "inline_data")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    /// Create a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    /// Create an inline data part.
    #[must_use]
    pub fn inline(data: InlineData) -> Self {
        Self {
            text: None,
            inline_data: Some(data),
        }
    }
}

/// One message exchanged between the user and the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Author of the turn.
    pub role: Role,
    /// Ordered content parts.
    pub parts: Vec<Part>,
}

impl ConversationTurn {
    /// A model turn holding a single text part.
    #[must_use]
    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::text(text)],
        }
    }

    /// A user turn: the text part (when non-empty) followed by the attachment.
    #[must_use]
    pub fn user(text: &str, attachment: Option<InlineData>) -> Self {
        let mut parts = Vec::with_capacity(2);
        if !text.is_empty() {
            parts.push(Part::text(text));
        }
        if let Some(data) = attachment {
            parts.push(Part::inline(data));
        }
        Self {
            role: Role::User,
            parts,
        }
    }

    /// Text of the first text part, if any.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.parts.iter().find_map(|p| p.text.as_deref())
    }

    /// Whether any part carries inline data.
    #[must_use]
    pub fn has_inline_data(&self) -> bool {
        self.parts.iter().any(|p| p.inline_data.is_some())
    }
}
