//! The chat relay: one request/response cycle per user-initiated send.
//!
//! A send is split in two halves. [`ChatRelay::begin`] runs synchronously:
//! it validates the input, appends the user turn, renders the outgoing bubble
//! and the "thinking" placeholder, and snapshots the request. Nothing has
//! touched the network at that point. [`ChatRelay::complete`] performs the
//! HTTP call and resolves the placeholder. [`ChatRelay::submit_message`] runs
//! both back to back.
//!
//! Overlapping sends are allowed. Each completion resolves its own
//! placeholder; model turns are appended in completion order.

use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::attachment::PendingAttachment;
use crate::config::ChatConfig;
use crate::error::{AttachmentError, RelayError, SubmitError};
use crate::llm::{GenerateContentRequest, GenerativeClient};
use crate::session::{ConversationHistory, ConversationTurn};
use crate::transcript::{ReplyState, Transcript};

/// `**bold**` markers, matched lazily within a line.
static BOLD_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("static regex is valid"));

/// Strip `**...**` markers and surrounding whitespace from a reply.
#[must_use]
pub fn strip_bold(text: &str) -> String {
    BOLD_MARKERS.replace_all(text, "$1").trim().to_string()
}

/// A send that has been rendered but not yet answered.
#[derive(Debug)]
pub struct Exchange {
    /// Id of the outgoing bubble.
    pub message_id: Uuid,
    /// Id of the placeholder bubble the reply will replace.
    pub placeholder_id: Uuid,
    request: GenerateContentRequest,
}

impl Exchange {
    /// The request body that will be posted.
    #[must_use]
    pub fn request(&self) -> &GenerateContentRequest {
        &self.request
    }
}

/// Conversation owner and relay to the generative API.
#[derive(Debug)]
pub struct ChatRelay {
    client: Arc<dyn GenerativeClient>,
    history: ConversationHistory,
    transcript: Transcript,
    pending: Mutex<Option<PendingAttachment>>,
    fallback_message: String,
}

impl ChatRelay {
    /// Create a relay whose history is seeded with `chat.system_prompt`.
    #[must_use]
    pub fn new(client: Arc<dyn GenerativeClient>, chat: &ChatConfig) -> Self {
        Self {
            client,
            history: ConversationHistory::seeded(chat.system_prompt.clone()),
            transcript: Transcript::new(),
            pending: Mutex::new(None),
            fallback_message: chat.fallback_message.clone(),
        }
    }

    /// The conversation history.
    #[must_use]
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// The rendered widget state.
    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    // ─────────────────────────────────────────────────────────────────────
    // Attachment
    // ─────────────────────────────────────────────────────────────────────

    /// Store an uploaded image as the pending attachment.
    ///
    /// Replaces any previous pending attachment. A rejected file clears the
    /// slot.
    pub fn attach_file(
        &self,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<PendingAttachment, AttachmentError> {
        self.store_pending(PendingAttachment::from_bytes(bytes, mime_type))
    }

    /// Store a `data:` URL as the pending attachment.
    pub fn attach_data_url(&self, url: &str) -> Result<PendingAttachment, AttachmentError> {
        self.store_pending(PendingAttachment::from_data_url(url))
    }

    fn store_pending(
        &self,
        attachment: Result<PendingAttachment, AttachmentError>,
    ) -> Result<PendingAttachment, AttachmentError> {
        let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        match attachment {
            Ok(attachment) => {
                info!(
                    name: "chat.attachment.stored",
                    mime_type = %attachment.mime_type,
                    encoded_len = attachment.data.len(),
                    "Attachment stored"
                );
                *slot = Some(attachment.clone());
                Ok(attachment)
            }
            Err(err) => {
                warn!(name: "chat.attachment.rejected", error = %err, "Attachment rejected");
                *slot = None;
                Err(err)
            }
        }
    }

    /// Drop the pending attachment.
    pub fn clear_attachment(&self) {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The pending attachment, if any.
    #[must_use]
    pub fn pending_attachment(&self) -> Option<PendingAttachment> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Messages
    // ─────────────────────────────────────────────────────────────────────

    /// Send a message and wait for the reply.
    ///
    /// `attachment` overrides the pending attachment; when `None` the pending
    /// one (if any) is used. Either way the pending slot is cleared.
    pub async fn submit_message(
        &self,
        text: &str,
        attachment: Option<PendingAttachment>,
    ) -> Result<ReplyState, SubmitError> {
        let exchange = self.begin_with(text, attachment)?;
        Ok(self.complete(exchange).await)
    }

    /// Synchronous half of a send, using the pending attachment.
    pub fn begin(&self, text: &str) -> Result<Exchange, SubmitError> {
        self.begin_with(text, None)
    }

    /// Synchronous half of a send with an explicit attachment.
    pub fn begin_with(
        &self,
        text: &str,
        attachment: Option<PendingAttachment>,
    ) -> Result<Exchange, SubmitError> {
        let text = text.trim();

        // Held until both bubbles are pushed so that concurrent sends land in
        // the history and the transcript in the same order.
        let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if text.is_empty() && attachment.is_none() && slot.is_none() {
            return Err(SubmitError::EmptyMessage);
        }
        let pending = slot.take();
        let attachment = attachment.or(pending);

        let attachment_url = attachment.as_ref().map(PendingAttachment::data_url);
        let turn =
            ConversationTurn::user(text, attachment.map(PendingAttachment::into_inline_data));
        let contents = self.history.append_and_snapshot(turn);

        let message_id = self.transcript.push_outgoing(text, attachment_url);
        let placeholder_id = self.transcript.push_placeholder();
        drop(slot);

        info!(
            name: "chat.exchange.started",
            placeholder_id = %placeholder_id,
            turns = contents.len(),
            "Exchange started"
        );

        Ok(Exchange {
            message_id,
            placeholder_id,
            request: GenerateContentRequest { contents },
        })
    }

    /// Network half of a send: call the API and resolve the placeholder.
    pub async fn complete(&self, exchange: Exchange) -> ReplyState {
        let Exchange {
            placeholder_id,
            request,
            ..
        } = exchange;

        let reply = match self.fetch_reply(&request).await {
            Ok(text) => {
                self.history.append(ConversationTurn::model_text(text.clone()));
                info!(
                    name: "chat.exchange.completed",
                    placeholder_id = %placeholder_id,
                    reply_len = text.len(),
                    "Exchange completed"
                );
                ReplyState::Answered(text)
            }
            Err(err) => {
                warn!(
                    name: "chat.exchange.failed",
                    placeholder_id = %placeholder_id,
                    error = %err,
                    "Exchange failed"
                );
                ReplyState::Failed(self.fallback_message.clone())
            }
        };

        self.transcript.resolve(placeholder_id, reply.clone());
        reply
    }

    async fn fetch_reply(&self, request: &GenerateContentRequest) -> Result<String, RelayError> {
        let response = self.client.generate(request).await?;
        Ok(strip_bold(response.first_text()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_bold() {
        assert_eq!(strip_bold("**Bánh kem** từ 120k"), "Bánh kem từ 120k");
        assert_eq!(strip_bold("  a **b** c **d**  \n"), "a b c d");
        assert_eq!(strip_bold("no markers"), "no markers");
    }

    #[test]
    fn test_strip_bold_is_lazy_and_line_bound() {
        assert_eq!(strip_bold("**a** and **b**"), "a and b");
        assert_eq!(strip_bold("**open\nclose**"), "**open\nclose**");
        assert_eq!(strip_bold("****"), "");
    }
}
