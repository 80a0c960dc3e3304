//! Rendered widget state.
//!
//! The transcript is what the chat body shows: outgoing bubbles as typed by
//! the user and incoming bubbles that start as a "thinking" placeholder and
//! are later resolved with the reply or the fallback text. Entries keep their
//! insertion (send) order no matter in which order replies arrive.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use uuid::Uuid;

/// State of an incoming bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyState {
    /// Waiting for the API.
    Thinking,
    /// Reply text, bold markers already stripped.
    Answered(String),
    /// Fallback text shown after a failed exchange.
    Failed(String),
}

impl ReplyState {
    /// Whether the placeholder is still waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Thinking)
    }

    /// Rendered text, if resolved.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Thinking => None,
            Self::Answered(t) | Self::Failed(t) => Some(t),
        }
    }
}

/// Snapshot of one bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedMessage {
    /// Message typed by the user.
    Outgoing {
        /// Bubble id.
        id: Uuid,
        /// Creation time.
        created_at: DateTime<Utc>,
        /// Text as sent.
        text: String,
        /// Attachment preview as a data URL.
        attachment_url: Option<String>,
    },
    /// Bot bubble.
    Incoming {
        /// Bubble id.
        id: Uuid,
        /// Creation time.
        created_at: DateTime<Utc>,
        /// Current state.
        reply: ReplyState,
    },
}

impl RenderedMessage {
    /// Bubble id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        match self {
            Self::Outgoing { id, .. } | Self::Incoming { id, .. } => *id,
        }
    }
}

#[derive(Debug)]
struct Entry {
    id: Uuid,
    created_at: DateTime<Utc>,
    body: EntryBody,
}

#[derive(Debug)]
enum EntryBody {
    Outgoing {
        text: String,
        attachment_url: Option<String>,
    },
    Incoming(watch::Sender<ReplyState>),
}

impl Entry {
    fn render(&self) -> RenderedMessage {
        match &self.body {
            EntryBody::Outgoing {
                text,
                attachment_url,
            } => RenderedMessage::Outgoing {
                id: self.id,
                created_at: self.created_at,
                text: text.clone(),
                attachment_url: attachment_url.clone(),
            },
            EntryBody::Incoming(tx) => RenderedMessage::Incoming {
                id: self.id,
                created_at: self.created_at,
                reply: tx.borrow().clone(),
            },
        }
    }
}

/// Ordered list of rendered bubbles.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: RwLock<Vec<Entry>>,
}

impl Transcript {
    /// Create an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user bubble.
    pub fn push_outgoing(&self, text: impl Into<String>, attachment_url: Option<String>) -> Uuid {
        self.push(EntryBody::Outgoing {
            text: text.into(),
            attachment_url,
        })
    }

    /// Append a "thinking" placeholder bubble.
    pub fn push_placeholder(&self) -> Uuid {
        let (tx, _rx) = watch::channel(ReplyState::Thinking);
        self.push(EntryBody::Incoming(tx))
    }

    fn push(&self, body: EntryBody) -> Uuid {
        let id = Uuid::new_v4();
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Entry {
                id,
                created_at: Utc::now(),
                body,
            });
        id
    }

    /// Replace the state of a placeholder and wake its waiters.
    ///
    /// Returns `false` when `id` is not an incoming bubble.
    pub fn resolve(&self, id: Uuid, reply: ReplyState) -> bool {
        let guard = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match guard.iter().find(|e| e.id == id).map(|e| &e.body) {
            Some(EntryBody::Incoming(tx)) => {
                tx.send_replace(reply);
                true
            }
            _ => false,
        }
    }

    /// Snapshot of one bubble.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<RenderedMessage> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|e| e.id == id)
            .map(Entry::render)
    }

    /// Snapshot of every bubble in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<RenderedMessage> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(Entry::render)
            .collect()
    }

    /// Number of bubbles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing was rendered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait until the placeholder `id` leaves the thinking state.
    ///
    /// Returns `None` when `id` is not an incoming bubble.
    pub async fn wait_for_reply(&self, id: Uuid) -> Option<ReplyState> {
        let mut rx = {
            let guard = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match guard.iter().find(|e| e.id == id).map(|e| &e.body) {
                Some(EntryBody::Incoming(tx)) => tx.subscribe(),
                _ => return None,
            }
        };

        // The sender lives in the transcript, so the channel never closes
        // while `self` is borrowed.
        let state = rx.wait_for(|s| !s.is_pending()).await.ok()?;
        Some(state.clone())
    }
}
