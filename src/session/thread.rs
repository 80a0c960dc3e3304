//! Append-only conversation thread.

use std::sync::{Arc, PoisonError, RwLock};

use super::turn::{ConversationTurn, Role};

/// Ordered conversation history for the active chat.
///
/// The history is seeded with exactly one model turn holding the system
/// prompt and afterwards only grows. Clones share the same underlying
/// thread; nothing outside this crate can remove or rewrite a turn.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    inner: Arc<RwLock<Vec<ConversationTurn>>>,
}

impl ConversationHistory {
    /// Create a history whose only turn is the seed system prompt.
    #[must_use]
    pub fn seeded(system_prompt: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(vec![ConversationTurn::model_text(
                system_prompt,
            )])),
        }
    }

    /// Append a turn at the end of the thread.
    pub(crate) fn append(&self, turn: ConversationTurn) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(turn);
    }

    /// Append a turn and return a snapshot of the whole thread including it.
    ///
    /// Both happen under one write lock, so the snapshot never contains a
    /// turn appended after this one.
    pub(crate) fn append_and_snapshot(&self, turn: ConversationTurn) -> Vec<ConversationTurn> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.push(turn);
        guard.clone()
    }

    /// Copy of every turn in chronological append order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ConversationTurn> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The seed system prompt turn.
    #[must_use]
    pub fn seed(&self) -> ConversationTurn {
        // The seed is pushed in the constructor and never removed.
        self.inner.read().unwrap_or_else(PoisonError::into_inner)[0].clone()
    }

    /// Number of turns, seed included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Always `false`: a history holds at least its seed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of turns authored by `role`, seed included.
    #[must_use]
    pub fn count_role(&self, role: Role) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|t| t.role == role)
            .count()
    }
}
