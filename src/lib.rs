//! Sweet Home Bakery chatbot
//!
//! A chat widget for the bakery's admin panel that relays each message,
//! with an optional image, to the Gemini `generateContent` API and renders
//! the reply.
//!
//! # Architecture
//!
//! - **Server**: Axum-based HTTP server rendering the widget for htmx
//! - **Relay**: owns one page's conversation and drives one API call per send
//! - **LLM**: Gemini REST driver behind the [`llm::GenerativeClient`] trait
//!
//! # Modules
//!
//! - [`relay`]: send pipeline, attachment slot and reply post-processing
//! - [`session`]: conversation history and turn types
//! - [`transcript`]: rendered bubbles and placeholder resolution
//! - [`llm`]: Gemini wire types and driver
//! - [`ui`]: server-rendered widget and fragments

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod attachment;
pub mod config;
pub mod error;
pub mod llm;
pub mod relay;
pub mod server;
pub mod session;
pub mod telemetry;
pub mod transcript;
pub mod ui;

use crate::config::AppConfig;
use crate::llm::GenerativeClient;
use crate::relay::ChatRelay;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Client every conversation talks to.
    client: Arc<dyn GenerativeClient>,
    /// The active conversation, replaced on every page load.
    relay: Arc<RwLock<Arc<ChatRelay>>>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// State with a freshly seeded conversation.
    pub fn new(client: Arc<dyn GenerativeClient>, config: Arc<AppConfig>) -> Self {
        let relay = Arc::new(ChatRelay::new(Arc::clone(&client), &config.chat));
        Self {
            client,
            relay: Arc::new(RwLock::new(relay)),
            config,
        }
    }

    /// The active conversation.
    pub fn relay(&self) -> Arc<ChatRelay> {
        Arc::clone(&self.relay.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Drop the active conversation and start a new one holding only the seed.
    ///
    /// Exchanges still in flight finish against the conversation they began
    /// in and never touch the new one.
    pub fn start_conversation(&self) -> Arc<ChatRelay> {
        let relay = Arc::new(ChatRelay::new(Arc::clone(&self.client), &self.config.chat));
        *self.relay.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&relay);
        info!(name: "chat.conversation.started", "Conversation started");
        relay
    }
}
