//! Conversation model and history.
//!
//! This module holds the data sent to the generative API on every exchange:
//! the turns themselves and the append-only thread that owns them.
//!
//! # Architecture
//!
//! - [`ConversationTurn`]: one message with a [`Role`] and ordered [`Part`]s
//! - [`ConversationHistory`]: the seeded, append-only thread for the chat
//!
//! # Example
//!
//! ```rust
//! use sweet_home_chatbot::session::{ConversationHistory, Role};
//!
//! let history = ConversationHistory::seeded("You are the Sweet Home assistant.");
//!
//! assert_eq!(history.len(), 1);
//! assert_eq!(history.seed().role, Role::Model);
//! ```

mod thread;
mod turn;

pub use thread::ConversationHistory;
pub use turn::{ConversationTurn, InlineData, Part, Role};
