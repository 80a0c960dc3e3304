//! Server-rendered chatbot widget.
//!
//! - [`page`]: the full widget page
//! - [`messages`]: message bubble fragments swapped in by htmx

pub mod messages;
pub mod page;

pub use page::widget_page;
