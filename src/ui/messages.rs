//! Message bubble fragments.
//!
//! Every fragment carries `data-message-id` so htmx swaps and tests can
//! address a bubble. Text is always HTML-escaped.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::attachment::PendingAttachment;
use crate::transcript::{RenderedMessage, ReplyState};

/// Avatar shown next to bot bubbles.
const BOT_AVATAR: &str = r#"<img class="bot-avatar" src="/static/img/cute-cake.png" alt="Bot">"#;

const THINKING_INDICATOR: &str = r#"<div class="thinking-indicator"><div class="dot"></div><div class="dot"></div><div class="dot"></div></div>"#;

/// Render one bubble.
#[must_use]
pub fn render(message: &RenderedMessage) -> String {
    match message {
        RenderedMessage::Outgoing {
            id,
            created_at,
            text,
            attachment_url,
        } => outgoing(*id, *created_at, text, attachment_url.as_deref()),
        RenderedMessage::Incoming {
            id,
            created_at,
            reply,
        } => incoming(*id, *created_at, reply),
    }
}

/// Render a list of bubbles in order.
#[must_use]
pub fn render_all(messages: &[RenderedMessage]) -> String {
    messages.iter().map(render).collect()
}

/// Send time of a bubble, `HH:MM` in UTC.
fn timestamp(created_at: DateTime<Utc>) -> String {
    format!(
        r#"<time class="message-time" datetime="{}">{}</time>"#,
        created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        created_at.format("%H:%M")
    )
}

/// User bubble.
#[must_use]
pub fn outgoing(
    id: Uuid,
    created_at: DateTime<Utc>,
    text: &str,
    attachment_url: Option<&str>,
) -> String {
    let mut html = format!(
        r#"<div class="message user-message" data-message-id="{id}"><div class="message-text">{}</div>"#,
        escape_html(text)
    );
    if let Some(url) = attachment_url {
        let _ = write!(
            html,
            r#"<img src="{}" class="attachment" alt="">"#,
            escape_html(url)
        );
    }
    html.push_str(&timestamp(created_at));
    html.push_str("</div>");
    html
}

/// Bot bubble.
///
/// A thinking placeholder asks the server for its reply as soon as it is
/// inserted and swaps itself out with the answer.
#[must_use]
pub fn incoming(id: Uuid, created_at: DateTime<Utc>, reply: &ReplyState) -> String {
    let time = timestamp(created_at);
    match reply {
        ReplyState::Thinking => format!(
            r#"<div class="message bot-message thinking" data-message-id="{id}" hx-get="/api/chat/replies/{id}" hx-trigger="load" hx-swap="outerHTML">{BOT_AVATAR}<div class="message-text">{THINKING_INDICATOR}</div>{time}</div>"#
        ),
        ReplyState::Answered(text) => format!(
            r#"<div class="message bot-message" data-message-id="{id}">{BOT_AVATAR}<div class="message-text">{}</div>{time}</div>"#,
            escape_html(text)
        ),
        ReplyState::Failed(text) => format!(
            r#"<div class="message bot-message error" data-message-id="{id}">{BOT_AVATAR}<div class="message-text" style="color: #ff0000">{}</div>{time}</div>"#,
            escape_html(text)
        ),
    }
}

/// Thumbnail shown in the file upload wrapper.
#[must_use]
pub fn attachment_preview(attachment: &PendingAttachment) -> String {
    format!(
        r#"<img src="{}" alt="attachment preview">"#,
        escape_html(&attachment.data_url())
    )
}

/// Escape text for element content and quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 8, 14, 5, 9).unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
        assert_eq!(escape_html("Bánh kem 🎂"), "Bánh kem 🎂");
    }

    #[test]
    fn test_outgoing_escapes_text() {
        let id = Uuid::new_v4();
        let html = outgoing(id, at(), "<b>hi</b>", None);
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(html.contains(&format!(r#"data-message-id="{id}""#)));
        assert!(!html.contains("class=\"attachment\""));
    }

    #[test]
    fn test_outgoing_with_attachment() {
        let html = outgoing(Uuid::new_v4(), at(), "", Some("data:image/png;base64,iVBORw0KGgo="));
        assert!(html.contains(r#"<img src="data:image/png;base64,iVBORw0KGgo=" class="attachment""#));
    }

    #[test]
    fn test_thinking_placeholder_polls_its_reply() {
        let id = Uuid::new_v4();
        let html = incoming(id, at(), &ReplyState::Thinking);
        assert!(html.contains("thinking-indicator"));
        assert!(html.contains(&format!(r#"hx-get="/api/chat/replies/{id}""#)));
        assert!(html.contains(r#"hx-swap="outerHTML""#));
    }

    #[test]
    fn test_resolved_bubbles_do_not_poll() {
        let answered = incoming(Uuid::new_v4(), at(), &ReplyState::Answered("Chào bạn".into()));
        let failed = incoming(Uuid::new_v4(), at(), &ReplyState::Failed("Xin lỗi".into()));

        assert!(!answered.contains("hx-get"));
        assert!(!answered.contains("thinking"));
        assert!(answered.contains("Chào bạn"));
        assert!(failed.contains("error"));
        assert!(failed.contains("#ff0000"));
    }

    #[test]
    fn test_bubbles_show_send_time() {
        let expected = r#"<time class="message-time" datetime="2026-03-08T14:05:09Z">14:05</time>"#;

        assert!(outgoing(Uuid::new_v4(), at(), "Chào", None).contains(expected));
        assert!(incoming(Uuid::new_v4(), at(), &ReplyState::Thinking).contains(expected));
        assert!(
            incoming(Uuid::new_v4(), at(), &ReplyState::Answered("Dạ".into())).contains(expected)
        );
    }
}
