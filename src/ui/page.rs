//! Widget page.
//!
//! The DOM contract is fixed: `#chatbot-toggler`, `#close-chatbot`,
//! `.chatbot-popup`, `.chat-form`, `.chat-body`, `.message-input`,
//! `#send-message`, `#file-input`, `#file-upload`, `#file-cancel` and
//! `.file-upload-wrapper`.

use super::messages::escape_html;
use crate::attachment::ACCEPTED_IMAGE_TYPES;

/// Client-side behaviour that htmx attributes cannot express.
const WIDGET_SCRIPT: &str = r##"
document.addEventListener("DOMContentLoaded", () => {
    const popup = document.querySelector(".chatbot-popup");
    const chatBody = document.querySelector(".chat-body");
    const messageInput = document.querySelector(".message-input");
    const fileInput = document.querySelector("#file-input");
    const fileWrapper = document.querySelector(".file-upload-wrapper");

    const resetFileInput = () => {
        fileInput.value = "";
        fileWrapper.classList.remove("file-uploaded");
        document.querySelector("#file-preview").innerHTML = "";
    };

    document.querySelector("#chatbot-toggler").addEventListener("click", () => popup.classList.toggle("active"));
    document.querySelector("#close-chatbot").addEventListener("click", () => popup.classList.remove("active"));
    document.querySelector("#file-upload").addEventListener("click", () => fileInput.click());
    document.querySelector("#file-cancel").addEventListener("htmx:afterRequest", resetFileInput);

    messageInput.addEventListener("keydown", (e) => {
        if (e.key === "Enter" && !e.shiftKey && window.innerWidth > 768) {
            e.preventDefault();
            messageInput.form.requestSubmit();
        }
    });

    document.body.addEventListener("htmx:afterRequest", (e) => {
        if (e.detail.elt === fileInput) {
            if (e.detail.successful) {
                fileWrapper.classList.add("file-uploaded");
            } else {
                alert(e.detail.xhr.responseText);
                resetFileInput();
            }
        } else if (e.detail.elt.classList && e.detail.elt.classList.contains("chat-form") && e.detail.successful) {
            messageInput.value = "";
            fileWrapper.classList.remove("file-uploaded");
            document.querySelector("#file-preview").innerHTML = "";
        }
    });

    document.body.addEventListener("htmx:afterSwap", () => {
        chatBody.scrollTo({ behavior: "smooth", top: chatBody.scrollHeight });
    });
});
"##;

/// Generate the HTML shell for the application.
fn html_shell(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="vi">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Sweet Home Bakery assistant">
    <title>{title} - Sweet Home Bakery</title>

    <script src="https://unpkg.com/htmx.org@2.0.8" crossorigin="anonymous"></script>
    <link rel="stylesheet" href="/static/chatbot.css">
</head>
<body>
    {content}
    <script>{WIDGET_SCRIPT}</script>
</body>
</html>"#
    )
}

/// The chatbot widget with an empty chat body.
fn widget() -> String {
    let accept = ACCEPTED_IMAGE_TYPES.join(",");

    format!(
        r##"<button id="chatbot-toggler" type="button" aria-label="Mở chatbot">
        <span class="material-symbols-rounded">mode_comment</span>
    </button>

    <div class="chatbot-popup">
        <div class="chat-header">
            <div class="header-info">
                <img class="chatbot-logo" src="/static/img/cute-cake.png" alt="Sweet Home">
                <h2 class="logo-text">Sweet Home</h2>
            </div>
            <button id="close-chatbot" type="button" aria-label="Đóng">&times;</button>
        </div>

        <div class="chat-body" aria-live="polite"></div>

        <div class="chat-footer">
            <form class="chat-form" hx-post="/api/chat/messages" hx-target=".chat-body" hx-swap="beforeend">
                <textarea name="message" class="message-input" placeholder="Nhập tin nhắn..." rows="1"></textarea>
                <div class="chat-controls">
                    <div class="file-upload-wrapper">
                        <input type="file" name="file" id="file-input" accept="{accept}" hidden
                            hx-post="/api/chat/attachment" hx-encoding="multipart/form-data"
                            hx-trigger="change" hx-target="#file-preview" hx-swap="innerHTML">
                        <span id="file-preview"></span>
                        <button type="button" id="file-upload" aria-label="Đính kèm ảnh">attach_file</button>
                        <button type="button" id="file-cancel" aria-label="Bỏ ảnh"
                            hx-delete="/api/chat/attachment" hx-swap="none">close</button>
                    </div>
                    <button type="submit" id="send-message" aria-label="Gửi">arrow_upward</button>
                </div>
            </form>
        </div>
    </div>"##,
        accept = escape_html(&accept),
    )
}

/// Full page hosting the widget.
///
/// Every page load starts a new conversation, so the chat body is always
/// empty here.
#[must_use]
pub fn widget_page() -> String {
    html_shell("Chatbot", &widget())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_exposes_dom_contract() {
        let html = widget_page();
        for selector in [
            r#"id="chatbot-toggler""#,
            r#"id="close-chatbot""#,
            r#"class="chatbot-popup""#,
            r#"class="chat-form""#,
            r#"class="chat-body""#,
            r#"class="message-input""#,
            r#"id="send-message""#,
            r#"id="file-input""#,
            r#"id="file-upload""#,
            r#"id="file-cancel""#,
            r#"class="file-upload-wrapper""#,
        ] {
            assert!(html.contains(selector), "missing {selector}");
        }
        assert!(html.contains("image/jpeg,image/png,image/gif,image/webp"));
        assert!(html.contains(r##"hx-target="#file-preview""##));
    }

    #[test]
    fn test_page_starts_with_empty_chat_body() {
        let html = widget_page();
        assert!(html.contains(r#"<div class="chat-body" aria-live="polite"></div>"#));
        assert!(!html.contains("data-message-id"));
        assert!(!html.contains("file-upload-wrapper file-uploaded"));
    }

    #[test]
    fn test_widget_script_is_embedded_whole() {
        assert!(WIDGET_SCRIPT.contains(r##"document.querySelector("#file-input")"##));
        assert!(WIDGET_SCRIPT.contains(r##"document.querySelector("#close-chatbot")"##));
        assert!(WIDGET_SCRIPT.trim_end().ends_with("});"));

        let html = widget_page();
        assert!(html.contains(WIDGET_SCRIPT));
    }
}
