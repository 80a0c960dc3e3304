use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::attachment::resolve_mime;
use crate::config::AppConfig;
use crate::error::AttachmentError;
use crate::llm::{GeminiDriver, GeminiSettings};
use crate::session::ConversationTurn;
use crate::transcript::ReplyState;
use crate::ui::{self, messages};

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>, settings: GeminiSettings) -> anyhow::Result<()> {
    info!(
        name: "llm.config.loaded",
        base_url = %settings.base_url,
        model = %settings.model,
        provider = ?settings.provider,
        "Gemini configuration loaded"
    );

    let driver = GeminiDriver::new(settings)?;
    let state = AppState::new(Arc::new(driver), Arc::clone(&config));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the router over an already constructed state.
pub fn build_router(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config.server.static_dir);
    let body_limit = state.config.server.body_limit_bytes;

    Router::new()
        .route("/", get(index))
        .route("/api/chat", post(api_chat))
        .route("/api/chat/messages", post(post_message))
        .route("/api/chat/replies/{id}", get(get_reply))
        .route(
            "/api/chat/attachment",
            post(post_attachment).delete(delete_attachment),
        )
        .route("/api/chat/history", get(get_history))
        .route("/api/chat/transcript", get(get_transcript))
        .nest_service("/static", static_dir)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Page
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - The widget page. Each load starts a new conversation.
async fn index(State(state): State<AppState>) -> Html<String> {
    state.start_conversation();
    Html(ui::widget_page())
}

/// GET /api/chat/transcript - Bubbles of the active conversation, in order.
async fn get_transcript(State(state): State<AppState>) -> Html<String> {
    Html(messages::render_all(&state.relay().transcript().snapshot()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Form body posted by `.chat-form`.
#[derive(Debug, Deserialize)]
struct MessageForm {
    #[serde(default)]
    message: String,
}

/// POST /api/chat/messages - Render the outgoing bubble and a placeholder.
///
/// The API call runs in the background; the placeholder fetches its own
/// reply from `/api/chat/replies/{id}`.
async fn post_message(State(state): State<AppState>, Form(form): Form<MessageForm>) -> Response {
    let relay = state.relay();
    let exchange = match relay.begin(&form.message) {
        Ok(exchange) => exchange,
        Err(err) => {
            tracing::debug!(error = %err, "Ignoring empty send");
            return StatusCode::NO_CONTENT.into_response();
        }
    };

    let transcript = relay.transcript();
    let html: String = [exchange.message_id, exchange.placeholder_id]
        .into_iter()
        .filter_map(|id| transcript.get(id))
        .map(|message| messages::render(&message))
        .collect();

    tokio::spawn(async move {
        relay.complete(exchange).await;
    });

    Html(html).into_response()
}

/// GET /api/chat/replies/{id} - Wait for a placeholder to resolve.
async fn get_reply(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, StatusCode> {
    let relay = state.relay();
    let transcript = relay.transcript();
    transcript
        .wait_for_reply(id)
        .await
        .and_then(|_| transcript.get(id))
        .map(|message| Html(messages::render(&message)))
        .ok_or(StatusCode::NOT_FOUND)
}

/// Request body for the JSON chat API.
#[derive(Debug, Deserialize)]
struct ChatRequest {
    /// User message content.
    #[serde(default)]
    message: String,
    /// Optional `data:` URL of an image sent with this message. It replaces
    /// any pending upload; a rejected one clears it.
    #[serde(default)]
    image: Option<String>,
}

/// Response from the JSON chat API.
#[derive(Debug, Serialize)]
struct ChatResponse {
    placeholder_id: Uuid,
    /// `false` when the fallback message was shown instead of a reply.
    ok: bool,
    reply: String,
}

/// POST /api/chat - Send a message and wait for the reply.
async fn api_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let relay = state.relay();
    if let Some(image) = req.image.as_deref() {
        relay
            .attach_data_url(image)
            .map_err(|err| attachment_error(&state, &err))?;
    }

    let exchange = relay
        .begin(&req.message)
        .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;
    let placeholder_id = exchange.placeholder_id;

    let reply = relay.complete(exchange).await;
    Ok(Json(ChatResponse {
        placeholder_id,
        ok: matches!(reply, ReplyState::Answered(_)),
        reply: reply.text().unwrap_or_default().to_string(),
    }))
}

/// GET /api/chat/history - The conversation as it will be sent to the API.
async fn get_history(State(state): State<AppState>) -> Json<Vec<ConversationTurn>> {
    Json(state.relay().history().snapshot())
}

// ─────────────────────────────────────────────────────────────────────────────
// Attachment
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/chat/attachment - Store the uploaded image as pending.
async fn post_attachment(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, (StatusCode, String)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let mime_type = resolve_mime(field.content_type(), field.file_name());
        let bytes = field
            .bytes()
            .await
            .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;

        return state
            .relay()
            .attach_file(&bytes, &mime_type)
            .map(|attachment| Html(messages::attachment_preview(&attachment)))
            .map_err(|err| attachment_error(&state, &err));
    }

    Err((
        StatusCode::BAD_REQUEST,
        "Missing multipart field `file`".to_string(),
    ))
}

/// DELETE /api/chat/attachment - Drop the pending attachment.
async fn delete_attachment(State(state): State<AppState>) -> StatusCode {
    state.relay().clear_attachment();
    StatusCode::NO_CONTENT
}

fn attachment_error(state: &AppState, err: &AttachmentError) -> (StatusCode, String) {
    match err {
        AttachmentError::UnsupportedType(_) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            state.config.chat.rejection_message.clone(),
        ),
        other => {
            warn!(error = %other, "Unreadable attachment");
            (StatusCode::BAD_REQUEST, other.to_string())
        }
    }
}

