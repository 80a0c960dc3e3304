//! Shared fixtures: a scripted stand-in for the Gemini API.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use sweet_home_chatbot::config::ChatConfig;
use sweet_home_chatbot::error::RelayError;
use sweet_home_chatbot::llm::{GenerateContentRequest, GenerateContentResponse, GenerativeClient};
use sweet_home_chatbot::relay::ChatRelay;
use tokio::sync::{mpsc, oneshot};

/// Canned outcome of one `generate` call.
#[derive(Debug, Clone)]
pub enum Scripted {
    Text(String),
    Status(u16),
    NoCandidates,
}

impl Scripted {
    pub fn text(text: &str) -> Self {
        Self::Text(text.to_string())
    }

    fn into_result(self) -> Result<GenerateContentResponse, RelayError> {
        match self {
            Self::Text(text) => Ok(serde_json::from_value(serde_json::json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": text }] },
                    "finishReason": "STOP"
                }]
            }))?),
            Self::Status(status) => Err(RelayError::Http {
                status,
                message: "scripted failure".to_string(),
            }),
            Self::NoCandidates => Ok(GenerateContentResponse::default()),
        }
    }
}

/// A call held open until the test answers it.
#[derive(Debug)]
pub struct HeldCall {
    pub request: GenerateContentRequest,
    respond: oneshot::Sender<Scripted>,
}

impl HeldCall {
    pub fn answer(self, outcome: Scripted) {
        let _ = self.respond.send(outcome);
    }
}

#[derive(Debug)]
enum Mode {
    Queue(Mutex<VecDeque<Scripted>>),
    Held(mpsc::UnboundedSender<HeldCall>),
}

/// Records every request and answers from a script.
#[derive(Debug)]
pub struct ScriptedClient {
    requests: Mutex<Vec<GenerateContentRequest>>,
    mode: Mode,
}

impl ScriptedClient {
    /// Answer calls in order; once the script runs out every call fails
    /// with a 500.
    pub fn replying(script: impl IntoIterator<Item = Scripted>) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            mode: Mode::Queue(Mutex::new(script.into_iter().collect())),
        })
    }

    /// Hold every call until the test answers it through the receiver.
    pub fn held() -> (Arc<Self>, mpsc::UnboundedReceiver<HeldCall>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            mode: Mode::Held(tx),
        });
        (client, rx)
    }

    pub fn requests(&self) -> Vec<GenerateContentRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl GenerativeClient for ScriptedClient {
    async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, RelayError> {
        self.requests.lock().unwrap().push(request.clone());

        let outcome = match &self.mode {
            Mode::Queue(queue) => queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Scripted::Status(500)),
            Mode::Held(tx) => {
                let (respond, rx) = oneshot::channel();
                tx.send(HeldCall {
                    request: request.clone(),
                    respond,
                })
                .expect("test dropped the call receiver");
                rx.await.unwrap_or(Scripted::Status(503))
            }
        };
        outcome.into_result()
    }
}

/// Relay over `client` with the default bakery configuration.
pub fn relay_with(client: Arc<ScriptedClient>) -> Arc<ChatRelay> {
    Arc::new(ChatRelay::new(client, &ChatConfig::default()))
}

/// Base64 of the 8-byte PNG signature.
pub const PNG_B64: &str = "iVBORw0KGgo=";

/// The 8-byte PNG signature.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
