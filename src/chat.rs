//! Chat request/response cycle against the OpenAI chat-completions API.
//!
//! `ChatSession` owns the conversation: it appends the user's message,
//! builds a bounded role-tagged context, submits it, and records exactly one
//! of the contract outcomes as new history entries. Failures never surface
//! as errors to the caller; they become assistant messages, with affordance
//! messages attached for the actionable cases (missing credential,
//! connectivity).

use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{AstroError, ChatHistory, Message, MessageAction, Result, Settings};

/// Model identifier sent with every request.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
/// Sampling temperature sent with every request.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Output-token ceiling sent with every request.
pub const DEFAULT_MAX_TOKENS: u32 = 150;
/// Base URL of the chat-completion service.
pub const API_BASE_URL: &str = "https://api.openai.com/v1";

/// How many recent conversation messages are carried into each request.
const CONTEXT_WINDOW: usize = 20;

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant built into a note-taking app. \
     Answer the user's questions concisely.";

const EMPTY_REPLY_FALLBACK: &str = "I'm sorry, I couldn't come up with a response.";

const CREDENTIAL_GUIDANCE: &str =
    "I need an OpenAI API key before I can reply. Add one in the settings and try again.";

/// A role-tagged entry in the request payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn system(content: &str) -> Self {
        ChatMessage {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    fn from_history(message: &Message) -> Self {
        ChatMessage {
            role: if message.is_user { "user" } else { "assistant" }.to_string(),
            content: message.text.clone(),
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'static str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// The outward seam to the chat-completion service.
#[allow(async_fn_in_trait)]
pub trait CompletionApi {
    /// Submits a role-tagged message sequence and returns the completion
    /// text. Transport problems map to [`AstroError::Connectivity`], all
    /// other failures to [`AstroError::Api`].
    async fn complete(&self, api_key: &str, messages: &[ChatMessage]) -> Result<String>;
}

/// Production client for the OpenAI chat-completions endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
}

impl OpenAiClient {
    /// Builds a client with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AstroError::Api {
                message: format!("Failed to initialize OpenAI client: {}", e),
            })?;
        Ok(Self { http })
    }
}

impl CompletionApi for OpenAiClient {
    async fn complete(&self, api_key: &str, messages: &[ChatMessage]) -> Result<String> {
        let body = CompletionRequest {
            model: DEFAULT_MODEL,
            messages,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        };

        debug!("Submitting chat request with {} messages", messages.len());
        let response = self
            .http
            .post(format!("{}/chat/completions", API_BASE_URL))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AstroError::Api {
                message: format!("OpenAI request failed with status {}: {}", status, detail),
            });
        }

        let parsed: CompletionResponse =
            response.json().await.map_err(|e| AstroError::Api {
                message: format!("Failed to parse OpenAI response: {}", e),
            })?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

fn classify_transport_error(e: reqwest::Error) -> AstroError {
    if e.is_connect() || e.is_timeout() || e.is_request() {
        AstroError::Connectivity {
            message: e.to_string(),
        }
    } else {
        AstroError::Api {
            message: e.to_string(),
        }
    }
}

/// Orchestrates one conversation against a completion client.
///
/// `send` and `retry` take `&mut self`, so at most one request can be in
/// flight at a time; the UI-side equivalent is the disabled send affordance.
pub struct ChatSession<C> {
    history: ChatHistory,
    settings: Settings,
    client: C,
    pending_retry: Option<Vec<ChatMessage>>,
}

impl<C: CompletionApi> ChatSession<C> {
    pub fn new(history: ChatHistory, settings: Settings, client: C) -> Self {
        Self {
            history,
            settings,
            client,
            pending_retry: None,
        }
    }

    /// The conversation so far, in append order.
    pub fn messages(&self) -> &[Message] {
        self.history.messages()
    }

    /// Whether a failed request is waiting to be retried.
    pub fn can_retry(&self) -> bool {
        self.pending_retry.is_some()
    }

    /// Empties the conversation, both in memory and on disk.
    pub fn clear(&mut self) -> Result<()> {
        self.pending_retry = None;
        self.history.clear()
    }

    /// Submits a new user message and records the outcome. Blank input is
    /// ignored.
    pub async fn send(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring empty chat input");
            return;
        }

        let id = self.history.next_id();
        self.record(Message::user(id, text.to_string()));

        let Some(api_key) = self.settings.api_key() else {
            info!("Chat request without stored credential");
            self.record_assistant(CREDENTIAL_GUIDANCE.to_string());
            self.record_affordance("Go to Settings", MessageAction::OpenSettings);
            return;
        };

        let payload = self.build_request();
        self.dispatch(&api_key, payload).await;
    }

    /// Re-issues the identical request remembered from the last connectivity
    /// failure. No-op when nothing is pending.
    pub async fn retry(&mut self) {
        let Some(payload) = self.pending_retry.take() else {
            debug!("Retry requested with no pending request");
            return;
        };

        let Some(api_key) = self.settings.api_key() else {
            info!("Retry without stored credential");
            self.record_assistant(CREDENTIAL_GUIDANCE.to_string());
            self.record_affordance("Go to Settings", MessageAction::OpenSettings);
            return;
        };

        info!("Retrying chat request ({} messages)", payload.len());
        self.dispatch(&api_key, payload).await;
    }

    async fn dispatch(&mut self, api_key: &str, payload: Vec<ChatMessage>) {
        match self.client.complete(api_key, &payload).await {
            Ok(reply) => {
                self.pending_retry = None;
                let text = if reply.trim().is_empty() {
                    debug!("Service returned empty content, using fallback");
                    EMPTY_REPLY_FALLBACK.to_string()
                } else {
                    reply
                };
                self.record_assistant(text);
            }
            Err(AstroError::Connectivity { message }) => {
                warn!("Chat request failed to connect: {}", message);
                self.record_assistant(format!(
                    "I couldn't reach the assistant service: {}. \
                     Please check your internet connection.",
                    message
                ));
                self.record_affordance("Retry", MessageAction::Retry);
                self.pending_retry = Some(payload);
            }
            Err(e) => {
                warn!("Chat request failed: {}", e);
                self.pending_retry = None;
                self.record_assistant(e.to_string());
            }
        }
    }

    /// Builds the bounded role-tagged context: the fixed system preamble,
    /// then the most recent conversation messages (affordance messages are
    /// synthesized UI, not conversation, and are left out).
    fn build_request(&self) -> Vec<ChatMessage> {
        let conversation: Vec<&Message> = self
            .history
            .messages()
            .iter()
            .filter(|m| m.is_plain())
            .collect();

        let start = conversation.len().saturating_sub(CONTEXT_WINDOW);
        let mut payload = Vec::with_capacity(conversation.len() - start + 1);
        payload.push(ChatMessage::system(SYSTEM_PROMPT));
        payload.extend(conversation[start..].iter().map(|m| ChatMessage::from_history(m)));
        payload
    }

    fn record_assistant(&mut self, text: String) {
        let id = self.history.next_id();
        self.record(Message::assistant(id, text));
    }

    fn record_affordance(&mut self, text: &str, action: MessageAction) {
        let id = self.history.next_id();
        self.record(Message::affordance(id, text.to_string(), action));
    }

    /// History write failures are logged, never surfaced; the in-memory
    /// conversation stays consistent either way.
    fn record(&mut self, message: Message) {
        if let Err(e) = self.history.append(message) {
            warn!("Failed to persist chat history: {}", e);
        }
    }
}
