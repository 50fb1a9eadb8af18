/// LLM Client: the single point of entry for all chat-completion calls.
///
/// Both the prompt runner and the business-card reader go through
/// [`CompletionClient`]. `AppState` carries it as `Arc<dyn CompletionClient>`
/// so handlers can be exercised against fakes.
///
/// No retries: a failed call surfaces immediately to the user.
use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

pub mod prompts;

pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const TEXT_MAX_TOKENS: u32 = 2000;
const TEXT_TEMPERATURE: f32 = 0.7;
const VISION_MAX_TOKENS: u32 = 1000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OpenAI API key not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// An image attached to a completion request.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageInput {
    /// `data:<mime>;base64,<payload>` form expected by the vision API.
    pub fn to_data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.mime, encoded)
    }
}

/// Chat-completion seam. Implement this to swap providers without touching
/// handlers.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends `prompt` (optionally with an image) and returns the reply text.
    async fn complete(&self, prompt: &str, image: Option<&ImageInput>)
        -> Result<String, LlmError>;

    /// Whether an API key is available at all.
    fn is_configured(&self) -> bool;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// OpenAI chat-completions client used in production.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    url: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: Option<String>, url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            url,
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request<'a>(&'a self, prompt: &'a str, image: Option<&ImageInput>) -> ChatRequest<'a> {
        match image {
            None => ChatRequest {
                model: &self.model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: MessageContent::Text(prompt),
                }],
                max_tokens: TEXT_MAX_TOKENS,
                temperature: Some(TEXT_TEMPERATURE),
            },
            Some(image) => ChatRequest {
                model: &self.model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::Text { text: prompt },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: image.to_data_url(),
                            },
                        },
                    ]),
                }],
                max_tokens: VISION_MAX_TOKENS,
                temperature: None,
            },
        }
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    #[instrument(level = "debug", skip_all, fields(model = %self.model, with_image = image.is_some()))]
    async fn complete(
        &self,
        prompt: &str,
        image: Option<&ImageInput>,
    ) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::NotConfigured)?;
        let request_body = self.build_request(prompt, image);

        debug!(url = %self.url, "sending chat completion request");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "API request failed".to_string());
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let raw = response.text().await?;
        let chat: ChatResponse = serde_json::from_str(&raw)?;

        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat.text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
