
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::RagError;
use crate::Result;
use crate::backend::http::{self, DEFAULT_RETRY_ATTEMPTS, HttpError};
use crate::backend::{Embedder, Generator};
use crate::config::OpenAiConfig;

/// Client for the OpenAI embeddings and chat-completions endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: Url,
    api_key: String,
    embed_model: String,
    chat_model: String,
    agent: ureq::Agent,
    retry_attempts: u32,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl OpenAiClient {
    #[inline]
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let base_url = config
            .base_url()
            .map_err(|e| RagError::Config(e.to_string()))?;

        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            embed_model: config.embed_model.clone(),
            chat_model: config.chat_model.clone(),
            agent: http::agent_with_timeout(config.timeout_secs),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        })
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Compute the embedding vector for one text.
    #[inline]
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Embedding text ({} chars)", text.chars().count());

        let request = EmbeddingsRequest {
            model: &self.embed_model,
            input: text,
        };
        let response_text = self
            .post("/v1/embeddings", &request)
            .map_err(|e| embed_error(&e))?;

        let response: EmbeddingsResponse = serde_json::from_str(&response_text)
            .map_err(|e| RagError::Embedding(format!("Failed to parse response: {e}")))?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| RagError::Embedding("Response contained no embedding".to_string()))?;

        debug!("Received embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }

    /// Ask the chat model for a completion given a system instruction and a
    /// user message; returns the trimmed answer text.
    #[inline]
    pub fn chat(&self, system: &str, user: &str) -> Result<String> {
        debug!("Requesting chat completion from model {}", self.chat_model);

        let request = ChatRequest {
            model: &self.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };
        let response_text = self
            .post("/v1/chat/completions", &request)
            .map_err(|e| generation_error(&e))?;

        let response: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| RagError::Generation(format!("Failed to parse response: {e}")))?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| RagError::Generation("Response contained no choices".to_string()))?;

        Ok(answer.trim().to_string())
    }

    fn post<T: Serialize>(&self, path: &str, request: &T) -> std::result::Result<String, HttpError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| HttpError::Transport(e.to_string()))?;
        let body = serde_json::to_string(request)
            .map_err(|e| HttpError::Transport(e.to_string()))?;
        let auth = format!("Bearer {}", self.api_key);

        http::post_json_with_retry(
            &self.agent,
            &url,
            &[("Authorization", auth.as_str())],
            &body,
            self.retry_attempts,
        )
    }
}

fn embed_error(error: &HttpError) -> RagError {
    match error {
        HttpError::Timeout => RagError::Timeout("OpenAI embeddings request".to_string()),
        other => RagError::Embedding(format!("OpenAI request failed: {other}")),
    }
}

fn generation_error(error: &HttpError) -> RagError {
    match error {
        HttpError::Timeout => RagError::Timeout("OpenAI chat request".to_string()),
        other => RagError::Generation(format!("OpenAI request failed: {other}")),
    }
}

impl Embedder for OpenAiClient {
    #[inline]
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_text(text)
    }
}

impl Generator for OpenAiClient {
    #[inline]
    fn generate(&self, system: &str, user: &str) -> Result<String> {
        self.chat(system, user)
    }
}
