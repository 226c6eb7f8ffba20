//! Bridge between the orchestrator and the `llm` crate.

use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;
use std::str::FromStr;
use tracing::{debug, warn};

use super::error::{ConfigError, ServiceError, ServiceErrorKind};
use super::transcript::{Role, Transcript, Turn};
use super::AgentConfig;

/// Sampling parameters applied to every completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            temperature: 0.5,
        }
    }
}

/// One request to the completion service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub turns: Vec<Turn>,
    pub max_tokens: u32,
    /// Number of completions asked for. Always 1.
    pub choices: u8,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(model: &str, transcript: &Transcript, sampling: Sampling) -> Self {
        Self {
            model: model.to_string(),
            turns: transcript.turns().to_vec(),
            max_tokens: sampling.max_tokens,
            choices: 1,
            temperature: sampling.temperature,
        }
    }
}

/// A service that turns a transcript into one generated text.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ServiceError>;
}

#[async_trait]
impl<'a, T: CompletionService + ?Sized> CompletionService for &'a T {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ServiceError> {
        (**self).complete(request).await
    }
}

/// Completion service backed by an `llm` provider.
pub struct LlmService {
    backend: String,
    api_key: String,
    base_url: Option<String>,
}

impl LlmService {
    /// Creates the service for the given backend name (e.g. `openai`).
    pub fn connect(
        config: &AgentConfig,
        backend: &str,
        base_url: Option<&str>,
    ) -> Result<Self, ConfigError> {
        parse_backend(backend)?;
        Ok(Self {
            backend: backend.to_string(),
            api_key: config.credential().to_string(),
            base_url: base_url.map(str::to_string),
        })
    }
}

#[async_trait]
impl CompletionService for LlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ServiceError> {
        let backend = parse_backend(&self.backend)
            .map_err(|e| ServiceError::new(ServiceErrorKind::Rejected, e.to_string()))?;

        let mut builder = LLMBuilder::new()
            .backend(backend)
            .api_key(&self.api_key)
            .model(&request.model)
            .max_tokens(request.max_tokens)
            .temperature(request.temperature);
        if let Some(base_url) = &self.base_url {
            builder = builder.base_url(base_url);
        }
        let llm = builder.build()?;

        let messages: Vec<ChatMessage> = request.turns.iter().map(to_chat_message).collect();
        debug!(
            model = %request.model,
            turns = messages.len(),
            max_tokens = request.max_tokens,
            "Sending completion request"
        );

        let response = llm.chat(&messages).await.map_err(|e| {
            warn!(model = %request.model, "Completion request failed: {}", e);
            ServiceError::from(e)
        })?;

        response
            .text()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(ServiceError::empty)
    }
}

fn parse_backend(name: &str) -> Result<LLMBackend, ConfigError> {
    LLMBackend::from_str(name)
        .map_err(|_| ConfigError::Settings(format!("Unknown backend: {}", name)))
}

fn to_chat_message(turn: &Turn) -> ChatMessage {
    match turn.role {
        Role::User => ChatMessage::user().content(&turn.text).build(),
        Role::Assistant => ChatMessage::assistant().content(&turn.text).build(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_copies_transcript_and_sampling() {
        let transcript = Transcript::from_question("q").with_assistant("a");
        let sampling = Sampling {
            max_tokens: 64,
            temperature: 0.1,
        };

        let request = CompletionRequest::new("gpt-4", &transcript, sampling);

        assert_eq!(request.model, "gpt-4");
        assert_eq!(request.turns.len(), 2);
        assert_eq!(request.max_tokens, 64);
        assert_eq!(request.choices, 1);
        assert_eq!(request.temperature, 0.1);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let config = AgentConfig::new("sk-test", "gpt-4").unwrap();
        let err = LlmService::connect(&config, "no-such-backend", None)
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::Settings(_)));
    }

    #[test]
    fn openai_backend_connects() {
        let config = AgentConfig::new("sk-test", "gpt-4").unwrap();
        assert!(LlmService::connect(&config, "openai", None).is_ok());
    }
}
