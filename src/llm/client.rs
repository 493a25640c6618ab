//! Chat-completions transport

use crate::config::{Config, Credentials};
use crate::error::{Result, TailorError};
use crate::llm::usage::TokenUsage;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transport-level failure, classified for the retry decision
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request timed out")]
    Timeout,

    #[error("could not connect: {0}")]
    Connect(String),

    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("service returned no message content")]
    EmptyContent,
}

impl ServiceError {
    /// Timeouts, refused connections, 408, 429 and 5xx are worth one more try
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Timeout | ServiceError::Connect(_) => true,
            ServiceError::Status { status, .. } => {
                *status == 408 || *status == 429 || (500..600).contains(status)
            }
            ServiceError::Transport(_) | ServiceError::EmptyContent => false,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout
        } else if err.is_connect() {
            ServiceError::Connect(err.to_string())
        } else if let Some(status) = err.status() {
            ServiceError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

/// One request, one response. Retries are the caller's business.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<Completion, ServiceError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// OpenAI-compatible `/chat/completions` endpoint over HTTPS
pub struct HttpBackend {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpBackend {
    pub fn new(config: &Config, credentials: &Credentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                TailorError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/chat/completions",
                config.service.base_url.trim_end_matches('/')
            ),
            api_key: credentials.api_key.clone(),
        })
    }
}

#[async_trait]
impl CompletionBackend for HttpBackend {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<Completion, ServiceError> {
        let body = ChatRequest {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ServiceError::EmptyContent)?;

        let usage = chat.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        });
        debug!("Completion received: {} chars, usage {:?}", content.len(), usage);

        Ok(Completion {
            content,
            model: chat.model.unwrap_or_else(|| request.model.clone()),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ServiceError::Timeout.is_transient());
        assert!(ServiceError::Connect("refused".to_string()).is_transient());
        for status in [408, 429, 500, 503] {
            assert!(ServiceError::Status {
                status,
                body: String::new()
            }
            .is_transient());
        }
        for status in [400, 401, 404] {
            assert!(!ServiceError::Status {
                status,
                body: String::new()
            }
            .is_transient());
        }
        assert!(!ServiceError::EmptyContent.is_transient());
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let mut config = Config::default();
        config.service.base_url = "http://localhost:8080/v1/".to_string();
        let backend = HttpBackend::new(
            &config,
            &Credentials {
                api_key: "k".to_string(),
            },
        )
        .unwrap();
        assert_eq!(backend.endpoint, "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_parse_chat_response() {
        let raw = r#"{
            "model": "gpt-4o-2024-08-06",
            "choices": [{"message": {"role": "assistant", "content": "{\"a\":1}"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let chat: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(chat.usage.unwrap().completion_tokens, 5);
        assert_eq!(
            chat.choices[0].message.content.as_deref(),
            Some("{\"a\":1}")
        );
    }
}
