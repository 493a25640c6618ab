//! `SemanticReasoner` backed by a chat-completions service

use crate::config::Config;
use crate::error::{Result, Stage, TailorError};
use crate::llm::client::{CompletionBackend, CompletionRequest, ServiceError};
use crate::llm::prompts::{PromptTemplates, SYSTEM_PROMPT};
use crate::llm::usage::{UsageSummary, UsageTracker};
use crate::llm::{
    ExtractionReply, MatchReply, MatchRequest, RankReply, RankRequest, SemanticReasoner,
};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use std::sync::Mutex;
use std::time::Duration;

pub struct LlmReasoner<B: CompletionBackend> {
    backend: B,
    templates: PromptTemplates,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_retries: u32,
    backoff: Duration,
    usage: Mutex<UsageTracker>,
}

impl<B: CompletionBackend> LlmReasoner<B> {
    pub fn new(backend: B, config: &Config) -> Self {
        Self {
            backend,
            templates: PromptTemplates::default(),
            model: config.service.model.clone(),
            temperature: config.service.temperature,
            max_tokens: config.service.max_tokens,
            max_retries: config.service.max_retries,
            backoff: config.retry_backoff(),
            usage: Mutex::new(UsageTracker::new()),
        }
    }

    /// Send one prompt and decode the JSON reply. Transient failures get
    /// `max_retries` more attempts after a fixed backoff; anything else is final.
    async fn call_json<T: DeserializeOwned + Send>(&self, stage: Stage, prompt: String) -> Result<T> {
        let request = CompletionRequest {
            model: self.model.clone(),
            system: SYSTEM_PROMPT.to_string(),
            user: prompt,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut attempts = 0;
        let completion = loop {
            attempts += 1;
            debug!("{}: attempt {}", stage, attempts);

            match self.backend.complete(&request).await {
                Ok(completion) => break completion,
                Err(ServiceError::EmptyContent) => {
                    return Err(TailorError::schema(stage, "response had no content"));
                }
                Err(e) if e.is_transient() && attempts <= self.max_retries => {
                    warn!(
                        "{} attempt {} failed ({}), retrying after {}ms",
                        stage,
                        attempts,
                        e,
                        self.backoff.as_millis()
                    );
                    tokio::time::sleep(self.backoff).await;
                }
                Err(e) => {
                    return Err(TailorError::ExtractionService {
                        stage,
                        attempts,
                        message: e.to_string(),
                    });
                }
            }
        };

        if let Some(usage) = completion.usage {
            if let Ok(mut tracker) = self.usage.lock() {
                let record = tracker.record(stage.as_str(), &completion.model, usage);
                info!(
                    "{}: {} tokens, ~${:.4}",
                    stage,
                    usage.total(),
                    record.cost_usd
                );
            }
        }

        let text = strip_json_fences(&completion.content);
        serde_json::from_str(text).map_err(|e| {
            TailorError::schema(stage, format!("response does not match the schema: {}", e))
        })
    }
}

#[async_trait]
impl<B: CompletionBackend> SemanticReasoner for LlmReasoner<B> {
    fn name(&self) -> &str {
        &self.model
    }

    async fn extract(&self, raw_text: &str) -> Result<ExtractionReply> {
        let prompt = self.templates.render_extraction(raw_text);
        self.call_json(Stage::Extraction, prompt).await
    }

    async fn match_skills(&self, request: &MatchRequest<'_>) -> Result<MatchReply> {
        let prompt = self.templates.render_matching(request);
        self.call_json(Stage::Matching, prompt).await
    }

    async fn rank_projects(&self, request: &RankRequest<'_>) -> Result<RankReply> {
        let prompt = self.templates.render_ranking(request);
        self.call_json(Stage::Selection, prompt).await
    }

    fn usage(&self) -> UsageSummary {
        self.usage
            .lock()
            .map(|tracker| tracker.summary())
            .unwrap_or_default()
    }
}

/// Strips ```json ... ``` or ``` ... ``` fences some models wrap around JSON
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));

    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .strip_suffix("```")
                .map(|s| s.trim())
                .unwrap_or(stripped)
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::Completion;
    use crate::llm::usage::TokenUsage;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Replays canned outcomes in order and counts calls
    struct ScriptedBackend {
        script: Mutex<VecDeque<std::result::Result<Completion, ServiceError>>>,
        calls: AtomicU32,
    }

    impl ScriptedBackend {
        fn new(script: Vec<std::result::Result<Completion, ServiceError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> std::result::Result<Completion, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ServiceError::Transport("script exhausted".to_string())))
        }
    }

    fn ok(content: &str) -> std::result::Result<Completion, ServiceError> {
        Ok(Completion {
            content: content.to_string(),
            model: "gpt-4o".to_string(),
            usage: Some(TokenUsage {
                prompt_tokens: 100,
                completion_tokens: 20,
            }),
        })
    }

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.service.retry_backoff_ms = 0;
        config
    }

    const EXTRACTION_JSON: &str = r#"{"title": "Engineer", "organization": "Acme",
        "location": "Paris", "required_skills": ["Rust"], "preferred_skills": [],
        "responsibilities": ["Ship"], "language": "en"}"#;

    #[tokio::test]
    async fn test_two_timeouts_fail_after_one_retry() {
        let backend = ScriptedBackend::new(vec![
            Err(ServiceError::Timeout),
            Err(ServiceError::Timeout),
            ok(EXTRACTION_JSON),
        ]);
        let reasoner = LlmReasoner::new(backend, &fast_config());

        let err = reasoner.extract("job").await.unwrap_err();
        match err {
            TailorError::ExtractionService {
                stage, attempts, ..
            } => {
                assert_eq!(stage, Stage::Extraction);
                assert_eq!(attempts, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(reasoner.backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_single_timeout_recovers() {
        let backend = ScriptedBackend::new(vec![Err(ServiceError::Timeout), ok(EXTRACTION_JSON)]);
        let reasoner = LlmReasoner::new(backend, &fast_config());

        let reply = reasoner.extract("job").await.unwrap();
        assert_eq!(reply.title.as_deref(), Some("Engineer"));
        assert_eq!(reasoner.usage().calls, 1);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let backend = ScriptedBackend::new(vec![Err(ServiceError::Status {
            status: 401,
            body: "bad key".to_string(),
        })]);
        let reasoner = LlmReasoner::new(backend, &fast_config());

        let err = reasoner.extract("job").await.unwrap_err();
        assert!(matches!(
            err,
            TailorError::ExtractionService { attempts: 1, .. }
        ));
        assert_eq!(reasoner.backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_json_is_schema_violation_without_retry() {
        let backend = ScriptedBackend::new(vec![ok("not json"), ok(EXTRACTION_JSON)]);
        let reasoner = LlmReasoner::new(backend, &fast_config());

        let err = reasoner.extract("job").await.unwrap_err();
        assert!(matches!(err, TailorError::SchemaViolation { .. }));
        assert_eq!(reasoner.backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_retries_configured() {
        let mut config = fast_config();
        config.service.max_retries = 0;
        let backend = ScriptedBackend::new(vec![Err(ServiceError::Timeout), ok(EXTRACTION_JSON)]);
        let reasoner = LlmReasoner::new(backend, &config);

        let err = reasoner.extract("job").await.unwrap_err();
        assert!(matches!(
            err,
            TailorError::ExtractionService { attempts: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_fenced_reply_is_accepted() {
        let fenced = format!("```json\n{}\n```", EXTRACTION_JSON);
        let backend = ScriptedBackend::new(vec![ok(&fenced)]);
        let reasoner = LlmReasoner::new(backend, &fast_config());

        let reply = reasoner.extract("job").await.unwrap();
        assert_eq!(reply.required_skills, Some(vec!["Rust".to_string()]));
    }

    #[test]
    fn test_strip_json_fences() {
        assert_eq!(strip_json_fences("```json\n{\"k\": 1}\n```"), "{\"k\": 1}");
        assert_eq!(strip_json_fences("```\n{\"k\": 1}\n```"), "{\"k\": 1}");
        assert_eq!(strip_json_fences("  {\"k\": 1} "), "{\"k\": 1}");
    }
}
