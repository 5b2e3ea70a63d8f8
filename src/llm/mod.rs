//! Answer providers for the chat assistant and the fallback chain that
//! always produces something to show.

use anyhow::Result;
use tracing::{debug, warn};

pub mod local_backend;
pub mod offline;
pub mod openai;
pub mod timeouts;

#[derive(Clone, Debug, PartialEq)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<String>,
}

pub trait AnswerProvider: Send + Sync {
    fn name(&self) -> &str;
    fn answer(&self, prompt: &str) -> Result<Answer>;
}

/// Tries each provider in order and falls back to the offline responder.
/// Never fails.
pub struct FallbackChain {
    providers: Vec<Box<dyn AnswerProvider>>,
    offline: offline::OfflineResponder,
}

impl FallbackChain {
    pub fn new(providers: Vec<Box<dyn AnswerProvider>>) -> Self {
        Self {
            providers,
            offline: offline::OfflineResponder,
        }
    }

    pub fn offline_only() -> Self {
        Self::new(Vec::new())
    }

    /// Remote provider only when an API key is configured, then the local
    /// backend.
    pub fn from_config(cfg: &crate::config::AppConfig) -> Self {
        let mut providers: Vec<Box<dyn AnswerProvider>> = Vec::new();
        if let Some(api_key) = cfg.llm.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            providers.push(Box::new(openai::OpenAiCompatibleProvider::new(
                cfg.llm.base_url.clone(),
                api_key.to_string(),
                cfg.llm.model.clone(),
                Some(cfg.llm.temperature),
                Some(cfg.llm.max_tokens),
            )));
        }
        providers.push(Box::new(local_backend::LocalBackendProvider::new(
            cfg.local_backend_url.clone(),
        )));
        Self::new(providers)
    }

    pub fn answer(&self, prompt: &str) -> Answer {
        for provider in &self.providers {
            match provider.answer(prompt) {
                Ok(answer) => {
                    debug!(provider = provider.name(), "answer received");
                    return answer;
                }
                Err(err) => warn!(provider = provider.name(), "provider failed, falling back: {err:#}"),
            }
        }
        self.offline.answer_for(prompt)
    }
}
