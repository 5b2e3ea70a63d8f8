use anyhow::{anyhow, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{Answer, AnswerProvider};

pub fn ask_url(base_url: &str) -> String {
    format!("{}/ask", base_url.trim_end_matches('/'))
}

pub fn health_url(base_url: &str) -> String {
    format!("{}/health", base_url.trim_end_matches('/'))
}

#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    answer: String,
    #[serde(default)]
    sources: Vec<String>,
}

/// Companion service on the local network answering `POST /ask`.
pub struct LocalBackendProvider {
    client: Client,
    base_url: String,
}

impl LocalBackendProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn health(&self) -> bool {
        self.client
            .get(health_url(&self.base_url))
            .timeout(super::timeouts::health_check_timeout())
            .send()
            .map(|resp| resp.status().is_success())
            .unwrap_or(false)
    }
}

impl AnswerProvider for LocalBackendProvider {
    fn name(&self) -> &str {
        "local-backend"
    }

    fn answer(&self, prompt: &str) -> Result<Answer> {
        let resp = self
            .client
            .post(ask_url(&self.base_url))
            .json(&AskRequest { question: prompt })
            .timeout(super::timeouts::local_backend_timeout())
            .send()?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            return Err(anyhow!("local backend request failed: HTTP {status} {body}"));
        }

        let body = resp.text().unwrap_or_default();
        let parsed: AskResponse =
            serde_json::from_str(&body).map_err(|e| anyhow!("invalid local backend json: {e}"))?;
        Ok(Answer {
            text: parsed.answer,
            sources: parsed.sources,
        })
    }
}
