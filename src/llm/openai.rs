use std::io::Read;

use anyhow::{anyhow, Result};
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;

use super::{Answer, AnswerProvider};

const SYSTEM_PROMPT: &str = "You are a Biblical assistant focused on Jehovah's Witness teachings. \
Provide clear answers with scripture references.";

fn extract_text_from_json_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(extract_text_from_json_value)
            .collect::<Vec<_>>()
            .join(""),
        Value::Object(map) => {
            let from_text = map
                .get("text")
                .map(extract_text_from_json_value)
                .unwrap_or_default();
            if !from_text.is_empty() {
                return from_text;
            }
            map.get("content")
                .map(extract_text_from_json_value)
                .unwrap_or_default()
        }
        _ => String::new(),
    }
}

pub fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

pub struct OpenAiCompatibleProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model_name: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        base_url: String,
        api_key: String,
        model_name: String,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            model_name,
            temperature,
            max_tokens,
        }
    }

    pub fn source_label(&self) -> String {
        format!("AI ({})", self.model_name)
    }
}

impl AnswerProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    fn answer(&self, prompt: &str) -> Result<Answer> {
        let url = chat_completions_url(&self.base_url);
        let req = ChatCompletionsRequest {
            model: self.model_name.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .timeout(super::timeouts::remote_answer_timeout())
            .send()?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            return Err(anyhow!(
                "openai-compatible request failed: HTTP {status} {body}"
            ));
        }

        let text = parse_chat_completions_json(resp)?;
        Ok(Answer {
            text,
            sources: vec![self.source_label()],
        })
    }
}

/// Text of `choices[0].message.content`, accepting string or content-part
/// arrays.
pub fn parse_chat_completions_json(reader: impl Read) -> Result<String> {
    let root: Value = serde_json::from_reader(reader)?;

    let mut text = root
        .pointer("/choices/0/message/content")
        .map(extract_text_from_json_value)
        .unwrap_or_default();
    if text.is_empty() {
        text = root
            .pointer("/choices/0/text")
            .map(extract_text_from_json_value)
            .unwrap_or_default();
    }

    if text.trim().is_empty() {
        return Err(anyhow!("openai-compatible response has no text"));
    }
    Ok(text)
}
