#![deny(warnings)]
#![deny(unused_imports)]

//! Answer generation against an OpenAI-compatible chat-completions API.
//!
//! Model identity and temperature come from configuration, never from
//! code. An empty completion is `Ok(None)` — the caller treats that as
//! "no answer", not as a failure. Transport errors, timeouts, and
//! malformed responses are `Error::Generation`.

pub mod prompt;

use async_trait::async_trait;
use docqa_core::config::LlmConfig;
use docqa_core::error::{Error, Result};
use docqa_core::traits::AnswerGenerator;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    request_timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Generation(format!("build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    async fn complete(&self, prompt_text: &str) -> Result<Option<String>> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![ChatMessage { role: "user", content: prompt_text }],
        };
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.request_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("chat completion request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Generation(format!(
                "chat completion returned {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("decode chat completion: {e}")))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(content))
    }
}

#[async_trait]
impl AnswerGenerator for ChatClient {
    async fn generate(&self, question: &str, context: &str) -> Result<Option<String>> {
        let prompt_text = prompt::render(question, context);
        tracing::debug!(model = %self.model, question, "invoking language model");
        self.complete(&prompt_text).await
    }
}
