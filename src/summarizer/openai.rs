//! OpenAI-compatible Chat Completions summarizer.
//!
//! Sends one non-streaming `/v1/chat/completions` request per summary.
//! Works with any server that speaks the same API (OpenAI, Azure-style
//! proxies, local inference servers).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::SummaryConfig;
use crate::error::{NewswireError, Result};

use super::{Summarizer, build_prompt, prepare_content};

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Summarizer backed by an OpenAI-compatible chat endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiSummarizer {
    client: reqwest::Client,
    config: SummaryConfig,
    api_key: Option<String>,
}

impl OpenAiSummarizer {
    /// Build from config, resolving the API key from config or environment.
    ///
    /// # Errors
    ///
    /// Returns [`NewswireError::Config`] if the config is invalid or a
    /// required API key is missing.
    pub fn new(config: SummaryConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        Self::with_api_key(config, api_key)
    }

    /// Build with an explicit key (`None` sends no `Authorization` header).
    ///
    /// # Errors
    ///
    /// Returns [`NewswireError::Config`] if the config is invalid or the
    /// HTTP client cannot be built.
    pub fn with_api_key(config: SummaryConfig, api_key: Option<String>) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| NewswireError::Config(format!("failed to build HTTP client: {e}")))?;
        tracing::info!(provider = %config.provider, model = %config.model, "summarizer ready");
        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "stream": false,
        })
    }

    /// Send one completion request and return the trimmed reply.
    ///
    /// # Errors
    ///
    /// Returns [`NewswireError::Summarization`] on transport failure, a
    /// non-2xx status, an unparseable body or an empty reply.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let mut request = self.client.post(self.endpoint()).json(&self.request_body(prompt));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response: ChatResponse = request
            .send()
            .await
            .map_err(|e| NewswireError::Summarization(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| NewswireError::Summarization(format!("provider error: {e}")))?
            .json()
            .await
            .map_err(|e| NewswireError::Summarization(format!("invalid response: {e}")))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| NewswireError::Summarization("empty response from model".into()))
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(
        &self,
        content: &str,
        title: Option<&str>,
        url: Option<&str>,
    ) -> Option<String> {
        let Some(content) = prepare_content(content, self.config.max_content_length) else {
            tracing::warn!("empty content provided for summarization");
            return None;
        };

        let prompt = build_prompt(self.config.length, &content, title, url);
        match self.complete(&prompt).await {
            Ok(summary) => Some(summary),
            Err(err) => {
                tracing::warn!(error = %err, url = url.unwrap_or_default(), "summarization failed");
                None
            }
        }
    }
}
