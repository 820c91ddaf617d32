use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub mod markdown;
pub mod prompts;

use crate::config::LLMConfig;
use crate::error::{StudioError, StudioResult};
use crate::keywords::KeywordMetric;

/// Judges the SEO value of ranked keywords for a product
#[async_trait]
pub trait RelevanceClassifier: Send + Sync {
    /// Return a markdown table categorizing `keywords` for `product_title`
    async fn classify(&self, keywords: &[KeywordMetric], product_title: &str) -> StudioResult<String>;
}

/// Classifier backed by an OpenAI-compatible chat completions endpoint
pub struct OpenAiClassifier {
    client: Client,
    config: LLMConfig,
    keyword_limit: usize,
}

impl OpenAiClassifier {
    /// Create new classifier sending at most `keyword_limit` keywords per
    /// request
    pub fn new(config: &LLMConfig, keyword_limit: usize) -> StudioResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| StudioError::config(format!("failed to build LLM HTTP client: {}", e)))?;

        info!("LLM classifier initialized (model {})", config.model);
        Ok(Self {
            client,
            config: config.clone(),
            keyword_limit,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }

    fn headers(&self) -> StudioResult<HeaderMap> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| StudioError::classification("OpenAI API key is not configured"))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|_| StudioError::classification("invalid OpenAI API key"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl RelevanceClassifier for OpenAiClassifier {
    async fn classify(&self, keywords: &[KeywordMetric], product_title: &str) -> StudioResult<String> {
        let headers = self.headers()?;
        let context = prompts::build_keyword_context(keywords, self.keyword_limit);
        let prompt = prompts::build_classification_prompt(product_title, &context);

        let body = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompts::SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        debug!(
            "Requesting classification of {} keywords for '{}'",
            keywords.len().min(self.keyword_limit),
            product_title
        );

        let response = self
            .client
            .post(self.endpoint())
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| StudioError::classification(format!("failed to call chat completions: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(StudioError::classification(format!("OpenAI returned {}: {}", status, text)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| StudioError::classification(format!("failed to parse OpenAI response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| StudioError::classification("OpenAI response contained no choices"))?;

        info!("Classification completed ({} chars)", content.len());
        Ok(content)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: usize,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
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
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: String,
}
