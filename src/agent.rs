//! Generation service client for drafting discharge summaries.
//!
//! Talks to an OpenAI-compatible chat completions endpoint (Groq by default).
//! One request, one response, no streaming and no retries.

use crate::config::{AgentConfig, Config};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// User-Agent string identifying this client
const USER_AGENT: &str = concat!("dischargen/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("LLM service returned {status}: {message}")]
    ServiceError {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("LLM response contained no summary text")]
    EmptyResponse,
    #[error("configuration error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),
}

/// Anything that can turn a prompt into a draft summary.
pub trait SummaryClient {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, AgentError>> + Send;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
    stop: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Error body shape shared by OpenAI-compatible services
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Chat completions client with fixed decoding parameters
#[derive(Clone)]
pub struct ChatCompletionClient {
    http: reqwest::Client,
    api_key: String,
    settings: AgentConfig,
}

impl ChatCompletionClient {
    pub fn new(api_key: impl Into<String>, settings: AgentConfig) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            settings,
        })
    }

    /// Build a client from the loaded configuration, failing if no key is set
    pub fn from_config(config: &Config) -> Result<Self, AgentError> {
        let api_key = config.api_key()?;
        Self::new(api_key, config.agent.clone())
    }

    fn request_body<'a>(&'a self, prompt: &str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            top_p: self.settings.top_p,
            stream: false,
            stop: None,
        }
    }
}

impl SummaryClient for ChatCompletionClient {
    async fn generate(&self, prompt: &str) -> Result<String, AgentError> {
        info!(
            provider = %self.settings.provider,
            model = %self.settings.model,
            "requesting discharge summary draft"
        );
        debug!(prompt_chars = prompt.len(), "prompt built");

        let response = self
            .http
            .post(&self.settings.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(AgentError::ServiceError { status, message });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let draft = extract_draft(completion)?;
        debug!(draft_chars = draft.len(), "draft received");
        Ok(draft)
    }
}

/// Pull the first choice's text out of a completion
fn extract_draft(completion: ChatCompletionResponse) -> Result<String, AgentError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(AgentError::EmptyResponse)
}
