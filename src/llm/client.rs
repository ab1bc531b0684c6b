//! HTTP client for the two generation backends
//!
//! Shapes one request per provider, sends it with an explicit timeout, and
//! digs the generated text out of the respective response format. Nothing is
//! written to disk here; a payload that doesn't match the expected shape
//! fails with [`ApiError`] before any caller can persist it.

use crate::config::Config;
use crate::llm::models::{
    GenerationParams, HF_INFERENCE_BASE, OPENROUTER_URL, REQUEST_TIMEOUT_SECS,
};
use crate::llm::{prompts, Provider};
use crate::util::truncate;
use crate::workflow::CodeFixer;
use anyhow::Context;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Error surface of a generation call.
#[derive(Debug)]
pub enum ApiError {
    /// Connection-level failure
    Network(String),
    /// The request exceeded its wall-clock bound
    Timeout,
    /// Remote returned a non-success status
    Status { status: u16, message: String },
    /// Response body didn't match the expected shape
    Payload(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(e) => write!(f, "Network error: {}", e),
            Self::Timeout => write!(
                f,
                "Request timed out after {}s",
                REQUEST_TIMEOUT_SECS
            ),
            Self::Status { status, message } => {
                write!(f, "API error ({}): {}", status, message)
            }
            Self::Payload(e) => write!(f, "Unexpected response format: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

/// A generation prompt: a system framing plus the user request. The
/// HuggingFace path folds both into one text; OpenRouter sends them as a
/// chat message list.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: &'static str,
    pub user: String,
}

pub struct ProviderClient {
    http: Client,
    provider: Provider,
    api_key: String,
    model: String,
    params: GenerationParams,
}

impl ProviderClient {
    pub fn new(provider: Provider, api_key: String, model: String) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            provider,
            api_key,
            model,
            params: GenerationParams::default(),
        }
    }

    /// Build a client for the configured provider. Fails when no provider is
    /// selected or its API key is empty; the REPL prompts for both before
    /// calling this on a user's behalf.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = config
            .provider
            .context("No provider selected. Use 'provider hf' or 'provider or'.")?;
        let api_key = config.api_key(provider);
        anyhow::ensure!(
            !api_key.is_empty(),
            "{} API key not set. Use 'config {} <key>'.",
            provider.label(),
            provider.token()
        );
        Ok(Self::new(
            provider,
            api_key.to_string(),
            config.model(provider).to_string(),
        ))
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one prompt, return the generated text.
    pub async fn generate(&self, prompt: &Prompt) -> Result<String, ApiError> {
        match self.provider {
            Provider::HuggingFace => self.generate_hf(prompt).await,
            Provider::OpenRouter => self.generate_openrouter(prompt).await,
        }
    }

    async fn generate_hf(&self, prompt: &Prompt) -> Result<String, ApiError> {
        let url = format!("{}/{}", HF_INFERENCE_BASE, self.model);
        let request = HfRequest {
            inputs: format!("{}\n\n{}", prompt.system, prompt.user),
            parameters: HfParameters {
                max_new_tokens: self.params.max_tokens,
                temperature: self.params.temperature,
                top_p: self.params.top_p,
                return_full_text: false,
            },
        };

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_send_error)?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: truncate(&text, 200),
            });
        }

        first_generated_text(&text)
    }

    async fn generate_openrouter(&self, prompt: &Prompt) -> Result<String, ApiError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: prompt.system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: prompt.user.clone(),
                },
            ],
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
            stream: false,
        };

        let response = self
            .http
            .post(OPENROUTER_URL)
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", "https://ailang.interpreter")
            .header("X-Title", "ailang")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_send_error)?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: truncate(&text, 200),
            });
        }

        first_choice_content(&text)
    }
}

impl CodeFixer for ProviderClient {
    async fn fix(&mut self, diagnostics: &str, source: &str) -> anyhow::Result<String> {
        let prompt = prompts::debug_prompt(diagnostics, source);
        Ok(self.generate(&prompt).await?)
    }
}

fn map_send_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(err.to_string())
    }
}

// ============================================================================
// Wire formats
// ============================================================================

#[derive(Serialize)]
struct HfRequest {
    inputs: String,
    parameters: HfParameters,
}

#[derive(Serialize)]
struct HfParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
    return_full_text: bool,
}

#[derive(Deserialize)]
struct HfGeneration {
    generated_text: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

/// HuggingFace returns a list; the first element's `generated_text` is the
/// completion.
fn first_generated_text(body: &str) -> Result<String, ApiError> {
    let generations: Vec<HfGeneration> =
        serde_json::from_str(body).map_err(|e| ApiError::Payload(e.to_string()))?;
    generations
        .into_iter()
        .next()
        .map(|g| g.generated_text)
        .ok_or_else(|| ApiError::Payload("empty generation list".to_string()))
}

/// OpenRouter follows the chat-completions shape; the first choice's message
/// content is the completion.
fn first_choice_content(body: &str) -> Result<String, ApiError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| ApiError::Payload(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| ApiError::Payload("no choices in response".to_string()))
}
