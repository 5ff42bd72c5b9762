//! Google Gemini generateContent client
//!
//! Tries each configured model in order. Within one model, transient failures
//! (429, 5xx gateway errors, connect errors, timeouts) are retried with
//! exponential backoff; anything else either moves on to the next model or,
//! for authentication and malformed-request errors, stops immediately.

use async_trait::async_trait;
use kzd_common::config::GeminiConfig;
use kzd_common::{CheckIn, InsightSource};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::engine::{GeneratedInsight, InsightEngine};
use super::prompt::build_prompt;
use super::response_parser::parse_insight;

const USER_AGENT: &str = concat!("kozendo-insight/", env!("CARGO_PKG_VERSION"));

/// Gemini client errors
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("AI Service configuration missing: no Gemini API key configured")]
    MissingApiKey,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connect(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Gemini API returned an error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from AI Service: {0}")]
    EmptyResponse(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("All {models_tried} models failed, last error: {last}")]
    Exhausted {
        models_tried: usize,
        last: Box<GeminiError>,
    },
}

impl GeminiError {
    /// Worth retrying against the same model
    pub fn is_transient(&self) -> bool {
        match self {
            GeminiError::Connect(_) | GeminiError::Timeout(_) => true,
            GeminiError::Api { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// No other model will fare better
    pub fn is_fatal(&self) -> bool {
        match self {
            GeminiError::MissingApiKey | GeminiError::Config(_) => true,
            GeminiError::Api { status, .. } => matches!(status, 400 | 401 | 403),
            _ => false,
        }
    }

    /// Upstream HTTP status, looking through `Exhausted`
    pub fn status(&self) -> Option<u16> {
        match self {
            GeminiError::Api { status, .. } => Some(*status),
            GeminiError::Exhausted { last, .. } => last.status(),
            _ => None,
        }
    }

    /// Innermost error, looking through `Exhausted`
    pub fn root(&self) -> &GeminiError {
        match self {
            GeminiError::Exhausted { last, .. } => last.root(),
            other => other,
        }
    }

    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            GeminiError::Timeout(error.to_string())
        } else if error.is_connect() {
            GeminiError::Connect(error.to_string())
        } else {
            GeminiError::Http(error.to_string())
        }
    }
}

/// Resolved client settings
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub base_url: String,
    pub models: Vec<String>,
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub temperature: f32,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl GeminiSettings {
    pub fn from_config(config: &GeminiConfig, api_key: String) -> Self {
        Self {
            api_key,
            base_url: config.base_url.clone(),
            models: config.models.clone(),
            max_attempts: config.max_attempts,
            base_backoff: Duration::from_millis(config.base_backoff_ms),
            temperature: config.temperature,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn new(prompt: String, temperature: f32) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config: GenerationConfig { temperature },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Text of the first part of the first candidate
fn extract_text(response: &GenerateContentResponse) -> Option<&str> {
    response
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .first()?
        .text
        .as_deref()
        .filter(|text| !text.trim().is_empty())
}

fn upstream_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
        .unwrap_or_else(|| "Unknown error".to_string())
}

/// Gemini API client with per-model retry and model fallback
pub struct GeminiClient {
    http: reqwest::Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Result<Self, GeminiError> {
        if settings.api_key.trim().is_empty() {
            return Err(GeminiError::MissingApiKey);
        }
        if settings.models.is_empty() {
            return Err(GeminiError::Config("no Gemini models configured".to_string()));
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|e| GeminiError::Config(e.to_string()))?;

        Ok(Self { http, settings })
    }

    /// Delay before retry number `attempt` (1-based): base * 2^(attempt-1)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.settings.base_backoff.saturating_mul(1u32 << exponent)
    }

    /// Generate an insight, walking the model list until one succeeds
    pub async fn generate_insight(&self, checkin: &CheckIn) -> Result<GeneratedInsight, GeminiError> {
        let request_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        let request = GenerateContentRequest::new(build_prompt(checkin), self.settings.temperature);
        let body = serde_json::to_string(&request)
            .map_err(|e| GeminiError::Config(format!("Failed to encode request: {e}")))?;
        debug!(request_id = %request_id, "Gemini request: {}", body);

        let mut last_error = None;
        for (index, model) in self.settings.models.iter().enumerate() {
            match self.generate_with_model(&request_id, model, &body).await {
                Ok(insight) => {
                    info!(
                        request_id = %request_id,
                        model = %model,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        actions = insight.micro_actions.len(),
                        "Generated insight"
                    );
                    return Ok(GeneratedInsight {
                        insight,
                        source: InsightSource::Ai {
                            model: model.clone(),
                        },
                    });
                }
                Err(error) if error.is_fatal() => {
                    warn!(request_id = %request_id, model = %model, error = %error, "Fatal Gemini error");
                    return Err(error);
                }
                Err(error) => {
                    warn!(
                        request_id = %request_id,
                        model = %model,
                        error = %error,
                        remaining_models = self.settings.models.len() - index - 1,
                        "Model failed, trying next model"
                    );
                    last_error = Some(error);
                }
            }
        }

        match last_error {
            Some(last) => Err(GeminiError::Exhausted {
                models_tried: self.settings.models.len(),
                last: Box::new(last),
            }),
            None => Err(GeminiError::Config("no Gemini models configured".to_string())),
        }
    }

    async fn generate_with_model(
        &self,
        request_id: &str,
        model: &str,
        body: &str,
    ) -> Result<kzd_common::Insight, GeminiError> {
        let url = format!(
            "{}/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            model
        );
        let max_attempts = self.settings.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.send_once(&url, body).await {
                Ok(text) => return parse_insight(&text),
                Err(error) if error.is_transient() && attempt < max_attempts => {
                    let backoff = self.backoff_for(attempt);
                    warn!(
                        request_id = %request_id,
                        model = %model,
                        attempt,
                        status = ?error.status(),
                        error = %error,
                        "Transient error, retrying in {:?}...",
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// One POST; returns the reply text of the first candidate
    async fn send_once(&self, url: &str, body: &str) -> Result<String, GeminiError> {
        let response = self
            .http
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.settings.api_key)
            .body(body.to_string())
            .send()
            .await
            .map_err(GeminiError::from_reqwest)?;

        let status = response.status();
        let text = response.text().await.map_err(GeminiError::from_reqwest)?;

        if !status.is_success() {
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message: upstream_message(&text),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| GeminiError::Parse(format!("Failed to parse Gemini response: {e}")))?;

        extract_text(&parsed)
            .map(str::to_string)
            .ok_or_else(|| GeminiError::EmptyResponse("no candidate text in reply".to_string()))
    }
}

#[async_trait]
impl InsightEngine for GeminiClient {
    async fn generate(&self, checkin: &CheckIn) -> Result<GeneratedInsight, GeminiError> {
        self.generate_insight(checkin).await
    }
}
