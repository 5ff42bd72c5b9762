//! Insight orchestration: primary AI engine with local fallback

use kzd_common::config::GeminiConfig;
use kzd_common::{CheckIn, InsightSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::engine::{GeneratedInsight, InsightEngine};
use super::fallback::FallbackGenerator;
use super::gemini_client::{GeminiClient, GeminiError, GeminiSettings};

pub struct InsightGenerator {
    primary: Option<Arc<dyn InsightEngine>>,
    fallback: FallbackGenerator,
    fallback_delay: Duration,
}

impl InsightGenerator {
    pub fn new(primary: Option<Arc<dyn InsightEngine>>, fallback_delay: Duration) -> Self {
        Self {
            primary,
            fallback: FallbackGenerator::new(),
            fallback_delay,
        }
    }

    /// Build from configuration; without a usable key only the fallback runs
    pub fn from_config(config: &GeminiConfig, api_key: Option<String>) -> Self {
        let fallback_delay = Duration::from_millis(config.fallback_delay_ms);

        let primary: Option<Arc<dyn InsightEngine>> = match api_key {
            Some(key) => match GeminiClient::new(GeminiSettings::from_config(config, key)) {
                Ok(client) => {
                    info!(models = ?config.models, "Gemini insight engine ready");
                    Some(Arc::new(client) as Arc<dyn InsightEngine>)
                }
                Err(error) => {
                    warn!("failed to init Gemini client: {error}");
                    None
                }
            },
            None => {
                warn!("No Gemini API key configured; insights will use fallback content");
                None
            }
        };

        Self::new(primary, fallback_delay)
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Primary engine only; failures are returned to the caller
    pub async fn generate_strict(&self, checkin: &CheckIn) -> Result<GeneratedInsight, GeminiError> {
        match &self.primary {
            Some(engine) => engine.generate(checkin).await,
            None => Err(GeminiError::MissingApiKey),
        }
    }

    /// Always produces an insight, substituting fallback content on failure
    pub async fn generate(&self, checkin: &CheckIn) -> GeneratedInsight {
        let error = match self.generate_strict(checkin).await {
            Ok(generated) => return generated,
            Err(error) => error,
        };

        warn!(
            error = %error,
            vibe = ?checkin.parsed_vibe(),
            language = %checkin.language,
            "AI insight unavailable, using fallback content"
        );

        if !self.fallback_delay.is_zero() {
            tokio::time::sleep(self.fallback_delay).await;
        }

        GeneratedInsight {
            insight: self.fallback.generate(checkin, Some(error.to_string())),
            source: InsightSource::Fallback,
        }
    }
}
