//! Insight engine abstraction
//!
//! The orchestrator talks to its primary engine through this trait so the
//! Gemini client can be swapped for a stub in tests.

use async_trait::async_trait;
use kzd_common::{CheckIn, Insight, InsightSource};
use serde::Serialize;

use super::gemini_client::GeminiError;

/// An insight together with the engine that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedInsight {
    pub insight: Insight,
    pub source: InsightSource,
}

#[async_trait]
pub trait InsightEngine: Send + Sync {
    async fn generate(&self, checkin: &CheckIn) -> Result<GeneratedInsight, GeminiError>;
}
