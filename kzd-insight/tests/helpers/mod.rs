//! Test Helper Utilities
//!
//! Shared utilities for testing kzd-insight

#![allow(dead_code)]

pub mod mock_gemini;

pub use mock_gemini::{candidate_reply, error_reply, MockGemini, INSIGHT_JSON};

use kzd_common::{CheckIn, Language};
use kzd_insight::services::GeminiSettings;
use std::time::Duration;

/// A complete check-in that passes validation
pub fn sample_checkin() -> CheckIn {
    CheckIn {
        body: "Tight shoulders, a bit tired".to_string(),
        heart: "Anxious about tomorrow".to_string(),
        environment: "Noisy open-plan office".to_string(),
        breath_action: "Three slow breaths".to_string(),
        reflection: "Too many meetings today".to_string(),
        vibe: Some("Stressed / Frustrated".to_string()),
        language: Language::En,
    }
}

/// Client settings pointed at a mock server, with short backoff
pub fn mock_settings(base_url: &str, models: &[&str]) -> GeminiSettings {
    GeminiSettings {
        api_key: "test-key".to_string(),
        base_url: base_url.to_string(),
        models: models.iter().map(|m| m.to_string()).collect(),
        max_attempts: 3,
        base_backoff: Duration::from_millis(10),
        temperature: 0.7,
        request_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
    }
}
