//! Insight types returned to the client

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum micro-actions shown with one insight
pub const MAX_MICRO_ACTIONS: usize = 3;

/// A short suggested wellness exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroAction {
    #[serde(default)]
    pub id: u32,
    pub text: String,
    #[serde(default)]
    pub instruction: String,
    #[serde(default)]
    pub icon: String,
}

impl MicroAction {
    pub fn new(id: u32, text: &str, instruction: &str, icon: &str) -> Self {
        Self {
            id,
            text: text.to_string(),
            instruction: instruction.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// Optional activity suggestion attached to an insight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedActivity {
    pub title: String,
    pub duration: String,
    #[serde(default)]
    pub image: String,
}

/// Feedback generated for one check-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub main_insight: String,
    #[serde(default)]
    pub micro_actions: Vec<MicroAction>,
    #[serde(default)]
    pub uplifting_quote: String,
    /// Diagnostic explaining why the fallback content was used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_activity: Option<RecommendedActivity>,
}

impl Insight {
    /// An insight without narrative text is not worth showing
    pub fn is_usable(&self) -> bool {
        !self.main_insight.trim().is_empty()
    }

    /// Cap the micro-actions and renumber them 1..=n
    pub fn normalize(mut self) -> Self {
        self.micro_actions.truncate(MAX_MICRO_ACTIONS);
        for (index, action) in self.micro_actions.iter_mut().enumerate() {
            action.id = index as u32 + 1;
        }
        self.main_insight = self.main_insight.trim().to_string();
        self.uplifting_quote = self.uplifting_quote.trim().to_string();
        self
    }
}

/// Where an insight came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InsightSource {
    Ai { model: String },
    Fallback,
}

impl InsightSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, InsightSource::Fallback)
    }
}

impl fmt::Display for InsightSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsightSource::Ai { model } => write!(f, "ai:{model}"),
            InsightSource::Fallback => f.write_str("fallback"),
        }
    }
}
