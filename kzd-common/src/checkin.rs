//! Check-in (scan) submission types
//!
//! A check-in is one questionnaire submission: body, heart, environment,
//! breath, reflection and an overall vibe. Field names on the wire are the
//! camelCase names the web client sends.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Response language requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    /// Parse a language tag; anything that is not French is English
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag.trim().split(['-', '_']).next().unwrap_or("");
        if primary.eq_ignore_ascii_case("fr") {
            Language::Fr
        } else {
            Language::En
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }
}

impl From<String> for Language {
    fn from(value: String) -> Self {
        Language::from_tag(&value)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse mood label selected on the scan page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Vibe {
    Hopeful,
    Happy,
    Calm,
    Neutral,
    Thoughtful,
    Sad,
    Stressed,
}

impl Vibe {
    pub const ALL: [Vibe; 7] = [
        Vibe::Hopeful,
        Vibe::Happy,
        Vibe::Calm,
        Vibe::Neutral,
        Vibe::Thoughtful,
        Vibe::Sad,
        Vibe::Stressed,
    ];

    /// Label shown in the vibe selector
    pub fn label(&self) -> &'static str {
        match self {
            Vibe::Hopeful => "Hopeful / Inspired",
            Vibe::Happy => "Happy / Content",
            Vibe::Calm => "Calm / Peaceful",
            Vibe::Neutral => "Neutral / Steady",
            Vibe::Thoughtful => "Thoughtful / Uncertain",
            Vibe::Sad => "Sad / Low",
            Vibe::Stressed => "Stressed / Frustrated",
        }
    }

    /// Resolve a vibe from its full label or any single word of it
    ///
    /// Matching is case-insensitive: "stressed", "Frustrated" and
    /// "Stressed / Frustrated" all resolve to [`Vibe::Stressed`].
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        if wanted.is_empty() {
            return None;
        }

        Self::ALL.into_iter().find(|vibe| {
            let full = vibe.label();
            full.eq_ignore_ascii_case(wanted)
                || full
                    .split('/')
                    .map(str::trim)
                    .any(|word| word.eq_ignore_ascii_case(wanted))
        })
    }
}

impl fmt::Display for Vibe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One check-in submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub heart: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub breath_action: String,
    #[serde(default)]
    pub reflection: String,
    #[serde(default)]
    pub vibe: Option<String>,
    #[serde(default)]
    pub language: Language,
}

impl CheckIn {
    /// Every section except the breathing reflection must be filled in and a
    /// vibe must be selected.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();

        for (name, value) in [
            ("body", &self.body),
            ("heart", &self.heart),
            ("environment", &self.environment),
            ("reflection", &self.reflection),
        ] {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }

        if self.vibe.as_deref().map_or(true, |v| v.trim().is_empty()) {
            missing.push("vibe");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "Please complete all sections (missing: {})",
                missing.join(", ")
            )))
        }
    }

    pub fn parsed_vibe(&self) -> Option<Vibe> {
        self.vibe.as_deref().and_then(Vibe::from_label)
    }
}
