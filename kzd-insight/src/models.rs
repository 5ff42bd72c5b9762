//! Check-in history records

use kzd_common::{CheckIn, Insight, InsightSource};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A stored check-in with the insight it received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    #[serde(flatten)]
    pub checkin: CheckIn,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "insight_or_text"
    )]
    pub insight: Option<Insight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<InsightSource>,
}

/// Older web client exports kept only the insight's narrative text
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredInsight {
    Full(Insight),
    Text(String),
}

fn insight_or_text<'de, D>(deserializer: D) -> Result<Option<Insight>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = Option::<StoredInsight>::deserialize(deserializer)?;
    Ok(match stored {
        Some(StoredInsight::Full(insight)) => Some(insight),
        Some(StoredInsight::Text(text)) if !text.trim().is_empty() => Some(Insight {
            main_insight: text.trim().to_string(),
            micro_actions: Vec::new(),
            uplifting_quote: String::new(),
            debug_error: None,
            recommended_activity: None,
        }),
        _ => None,
    })
}

/// Data for a new history entry; id and timestamp are assigned on save
#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    pub checkin: CheckIn,
    pub insight: Option<Insight>,
    pub source: Option<InsightSource>,
}
