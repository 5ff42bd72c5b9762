//! Aggregates over the check-in history (vibe counts, calendar, streak)

use chrono::{DateTime, Days, NaiveDate};
use kzd_common::Vibe;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::HistoryEntry;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub total: usize,
    /// Check-ins per vibe label
    pub vibe_counts: BTreeMap<String, usize>,
    /// Most frequent vibe; ties go to the alphabetically first label
    pub dominant_vibe: Option<String>,
    /// Check-ins per UTC day (YYYY-MM-DD)
    pub daily_counts: BTreeMap<NaiveDate, usize>,
    /// Consecutive days with a check-in, ending at the latest check-in day
    pub current_streak_days: u32,
    pub fallback_count: usize,
    pub last_checkin: Option<i64>,
}

/// Known vibes are keyed by their canonical label, others by the raw text
fn vibe_key(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    Some(
        Vibe::from_label(raw)
            .map(|vibe| vibe.label().to_string())
            .unwrap_or_else(|| raw.to_string()),
    )
}

fn day_of(timestamp_ms: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(timestamp_ms).map(|dt| dt.date_naive())
}

fn streak_ending_at(days: &BTreeSet<NaiveDate>, last: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = Some(last);
    while let Some(current) = day {
        if !days.contains(&current) {
            break;
        }
        streak += 1;
        day = current.checked_sub_days(Days::new(1));
    }
    streak
}

pub fn summarize(entries: &[HistoryEntry]) -> HistorySummary {
    let mut summary = HistorySummary {
        total: entries.len(),
        ..HistorySummary::default()
    };

    for entry in entries {
        if let Some(key) = vibe_key(entry.checkin.vibe.as_deref()) {
            *summary.vibe_counts.entry(key).or_default() += 1;
        }
        if let Some(day) = day_of(entry.timestamp) {
            *summary.daily_counts.entry(day).or_default() += 1;
        }
        if entry.source.as_ref().is_some_and(|s| s.is_fallback()) {
            summary.fallback_count += 1;
        }
        summary.last_checkin = summary.last_checkin.max(Some(entry.timestamp));
    }

    let mut best: Option<(&String, usize)> = None;
    for (label, count) in &summary.vibe_counts {
        if best.map_or(true, |(_, best_count)| *count > best_count) {
            best = Some((label, *count));
        }
    }
    summary.dominant_vibe = best.map(|(label, _)| label.clone());

    let days: BTreeSet<NaiveDate> = summary.daily_counts.keys().copied().collect();
    if let Some(last) = days.iter().next_back() {
        summary.current_streak_days = streak_ending_at(&days, *last);
    }

    summary
}
