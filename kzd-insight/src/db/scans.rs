//! Check-in history persistence (`scans` table)

use chrono::Utc;
use kzd_common::{CheckIn, Error, Insight, InsightSource, Language, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{HistoryEntry, NewEntry};

const SELECT_COLUMNS: &str = r#"
    SELECT id, timestamp, body, heart, environment, breath_action,
           reflection, vibe, language, insight, source
    FROM scans
"#;

fn to_json<T: serde::Serialize>(value: Option<&T>, what: &str) -> Result<Option<String>> {
    value
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to serialize {}: {}", what, e)))
}

fn from_json<T: serde::de::DeserializeOwned>(raw: Option<String>, what: &str) -> Result<Option<T>> {
    raw.map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to deserialize {}: {}", what, e)))
}

fn entry_from_row(row: &SqliteRow) -> Result<HistoryEntry> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("Invalid scan id '{}': {}", id, e)))?;

    let language: String = row.get("language");
    let insight: Option<Insight> = from_json(row.get("insight"), "insight")?;
    let source: Option<InsightSource> = from_json(row.get("source"), "source")?;

    Ok(HistoryEntry {
        id,
        timestamp: row.get("timestamp"),
        checkin: CheckIn {
            body: row.get("body"),
            heart: row.get("heart"),
            environment: row.get("environment"),
            breath_action: row.get("breath_action"),
            reflection: row.get("reflection"),
            vibe: row.get("vibe"),
            language: Language::from_tag(&language),
        },
        insight,
        source,
    })
}

async fn insert_entry<'e, E>(executor: E, entry: &HistoryEntry, ignore_existing: bool) -> Result<u64>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let insight = to_json(entry.insight.as_ref(), "insight")?;
    let source = to_json(entry.source.as_ref(), "source")?;
    let verb = if ignore_existing {
        "INSERT OR IGNORE"
    } else {
        "INSERT"
    };

    let result = sqlx::query(&format!(
        r#"
        {verb} INTO scans (
            id, timestamp, body, heart, environment, breath_action,
            reflection, vibe, language, insight, source
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#
    ))
    .bind(entry.id.to_string())
    .bind(entry.timestamp)
    .bind(&entry.checkin.body)
    .bind(&entry.checkin.heart)
    .bind(&entry.checkin.environment)
    .bind(&entry.checkin.breath_action)
    .bind(&entry.checkin.reflection)
    .bind(&entry.checkin.vibe)
    .bind(entry.checkin.language.as_str())
    .bind(insight)
    .bind(source)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Save a new check-in; assigns a fresh id and the current timestamp
pub async fn save_entry(pool: &SqlitePool, new_entry: NewEntry) -> Result<HistoryEntry> {
    let entry = HistoryEntry {
        id: Uuid::new_v4(),
        timestamp: Utc::now().timestamp_millis(),
        checkin: new_entry.checkin,
        insight: new_entry.insight,
        source: new_entry.source,
    };

    insert_entry(pool, &entry, false).await?;
    Ok(entry)
}

/// Newest first. Entries saved within the same millisecond keep insertion order reversed.
pub async fn list_entries(pool: &SqlitePool, limit: Option<u32>) -> Result<Vec<HistoryEntry>> {
    // SQLite treats a negative LIMIT as unbounded
    let limit = limit.map(i64::from).unwrap_or(-1);

    let rows = sqlx::query(&format!(
        "{SELECT_COLUMNS} ORDER BY timestamp DESC, rowid DESC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(entry_from_row).collect()
}

pub async fn get_entry(pool: &SqlitePool, id: Uuid) -> Result<Option<HistoryEntry>> {
    let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(entry_from_row).transpose()
}

/// Returns false when no entry had this id
pub async fn delete_entry(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM scans WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete every entry, returning how many were removed
pub async fn clear_history(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM scans").execute(pool).await?;
    Ok(result.rows_affected())
}

/// Works on a pool or inside a transaction
pub async fn count_entries<'e, E>(executor: E) -> Result<i64>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scans")
        .fetch_one(executor)
        .await?;
    Ok(count)
}

/// One-time migration of entries exported from browser local storage
///
/// Only runs against an empty history; otherwise nothing is imported. Entries
/// whose id already exists are skipped. Returns the number of rows inserted.
pub async fn import_legacy(pool: &SqlitePool, entries: &[HistoryEntry]) -> Result<u64> {
    if entries.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;

    let existing = count_entries(&mut *tx).await?;
    if existing > 0 {
        tracing::info!(existing, "History already populated, skipping legacy import");
        return Ok(0);
    }

    let mut imported = 0;
    for entry in entries {
        imported += insert_entry(&mut *tx, entry, true).await?;
    }

    tx.commit().await?;

    tracing::info!(imported, offered = entries.len(), "Imported legacy history");
    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kzd_common::db::init_memory_database;

    fn checkin(reflection: &str) -> CheckIn {
        CheckIn {
            body: "tense shoulders".to_string(),
            heart: "restless".to_string(),
            environment: "office".to_string(),
            breath_action: "box breathing".to_string(),
            reflection: reflection.to_string(),
            vibe: Some("Stressed / Frustrated".to_string()),
            language: Language::Fr,
        }
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let pool = init_memory_database().await.unwrap();
        let saved = save_entry(
            &pool,
            NewEntry {
                checkin: checkin("deadline"),
                insight: None,
                source: Some(InsightSource::Ai {
                    model: "gemini-2.5-flash".to_string(),
                }),
            },
        )
        .await
        .unwrap();

        let loaded = get_entry(&pool, saved.id).await.unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.checkin.language, Language::Fr);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let pool = init_memory_database().await.unwrap();
        assert!(get_entry(&pool, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first_with_limit() {
        let pool = init_memory_database().await.unwrap();
        for n in 0..3 {
            save_entry(
                &pool,
                NewEntry {
                    checkin: checkin(&format!("entry {n}")),
                    ..NewEntry::default()
                },
            )
            .await
            .unwrap();
        }

        let all = list_entries(&pool, None).await.unwrap();
        let reflections: Vec<&str> = all.iter().map(|e| e.checkin.reflection.as_str()).collect();
        assert_eq!(reflections, vec!["entry 2", "entry 1", "entry 0"]);

        let limited = list_entries(&pool, Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].checkin.reflection, "entry 2");
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let pool = init_memory_database().await.unwrap();
        let first = save_entry(&pool, NewEntry::default()).await.unwrap();
        save_entry(&pool, NewEntry::default()).await.unwrap();

        assert!(delete_entry(&pool, first.id).await.unwrap());
        assert!(!delete_entry(&pool, first.id).await.unwrap());
        assert_eq!(count_entries(&pool).await.unwrap(), 1);

        assert_eq!(clear_history(&pool).await.unwrap(), 1);
        assert_eq!(count_entries(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_import_legacy_only_into_empty_history() {
        let pool = init_memory_database().await.unwrap();
        let legacy = HistoryEntry {
            id: Uuid::new_v4(),
            timestamp: 1_735_689_600_000,
            checkin: checkin("old"),
            insight: None,
            source: None,
        };

        let imported = import_legacy(&pool, &[legacy.clone(), legacy.clone()])
            .await
            .unwrap();
        assert_eq!(imported, 1);
        assert_eq!(get_entry(&pool, legacy.id).await.unwrap(), Some(legacy.clone()));

        let again = HistoryEntry {
            id: Uuid::new_v4(),
            ..legacy
        };
        assert_eq!(import_legacy(&pool, &[again]).await.unwrap(), 0);
        assert_eq!(count_entries(&pool).await.unwrap(), 1);
    }
}
