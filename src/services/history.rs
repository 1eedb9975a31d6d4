//! The persisted log of past generations and its list projection.

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use serde_json::Value;
use std::fmt;

use crate::core::model::{GenerationOptions, HistoryEntry};
use crate::core::state::PersistentState;

const TITLE_MAX_CHARS: usize = 30;

/// Append-only history log. The whole log is read and rewritten on every
/// mutation, which is fine for single-user sizes.
#[derive(Clone)]
pub struct HistoryStore {
    state: PersistentState,
}

impl HistoryStore {
    pub fn new(state: PersistentState) -> Self {
        Self { state }
    }

    /// Returns the log in chronological order. A missing or unreadable log is
    /// empty, and entries that no longer decode are skipped.
    pub async fn load_all(&self) -> Vec<HistoryEntry> {
        match self.read_raw().await {
            Ok(raw) => raw.into_iter().filter_map(decode_entry).collect(),
            Err(e) => {
                log::warn!("Failed to read history: {:#}", e);
                Vec::new()
            }
        }
    }

    /// Appends to the stored log as-is, so entries this build cannot decode
    /// are carried over untouched.
    pub async fn append(
        &self,
        idea: &str,
        options: &GenerationOptions,
        pitch: &str,
    ) -> Result<HistoryEntry> {
        let mut raw = self.read_raw().await?;
        let entry = HistoryEntry::new(idea, options.clone(), pitch, Utc::now());
        raw.push(serde_json::to_value(&entry).context("Failed to serialize history entry")?);

        let serialized = serde_json::to_string(&raw).context("Failed to serialize history")?;
        self.state.write_history(&serialized).await?;

        log::debug!("Saved history entry {} ({} total)", entry.id, raw.len());
        Ok(entry)
    }

    /// Storage errors propagate; a value that is not a JSON array reads as empty.
    async fn read_raw(&self) -> Result<Vec<Value>> {
        let Some(raw) = self.state.read_history().await? else {
            return Ok(Vec::new());
        };

        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::debug!("Discarding unparsable history: {}", e);
            Vec::new()
        }))
    }

    pub async fn find(&self, id: i64) -> Option<HistoryEntry> {
        self.load_all().await.into_iter().find(|e| e.id == id)
    }

    /// Erases the whole log. Callers are responsible for confirming first.
    pub async fn clear(&self) -> Result<()> {
        self.state.remove_history().await
    }
}

fn decode_entry(value: Value) -> Option<HistoryEntry> {
    serde_json::from_value(value)
        .map_err(|e| log::debug!("Skipping unreadable history entry: {}", e))
        .ok()
}

/// One row of the history panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryListItem {
    pub id: i64,
    pub title: String,
    pub date: String,
}

impl HistoryListItem {
    pub fn from_entry(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id,
            title: history_title(&entry.idea),
            date: entry
                .timestamp
                .with_timezone(&Local)
                .format("%-m/%-d/%Y, %-I:%M:%S %p")
                .to_string(),
        }
    }
}

impl fmt::Display for HistoryListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.date)
    }
}

/// Newest first.
pub fn project(entries: &[HistoryEntry]) -> Vec<HistoryListItem> {
    entries.iter().rev().map(HistoryListItem::from_entry).collect()
}

/// First line of the idea, cut to 30 characters. The ellipsis is only added
/// when something was actually cut.
pub fn history_title(idea: &str) -> String {
    let first_line = idea.lines().next().unwrap_or("");
    let mut chars = first_line.chars();
    let title: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", title)
    } else {
        title
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::core::io::{NativeStorage, Storage};
    use crate::core::model::Section;
    use crate::core::state::HISTORY_KEY;
    use std::sync::Arc;

    fn store_in(dir: &std::path::Path) -> (HistoryStore, Arc<NativeStorage>) {
        let storage = Arc::new(NativeStorage::new(dir));
        let state = PersistentState::new(storage.clone());
        (HistoryStore::new(state), storage)
    }

    fn fridge_options() -> GenerationOptions {
        GenerationOptions {
            tone: "Witty".to_string(),
            audience: "Customers".to_string(),
            sections: [Section::ElevatorPitch, Section::Tagline].into_iter().collect(),
        }
    }

    #[tokio::test]
    async fn test_append_then_load_returns_entry_last() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let (store, _) = store_in(temp_dir.path());

        store.append("First idea", &fridge_options(), "## A\nx").await?;
        let entry = store.append("AI fridge", &fridge_options(), "## B\ny").await?;

        let entries = store.load_all().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.last(), Some(&entry));
        assert_eq!(entry.idea, "AI fridge");
        assert_eq!(entry.options, fridge_options());
        assert_eq!(entry.pitch, "## B\ny");
        assert_eq!(entry.timestamp.timestamp_millis(), entry.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_empties_log() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let (store, storage) = store_in(temp_dir.path());

        store.append("AI fridge", &fridge_options(), "pitch").await?;
        store.clear().await?;

        assert!(store.load_all().await.is_empty());
        assert_eq!(storage.get(HISTORY_KEY).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_unparsable_log_reads_as_empty() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let (store, storage) = store_in(temp_dir.path());

        storage.set(HISTORY_KEY, "{not json").await?;
        assert!(store.load_all().await.is_empty());
        assert_eq!(store.find(1).await, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_section_skips_only_that_entry() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let (store, storage) = store_in(temp_dir.path());

        let stored = serde_json::json!([
            {
                "id": 1717000000123_i64,
                "timestamp": "2024-05-29T16:26:40.123Z",
                "idea": "AI fridge",
                "options": {"tone": "Casual", "audience": "Customers", "sections": ["tagline"]},
                "pitch": "## Tagline\nStay cool"
            },
            {
                "id": 1717000000456_i64,
                "timestamp": "2024-05-29T16:26:40.456Z",
                "idea": "Drone dog walker",
                "options": {"tone": "Casual", "audience": "Customers", "sections": ["problem", "solution"]},
                "pitch": "## Problem\nDogs"
            }
        ]);
        storage.set(HISTORY_KEY, &stored.to_string()).await?;

        let entries = store.load_all().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].idea, "AI fridge");

        store.append("Solar kettle", &fridge_options(), "## A\nx").await?;

        let ideas: Vec<_> = store.load_all().await.into_iter().map(|e| e.idea).collect();
        assert_eq!(ideas, vec!["AI fridge", "Solar kettle"]);

        let raw: Vec<serde_json::Value> =
            serde_json::from_str(&storage.get(HISTORY_KEY).await?.unwrap_or_default())?;
        assert_eq!(raw.len(), 3);
        assert_eq!(raw[1]["idea"], "Drone dog walker");
        Ok(())
    }

    #[tokio::test]
    async fn test_append_fails_when_log_cannot_be_read() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let (store, _) = store_in(temp_dir.path());

        // A directory where the log file should be makes every read fail.
        std::fs::create_dir(temp_dir.path().join(HISTORY_KEY))?;

        assert!(store.load_all().await.is_empty());
        assert!(store.append("AI fridge", &fridge_options(), "pitch").await.is_err());
        assert!(temp_dir.path().join(HISTORY_KEY).is_dir());
        Ok(())
    }

    #[tokio::test]
    async fn test_find_by_id() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let (store, _) = store_in(temp_dir.path());

        let entry = store.append("AI fridge", &fridge_options(), "pitch").await?;
        assert_eq!(store.find(entry.id).await, Some(entry));
        assert_eq!(store.find(42).await, None);
        Ok(())
    }

    #[test]
    fn test_title_truncation() {
        assert_eq!(history_title("AI fridge"), "AI fridge");
        assert_eq!(history_title("A fridge that orders groceries\nand more"), "A fridge that orders groceries");
        assert_eq!(
            history_title("A smart fridge that orders groceries for you"),
            "A smart fridge that orders gro..."
        );
        assert_eq!(history_title(""), "");
        assert_eq!(history_title("冷蔵庫".repeat(11).as_str()).chars().count(), 33);
    }

    #[test]
    fn test_projection_is_newest_first() {
        let now = Utc::now();
        let older = HistoryEntry::new("old", fridge_options(), "p", now - chrono::Duration::seconds(5));
        let newer = HistoryEntry::new("new", fridge_options(), "p", now);

        let items = project(&[older.clone(), newer.clone()]);
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![newer.id, older.id]);
        assert_eq!(items[0].title, "new");
        assert!(!items[0].date.is_empty());
    }
}
