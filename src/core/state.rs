use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::io::Storage;

pub const HISTORY_KEY: &str = "pitchHistory";
pub const THEME_KEY: &str = "theme";
pub const SIDEBAR_KEY: &str = "sidebarState";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Anything other than `"light"` is the dark default.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarState {
    #[default]
    Open,
    Closed,
}

impl SidebarState {
    pub fn as_str(self) -> &'static str {
        match self {
            SidebarState::Open => "open",
            SidebarState::Closed => "closed",
        }
    }

    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("closed") => SidebarState::Closed,
            _ => SidebarState::Open,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SidebarState::Open => SidebarState::Closed,
            SidebarState::Closed => SidebarState::Open,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preferences {
    pub theme: Theme,
    pub sidebar: SidebarState,
}

/// All values the application persists, behind one storage backend.
///
/// Writes go straight through to storage. Two processes (or browser tabs)
/// sharing the same backend race with last-writer-wins semantics.
#[derive(Clone)]
pub struct PersistentState {
    storage: Arc<dyn Storage>,
}

impl PersistentState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    async fn read_or_default(&self, key: &str) -> Option<String> {
        match self.storage.get(key).await {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to read {}: {:#}", key, e);
                None
            }
        }
    }

    pub async fn preferences(&self) -> Preferences {
        Preferences {
            theme: Theme::from_stored(self.read_or_default(THEME_KEY).await.as_deref()),
            sidebar: SidebarState::from_stored(self.read_or_default(SIDEBAR_KEY).await.as_deref()),
        }
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        self.storage
            .set(THEME_KEY, theme.as_str())
            .await
            .context("Failed to save theme")
    }

    pub async fn set_sidebar(&self, sidebar: SidebarState) -> Result<()> {
        self.storage
            .set(SIDEBAR_KEY, sidebar.as_str())
            .await
            .context("Failed to save sidebar state")
    }

    pub async fn read_history(&self) -> Result<Option<String>> {
        self.storage.get(HISTORY_KEY).await
    }

    pub async fn write_history(&self, serialized: &str) -> Result<()> {
        self.storage
            .set(HISTORY_KEY, serialized)
            .await
            .context("Failed to save history")
    }

    pub async fn remove_history(&self) -> Result<()> {
        self.storage
            .remove(HISTORY_KEY)
            .await
            .context("Failed to remove history")
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::core::io::NativeStorage;

    #[test]
    fn test_stored_values_fall_back_to_defaults() {
        assert_eq!(Theme::from_stored(None), Theme::Dark);
        assert_eq!(Theme::from_stored(Some("solarized")), Theme::Dark);
        assert_eq!(Theme::from_stored(Some("light")), Theme::Light);
        assert_eq!(SidebarState::from_stored(None), SidebarState::Open);
        assert_eq!(SidebarState::from_stored(Some("closed")), SidebarState::Closed);
    }

    #[tokio::test]
    async fn test_preferences_persist_across_instances() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let state = PersistentState::new(Arc::new(NativeStorage::new(temp_dir.path())));

        assert_eq!(state.preferences().await, Preferences::default());

        state.set_theme(Theme::Light).await?;
        state.set_sidebar(SidebarState::Closed).await?;

        let reopened = PersistentState::new(Arc::new(NativeStorage::new(temp_dir.path())));
        let prefs = reopened.preferences().await;
        assert_eq!(prefs.theme, Theme::Light);
        assert_eq!(prefs.sidebar, SidebarState::Closed);

        assert_eq!(std::fs::read_to_string(temp_dir.path().join(THEME_KEY))?, "light");
        Ok(())
    }
}
