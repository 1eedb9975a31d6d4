//! Orchestrates one page: validation, the single in-flight request, rendering,
//! history, and preference toggles.

use anyhow::Result;
use std::sync::{Mutex, PoisonError};

use crate::core::error::GenerateError;
use crate::core::model::{FormState, HistoryEntry};
use crate::core::state::{PersistentState, Preferences, Theme};
use crate::services::client::{GenerateRequest, PitchClient};
use crate::services::history::{project, HistoryListItem, HistoryStore};
use crate::services::renderer::{Block, PitchRenderer};

pub const BUSY_MESSAGE: &str = "Crafting your masterpiece... Please wait.";
pub const CLEAR_PROMPT: &str = "Are you sure you want to clear all generation history?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Everything the controller needs from a front end.
pub trait PitchView {
    /// Disables the generate trigger and shows a busy indicator while `busy`.
    fn set_busy(&self, busy: bool);
    fn show_placeholder(&self, message: &str);
    fn show_blocks(&self, blocks: &[Block]);
    fn show_error(&self, message: &str);
    /// A blocking notice, e.g. an alert.
    fn notify(&self, message: &str);
    fn set_history(&self, items: &[HistoryListItem]);
    fn prepend_history(&self, item: &HistoryListItem);
    fn restore_form(&self, form: &FormState);
    fn confirm(&self, message: &str) -> bool;
    fn apply_preferences(&self, preferences: &Preferences);
}

pub struct GenerationController {
    client: Box<dyn PitchClient>,
    state: PersistentState,
    history: HistoryStore,
    renderer: PitchRenderer,
    phase: Mutex<Phase>,
}

impl GenerationController {
    pub fn new(client: Box<dyn PitchClient>, state: PersistentState, renderer: PitchRenderer) -> Self {
        Self {
            client,
            history: HistoryStore::new(state.clone()),
            state,
            renderer,
            phase: Mutex::new(Phase::Idle),
        }
    }

    pub fn phase(&self) -> Phase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    fn set_phase(&self, next: Phase) {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        log::debug!("Generation phase {:?} -> {:?}", *phase, next);
        *phase = next;
    }

    /// Idle -> Pending, unless a request is already out.
    fn try_begin(&self) -> bool {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if *phase == Phase::Pending {
            return false;
        }
        *phase = Phase::Pending;
        true
    }

    /// Loads preferences and the history list into a fresh view.
    pub async fn startup(&self, view: &dyn PitchView) -> Preferences {
        let preferences = self.state.preferences().await;
        view.apply_preferences(&preferences);

        let entries = self.history.load_all().await;
        log::info!("Loaded {} history entries", entries.len());
        view.set_history(&project(&entries));
        preferences
    }

    pub async fn generate(
        &self,
        form: &FormState,
        view: &dyn PitchView,
    ) -> Result<HistoryEntry, GenerateError> {
        if self.phase() == Phase::Pending {
            return Err(GenerateError::Busy);
        }
        if let Err(e) = form.validate() {
            view.notify(&e.to_string());
            return Err(e.into());
        }
        if !self.try_begin() {
            return Err(GenerateError::Busy);
        }

        view.set_busy(true);
        view.show_placeholder(BUSY_MESSAGE);
        log::info!("Generating pitch ({} sections)", form.options.sections.len());

        let outcome = match self.client.generate(&GenerateRequest::from(form)).await {
            Ok(pitch) => self.accept(form, &pitch, view).await,
            Err(e) => {
                log::error!("Generation failed: {}", e);
                view.show_error(&format!("An error occurred: {}", e));
                Err(e)
            }
        };

        self.set_phase(if outcome.is_ok() {
            Phase::Succeeded
        } else {
            Phase::Failed
        });
        self.set_phase(Phase::Idle);
        view.set_busy(false);
        outcome
    }

    async fn accept(
        &self,
        form: &FormState,
        pitch: &str,
        view: &dyn PitchView,
    ) -> Result<HistoryEntry, GenerateError> {
        view.show_blocks(&self.renderer.render(pitch));

        match self.history.append(&form.idea, &form.options, pitch).await {
            Ok(entry) => {
                view.prepend_history(&HistoryListItem::from_entry(&entry));
                Ok(entry)
            }
            Err(e) => {
                log::error!("Failed to save history: {:#}", e);
                let err = GenerateError::Persist(format!("{:#}", e));
                view.notify(&err.to_string());
                Err(err)
            }
        }
    }

    /// Puts the page back exactly as it was when `id` was generated.
    /// No validation runs; the stored form was valid when it was saved.
    pub async fn select(&self, id: i64, view: &dyn PitchView) -> Option<HistoryEntry> {
        let Some(entry) = self.history.find(id).await else {
            log::warn!("History entry {} no longer exists", id);
            return None;
        };
        self.restore(&entry, view);
        Some(entry)
    }

    pub fn restore(&self, entry: &HistoryEntry, view: &dyn PitchView) {
        view.restore_form(&entry.form());
        view.show_blocks(&self.renderer.render(&entry.pitch));
    }

    /// Returns whether the history was cleared.
    pub async fn clear_history(&self, view: &dyn PitchView) -> Result<bool> {
        if !view.confirm(CLEAR_PROMPT) {
            return Ok(false);
        }
        self.history.clear().await?;
        view.set_history(&[]);
        log::info!("History cleared");
        Ok(true)
    }

    pub async fn set_theme(&self, theme: Theme, view: &dyn PitchView) -> Result<Preferences> {
        self.state.set_theme(theme).await?;
        let preferences = self.state.preferences().await;
        view.apply_preferences(&preferences);
        Ok(preferences)
    }

    pub async fn toggle_theme(&self, view: &dyn PitchView) -> Result<Preferences> {
        let current = self.state.preferences().await;
        self.set_theme(current.theme.toggled(), view).await
    }

    pub async fn toggle_sidebar(&self, view: &dyn PitchView) -> Result<Preferences> {
        let current = self.state.preferences().await;
        self.state.set_sidebar(current.sidebar.toggled()).await?;
        let preferences = self.state.preferences().await;
        view.apply_preferences(&preferences);
        Ok(preferences)
    }
}
