use leptos::*;
use std::collections::BTreeSet;

use crate::core::model::{FormState, GenerationOptions, Section};
use crate::core::state::Preferences;
use crate::services::controller::PitchView;
use crate::services::history::HistoryListItem;
use crate::services::renderer::{render_html, Block};

/// What the result container currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultPane {
    Empty,
    Placeholder(String),
    Error(String),
    Blocks(String),
}

/// Reactive page state. The controller writes to it through [`PitchView`].
#[derive(Clone, Copy)]
pub struct WebView {
    pub idea: RwSignal<String>,
    pub tone: RwSignal<String>,
    pub audience: RwSignal<String>,
    pub sections: RwSignal<BTreeSet<Section>>,
    pub busy: RwSignal<bool>,
    pub result: RwSignal<ResultPane>,
    pub history: RwSignal<Vec<HistoryListItem>>,
    pub preferences: RwSignal<Preferences>,
}

impl WebView {
    pub fn new(initial: FormState) -> Self {
        Self {
            idea: create_rw_signal(initial.idea),
            tone: create_rw_signal(initial.options.tone),
            audience: create_rw_signal(initial.options.audience),
            sections: create_rw_signal(initial.options.sections),
            busy: create_rw_signal(false),
            result: create_rw_signal(ResultPane::Empty),
            history: create_rw_signal(Vec::new()),
            preferences: create_rw_signal(Preferences::default()),
        }
    }

    pub fn form(&self) -> FormState {
        FormState {
            idea: self.idea.get_untracked(),
            options: GenerationOptions {
                tone: self.tone.get_untracked(),
                audience: self.audience.get_untracked(),
                sections: self.sections.get_untracked(),
            },
        }
    }

    pub fn toggle_section(&self, section: Section, checked: bool) {
        self.sections.update(|sections| {
            if checked {
                sections.insert(section);
            } else {
                sections.remove(&section);
            }
        });
    }
}

impl PitchView for WebView {
    fn set_busy(&self, busy: bool) {
        self.busy.set(busy);
    }

    fn show_placeholder(&self, message: &str) {
        self.result.set(ResultPane::Placeholder(message.to_string()));
    }

    fn show_blocks(&self, blocks: &[Block]) {
        self.result.set(ResultPane::Blocks(render_html(blocks)));
    }

    fn show_error(&self, message: &str) {
        self.result.set(ResultPane::Error(message.to_string()));
    }

    fn notify(&self, message: &str) {
        if let Err(e) = window().alert_with_message(message) {
            log::warn!("alert failed: {:?}", e);
        }
    }

    fn set_history(&self, items: &[HistoryListItem]) {
        self.history.set(items.to_vec());
    }

    fn prepend_history(&self, item: &HistoryListItem) {
        self.history.update(|items| items.insert(0, item.clone()));
    }

    fn restore_form(&self, form: &FormState) {
        self.idea.set(form.idea.clone());
        self.tone.set(form.options.tone.clone());
        self.audience.set(form.options.audience.clone());
        self.sections.set(form.options.sections.clone());
    }

    fn confirm(&self, message: &str) -> bool {
        window().confirm_with_message(message).unwrap_or(false)
    }

    fn apply_preferences(&self, preferences: &Preferences) {
        self.preferences.set(*preferences);
    }
}
