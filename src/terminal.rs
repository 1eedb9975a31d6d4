//! Interactive terminal front end.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Confirm, InquireError, MultiSelect, Select, Text};
use std::cell::RefCell;
use std::fmt;
use std::time::Duration;

use pitchcraft::core::config::FormConfig;
use pitchcraft::core::model::{FormState, GenerationOptions, Section};
use pitchcraft::core::state::Preferences;
use pitchcraft::services::controller::{GenerationController, PitchView};
use pitchcraft::services::history::HistoryListItem;
use pitchcraft::services::renderer::Block;

const TEXT_WIDTH: usize = 80;

pub struct TerminalView {
    spinner: RefCell<Option<ProgressBar>>,
    history: RefCell<Vec<HistoryListItem>>,
    form: RefCell<FormState>,
}

impl TerminalView {
    pub fn new(initial: FormState) -> Self {
        Self {
            spinner: RefCell::new(None),
            history: RefCell::new(Vec::new()),
            form: RefCell::new(initial),
        }
    }

    fn history(&self) -> Vec<HistoryListItem> {
        self.history.borrow().clone()
    }

    fn form(&self) -> FormState {
        self.form.borrow().clone()
    }
}

impl PitchView for TerminalView {
    fn set_busy(&self, busy: bool) {
        let mut spinner = self.spinner.borrow_mut();
        if busy {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
                pb.set_style(style);
            }
            pb.enable_steady_tick(Duration::from_millis(100));
            *spinner = Some(pb);
        } else if let Some(pb) = spinner.take() {
            pb.finish_and_clear();
        }
    }

    fn show_placeholder(&self, message: &str) {
        match self.spinner.borrow().as_ref() {
            Some(pb) => pb.set_message(message.to_string()),
            None => println!("{}", message),
        }
    }

    fn show_blocks(&self, blocks: &[Block]) {
        for block in blocks {
            match block.to_plain_text(TEXT_WIDTH) {
                Ok(text) => println!("{}", text),
                Err(e) => log::warn!("{:#}", e),
            }
            println!("{}", "-".repeat(TEXT_WIDTH));
        }
    }

    fn show_error(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn notify(&self, message: &str) {
        println!("{}", message);
    }

    fn set_history(&self, items: &[HistoryListItem]) {
        *self.history.borrow_mut() = items.to_vec();
    }

    fn prepend_history(&self, item: &HistoryListItem) {
        self.history.borrow_mut().insert(0, item.clone());
    }

    fn restore_form(&self, form: &FormState) {
        *self.form.borrow_mut() = form.clone();
        println!("Idea: {}", form.idea);
        println!(
            "Tone: {} | Audience: {} | Sections: {}",
            form.options.tone,
            form.options.audience,
            form.options
                .sections
                .iter()
                .map(|s| s.label())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    fn confirm(&self, message: &str) -> bool {
        Confirm::new(message)
            .with_default(false)
            .prompt()
            .unwrap_or(false)
    }

    fn apply_preferences(&self, preferences: &Preferences) {
        log::debug!("Preferences: {:?}", preferences);
    }
}

#[derive(Debug, Clone, Copy)]
enum MenuAction {
    Generate,
    History,
    Clear,
    Quit,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuAction::Generate => "Generate pitch",
            MenuAction::History => "Browse history",
            MenuAction::Clear => "Clear history",
            MenuAction::Quit => "Quit",
        };
        f.write_str(label)
    }
}

fn is_cancel(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

fn select_with_current(prompt: &str, choices: &[String], current: &str) -> Result<String, InquireError> {
    let mut choices = choices.to_vec();
    if !choices.iter().any(|c| c == current) {
        choices.insert(0, current.to_string());
    }
    let cursor = choices.iter().position(|c| c == current).unwrap_or(0);
    Select::new(prompt, choices).with_starting_cursor(cursor).prompt()
}

fn prompt_form(config: &FormConfig, previous: &FormState) -> Result<FormState, InquireError> {
    let idea = Text::new("Startup idea:")
        .with_initial_value(&previous.idea)
        .prompt()?;
    let tone = select_with_current("Tone:", &config.tones, &previous.options.tone)?;
    let audience = select_with_current("Audience:", &config.audiences, &previous.options.audience)?;

    let defaults: Vec<usize> = Section::ALL
        .iter()
        .enumerate()
        .filter(|(_, s)| previous.options.sections.contains(s))
        .map(|(i, _)| i)
        .collect();
    let sections = MultiSelect::new("Sections:", Section::ALL.to_vec())
        .with_default(&defaults)
        .prompt()?;

    Ok(FormState {
        idea,
        options: GenerationOptions {
            tone,
            audience,
            sections: sections.into_iter().collect(),
        },
    })
}

pub async fn run(controller: &GenerationController, view: &TerminalView, config: &FormConfig) -> Result<()> {
    let actions = vec![
        MenuAction::Generate,
        MenuAction::History,
        MenuAction::Clear,
        MenuAction::Quit,
    ];

    loop {
        let action = match Select::new("What would you like to do?", actions.clone()).prompt() {
            Ok(action) => action,
            Err(e) if is_cancel(&e) => break,
            Err(e) => return Err(e.into()),
        };

        match action {
            MenuAction::Generate => {
                let form = match prompt_form(config, &view.form()) {
                    Ok(form) => form,
                    Err(e) if is_cancel(&e) => continue,
                    Err(e) => return Err(e.into()),
                };
                *view.form.borrow_mut() = form.clone();
                // Failures have already been shown through the view.
                match controller.generate(&form, view).await {
                    Ok(entry) => log::debug!("Generated pitch {}", entry.id),
                    Err(e) => log::debug!("Generation ended without a pitch: {}", e),
                }
            }
            MenuAction::History => {
                let items = view.history();
                if items.is_empty() {
                    println!("No history yet");
                    continue;
                }
                match Select::new("Pick a past pitch:", items).prompt() {
                    Ok(item) => {
                        controller.select(item.id, view).await;
                    }
                    Err(e) if is_cancel(&e) => continue,
                    Err(e) => return Err(e.into()),
                }
            }
            MenuAction::Clear => {
                if controller.clear_history(view).await? {
                    println!("History cleared.");
                }
            }
            MenuAction::Quit => break,
        }
    }

    Ok(())
}
