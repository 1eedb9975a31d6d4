mod history;
mod view;

use leptos::*;
use std::rc::Rc;
use std::sync::Arc;

use crate::core::config::{Config, FormConfig};
use crate::core::io::Storage;
use crate::core::model::Section;
use crate::core::state::{PersistentState, SidebarState, Theme};
use crate::core::web_io::WebStorage;
use crate::services::client::HttpPitchClient;
use crate::services::controller::GenerationController;
use crate::services::renderer::PitchRenderer;

use history::HistoryPanel;
pub use view::{ResultPane, WebView};

/// Defaults, with the backend assumed to live at the page's own origin.
fn browser_config() -> Config {
    let mut config = Config::default();
    match window().location().origin() {
        Ok(origin) => config.server.base_url = origin,
        Err(e) => log::warn!("Could not read page origin: {:?}", e),
    }
    config
}

fn build_controller(config: &Config) -> anyhow::Result<GenerationController> {
    let storage: Arc<dyn Storage> = Arc::new(WebStorage::new()?);
    let client = HttpPitchClient::new(&config.server)?;
    Ok(GenerationController::new(
        Box::new(client),
        PersistentState::new(storage),
        PitchRenderer::from_config(&config.render),
    ))
}

#[component]
pub fn App() -> impl IntoView {
    let config = browser_config();

    match build_controller(&config) {
        Ok(controller) => view! {
            <PitchPage controller=Rc::new(controller) form=config.form/>
        }
        .into_view(),
        Err(e) => view! {
            <p class="placeholder error">"Failed to start: " {format!("{:#}", e)}</p>
        }
        .into_view(),
    }
}

#[component]
fn PitchPage(controller: Rc<GenerationController>, form: FormConfig) -> impl IntoView {
    let ui = WebView::new(form.initial_form());

    {
        let controller = controller.clone();
        spawn_local(async move {
            controller.startup(&ui).await;
        });
    }

    let on_generate = {
        let controller = controller.clone();
        move |_| {
            let controller = controller.clone();
            let form = ui.form();
            spawn_local(async move {
                if let Err(e) = controller.generate(&form, &ui).await {
                    log::debug!("Generation ended without a pitch: {}", e);
                }
            });
        }
    };

    let on_toggle_history = {
        let controller = controller.clone();
        move |_| {
            let controller = controller.clone();
            spawn_local(async move {
                if let Err(e) = controller.toggle_sidebar(&ui).await {
                    log::error!("{:#}", e);
                }
            });
        }
    };

    let on_theme = {
        let controller = controller.clone();
        move |ev| {
            let theme = if event_target_checked(&ev) {
                Theme::Light
            } else {
                Theme::Dark
            };
            let controller = controller.clone();
            spawn_local(async move {
                if let Err(e) = controller.set_theme(theme, &ui).await {
                    log::error!("{:#}", e);
                }
            });
        }
    };

    let on_clear = {
        let controller = controller.clone();
        Callback::new(move |_: ()| {
            let controller = controller.clone();
            spawn_local(async move {
                if let Err(e) = controller.clear_history(&ui).await {
                    log::error!("{:#}", e);
                }
            });
        })
    };

    let on_select = {
        let controller = controller.clone();
        Callback::new(move |id: i64| {
            let controller = controller.clone();
            spawn_local(async move {
                controller.select(id, &ui).await;
            });
        })
    };

    let tone_options = form
        .tones
        .into_iter()
        .map(|tone| {
            let current = tone.clone();
            view! {
                <option value=tone.clone() prop:selected=move || ui.tone.get() == current>
                    {tone}
                </option>
            }
        })
        .collect_view();

    let audience_options = form
        .audiences
        .into_iter()
        .map(|audience| {
            let current = audience.clone();
            view! {
                <option value=audience.clone() prop:selected=move || ui.audience.get() == current>
                    {audience}
                </option>
            }
        })
        .collect_view();

    let section_boxes = Section::ALL
        .into_iter()
        .map(|section| {
            view! {
                <label class="section-option">
                    <input
                        type="checkbox"
                        value=section.key()
                        prop:checked=move || ui.sections.with(|s| s.contains(&section))
                        on:change=move |ev| ui.toggle_section(section, event_target_checked(&ev))
                    />
                    {section.label()}
                </label>
            }
        })
        .collect_view();

    view! {
        <div
            class="app-container"
            class=("history-closed", move || ui.preferences.get().sidebar == SidebarState::Closed)
            class=("theme-light", move || ui.preferences.get().theme == Theme::Light)
        >
            <HistoryPanel items=ui.history on_select=on_select on_clear=on_clear/>
            <main class="main-content">
                <header class="toolbar">
                    <button id="history-toggle-btn" on:click=on_toggle_history>"History"</button>
                    <label class="theme-switch">
                        <input
                            type="checkbox"
                            id="theme-toggle"
                            prop:checked=move || ui.preferences.get().theme == Theme::Light
                            on:change=on_theme
                        />
                        "Light mode"
                    </label>
                </header>

                <textarea
                    id="idea-input"
                    placeholder="Describe your startup idea..."
                    prop:value=move || ui.idea.get()
                    on:input=move |ev| ui.idea.set(event_target_value(&ev))
                ></textarea>

                <div class="options-row">
                    <select id="tone-select" on:change=move |ev| ui.tone.set(event_target_value(&ev))>
                        {tone_options}
                    </select>
                    <select id="audience-select" on:change=move |ev| ui.audience.set(event_target_value(&ev))>
                        {audience_options}
                    </select>
                </div>

                <fieldset id="sections-fieldset">
                    <legend>"Sections"</legend>
                    {section_boxes}
                </fieldset>

                <button
                    id="generate-btn"
                    class=("loading", move || ui.busy.get())
                    prop:disabled=move || ui.busy.get()
                    on:click=on_generate
                >
                    "Generate Pitch"
                </button>

                <div id="result-container">{move || result_view(ui.result.get())}</div>
            </main>
        </div>
    }
}

fn result_view(pane: ResultPane) -> View {
    match pane {
        ResultPane::Empty => {
            view! { <div class="placeholder">"Your generated pitch will appear here."</div> }.into_view()
        }
        ResultPane::Placeholder(message) => view! { <div class="placeholder">{message}</div> }.into_view(),
        ResultPane::Error(message) => view! { <div class="placeholder error">{message}</div> }.into_view(),
        ResultPane::Blocks(html) => view! { <div class="result-blocks" inner_html=html></div> }.into_view(),
    }
}
