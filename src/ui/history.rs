//! History sidebar.

use leptos::*;

use crate::services::history::HistoryListItem;

#[component]
pub fn HistoryPanel(
    items: RwSignal<Vec<HistoryListItem>>,
    on_select: Callback<i64>,
    on_clear: Callback<()>,
) -> impl IntoView {
    view! {
        <aside class="history-panel">
            <div class="history-header">
                <h2>"History"</h2>
                <button id="clear-history-btn" on:click=move |_| on_clear.call(())>
                    "Clear"
                </button>
            </div>
            <Show
                when=move || !items.with(Vec::is_empty)
                fallback=|| view! { <p class="history-empty">"No history yet"</p> }
            >
                <ul id="history-list">
                    <For
                        each=move || items.get()
                        key=|item| item.id
                        children=move |item: HistoryListItem| {
                            let id = item.id;
                            let on_select = on_select.clone();
                            view! {
                                <li
                                    class="history-item"
                                    data-id=id.to_string()
                                    on:click=move |_| on_select.call(id)
                                >
                                    <h3>{item.title}</h3>
                                    <p>{item.date}</p>
                                </li>
                            }
                        }
                    />
                </ul>
            </Show>
        </aside>
    }
}
