//! タブ切り替え

use leptos::prelude::*;
use crate::state::{AppState, Tab};

#[component]
pub fn TabBar() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <nav class="tabs">
            {Tab::ALL
                .into_iter()
                .map(|tab| {
                    view! {
                        <button
                            class=move || {
                                if state.active_tab.get() == tab { "tab active" } else { "tab" }
                            }
                            on:click=move |_| state.active_tab.set(tab)
                        >
                            {tab.label()}
                        </button>
                    }
                })
                .collect_view()}
        </nav>
    }
}

/// タブの中身（常にマウントしたまま表示だけ切り替える）
#[component]
pub fn TabPanel(tab: Tab, children: Children) -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <section
            class="tab-panel"
            style:display=move || if state.active_tab.get() == tab { "block" } else { "none" }
        >
            {children()}
        </section>
    }
}
