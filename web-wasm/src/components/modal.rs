//! モーダルダイアログ

use leptos::prelude::*;

#[component]
pub fn Modal(
    show: RwSignal<bool>,
    #[prop(into)] title: String,
    children: ChildrenFn,
) -> impl IntoView {
    view! {
        <Show when=move || show.get()>
            <div class="modal-backdrop" on:click=move |_| show.set(false)>
                <div class="modal" on:click=|ev| ev.stop_propagation()>
                    <div class="modal-header">
                        <h3>{title.clone()}</h3>
                        <button class="modal-close" on:click=move |_| show.set(false)>"×"</button>
                    </div>
                    <div class="modal-body">{children()}</div>
                </div>
            </div>
        </Show>
    }
}
