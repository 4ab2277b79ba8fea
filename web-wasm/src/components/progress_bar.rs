//! プログレスバーコンポーネント

use leptos::prelude::*;
use company_pipeline_common::Progress;

#[component]
pub fn ProgressBar(progress: Signal<Option<Progress>>) -> impl IntoView {
    let percent = move || progress.get().map(|p| p.percent).unwrap_or(0);

    view! {
        <div class="progress-container">
            <div class="progress-bar">
                <div
                    class="progress-fill"
                    style=move || format!("width: {}%", percent())
                />
            </div>
            <p class="progress-text">
                {move || {
                    progress
                        .get()
                        .map(|p| format!("Enriching... {}", p.label()))
                        .unwrap_or_else(|| "Waiting for job...".to_string())
                }}
            </p>
        </div>
    }
}
