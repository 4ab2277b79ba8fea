//! ヘッダーコンポーネント（APIの接続先設定を含む）

use leptos::prelude::*;
use crate::config::WebConfig;

#[component]
pub fn Header(config: WebConfig) -> impl IntoView {
    let (show_settings, set_show_settings) = signal(false);
    let (api_base_url, set_api_base_url) = signal(config.api_base_url.clone());
    let (settings_status, set_settings_status) = signal(String::new());

    let on_save = move |_| {
        let config = WebConfig::with_api_base_url(&api_base_url.get_untracked());
        match config.save() {
            Ok(()) => reload(),
            Err(e) => set_settings_status.set(e),
        }
    };

    let on_reset = move |_| {
        WebConfig::clear();
        reload();
    };

    let target = if config.is_same_origin() {
        "same origin".to_string()
    } else {
        config.api_base_url.clone()
    };

    view! {
        <header class="header">
            <h1>"Company Pipeline"</h1>
            <button
                class="btn btn-tertiary btn-small"
                on:click=move |_| set_show_settings.update(|v| *v = !*v)
            >
                {format!("API: {}", target)}
            </button>
            <Show when=move || show_settings.get()>
                <div class="settings-panel">
                    <div class="form-group">
                        <label for="api-base-url">"API base URL"</label>
                        <input
                            type="text"
                            id="api-base-url"
                            placeholder="http://localhost:8000 (empty = same origin)"
                            prop:value=move || api_base_url.get()
                            on:input=move |ev| set_api_base_url.set(event_target_value(&ev))
                        />
                    </div>
                    <div class="api-actions">
                        <button class="btn btn-primary btn-small" on:click=on_save>"Save"</button>
                        <button class="btn btn-tertiary btn-small" on:click=on_reset>"Reset"</button>
                    </div>
                    <div class="api-key-status">{move || settings_status.get()}</div>
                </div>
            </Show>
        </header>
    }
}

fn reload() {
    if let Some(window) = web_sys::window() {
        let _ = window.location().reload();
    }
}
