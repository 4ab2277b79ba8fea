//! レター生成
//!
//! データソース（アップロード / 保存済みデータセット）と出力モード（zip / combined）を選び、
//! テンプレート（.docx）と合わせて送信する。結果はファイルとして保存。

use leptos::html::Input;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{File, HtmlInputElement};
use company_pipeline_common::letters::{summary_message, DataSource, LetterForm, OutputMode};
use company_pipeline_common::types::DatasetSummary;
use crate::api::ApiClient;
use crate::components::status_box::StatusBox;
use crate::download::save_bytes;
use crate::state::{AppState, StatusMessage};

#[component]
pub fn LettersPanel() -> impl IntoView {
    let state = expect_context::<AppState>();
    let api = expect_context::<ApiClient>();

    let data_file = RwSignal::new_local(None::<File>);
    let template_file = RwSignal::new_local(None::<File>);
    let data_input = NodeRef::<Input>::new();
    let template_input = NodeRef::<Input>::new();

    let source = RwSignal::new(DataSource::default());
    let mode = RwSignal::new(OutputMode::default());
    let letters_per_file = RwSignal::new(OutputMode::Combined.default_letters_per_file());
    let dataset_id = RwSignal::new(state.current_dataset_id.get_untracked());
    let datasets = RwSignal::new(Vec::<DatasetSummary>::new());
    let status = RwSignal::new(None::<StatusMessage>);
    let busy = RwSignal::new(false);

    {
        let api = api.clone();
        spawn_local(async move {
            match api.list_datasets().await {
                Ok(list) => datasets.set(list),
                Err(e) => tracing::warn!(error = %e, "dataset list for letters failed"),
            }
        });
    }

    let on_generate = move |_| {
        let form = LetterForm {
            source: source.get_untracked(),
            mode: mode.get_untracked(),
            letters_per_file: Some(letters_per_file.get_untracked()),
            data_file_name: data_file.with_untracked(|f| f.as_ref().map(|f| f.name())),
            template_file_name: template_file.with_untracked(|f| f.as_ref().map(|f| f.name())),
            dataset_id: dataset_id.get_untracked(),
        };
        let params = match form.validate() {
            Ok(params) => params,
            Err(e) => {
                status.set(Some(StatusMessage::error(e.to_string())));
                return;
            }
        };
        let Some(template) = template_file.get_untracked() else {
            return;
        };
        let data = data_file.get_untracked();

        let api = api.clone();
        busy.set(true);
        status.set(Some(StatusMessage::loading("Generating letters...")));
        spawn_local(async move {
            let result = match (params.source, params.dataset_id, data) {
                (DataSource::Dataset, Some(id), _) => {
                    api.letters_from_dataset(id, &template, &params).await
                }
                (_, _, Some(data)) => api.letters_from_upload(&data, &template, &params).await,
                _ => {
                    busy.set(false);
                    return;
                }
            };

            match result {
                Ok(file) => match save_bytes(&file.bytes, &file.filename, &file.content_type) {
                    Ok(()) => status.set(Some(StatusMessage::success(summary_message(
                        &file.filename,
                        file.total_letters.as_deref(),
                        file.files_created.as_deref(),
                    )))),
                    Err(e) => status.set(Some(StatusMessage::error(format!(
                        "Saving file failed: {:?}",
                        e
                    )))),
                },
                Err(e) => status.set(Some(StatusMessage::error(format!(
                    "Letter generation failed: {}",
                    e
                )))),
            }
            busy.set(false);
        });
    };

    let file_label = move |file: RwSignal<Option<File>, LocalStorage>| {
        move || {
            file.with(|f| {
                f.as_ref()
                    .map(|f| f.name())
                    .unwrap_or_else(|| "No file selected".to_string())
            })
        }
    };

    view! {
        <div class="panel letters-panel">
            <div class="form-group">
                <span class="label">"Data source"</span>
                <label class="radio">
                    <input
                        type="radio"
                        name="letter-source"
                        prop:checked=move || source.get() == DataSource::Upload
                        on:change=move |_| source.set(DataSource::Upload)
                    />
                    "Upload file"
                </label>
                <label class="radio">
                    <input
                        type="radio"
                        name="letter-source"
                        prop:checked=move || source.get() == DataSource::Dataset
                        on:change=move |_| source.set(DataSource::Dataset)
                    />
                    "Saved dataset"
                </label>
            </div>

            <Show
                when=move || source.get() == DataSource::Upload
                fallback=move || view! {
                    <div class="form-group">
                        <label for="letter-dataset">"Dataset"</label>
                        <select
                            id="letter-dataset"
                            on:change=move |ev| dataset_id.set(event_target_value(&ev).parse().ok())
                        >
                            <option value="" selected=move || dataset_id.get().is_none()>"Select a dataset"</option>
                            <For
                                each=move || datasets.get()
                                key=|d| d.id
                                children=move |d| {
                                    let id = d.id;
                                    view! {
                                        <option value=id.to_string() selected=move || dataset_id.get() == Some(id)>
                                            {format!("{} ({})", d.name, d.total_companies)}
                                        </option>
                                    }
                                }
                            />
                        </select>
                    </div>
                }
            >
                <div class="form-group">
                    <label for="letter-data">"Data file (.xlsx, .xls, .csv)"</label>
                    <input
                        type="file"
                        id="letter-data"
                        accept=".xlsx,.xls,.csv"
                        node_ref=data_input
                        on:change=move |ev| {
                            let input = event_target::<HtmlInputElement>(&ev);
                            data_file.set(input.files().and_then(|files| files.get(0)));
                        }
                    />
                    <span class="file-name">{file_label(data_file)}</span>
                    <button
                        class="btn btn-tertiary btn-small"
                        on:click=move |_| {
                            data_file.set(None);
                            if let Some(input) = data_input.get() {
                                input.set_value("");
                            }
                        }
                    >
                        "Clear"
                    </button>
                </div>
            </Show>

            <div class="form-group">
                <label for="letter-template">"Template (.docx)"</label>
                <input
                    type="file"
                    id="letter-template"
                    accept=".docx"
                    node_ref=template_input
                    on:change=move |ev| {
                        let input = event_target::<HtmlInputElement>(&ev);
                        template_file.set(input.files().and_then(|files| files.get(0)));
                    }
                />
                <span class="file-name">{file_label(template_file)}</span>
                <button
                    class="btn btn-tertiary btn-small"
                    on:click=move |_| {
                        template_file.set(None);
                        if let Some(input) = template_input.get() {
                            input.set_value("");
                        }
                    }
                >
                    "Clear"
                </button>
            </div>

            <div class="form-group">
                <span class="label">"Output"</span>
                <label class="radio">
                    <input
                        type="radio"
                        name="letter-mode"
                        prop:checked=move || mode.get() == OutputMode::Zip
                        on:change=move |_| mode.set(OutputMode::Zip)
                    />
                    "One file per letter (ZIP)"
                </label>
                <label class="radio">
                    <input
                        type="radio"
                        name="letter-mode"
                        prop:checked=move || mode.get() == OutputMode::Combined
                        on:change=move |_| mode.set(OutputMode::Combined)
                    />
                    "Combined documents"
                </label>
                <Show when=move || mode.get() == OutputMode::Combined>
                    <label for="letters-per-file">"Letters per file"</label>
                    <input
                        type="number"
                        id="letters-per-file"
                        min="1"
                        prop:value=move || letters_per_file.get().to_string()
                        on:input=move |ev| {
                            letters_per_file.set(event_target_value(&ev).parse().unwrap_or(0));
                        }
                    />
                </Show>
            </div>

            <button class="btn btn-primary" disabled=move || busy.get() on:click=on_generate>
                {move || if busy.get() { "Generating..." } else { "Generate letters" }}
            </button>

            <StatusBox status=status />
        </div>
    }
}
