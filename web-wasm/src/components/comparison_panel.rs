//! 初期データと最終データの比較

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{File, HtmlInputElement};
use company_pipeline_common::comparison::{format_number, DeltaReport};
use company_pipeline_common::types::{AnalysisResult, DatasetSummary};
use crate::api::ApiClient;
use crate::components::status_box::StatusBox;
use crate::state::{AppState, StatusMessage};

/// 初期データの取得元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitialSource {
    SavedDataset,
    CurrentExtract,
}

#[component]
pub fn ComparisonPanel() -> impl IntoView {
    let state = expect_context::<AppState>();
    let api = expect_context::<ApiClient>();

    let source = RwSignal::new(InitialSource::SavedDataset);
    let datasets = RwSignal::new(Vec::<DatasetSummary>::new());
    let dataset_id = RwSignal::new(None::<i64>);
    let final_file = RwSignal::new_local(None::<File>);
    let initial = RwSignal::new(None::<AnalysisResult>);
    let final_result = RwSignal::new(None::<AnalysisResult>);
    let status = RwSignal::new(None::<StatusMessage>);

    {
        let api = api.clone();
        spawn_local(async move {
            match api.list_datasets().await {
                Ok(list) => datasets.set(list),
                Err(e) => tracing::warn!(error = %e, "dataset list for comparison failed"),
            }
        });
    }

    let on_initial = {
        let api = api.clone();
        move |_| {
            let api = api.clone();
            let selected = source.get_untracked();
            let id = dataset_id.get_untracked();
            let dataset_file = state.current_dataset_file.get_untracked();
            let message = match (selected, id, &dataset_file) {
                (InitialSource::SavedDataset, None, _) => Some("Select a dataset"),
                (InitialSource::CurrentExtract, _, None) => {
                    Some("No current dataset. Run an extract first")
                }
                _ => None,
            };
            if let Some(message) = message {
                status.set(Some(StatusMessage::error(message)));
                return;
            }

            status.set(Some(StatusMessage::loading("Analysing initial data...")));
            spawn_local(async move {
                let result = match (selected, id, dataset_file) {
                    (InitialSource::SavedDataset, Some(id), _) => api.analyze_dataset(id).await,
                    (_, _, Some(file)) => api.analyze_file(&file).await,
                    _ => return,
                };
                match result {
                    Ok(analysis) => {
                        initial.set(Some(analysis));
                        status.set(None);
                    }
                    Err(e) => status.set(Some(StatusMessage::error(format!(
                        "Initial analysis failed: {}",
                        e
                    )))),
                }
            });
        }
    };

    let on_final = move |_| {
        let Some(file) = final_file.get_untracked() else {
            status.set(Some(StatusMessage::error("Select the final data file")));
            return;
        };
        let api = api.clone();
        status.set(Some(StatusMessage::loading("Analysing final data...")));
        spawn_local(async move {
            match api.analyze_final(&file).await {
                Ok(analysis) => {
                    final_result.set(Some(analysis));
                    status.set(None);
                }
                Err(e) => status.set(Some(StatusMessage::error(format!(
                    "Final analysis failed: {}",
                    e
                )))),
            }
        });
    };

    let report = move || match (initial.get(), final_result.get()) {
        (Some(a), Some(b)) => Some(DeltaReport::between(&a, &b)),
        _ => None,
    };

    view! {
        <div class="panel comparison-panel">
            <div class="form-group">
                <span class="label">"Initial data"</span>
                <label class="radio">
                    <input
                        type="radio"
                        name="initial-source"
                        prop:checked=move || source.get() == InitialSource::SavedDataset
                        on:change=move |_| source.set(InitialSource::SavedDataset)
                    />
                    "Saved dataset"
                </label>
                <label class="radio">
                    <input
                        type="radio"
                        name="initial-source"
                        prop:checked=move || source.get() == InitialSource::CurrentExtract
                        on:change=move |_| source.set(InitialSource::CurrentExtract)
                    />
                    "Current extract"
                </label>
                <Show when=move || source.get() == InitialSource::SavedDataset>
                    <select on:change=move |ev| dataset_id.set(event_target_value(&ev).parse().ok())>
                        <option value="">"Select a dataset"</option>
                        <For
                            each=move || datasets.get()
                            key=|d| d.id
                            children=|d| view! { <option value=d.id.to_string()>{d.name}</option> }
                        />
                    </select>
                </Show>
                <button class="btn btn-secondary btn-small" on:click=on_initial>"Analyse initial"</button>
            </div>

            <div class="form-group">
                <label for="final-file">"Final data file"</label>
                <input
                    type="file"
                    id="final-file"
                    accept=".xlsx,.xls,.csv"
                    on:change=move |ev| {
                        let input = event_target::<HtmlInputElement>(&ev);
                        final_file.set(input.files().and_then(|files| files.get(0)));
                    }
                />
                <button class="btn btn-secondary btn-small" on:click=on_final>"Analyse final"</button>
            </div>

            <StatusBox status=status />

            {move || {
                report()
                    .map(|report| view! { <DeltaTable report=report /> }.into_any())
                    .unwrap_or_else(|| {
                        let step = match (initial.get().is_some(), final_result.get().is_some()) {
                            (false, false) => "Analyse the initial and final data to compare",
                            (true, false) => "Initial data analysed. Now analyse the final file",
                            _ => "Final data analysed. Now analyse the initial data",
                        };
                        view! { <p class="text-muted">{step}</p> }.into_any()
                    })
            }}
        </div>
    }
}

#[component]
fn DeltaTable(report: DeltaReport) -> impl IntoView {
    view! {
        <table class="delta-table">
            <thead>
                <tr>
                    <th>"Metric"</th>
                    <th class="num">"Initial"</th>
                    <th class="num">"Final"</th>
                    <th class="num">"Change"</th>
                </tr>
            </thead>
            <tbody>
                {report
                    .metrics
                    .into_iter()
                    .map(|m| {
                        let change = match m.percent_change() {
                            Some(pct) => format!("{} ({:+.1}%)", m.delta_label(), pct),
                            None => m.delta_label(),
                        };
                        view! {
                            <tr>
                                <td>{m.label}</td>
                                <td class="num">{format_number(m.initial)}</td>
                                <td class="num">{format_number(m.final_value)}</td>
                                <td class=format!("num {}", m.trend_class())>{change}</td>
                            </tr>
                        }
                    })
                    .collect_view()}
            </tbody>
        </table>

        <table class="delta-table">
            <thead>
                <tr>
                    <th>"Region"</th>
                    <th class="num">"Initial"</th>
                    <th class="num">"Final"</th>
                    <th class="num">"Change"</th>
                </tr>
            </thead>
            <tbody>
                {report
                    .regions
                    .into_iter()
                    .map(|r| {
                        let class = format!("num {}", r.trend_class());
                        let change = r.delta_label();
                        view! {
                            <tr>
                                <td>{r.region}</td>
                                <td class="num">{r.initial}</td>
                                <td class="num">{r.final_count}</td>
                                <td class=class>{change}</td>
                            </tr>
                        }
                    })
                    .collect_view()}
            </tbody>
        </table>
    }
}
