//! 保存済みデータセット
//!
//! 一覧 → 詳細（ヘッダ + 企業テーブル）→ 解析 / エクスポート / 削除

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;
use company_pipeline_common::types::{AnalysisResult, Company, DatasetSummary, ExportFormat};
use company_pipeline_common::views::{dataset_header, dataset_list_items};
use crate::api::ApiClient;
use crate::components::analysis_view::AnalysisView;
use crate::components::company_table::CompanyTable;
use crate::components::modal::Modal;
use crate::components::status_box::StatusBox;
use crate::download::save_bytes;
use crate::state::{AppState, StatusMessage, StatusSignal};

#[component]
pub fn DatasetsPanel() -> impl IntoView {
    let state = expect_context::<AppState>();
    let api = expect_context::<ApiClient>();

    let datasets = RwSignal::new(Vec::<DatasetSummary>::new());
    let status = RwSignal::new(None::<StatusMessage>);

    let load_list = {
        let api = api.clone();
        move || {
            let api = api.clone();
            status.set(Some(StatusMessage::loading("Loading datasets...")));
            spawn_local(async move {
                match api.list_datasets().await {
                    Ok(list) => {
                        datasets.set(list);
                        status.set(None);
                    }
                    Err(e) => status.set(Some(StatusMessage::error(format!(
                        "Failed to load datasets: {}",
                        e
                    )))),
                }
            });
        }
    };
    load_list();

    let on_refresh = {
        let load_list = load_list.clone();
        move |_| load_list()
    };

    let on_back = {
        let load_list = load_list.clone();
        move || {
            state.current_dataset_id.set(None);
            load_list();
        }
    };

    view! {
        <div class="panel datasets-panel">
            {move || match state.current_dataset_id.get() {
                Some(id) => view! { <DatasetDetail id=id on_back=on_back.clone() /> }.into_any(),
                None => view! {
                    <div class="actions">
                        <button class="btn btn-secondary btn-small" on:click=on_refresh.clone()>"Refresh"</button>
                    </div>
                    <StatusBox status=status />
                    <DatasetList datasets=datasets />
                }
                .into_any(),
            }}
        </div>
    }
}

#[component]
fn DatasetList(datasets: RwSignal<Vec<DatasetSummary>>) -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <Show
            when=move || !datasets.get().is_empty()
            fallback=|| view! { <p class="text-muted">"No saved datasets yet"</p> }
        >
            <ul class="dataset-list">
                <For
                    each=move || dataset_list_items(&datasets.get())
                    key=|item| item.id
                    children=move |item| {
                        let id = item.id;
                        view! {
                            <li class="dataset-item" on:click=move |_| state.open_dataset(id)>
                                <div class="dataset-title">{item.title}</div>
                                <div class="dataset-subtitle text-muted">{item.subtitle}</div>
                                {item.description.map(|d| view! { <div class="dataset-description">{d}</div> })}
                            </li>
                        }
                    }
                />
            </ul>
        </Show>
    }
}

#[component]
fn DatasetDetail<F>(id: i64, on_back: F) -> impl IntoView
where
    F: Fn() + Clone + Send + Sync + 'static,
{
    let state = expect_context::<AppState>();
    let api = expect_context::<ApiClient>();

    let dataset = RwSignal::new(None::<DatasetSummary>);
    let companies = RwSignal::new(Vec::<Company>::new());
    let total = RwSignal::new(0u64);
    let analysis = RwSignal::new(None::<AnalysisResult>);
    let status: StatusSignal = RwSignal::new(None);
    let show_delete = RwSignal::new(false);

    {
        let api = api.clone();
        let limit = state.companies_limit;
        status.set(Some(StatusMessage::loading("Loading dataset...")));
        spawn_local(async move {
            let (summary, rows) =
                futures::join!(api.get_dataset(id), api.dataset_companies(id, limit));
            match summary {
                Ok(summary) => dataset.set(Some(summary)),
                Err(e) => {
                    status.set(Some(StatusMessage::error(format!(
                        "Failed to load dataset: {}",
                        e
                    ))));
                    return;
                }
            }
            match rows {
                Ok(response) => {
                    total.set(response.total);
                    companies.set(response.companies);
                    status.set(None);
                }
                Err(e) => status.set(Some(StatusMessage::error(format!(
                    "Failed to load companies: {}",
                    e
                )))),
            }
        });
    }

    let on_analyze = {
        let api = api.clone();
        move |_| {
            let api = api.clone();
            status.set(Some(StatusMessage::loading("Analysing dataset...")));
            spawn_local(async move {
                match api.analyze_dataset(id).await {
                    Ok(result) => {
                        analysis.set(Some(result));
                        status.set(None);
                    }
                    Err(e) => status.set(Some(StatusMessage::error(format!(
                        "Analysis failed: {}",
                        e
                    )))),
                }
            });
        }
    };

    let export = {
        let api = api.clone();
        move |format: ExportFormat| {
            let api = api.clone();
            status.set(Some(StatusMessage::loading(format!("Exporting {}...", format.as_str()))));
            spawn_local(async move {
                match api.export_dataset(id, format).await {
                    Ok(file) => match save_bytes(&file.bytes, &file.filename, &file.content_type) {
                        Ok(()) => status.set(Some(StatusMessage::success(format!(
                            "Exported {}",
                            file.filename
                        )))),
                        Err(e) => status.set(Some(StatusMessage::error(format!(
                            "Export failed: {:?}",
                            e
                        )))),
                    },
                    Err(e) => status.set(Some(StatusMessage::error(format!(
                        "Export failed: {}",
                        e
                    )))),
                }
            });
        }
    };
    let on_export_csv = {
        let export = export.clone();
        move |_| export(ExportFormat::Csv)
    };
    let on_export_xlsx = move |_| export(ExportFormat::Xlsx);

    let on_confirm_delete = {
        let api = api.clone();
        let on_back = on_back.clone();
        move |_| {
            let api = api.clone();
            let on_back = on_back.clone();
            show_delete.set(false);
            status.set(Some(StatusMessage::loading("Deleting dataset...")));
            spawn_local(async move {
                match api.delete_dataset(id).await {
                    Ok(_) => {
                        tracing::info!(dataset_id = id, "dataset deleted");
                        on_back();
                    }
                    Err(e) => status.set(Some(StatusMessage::error(format!(
                        "Delete failed: {}",
                        e
                    )))),
                }
            });
        }
    };

    let dataset_name = move || dataset.get().map(|d| d.name).unwrap_or_default();

    view! {
        <div class="dataset-detail">
            <div class="actions">
                <button class="btn btn-tertiary btn-small" on:click=move |_| on_back()>"← Back"</button>
                <button class="btn btn-secondary btn-small" on:click=on_analyze>"Analyse"</button>
                <button class="btn btn-secondary btn-small" on:click=on_export_csv>"Export CSV"</button>
                <button class="btn btn-secondary btn-small" on:click=on_export_xlsx>"Export Excel"</button>
                <button class="btn btn-danger btn-small" on:click=move |_| show_delete.set(true)>"Delete"</button>
            </div>

            {move || {
                dataset
                    .get()
                    .map(|d| {
                        view! {
                            <h2>{d.name.clone()}</h2>
                            <dl class="dataset-header">
                                {dataset_header(&d)
                                    .into_iter()
                                    .map(|(label, value)| view! { <dt>{label}</dt><dd>{value}</dd> })
                                    .collect_view()}
                            </dl>
                        }
                    })
            }}

            <StatusBox status=status />

            {move || analysis.get().map(|result| view! { <AnalysisView analysis=result /> })}

            <p class="text-muted">
                {move || format!("Showing {} of {} companies", companies.with(|c| c.len()), total.get())}
            </p>
            <CompanyTable companies=companies status=status />

            <Modal show=show_delete title="Delete dataset">
                <p>{move || format!("Delete \"{}\"? This cannot be undone.", dataset_name())}</p>
                <div class="actions">
                    <button class="btn btn-danger" on:click=on_confirm_delete.clone()>"Delete"</button>
                    <button class="btn btn-tertiary" on:click=move |_| show_delete.set(false)>"Cancel"</button>
                </div>
            </Modal>
        </div>
    }
}
