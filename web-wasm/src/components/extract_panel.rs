//! 抽出 → 解析 → エンリッチ → ダウンロード / 保存
//!
//! エンリッチ開始後は2秒間隔でジョブ状態をポーリングし、
//! 完了するまでエンリッチ結果のダウンロードボタンは出さない。

use leptos::prelude::*;
use gloo::timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;
use company_pipeline_common::polling::{
    poll_interval, poll_until_terminal, EnrichmentView, JobOutcome, PollStep,
};
use company_pipeline_common::regions::parse_county_list;
use company_pipeline_common::types::{
    AnalysisResult, EnrichRequest, OutputFormat, SaveDatasetRequest,
};
use company_pipeline_common::views::extract_request;
use crate::api::ApiClient;
use crate::components::analysis_view::AnalysisView;
use crate::components::modal::Modal;
use crate::components::progress_bar::ProgressBar;
use crate::components::region_filter::RegionFilter;
use crate::components::status_box::StatusBox;
use crate::download::save_bytes;
use crate::state::{AppState, StatusMessage};

#[component]
pub fn ExtractPanel() -> impl IntoView {
    let state = expect_context::<AppState>();
    let api = expect_context::<ApiClient>();

    let sic_text = RwSignal::new(String::new());
    let counties_text = RwSignal::new(String::new());
    let force_refresh = RwSignal::new(false);
    let output_format = RwSignal::new(OutputFormat::default());
    let status = RwSignal::new(None::<StatusMessage>);
    let busy = RwSignal::new(false);
    let analysis = RwSignal::new(None::<AnalysisResult>);
    let enrichment = RwSignal::new(EnrichmentView::default());

    let show_save = RwSignal::new(false);
    let save_name = RwSignal::new(String::new());
    let save_description = RwSignal::new(String::new());

    let has_dataset = move || state.current_dataset_file.get().is_some();

    // 1. 抽出
    let on_extract = {
        let api = api.clone();
        move |_| {
            let request = match extract_request(
                &sic_text.get_untracked(),
                &counties_text.get_untracked(),
                force_refresh.get_untracked(),
            ) {
                Ok(request) => request,
                Err(e) => {
                    status.set(Some(StatusMessage::error(e.to_string())));
                    return;
                }
            };

            let api = api.clone();
            busy.set(true);
            status.set(Some(StatusMessage::loading("Extracting companies...")));
            spawn_local(async move {
                match api.extract(&request).await {
                    Ok(response) => {
                        tracing::info!(job_id = %response.job_id, "extract completed");
                        state.current_job_id.set(Some(response.job_id));
                        state.current_dataset_file.set(Some(response.current_dataset.clone()));
                        state.selected_sic_codes.set(request.sic_codes);
                        state.selected_counties.set(request.counties.unwrap_or_default());
                        analysis.set(None);
                        enrichment.set(EnrichmentView::default());
                        status.set(Some(StatusMessage::success(format!(
                            "Extraction complete: {}",
                            response.current_dataset
                        ))));
                    }
                    Err(e) => status.set(Some(StatusMessage::error(format!(
                        "Extraction failed: {}",
                        e
                    )))),
                }
                busy.set(false);
            });
        }
    };

    // 2. 解析
    let on_analyze = {
        let api = api.clone();
        move |_| {
            let Some(dataset_file) = state.current_dataset_file.get_untracked() else {
                status.set(Some(StatusMessage::error("Extract a dataset first")));
                return;
            };
            let api = api.clone();
            busy.set(true);
            status.set(Some(StatusMessage::loading("Analysing dataset...")));
            spawn_local(async move {
                match api.analyze_file(&dataset_file).await {
                    Ok(result) => {
                        analysis.set(Some(result));
                        status.set(None);
                    }
                    Err(e) => status.set(Some(StatusMessage::error(format!(
                        "Analysis failed: {}",
                        e
                    )))),
                }
                busy.set(false);
            });
        }
    };

    // 3. エンリッチ + ポーリング
    let on_enrich = {
        let api = api.clone();
        move |_| {
            let Some(dataset_file) = state.current_dataset_file.get_untracked() else {
                status.set(Some(StatusMessage::error("Extract a dataset first")));
                return;
            };
            let request = EnrichRequest {
                dataset_file,
                output_format: output_format.get_untracked(),
            };
            let api = api.clone();
            busy.set(true);
            enrichment.set(EnrichmentView::started());
            status.set(Some(StatusMessage::loading("Starting enrichment...")));
            spawn_local(async move {
                let job_id = match api.enrich(&request).await {
                    Ok(started) => started.job_id,
                    Err(e) => {
                        // ジョブは作られていないので抽出結果のダウンロードに戻す
                        enrichment.set(EnrichmentView::default());
                        status.set(Some(StatusMessage::error(format!(
                            "Enrichment failed to start: {}",
                            e
                        ))));
                        busy.set(false);
                        return;
                    }
                };
                state.current_job_id.set(Some(job_id.clone()));
                status.set(Some(StatusMessage::loading("Enriching companies...")));

                let outcome = poll_until_terminal(
                    &api,
                    &job_id,
                    poll_interval(),
                    |interval| TimeoutFuture::new(interval.as_millis() as u32),
                    |progress| enrichment.update(|v| v.apply(&PollStep::Continue(progress))),
                )
                .await;

                match outcome {
                    Ok(JobOutcome::Completed { result }) => {
                        enrichment.update(|v| v.apply(&PollStep::Completed(result)));
                        if let Some(output_file) = enrichment.get_untracked().output_file {
                            state.current_dataset_file.set(Some(output_file));
                        }
                        status.set(Some(StatusMessage::success("Enrichment complete")));
                    }
                    Ok(JobOutcome::Failed { error }) => {
                        enrichment.update(|v| v.apply(&PollStep::Failed(error.clone())));
                        status.set(Some(StatusMessage::error(format!(
                            "Enrichment failed: {}",
                            error
                        ))));
                    }
                    Err(e) => {
                        let message = format!("Status check failed: {}", e);
                        enrichment.update(|v| v.apply(&PollStep::Failed(message.clone())));
                        status.set(Some(StatusMessage::error(message)));
                    }
                }
                busy.set(false);
            });
        }
    };

    // 4. ダウンロード（抽出直後は生データ、エンリッチ後は結果）
    let on_download = {
        let api = api.clone();
        move |_| {
            let Some(job_id) = state.current_job_id.get_untracked() else {
                return;
            };
            let api = api.clone();
            spawn_local(async move {
                match api.download_job(&job_id, "csv").await {
                    Ok(file) => {
                        let saved = save_bytes(&file.bytes, &file.filename, &file.content_type);
                        if let Err(e) = saved {
                            status.set(Some(StatusMessage::error(format!(
                                "Download failed: {:?}",
                                e
                            ))));
                        }
                    }
                    Err(e) => status.set(Some(StatusMessage::error(format!(
                        "Download failed: {}",
                        e
                    )))),
                }
            });
        }
    };

    // 5. 保存
    let on_save = {
        let api = api.clone();
        move |_| {
            let name = save_name.get_untracked().trim().to_string();
            if name.is_empty() {
                status.set(Some(StatusMessage::error("Enter a dataset name")));
                return;
            }
            let Some(parquet_file) = state.current_dataset_file.get_untracked() else {
                status.set(Some(StatusMessage::error("Extract a dataset first")));
                return;
            };
            let counties = state.selected_counties.get_untracked();
            let description = save_description.get_untracked().trim().to_string();
            let request = SaveDatasetRequest {
                dataset_name: name,
                parquet_file,
                sic_codes: state.selected_sic_codes.get_untracked(),
                counties: if counties.is_empty() { None } else { Some(counties) },
                description: if description.is_empty() { None } else { Some(description) },
            };

            let api = api.clone();
            show_save.set(false);
            status.set(Some(StatusMessage::loading("Saving dataset...")));
            spawn_local(async move {
                match api.save_dataset(&request).await {
                    Ok(saved) => {
                        save_name.set(String::new());
                        save_description.set(String::new());
                        status.set(Some(StatusMessage::success(format!(
                            "Saved \"{}\" ({} companies)",
                            saved.dataset_name, saved.total_companies
                        ))));
                    }
                    Err(e) => status.set(Some(StatusMessage::error(format!("Save failed: {}", e)))),
                }
            });
        }
    };

    let enrich_progress = Signal::derive(move || enrichment.get().progress);
    let enrichment_started = move || enrichment.get().started;
    let download_visible = move || {
        let has_job = state.current_job_id.get().is_some();
        enrichment.with(|view| view.download_available(has_job))
    };

    view! {
        <div class="panel extract-panel">
            <div class="form-group">
                <label for="sic-codes">"SIC codes"</label>
                <input
                    type="text"
                    id="sic-codes"
                    placeholder="e.g. 43220, 43210"
                    prop:value=move || sic_text.get()
                    on:input=move |ev| sic_text.set(event_target_value(&ev))
                />
            </div>

            <div class="form-group">
                <label for="counties">"Counties (optional)"</label>
                <input
                    type="text"
                    id="counties"
                    placeholder="Comma separated, empty = all"
                    prop:value=move || counties_text.get()
                    on:input=move |ev| counties_text.set(event_target_value(&ev))
                />
                <RegionFilter counties_text=counties_text />
                <p class="text-muted">
                    {move || {
                        let n = parse_county_list(&counties_text.get()).len();
                        if n == 0 { "All counties".to_string() } else { format!("{} counties selected", n) }
                    }}
                </p>
            </div>

            <label class="checkbox">
                <input
                    type="checkbox"
                    prop:checked=move || force_refresh.get()
                    on:change=move |ev| force_refresh.set(event_target_checked(&ev))
                />
                "Ignore cached extract"
            </label>

            <div class="actions">
                <button class="btn btn-primary" disabled=move || busy.get() on:click=on_extract>
                    "Extract"
                </button>
                <button
                    class="btn btn-secondary"
                    disabled=move || busy.get() || !has_dataset()
                    on:click=on_analyze
                >
                    "Analyse"
                </button>
                <select
                    disabled=move || busy.get()
                    on:change=move |ev| {
                        if let Ok(format) = event_target_value(&ev).parse::<OutputFormat>() {
                            output_format.set(format);
                        }
                    }
                >
                    <option value="parquet" selected=move || output_format.get() == OutputFormat::Parquet>"Parquet"</option>
                    <option value="csv" selected=move || output_format.get() == OutputFormat::Csv>"CSV"</option>
                    <option value="xlsx" selected=move || output_format.get() == OutputFormat::Xlsx>"Excel"</option>
                </select>
                <button
                    class="btn btn-secondary"
                    disabled=move || busy.get() || !has_dataset()
                    on:click=on_enrich
                >
                    "Enrich"
                </button>
                <Show when=download_visible>
                    <button class="btn btn-secondary" on:click=on_download.clone()>
                        {move || if enrichment.get().download_ready { "Download enriched" } else { "Download" }}
                    </button>
                </Show>
                <button
                    class="btn btn-tertiary"
                    disabled=move || busy.get() || !has_dataset()
                    on:click=move |_| show_save.set(true)
                >
                    "Save as dataset"
                </button>
            </div>

            <StatusBox status=status />

            <Show when=enrichment_started>
                <ProgressBar progress=enrich_progress />
            </Show>

            {move || analysis.get().map(|result| view! { <AnalysisView analysis=result /> })}

            <Modal show=show_save title="Save dataset">
                <div class="form-group">
                    <label for="save-name">"Name"</label>
                    <input
                        type="text"
                        id="save-name"
                        prop:value=move || save_name.get()
                        on:input=move |ev| save_name.set(event_target_value(&ev))
                    />
                </div>
                <div class="form-group">
                    <label for="save-description">"Description"</label>
                    <textarea
                        id="save-description"
                        prop:value=move || save_description.get()
                        on:input=move |ev| save_description.set(event_target_value(&ev))
                    />
                </div>
                <button class="btn btn-primary" on:click=on_save.clone()>"Save"</button>
            </Modal>
        </div>
    }
}
