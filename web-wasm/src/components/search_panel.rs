//! 横断検索
//!
//! 入力は300msデバウンス。2文字未満はリクエストしない。

use leptos::prelude::*;
use gloo::timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;
use company_pipeline_common::search::{
    check_query, csv_filename, group_heading, results_to_csv, summary_line, Debouncer, QueryCheck,
    SEARCH_DEBOUNCE_MS,
};
use company_pipeline_common::types::{SearchGroup, SearchResponse};
use crate::api::ApiClient;
use crate::components::status_box::StatusBox;
use crate::download::save_text;
use crate::state::{AppState, StatusMessage};

#[component]
pub fn SearchPanel() -> impl IntoView {
    let api = expect_context::<ApiClient>();

    let query = RwSignal::new(String::new());
    let results = RwSignal::new(None::<SearchResponse>);
    let status = RwSignal::new(None::<StatusMessage>);
    let debouncer = Debouncer::new();

    let on_input = move |raw: String| {
        query.set(raw.clone());
        let token = debouncer.schedule();

        let check = check_query(&raw);
        if check.clears_results() {
            results.set(None);
            status.set(check.hint().map(StatusMessage::info));
        }
        let QueryCheck::Ready(q) = check else {
            return;
        };

        let api = api.clone();
        let debouncer = debouncer.clone();
        spawn_local(async move {
            TimeoutFuture::new(SEARCH_DEBOUNCE_MS).await;
            if !debouncer.is_current(token) {
                return;
            }
            status.set(Some(StatusMessage::loading("Searching...")));
            match api.search(&q).await {
                Ok(response) => {
                    status.set(None);
                    results.set(Some(response));
                }
                Err(e) => status.set(Some(StatusMessage::error(format!("Search failed: {}", e)))),
            }
        });
    };

    let on_export = move |_| {
        let Some(response) = results.get_untracked() else {
            return;
        };
        let csv = results_to_csv(&response);
        let filename = csv_filename(&query.get_untracked());
        if let Err(e) = save_text(&csv, &filename, "text/csv;charset=utf-8") {
            status.set(Some(StatusMessage::error(format!("Export failed: {:?}", e))));
        }
    };

    let has_results =
        move || results.with(|r| r.as_ref().map(|r| !r.datasets.is_empty()).unwrap_or(false));

    view! {
        <div class="panel search-panel">
            <div class="form-group">
                <input
                    type="search"
                    class="search-input"
                    placeholder="Search company name, number, town, postcode..."
                    prop:value=move || query.get()
                    on:input=move |ev| on_input(event_target_value(&ev))
                />
            </div>

            <StatusBox status=status />

            {move || results.get().map(|r| view! { <p class="search-summary">{summary_line(&r)}</p> })}

            <Show when=has_results>
                <button class="btn btn-secondary btn-small" on:click=on_export>"Export CSV"</button>
                <For
                    each=move || results.get().map(|r| r.datasets).unwrap_or_default()
                    key=|group| group.dataset_id
                    children=|group| view! { <SearchGroupView group=group /> }
                />
            </Show>
        </div>
    }
}

#[component]
fn SearchGroupView(group: SearchGroup) -> impl IntoView {
    let state = expect_context::<AppState>();
    let id = group.dataset_id;
    let heading = group_heading(&group);

    view! {
        <div class="search-group">
            <h3 class="search-group-title" on:click=move |_| state.open_dataset(id)>
                {heading}
            </h3>
            {group.dataset_description.clone().map(|d| view! { <p class="text-muted">{d}</p> })}
            <ul class="search-hits">
                {group
                    .companies
                    .into_iter()
                    .map(|hit| {
                        let c = hit.company;
                        let location = [c.town.clone(), c.county.clone(), c.postcode.clone()]
                            .into_iter()
                            .flatten()
                            .collect::<Vec<_>>()
                            .join(", ");
                        view! {
                            <li class="search-hit">
                                <span class="hit-name">{c.business_name.unwrap_or_default()}</span>
                                <span class="hit-number">{c.company_number.unwrap_or_default()}</span>
                                <span class="hit-location text-muted">{location}</span>
                                {hit
                                    .search_match_info
                                    .matched_fields
                                    .into_iter()
                                    .map(|f| view! { <span class="badge">{f}</span> })
                                    .collect_view()}
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
        </div>
    }
}
