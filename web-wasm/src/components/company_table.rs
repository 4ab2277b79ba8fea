//! 企業テーブル（セル編集つき）
//!
//! 編集可能な列は <input>。change で PATCH し、失敗したら元の値に戻す。

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;
use gloo::timers::future::TimeoutFuture;
use web_sys::HtmlInputElement;
use company_pipeline_common::edit::{CellEdit, EditOutcome, FlashBoard, EDIT_FLASH_MS};
use company_pipeline_common::types::{Company, CompanyField};
use crate::api::ApiClient;
use crate::state::{StatusMessage, StatusSignal};

type FlashMap = RwSignal<FlashBoard>;

#[component]
pub fn CompanyTable(companies: RwSignal<Vec<Company>>, status: StatusSignal) -> impl IntoView {
    let api = expect_context::<ApiClient>();
    let flashes: FlashMap = RwSignal::new(FlashBoard::new());

    view! {
        <div class="table-wrapper">
            <table class="company-table">
                <thead>
                    <tr>
                        {CompanyField::ALL
                            .into_iter()
                            .map(|field| view! { <th>{field.label()}</th> })
                            .collect_view()}
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=move || companies.get()
                        key=|company| company.id
                        children=move |company: Company| {
                            view! {
                                <CompanyRow
                                    company=company
                                    api=api.clone()
                                    companies=companies
                                    flashes=flashes
                                    status=status
                                />
                            }
                        }
                    />
                </tbody>
            </table>
        </div>
    }
}

#[component]
fn CompanyRow(
    company: Company,
    api: ApiClient,
    companies: RwSignal<Vec<Company>>,
    flashes: FlashMap,
    status: StatusSignal,
) -> impl IntoView {
    let id = company.id;

    view! {
        <tr>
            {CompanyField::ALL
                .into_iter()
                .map(|field| {
                    let value = field.get(&company).unwrap_or_default().to_string();
                    if !field.editable() {
                        return view! { <td class="readonly">{value}</td> }.into_any();
                    }

                    let api = api.clone();

                    view! {
                        <td class=move || {
                            match flashes.with(|board| board.class(id, field)) {
                                Some(flash) => format!("editable {}", flash),
                                None => "editable".to_string(),
                            }
                        }>
                            <input
                                type="text"
                                value=value
                                on:change=move |ev| {
                                    let input = event_target::<HtmlInputElement>(&ev);
                                    submit_edit(
                                        api.clone(),
                                        input,
                                        id,
                                        field,
                                        companies,
                                        flashes,
                                        status,
                                    );
                                }
                            />
                        </td>
                    }
                    .into_any()
                })
                .collect_view()}
        </tr>
    }
}

fn submit_edit(
    api: ApiClient,
    input: HtmlInputElement,
    id: i64,
    field: CompanyField,
    companies: RwSignal<Vec<Company>>,
    flashes: FlashMap,
    status: StatusSignal,
) {
    let current = companies.with_untracked(|list| list.iter().find(|c| c.id == id).cloned());
    let Some(current) = current else {
        return;
    };

    let edit = match CellEdit::new(&current, field, &input.value()) {
        Ok(Some(edit)) => edit,
        Ok(None) => return,
        Err(e) => {
            input.set_value(field.get(&current).unwrap_or_default());
            status.set(Some(StatusMessage::error(e.to_string())));
            return;
        }
    };

    spawn_local(async move {
        let result = api.patch_company(edit.company_id, &edit.patch_body()).await;

        // DOMは入力済みなので再描画はしない
        let mut outcome = None;
        companies.update_untracked(|list| {
            if let Some(company) = list.iter_mut().find(|c| c.id == edit.company_id) {
                outcome = Some(edit.settle(company, &result));
            }
        });
        let Some(outcome) = outcome else {
            return;
        };

        if let EditOutcome::Reverted { text, message } = &outcome {
            input.set_value(text);
            status.set(Some(StatusMessage::error(format!("Update failed: {}", message))));
        }

        let (id, field) = (edit.company_id, edit.field);
        let mut generation = 0;
        flashes.update(|board| {
            generation = board.mark(id, field, outcome.flash_class());
        });
        TimeoutFuture::new(EDIT_FLASH_MS).await;
        flashes.update(|board| {
            board.clear_if_current(id, field, generation);
        });
    });
}
