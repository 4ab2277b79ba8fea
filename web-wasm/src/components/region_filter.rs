//! 地域フィルタ
//!
//! 地域を選ぶとカウンティ欄をその地域のカウンティ（和集合）で埋める。

use leptos::prelude::*;
use company_pipeline_common::regions::{counties_for_regions, format_county_list, ENGLAND_REGIONS};

#[component]
pub fn RegionFilter(counties_text: RwSignal<String>) -> impl IntoView {
    let selected = RwSignal::new(Vec::<&'static str>::new());

    let apply = move || {
        let counties = selected.with(|names| counties_for_regions(names.as_slice()));
        counties_text.set(format_county_list(&counties));
    };

    let on_clear = move |_| {
        selected.set(Vec::new());
        counties_text.set(String::new());
    };

    view! {
        <div class="region-filter">
            <span class="label">"Regions:"</span>
            {ENGLAND_REGIONS
                .iter()
                .map(|region| {
                    let name = region.name;
                    view! {
                        <label class="region-option">
                            <input
                                type="checkbox"
                                prop:checked=move || selected.with(|s| s.contains(&name))
                                on:change=move |ev| {
                                    let checked = event_target_checked(&ev);
                                    selected.update(|s| {
                                        s.retain(|n| *n != name);
                                        if checked {
                                            s.push(name);
                                        }
                                    });
                                    apply();
                                }
                            />
                            {name}
                        </label>
                    }
                })
                .collect_view()}
            <button class="btn btn-tertiary btn-small" on:click=on_clear>"Clear"</button>
        </div>
    }
}
