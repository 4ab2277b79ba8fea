//! 解析結果の表示
//!
//! サマリ → カウンティ解決 → 欠損データ → 地域分布 の順

use leptos::prelude::*;
use company_pipeline_common::types::{AnalysisResult, RegionDistribution};
use company_pipeline_common::views::{
    analysis_summary_cards, county_resolution_rows, missing_data_rows,
};

#[component]
pub fn AnalysisView(analysis: AnalysisResult) -> impl IntoView {
    let cards = analysis_summary_cards(&analysis);
    let resolution = county_resolution_rows(&analysis);
    let missing = missing_data_rows(&analysis);
    let regions = analysis.regional_distribution.clone();

    view! {
        <div class="analysis">
            <div class="summary-cards">
                {cards
                    .into_iter()
                    .map(|(label, value)| {
                        view! {
                            <div class="summary-card">
                                <div class="summary-value">{value}</div>
                                <div class="summary-label">{label}</div>
                            </div>
                        }
                    })
                    .collect_view()}
            </div>

            <div class="analysis-columns">
                <CountTable title="County resolution" rows=resolution />
                <CountTable title="Missing data" rows=missing />
            </div>

            <h4>"Regional distribution"</h4>
            {if regions.is_empty() {
                view! { <p class="text-muted">"No England companies in this dataset"</p> }.into_any()
            } else {
                view! { <RegionTable regions=regions /> }.into_any()
            }}
        </div>
    }
}

#[component]
fn CountTable(title: &'static str, rows: Vec<(&'static str, u64)>) -> impl IntoView {
    view! {
        <div class="count-table">
            <h4>{title}</h4>
            <table>
                <tbody>
                    {rows
                        .into_iter()
                        .map(|(label, count)| view! { <tr><td>{label}</td><td class="num">{count}</td></tr> })
                        .collect_view()}
                </tbody>
            </table>
        </div>
    }
}

#[component]
fn RegionTable(regions: Vec<RegionDistribution>) -> impl IntoView {
    view! {
        <table class="region-table">
            <thead>
                <tr>
                    <th>"Region"</th>
                    <th>"Code"</th>
                    <th class="num">"Companies"</th>
                    <th class="num">"Share"</th>
                    <th>"Counties"</th>
                </tr>
            </thead>
            <tbody>
                {regions
                    .into_iter()
                    .map(|r| {
                        let counties = r
                            .counties
                            .iter()
                            .map(|c| format!("{} ({})", c.county, c.count))
                            .collect::<Vec<_>>()
                            .join(", ");
                        view! {
                            <tr>
                                <td>{r.region}</td>
                                <td>{r.region_code}</td>
                                <td class="num">{r.count}</td>
                                <td class="num">{r.percentage}</td>
                                <td class="counties">{counties}</td>
                            </tr>
                        }
                    })
                    .collect_view()}
            </tbody>
        </table>
    }
}
