//! メインアプリケーションコンポーネント

use leptos::prelude::*;
use crate::api::ApiClient;
use crate::components::{
    comparison_panel::ComparisonPanel,
    datasets_panel::DatasetsPanel,
    extract_panel::ExtractPanel,
    header::Header,
    letters_panel::LettersPanel,
    search_panel::SearchPanel,
    tabs::{TabBar, TabPanel},
};
use crate::config::WebConfig;
use crate::state::{AppState, Tab};

#[component]
pub fn App() -> impl IntoView {
    let config = WebConfig::load();
    tracing::info!(api_base_url = %config.api_base_url, "app started");

    provide_context(ApiClient::new(&config.api_base_url));
    provide_context(AppState::new());

    view! {
        <div class="container">
            <Header config=config />
            <TabBar />

            <TabPanel tab=Tab::Extract>
                <ExtractPanel />
            </TabPanel>
            <TabPanel tab=Tab::Datasets>
                <DatasetsPanel />
            </TabPanel>
            <TabPanel tab=Tab::Letters>
                <LettersPanel />
            </TabPanel>
            <TabPanel tab=Tab::Search>
                <SearchPanel />
            </TabPanel>
            <TabPanel tab=Tab::Comparison>
                <ComparisonPanel />
            </TabPanel>
        </div>
    }
}
