//! アプリケーション全体の共有状態
//!
//! コンテキストで配布し、各パネルから `expect_context::<AppState>()` で参照する。

use leptos::prelude::*;

/// タブ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Extract,
    Datasets,
    Letters,
    Search,
    Comparison,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Extract,
        Tab::Datasets,
        Tab::Letters,
        Tab::Search,
        Tab::Comparison,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Extract => "Extract & Enrich",
            Tab::Datasets => "Datasets",
            Tab::Letters => "Letters",
            Tab::Search => "Search",
            Tab::Comparison => "Comparison",
        }
    }
}

/// ステータス表示の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
    Loading,
}

impl StatusKind {
    pub fn class(&self) -> &'static str {
        match self {
            StatusKind::Info => "status status-info",
            StatusKind::Success => "status status-success",
            StatusKind::Error => "status status-error",
            StatusKind::Loading => "status status-loading",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Info, text: text.into() }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Error, text: text.into() }
    }

    pub fn loading(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Loading, text: text.into() }
    }
}

/// パネルごとのステータス欄
pub type StatusSignal = RwSignal<Option<StatusMessage>>;

/// 全パネル共有の状態
#[derive(Clone, Copy)]
pub struct AppState {
    pub active_tab: RwSignal<Tab>,
    pub current_job_id: RwSignal<Option<String>>,
    pub current_dataset_file: RwSignal<Option<String>>,
    pub selected_sic_codes: RwSignal<Vec<String>>,
    pub selected_counties: RwSignal<Vec<String>>,
    /// データセット画面で開いているID（検索結果から開く場合もここを書き換える）
    pub current_dataset_id: RwSignal<Option<i64>>,
    pub companies_limit: u32,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            active_tab: RwSignal::new(Tab::default()),
            current_job_id: RwSignal::new(None),
            current_dataset_file: RwSignal::new(None),
            selected_sic_codes: RwSignal::new(Vec::new()),
            selected_counties: RwSignal::new(Vec::new()),
            current_dataset_id: RwSignal::new(None),
            companies_limit: 1000,
        }
    }

    /// データセット詳細を開く
    pub fn open_dataset(&self, id: i64) {
        self.current_dataset_id.set(Some(id));
        self.active_tab.set(Tab::Datasets);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
