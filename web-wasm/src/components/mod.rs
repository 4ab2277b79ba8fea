//! UIコンポーネント

pub mod analysis_view;
pub mod company_table;
pub mod comparison_panel;
pub mod datasets_panel;
pub mod extract_panel;
pub mod header;
pub mod letters_panel;
pub mod modal;
pub mod progress_bar;
pub mod region_filter;
pub mod search_panel;
pub mod status_box;
pub mod tabs;
