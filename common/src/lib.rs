//! Company Pipeline Common Library
//!
//! Web(WASM)とCLIで共有されるビューモデルと画面ロジック

pub mod api;
pub mod comparison;
pub mod download;
pub mod edit;
pub mod error;
pub mod letters;
pub mod polling;
pub mod regions;
pub mod search;
pub mod types;
pub mod views;

pub use comparison::DeltaReport;
pub use download::filename_from_content_disposition;
pub use edit::{CellEdit, EditOutcome, FlashBoard};
pub use error::{Error, Result};
pub use letters::{DataSource, LetterForm, OutputMode};
pub use polling::{poll_until_terminal, JobOutcome, JobStatusSource, Progress};
pub use regions::{counties_for_regions, ENGLAND_REGIONS};
pub use search::{check_query, Debouncer, QueryCheck};
pub use types::{AnalysisResult, Company, CompanyField, DatasetSummary, JobState, JobStatus};
