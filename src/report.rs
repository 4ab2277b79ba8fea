//! 端末向けのテキスト整形

use company_pipeline_common::polling::{evaluate, PollStep};
use company_pipeline_common::types::{
    AnalysisResult, CompaniesResponse, CompanyField, DatasetSummary, JobStatus, SearchResponse,
};
use company_pipeline_common::views::{
    analysis_summary_cards, county_resolution_rows, dataset_header, dataset_list_items,
    missing_data_rows,
};
use company_pipeline_common::search::{group_heading, summary_line};
use std::fmt::Write;

/// 企業一覧で表示する列
const COMPANY_COLUMNS: [CompanyField; 5] = [
    CompanyField::BusinessName,
    CompanyField::Town,
    CompanyField::County,
    CompanyField::Postcode,
    CompanyField::Email,
];

pub fn dataset_list(datasets: &[DatasetSummary]) -> String {
    if datasets.is_empty() {
        return "保存済みのデータセットはありません\n".to_string();
    }
    let mut out = String::new();
    for item in dataset_list_items(datasets) {
        let _ = writeln!(out, "[{}] {}", item.id, item.title);
        let _ = writeln!(out, "     {}", item.subtitle);
        if let Some(description) = item.description {
            let _ = writeln!(out, "     {}", description);
        }
    }
    out
}

pub fn dataset_detail(dataset: &DatasetSummary, companies: &CompaniesResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (ID: {})", dataset.name, dataset.id);
    for (label, value) in dataset_header(dataset) {
        let _ = writeln!(out, "  {}: {}", label, value);
    }

    let shown = companies.returned.max(companies.companies.len() as u64);
    let _ = writeln!(out, "\n企業 {}/{}件", shown, companies.total);
    let header: Vec<&str> = COMPANY_COLUMNS.iter().map(|f| f.label()).collect();
    let _ = writeln!(out, "  id\t{}", header.join("\t"));
    for company in &companies.companies {
        let cells: Vec<&str> = COMPANY_COLUMNS
            .iter()
            .map(|f| f.get(company).unwrap_or("-"))
            .collect();
        let _ = writeln!(out, "  {}\t{}", company.id, cells.join("\t"));
    }
    out
}

pub fn analysis(result: &AnalysisResult) -> String {
    let mut out = String::new();
    for (label, value) in analysis_summary_cards(result) {
        let _ = writeln!(out, "  {}: {}", label, value);
    }

    let _ = writeln!(out, "\nCounty resolution");
    for (label, count) in county_resolution_rows(result) {
        let _ = writeln!(out, "  {}: {}", label, count);
    }

    let _ = writeln!(out, "\nMissing data");
    for (label, count) in missing_data_rows(result) {
        let _ = writeln!(out, "  {}: {}", label, count);
    }

    if !result.regional_distribution.is_empty() {
        let _ = writeln!(out, "\nRegions");
        for region in &result.regional_distribution {
            let _ = writeln!(
                out,
                "  {} ({}): {} {}",
                region.region, region.region_code, region.count, region.percentage
            );
        }
    }
    out
}

pub fn search(response: &SearchResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", summary_line(response));
    for group in &response.datasets {
        let _ = writeln!(out, "\n[{}] {}", group.dataset_id, group_heading(group));
        for hit in &group.companies {
            let company = &hit.company;
            let _ = writeln!(
                out,
                "  {} {} ({}) [{}]",
                company.company_number.as_deref().unwrap_or("-"),
                company.business_name.as_deref().unwrap_or("-"),
                company.postcode.as_deref().unwrap_or("-"),
                hit.search_match_info.matched_fields.join(", ")
            );
        }
    }
    out
}

/// `companies status` の1行表示
pub fn job_status(status: &JobStatus) -> String {
    match evaluate(status) {
        PollStep::Continue(progress) => format!(
            "{} ({}): {} {}",
            status.job_id,
            status.job_type,
            status.status.as_str(),
            progress.label()
        ),
        PollStep::Completed(_) => format!("{} ({}): completed", status.job_id, status.job_type),
        PollStep::Failed(error) => format!(
            "{} ({}): failed: {}",
            status.job_id,
            status.job_type,
            error
        ),
    }
}
