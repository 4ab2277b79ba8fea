//! 横断検索
//!
//! - クエリの検証（2文字未満はリクエストしない）
//! - 入力のデバウンス（世代カウンタ方式）
//! - 検索結果のCSV出力

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{SearchGroup, SearchResponse};

/// デバウンス時間（ミリ秒）
pub const SEARCH_DEBOUNCE_MS: u32 = 300;

/// 最小文字数
pub const MIN_QUERY_LEN: usize = 2;

/// クエリ検証の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryCheck {
    /// 空 → 結果をクリアするだけ
    Empty,
    /// 短すぎる → 前の結果を消し、メッセージを出してリクエストしない
    TooShort,
    /// 検索可能（トリム済み）
    Ready(String),
}

impl QueryCheck {
    /// 表示中の結果を消すか（入力と食い違う古い結果を残さない）
    pub fn clears_results(&self) -> bool {
        !matches!(self, QueryCheck::Ready(_))
    }

    /// 利用者に出す案内
    pub fn hint(&self) -> Option<String> {
        match self {
            QueryCheck::TooShort => Some(format!("Enter at least {} characters", MIN_QUERY_LEN)),
            QueryCheck::Empty | QueryCheck::Ready(_) => None,
        }
    }
}

pub fn check_query(raw: &str) -> QueryCheck {
    let query = raw.trim();
    match query.chars().count() {
        0 => QueryCheck::Empty,
        n if n < MIN_QUERY_LEN => QueryCheck::TooShort,
        _ => QueryCheck::Ready(query.to_string()),
    }
}

/// CLIなどで即時検索する場合の検証
pub fn validate_query(raw: &str) -> Result<String> {
    match check_query(raw) {
        QueryCheck::Ready(q) => Ok(q),
        QueryCheck::Empty | QueryCheck::TooShort => Err(Error::validation(
            QueryCheck::TooShort.hint().unwrap_or_default(),
        )),
    }
}

/// 入力デバウンサ
///
/// キー入力ごとに `schedule()` で世代を進め、遅延後に `is_current()` が
/// true のタスクだけがリクエストを出す。
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しい入力を登録し、そのトークンを返す
    pub fn schedule(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// トークンがまだ最新か
    pub fn is_current(&self, token: u64) -> bool {
        let current = self.generation.load(Ordering::Relaxed) == token;
        if !current {
            tracing::trace!(token, "debounced search dropped");
        }
        current
    }

    /// 保留中の入力を無効化（空入力など）
    pub fn cancel(&self) {
        self.schedule();
    }
}

/// 結果の件数表示
pub fn summary_line(response: &SearchResponse) -> String {
    let shown: usize = response.datasets.iter().map(|g| g.companies.len()).sum();
    if response.total_matching == 0 || shown == 0 {
        return "No matching companies".to_string();
    }
    format!(
        "{} match{} across {} dataset{} (showing {})",
        response.total_matching,
        if response.total_matching == 1 { "" } else { "es" },
        response.datasets.len(),
        if response.datasets.len() == 1 { "" } else { "s" },
        shown
    )
}

/// グループの見出し
pub fn group_heading(group: &SearchGroup) -> String {
    format!("{} ({})", group.dataset_name, group.companies.len())
}

const CSV_HEADER: [&str; 8] = [
    "dataset_id",
    "dataset_name",
    "company_number",
    "business_name",
    "town",
    "county",
    "postcode",
    "matched_fields",
];

/// 検索結果をCSV文字列にする（RFC 4180のクォート）
pub fn results_to_csv(response: &SearchResponse) -> String {
    let mut out = String::new();
    push_row(&mut out, CSV_HEADER.iter().map(|s| s.to_string()));

    for group in &response.datasets {
        for hit in &group.companies {
            let c = &hit.company;
            push_row(
                &mut out,
                [
                    group.dataset_id.to_string(),
                    group.dataset_name.clone(),
                    c.company_number.clone().unwrap_or_default(),
                    c.business_name.clone().unwrap_or_default(),
                    c.town.clone().unwrap_or_default(),
                    c.county.clone().unwrap_or_default(),
                    c.postcode.clone().unwrap_or_default(),
                    hit.search_match_info.matched_fields.join(";"),
                ]
                .into_iter(),
            );
        }
    }
    out
}

/// エクスポート時のファイル名
pub fn csv_filename(query: &str) -> String {
    let slug: String = query
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "search_results.csv".to_string()
    } else {
        format!("search_{}.csv", slug)
    }
}

fn push_row(out: &mut String, fields: impl Iterator<Item = String>) {
    let row = fields.map(|f| escape_csv(&f)).collect::<Vec<_>>().join(",");
    out.push_str(&row);
    out.push_str("\r\n");
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Company, MatchInfo, SearchHit};

    #[test]
    fn test_check_query() {
        assert_eq!(check_query(""), QueryCheck::Empty);
        assert_eq!(check_query("   "), QueryCheck::Empty);
        assert_eq!(check_query("a"), QueryCheck::TooShort);
        assert_eq!(check_query(" a "), QueryCheck::TooShort);
        assert_eq!(check_query(" ab "), QueryCheck::Ready("ab".to_string()));
    }

    #[test]
    fn test_short_query_clears_results_with_hint() {
        let check = check_query("a");
        assert!(check.clears_results());
        assert_eq!(check.hint().as_deref(), Some("Enter at least 2 characters"));

        let empty = check_query("");
        assert!(empty.clears_results());
        assert_eq!(empty.hint(), None);

        let ready = check_query("ab");
        assert!(!ready.clears_results());
        assert_eq!(ready.hint(), None);
    }

    #[test]
    fn test_validate_query_rejects_single_char() {
        let err = validate_query("x").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(format!("{}", err), "Enter at least 2 characters");
    }

    #[test]
    fn test_debounce_only_last_keystroke_fires() {
        let debouncer = Debouncer::new();
        let mut requests = Vec::new();

        // "l", "le", "lee", "leed" を300ms以内に入力
        let typed = ["l", "le", "lee", "leed"];
        let tokens: Vec<(u64, &str)> = typed.iter().map(|q| (debouncer.schedule(), *q)).collect();

        // 遅延タスクが順に起きる
        for (token, query) in tokens {
            if !debouncer.is_current(token) {
                continue;
            }
            if let QueryCheck::Ready(q) = check_query(query) {
                requests.push(q);
            }
        }

        assert_eq!(requests, vec!["leed".to_string()]);
    }

    #[test]
    fn test_debounce_single_char_never_requests() {
        let debouncer = Debouncer::new();
        let token = debouncer.schedule();
        assert!(debouncer.is_current(token));
        assert_eq!(check_query("l"), QueryCheck::TooShort);
    }

    #[test]
    fn test_debounce_cancel() {
        let debouncer = Debouncer::new();
        let token = debouncer.schedule();
        debouncer.cancel();
        assert!(!debouncer.is_current(token));
    }

    #[test]
    fn test_debouncer_clones_share_generation() {
        let debouncer = Debouncer::new();
        let clone = debouncer.clone();
        let token = debouncer.schedule();
        clone.schedule();
        assert!(!debouncer.is_current(token));
    }

    fn sample_response() -> SearchResponse {
        SearchResponse {
            total_matching: 2,
            returned: 2,
            datasets: vec![SearchGroup {
                dataset_id: 4,
                dataset_name: "Plumbers, North West".to_string(),
                companies: vec![
                    SearchHit {
                        company: Company {
                            id: 1,
                            company_number: Some("01234567".to_string()),
                            business_name: Some("Leeds \"Best\" Plumbing".to_string()),
                            town: Some("Leeds".to_string()),
                            ..Default::default()
                        },
                        search_match_info: MatchInfo {
                            matched_fields: vec!["business_name".to_string(), "town".to_string()],
                            match_count: 2,
                        },
                    },
                    SearchHit {
                        company: Company {
                            id: 2,
                            business_name: Some("Aire Heating".to_string()),
                            town: Some("Leeds".to_string()),
                            ..Default::default()
                        },
                        search_match_info: MatchInfo {
                            matched_fields: vec!["town".to_string()],
                            match_count: 1,
                        },
                    },
                ],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_results_to_csv() {
        let csv = results_to_csv(&sample_response());
        let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "dataset_id,dataset_name,company_number,business_name,town,county,postcode,matched_fields"
        );
        assert_eq!(
            lines[1],
            "4,\"Plumbers, North West\",01234567,\"Leeds \"\"Best\"\" Plumbing\",Leeds,,,business_name;town"
        );
        assert_eq!(lines[2], "4,\"Plumbers, North West\",,Aire Heating,Leeds,,,town");
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(
            summary_line(&sample_response()),
            "2 matches across 1 dataset (showing 2)"
        );
        assert_eq!(summary_line(&SearchResponse::default()), "No matching companies");
    }

    #[test]
    fn test_csv_filename() {
        assert_eq!(csv_filename("Leeds plumbing"), "search_leeds_plumbing.csv");
        assert_eq!(csv_filename("!!"), "search_results.csv");
    }

    #[test]
    fn test_group_heading() {
        let response = sample_response();
        assert_eq!(group_heading(&response.datasets[0]), "Plumbers, North West (2)");
    }
}
