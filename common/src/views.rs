//! 画面表示用の整形
//!
//! データセット一覧の項目、SICコード入力の解析、解析結果のカード表示。

use crate::error::{Error, Result};
use crate::regions::parse_county_list;
use crate::types::{AnalysisResult, DatasetSummary, ExtractRequest};

// ============================================
// データセット一覧
// ============================================

/// 一覧の1項目（クリックで `id` の詳細を開く）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetListItem {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub description: Option<String>,
}

/// サマリのリストを一覧項目に（件数・順序はそのまま）
pub fn dataset_list_items(datasets: &[DatasetSummary]) -> Vec<DatasetListItem> {
    datasets.iter().map(dataset_list_item).collect()
}

pub fn dataset_list_item(dataset: &DatasetSummary) -> DatasetListItem {
    let mut parts = vec![format!("{} companies", dataset.total_companies)];
    if !dataset.sic_codes.is_empty() {
        parts.push(format!("SIC {}", dataset.sic_codes.join(", ")));
    }
    if let Some(created) = dataset.created_at.as_deref() {
        parts.push(short_date(created).to_string());
    }

    DatasetListItem {
        id: dataset.id,
        title: dataset.name.clone(),
        subtitle: parts.join(" · "),
        description: dataset.description.clone().filter(|d| !d.trim().is_empty()),
    }
}

/// 詳細ヘッダの項目（ラベル, 値）
pub fn dataset_header(dataset: &DatasetSummary) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Companies", dataset.total_companies.to_string()),
        ("SIC codes", or_dash(&dataset.sic_codes.join(", "))),
        (
            "Counties",
            dataset
                .counties
                .as_ref()
                .map(|c| or_dash(&c.join(", ")))
                .unwrap_or_else(|| "All".to_string()),
        ),
    ];
    if let Some(description) = dataset.description.as_deref().filter(|d| !d.is_empty()) {
        rows.push(("Description", description.to_string()));
    }
    if let Some(created) = dataset.created_at.as_deref() {
        rows.push(("Created", short_date(created).to_string()));
    }
    rows
}

/// ISO日時の日付部分
pub fn short_date(timestamp: &str) -> &str {
    timestamp.split(['T', ' ']).next().unwrap_or(timestamp)
}

fn or_dash(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

// ============================================
// SICコード
// ============================================

/// SICコード入力（カンマ・空白区切り）を解析
///
/// 各コードは4〜5桁の数字。重複は除去、1件以上必須。
pub fn parse_sic_codes(input: &str) -> Result<Vec<String>> {
    let mut codes: Vec<String> = Vec::new();
    let mut invalid: Vec<&str> = Vec::new();

    for token in input.split(|c: char| c == ',' || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }
        let valid = (4..=5).contains(&token.len()) && token.chars().all(|c| c.is_ascii_digit());
        if !valid {
            invalid.push(token);
        } else if !codes.iter().any(|c| c == token) {
            codes.push(token.to_string());
        }
    }

    if !invalid.is_empty() {
        return Err(Error::validation(format!(
            "Invalid SIC code(s): {} (expected 4-5 digits)",
            invalid.join(", ")
        )));
    }
    if codes.is_empty() {
        return Err(Error::validation("Enter at least one SIC code"));
    }
    Ok(codes)
}

/// 抽出フォームの入力からリクエストを作る（カウンティ空欄は全件）
pub fn extract_request(
    sic_input: &str,
    counties_input: &str,
    force_refresh: bool,
) -> Result<ExtractRequest> {
    let sic_codes = parse_sic_codes(sic_input)?;
    let counties = parse_county_list(counties_input);
    Ok(ExtractRequest {
        sic_codes,
        counties: if counties.is_empty() { None } else { Some(counties) },
        force_refresh,
    })
}

// ============================================
// 解析結果
// ============================================

/// 解析結果のサマリカード（ラベル, 値）
pub fn analysis_summary_cards(analysis: &AnalysisResult) -> Vec<(&'static str, String)> {
    vec![
        ("Total companies", analysis.summary.total_companies.to_string()),
        ("England companies", analysis.summary.total_england_companies.to_string()),
        ("Unique counties", analysis.summary.unique_counties.to_string()),
        ("Data quality", quality_label(analysis.data_quality_score)),
    ]
}

/// 品質スコアの表示（"87.5%"）
pub fn quality_label(score: f64) -> String {
    format!("{:.1}%", score)
}

/// カウンティ解決の内訳
pub fn county_resolution_rows(analysis: &AnalysisResult) -> Vec<(&'static str, u64)> {
    let r = &analysis.county_resolution;
    vec![
        ("From CSV", r.direct_from_csv),
        ("From postcode", r.resolved_from_postcode),
        ("Unresolvable", r.unresolvable),
    ]
}

/// 欠損データの内訳
pub fn missing_data_rows(analysis: &AnalysisResult) -> Vec<(&'static str, u64)> {
    vec![
        ("Missing postcode", analysis.missing_data.postcode_missing),
        ("Missing county", analysis.missing_data.county_missing),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalysisSummary, CountyResolution};

    fn dataset(id: i64, name: &str) -> DatasetSummary {
        DatasetSummary {
            id,
            name: name.to_string(),
            total_companies: 120,
            sic_codes: vec!["43220".to_string()],
            created_at: Some("2025-03-14T09:30:00".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_one_item_per_dataset_keyed_by_id() {
        let datasets = vec![
            dataset(3, "Plumbers NW"),
            dataset(9, "Roofers"),
            dataset(1, "Electricians"),
        ];
        let items = dataset_list_items(&datasets);

        assert_eq!(items.len(), 3);
        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 9, 1]);
        assert_eq!(items[1].title, "Roofers");
    }

    #[test]
    fn test_empty_list() {
        assert!(dataset_list_items(&[]).is_empty());
    }

    #[test]
    fn test_list_item_subtitle() {
        let item = dataset_list_item(&dataset(3, "Plumbers NW"));
        assert_eq!(item.subtitle, "120 companies · SIC 43220 · 2025-03-14");
        assert_eq!(item.description, None);
    }

    #[test]
    fn test_dataset_header_all_counties() {
        let rows = dataset_header(&dataset(3, "Plumbers NW"));
        assert!(rows.contains(&("Counties", "All".to_string())));
        assert!(rows.contains(&("Created", "2025-03-14".to_string())));
    }

    #[test]
    fn test_parse_sic_codes() {
        assert_eq!(
            parse_sic_codes("43220, 43210 4322 43220").unwrap(),
            vec!["43220", "43210", "4322"]
        );
    }

    #[test]
    fn test_parse_sic_codes_invalid() {
        let err = parse_sic_codes("43220, abc, 123").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(
            format!("{}", err),
            "Invalid SIC code(s): abc, 123 (expected 4-5 digits)"
        );
        assert!(parse_sic_codes(" , ").is_err());
    }

    #[test]
    fn test_extract_request() {
        let request = extract_request("43220", "Kent, Essex", false).unwrap();
        assert_eq!(request.sic_codes, vec!["43220"]);
        assert_eq!(request.counties, Some(vec!["Kent".to_string(), "Essex".to_string()]));

        let request = extract_request("43220", "  ", true).unwrap();
        assert_eq!(request.counties, None);
        assert!(request.force_refresh);
    }

    #[test]
    fn test_analysis_cards() {
        let analysis = AnalysisResult {
            summary: AnalysisSummary {
                total_companies: 200,
                total_england_companies: 180,
                unique_counties: 12,
                ..Default::default()
            },
            county_resolution: CountyResolution {
                direct_from_csv: 150,
                resolved_from_postcode: 25,
                unresolvable: 5,
            },
            data_quality_score: 87.5,
            ..Default::default()
        };

        let cards = analysis_summary_cards(&analysis);
        assert_eq!(cards[0], ("Total companies", "200".to_string()));
        assert_eq!(cards[3], ("Data quality", "87.5%".to_string()));
        assert_eq!(county_resolution_rows(&analysis)[1], ("From postcode", 25));
    }
}
