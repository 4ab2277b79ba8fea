//! APIレスポンスのビューモデル
//!
//! サーバーが返すJSONをそのまま写した型。クライアント側では永続化しない:
//! - DatasetSummary / Company: データセット一覧・詳細
//! - AnalysisResult: 解析結果（サマリ、地域分布、欠損データ）
//! - JobStatus: 非同期ジョブ（エンリッチ）の状態
//! - Search*: 横断検索の結果

use serde::{Deserialize, Serialize};

// ============================================
// データセット
// ============================================

/// データセットの概要
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub total_companies: u64,
    #[serde(default)]
    pub sic_codes: Vec<String>,
    #[serde(default)]
    pub counties: Option<Vec<String>>,
    #[serde(default)]
    pub source_file: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// 企業レコード（フラットな約20フィールド）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Company {
    pub id: i64,
    pub company_number: Option<String>,
    pub business_name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub town: Option<String>,
    pub county: Option<String>,
    pub postcode: Option<String>,
    pub person_with_significant_control: Option<String>,
    pub nature_of_control: Option<String>,
    pub title: Option<String>,
    pub fname: Option<String>,
    pub sname: Option<String>,
    pub position: Option<String>,
    pub sic: Option<String>,
    pub company_status: Option<String>,
    pub company_type: Option<String>,
    pub date_of_creation: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website_address: Option<String>,
    pub address_match: Option<String>,
}

/// テーブルに表示する列
///
/// `editable()` が true の列だけ PATCH /api/companies/{id} で更新できる
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompanyField {
    CompanyNumber,
    BusinessName,
    AddressLine1,
    AddressLine2,
    Town,
    County,
    Postcode,
    Psc,
    NatureOfControl,
    Title,
    Fname,
    Sname,
    Position,
    Sic,
    CompanyStatus,
    Website,
    Phone,
    Email,
    WebsiteAddress,
    AddressMatch,
}

impl CompanyField {
    /// テーブルの列順
    pub const ALL: [CompanyField; 20] = [
        CompanyField::CompanyNumber,
        CompanyField::BusinessName,
        CompanyField::AddressLine1,
        CompanyField::AddressLine2,
        CompanyField::Town,
        CompanyField::County,
        CompanyField::Postcode,
        CompanyField::Psc,
        CompanyField::NatureOfControl,
        CompanyField::Title,
        CompanyField::Fname,
        CompanyField::Sname,
        CompanyField::Position,
        CompanyField::Sic,
        CompanyField::CompanyStatus,
        CompanyField::Website,
        CompanyField::Phone,
        CompanyField::Email,
        CompanyField::WebsiteAddress,
        CompanyField::AddressMatch,
    ];

    /// JSONキー名
    pub fn key(&self) -> &'static str {
        match self {
            CompanyField::CompanyNumber => "company_number",
            CompanyField::BusinessName => "business_name",
            CompanyField::AddressLine1 => "address_line1",
            CompanyField::AddressLine2 => "address_line2",
            CompanyField::Town => "town",
            CompanyField::County => "county",
            CompanyField::Postcode => "postcode",
            CompanyField::Psc => "person_with_significant_control",
            CompanyField::NatureOfControl => "nature_of_control",
            CompanyField::Title => "title",
            CompanyField::Fname => "fname",
            CompanyField::Sname => "sname",
            CompanyField::Position => "position",
            CompanyField::Sic => "sic",
            CompanyField::CompanyStatus => "company_status",
            CompanyField::Website => "website",
            CompanyField::Phone => "phone",
            CompanyField::Email => "email",
            CompanyField::WebsiteAddress => "website_address",
            CompanyField::AddressMatch => "address_match",
        }
    }

    /// 列見出し
    pub fn label(&self) -> &'static str {
        match self {
            CompanyField::CompanyNumber => "Company No.",
            CompanyField::BusinessName => "Business Name",
            CompanyField::AddressLine1 => "Address 1",
            CompanyField::AddressLine2 => "Address 2",
            CompanyField::Town => "Town",
            CompanyField::County => "County",
            CompanyField::Postcode => "Postcode",
            CompanyField::Psc => "PSC",
            CompanyField::NatureOfControl => "Nature of Control",
            CompanyField::Title => "Title",
            CompanyField::Fname => "First Name",
            CompanyField::Sname => "Surname",
            CompanyField::Position => "Position",
            CompanyField::Sic => "SIC",
            CompanyField::CompanyStatus => "Status",
            CompanyField::Website => "Website",
            CompanyField::Phone => "Phone",
            CompanyField::Email => "Email",
            CompanyField::WebsiteAddress => "Website Address",
            CompanyField::AddressMatch => "Address Match",
        }
    }

    /// サーバー側で更新を受け付ける列か
    pub fn editable(&self) -> bool {
        !matches!(
            self,
            CompanyField::CompanyNumber
                | CompanyField::Psc
                | CompanyField::NatureOfControl
                | CompanyField::Sic
        )
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.key() == key)
    }

    pub fn get<'a>(&self, company: &'a Company) -> Option<&'a str> {
        let value = match self {
            CompanyField::CompanyNumber => &company.company_number,
            CompanyField::BusinessName => &company.business_name,
            CompanyField::AddressLine1 => &company.address_line1,
            CompanyField::AddressLine2 => &company.address_line2,
            CompanyField::Town => &company.town,
            CompanyField::County => &company.county,
            CompanyField::Postcode => &company.postcode,
            CompanyField::Psc => &company.person_with_significant_control,
            CompanyField::NatureOfControl => &company.nature_of_control,
            CompanyField::Title => &company.title,
            CompanyField::Fname => &company.fname,
            CompanyField::Sname => &company.sname,
            CompanyField::Position => &company.position,
            CompanyField::Sic => &company.sic,
            CompanyField::CompanyStatus => &company.company_status,
            CompanyField::Website => &company.website,
            CompanyField::Phone => &company.phone,
            CompanyField::Email => &company.email,
            CompanyField::WebsiteAddress => &company.website_address,
            CompanyField::AddressMatch => &company.address_match,
        };
        value.as_deref()
    }

    pub fn set(&self, company: &mut Company, value: Option<String>) {
        let slot = match self {
            CompanyField::CompanyNumber => &mut company.company_number,
            CompanyField::BusinessName => &mut company.business_name,
            CompanyField::AddressLine1 => &mut company.address_line1,
            CompanyField::AddressLine2 => &mut company.address_line2,
            CompanyField::Town => &mut company.town,
            CompanyField::County => &mut company.county,
            CompanyField::Postcode => &mut company.postcode,
            CompanyField::Psc => &mut company.person_with_significant_control,
            CompanyField::NatureOfControl => &mut company.nature_of_control,
            CompanyField::Title => &mut company.title,
            CompanyField::Fname => &mut company.fname,
            CompanyField::Sname => &mut company.sname,
            CompanyField::Position => &mut company.position,
            CompanyField::Sic => &mut company.sic,
            CompanyField::CompanyStatus => &mut company.company_status,
            CompanyField::Website => &mut company.website,
            CompanyField::Phone => &mut company.phone,
            CompanyField::Email => &mut company.email,
            CompanyField::WebsiteAddress => &mut company.website_address,
            CompanyField::AddressMatch => &mut company.address_match,
        };
        *slot = value;
    }
}

// ============================================
// 解析結果
// ============================================

/// 解析結果（/api/analyze, /api/datasets/{id}/analyze, 比較）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    pub summary: AnalysisSummary,
    pub county_resolution: CountyResolution,
    pub missing_data: MissingData,
    pub regional_distribution: Vec<RegionDistribution>,
    pub data_quality_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSummary {
    pub total_companies: u64,
    pub total_england_companies: u64,
    pub unique_counties: u64,
    pub analysis_timestamp: Option<String>,
    pub dataset_file: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountyResolution {
    pub direct_from_csv: u64,
    pub resolved_from_postcode: u64,
    pub unresolvable: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissingData {
    pub postcode_missing: u64,
    pub county_missing: u64,
}

/// 地域ごとの件数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionDistribution {
    pub region: String,
    pub region_code: String,
    pub count: u64,
    /// サーバー側で整形済み（"12.5%"）
    pub percentage: String,
    pub counties: Vec<CountyCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountyCount {
    pub county: String,
    pub count: u64,
}

// ============================================
// ジョブ
// ============================================

/// ジョブ状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Processing,
    Running,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Processing => "processing",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Unknown => "unknown",
        }
    }
}

/// GET /api/status/{job_id}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_id: String,
    #[serde(rename = "type", default)]
    pub job_type: String,
    pub status: JobState,
    #[serde(default)]
    pub processed: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

// ============================================
// リクエスト / レスポンス
// ============================================

#[derive(Debug, Clone, Serialize)]
pub struct ExtractRequest {
    pub sic_codes: Vec<String>,
    pub counties: Option<Vec<String>>,
    /// サーバー側の抽出キャッシュを使わない
    pub force_refresh: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtractResponse {
    pub job_id: String,
    pub current_dataset: String,
    pub stages_completed: Vec<String>,
    pub stage_results: serde_json::Value,
    pub can_analyze: bool,
    pub can_enrich: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest {
    pub dataset_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisResponse {
    pub analysis: AnalysisResult,
}

/// エンリッチ結果の出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Parquet,
    Csv,
    Xlsx,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Parquet => "parquet",
            OutputFormat::Csv => "csv",
            OutputFormat::Xlsx => "xlsx",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "parquet" => Ok(OutputFormat::Parquet),
            "csv" => Ok(OutputFormat::Csv),
            "xlsx" | "excel" => Ok(OutputFormat::Xlsx),
            _ => Err(format!("Unknown format: {}. Use parquet, csv, or xlsx", s)),
        }
    }
}

/// データセットのエクスポート形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            _ => Err(format!("Unknown format: {}. Use csv or xlsx", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichRequest {
    pub dataset_file: String,
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrichStartResponse {
    pub job_id: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<JobState>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveDatasetRequest {
    pub dataset_name: String,
    pub parquet_file: String,
    pub sic_codes: Vec<String>,
    pub counties: Option<Vec<String>>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveDatasetResponse {
    pub dataset_id: i64,
    pub dataset_name: String,
    #[serde(default)]
    pub total_companies: u64,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetListResponse {
    #[serde(default)]
    pub total: u64,
    pub datasets: Vec<DatasetSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetResponse {
    pub dataset: DatasetSummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompaniesResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub returned: u64,
    pub companies: Vec<Company>,
}

/// メッセージのみのレスポンス（削除など）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageResponse {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PatchCompanyResponse {
    pub message: Option<String>,
    pub updated_fields: Vec<String>,
}

// ============================================
// 検索
// ============================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub total_matching: u64,
    pub returned: u64,
    pub datasets: Vec<SearchGroup>,
}

/// データセット単位にまとめた検索結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchGroup {
    pub dataset_id: i64,
    pub dataset_name: String,
    pub dataset_description: Option<String>,
    pub sic_codes: Option<Vec<String>>,
    pub counties: Option<Vec<String>>,
    pub created_at: Option<String>,
    pub companies: Vec<SearchHit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub company: Company,
    #[serde(default)]
    pub search_match_info: MatchInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchInfo {
    pub matched_fields: Vec<String>,
    pub match_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_deserialize_with_nulls() {
        let json = r#"{
            "id": 7,
            "company_number": "01234567",
            "business_name": "Acme Plumbing Ltd",
            "county": null,
            "postcode": "M1 1AA"
        }"#;

        let company: Company = serde_json::from_str(json).unwrap();
        assert_eq!(company.id, 7);
        assert_eq!(company.business_name.as_deref(), Some("Acme Plumbing Ltd"));
        assert_eq!(company.county, None);
        assert_eq!(company.phone, None);
    }

    #[test]
    fn test_company_field_get_set() {
        let mut company = Company::default();
        CompanyField::Town.set(&mut company, Some("Leeds".to_string()));
        assert_eq!(CompanyField::Town.get(&company), Some("Leeds"));

        CompanyField::Town.set(&mut company, None);
        assert_eq!(CompanyField::Town.get(&company), None);
    }

    #[test]
    fn test_company_field_keys_roundtrip() {
        for field in CompanyField::ALL {
            assert_eq!(CompanyField::from_key(field.key()), Some(field));
        }
        assert_eq!(CompanyField::from_key("unknown"), None);
    }

    #[test]
    fn test_read_only_fields() {
        assert!(!CompanyField::CompanyNumber.editable());
        assert!(!CompanyField::Sic.editable());
        assert!(CompanyField::County.editable());
        assert!(CompanyField::Email.editable());
    }

    #[test]
    fn test_job_status_deserialize_processing() {
        let json = r#"{"job_id": "ab12cd34", "type": "enrich", "status": "processing",
            "processed": 25, "total": 100}"#;
        let status: JobStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.status, JobState::Processing);
        assert_eq!(status.processed, Some(25));
        assert!(!status.status.is_terminal());
    }

    #[test]
    fn test_job_state_unknown() {
        let json = r#"{"job_id": "x", "status": "paused"}"#;
        let status: JobStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.status, JobState::Unknown);
    }

    #[test]
    fn test_analysis_result_empty_sections() {
        // 0件のときサーバーは空オブジェクトを返す
        let json = r#"{
            "summary": {"total_companies": 0, "total_england_companies": 0},
            "county_resolution": {},
            "missing_data": {},
            "regional_distribution": [],
            "data_quality_score": 0
        }"#;

        let analysis: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.summary.total_companies, 0);
        assert_eq!(analysis.county_resolution.unresolvable, 0);
        assert!(analysis.regional_distribution.is_empty());
    }

    #[test]
    fn test_search_hit_flatten() {
        let json = r#"{
            "id": 3,
            "business_name": "Leeds Bakery",
            "town": "Leeds",
            "search_match_info": {"matched_fields": ["business_name", "town"], "match_count": 2}
        }"#;

        let hit: SearchHit = serde_json::from_str(json).unwrap();
        assert_eq!(hit.company.id, 3);
        assert_eq!(hit.search_match_info.match_count, 2);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("excel".parse::<OutputFormat>().unwrap(), OutputFormat::Xlsx);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_enrich_request_serialize() {
        let request = EnrichRequest {
            dataset_file: "outputs/county_filtered/abc.parquet".to_string(),
            output_format: OutputFormat::Csv,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"output_format\":\"csv\""));
    }
}
