//! バックエンドREST APIの共通部分
//!
//! エンドポイントのパス生成と、レスポンス（`success` エンベロープ）の解釈。
//! HTTPの送受信自体はブラウザ側（gloo）とCLI側（reqwest）がそれぞれ持つ。

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// エンドポイントのパス（ベースURLは含まない）
pub mod endpoints {
    pub const DATASETS: &str = "/api/datasets";
    pub const SAVE_DATASET: &str = "/api/datasets/save";
    pub const EXTRACT: &str = "/api/extract";
    pub const ANALYZE: &str = "/api/analyze";
    pub const ENRICH: &str = "/api/enrich";
    pub const SEARCH: &str = "/api/search";
    pub const LETTERS_UPLOAD: &str = "/api/letters/generate/upload";
    pub const COMPARISON_FINAL: &str = "/api/comparison/analyze-final";

    pub fn dataset(id: i64) -> String {
        format!("/api/datasets/{}", id)
    }

    pub fn dataset_companies(id: i64) -> String {
        format!("/api/datasets/{}/companies", id)
    }

    pub fn dataset_analyze(id: i64) -> String {
        format!("/api/datasets/{}/analyze", id)
    }

    pub fn dataset_export(id: i64) -> String {
        format!("/api/datasets/{}/export", id)
    }

    pub fn company(id: i64) -> String {
        format!("/api/companies/{}", id)
    }

    pub fn job_status(job_id: &str) -> String {
        format!("/api/status/{}", job_id)
    }

    pub fn job_download(job_id: &str) -> String {
        format!("/api/download/{}", job_id)
    }

    pub fn letters_from_dataset(id: i64) -> String {
        format!("/api/letters/generate/dataset/{}", id)
    }
}

/// ベースURLとパスを結合（末尾スラッシュの重複を避ける）
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// エラーボディからメッセージを取り出す
///
/// 優先順位: `detail`（文字列 or FastAPIの検証エラー配列）→ `error` → `message`
pub fn error_message(body: &Value) -> Option<String> {
    for key in ["detail", "error", "message"] {
        match body.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Array(items)) if !items.is_empty() => {
                let joined = items
                    .iter()
                    .map(|item| {
                        item.get("msg")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                            .unwrap_or_else(|| item.to_string())
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                return Some(joined);
            }
            _ => {}
        }
    }
    None
}

/// HTTPステータスとボディ文字列からレスポンスを解釈
///
/// - 非2xx → `Error::Http`（ボディの detail/error があればそれを使う）
/// - `success: false` → `Error::Api`
/// - それ以外 → `T` にデシリアライズ
pub fn parse_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    "Request failed".to_string()
                } else {
                    trimmed.to_string()
                }
            });
        return Err(Error::Http { status, message });
    }

    let value: Value = serde_json::from_str(body)?;

    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = error_message(&value).unwrap_or_else(|| "Request failed".to_string());
        return Err(Error::Api(message));
    }

    Ok(serde_json::from_value(value)?)
}

/// バイナリレスポンスのステータスを確認（エクスポート、レター）
///
/// 失敗時はボディをJSONとして読んでメッセージを取り出す
pub fn check_binary_status(status: u16, error_body: &[u8]) -> Result<()> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    let message = serde_json::from_slice::<Value>(error_body)
        .ok()
        .as_ref()
        .and_then(error_message)
        .unwrap_or_else(|| format!("Download failed ({})", status));
    Err(Error::Http { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DatasetListResponse, MessageResponse};

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(endpoints::dataset(12), "/api/datasets/12");
        assert_eq!(endpoints::dataset_companies(3), "/api/datasets/3/companies");
        assert_eq!(endpoints::company(99), "/api/companies/99");
        assert_eq!(endpoints::job_status("ab12cd34"), "/api/status/ab12cd34");
        assert_eq!(
            endpoints::letters_from_dataset(5),
            "/api/letters/generate/dataset/5"
        );
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:8000/", "/api/datasets"),
            "http://localhost:8000/api/datasets"
        );
        assert_eq!(join_url("", "/api/search"), "/api/search");
    }

    #[test]
    fn test_parse_success() {
        let body =
            r#"{"success": true, "total": 1, "datasets": [{"id": 4, "name": "Plumbers NW"}]}"#;
        let response: DatasetListResponse = parse_response(200, body).unwrap();
        assert_eq!(response.datasets.len(), 1);
        assert_eq!(response.datasets[0].id, 4);
    }

    #[test]
    fn test_parse_success_false() {
        let body = r#"{"success": false, "error": "Dataset name already exists"}"#;
        let err = parse_response::<MessageResponse>(200, body).unwrap_err();
        assert!(matches!(err, Error::Api(ref m) if m == "Dataset name already exists"));
    }

    #[test]
    fn test_parse_http_error_detail() {
        let body = r#"{"detail": "Dataset not found"}"#;
        let err = parse_response::<MessageResponse>(404, body).unwrap_err();
        match err {
            Error::Http { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Dataset not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_http_error_validation_array() {
        let body = r#"{"detail": [{"loc": ["body", "sic_codes"], "msg": "field required"}]}"#;
        let err = parse_response::<MessageResponse>(422, body).unwrap_err();
        assert!(format!("{}", err).contains("field required"));
    }

    #[test]
    fn test_parse_http_error_plain_text() {
        let err = parse_response::<MessageResponse>(502, "Bad Gateway").unwrap_err();
        assert_eq!(format!("{}", err), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_response::<MessageResponse>(200, "<html>").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_check_binary_status() {
        assert!(check_binary_status(200, b"PK..").is_ok());

        let err =
            check_binary_status(400, br#"{"error": "Template must be a .docx file"}"#).unwrap_err();
        assert!(format!("{}", err).contains("Template must be a .docx file"));

        let err = check_binary_status(500, b"").unwrap_err();
        assert!(format!("{}", err).contains("Download failed (500)"));
    }
}
