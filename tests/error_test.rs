//! エラーケーステスト
//!
//! PipelineErrorの表示と変換を検証

use company_pipeline::error::PipelineError;

/// PipelineErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        PipelineError::Config("テスト設定エラー".to_string()),
        PipelineError::FileNotFound("template.docx".to_string()),
        PipelineError::JobFailed("Enrichment failed".to_string()),
        PipelineError::NoCurrentJob,
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// NoCurrentJobは次に実行すべきコマンドを案内する
#[test]
fn test_no_current_job_message() {
    let display = PipelineError::NoCurrentJob.to_string();
    assert!(display.contains("companies extract"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: PipelineError = io_err.into();

    assert!(matches!(err, PipelineError::Io(_)));
    assert!(err.to_string().contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: PipelineError = json_err.into();

    assert!(matches!(err, PipelineError::JsonParse(_)));
}

/// APIエラーはサーバーのメッセージをそのまま表示する
#[test]
fn test_api_error_transparent() {
    let api_err = company_pipeline_common::Error::Http {
        status: 404,
        message: "Dataset not found".to_string(),
    };
    let err: PipelineError = api_err.into();

    assert!(matches!(err, PipelineError::Api(_)));
    assert_eq!(err.to_string(), "HTTP 404: Dataset not found");
}

/// 入力チェックのエラーも変換できる
#[test]
fn test_validation_error_conversion() {
    let err: PipelineError =
        company_pipeline_common::Error::validation("Enter at least 2 characters").into();
    assert_eq!(err.to_string(), "Enter at least 2 characters");
}
