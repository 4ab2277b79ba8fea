//! APIクライアントの結合テスト
//!
//! axumのスタブサーバーにJSONを返させて、レスポンスの解釈とポーリングを確認する

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use company_pipeline::client::ApiClient;
use company_pipeline_common::polling::{poll_until_terminal, JobOutcome};
use company_pipeline_common::types::ExportFormat;
use company_pipeline_common::Error;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// ルーターを空きポートで起動してベースURLを返す
async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{}", addr)
}

async fn list_datasets() -> Json<Value> {
    Json(json!({
        "success": true,
        "total": 2,
        "datasets": [
            {"id": 1, "name": "Plumbers", "total_companies": 120,
             "sic_codes": ["43220"], "counties": null},
            {"id": 2, "name": "Electricians", "total_companies": 80,
             "sic_codes": ["43210"], "counties": ["Kent"]}
        ]
    }))
}

async fn dataset_not_found(Path(_id): Path<i64>) -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({"detail": "Dataset not found"})))
}

async fn search(Query(params): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    match params.get("q").map(String::as_str) {
        Some("acme ltd") => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "total_matching": 1,
                "returned": 1,
                "datasets": [{
                    "dataset_id": 5,
                    "dataset_name": "Roofers",
                    "companies": [{
                        "id": 11,
                        "business_name": "Acme Ltd",
                        "search_match_info": {"matched_fields": ["business_name"], "match_count": 1}
                    }]
                }]
            })),
        ),
        Some("acme") => (StatusCode::OK, Json(json!({"success": false, "error": "No data found"}))),
        _ => (StatusCode::BAD_REQUEST, Json(json!({"detail": "bad query"}))),
    }
}

async fn export_csv(Path(_id): Path<i64>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"plumbers.csv\""),
        ],
        "id,name\n1,Acme\n",
    )
        .into_response()
}

async fn export_without_name(Path(_id): Path<i64>) -> Response {
    ([(header::CONTENT_TYPE, "application/octet-stream")], vec![0x50u8, 0x4b]).into_response()
}

/// 呼ばれた回数に応じて queued → processing → completed と進める
async fn staged_status(
    State(calls): State<Arc<AtomicUsize>>,
    Path(job_id): Path<String>,
) -> Json<Value> {
    let body = match calls.fetch_add(1, Ordering::SeqCst) {
        0 => json!({"job_id": job_id, "type": "enrich", "status": "queued"}),
        1 => json!({
            "job_id": job_id, "type": "enrich", "status": "processing",
            "processed": 50, "total": 100
        }),
        _ => json!({
            "job_id": job_id, "type": "enrich", "status": "completed", "total": 100,
            "result": {"output_file": format!("data/enriched_{}.parquet", job_id)}
        }),
    };
    Json(body)
}

async fn failed_status(Path(job_id): Path<String>) -> Json<Value> {
    Json(json!({
        "job_id": job_id, "type": "enrich", "status": "failed", "error": "quota exceeded"
    }))
}

#[tokio::test]
async fn test_list_datasets() {
    let base = serve(Router::new().route("/api/datasets", get(list_datasets))).await;

    let client = ApiClient::with_base_url(&base);
    let datasets = client.list_datasets().await.unwrap();

    assert_eq!(datasets.len(), 2);
    assert_eq!(datasets[0].name, "Plumbers");
    assert_eq!(datasets[1].counties, Some(vec!["Kent".to_string()]));
}

#[tokio::test]
async fn test_http_error_uses_detail() {
    let base = serve(Router::new().route("/api/datasets/:id", get(dataset_not_found))).await;

    let client = ApiClient::with_base_url(&base);
    let err = client.get_dataset(99).await.unwrap_err();

    match err {
        Error::Http { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Dataset not found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_success_false_is_error() {
    let base = serve(Router::new().route("/api/search", get(search))).await;

    let client = ApiClient::with_base_url(&base);
    let err = client.search("acme").await.unwrap_err();
    assert_eq!(err.to_string(), "No data found");
}

#[tokio::test]
async fn test_search_query_is_encoded() {
    let base = serve(Router::new().route("/api/search", get(search))).await;

    let client = ApiClient::with_base_url(&base);
    let response = client.search("acme ltd").await.unwrap();

    assert_eq!(response.total_matching, 1);
    let hit = &response.datasets[0].companies[0];
    assert_eq!(hit.company.business_name.as_deref(), Some("Acme Ltd"));
    assert_eq!(hit.search_match_info.matched_fields, vec!["business_name"]);
}

#[tokio::test]
async fn test_export_uses_content_disposition() {
    let base = serve(Router::new().route("/api/datasets/:id/export", get(export_csv))).await;

    let client = ApiClient::with_base_url(&base);
    let download = client.export_dataset(1, ExportFormat::Csv).await.unwrap();

    assert_eq!(download.filename, "plumbers.csv");
    assert_eq!(download.bytes, b"id,name\n1,Acme\n");

    let dir = tempfile::tempdir().unwrap();
    let path = download.save_in(dir.path()).unwrap();
    assert_eq!(std::fs::read(path).unwrap(), b"id,name\n1,Acme\n");
}

#[tokio::test]
async fn test_export_fallback_filename() {
    let base =
        serve(Router::new().route("/api/datasets/:id/export", get(export_without_name))).await;

    let client = ApiClient::with_base_url(&base);
    let download = client.export_dataset(8, ExportFormat::Xlsx).await.unwrap();
    assert_eq!(download.filename, "dataset_8.xlsx");
}

#[tokio::test]
async fn test_poll_until_completed() {
    let app = Router::new()
        .route("/api/status/:job_id", get(staged_status))
        .with_state(Arc::new(AtomicUsize::new(0)));
    let base = serve(app).await;

    let client = ApiClient::with_base_url(&base);
    let mut percents = Vec::new();
    let outcome =
        poll_until_terminal(&client, "j1", Duration::from_millis(1), tokio::time::sleep, |p| {
            percents.push(p.percent)
        })
        .await
        .unwrap();

    assert_eq!(outcome.output_file(), Some("data/enriched_j1.parquet"));
    assert_eq!(percents, vec![0, 50, 100]);
}

#[tokio::test]
async fn test_poll_until_failed() {
    let base = serve(Router::new().route("/api/status/:job_id", get(failed_status))).await;

    let client = ApiClient::with_base_url(&base);
    let outcome =
        poll_until_terminal(&client, "j2", Duration::from_millis(1), tokio::time::sleep, |_| {})
            .await
            .unwrap();

    assert_eq!(
        outcome,
        JobOutcome::Failed {
            error: "quota exceeded".to_string()
        }
    );
}

#[tokio::test]
async fn test_transport_error() {
    // 何も待ち受けていないポート
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::with_base_url(&format!("http://{}", addr));
    let err = client.list_datasets().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}
