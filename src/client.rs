//! バックエンドREST APIクライアント（reqwest）
//!
//! パス生成とレスポンス解釈は common::api と共有する。

use std::path::Path;

use company_pipeline_common::api::{self, endpoints};
use company_pipeline_common::download::{
    export_fallback_filename, filename_from_content_disposition, job_fallback_filename,
};
use company_pipeline_common::letters::LetterParams;
use company_pipeline_common::polling::JobStatusSource;
use company_pipeline_common::types::*;
use company_pipeline_common::{Error, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::config::Config;

/// バイナリレスポンス
#[derive(Debug, Clone)]
pub struct Download {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub total_letters: Option<String>,
    pub files_created: Option<String>,
}

impl Download {
    /// `dir` にサーバー指定のファイル名で書き出す
    pub fn save_in(&self, dir: &Path) -> std::io::Result<std::path::PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> crate::error::Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url(),
        })
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        api::join_url(&self.base_url, path)
    }

    // ============================================
    // データセット
    // ============================================

    pub async fn list_datasets(&self) -> Result<Vec<DatasetSummary>> {
        let response = self
            .http
            .get(self.url(endpoints::DATASETS))
            .send()
            .await
            .map_err(transport)?;
        let list: DatasetListResponse = read_json(response).await?;
        Ok(list.datasets)
    }

    pub async fn get_dataset(&self, id: i64) -> Result<DatasetSummary> {
        let response = self
            .http
            .get(self.url(&endpoints::dataset(id)))
            .send()
            .await
            .map_err(transport)?;
        let detail: DatasetResponse = read_json(response).await?;
        Ok(detail.dataset)
    }

    pub async fn dataset_companies(&self, id: i64, limit: u32) -> Result<CompaniesResponse> {
        let response = self
            .http
            .get(self.url(&endpoints::dataset_companies(id)))
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    pub async fn analyze_dataset(&self, id: i64) -> Result<AnalysisResult> {
        let response = self
            .http
            .post(self.url(&endpoints::dataset_analyze(id)))
            .send()
            .await
            .map_err(transport)?;
        let analysis: AnalysisResponse = read_json(response).await?;
        Ok(analysis.analysis)
    }

    pub async fn export_dataset(&self, id: i64, format: ExportFormat) -> Result<Download> {
        let response = self
            .http
            .get(self.url(&endpoints::dataset_export(id)))
            .query(&[("format", format.as_str())])
            .send()
            .await
            .map_err(transport)?;
        read_binary(response, &export_fallback_filename(id, format.as_str())).await
    }

    pub async fn delete_dataset(&self, id: i64) -> Result<MessageResponse> {
        let response = self
            .http
            .delete(self.url(&endpoints::dataset(id)))
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    pub async fn patch_company(
        &self,
        id: i64,
        body: &serde_json::Value,
    ) -> Result<PatchCompanyResponse> {
        let response = self
            .http
            .patch(self.url(&endpoints::company(id)))
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    pub async fn save_dataset(&self, request: &SaveDatasetRequest) -> Result<SaveDatasetResponse> {
        let response = self
            .http
            .post(self.url(endpoints::SAVE_DATASET))
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    // ============================================
    // 抽出・解析・エンリッチ
    // ============================================

    pub async fn extract(&self, request: &ExtractRequest) -> Result<ExtractResponse> {
        let response = self
            .http
            .post(self.url(endpoints::EXTRACT))
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    pub async fn analyze_file(&self, dataset_file: &str) -> Result<AnalysisResult> {
        let request = AnalyzeRequest {
            dataset_file: dataset_file.to_string(),
        };
        let response = self
            .http
            .post(self.url(endpoints::ANALYZE))
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        let analysis: AnalysisResponse = read_json(response).await?;
        Ok(analysis.analysis)
    }

    pub async fn enrich(&self, request: &EnrichRequest) -> Result<EnrichStartResponse> {
        let response = self
            .http
            .post(self.url(endpoints::ENRICH))
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    pub async fn job_status(&self, job_id: &str) -> Result<JobStatus> {
        let response = self
            .http
            .get(self.url(&endpoints::job_status(job_id)))
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    pub async fn download_job(&self, job_id: &str, format: &str) -> Result<Download> {
        let response = self
            .http
            .get(self.url(&endpoints::job_download(job_id)))
            .query(&[("format", format)])
            .send()
            .await
            .map_err(transport)?;
        read_binary(response, &job_fallback_filename(job_id, format)).await
    }

    // ============================================
    // 検索
    // ============================================

    pub async fn search(&self, query: &str) -> Result<SearchResponse> {
        let response = self
            .http
            .get(self.url(endpoints::SEARCH))
            .query(&[("q", query)])
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    // ============================================
    // レター
    // ============================================

    pub async fn letters_from_upload(
        &self,
        data: &Path,
        template: &Path,
        params: &LetterParams,
    ) -> Result<Download> {
        let form = Form::new()
            .part("file", file_part(data).await?)
            .part("template", file_part(template).await?)
            .text("mode", params.mode.as_str())
            .text("letters_per_file", params.letters_per_file.to_string());

        let response = self
            .http
            .post(self.url(endpoints::LETTERS_UPLOAD))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        read_binary(response, params.mode.fallback_filename()).await
    }

    pub async fn letters_from_dataset(
        &self,
        dataset_id: i64,
        template: &Path,
        params: &LetterParams,
    ) -> Result<Download> {
        let form = Form::new().part("template", file_part(template).await?);

        let response = self
            .http
            .post(self.url(&endpoints::letters_from_dataset(dataset_id)))
            .query(&params.query())
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        read_binary(response, params.mode.fallback_filename()).await
    }

    // ============================================
    // 比較
    // ============================================

    pub async fn analyze_final(&self, file: &Path) -> Result<AnalysisResult> {
        let form = Form::new().part("file", file_part(file).await?);
        let response = self
            .http
            .post(self.url(endpoints::COMPARISON_FINAL))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        let analysis: AnalysisResponse = read_json(response).await?;
        Ok(analysis.analysis)
    }
}

impl JobStatusSource for ApiClient {
    async fn fetch_status(&self, job_id: &str) -> Result<JobStatus> {
        self.job_status(job_id).await
    }
}

fn transport(e: reqwest::Error) -> Error {
    Error::Transport(e.to_string())
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(transport)?;
    tracing::trace!(status, bytes = body.len(), "response received");
    api::parse_response(status, &body)
}

async fn read_binary(response: Response, fallback: &str) -> Result<Download> {
    let status = response.status().as_u16();
    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let disposition = header("content-disposition");
    let total_letters = header("x-total-letters");
    let files_created = header("x-files-created");

    let bytes = response.bytes().await.map_err(transport)?;
    api::check_binary_status(status, &bytes)?;

    Ok(Download {
        filename: filename_from_content_disposition(disposition.as_deref(), fallback),
        bytes: bytes.to_vec(),
        total_letters,
        files_created,
    })
}

async fn file_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::validation(format!("{}: {}", path.display(), e)))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Part::bytes(bytes).file_name(name))
}
