//! バックエンドREST APIクライアント（gloo-net）
//!
//! パス生成とレスポンス解釈は common::api に任せ、ここでは送受信だけを行う。

use company_pipeline_common::api::{self, endpoints};
use company_pipeline_common::download::{
    export_fallback_filename, filename_from_content_disposition, job_fallback_filename,
};
use company_pipeline_common::letters::LetterParams;
use company_pipeline_common::polling::JobStatusSource;
use company_pipeline_common::types::*;
use company_pipeline_common::{Error, Result};
use gloo::net::http::{Request, Response};
use serde::de::DeserializeOwned;
use web_sys::{File, FormData};

/// バイナリレスポンス（エクスポート、レター）
#[derive(Debug, Clone)]
pub struct Download {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// X-Total-Letters
    pub total_letters: Option<String>,
    /// X-Files-Created
    pub files_created: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        api::join_url(&self.base_url, path)
    }

    // ============================================
    // データセット
    // ============================================

    pub async fn list_datasets(&self) -> Result<Vec<DatasetSummary>> {
        let response = Request::get(&self.url(endpoints::DATASETS))
            .send()
            .await
            .map_err(transport)?;
        let list: DatasetListResponse = read_json(response).await?;
        Ok(list.datasets)
    }

    pub async fn get_dataset(&self, id: i64) -> Result<DatasetSummary> {
        let response = Request::get(&self.url(&endpoints::dataset(id)))
            .send()
            .await
            .map_err(transport)?;
        let detail: DatasetResponse = read_json(response).await?;
        Ok(detail.dataset)
    }

    pub async fn dataset_companies(&self, id: i64, limit: u32) -> Result<CompaniesResponse> {
        let response = Request::get(&self.url(&endpoints::dataset_companies(id)))
            .query([("limit", limit.to_string())])
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    pub async fn analyze_dataset(&self, id: i64) -> Result<AnalysisResult> {
        let response = Request::post(&self.url(&endpoints::dataset_analyze(id)))
            .send()
            .await
            .map_err(transport)?;
        let analysis: AnalysisResponse = read_json(response).await?;
        Ok(analysis.analysis)
    }

    pub async fn export_dataset(&self, id: i64, format: ExportFormat) -> Result<Download> {
        let response = Request::get(&self.url(&endpoints::dataset_export(id)))
            .query([("format", format.as_str())])
            .send()
            .await
            .map_err(transport)?;
        read_binary(response, &export_fallback_filename(id, format.as_str())).await
    }

    pub async fn delete_dataset(&self, id: i64) -> Result<MessageResponse> {
        let response = Request::delete(&self.url(&endpoints::dataset(id)))
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
        let response = Request::patch(&self.url(&endpoints::company(id)))
            .json(body)
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    pub async fn save_dataset(&self, request: &SaveDatasetRequest) -> Result<SaveDatasetResponse> {
        let response = Request::post(&self.url(endpoints::SAVE_DATASET))
            .json(request)
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    // ============================================
    // 抽出・解析・エンリッチ
    // ============================================

    pub async fn extract(&self, request: &ExtractRequest) -> Result<ExtractResponse> {
        let response = Request::post(&self.url(endpoints::EXTRACT))
            .json(request)
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    pub async fn analyze_file(&self, dataset_file: &str) -> Result<AnalysisResult> {
        let request = AnalyzeRequest {
            dataset_file: dataset_file.to_string(),
        };
        let response = Request::post(&self.url(endpoints::ANALYZE))
            .json(&request)
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        let analysis: AnalysisResponse = read_json(response).await?;
        Ok(analysis.analysis)
    }

    pub async fn enrich(&self, request: &EnrichRequest) -> Result<EnrichStartResponse> {
        let response = Request::post(&self.url(endpoints::ENRICH))
            .json(request)
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    pub async fn job_status(&self, job_id: &str) -> Result<JobStatus> {
        let response = Request::get(&self.url(&endpoints::job_status(job_id)))
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    pub async fn download_job(&self, job_id: &str, format: &str) -> Result<Download> {
        let response = Request::get(&self.url(&endpoints::job_download(job_id)))
            .query([("format", format)])
            .send()
            .await
            .map_err(transport)?;
        read_binary(response, &job_fallback_filename(job_id, format)).await
    }

    // ============================================
    // 検索
    // ============================================

    pub async fn search(&self, query: &str) -> Result<SearchResponse> {
        let response = Request::get(&self.url(endpoints::SEARCH))
            .query([("q", query)])
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    // ============================================
    // レター
    // ============================================

    /// アップロードしたデータファイルから生成
    pub async fn letters_from_upload(
        &self,
        data: &File,
        template: &File,
        params: &LetterParams,
    ) -> Result<Download> {
        let form = new_form()?;
        append_file(&form, "file", data)?;
        append_file(&form, "template", template)?;
        append_text(&form, "mode", params.mode.as_str())?;
        append_text(&form, "letters_per_file", &params.letters_per_file.to_string())?;

        let response = Request::post(&self.url(endpoints::LETTERS_UPLOAD))
            .body(form)
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        read_binary(response, params.mode.fallback_filename()).await
    }

    /// 保存済みデータセットから生成
    pub async fn letters_from_dataset(
        &self,
        dataset_id: i64,
        template: &File,
        params: &LetterParams,
    ) -> Result<Download> {
        let form = new_form()?;
        append_file(&form, "template", template)?;

        let query = params.query();
        let response = Request::post(&self.url(&endpoints::letters_from_dataset(dataset_id)))
            .query(query.iter().map(|(k, v)| (*k, v.as_str())))
            .body(form)
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        read_binary(response, params.mode.fallback_filename()).await
    }

    // ============================================
    // 比較
    // ============================================

    pub async fn analyze_final(&self, file: &File) -> Result<AnalysisResult> {
        let form = new_form()?;
        append_file(&form, "file", file)?;

        let response = Request::post(&self.url(endpoints::COMPARISON_FINAL))
            .body(form)
            .map_err(transport)?
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

fn transport(e: gloo::net::Error) -> Error {
    Error::Transport(e.to_string())
}

fn js_error(e: wasm_bindgen::JsValue) -> Error {
    Error::Transport(format!("{:?}", e))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await.map_err(transport)?;
    api::parse_response(status, &body)
}

async fn read_binary(response: Response, fallback: &str) -> Result<Download> {
    let status = response.status();
    let headers = response.headers();
    let bytes = response.binary().await.map_err(transport)?;
    api::check_binary_status(status, &bytes)?;

    let disposition = headers.get("content-disposition");
    Ok(Download {
        filename: filename_from_content_disposition(disposition.as_deref(), fallback),
        content_type: headers
            .get("content-type")
            .unwrap_or_else(|| "application/octet-stream".to_string()),
        bytes,
        total_letters: headers.get("x-total-letters"),
        files_created: headers.get("x-files-created"),
    })
}

fn new_form() -> Result<FormData> {
    FormData::new().map_err(js_error)
}

fn append_file(form: &FormData, name: &str, file: &File) -> Result<()> {
    form.append_with_blob_and_filename(name, file, &file.name())
        .map_err(js_error)
}

fn append_text(form: &FormData, name: &str, value: &str) -> Result<()> {
    form.append_with_str(name, value).map_err(js_error)
}
