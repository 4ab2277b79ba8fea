//! 直近の抽出ジョブの記録
//!
//! `extract` → `analyze` / `enrich` / `save` をコマンド間で引き継ぐため、
//! 設定ファイルと同じディレクトリに session.json として保存する。

use crate::error::{PipelineError, Result};
use company_pipeline_common::types::ExtractRequest;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    /// ダウンロード・ステータスの対象ジョブ
    pub job_id: Option<String>,
    /// 抽出ジョブ（エンリッチ失敗時の戻し先）
    pub extract_job_id: Option<String>,
    /// 解析・エンリッチ・保存の対象ファイル（エンリッチ完了後は出力ファイル）
    pub dataset_file: Option<String>,
    pub sic_codes: Vec<String>,
    pub counties: Option<Vec<String>>,
    /// エンリッチ開始後、完了を確認するまでtrue
    pub enriching: bool,
}

impl Session {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::session_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::session_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn session_path() -> Result<PathBuf> {
        let config_path = crate::config::Config::config_path()?;
        let dir = config_path
            .parent()
            .ok_or_else(|| PipelineError::Config("設定ディレクトリが不正です".into()))?;
        Ok(dir.join("session.json"))
    }

    /// 抽出が成功したら以前のジョブ情報をすべて置き換える
    pub fn start_extract(&mut self, job_id: &str, dataset_file: &str, request: &ExtractRequest) {
        *self = Self {
            job_id: Some(job_id.to_string()),
            extract_job_id: Some(job_id.to_string()),
            dataset_file: Some(dataset_file.to_string()),
            sic_codes: request.sic_codes.clone(),
            counties: request.counties.clone(),
            enriching: false,
        };
    }

    pub fn require_job(&self) -> Result<&str> {
        self.job_id.as_deref().ok_or(PipelineError::NoCurrentJob)
    }

    pub fn require_dataset_file(&self) -> Result<&str> {
        self.dataset_file.as_deref().ok_or(PipelineError::NoCurrentJob)
    }

    /// ダウンロード・ステータスの対象をエンリッチジョブに切り替える
    pub fn start_enrich(&mut self, job_id: &str) {
        self.job_id = Some(job_id.to_string());
        self.enriching = true;
    }

    /// エンリッチ完了。以降の保存・解析は出力ファイルを対象にする
    pub fn finish_enrich(&mut self, output_file: Option<&str>) {
        self.enriching = false;
        if let Some(file) = output_file {
            self.dataset_file = Some(file.to_string());
        }
    }

    /// エンリッチ失敗。失敗したジョブは結果を返さないので抽出ジョブに戻す
    pub fn fail_enrich(&mut self) {
        self.enriching = false;
        if self.extract_job_id.is_some() {
            self.job_id = self.extract_job_id.clone();
        }
    }
}
