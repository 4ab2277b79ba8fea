use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 環境変数でAPIのベースURLを上書きする
pub const API_URL_ENV: &str = "COMPANY_PIPELINE_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub poll_interval_ms: u64,
    pub companies_limit: u32,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".into(),
            poll_interval_ms: company_pipeline_common::polling::POLL_INTERVAL_MS,
            companies_limit: 1000,
            timeout_seconds: 60,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PipelineError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("company-pipeline").join("config.json"))
    }

    /// 実際に使うベースURL（環境変数を優先）
    pub fn api_base_url(&self) -> String {
        self.resolve_api_base_url(std::env::var(API_URL_ENV).ok())
    }

    fn resolve_api_base_url(&self, env_value: Option<String>) -> String {
        env_value
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.api_base_url.clone())
            .trim()
            .trim_end_matches('/')
            .to_string()
    }

    pub fn set_api_base_url(&mut self, url: &str) -> Result<()> {
        let url = url.trim().trim_end_matches('/');
        let parsed = url::Url::parse(url)
            .map_err(|e| PipelineError::Config(format!("URLを解釈できません: {} ({})", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PipelineError::Config(format!(
                "URLは http:// または https:// で始めてください: {}",
                url
            )));
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(PipelineError::Config(format!("URLにホスト名がありません: {}", url)));
        }
        self.api_base_url = url.to_string();
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_override() {
        let config = Config::default();
        assert_eq!(config.resolve_api_base_url(None), "http://localhost:8000");
        assert_eq!(
            config.resolve_api_base_url(Some("https://pipeline.example.com/".into())),
            "https://pipeline.example.com"
        );
        assert_eq!(config.resolve_api_base_url(Some("  ".into())), "http://localhost:8000");
    }
}
