//! Web側の設定
//!
//! APIのベースURLは既定で同一オリジン（空文字）。
//! 別ホストのバックエンドを使う場合だけ LocalStorage に保存する。

use gloo::storage::{LocalStorage, Storage};
use serde::{Deserialize, Serialize};

const STORAGE_KEY: &str = "company-pipeline.config";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub api_base_url: String,
}

impl WebConfig {
    pub fn load() -> Self {
        match LocalStorage::get::<WebConfig>(STORAGE_KEY) {
            Ok(config) => config,
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<(), String> {
        LocalStorage::set(STORAGE_KEY, self).map_err(|e| format!("設定の保存に失敗: {}", e))
    }

    pub fn clear() {
        LocalStorage::delete(STORAGE_KEY);
    }

    /// 入力値を正規化（前後空白と末尾スラッシュを除去）
    pub fn with_api_base_url(input: &str) -> Self {
        Self {
            api_base_url: input.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn is_same_origin(&self) -> bool {
        self.api_base_url.is_empty()
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_local_storage_roundtrip() {
        WebConfig::with_api_base_url("https://api.example.com/").save().unwrap();
        assert_eq!(WebConfig::load().api_base_url, "https://api.example.com");

        WebConfig::clear();
        assert!(WebConfig::load().is_same_origin());
    }
}
