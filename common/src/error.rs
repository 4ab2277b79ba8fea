//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// HTTPステータスが非OK
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// `success: false` のレスポンス
    #[error("{0}")]
    Api(String),

    /// fetch自体の失敗（ネットワーク断など）
    #[error("Network error: {0}")]
    Transport(String),

    /// 送信前の入力チェック
    #[error("{0}")]
    Validation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// 入力チェックで弾かれたかどうか（リクエスト未送信）
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
