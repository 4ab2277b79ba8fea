use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("{0}")]
    Api(#[from] company_pipeline_common::Error),

    #[error("通信エラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("ジョブが失敗しました: {0}")]
    JobFailed(String),

    #[error("現在のジョブがありません。先に `companies extract` を実行してください")]
    NoCurrentJob,

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("入力エラー: {0}")]
    Prompt(#[from] dialoguer::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
