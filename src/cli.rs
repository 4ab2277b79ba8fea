use clap::{Args, Parser, Subcommand};
use company_pipeline_common::letters::OutputMode;
use company_pipeline_common::types::{ExportFormat, OutputFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "companies")]
#[command(about = "企業データ抽出・エンリッチ・レター生成パイプラインのクライアント", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 保存済みデータセットの操作
    Datasets {
        #[command(subcommand)]
        action: DatasetsCommand,
    },

    /// SICコードと州で企業を抽出
    Extract {
        /// SICコード（カンマ・空白区切り）
        #[arg(short, long, required = true)]
        sic: String,

        /// 州（カンマ区切り）
        #[arg(short, long)]
        counties: Option<String>,

        /// 地域名またはコード（複数指定可、州に展開される）
        #[arg(short, long)]
        region: Vec<String>,

        /// サーバー側のキャッシュを使わずに再抽出
        #[arg(long)]
        force_refresh: bool,
    },

    /// 直近の抽出結果を解析
    Analyze,

    /// 直近の抽出結果をエンリッチ
    Enrich {
        /// 出力形式 (parquet/csv/xlsx)
        #[arg(short, long, default_value = "parquet")]
        format: OutputFormat,

        /// 完了まで待たずに終了
        #[arg(long)]
        no_wait: bool,
    },

    /// 直近のジョブの状態を表示
    Status {
        /// 完了まで待つ
        #[arg(short, long)]
        wait: bool,
    },

    /// 直近のジョブの結果をダウンロード
    Download {
        /// 出力ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 直近の抽出結果をデータセットとして保存
    Save {
        /// データセット名
        #[arg(short, long, required = true)]
        name: String,

        /// 説明
        #[arg(short, long)]
        description: Option<String>,
    },

    /// 全データセットを横断検索
    Search {
        /// 検索語（2文字以上）
        #[arg(required = true)]
        query: String,

        /// 結果をCSVに書き出す
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// 企業レコードの1項目を更新
    Edit {
        /// データセットID
        #[arg(required = true)]
        dataset: i64,

        /// 企業ID
        #[arg(required = true)]
        company: i64,

        /// 項目名（例: email, phone, website）
        #[arg(required = true)]
        field: String,

        /// 新しい値（空文字で消去）
        #[arg(required = true)]
        value: String,
    },

    /// Wordテンプレートからレターを生成
    Letters(LettersArgs),

    /// データセットとエンリッチ後ファイルの解析結果を比較
    Compare {
        /// 比較元のデータセットID
        #[arg(short, long, conflicts_with = "current")]
        dataset: Option<i64>,

        /// 直近の抽出結果を比較元にする
        #[arg(long)]
        current: bool,

        /// エンリッチ後のファイル（CSV/Excel）
        #[arg(short, long, required = true)]
        file: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// APIのベースURLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
pub enum DatasetsCommand {
    /// 一覧
    List,

    /// 詳細と企業一覧
    Show {
        #[arg(required = true)]
        id: i64,

        /// 表示する企業数の上限（省略時は設定値）
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// 解析
    Analyze {
        #[arg(required = true)]
        id: i64,
    },

    /// CSV/Excelに書き出す
    Export {
        #[arg(required = true)]
        id: i64,

        /// 出力形式 (csv/xlsx)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// 出力ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 削除
    Delete {
        #[arg(required = true)]
        id: i64,

        /// 確認しない
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct LettersArgs {
    /// Wordテンプレート (.docx)
    #[arg(short, long, required = true)]
    pub template: PathBuf,

    /// データファイル (.xlsx/.xls/.csv)
    #[arg(long, conflicts_with = "dataset", required_unless_present = "dataset")]
    pub data: Option<PathBuf>,

    /// データセットID
    #[arg(long)]
    pub dataset: Option<i64>,

    /// 出力モード (zip/combined)
    #[arg(short, long, default_value = "zip")]
    pub mode: OutputMode,

    /// 1ファイルあたりのレター数（combinedのみ、既定5）
    #[arg(long)]
    pub letters_per_file: Option<u32>,

    /// 出力ディレクトリ
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
