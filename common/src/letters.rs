//! レター生成フォームの検証
//!
//! テンプレート（.docx）はデータソースに関わらず必須。

use crate::error::{Error, Result};

/// 出力モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// 1通1ファイル、ZIPにまとめる
    #[default]
    Zip,
    /// N通ずつ1つのDOCXにまとめる
    Combined,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Zip => "zip",
            OutputMode::Combined => "combined",
        }
    }

    /// 1ファイルあたりの通数の初期値
    pub fn default_letters_per_file(&self) -> u32 {
        match self {
            OutputMode::Zip => 1,
            OutputMode::Combined => 5,
        }
    }

    /// ダウンロード名のフォールバック
    pub fn fallback_filename(&self) -> &'static str {
        match self {
            OutputMode::Zip => "letters.zip",
            OutputMode::Combined => "letters.docx",
        }
    }
}

impl std::str::FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zip" => Ok(OutputMode::Zip),
            "combined" => Ok(OutputMode::Combined),
            _ => Err(format!("Unknown mode: {}. Use zip or combined", s)),
        }
    }
}

/// データソース
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSource {
    #[default]
    Upload,
    Dataset,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Upload => "upload",
            DataSource::Dataset => "dataset",
        }
    }
}

pub const TEMPLATE_REQUIRED: &str = "A .docx template is required";

const DATA_EXTENSIONS: [&str; 3] = [".xlsx", ".xls", ".csv"];

/// フォームの入力値（ファイルは名前だけで判定する）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LetterForm {
    pub source: DataSource,
    pub mode: OutputMode,
    /// Combined のときだけ使う
    pub letters_per_file: Option<u32>,
    pub data_file_name: Option<String>,
    pub template_file_name: Option<String>,
    pub dataset_id: Option<i64>,
}

/// 検証済みのリクエストパラメータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterParams {
    pub source: DataSource,
    pub mode: OutputMode,
    pub letters_per_file: u32,
    pub dataset_id: Option<i64>,
}

impl LetterParams {
    /// データセット版エンドポイントのクエリ
    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("mode", self.mode.as_str().to_string()),
            ("letters_per_file", self.letters_per_file.to_string()),
        ]
    }
}

impl LetterForm {
    /// 送信前の検証
    ///
    /// チェック順: テンプレート → テンプレート拡張子 → データソース → 通数
    pub fn validate(&self) -> Result<LetterParams> {
        let template = self
            .template_file_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| Error::validation(TEMPLATE_REQUIRED))?;
        if !has_extension(template, &[".docx"]) {
            return Err(Error::validation("Template must be a .docx file"));
        }

        let dataset_id = match self.source {
            DataSource::Upload => {
                let data = self
                    .data_file_name
                    .as_deref()
                    .filter(|n| !n.trim().is_empty())
                    .ok_or_else(|| Error::validation("Select a data file (.xlsx, .xls or .csv)"))?;
                if !has_extension(data, &DATA_EXTENSIONS) {
                    return Err(Error::validation(
                        "Data file must be Excel (.xlsx, .xls) or CSV (.csv)",
                    ));
                }
                None
            }
            DataSource::Dataset => Some(
                self.dataset_id
                    .ok_or_else(|| Error::validation("Select a dataset"))?,
            ),
        };

        let letters_per_file = match self.mode {
            OutputMode::Zip => 1,
            OutputMode::Combined => {
                let n = self
                    .letters_per_file
                    .unwrap_or_else(|| self.mode.default_letters_per_file());
                if n < 1 {
                    return Err(Error::validation("Letters per file must be at least 1"));
                }
                n
            }
        };

        Ok(LetterParams {
            source: self.source,
            mode: self.mode,
            letters_per_file,
            dataset_id,
        })
    }
}

fn has_extension(name: &str, extensions: &[&str]) -> bool {
    let lower = name.to_lowercase();
    extensions.iter().any(|ext| lower.ends_with(ext))
}

/// レスポンスヘッダから結果メッセージを作る
pub fn summary_message(
    filename: &str,
    total_letters: Option<&str>,
    files_created: Option<&str>,
) -> String {
    match (total_letters, files_created) {
        (Some(letters), Some(files)) => {
            format!("Generated {} letters in {} file(s): {}", letters, files, filename)
        }
        (Some(letters), None) => format!("Generated {} letters: {}", letters, filename),
        _ => format!("Letters generated: {}", filename),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload_form() -> LetterForm {
        LetterForm {
            source: DataSource::Upload,
            mode: OutputMode::Zip,
            letters_per_file: None,
            data_file_name: Some("companies.xlsx".to_string()),
            template_file_name: Some("letter.docx".to_string()),
            dataset_id: None,
        }
    }

    #[test]
    fn test_missing_template_blocks_upload_source() {
        let form = LetterForm {
            template_file_name: None,
            ..upload_form()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(format!("{}", err), TEMPLATE_REQUIRED);
    }

    #[test]
    fn test_missing_template_blocks_dataset_source() {
        let form = LetterForm {
            source: DataSource::Dataset,
            dataset_id: Some(3),
            data_file_name: None,
            template_file_name: None,
            ..upload_form()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(format!("{}", err), TEMPLATE_REQUIRED);
    }

    #[test]
    fn test_template_checked_before_data_file() {
        let form = LetterForm {
            data_file_name: None,
            template_file_name: Some("  ".to_string()),
            ..upload_form()
        };
        assert_eq!(format!("{}", form.validate().unwrap_err()), TEMPLATE_REQUIRED);
    }

    #[test]
    fn test_template_must_be_docx() {
        let form = LetterForm {
            template_file_name: Some("letter.doc".to_string()),
            ..upload_form()
        };
        assert!(form.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_data_file_extension() {
        let form = LetterForm {
            data_file_name: Some("companies.parquet".to_string()),
            ..upload_form()
        };
        assert!(form.validate().is_err());

        let form = LetterForm {
            data_file_name: Some("COMPANIES.CSV".to_string()),
            ..upload_form()
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_zip_mode_sends_one_per_file() {
        let form = LetterForm {
            letters_per_file: Some(9),
            ..upload_form()
        };
        assert_eq!(form.validate().unwrap().letters_per_file, 1);
    }

    #[test]
    fn test_combined_mode_defaults_to_five() {
        let form = LetterForm {
            mode: OutputMode::Combined,
            ..upload_form()
        };
        assert_eq!(form.validate().unwrap().letters_per_file, 5);

        let form = LetterForm {
            mode: OutputMode::Combined,
            letters_per_file: Some(0),
            ..upload_form()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_dataset_source_requires_id() {
        let form = LetterForm {
            source: DataSource::Dataset,
            dataset_id: None,
            ..upload_form()
        };
        assert_eq!(format!("{}", form.validate().unwrap_err()), "Select a dataset");
    }

    #[test]
    fn test_dataset_query() {
        let form = LetterForm {
            source: DataSource::Dataset,
            mode: OutputMode::Combined,
            letters_per_file: Some(10),
            dataset_id: Some(7),
            ..upload_form()
        };
        let params = form.validate().unwrap();
        assert_eq!(params.dataset_id, Some(7));
        assert_eq!(
            params.query(),
            vec![
                ("mode", "combined".to_string()),
                ("letters_per_file", "10".to_string())
            ]
        );
    }

    #[test]
    fn test_summary_message() {
        assert_eq!(
            summary_message("letters.zip", Some("42"), Some("42")),
            "Generated 42 letters in 42 file(s): letters.zip"
        );
        assert_eq!(summary_message("x.docx", None, None), "Letters generated: x.docx");
    }
}
