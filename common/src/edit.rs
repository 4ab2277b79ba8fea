//! テーブルのセル編集
//!
//! 編集 → PATCH /api/companies/{id} `{field: value}`
//! - 失敗: 編集前の値に戻し `cell-error` を付け、2秒後に外す
//! - 成功: `cell-saved` を2秒だけ付ける
//! - 値が変わっていなければリクエストしない

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::types::{Company, CompanyField};

/// 成功・失敗のクラスを外すまでの時間（ミリ秒）
pub const EDIT_FLASH_MS: u32 = 2000;

pub const CELL_ERROR_CLASS: &str = "cell-error";
pub const CELL_SAVED_CLASS: &str = "cell-saved";

/// 1セル分の編集
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEdit {
    pub company_id: i64,
    pub field: CompanyField,
    /// 編集前（戻し先）
    pub previous: Option<String>,
    /// 編集後（トリム済み、空ならNone）
    pub value: Option<String>,
}

impl CellEdit {
    /// 編集を作る。読み取り専用列はエラー、値が同じならNone
    pub fn new(company: &Company, field: CompanyField, input: &str) -> Result<Option<Self>> {
        if !field.editable() {
            return Err(Error::validation(format!("{} cannot be edited", field.label())));
        }
        let previous = field.get(company).map(str::to_string);
        let trimmed = input.trim();
        let value = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };

        if value == previous {
            tracing::trace!(company_id = company.id, field = field.key(), "cell unchanged");
            return Ok(None);
        }

        Ok(Some(Self {
            company_id: company.id,
            field,
            previous,
            value,
        }))
    }

    /// PATCHボディ（空欄はnull）
    pub fn patch_body(&self) -> Value {
        let mut body = Map::new();
        body.insert(
            self.field.key().to_string(),
            self.value.clone().map(Value::String).unwrap_or(Value::Null),
        );
        Value::Object(body)
    }

    /// 結果を反映し、セルに付けるクラスを返す
    pub fn settle<T>(&self, company: &mut Company, outcome: &Result<T>) -> EditOutcome {
        match outcome {
            Ok(_) => {
                self.field.set(company, self.value.clone());
                EditOutcome::Saved
            }
            Err(e) => {
                tracing::warn!(
                    company_id = self.company_id,
                    field = self.field.key(),
                    error = %e,
                    "cell edit failed"
                );
                self.field.set(company, self.previous.clone());
                EditOutcome::Reverted {
                    text: self.previous.clone().unwrap_or_default(),
                    message: e.to_string(),
                }
            }
        }
    }
}

/// 編集結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Saved,
    /// `text` はセルに戻す表示文字列
    Reverted { text: String, message: String },
}

impl EditOutcome {
    /// 一時的に付けるCSSクラス（EDIT_FLASH_MS 後に外す）
    pub fn flash_class(&self) -> &'static str {
        match self {
            EditOutcome::Saved => CELL_SAVED_CLASS,
            EditOutcome::Reverted { .. } => CELL_ERROR_CLASS,
        }
    }
}

/// セルごとの一時クラス
///
/// 同じセルを続けて編集したとき、古いタイマーが新しいクラスを消さないよう
/// 付けるたびに世代番号を振り、消すときに照合する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashBoard {
    cells: HashMap<(i64, CompanyField), (&'static str, u64)>,
    generation: u64,
}

impl FlashBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// クラスを付け、外すときに渡す世代番号を返す
    pub fn mark(&mut self, company_id: i64, field: CompanyField, class: &'static str) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.cells.insert((company_id, field), (class, self.generation));
        self.generation
    }

    pub fn class(&self, company_id: i64, field: CompanyField) -> Option<&'static str> {
        self.cells.get(&(company_id, field)).map(|(class, _)| *class)
    }

    /// 世代が一致するときだけ外す（後から付いたクラスは残す）
    pub fn clear_if_current(
        &mut self,
        company_id: i64,
        field: CompanyField,
        generation: u64,
    ) -> bool {
        let key = (company_id, field);
        match self.cells.get(&key) {
            Some((_, current)) if *current == generation => {
                self.cells.remove(&key);
                true
            }
            _ => {
                tracing::trace!(company_id, field = field.key(), generation, "stale flash timer");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company() -> Company {
        Company {
            id: 42,
            business_name: Some("Acme Plumbing".to_string()),
            county: Some("Lancashire".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_patch_body() {
        let edit = CellEdit::new(&company(), CompanyField::County, " Merseyside ")
            .unwrap()
            .unwrap();
        assert_eq!(edit.patch_body(), serde_json::json!({"county": "Merseyside"}));

        let cleared = CellEdit::new(&company(), CompanyField::County, "").unwrap().unwrap();
        assert_eq!(cleared.patch_body(), serde_json::json!({"county": null}));
    }

    #[test]
    fn test_unchanged_value_sends_nothing() {
        assert_eq!(CellEdit::new(&company(), CompanyField::County, "Lancashire ").unwrap(), None);
        assert_eq!(CellEdit::new(&company(), CompanyField::Phone, "  ").unwrap(), None);
    }

    #[test]
    fn test_read_only_field_rejected() {
        let err = CellEdit::new(&company(), CompanyField::CompanyNumber, "123").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_failed_edit_reverts() {
        let mut row = company();
        let edit = CellEdit::new(&row, CompanyField::County, "Merseyside").unwrap().unwrap();

        // 楽観的にセルの値を書き換えた後で失敗が返る
        CompanyField::County.set(&mut row, edit.value.clone());
        let outcome = edit.settle::<()>(
            &mut row,
            &Err(Error::Http {
                status: 500,
                message: "Database locked".to_string(),
            }),
        );

        assert_eq!(
            outcome,
            EditOutcome::Reverted {
                text: "Lancashire".to_string(),
                message: "HTTP 500: Database locked".to_string()
            }
        );
        assert_eq!(outcome.flash_class(), "cell-error");
        assert_eq!(row.county.as_deref(), Some("Lancashire"));
    }

    #[test]
    fn test_successful_edit_is_kept() {
        let mut row = company();
        let edit = CellEdit::new(&row, CompanyField::BusinessName, "Acme Heating")
            .unwrap()
            .unwrap();
        let outcome = edit.settle(&mut row, &Ok(()));
        assert_eq!(outcome, EditOutcome::Saved);
        assert_eq!(outcome.flash_class(), "cell-saved");
        assert_eq!(row.business_name.as_deref(), Some("Acme Heating"));
    }

    #[test]
    fn test_stale_timer_keeps_newer_flash() {
        let mut board = FlashBoard::new();

        // 1回目の失敗、2秒以内に2回目の保存が成功
        let first = board.mark(42, CompanyField::County, CELL_ERROR_CLASS);
        let second = board.mark(42, CompanyField::County, CELL_SAVED_CLASS);
        assert_eq!(board.class(42, CompanyField::County), Some("cell-saved"));

        // 1回目のタイマーが先に起きても2回目のクラスは残る
        assert!(!board.clear_if_current(42, CompanyField::County, first));
        assert_eq!(board.class(42, CompanyField::County), Some("cell-saved"));

        assert!(board.clear_if_current(42, CompanyField::County, second));
        assert_eq!(board.class(42, CompanyField::County), None);
    }

    #[test]
    fn test_flash_cells_are_independent() {
        let mut board = FlashBoard::new();
        let county = board.mark(42, CompanyField::County, CELL_SAVED_CLASS);
        board.mark(42, CompanyField::Phone, CELL_ERROR_CLASS);
        board.mark(7, CompanyField::County, CELL_ERROR_CLASS);

        assert!(board.clear_if_current(42, CompanyField::County, county));
        assert_eq!(board.class(42, CompanyField::Phone), Some("cell-error"));
        assert_eq!(board.class(7, CompanyField::County), Some("cell-error"));
    }

    #[test]
    fn test_flash_delay() {
        assert_eq!(EDIT_FLASH_MS, 2000);
    }
}
