//! 레코드 변환 모듈
//!
//! 원본 레코드 배열에 매핑을 적용해 평탄한 행으로 만든 뒤, 열거값 번역,
//! 이름 치환, i18n 치환을 차례로 적용합니다. 각 단계는 배치 전체에 대해
//! 끝난 뒤 다음 단계로 넘어갑니다.

use serde_json::{Map, Value};
use tracing::debug;

use crate::enums::translate_enums;
use crate::expr::resolve_path;
use crate::mapping::MappingSpec;
use crate::preset::{I18nPreset, NamePreset, Presets};

/// 변환된 한 행: 출력 컬럼 -> 값 (매핑 선언 순서)
pub type TransformedRecord = Map<String, Value>;

/// 치환 엄격도 옵션
///
/// 기본값은 기존 동작(모든 컬럼 이름 치환, 부분 문자열 i18n 치환)과 같습니다.
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// true면 i18n 토큰과 값이 정확히 같을 때만 치환
    pub strict_i18n: bool,
    /// 이름 치환을 적용할 컬럼 (None이면 전체)
    pub name_columns: Option<Vec<String>>,
}

impl TransformOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// i18n 정확 일치 모드 설정
    pub fn with_strict_i18n(mut self, strict: bool) -> Self {
        self.strict_i18n = strict;
        self
    }

    /// 이름 치환 대상 컬럼 설정
    pub fn with_name_columns(mut self, columns: Option<Vec<String>>) -> Self {
        self.name_columns = columns;
        self
    }

    fn names_apply_to(&self, column: &str) -> bool {
        match &self.name_columns {
            Some(columns) => columns.iter().any(|c| c == column),
            None => true,
        }
    }
}

/// 레코드 배열 변환
///
/// 결과 행의 컬럼 집합은 항상 매핑의 출력 컬럼과 같고, 행 순서는 입력 순서와 같습니다.
pub fn transform(
    records: &[Value],
    mapping: &MappingSpec,
    presets: &Presets,
    options: &TransformOptions,
) -> Vec<TransformedRecord> {
    let mut rows: Vec<TransformedRecord> = records
        .iter()
        .map(|record| evaluate_columns(record, mapping))
        .collect();

    for row in rows.iter_mut() {
        translate_enums(row);
    }

    for row in rows.iter_mut() {
        substitute_names(row, &presets.names, options);
    }

    if let Some(key_path) = mapping.i18n_key() {
        for (row, raw) in rows.iter_mut().zip(records) {
            substitute_i18n(row, raw, key_path, &presets.i18n, options);
        }
    }

    rows
}

/// 컬럼별 경로 표현식 평가. 실패한 컬럼만 null
fn evaluate_columns(record: &Value, mapping: &MappingSpec) -> TransformedRecord {
    let mut row = Map::with_capacity(mapping.columns().len());

    for column in mapping.columns() {
        let value = match &column.expr {
            Ok(expr) => expr.evaluate(record),
            Err(e) => {
                debug!(
                    category = mapping.category(),
                    column = %column.name,
                    error = %e,
                    "컬럼 평가 실패, null로 대체"
                );
                Value::Null
            }
        };
        row.insert(column.name.clone(), value);
    }

    row
}

/// 문자열 값을 소문자 토큰으로 이름 프리셋에서 찾아 치환
fn substitute_names(row: &mut TransformedRecord, names: &NamePreset, options: &TransformOptions) {
    if names.is_empty() {
        return;
    }

    for (column, value) in row.iter_mut() {
        if !options.names_apply_to(column) {
            continue;
        }
        let replacement = match value {
            Value::String(s) if !s.is_empty() => names.lookup(s).map(str::to_string),
            _ => None,
        };
        if let Some(zh) = replacement {
            *value = Value::String(zh);
        }
    }
}

/// 원본 레코드의 `i18nkey` 경로에 있는 토큰으로 행의 값을 치환
fn substitute_i18n(
    row: &mut TransformedRecord,
    raw: &Value,
    key_path: &str,
    i18n: &I18nPreset,
    options: &TransformOptions,
) {
    // 첫 점만 제거 (`.ids` -> `ids`, `.meta.ids` -> `meta.ids`)
    let path = key_path.replacen('.', "", 1);
    let Some(Value::Array(tokens)) = resolve_path(raw, &path) else {
        return;
    };

    for token in tokens.iter().filter_map(Value::as_str) {
        let Some(text) = i18n.lookup(token) else {
            continue;
        };

        for value in row.values_mut() {
            let hit = match value {
                Value::String(s) => s.as_str() == token || (!options.strict_i18n && s.contains(token)),
                _ => false,
            };
            if hit {
                *value = Value::String(text.to_string());
            }
        }
    }
}
