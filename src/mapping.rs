//! 카테고리별 매핑 파일 로딩 모듈
//!
//! 매핑 파일은 `{출력 컬럼: 경로 표현식}` 형태의 JSON 객체이며, 선택적으로
//! 예약 키 `i18nkey`에 i18n 토큰 배열의 경로를 담습니다. 컬럼 순서는 파일에
//! 선언된 순서를 그대로 따릅니다.

use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, ShipCsvError};
use crate::expr::{ExprError, PathExpr};

/// 출력 컬럼에서 제외되는 예약 키
pub const I18N_KEY: &str = "i18nkey";

/// 매핑 파일 이름 접미사 (`火炮mapping.json`)
pub const MAPPING_SUFFIX: &str = "mapping.json";

/// 출력 컬럼 하나
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    /// 출력 컬럼 이름
    pub name: String,
    /// 해석된 표현식. 실패하면 이 컬럼은 항상 null
    pub expr: std::result::Result<PathExpr, ExprError>,
}

/// 카테고리 하나의 매핑 명세
#[derive(Debug, Clone)]
pub struct MappingSpec {
    category: String,
    columns: Vec<ColumnSpec>,
    i18n_key: Option<String>,
}

impl MappingSpec {
    /// JSON 값에서 매핑 생성
    pub fn from_value(category: &str, value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(ShipCsvError::InvalidMapping {
                category: category.to_string(),
                reason: "매핑은 JSON 객체여야 합니다".to_string(),
            });
        };
        Self::from_map(category, map)
    }

    fn from_map(category: &str, map: Map<String, Value>) -> Result<Self> {
        let mut columns = Vec::with_capacity(map.len());
        let mut i18n_key = None;

        for (name, value) in map {
            if name == I18N_KEY {
                match value {
                    Value::String(path) => i18n_key = Some(path),
                    Value::Null => {}
                    other => {
                        return Err(ShipCsvError::InvalidMapping {
                            category: category.to_string(),
                            reason: format!("{} 값이 문자열이 아닙니다: {}", I18N_KEY, other),
                        })
                    }
                }
                continue;
            }

            columns.push(ColumnSpec {
                name,
                expr: PathExpr::from_value(&value),
            });
        }

        Ok(Self {
            category: category.to_string(),
            columns,
            i18n_key,
        })
    }

    /// 매핑 파일 내용 파싱. 파싱 실패는 `path`와 함께 보고
    fn parse_file(category: &str, path: &Path, content: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| ShipCsvError::MappingParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Self::from_value(category, value)
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// 선언 순서대로의 출력 컬럼 (`i18nkey` 제외)
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// 출력 컬럼 이름 목록 (CSV 헤더)
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// `i18nkey` 경로 (선행 점 포함, 파일에 적힌 그대로)
    pub fn i18n_key(&self) -> Option<&str> {
        self.i18n_key.as_deref()
    }
}

/// 매핑 파일이 들어 있는 폴더
#[derive(Debug, Clone)]
pub struct MappingStore {
    dir: PathBuf,
}

impl MappingStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 카테고리의 매핑 파일 경로
    pub fn path_for(&self, category: &str) -> PathBuf {
        self.dir.join(format!("{}{}", category, MAPPING_SUFFIX))
    }

    /// 카테고리 매핑 로드. 재시도하지 않습니다.
    pub fn load(&self, category: &str) -> Result<MappingSpec> {
        let path = self.path_for(category);

        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ShipCsvError::MappingNotFound {
                category: category.to_string(),
                path: path.clone(),
            },
            _ => ShipCsvError::MappingParse {
                path: path.clone(),
                reason: e.to_string(),
            },
        })?;

        MappingSpec::parse_file(category, &path, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_columns_keep_declaration_order() {
        let spec = MappingSpec::from_value(
            "火炮",
            json!({"名称": ".name", "i18nkey": ".ids", "舰种": ".type", "编号": "(.hull + .upgrade.air)"}),
        )
        .unwrap();

        assert_eq!(spec.column_names(), vec!["名称", "舰种", "编号"]);
        assert_eq!(spec.i18n_key(), Some(".ids"));
        assert_eq!(spec.category(), "火炮");
    }

    #[test]
    fn test_non_string_expression_is_column_local() {
        let spec = MappingSpec::from_value("x", json!({"a": ".a", "b": 3})).unwrap();
        assert!(spec.columns()[0].expr.is_ok());
        assert!(spec.columns()[1].expr.is_err());
    }

    #[test]
    fn test_non_object_mapping_is_invalid() {
        let result = MappingSpec::from_value("x", json!([".a"]));
        assert!(matches!(result, Err(ShipCsvError::InvalidMapping { .. })));
    }

    #[test]
    fn test_non_string_i18nkey_is_invalid() {
        let result = MappingSpec::from_value("x", json!({"a": ".a", "i18nkey": 1}));
        assert!(matches!(result, Err(ShipCsvError::InvalidMapping { .. })));
    }

    #[test]
    fn test_store_load() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("船体mapping.json"),
            r#"{"船体": ".upgrade.hull"}"#,
        )
        .unwrap();

        let store = MappingStore::new(temp_dir.path());
        let spec = store.load("船体").unwrap();
        assert_eq!(spec.column_names(), vec!["船体"]);
        assert!(spec.i18n_key().is_none());
    }

    #[test]
    fn test_store_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = MappingStore::new(temp_dir.path());

        let err = store.load("鱼雷").unwrap_err();
        assert!(matches!(err, ShipCsvError::MappingNotFound { .. }));
        assert!(err.to_string().contains("鱼雷"));
    }

    #[test]
    fn test_store_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("鱼雷mapping.json"), "{not json").unwrap();

        let store = MappingStore::new(temp_dir.path());
        match store.load("鱼雷") {
            Err(ShipCsvError::MappingParse { path, .. }) => {
                assert_eq!(path, temp_dir.path().join("鱼雷mapping.json"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
