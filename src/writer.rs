//! 카테고리별 CSV 일괄 쓰기 모듈
//!
//! 카테고리마다 매핑 로드 -> 변환 -> 인코딩 -> 저장을 수행하고 결과를 모읍니다.
//! 한 카테고리의 실패는 다른 카테고리 처리를 멈추지 않습니다.

use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::cli::WriteMode;
use crate::encoder::{encode, with_bom};
use crate::error::{Result, ShipCsvError};
use crate::mapping::MappingStore;
use crate::preset::PresetStore;
use crate::source::CategoryRecords;
use crate::transform::{transform, TransformOptions};

/// 쓰기 옵션
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// 기존 출력 파일 처리 방식
    pub mode: WriteMode,
    /// 파일 앞에 UTF-8 BOM을 붙일지 여부
    pub bom: bool,
    /// 변환 옵션
    pub transform: TransformOptions,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            mode: WriteMode::Overwrite,
            bom: true,
            transform: TransformOptions::default(),
        }
    }
}

impl WriterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_bom(mut self, bom: bool) -> Self {
        self.bom = bom;
        self
    }

    pub fn with_transform(mut self, transform: TransformOptions) -> Self {
        self.transform = transform;
        self
    }
}

/// 카테고리 하나의 처리 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CategoryOutcome {
    /// CSV 파일 저장 완료
    Written {
        path: PathBuf,
        rows: usize,
        bytes: u64,
    },
    /// 변환 결과가 비어 있어 파일을 쓰지 않음
    Empty,
    /// 매핑 로드, 인코딩, 저장 중 하나가 실패
    Failed { reason: String },
}

/// 일괄 쓰기 결과 요약
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// 저장에 성공한 카테고리 수
    pub success: usize,
    /// 실패한 카테고리 수
    pub failed: usize,
    /// 데이터가 없어 건너뛴 카테고리 수
    pub empty: usize,
    /// 저장된 파일 경로 (처리 순서)
    pub files: Vec<PathBuf>,
    /// (카테고리, 실패 사유)
    pub failures: Vec<(String, String)>,
    /// 데이터가 없던 카테고리
    pub empty_categories: Vec<String>,
    /// 원본을 가져오지 못해 쓰기 전에 빠진 (카테고리, 사유)
    pub unavailable: Vec<(String, String)>,
}

impl BatchReport {
    /// 결과 하나를 반영
    pub fn record(&mut self, category: &str, outcome: &CategoryOutcome) {
        match outcome {
            CategoryOutcome::Written { path, .. } => {
                self.success += 1;
                self.files.push(path.clone());
            }
            CategoryOutcome::Empty => {
                self.empty += 1;
                self.empty_categories.push(category.to_string());
            }
            CategoryOutcome::Failed { reason } => {
                self.failed += 1;
                self.failures.push((category.to_string(), reason.clone()));
            }
        }
    }

    /// 원본을 가져오지 못한 카테고리 반영. `total()`에는 포함되지 않습니다.
    pub fn record_unavailable(&mut self, category: &str, reason: &str) {
        self.unavailable
            .push((category.to_string(), reason.to_string()));
    }

    /// 처리한 카테고리 총 수
    pub fn total(&self) -> usize {
        self.success + self.failed + self.empty
    }
}

/// 카테고리별 CSV 작성기
pub struct BatchWriter<'a> {
    mappings: &'a MappingStore,
    presets: &'a PresetStore,
    output_dir: PathBuf,
    options: WriterOptions,
}

impl<'a> BatchWriter<'a> {
    pub fn new(
        mappings: &'a MappingStore,
        presets: &'a PresetStore,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            mappings,
            presets,
            output_dir: output_dir.into(),
            options: WriterOptions::default(),
        }
    }

    pub fn with_options(mut self, options: WriterOptions) -> Self {
        self.options = options;
        self
    }

    /// 카테고리의 출력 파일 경로
    pub fn output_path(&self, category: &str) -> PathBuf {
        self.output_dir.join(format!("{}.csv", category))
    }

    /// 모든 카테고리 처리
    pub fn write_all(&self, batch: &[CategoryRecords]) -> BatchReport {
        self.write_all_with(batch, |_, _| {})
    }

    /// 모든 카테고리 처리. 카테고리 하나가 끝날 때마다 `on_done` 호출
    ///
    /// 카테고리는 병렬로 처리되지만 보고서의 순서는 입력 순서를 따릅니다.
    pub fn write_all_with<F>(&self, batch: &[CategoryRecords], on_done: F) -> BatchReport
    where
        F: Fn(&str, &CategoryOutcome) + Sync,
    {
        let outcomes: Vec<CategoryOutcome> = batch
            .par_iter()
            .map(|entry| {
                let outcome = self.write_category(&entry.category, &entry.records);
                on_done(&entry.category, &outcome);
                outcome
            })
            .collect();

        let mut report = BatchReport::default();
        for (entry, outcome) in batch.iter().zip(&outcomes) {
            report.record(&entry.category, outcome);
        }
        report
    }

    /// 카테고리 하나 처리
    pub fn write_category(&self, category: &str, records: &[Value]) -> CategoryOutcome {
        let mapping = match self.mappings.load(category) {
            Ok(mapping) => mapping,
            Err(e) => {
                warn!(
                    category = %category,
                    path = %self.mappings.path_for(category).display(),
                    error = %e,
                    "매핑 파일 로드 실패"
                );
                return CategoryOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let rows = transform(
            records,
            &mapping,
            self.presets.get(),
            &self.options.transform,
        );

        let csv = match encode(&rows, &mapping.column_names()) {
            Ok(csv) => csv,
            Err(e) => {
                warn!(category = %category, error = %e, "CSV 인코딩 실패");
                return CategoryOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let path = self.output_path(category);
        if csv.is_empty() {
            info!(category = %category, path = %path.display(), "쓸 데이터가 없습니다");
            return CategoryOutcome::Empty;
        }

        let content = if self.options.bom { with_bom(&csv) } else { csv };

        match persist(&path, &content, self.options.mode) {
            Ok(()) => {
                debug!(category = %category, path = %path.display(), rows = rows.len(), "CSV 저장");
                CategoryOutcome::Written {
                    path,
                    rows: rows.len(),
                    bytes: content.len() as u64,
                }
            }
            Err(e) => {
                warn!(category = %category, path = %path.display(), error = %e, "CSV 쓰기 실패");
                CategoryOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// 출력 파일 저장
///
/// Error 모드에서는 `create_new`로 열어 이미 있는 파일을 덮어쓰지 않습니다.
fn persist(path: &Path, content: &str, mode: WriteMode) -> Result<()> {
    let write_error = |e: std::io::Error| ShipCsvError::WriteError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    match mode {
        WriteMode::Overwrite => fs::write(path, content).map_err(write_error),
        WriteMode::Error => {
            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
                .map_err(|e| match e.kind() {
                    ErrorKind::AlreadyExists => ShipCsvError::OutputExists {
                        path: path.to_path_buf(),
                    },
                    _ => write_error(e),
                })?;
            file.write_all(content.as_bytes()).map_err(write_error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::Presets;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (TempDir, MappingStore, PresetStore) {
        let temp_dir = TempDir::new().unwrap();
        let mapping_dir = temp_dir.path().join("mapping");
        fs::create_dir(&mapping_dir).unwrap();
        fs::write(
            mapping_dir.join("船体mapping.json"),
            r#"{"名称": ".name", "舰种": ".type"}"#,
        )
        .unwrap();
        (
            temp_dir,
            MappingStore::new(mapping_dir),
            PresetStore::preloaded(Presets::empty()),
        )
    }

    #[test]
    fn test_write_category_with_bom() {
        let (temp_dir, mappings, presets) = setup();
        let writer = BatchWriter::new(&mappings, &presets, temp_dir.path());

        let outcome = writer.write_category("船体", &[json!({"name": "Iowa", "type": "Battleship"})]);
        let path = temp_dir.path().join("船体.csv");
        assert!(matches!(outcome, CategoryOutcome::Written { rows: 1, .. }));

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "\u{FEFF}名称,舰种\nIowa,战列舰\n");
    }

    #[test]
    fn test_write_category_without_bom() {
        let (temp_dir, mappings, presets) = setup();
        let writer = BatchWriter::new(&mappings, &presets, temp_dir.path())
            .with_options(WriterOptions::new().with_bom(false));

        writer.write_category("船体", &[json!({"name": "Iowa"})]);
        let content = fs::read_to_string(temp_dir.path().join("船体.csv")).unwrap();
        assert_eq!(content, "名称,舰种\nIowa,\n");
    }

    #[test]
    fn test_empty_records_are_not_failures() {
        let (temp_dir, mappings, presets) = setup();
        let writer = BatchWriter::new(&mappings, &presets, temp_dir.path());

        assert_eq!(writer.write_category("船体", &[]), CategoryOutcome::Empty);
        assert!(!temp_dir.path().join("船体.csv").exists());
    }

    #[test]
    fn test_missing_mapping_fails_category() {
        let (temp_dir, mappings, presets) = setup();
        let writer = BatchWriter::new(&mappings, &presets, temp_dir.path());

        let outcome = writer.write_category("鱼雷", &[json!({"a": 1})]);
        assert!(matches!(outcome, CategoryOutcome::Failed { .. }));
    }

    #[test]
    fn test_error_mode_refuses_existing_file() {
        let (temp_dir, mappings, presets) = setup();
        fs::write(temp_dir.path().join("船体.csv"), "old").unwrap();
        let writer = BatchWriter::new(&mappings, &presets, temp_dir.path())
            .with_options(WriterOptions::new().with_mode(WriteMode::Error));

        let outcome = writer.write_category("船体", &[json!({"name": "Iowa"})]);
        assert!(matches!(outcome, CategoryOutcome::Failed { .. }));
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("船体.csv")).unwrap(),
            "old"
        );
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let (temp_dir, mappings, presets) = setup();
        let writer = BatchWriter::new(&mappings, &presets, temp_dir.path().join("absent"));

        let outcome = writer.write_category("船体", &[json!({"name": "Iowa"})]);
        match outcome {
            CategoryOutcome::Failed { reason } => assert!(reason.contains("船体.csv")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_report_keeps_input_order() {
        let (temp_dir, mappings, presets) = setup();
        let writer = BatchWriter::new(&mappings, &presets, temp_dir.path());

        let batch = vec![
            CategoryRecords {
                category: "鱼雷".into(),
                records: vec![json!({})],
            },
            CategoryRecords {
                category: "船体".into(),
                records: vec![json!({"name": "Iowa"})],
            },
            CategoryRecords {
                category: "船体".into(),
                records: vec![],
            },
        ];
        let report = writer.write_all(&batch);

        assert_eq!(report.success, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.empty, 1);
        assert_eq!(report.total(), 3);
        assert_eq!(report.failures[0].0, "鱼雷");
        assert_eq!(report.files, vec![temp_dir.path().join("船体.csv")]);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let value = serde_json::to_value(CategoryOutcome::Failed {
            reason: "x".to_string(),
        })
        .unwrap();
        assert_eq!(value, json!({"status": "failed", "reason": "x"}));
        assert_eq!(
            serde_json::to_value(CategoryOutcome::Empty).unwrap(),
            json!({"status": "empty"})
        );
    }

    #[test]
    fn test_write_failure_does_not_stop_other_categories() {
        let (temp_dir, mappings, presets) = setup();
        fs::write(
            temp_dir.path().join("mapping").join("鱼雷mapping.json"),
            r#"{"名称": ".name"}"#,
        )
        .unwrap();
        fs::write(temp_dir.path().join("船体.csv"), "old").unwrap();
        let writer = BatchWriter::new(&mappings, &presets, temp_dir.path())
            .with_options(WriterOptions::new().with_mode(WriteMode::Error));

        let batch = vec![
            CategoryRecords {
                category: "船体".into(),
                records: vec![json!({"name": "Iowa"})],
            },
            CategoryRecords {
                category: "鱼雷".into(),
                records: vec![json!({"name": "Type93"})],
            },
        ];
        let report = writer.write_all(&batch);

        assert_eq!(report.failed, 1);
        assert_eq!(report.success, 1);
        assert_eq!(report.failures[0].0, "船体");
        assert!(report.failures[0].1.contains("船体.csv"));
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("鱼雷.csv")).unwrap(),
            "\u{FEFF}名称\nType93\n"
        );
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("船体.csv")).unwrap(),
            "old"
        );
    }

    #[test]
    fn test_error_mode_writes_duplicate_category_once() {
        let (temp_dir, mappings, presets) = setup();
        let writer = BatchWriter::new(&mappings, &presets, temp_dir.path())
            .with_options(WriterOptions::new().with_mode(WriteMode::Error));

        let batch: Vec<CategoryRecords> = ["Iowa", "Yamato", "Bismarck", "Hood"]
            .iter()
            .map(|name| CategoryRecords {
                category: "船体".into(),
                records: vec![json!({"name": name})],
            })
            .collect();
        let report = writer.write_all(&batch);

        assert_eq!(report.success, 1);
        assert_eq!(report.failed, 3);
        assert!(report
            .failures
            .iter()
            .all(|(_, reason)| reason.contains("이미 존재")));
    }

    #[test]
    fn test_unavailable_categories_are_reported() {
        let mut report = BatchReport::default();
        report.record("船体", &CategoryOutcome::Empty);
        report.record_unavailable("反潜武器", "데이터 없음");

        assert_eq!(report.total(), 1);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["unavailable"], json!([["反潜武器", "데이터 없음"]]));
    }
}
