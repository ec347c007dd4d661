//! shipcsv - GAME DATA TO CSV CONVERTER
//!
//! 카테고리별로 받아 둔 JSON 게임 데이터를 매핑 파일에 따라 현지화된 CSV로
//! 변환하는 CLI 도구입니다.
//!
//! # 처리 흐름
//!
//! ```text
//! 원본 레코드 -> 매핑 + 경로 표현식 평가 -> 열거값 번역 -> 이름 치환 -> i18n 치환
//!            -> CSV 인코딩 (BOM) -> 카테고리별 파일 + 실행 보고서
//! ```
//!
//! # 주요 기능
//!
//! - 🗺️ **매핑 파일**: 출력 컬럼 -> 경로 표현식 (일반 경로, 연결식, 배열 결합식)
//! - 🈶 **현지화**: 함종/분류/국가 열거값 번역, 이름 프리셋, i18n 프리셋
//! - 🚀 **병렬 처리**: Rayon으로 카테고리별 독립 처리
//! - 📊 **상세 통계**: 성공/실패/데이터 없음 카테고리 수, 출력 행 수와 용량
//! - 🔍 **패턴 필터링**: glob 형식의 카테고리 필터링
//! - ✅ **매핑 검사**: 매핑 파일 유효성만 검사하는 모드
//!
//! # 예제
//!
//! ```bash
//! # 기본 사용법
//! shipcsv -i ./raw -o ./data
//!
//! # 매핑 검사만
//! shipcsv -i ./raw --validate-only
//! ```

pub mod cli;
pub mod encoder;
pub mod enums;
pub mod error;
pub mod expr;
pub mod logging;
pub mod mapping;
pub mod pattern;
pub mod preset;
pub mod source;
pub mod stats;
pub mod transform;
pub mod writer;

// Re-exports for convenient access
pub use cli::{Args, WriteMode};
pub use encoder::{encode, with_bom, UTF8_BOM};
pub use error::{Result, ShipCsvError};
pub use expr::{evaluate, ExprError, PathExpr};
pub use mapping::{MappingSpec, MappingStore};
pub use pattern::PatternMatcher;
pub use preset::{I18nPreset, NamePreset, PresetStore, Presets};
pub use source::{load_batch, CategoryRecords, DirectorySource, RecordSource};
pub use stats::{format_bytes, Statistics};
pub use transform::{transform, TransformOptions, TransformedRecord};
pub use writer::{BatchReport, BatchWriter, CategoryOutcome, WriterOptions};
