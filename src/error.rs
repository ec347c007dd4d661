//! 에러 타입 정의 모듈
//!
//! shipcsv에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! 컬럼 단위 평가 실패는 [`crate::expr::ExprError`]로 따로 다루며,
//! 여기에는 카테고리 단위 이상의 실패만 모여 있습니다.

use std::path::PathBuf;
use thiserror::Error;

/// shipcsv에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum ShipCsvError {
    /// 입력 폴더가 존재하지 않음
    #[error("입력 폴더를 찾을 수 없습니다: {path}")]
    InputNotFound { path: PathBuf },

    /// 입력이 폴더가 아님
    #[error("입력 경로가 폴더가 아닙니다: {path}")]
    NotADirectory { path: PathBuf },

    /// 카테고리 매핑 파일 없음
    #[error("매핑 파일을 찾을 수 없습니다 ({category}): {path}")]
    MappingNotFound { category: String, path: PathBuf },

    /// 매핑 파일 JSON 파싱 실패
    #[error("매핑 파일 파싱 실패 ({path}): {reason}")]
    MappingParse { path: PathBuf, reason: String },

    /// 매핑 구조가 올바르지 않음
    #[error("잘못된 매핑 ({category}): {reason}")]
    InvalidMapping { category: String, reason: String },

    /// 원본 레코드 파일 열기 실패
    #[error("파일을 열 수 없습니다 ({file}): {reason}")]
    SourceOpen { file: PathBuf, reason: String },

    /// 원본 레코드 JSON 파싱 실패
    #[error("JSON 파싱 실패 ({file}): {reason}")]
    SourceParse { file: PathBuf, reason: String },

    /// 원본 레코드가 배열이 아님
    #[error("레코드 데이터가 배열이 아닙니다: {file}")]
    SourceNotArray { file: PathBuf },

    /// CSV 인코딩 실패
    #[error("CSV 인코딩 실패: {reason}")]
    Encode { reason: String },

    /// 출력 파일이 이미 존재 (Error 모드에서)
    #[error("출력 파일이 이미 존재합니다: {path}")]
    OutputExists { path: PathBuf },

    /// 파일 쓰기 실패
    #[error("파일 쓰기 실패 ({path}): {reason}")]
    WriteError { path: PathBuf, reason: String },

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },
}

/// shipcsv 결과 타입 별칭
pub type Result<T> = std::result::Result<T, ShipCsvError>;
