//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// 출력 파일 모드
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// 기존 파일이 있으면 덮어쓰기
    #[default]
    Overwrite,
    /// 기존 파일이 있으면 해당 카테고리를 실패 처리
    Error,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Overwrite => write!(f, "Overwrite"),
            WriteMode::Error => write!(f, "Error"),
        }
    }
}

/// shipcsv CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "shipcsv",
    author = "YourName <your@email.com>",
    version,
    about = "GAME DATA TO CSV CONVERTER - 매핑 파일 기반으로 JSON 게임 데이터를 현지화된 CSV로 변환",
    long_about = r#"
GAME DATA TO CSV CONVERTER
==========================

카테고리별로 받아 둔 JSON 레코드 파일을
매핑 파일에 따라 현지화된 CSV 파일로 변환합니다.

특징:
  • 카테고리별 매핑 파일 (출력 컬럼 -> 경로 표현식)
  • 함종/분류/국가 열거값 번역
  • 이름 프리셋 및 i18n 프리셋 치환
  • 엑셀 호환 UTF-8 BOM 출력
  • 카테고리 단위 실패 격리 및 상세 통계

예제:
  shipcsv -i ./raw -o ./data
  shipcsv -i ./raw --mapping-dir ./mapping --preset-dir ./preset
  shipcsv -i ./raw --pattern "*炮" --verbose
  shipcsv -i ./raw --validate-only
"#
)]
pub struct Args {
    /// 카테고리별 JSON 레코드 파일이 있는 입력 폴더 경로
    #[arg(short, long)]
    pub input: PathBuf,

    /// CSV 파일을 저장할 출력 폴더 (없으면 생성)
    #[arg(short, long, default_value = "data")]
    pub output: PathBuf,

    /// `<카테고리>mapping.json` 매핑 파일 폴더
    #[arg(long, default_value = "mapping")]
    pub mapping_dir: PathBuf,

    /// `name.json`, `i18n.json` 프리셋 폴더
    #[arg(long, default_value = "preset")]
    pub preset_dir: PathBuf,

    /// 출력 파일 모드
    #[arg(short, long, value_enum, default_value_t = WriteMode::Overwrite)]
    pub mode: WriteMode,

    /// 카테고리 이름 또는 파일 이름 패턴 필터 (glob 형식, 예: "*炮", "a*")
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// 상세 출력 모드 (-v: 카테고리별 결과, -vv: 디버그 로그)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// 실제 변환 없이 처리될 카테고리 목록만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// 매핑 파일 유효성 검사만 수행 (변환 없음)
    #[arg(long)]
    pub validate_only: bool,

    /// i18n 토큰이 값 전체와 일치할 때만 치환
    #[arg(long)]
    pub strict_i18n: bool,

    /// 이름 치환을 적용할 컬럼 (쉼표로 구분, 예: "名称,舰船")
    #[arg(long)]
    pub name_columns: Option<String>,

    /// 병렬 처리 스레드 수 (기본값: CPU 코어 수)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// 최대 폴더 탐색 깊이
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// 에러 로그 파일 경로
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// 실행 보고서(JSON) 저장 경로
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl Args {
    /// 이름 치환 컬럼 목록을 파싱하여 벡터로 반환
    pub fn get_name_columns(&self) -> Option<Vec<String>> {
        self.name_columns.as_ref().map(|f| {
            f.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["shipcsv", "-i", "raw"]);
        assert_eq!(args.input, PathBuf::from("raw"));
        assert_eq!(args.output, PathBuf::from("data"));
        assert_eq!(args.mapping_dir, PathBuf::from("mapping"));
        assert_eq!(args.preset_dir, PathBuf::from("preset"));
        assert_eq!(args.mode, WriteMode::Overwrite);
        assert_eq!(args.verbose, 0);
        assert!(!args.strict_i18n);
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "shipcsv",
            "-i",
            "raw",
            "-m",
            "error",
            "-vv",
            "--strict-i18n",
            "--name-columns",
            "名称, 舰船,",
        ]);
        assert_eq!(args.mode, WriteMode::Error);
        assert_eq!(args.verbose, 2);
        assert!(args.strict_i18n);
        assert_eq!(
            args.get_name_columns(),
            Some(vec!["名称".to_string(), "舰船".to_string()])
        );
    }

    #[test]
    fn test_write_mode_display() {
        assert_eq!(WriteMode::Overwrite.to_string(), "Overwrite");
        assert_eq!(WriteMode::Error.to_string(), "Error");
    }
}
