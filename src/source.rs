//! 원본 레코드 소스 모듈
//!
//! 변환 엔진은 네트워크를 직접 호출하지 않고, 카테고리 이름 -> 레코드 배열을
//! 돌려주는 [`RecordSource`]만 요구합니다. 기본 구현인 [`DirectorySource`]는
//! 미리 받아 둔 `<카테고리>.json` 파일들을 폴더에서 읽습니다.

use memmap2::Mmap;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Result, ShipCsvError};
use crate::pattern::PatternMatcher;

/// 알려진 데이터 카테고리: (카테고리 이름, 원격 엔드포인트 식별자)
pub const KNOWN_CATEGORIES: &[(&str, &str)] = &[
    ("空袭", "airSupport"),
    ("特色", "specials"),
    ("飞机", "aircraft"),
    ("鱼雷", "torpedoes"),
    ("反潜武器", "asw"),
    ("弹道穿深", "penetration"),
    ("消耗品", "ability"),
    ("防空", "airDefense"),
    ("副炮", "atba"),
    ("火炮", "artillery"),
    ("船体", "hull"),
];

/// 엔드포인트 식별자로 카테고리 이름 찾기
pub fn category_for_endpoint(endpoint: &str) -> Option<&'static str> {
    KNOWN_CATEGORIES
        .iter()
        .find(|(_, id)| *id == endpoint)
        .map(|(name, _)| *name)
}

/// 카테고리 이름으로 엔드포인트 식별자 찾기
pub fn endpoint_for_category(category: &str) -> Option<&'static str> {
    KNOWN_CATEGORIES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, id)| *id)
}

/// 카테고리 하나의 원본 레코드
#[derive(Debug, Clone)]
pub struct CategoryRecords {
    pub category: String,
    pub records: Vec<Value>,
}

/// 카테고리별 원본 레코드 공급자
pub trait RecordSource {
    /// 카테고리의 레코드 배열. `Ok(None)`은 "사용할 수 없음" 신호입니다.
    fn fetch(&self, category: &str) -> Result<Option<Vec<Value>>>;
}

/// 폴더에 저장된 JSON 파일 기반 레코드 소스
#[derive(Debug, Clone)]
pub struct DirectorySource {
    /// (카테고리 이름, 파일 경로), 파일 경로 순으로 정렬
    entries: Vec<(String, PathBuf)>,
    /// 대용량 파일 임계값 (이상이면 메모리 매핑 사용)
    mmap_threshold: u64,
}

impl DirectorySource {
    /// 폴더를 탐색해 `*.json` 파일을 카테고리로 등록
    ///
    /// 파일 이름(확장자 제외)이 알려진 엔드포인트 식별자면 해당 카테고리 이름으로,
    /// 아니면 파일 이름 그대로 카테고리 이름으로 사용합니다.
    pub fn scan(dir: &Path, max_depth: Option<usize>, matcher: &PatternMatcher) -> Result<Self> {
        if !dir.exists() {
            return Err(ShipCsvError::InputNotFound {
                path: dir.to_path_buf(),
            });
        }
        if !dir.is_dir() {
            return Err(ShipCsvError::NotADirectory {
                path: dir.to_path_buf(),
            });
        }

        let walker = match max_depth {
            Some(depth) => WalkDir::new(dir).max_depth(depth),
            None => WalkDir::new(dir),
        };

        let mut entries: Vec<(String, PathBuf)> = walker
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|s| s.to_str())
                    .map(|s| s.eq_ignore_ascii_case("json"))
                    .unwrap_or(false)
            })
            .filter_map(|e| {
                let stem = e.path().file_stem()?.to_str()?.to_string();
                let file_name = e.path().file_name()?.to_str()?.to_string();
                let category = category_for_endpoint(&stem)
                    .map(str::to_string)
                    .unwrap_or(stem);
                matcher
                    .matches_category(&category, &file_name)
                    .then(|| (category, e.path().to_path_buf()))
            })
            .collect();

        // 같은 카테고리가 여러 번 나오면 먼저 발견된 파일만 사용
        let mut seen = std::collections::HashSet::new();
        entries.retain(|(category, path)| {
            let first = seen.insert(category.clone());
            if !first {
                warn!(category = %category, path = %path.display(), "중복 카테고리 파일을 건너뜁니다");
            }
            first
        });

        debug!(count = entries.len(), dir = %dir.display(), "카테고리 탐색 완료");

        Ok(Self {
            entries,
            mmap_threshold: 10 * 1024 * 1024, // 10MB
        })
    }

    /// 메모리 매핑 임계값 설정
    pub fn with_mmap_threshold(mut self, threshold: u64) -> Self {
        self.mmap_threshold = threshold;
        self
    }

    /// 발견된 카테고리 이름 목록
    pub fn categories(&self) -> Vec<String> {
        self.entries.iter().map(|(c, _)| c.clone()).collect()
    }

    /// 카테고리의 원본 파일 경로
    pub fn path_for(&self, category: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, p)| p.as_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RecordSource for DirectorySource {
    fn fetch(&self, category: &str) -> Result<Option<Vec<Value>>> {
        let Some(path) = self.path_for(category) else {
            return Ok(None);
        };

        let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let json = if file_size >= self.mmap_threshold {
            parse_with_mmap(path)?
        } else {
            parse_with_reader(path)?
        };

        match json {
            Value::Array(records) if records.is_empty() => Ok(None),
            Value::Array(records) => Ok(Some(records)),
            _ => Err(ShipCsvError::SourceNotArray {
                file: path.to_path_buf(),
            }),
        }
    }
}

/// 카테고리 목록의 레코드를 모두 불러옴
///
/// 사용할 수 없는 카테고리(빈 배열, 파일 없음, 파싱 실패)는 결과에서 빠지고
/// 두 번째 목록에 사유와 함께 담깁니다.
pub fn load_batch<S: RecordSource + ?Sized>(
    source: &S,
    categories: &[String],
) -> (Vec<CategoryRecords>, Vec<(String, String)>) {
    let mut batch = Vec::with_capacity(categories.len());
    let mut unavailable = Vec::new();

    for category in categories {
        match source.fetch(category) {
            Ok(Some(records)) => {
                debug!(category = %category, records = records.len(), "레코드 로드");
                batch.push(CategoryRecords {
                    category: category.clone(),
                    records,
                });
            }
            Ok(None) => {
                warn!(category = %category, "레코드가 비어 있어 건너뜁니다");
                unavailable.push((category.clone(), "데이터 없음".to_string()));
            }
            Err(e) => {
                warn!(category = %category, error = %e, "레코드 로드 실패");
                unavailable.push((category.clone(), e.to_string()));
            }
        }
    }

    (batch, unavailable)
}

/// 버퍼 리더를 사용한 JSON 파싱
fn parse_with_reader(path: &Path) -> Result<Value> {
    let file = File::open(path).map_err(|e| ShipCsvError::SourceOpen {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| ShipCsvError::SourceParse {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// 메모리 매핑을 사용한 JSON 파싱 (대용량 파일용)
fn parse_with_mmap(path: &Path) -> Result<Value> {
    let file = File::open(path).map_err(|e| ShipCsvError::SourceOpen {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mmap = unsafe {
        Mmap::map(&file).map_err(|e| ShipCsvError::SourceOpen {
            file: path.to_path_buf(),
            reason: format!("메모리 매핑 실패: {}", e),
        })?
    };

    serde_json::from_slice(&mmap).map_err(|e| ShipCsvError::SourceParse {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })
}
