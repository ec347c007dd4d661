//! 패턴 매칭 모듈
//!
//! glob 패턴을 사용한 카테고리 필터링을 담당합니다.

use glob::Pattern;

use crate::error::{Result, ShipCsvError};

/// 컴파일된 카테고리 필터
#[derive(Default)]
pub struct PatternMatcher {
    pattern: Option<Pattern>,
}

impl PatternMatcher {
    /// 새 패턴 매처 생성
    ///
    /// # Arguments
    /// * `pattern` - 글로브 패턴 문자열 (None이면 모든 카테고리 매칭)
    ///
    /// # Examples
    /// ```
    /// use shipcsv::pattern::PatternMatcher;
    ///
    /// let matcher = PatternMatcher::new(Some("*炮".to_string())).unwrap();
    /// assert!(matcher.matches("火炮"));
    /// assert!(matcher.matches("副炮"));
    /// assert!(!matcher.matches("鱼雷"));
    /// ```
    pub fn new(pattern: Option<String>) -> Result<Self> {
        let compiled = match pattern {
            Some(ref p) => Some(
                Pattern::new(p)
                    .map_err(|_| ShipCsvError::InvalidPattern { pattern: p.clone() })?,
            ),
            None => None,
        };

        Ok(Self { pattern: compiled })
    }

    /// 이름이 패턴과 일치하는지 확인 (패턴이 없으면 항상 true)
    pub fn matches(&self, name: &str) -> bool {
        match &self.pattern {
            Some(p) => p.matches(name),
            None => true,
        }
    }

    /// 카테고리 이름 또는 원본 파일 이름 중 하나라도 일치하면 true
    pub fn matches_category(&self, category: &str, file_name: &str) -> bool {
        self.matches(category) || self.matches(file_name)
    }
}
