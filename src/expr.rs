//! 경로 표현식 평가 모듈
//!
//! 매핑 파일의 값(경로 표현식)을 원본 레코드에 적용해 하나의 값을 얻습니다.
//! 지원하는 형식은 우선순위 순으로 다음 세 가지입니다.
//!
//! 1. 연결식: `(.index + .upgrade.air)`
//! 2. 배열 결합식: `"(.tags)" | join("|")` 처럼 `|`를 포함하고 따옴표로 감싼 괄호 경로가 있는 식
//! 3. 일반 경로: `.upgrade.hull`
//!
//! 범용 파서가 아니라 좁은 문자열 패턴 매칭입니다. 두 특수 형식에 해당하지 않는
//! 식은 모두 일반 경로로 처리됩니다.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// 연결식 내부: 첫 `(` 부터 첫 `)` 까지
static CONCAT_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^)]+)\)").expect("valid concat regex"));

/// 배열 결합식 내부: `"(` 부터 `)"` 까지
static QUOTED_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""\(([^)]+)\)""#).expect("valid quoted field regex"));

/// 컬럼 단위 평가 실패
///
/// 레코드나 카테고리 전체를 실패시키지 않으며, 해당 셀은 null이 됩니다.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    /// 매핑 값이 문자열이 아님
    #[error("경로 표현식이 문자열이 아닙니다: {0}")]
    NotAString(String),

    /// 괄호로 감쌌지만 내용이 없는 연결식
    #[error("해석할 수 없는 연결식: {0}")]
    MalformedConcat(String),
}

/// 연결식의 한 구성 요소
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatPart {
    /// 점을 모두 제거해 하나로 붙인 키 (`.upgrade.air` -> `upgradeair`)
    pub fused: String,
    /// 선행 점을 제거한 점 구분 경로 (`.upgrade.air` -> `upgrade.air`)
    pub path: String,
}

impl ConcatPart {
    fn new(raw: &str) -> Self {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let fused = compact.replace('.', "");
        let path = strip_leading_dot(&compact).to_string();
        Self { fused, path }
    }

    /// 붙인 키가 레코드 최상위에 있으면 그 값을, 없으면 점 경로를 따라간 값을 반환
    fn resolve<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        match record.as_object().and_then(|map| map.get(&self.fused)) {
            Some(value) => Some(value),
            None => resolve_path(record, &self.path),
        }
    }
}

/// 해석된 경로 표현식
#[derive(Debug, Clone, PartialEq)]
pub enum PathExpr {
    /// 각 값을 문자열로 바꿔 왼쪽부터 이어붙임
    Concat(Vec<ConcatPart>),
    /// 배열이면 `|`로 결합, 아니면 값 그대로
    ArrayJoin(String),
    /// 점 구분 경로
    Plain(String),
}

impl PathExpr {
    /// 표현식 문자열을 해석
    pub fn parse(expr: &str) -> Result<Self, ExprError> {
        if expr.starts_with('(') && expr.ends_with(')') {
            let caps = CONCAT_BODY
                .captures(expr)
                .ok_or_else(|| ExprError::MalformedConcat(expr.to_string()))?;
            let parts = caps[1].split('+').map(ConcatPart::new).collect();
            return Ok(PathExpr::Concat(parts));
        }

        if expr.contains('|') {
            if let Some(caps) = QUOTED_FIELD.captures(expr) {
                let field = caps[1].replace('"', "");
                return Ok(PathExpr::ArrayJoin(strip_leading_dot(&field).to_string()));
            }
        }

        Ok(PathExpr::Plain(strip_leading_dot(expr).to_string()))
    }

    /// 매핑 파일의 JSON 값을 해석 (문자열이 아니면 컬럼 단위 실패)
    pub fn from_value(value: &Value) -> Result<Self, ExprError> {
        match value {
            Value::String(expr) => Self::parse(expr),
            other => Err(ExprError::NotAString(other.to_string())),
        }
    }

    /// 레코드 하나에 대해 평가. 값이 없으면 `Value::Null`
    pub fn evaluate(&self, record: &Value) -> Value {
        match self {
            PathExpr::Concat(parts) => {
                let joined: String = parts
                    .iter()
                    .filter_map(|part| part.resolve(record))
                    .map(stringify_value)
                    .collect();
                Value::String(joined)
            }
            PathExpr::ArrayJoin(path) => match resolve_path(record, path) {
                Some(Value::Array(items)) => Value::String(join_items(items, "|")),
                Some(value) => value.clone(),
                None => Value::Null,
            },
            PathExpr::Plain(path) => resolve_path(record, path).cloned().unwrap_or(Value::Null),
        }
    }
}

/// 표현식 문자열을 해석하고 바로 평가
///
/// 해석 실패는 해당 컬럼만의 실패이므로 null을 반환합니다.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use shipcsv::expr::evaluate;
///
/// let record = json!({"hull": "A1", "upgrade": {"air": "B2"}});
/// assert_eq!(evaluate(&record, ".upgrade.air"), json!("B2"));
/// assert_eq!(evaluate(&record, "(.hull + .upgrade.air)"), json!("A1B2"));
/// assert_eq!(evaluate(&record, ".missing.field"), json!(null));
/// ```
pub fn evaluate(record: &Value, expr: &str) -> Value {
    PathExpr::parse(expr)
        .map(|parsed| parsed.evaluate(record))
        .unwrap_or(Value::Null)
}

/// 점 구분 경로를 따라 값을 찾음
///
/// 객체는 키로, 배열은 숫자 인덱스로 내려갑니다. 중간에 null이거나
/// 더 내려갈 수 없는 값을 만나면 None입니다.
pub fn resolve_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;

    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// 배열 원소를 구분자로 연결. 중첩 배열은 쉼표로 펼칩니다 (`[["a","b"],"c"]` -> `a,b|c`)
fn join_items(items: &[Value], separator: &str) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::Array(inner) => join_items(inner, ","),
            other => stringify_value(other),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// 값을 출력용 문자열로 변환
///
/// null은 빈 문자열, 배열과 객체는 JSON 문자열, 정수 값의 실수는 소수점 없이 표기합니다.
/// 1e21 이상이거나 1e-6 미만인 실수는 `1e+21`, `1e-7`처럼 지수 표기를 씁니다.
/// 객체는 `[object Object]`가 아니라 JSON 문자열로 남깁니다.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(format_float).unwrap_or_else(|| n.to_string())
            }
        }
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn format_float(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }

    let abs = f.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let formatted = format!("{:e}", f);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        };
    }

    if f.fract() == 0.0 {
        format!("{:.0}", f)
    } else {
        f.to_string()
    }
}

fn strip_leading_dot(expr: &str) -> &str {
    expr.strip_prefix('.').unwrap_or(expr)
}
