//! 프리셋(이름 번역, i18n 텍스트) 로딩 모듈
//!
//! 두 프리셋 파일은 실행 중 한 번만 읽습니다. 읽기나 파싱에 실패하면 빈 테이블로
//! 대체하여 번역만 생략되고 실행은 계속됩니다.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// 이름 프리셋 파일 이름
pub const NAME_FILE: &str = "name.json";
/// i18n 프리셋 파일 이름
pub const I18N_FILE: &str = "i18n.json";

/// 이름 번역 테이블: 소문자 토큰 -> `{ "zh": "...", ... }`
///
/// 현지화 이름(`zh`)이 비어 있지 않은 항목만 보관합니다.
#[derive(Debug, Clone, Default)]
pub struct NamePreset {
    entries: HashMap<String, String>,
}

impl NamePreset {
    /// JSON 객체에서 생성
    pub fn from_json(table: &Map<String, Value>) -> Self {
        let entries = table
            .iter()
            .filter_map(|(token, entry)| match entry.get("zh") {
                Some(Value::String(zh)) if !zh.is_empty() => Some((token.clone(), zh.clone())),
                _ => None,
            })
            .collect();
        Self { entries }
    }

    /// 값을 소문자로 바꿔 현지화 이름을 찾음
    pub fn lookup(&self, value: &str) -> Option<&str> {
        self.entries.get(&value.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// i18n 테이블: 소문자 토큰 -> 현지화 텍스트
#[derive(Debug, Clone, Default)]
pub struct I18nPreset {
    entries: HashMap<String, String>,
}

impl I18nPreset {
    /// JSON 객체에서 생성. 비어 있거나 문자열이 아닌 값은 버립니다.
    pub fn from_json(table: &Map<String, Value>) -> Self {
        let entries = table
            .iter()
            .filter_map(|(token, text)| match text {
                Value::String(text) if !text.is_empty() => Some((token.clone(), text.clone())),
                _ => None,
            })
            .collect();
        Self { entries }
    }

    /// 토큰을 소문자로 바꿔 현지화 텍스트를 찾음
    pub fn lookup(&self, token: &str) -> Option<&str> {
        self.entries.get(&token.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 변환에 쓰이는 두 프리셋 묶음
#[derive(Debug, Clone, Default)]
pub struct Presets {
    pub names: NamePreset,
    pub i18n: I18nPreset,
}

impl Presets {
    /// 빈 프리셋 (번역 없음)
    pub fn empty() -> Self {
        Self::default()
    }

    /// 테이블을 직접 지정해 생성
    pub fn new(names: NamePreset, i18n: I18nPreset) -> Self {
        Self { names, i18n }
    }

    /// 폴더에서 `name.json`, `i18n.json`을 읽음. 실패한 쪽은 빈 테이블이 됩니다.
    pub fn load(dir: &Path) -> Self {
        let names = read_table(&dir.join(NAME_FILE))
            .map(|table| NamePreset::from_json(&table))
            .unwrap_or_default();
        let i18n = read_table(&dir.join(I18N_FILE))
            .map(|table| I18nPreset::from_json(&table))
            .unwrap_or_default();

        debug!(
            names = names.len(),
            i18n = i18n.len(),
            dir = %dir.display(),
            "프리셋 로드 완료"
        );

        Self { names, i18n }
    }
}

fn read_table(path: &Path) -> Option<Map<String, Value>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "프리셋 파일을 읽을 수 없어 빈 테이블을 사용합니다");
            return None;
        }
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(table)) => Some(table),
        Ok(_) => {
            warn!(path = %path.display(), "프리셋 파일이 JSON 객체가 아니어서 빈 테이블을 사용합니다");
            None
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "프리셋 파싱 실패, 빈 테이블을 사용합니다");
            None
        }
    }
}

/// 프리셋을 처음 요청될 때 한 번만 읽어 두는 저장소
///
/// 로드 이후에는 읽기 전용이므로 여러 스레드에서 `&PresetStore`로 공유할 수 있습니다.
#[derive(Debug)]
pub struct PresetStore {
    dir: PathBuf,
    cache: OnceLock<Presets>,
}

impl PresetStore {
    /// 프리셋 폴더를 지정해 생성 (아직 읽지 않음)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: OnceLock::new(),
        }
    }

    /// 이미 준비된 프리셋으로 생성 (테스트 및 라이브러리 사용)
    pub fn preloaded(presets: Presets) -> Self {
        let cache = OnceLock::new();
        let _ = cache.set(presets);
        Self {
            dir: PathBuf::new(),
            cache,
        }
    }

    /// 프리셋 반환. 첫 호출에서만 파일을 읽습니다.
    pub fn get(&self) -> &Presets {
        self.cache.get_or_init(|| Presets::load(&self.dir))
    }

    /// 이미 로드되었는지 확인
    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_name_lookup_is_case_insensitive() {
        let names = NamePreset::from_json(&object(json!({
            "yamato": {"zh": "大和", "en": "Yamato"},
            "noname": {"en": "No Name"},
            "blank": {"zh": ""}
        })));

        assert_eq!(names.lookup("Yamato"), Some("大和"));
        assert_eq!(names.lookup("YAMATO"), Some("大和"));
        assert_eq!(names.lookup("noname"), None);
        assert_eq!(names.lookup("blank"), None);
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_i18n_lookup() {
        let i18n = I18nPreset::from_json(&object(json!({
            "ids_pash001": "主炮",
            "ids_empty": "",
            "ids_num": 5
        })));

        assert_eq!(i18n.lookup("IDS_PASH001"), Some("主炮"));
        assert_eq!(i18n.lookup("ids_empty"), None);
        assert_eq!(i18n.lookup("ids_num"), None);
    }

    #[test]
    fn test_load_missing_files_yields_empty() {
        let temp_dir = TempDir::new().unwrap();
        let presets = Presets::load(temp_dir.path());
        assert!(presets.names.is_empty());
        assert!(presets.i18n.is_empty());
    }

    #[test]
    fn test_load_malformed_file_is_soft_failure() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(NAME_FILE), "{broken").unwrap();
        fs::write(temp_dir.path().join(I18N_FILE), r#"{"ids_a": "甲"}"#).unwrap();

        let presets = Presets::load(temp_dir.path());
        assert!(presets.names.is_empty());
        assert_eq!(presets.i18n.lookup("IDS_A"), Some("甲"));
    }

    #[test]
    fn test_store_loads_once() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(NAME_FILE),
            r#"{"yamato": {"zh": "大和"}}"#,
        )
        .unwrap();

        let store = PresetStore::new(temp_dir.path());
        assert!(!store.is_loaded());
        assert_eq!(store.get().names.lookup("Yamato"), Some("大和"));
        assert!(store.is_loaded());

        // 로드 후 파일이 바뀌어도 캐시를 그대로 사용
        fs::write(temp_dir.path().join(NAME_FILE), r#"{}"#).unwrap();
        assert_eq!(store.get().names.lookup("Yamato"), Some("大和"));
    }

    #[test]
    fn test_preloaded_store() {
        let store = PresetStore::preloaded(Presets::empty());
        assert!(store.is_loaded());
        assert!(store.get().names.is_empty());
    }
}
