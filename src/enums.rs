//! 열거값 번역 테이블
//!
//! 함종, 분류, 국가 세 컬럼의 영문 원본 값을 중국어 표시 이름으로 바꿉니다.

use serde_json::{Map, Value};

/// 함종 컬럼 이름
pub const SHIP_TYPE_COLUMN: &str = "舰种";
/// 분류 컬럼 이름
pub const GROUP_COLUMN: &str = "类型";
/// 국가 컬럼 이름
pub const NATION_COLUMN: &str = "国家";

/// 함종
pub const SHIP_TYPES: &[(&str, &str)] = &[
    ("Battleship", "战列舰"),
    ("Destroyer", "驱逐舰"),
    ("Cruiser", "巡洋舰"),
    ("AirCarrier", "航空母舰"),
    ("Submarine", "潜艇"),
];

/// 분류 그룹
pub const GROUPS: &[(&str, &str)] = &[
    ("demoWithoutStats", "测试"),
    ("demoWithStats", "测试"),
    ("earlyAccess", "抢先体验"),
    ("specialUnsellable", "不可出售"),
    ("special", "加值"),
    ("start", "初始"),
    ("superShip", "超战"),
    ("ultimate", "特种"),
    ("upgradeableExclusive", "全局研发"),
    ("upgradeableUltimate", "全局特种"),
    ("upgradeable", "研发"),
];

/// 국가
pub const NATIONS: &[(&str, &str)] = &[
    ("Commonwealth", "英联邦"),
    ("Europe", "欧洲"),
    ("France", "法国"),
    ("Germany", "德国"),
    ("Italy", "意大利"),
    ("Spain", "西班牙"),
    ("Japan", "日本"),
    ("Netherlands", "荷兰"),
    ("Russia", "苏联"),
    ("United_Kingdom", "英国"),
    ("USA", "美国"),
    ("Pan_Asia", "泛亚"),
    ("Pan_America", "泛美洲"),
];

/// 컬럼 이름에 해당하는 번역 테이블
pub fn table_for(column: &str) -> Option<&'static [(&'static str, &'static str)]> {
    match column {
        SHIP_TYPE_COLUMN => Some(SHIP_TYPES),
        GROUP_COLUMN => Some(GROUPS),
        NATION_COLUMN => Some(NATIONS),
        _ => None,
    }
}

/// 테이블에서 원본 값(대소문자 구분)을 찾아 표시 이름 반환
pub fn lookup(table: &[(&str, &'static str)], raw: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(key, _)| *key == raw)
        .map(|(_, label)| *label)
}

/// 레코드의 세 열거 컬럼을 번역. 테이블에 없는 값은 그대로 둡니다.
pub fn translate_enums(record: &mut Map<String, Value>) {
    for column in [SHIP_TYPE_COLUMN, GROUP_COLUMN, NATION_COLUMN] {
        let Some(table) = table_for(column) else {
            continue;
        };
        if let Some(Value::String(raw)) = record.get(column) {
            if let Some(label) = lookup(table, raw) {
                record.insert(column.to_string(), Value::String(label.to_string()));
            }
        }
    }
}
