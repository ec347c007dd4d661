//! CSV 인코딩 모듈
//!
//! 변환된 행을 헤더가 있는 쉼표 구분 텍스트로 만듭니다.

use crate::error::{Result, ShipCsvError};
use crate::expr::stringify_value;
use crate::transform::TransformedRecord;

/// 스프레드시트 프로그램이 UTF-8을 인식하도록 붙이는 BOM
pub const UTF8_BOM: &str = "\u{FEFF}";

/// 행 목록을 CSV 텍스트로 인코딩
///
/// 행이 없으면 헤더도 없이 빈 문자열을 반환합니다. 호출자는 이를
/// "쓸 데이터 없음"으로 처리해야 합니다.
pub fn encode(records: &[TransformedRecord], columns: &[String]) -> Result<String> {
    if records.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(columns).map_err(encode_error)?;

    for record in records {
        let row = columns.iter().map(|column| {
            record
                .get(column)
                .map(stringify_value)
                .unwrap_or_default()
        });
        writer.write_record(row).map_err(encode_error)?;
    }

    let bytes = writer.into_inner().map_err(|e| ShipCsvError::Encode {
        reason: e.to_string(),
    })?;

    String::from_utf8(bytes).map_err(|e| ShipCsvError::Encode {
        reason: e.to_string(),
    })
}

/// 파일로 저장할 내용: BOM + CSV
pub fn with_bom(csv: &str) -> String {
    let mut content = String::with_capacity(UTF8_BOM.len() + csv.len());
    content.push_str(UTF8_BOM);
    content.push_str(csv);
    content
}

fn encode_error(e: csv::Error) -> ShipCsvError {
    ShipCsvError::Encode {
        reason: e.to_string(),
    }
}
