//! 로그 초기화 모듈
//!
//! 라이브러리 코드는 `tracing` 매크로로 진단 메시지를 남기고, 바이너리는
//! 여기서 stderr 구독자를 설치합니다. `RUST_LOG`가 설정되어 있으면 그 값이
//! 우선합니다.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// `-v` 개수를 로그 레벨로 변환
///
/// - 0: warn
/// - 1: info
/// - 2 이상: debug
pub fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

/// 전역 로그 구독자 설치. 이미 설치되어 있으면 아무것도 하지 않습니다.
pub fn init_logging(verbosity: u8) {
    let default_level = level_for_verbosity(verbosity);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_lowercase()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0), Level::WARN);
        assert_eq!(level_for_verbosity(1), Level::INFO);
        assert_eq!(level_for_verbosity(5), Level::DEBUG);
    }

    #[test]
    fn test_init_logging_twice_is_harmless() {
        init_logging(0);
        init_logging(2);
    }
}
