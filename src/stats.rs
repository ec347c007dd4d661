//! 통계 및 유틸리티 모듈
//!
//! 처리 통계 수집 및 포맷팅을 담당합니다.

use colored::Colorize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::writer::CategoryOutcome;

/// 처리 통계 구조체
#[derive(Debug, Default)]
pub struct Statistics {
    /// 총 카테고리 수
    pub total_categories: usize,
    /// CSV 저장 성공 수
    pub success_count: AtomicUsize,
    /// 실패 수
    pub error_count: AtomicUsize,
    /// 데이터가 없어 건너뛴 수
    pub empty_count: AtomicUsize,
    /// 원본 소스에서 사용할 수 없던 카테고리 수
    pub unavailable_count: AtomicUsize,
    /// 쓴 총 행 수
    pub total_rows: AtomicU64,
    /// 쓴 총 바이트
    pub total_bytes_written: AtomicU64,
    /// 처리 시작 시간
    start_time: Option<Instant>,
}

impl Statistics {
    /// 새 통계 인스턴스 생성
    pub fn new(total_categories: usize) -> Self {
        Self {
            total_categories,
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// 카테고리 처리 결과 반영
    pub fn record(&self, outcome: &CategoryOutcome) {
        match outcome {
            CategoryOutcome::Written { rows, bytes, .. } => {
                self.increment_success();
                self.add_rows(*rows as u64);
                self.add_bytes_written(*bytes);
            }
            CategoryOutcome::Empty => self.increment_empty(),
            CategoryOutcome::Failed { .. } => self.increment_error(),
        }
    }

    /// 성공 카운트 증가
    pub fn increment_success(&self) {
        self.success_count.fetch_add(1, Ordering::Relaxed);
    }

    /// 에러 카운트 증가
    pub fn increment_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    /// 빈 데이터 카운트 증가
    pub fn increment_empty(&self) {
        self.empty_count.fetch_add(1, Ordering::Relaxed);
    }

    /// 사용할 수 없는 카테고리 카운트 증가
    pub fn increment_unavailable(&self) {
        self.unavailable_count.fetch_add(1, Ordering::Relaxed);
    }

    /// 행 수 추가
    pub fn add_rows(&self, rows: u64) {
        self.total_rows.fetch_add(rows, Ordering::Relaxed);
    }

    /// 쓴 바이트 추가
    pub fn add_bytes_written(&self, bytes: u64) {
        self.total_bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn get_success_count(&self) -> usize {
        self.success_count.load(Ordering::Relaxed)
    }

    pub fn get_error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    pub fn get_empty_count(&self) -> usize {
        self.empty_count.load(Ordering::Relaxed)
    }

    pub fn get_unavailable_count(&self) -> usize {
        self.unavailable_count.load(Ordering::Relaxed)
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// 변환 통계 요약 출력
    pub fn print_summary(&self) {
        let success = self.get_success_count();
        let errors = self.get_error_count();
        let empty = self.get_empty_count();
        let unavailable = self.get_unavailable_count();
        let rows = self.total_rows.load(Ordering::Relaxed);
        let bytes_written = self.total_bytes_written.load(Ordering::Relaxed);

        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 📊 처리 통계".bright_white().bold());
        println!("{}", "═".repeat(50).bright_blue());

        println!(
            "  {} 전체 카테고리: {}",
            "📁".bright_cyan(),
            self.total_categories
        );
        println!(
            "  {} 성공:          {}",
            "✅".bright_green(),
            success.to_string().green()
        );

        if errors > 0 {
            println!(
                "  {} 실패:          {}",
                "❌".bright_red(),
                errors.to_string().red()
            );
        } else {
            println!("  {} 실패:          {}", "✅".bright_green(), "0".green());
        }

        if empty > 0 {
            println!(
                "  {} 데이터 없음:   {}",
                "⚠️".bright_yellow(),
                empty.to_string().yellow()
            );
        }

        if unavailable > 0 {
            println!(
                "  {} 소스 없음:     {}",
                "⚠️".bright_yellow(),
                unavailable.to_string().yellow()
            );
        }

        println!("  {} 출력 행 수:    {}", "🧾".bright_white(), rows);
        println!(
            "  {} 출력 용량:     {}",
            "📤".bright_magenta(),
            format_bytes(bytes_written)
        );

        if self.total_categories > 0 {
            let success_rate = (success as f64 / self.total_categories as f64) * 100.0;
            println!(
                "  {} 성공률:        {:.1}%",
                "📈".bright_white(),
                success_rate
            );
        }

        println!(
            "  {} 처리 시간:     {}",
            "⏱️".bright_cyan(),
            format_duration(self.elapsed())
        );

        println!("{}", "═".repeat(50).bright_blue());
    }

    /// 매핑 검사 통계 요약 출력
    pub fn print_validation_summary(&self) {
        let success = self.get_success_count();
        let failed = self.get_error_count();

        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 🔍 매핑 검사 결과".bright_white().bold());
        println!("{}", "═".repeat(50).bright_blue());

        println!(
            "  {} 전체 카테고리: {}",
            "📁".bright_cyan(),
            self.total_categories
        );
        println!(
            "  {} 유효:          {}",
            "✅".bright_green(),
            success.to_string().green()
        );

        if failed > 0 {
            println!(
                "  {} 무효:          {}",
                "❌".bright_red(),
                failed.to_string().red()
            );
        } else {
            println!("  {} 무효:          {}", "✅".bright_green(), "0".green());
        }

        println!(
            "  {} 검사 시간:     {}",
            "⏱️".bright_cyan(),
            format_duration(self.elapsed())
        );

        println!("{}", "═".repeat(50).bright_blue());
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Examples
/// ```
/// use shipcsv::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}시간 {}분", hours, mins)
    } else if secs >= 60 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}분 {}초", mins, remaining_secs)
    } else if secs > 0 {
        format!("{}.{:03}초", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}
