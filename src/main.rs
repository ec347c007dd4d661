//! shipcsv - GAME DATA TO CSV CONVERTER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use shipcsv::{
    cli::Args,
    logging::init_logging,
    mapping::MappingStore,
    pattern::PatternMatcher,
    preset::PresetStore,
    source::{endpoint_for_category, load_batch, DirectorySource},
    stats::Statistics,
    transform::TransformOptions,
    writer::{BatchWriter, CategoryOutcome, WriterOptions},
};

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    // 스레드 풀 설정
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("스레드 풀 초기화 실패")?;
    }

    // 입력 폴더 확인
    validate_input(&args)?;

    // 헤더 출력
    print_header(&args);

    // 패턴 매처 초기화
    let pattern_matcher =
        PatternMatcher::new(args.pattern.clone()).map_err(|e| anyhow::anyhow!("{}", e))?;

    // 카테고리 수집
    let source = DirectorySource::scan(&args.input, args.max_depth, &pattern_matcher)
        .context("입력 폴더 탐색 실패")?;
    let categories = source.categories();

    if categories.is_empty() {
        println!("{}", "⚠️ 처리할 카테고리가 없습니다.".yellow());
        return Ok(());
    }

    println!(
        "  {} 발견된 카테고리 수: {}",
        "📋".bright_white(),
        categories.len().to_string().bright_green()
    );

    // 드라이런 모드
    if args.dry_run {
        print_dry_run(&source, &categories);
        return Ok(());
    }

    let mappings = MappingStore::new(&args.mapping_dir);

    // 매핑 검사 모드
    if args.validate_only {
        return run_validation_mode(&args, &mappings, &categories);
    }

    // 일반 변환 모드
    run_conversion_mode(&args, &source, &mappings, &categories)
}

/// 입력 경로 유효성 검사
fn validate_input(args: &Args) -> Result<()> {
    if !args.input.exists() {
        anyhow::bail!("입력 폴더가 존재하지 않습니다: {:?}", args.input);
    }

    if !args.input.is_dir() {
        anyhow::bail!("입력 경로가 폴더가 아닙니다: {:?}", args.input);
    }

    Ok(())
}

/// 헤더 출력
fn print_header(args: &Args) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!(
        "{}",
        " 🏴‍☠️ GAME DATA TO CSV CONVERTER".bright_white().bold()
    );
    println!("{}", "═".repeat(50).bright_blue());
    println!("  {} 입력 폴더: {:?}", "📂".bright_cyan(), args.input);
    println!("  {} 매핑 폴더: {:?}", "🗺️".bright_cyan(), args.mapping_dir);

    if !args.validate_only {
        println!("  {} 프리셋 폴더: {:?}", "🈶".bright_cyan(), args.preset_dir);
        println!("  {} 출력 폴더: {:?}", "📄".bright_green(), args.output);
        println!("  {} 모드: {}", "⚙️".bright_yellow(), args.mode);
    }

    if let Some(ref pattern) = args.pattern {
        println!("  {} 패턴 필터: {}", "🔍".bright_magenta(), pattern);
    }

    if let Some(ref columns) = args.name_columns {
        println!("  {} 이름 치환 컬럼: {}", "🎯".bright_cyan(), columns);
    }

    if args.strict_i18n {
        println!("  {} {}", "🔒".bright_white(), "i18n 정확 일치 모드".white());
    }

    if let Some(depth) = args.max_depth {
        println!("  {} 최대 깊이: {}", "📏".bright_white(), depth);
    }

    if args.dry_run {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "드라이런 모드 (실제 변환 없음)".yellow()
        );
    }

    if args.validate_only {
        println!("  {} {}", "🔍".bright_cyan(), "매핑 검사 모드".cyan());
    }

    println!("{}", "═".repeat(50).bright_blue());
    println!("\n{}", "📁 카테고리 검색 중...".bright_cyan());
}

/// 드라이런 출력
fn print_dry_run(source: &DirectorySource, categories: &[String]) {
    println!("\n{}", "📋 처리 예정 카테고리 목록:".bright_cyan());
    for (i, category) in categories.iter().enumerate() {
        let endpoint = endpoint_for_category(category).unwrap_or("-");
        let file = source
            .path_for(category)
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("  {}. {} ({}) <- {}", i + 1, category, endpoint, file);
    }
    println!(
        "\n{} 총 {} 개의 카테고리가 처리될 예정입니다.",
        "ℹ️".bright_blue(),
        categories.len().to_string().bright_green()
    );
}

/// 매핑 검사 모드 실행
fn run_validation_mode(args: &Args, mappings: &MappingStore, categories: &[String]) -> Result<()> {
    let stats = Statistics::new(categories.len());
    let pb = create_progress_bar(categories.len());

    println!("\n{}", "🔍 매핑 검사 중...".bright_cyan());

    let results: Vec<(String, Option<String>)> = categories
        .par_iter()
        .map(|category| {
            let result = mappings.load(category);
            pb.inc(1);
            (category.clone(), result.err().map(|e| e.to_string()))
        })
        .collect();

    pb.finish_with_message("완료!");

    let mut errors: Vec<(String, String)> = Vec::new();
    for (category, error) in results {
        match error {
            None => {
                stats.increment_success();
                if args.verbose > 0 {
                    println!("  {} {}", "✓".green(), category);
                }
            }
            Some(error) => {
                stats.increment_error();
                errors.push((category, error));
            }
        }
    }

    print_errors(&errors, args.verbose > 0);

    if let Some(ref log_path) = args.log {
        write_error_log(log_path, &errors)?;
    }

    stats.print_validation_summary();

    if stats.get_error_count() == 0 {
        println!("\n{} 모든 매핑이 유효합니다!\n", "✅".bright_green());
    } else {
        println!(
            "\n{} {} 개의 매핑에 오류가 있습니다.\n",
            "⚠️".bright_yellow(),
            stats.get_error_count().to_string().red()
        );
    }

    Ok(())
}

/// 변환 모드 실행
fn run_conversion_mode(
    args: &Args,
    source: &DirectorySource,
    mappings: &MappingStore,
    categories: &[String],
) -> Result<()> {
    ensure_output_dir(&args.output)?;

    let stats = Statistics::new(categories.len());

    // 원본 레코드 로드
    println!("\n{}", "📥 원본 레코드 로드 중...".bright_cyan());
    let (batch, unavailable) = load_batch(source, categories);

    let mut errors: Vec<(String, String)> = Vec::new();
    for (category, reason) in &unavailable {
        stats.increment_unavailable();
        if args.verbose > 0 {
            println!("  {} {} ({})", "⚠".yellow(), category, reason.dimmed());
        }
        errors.push((category.clone(), reason.clone()));
    }

    let presets = PresetStore::new(&args.preset_dir);
    let options = WriterOptions::new().with_mode(args.mode).with_transform(
        TransformOptions::new()
            .with_strict_i18n(args.strict_i18n)
            .with_name_columns(args.get_name_columns()),
    );
    let writer = BatchWriter::new(mappings, &presets, &args.output).with_options(options);

    // 병렬 처리
    println!("\n{}", "💾 CSV 파일 작성 중...".bright_cyan());
    let pb = create_progress_bar(batch.len());

    let mut report = writer.write_all_with(&batch, |category, outcome| {
        stats.record(outcome);
        pb.inc(1);

        if args.verbose > 0 {
            match outcome {
                CategoryOutcome::Written { rows, .. } => {
                    pb.println(format!("  {} {} ({} 행)", "✓".green(), category, rows))
                }
                CategoryOutcome::Empty => {
                    pb.println(format!("  {} {} (데이터 없음)", "⚠".yellow(), category))
                }
                CategoryOutcome::Failed { .. } => {
                    pb.println(format!("  {} {}", "✗".red(), category))
                }
            }
        }
    });

    pb.finish_with_message("완료!");

    for (category, reason) in &unavailable {
        report.record_unavailable(category, reason);
    }
    errors.extend(report.failures.iter().cloned());

    print_errors(&errors, args.verbose > 0);

    if let Some(ref log_path) = args.log {
        write_error_log(log_path, &errors)?;
    }

    if let Some(ref report_path) = args.report {
        let json = serde_json::to_string_pretty(&report).context("보고서 직렬화 실패")?;
        fs::write(report_path, json)
            .with_context(|| format!("보고서를 저장할 수 없습니다: {:?}", report_path))?;
        println!("\n{} 실행 보고서 저장: {:?}", "📝".bright_cyan(), report_path);
    }

    stats.print_summary();

    if !report.files.is_empty() {
        println!("\n{}", "📄 생성된 파일:".bright_cyan());
        for file in &report.files {
            println!("  - {}", file.display());
        }
    }

    println!(
        "\n{} 완료: 성공 {} / 실패 {} / 데이터 없음 {}\n",
        "✨".bright_green(),
        report.success.to_string().green(),
        report.failed.to_string().red(),
        report.empty.to_string().yellow()
    );

    Ok(())
}

/// 출력 폴더 준비
fn ensure_output_dir(output: &Path) -> Result<()> {
    if output.is_dir() {
        println!("  {} 기존 출력 폴더 사용: {:?}", "📁".bright_white(), output);
        return Ok(());
    }

    fs::create_dir_all(output)
        .with_context(|| format!("출력 폴더를 만들 수 없습니다: {:?}", output))?;
    println!("  {} 출력 폴더 생성: {:?}", "📁".bright_white(), output);
    Ok(())
}

/// 진행률 바 생성
fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap()
            .progress_chars("█▓▒░"),
    );
    pb
}

/// 에러 목록 출력
fn print_errors(errors: &[(String, String)], verbose: bool) {
    if errors.is_empty() {
        return;
    }

    println!("\n{}", "❌ 처리하지 못한 카테고리:".bright_red());
    for (category, error) in errors {
        println!("  {} {}", "•".red(), category);
        if verbose {
            println!("    {}", error.dimmed());
        }
    }
}

/// 에러 로그 파일 작성
fn write_error_log(log_path: &PathBuf, errors: &[(String, String)]) -> Result<()> {
    let mut log_file = File::create(log_path)?;

    writeln!(log_file, "shipcsv 에러 로그")?;
    writeln!(log_file, "생성 시간: {}", chrono_now())?;
    writeln!(log_file, "총 에러 수: {}", errors.len())?;
    writeln!(log_file, "{}", "=".repeat(50))?;

    for (category, error) in errors {
        writeln!(log_file, "\n카테고리: {}", category)?;
        writeln!(log_file, "에러: {}", error)?;
    }

    println!("\n{} 에러 로그 저장: {:?}", "📝".bright_cyan(), log_path);

    Ok(())
}

/// 현재 시간 문자열 반환
fn chrono_now() -> String {
    use std::time::SystemTime;
    let now = SystemTime::now();
    let duration = now
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", duration.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_output_dir_creates_nested() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("a").join("b");

        ensure_output_dir(&output).unwrap();
        assert!(output.is_dir());

        // 이미 있으면 그대로 사용
        ensure_output_dir(&output).unwrap();
    }

    #[test]
    fn test_write_error_log() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("errors.log");
        let errors = vec![("鱼雷".to_string(), "매핑 파일을 찾을 수 없습니다".to_string())];

        write_error_log(&log_path, &errors).unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("총 에러 수: 1"));
        assert!(content.contains("카테고리: 鱼雷"));
    }

    #[test]
    fn test_validate_input_rejects_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("raw.json");
        fs::write(&file, "[]").unwrap();

        let args = Args::parse_from(["shipcsv", "-i", file.to_str().unwrap()]);
        assert!(validate_input(&args).is_err());
    }
}
