// Formatters - 파일 크기, 날짜, 개수 포맷팅

use chrono::{DateTime, Local};

/// 파일 크기를 읽기 쉬운 형식으로 포맷팅 (숫자와 단위 사이 공백)
///
/// # Examples
/// ```
/// use boksl_archiver::utils::formatter::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 B");
/// assert_eq!(format_file_size(512), "512 B");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// assert_eq!(format_file_size(1_048_576), "1.0 MB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    }
}

/// Unix timestamp를 "YYYY-MM-DD HH:MM" 형식으로 포맷팅
///
/// 0 이하(시간 정보 없음)는 빈 문자열
///
/// # Examples
/// ```
/// use boksl_archiver::utils::formatter::format_timestamp;
///
/// assert_eq!(format_timestamp(0), "");
/// assert_eq!(format_timestamp(1_700_000_000).len(), 16);
/// ```
pub fn format_timestamp(timestamp: i64) -> String {
    if timestamp <= 0 {
        return String::new();
    }
    match DateTime::from_timestamp(timestamp, 0) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => String::new(),
    }
}

/// 개수에 따라 단수/복수형 반환
///
/// # Examples
/// ```
/// use boksl_archiver::utils::formatter::pluralize;
///
/// assert_eq!(pluralize(1, "file", "files"), "1 file");
/// assert_eq!(pluralize(3, "file", "files"), "3 files");
/// ```
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// 진행률을 백분율 문자열로
pub fn format_percent(fraction: f64) -> String {
    format!("{:>3}%", (fraction.clamp(0.0, 1.0) * 100.0).round() as u32)
}
