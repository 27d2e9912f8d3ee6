//! 표시용 이름/경로 축약 (터미널 표시 너비 기준)

use std::path::Path;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";
const PATH_ELLIPSIS: &str = "/...";

/// 항목 이름 축약 (확장자 보존)
///
/// "very_long_na....txt" 형태. 확장자가 없거나 숨김 파일이면 끝을 자릅니다.
pub fn truncate_name(name: &str, max_width: usize) -> String {
    if name.width() <= max_width {
        return name.to_string();
    }
    if max_width <= ELLIPSIS.width() {
        return take_prefix_by_width(name, max_width);
    }

    let (stem, ext) = match name.rfind('.') {
        Some(pos) if pos > 0 => name.split_at(pos),
        _ => (name, ""),
    };

    if ext.is_empty() || ELLIPSIS.width() + ext.width() >= max_width {
        let head = take_prefix_by_width(name, max_width - ELLIPSIS.width());
        return format!("{}{}", head, ELLIPSIS);
    }

    let head = take_prefix_by_width(stem, max_width - ELLIPSIS.width() - ext.width());
    format!("{}{}{}", head, ELLIPSIS, ext)
}

/// 로컬 경로 축약 (HOME은 `~`, 길면 `앞/.../뒤`)
pub fn truncate_path(path: &Path, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }

    let path = shorten_home(&path.to_string_lossy());
    if path.width() <= max_width {
        return path;
    }

    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let first = match parts.first() {
        Some(_) if path.starts_with('~') => "~".to_string(),
        Some(head) if path.starts_with('/') => format!("/{}", head),
        Some(head) => head.to_string(),
        None => return truncate_from_start(&path, max_width),
    };

    let first_width = first.width() + PATH_ELLIPSIS.width();
    if parts.len() <= 2 || first_width >= max_width {
        return truncate_from_start(&path, max_width);
    }

    let mut tail: Vec<&str> = Vec::new();
    let mut tail_width = 0;
    for part in parts[1..].iter().rev() {
        let part_width = part.width() + 1;
        if first_width + tail_width + part_width > max_width {
            break;
        }
        tail.push(part);
        tail_width += part_width;
    }
    if tail.is_empty() {
        return truncate_from_start(&path, max_width);
    }
    tail.reverse();
    format!("{}{}/{}", first, PATH_ELLIPSIS, tail.join("/"))
}

fn shorten_home(path: &str) -> String {
    let Some(home) = dirs::home_dir() else {
        return path.to_string();
    };
    let home = home.to_string_lossy();
    if home.is_empty() {
        return path.to_string();
    }
    if path == home {
        return "~".to_string();
    }
    match path.strip_prefix(&*home) {
        Some(rest) if rest.starts_with('/') => format!("~{}", rest),
        _ => path.to_string(),
    }
}

fn truncate_from_start(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= ELLIPSIS.width() {
        return take_prefix_by_width(text, max_width);
    }
    format!(
        "{}{}",
        ELLIPSIS,
        take_suffix_by_width(text, max_width - ELLIPSIS.width())
    )
}

fn take_prefix_by_width(text: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(1);
        if width + ch_width > max_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

fn take_suffix_by_width(text: &str, max_width: usize) -> String {
    let mut chars: Vec<char> = Vec::new();
    let mut width = 0;
    for ch in text.chars().rev() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(1);
        if width + ch_width > max_width {
            break;
        }
        chars.push(ch);
        width += ch_width;
    }
    chars.into_iter().rev().collect()
}
