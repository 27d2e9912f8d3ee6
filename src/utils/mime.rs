// MIME type lookup - 확장자 기반 MIME 타입 추론

/// 디렉토리 MIME 타입
pub const DIRECTORY_CONTENT_TYPE: &str = "inode/directory";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

const EXTENSION_TABLE: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("log", "text/plain"),
    ("csv", "text/csv"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("xml", "application/xml"),
    ("json", "application/json"),
    ("toml", "application/toml"),
    ("yaml", "application/yaml"),
    ("yml", "application/yaml"),
    ("js", "text/javascript"),
    ("rs", "text/rust"),
    ("c", "text/x-csrc"),
    ("h", "text/x-chdr"),
    ("cpp", "text/x-c++src"),
    ("py", "text/x-python"),
    ("sh", "application/x-shellscript"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    ("pdf", "application/pdf"),
    ("mp3", "audio/mpeg"),
    ("ogg", "audio/ogg"),
    ("mp4", "video/mp4"),
    ("mkv", "video/x-matroska"),
    ("zip", "application/zip"),
    ("jar", "application/java-archive"),
    ("war", "application/java-archive"),
    ("tar", "application/x-tar"),
    ("gz", "application/gzip"),
    ("tgz", "application/x-compressed-tar"),
    ("zst", "application/zstd"),
    ("7z", "application/x-7z-compressed"),
];

/// 파일 이름으로 MIME 타입 추론
pub fn guess_content_type(name: &str, is_dir: bool) -> &'static str {
    if is_dir {
        return DIRECTORY_CONTENT_TYPE;
    }
    let Some((_, ext)) = name.rsplit_once('.') else {
        return FALLBACK_CONTENT_TYPE;
    };
    let ext = ext.to_ascii_lowercase();
    EXTENSION_TABLE
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

/// MIME 타입 설명 (목록의 "Type" 컬럼)
pub fn describe_content_type(content_type: &str) -> String {
    match content_type {
        DIRECTORY_CONTENT_TYPE => "Folder".to_string(),
        FALLBACK_CONTENT_TYPE => "Binary".to_string(),
        other => {
            let (major, minor) = other.split_once('/').unwrap_or((other, ""));
            let minor = minor.trim_start_matches("x-");
            match major {
                "image" => format!("{} image", minor.to_ascii_uppercase()),
                "audio" => format!("{} audio", minor.to_ascii_uppercase()),
                "video" => format!("{} video", minor.to_ascii_uppercase()),
                "text" => format!("{} text", minor),
                _ => minor.to_string(),
            }
        }
    }
}
