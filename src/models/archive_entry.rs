use crate::utils::mime::guess_content_type;

/// 압축 파일 내부 항목 (엔진이 보고한 파일/디렉토리 하나)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// 압축 파일 기준 상대 경로 ('/' 구분)
    pub path: String,
    /// 마지막 경로 요소
    pub name: String,
    /// 바이트 단위 크기
    pub size: u64,
    /// 수정 시간 (Unix timestamp)
    pub modified: i64,
    /// 디렉토리 여부
    pub is_dir: bool,
    /// 암호화 여부
    pub is_encrypted: bool,
    /// MIME 타입 (아이콘/설명 표시용)
    pub content_type: String,
}

impl ArchiveEntry {
    /// 새 항목 생성 (이름과 MIME 타입은 경로에서 추론)
    ///
    /// Windows에서 만든 압축 파일의 '\\' 구분자는 '/'로 바꿉니다.
    pub fn new(path: impl Into<String>, size: u64, modified: i64, is_dir: bool) -> Self {
        let mut path = path.into();
        if path.contains('\\') {
            path = path.replace('\\', "/");
        }
        let name = entry_name(&path).to_string();
        let content_type = guess_content_type(&name, is_dir).to_string();
        Self {
            path,
            name,
            size,
            modified,
            is_dir,
            is_encrypted: false,
            content_type,
        }
    }

    /// 암호화 여부 설정
    pub fn encrypted(mut self, is_encrypted: bool) -> Self {
        self.is_encrypted = is_encrypted;
        self
    }

    pub fn file(path: impl Into<String>, size: u64) -> Self {
        Self::new(path, size, 0, false)
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self::new(path, 0, 0, true)
    }
}

fn entry_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}
