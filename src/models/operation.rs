//! 압축 작업 모델
//!
//! 엔진 작업 종류, 추가/해제 옵션, 작업 결과 요약 정의

use serde::{Deserialize, Serialize};
use std::fmt;

/// 엔진 작업 종류 (완료 이벤트에서 후속 처리 분기용)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// 새 압축 파일 생성
    CreatingNewArchive,
    /// 압축 파일 내용 목록 읽기
    ListingContent,
    /// 파일 추가
    AddingFiles,
    /// 파일 삭제
    DeletingFiles,
    /// 파일 해제
    ExtractingFiles,
    /// 무결성 검사
    TestingArchive,
}

impl ActionKind {
    /// 작업 이름 반환
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::CreatingNewArchive => "Create archive",
            ActionKind::ListingContent => "Read archive",
            ActionKind::AddingFiles => "Add files",
            ActionKind::DeletingFiles => "Delete files",
            ActionKind::ExtractingFiles => "Extract",
            ActionKind::TestingArchive => "Test archive",
        }
    }

    /// 압축 파일 내용을 변경하는 작업인지 여부
    pub fn mutates_content(&self) -> bool {
        matches!(self, ActionKind::AddingFiles | ActionKind::DeletingFiles)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 압축 수준
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    Fast,
    #[default]
    Normal,
    Maximum,
}

impl CompressionLevel {
    /// deflate/gzip 수준 (0-9)
    pub fn deflate_level(&self) -> u32 {
        match self {
            CompressionLevel::Fast => 1,
            CompressionLevel::Normal => 6,
            CompressionLevel::Maximum => 9,
        }
    }

    /// zstd 수준
    pub fn zstd_level(&self) -> i32 {
        match self {
            CompressionLevel::Fast => 1,
            CompressionLevel::Normal => 3,
            CompressionLevel::Maximum => 19,
        }
    }
}

/// 파일 추가 옵션
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// 추가할 항목 암호 (zip만 지원)
    pub password: Option<String>,
    /// 압축 수준
    pub compression: CompressionLevel,
}

/// 해제 옵션
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// 압축 해제 암호
    pub password: Option<String>,
    /// 기존 파일 덮어쓰기
    pub overwrite: bool,
    /// 경로 없이 파일 이름만 사용
    pub junk_paths: bool,
}

/// 작업 결과 요약
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub total_items: usize,
    pub total_bytes: u64,
    pub items_processed: usize,
    pub items_failed: usize,
    pub errors: Vec<String>,
}

impl ArchiveSummary {
    pub fn new(total_items: usize, total_bytes: u64) -> Self {
        Self {
            total_items,
            total_bytes,
            ..Self::default()
        }
    }

    /// 실패 항목 기록
    pub fn record_failure(&mut self, name: &str, reason: impl fmt::Display) {
        self.items_processed += 1;
        self.items_failed += 1;
        self.errors.push(format!("{}: {}", name, reason));
    }

    /// 성공 항목 기록
    pub fn record_success(&mut self) {
        self.items_processed += 1;
    }

    /// 진행률 (0.0 - 1.0)
    pub fn fraction(&self) -> f64 {
        if self.total_items == 0 {
            1.0
        } else {
            (self.items_processed as f64 / self.total_items as f64).clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kind_mutates_content() {
        assert!(ActionKind::AddingFiles.mutates_content());
        assert!(ActionKind::DeletingFiles.mutates_content());
        assert!(!ActionKind::ExtractingFiles.mutates_content());
        assert!(!ActionKind::ListingContent.mutates_content());
    }

    #[test]
    fn test_summary_fraction() {
        let mut summary = ArchiveSummary::new(4, 0);
        assert_eq!(summary.fraction(), 0.0);

        summary.record_success();
        summary.record_failure("b.txt", "boom");
        assert_eq!(summary.fraction(), 0.5);
        assert_eq!(summary.items_failed, 1);
        assert_eq!(summary.errors, vec!["b.txt: boom".to_string()]);

        // 빈 작업은 완료로 간주
        assert_eq!(ArchiveSummary::new(0, 0).fraction(), 1.0);
    }

    #[test]
    fn test_compression_level_parsing() {
        #[derive(Deserialize)]
        struct Wrapper {
            level: CompressionLevel,
        }
        let parsed: Wrapper = toml::from_str("level = \"maximum\"").unwrap();
        assert_eq!(parsed.level, CompressionLevel::Maximum);
        assert_eq!(parsed.level.deflate_level(), 9);
    }
}
