//! 압축 엔진 인터페이스
//!
//! 엔진은 작업을 비동기로 실행하고 진행 상황을 이벤트로 알립니다.
//! UI 스레드는 `poll_event`로 이벤트를 가져갑니다.

use crate::models::archive_entry::ArchiveEntry;
use crate::models::operation::{ActionKind, AddOptions, ArchiveSummary, ExtractOptions};
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// 작업 결과
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutput {
    /// 전체 항목 목록 (목록 읽기, 새 압축 파일)
    Listing(Vec<ArchiveEntry>),
    /// 처리 요약 (추가, 삭제, 해제, 검사)
    Summary(ArchiveSummary),
}

/// 엔진 이벤트
#[derive(Debug)]
pub enum EngineEvent {
    Start(ActionKind),
    /// 진행률 (0.0 - 1.0)
    Progress(f64),
    Message(String),
    /// 중지 가능 여부 변경
    Stoppable(bool),
    /// 압축 파일 내용이 곧 바뀜 (현재 스냅샷 무효)
    ContentInvalidated,
    Finish {
        action: ActionKind,
        result: Result<ActionOutput>,
    },
}

/// 압축 엔진
///
/// 각 메서드는 작업을 시작만 하고 바로 반환합니다. 시작 자체가 불가능한
/// 경우에만 `Err`를 반환하고, 그 외 결과는 `EngineEvent::Finish`로 전달됩니다.
pub trait ArchiveEngine {
    /// 압축 파일 열기 (목록 읽기)
    fn open(&mut self, path: &Path) -> Result<()>;

    /// 빈 압축 파일 생성
    fn create_new(&mut self, path: &Path) -> Result<()>;

    /// 로컬 파일/폴더를 `base_dir` 아래에 추가
    fn add_entries(&mut self, paths: &[PathBuf], base_dir: &str, options: AddOptions)
        -> Result<()>;

    /// 항목 삭제 (디렉토리는 하위 항목 포함)
    fn remove_entries(&mut self, paths: &[String]) -> Result<()>;

    /// 전체 해제
    fn extract_all(&mut self, dest: &Path, options: ExtractOptions) -> Result<()>;

    /// 선택 항목 해제 (`base_dir` 접두사는 제거)
    fn extract_entries(
        &mut self,
        paths: &[String],
        dest: &Path,
        base_dir: &str,
        options: ExtractOptions,
    ) -> Result<()>;

    /// 압축 파일 옆에 해제
    fn extract_here(&mut self, options: ExtractOptions) -> Result<()>;

    /// 무결성 검사
    fn test_integrity(&mut self, password: Option<&str>) -> Result<()>;

    /// 현재 압축 파일 다시 읽기
    fn reload(&mut self) -> Result<()>;

    /// 진행 중인 작업 중지 요청
    fn stop(&mut self);

    fn is_loaded(&self) -> bool;

    fn archive_path(&self) -> Option<&Path>;

    /// 대기 중인 이벤트 하나 (없으면 None)
    fn poll_event(&mut self) -> Option<EngineEvent>;
}
