//! 탐색 상태 머신 + 새로고침 재조정
//!
//! 현재 디렉토리 포인터와 보기 모드만 관리합니다. 목록은 매번
//! `core::projection`으로 새로 계산합니다.

use crate::core::projection::{list_directory, list_flat, ListingRow};
use crate::models::archive_entry::ArchiveEntry;
use crate::models::snapshot::{NodeHandle, Snapshot};
use crate::utils::error::{ArchiverError, Result};
use log::debug;
use serde::{Deserialize, Serialize};

/// 보기 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// 디렉토리 트리 (현재 디렉토리의 직속 항목)
    #[default]
    Tree,
    /// 평탄 목록 (모든 파일)
    Flat,
}

impl ViewMode {
    pub fn toggled(&self) -> Self {
        match self {
            ViewMode::Tree => ViewMode::Flat,
            ViewMode::Flat => ViewMode::Tree,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Tree => "TREE",
            ViewMode::Flat => "FLAT",
        }
    }
}

/// 스냅샷 교체 후 현재 디렉토리 재조정 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// 이전 경로가 새 스냅샷에도 존재
    Preserved,
    /// 이전 경로가 사라져 루트로 이동
    FellBackToRoot,
}

/// 탐색 상태
#[derive(Debug, Default)]
pub struct Navigator {
    /// 현재 스냅샷
    snapshot: Option<Snapshot>,
    /// 내용 무효화로 잠시 내려둔 스냅샷 (작업 실패 시 복원용)
    suspended: Option<Snapshot>,
    /// 현재 디렉토리 (항상 현재 스냅샷의 노드)
    current: Option<NodeHandle>,
    /// 현재 디렉토리 경로 (스냅샷이 없을 때도 유지)
    current_path: String,
    view_mode: ViewMode,
    next_generation: u64,
}

impl Navigator {
    pub fn new(view_mode: ViewMode) -> Self {
        Self {
            view_mode,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn current_dir(&self) -> Option<NodeHandle> {
        self.current
    }

    /// 현재 디렉토리 경로 (루트는 "")
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn is_at_root(&self) -> bool {
        match (&self.snapshot, self.current) {
            (Some(snapshot), Some(current)) => snapshot.is_root(current),
            _ => true,
        }
    }

    /// 새 항목 목록으로 스냅샷 교체 후 현재 디렉토리 재조정
    ///
    /// 이전 경로를 먼저 기억하고, 새 트리에서 같은 경로를 찾습니다.
    /// 없으면 루트로 이동합니다.
    pub fn install(&mut self, entries: Vec<ArchiveEntry>) -> Reconciliation {
        let previous_path = std::mem::take(&mut self.current_path);
        self.snapshot = None;
        self.suspended = None;
        self.current = None;

        self.next_generation += 1;
        let snapshot = Snapshot::build(self.next_generation, entries);

        let (current, outcome) = match snapshot.resolve_by_path(&previous_path) {
            Some(handle) => (handle, Reconciliation::Preserved),
            None => {
                debug!(
                    "folder {:?} no longer exists, falling back to archive root",
                    previous_path
                );
                (snapshot.root(), Reconciliation::FellBackToRoot)
            }
        };
        self.current_path = snapshot
            .node(current)
            .map(|node| node.full_path.clone())
            .unwrap_or_default();
        self.current = Some(current);
        self.snapshot = Some(snapshot);
        outcome
    }

    /// 내용 무효화: 현재 스냅샷을 내려두고 경로만 유지
    pub fn invalidate(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.suspended = Some(snapshot);
        }
        self.current = None;
    }

    /// 실패한 작업 이전의 스냅샷 복원
    pub fn restore(&mut self) -> bool {
        let Some(snapshot) = self.suspended.take() else {
            return false;
        };
        self.current = snapshot
            .resolve_by_path(&self.current_path)
            .or_else(|| Some(snapshot.root()));
        self.snapshot = Some(snapshot);
        true
    }

    /// 모든 상태 초기화 (압축 파일 없음)
    pub fn clear(&mut self) {
        self.snapshot = None;
        self.suspended = None;
        self.current = None;
        self.current_path.clear();
    }

    /// 경로로 디렉토리 찾기 (없으면 None)
    pub fn resolve_by_path(&self, path: &str) -> Option<NodeHandle> {
        self.snapshot.as_ref()?.resolve_by_path(path)
    }

    /// 디렉토리 노드로 이동
    pub fn chdir(&mut self, target: NodeHandle) -> Result<()> {
        let snapshot = self.snapshot.as_ref().ok_or(ArchiverError::NoSnapshot)?;
        let node = snapshot.node(target).ok_or(ArchiverError::StaleHandle)?;
        self.current_path = node.full_path.clone();
        self.current = Some(target);
        Ok(())
    }

    /// 경로로 이동 (실패 시 상태 변경 없음)
    pub fn chdir_path(&mut self, path: &str) -> Result<()> {
        let snapshot = self.snapshot.as_ref().ok_or(ArchiverError::NoSnapshot)?;
        let target = snapshot
            .resolve_by_path(path)
            .ok_or_else(|| ArchiverError::PathNotFound(path.to_string()))?;
        self.chdir(target)
    }

    /// 상위 디렉토리로 이동 (루트에서는 아무것도 하지 않음)
    pub fn go_parent(&mut self) -> Result<()> {
        let snapshot = self.snapshot.as_ref().ok_or(ArchiverError::NoSnapshot)?;
        let current = self.current.ok_or(ArchiverError::NoSnapshot)?;
        match snapshot.parent(current) {
            Some(parent) => self.chdir(parent),
            None => Ok(()),
        }
    }

    /// 목록 행 실행 (".." / 디렉토리 이동)
    pub fn activate(&mut self, row: &ListingRow) -> Result<()> {
        match *row {
            ListingRow::Parent(handle) | ListingRow::Directory(handle) => self.chdir(handle),
            ListingRow::File(handle) => {
                let snapshot = self.snapshot.as_ref().ok_or(ArchiverError::NoSnapshot)?;
                let entry = snapshot.entry(handle).ok_or(ArchiverError::StaleHandle)?;
                Err(ArchiverError::NotADirectory(entry.path.clone()))
            }
        }
    }

    /// 보기 모드 변경 (변경되었으면 true)
    pub fn set_view_mode(&mut self, mode: ViewMode) -> bool {
        if self.view_mode == mode {
            return false;
        }
        self.view_mode = mode;
        true
    }

    /// 현재 보기 모드의 목록
    pub fn listing(&self) -> Vec<ListingRow> {
        let Some(snapshot) = &self.snapshot else {
            return Vec::new();
        };
        match self.view_mode {
            ViewMode::Tree => {
                let current = self.current.unwrap_or_else(|| snapshot.root());
                list_directory(snapshot, current)
                    .map(Iterator::collect)
                    .unwrap_or_default()
            }
            ViewMode::Flat => list_flat(snapshot).collect(),
        }
    }
}
