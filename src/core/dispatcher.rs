//! 작업 디스패처
//!
//! 사용자 명령을 엔진 호출 하나로 변환하고, 동시에 하나의 작업만
//! 진행되도록 막습니다. 완료 후 필요한 후속 작업을 알려줍니다.

use crate::core::navigation::ViewMode;
use crate::models::operation::{ActionKind, AddOptions, CompressionLevel, ExtractOptions};
use crate::system::engine::ArchiveEngine;
use crate::utils::error::{ArchiverError, Result};
use log::debug;
use std::path::PathBuf;

/// 사용자 명령
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 새 압축 파일 (생성 후 `queued` 파일 추가)
    Create { path: PathBuf, queued: Vec<PathBuf> },
    Open { path: PathBuf },
    AddFiles { paths: Vec<PathBuf> },
    AddFolder { path: PathBuf },
    /// 선택 항목 삭제 (압축 파일 내부 경로)
    Delete { selection: Vec<String> },
    /// 해제 (선택이 비어 있으면 전체)
    Extract {
        dest: PathBuf,
        selection: Vec<String>,
        password: Option<String>,
    },
    ExtractHere { password: Option<String> },
    Test { password: Option<String> },
    Reload,
}

impl Command {
    /// 명령이 시작할 엔진 작업
    pub fn action(&self) -> ActionKind {
        match self {
            Command::Create { .. } => ActionKind::CreatingNewArchive,
            Command::Open { .. } | Command::Reload => ActionKind::ListingContent,
            Command::AddFiles { .. } | Command::AddFolder { .. } => ActionKind::AddingFiles,
            Command::Delete { .. } => ActionKind::DeletingFiles,
            Command::Extract { .. } | Command::ExtractHere { .. } => ActionKind::ExtractingFiles,
            Command::Test { .. } => ActionKind::TestingArchive,
        }
    }

    fn needs_loaded_archive(&self) -> bool {
        !matches!(self, Command::Create { .. } | Command::Open { .. })
    }
}

/// 명령 실행 시점의 탐색/설정 정보
#[derive(Debug, Clone, Default)]
pub struct DispatchContext {
    /// 현재 디렉토리 경로 (루트는 "")
    pub current_path: String,
    pub view_mode: ViewMode,
    pub compression: CompressionLevel,
    pub overwrite: bool,
}

impl DispatchContext {
    /// 추가 대상, 선택 해제 기준 디렉토리 (평탄 모드는 항상 루트)
    pub fn base_dir(&self) -> &str {
        match self.view_mode {
            ViewMode::Tree => &self.current_path,
            ViewMode::Flat => "",
        }
    }

    fn extract_options(&self, password: Option<String>) -> ExtractOptions {
        ExtractOptions {
            password,
            overwrite: self.overwrite,
            junk_paths: false,
        }
    }
}

/// 작업 완료 후 후속 처리
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    None,
    /// 압축 파일 다시 읽기
    Reload,
    /// 목록으로 트리 재구성
    RebuildTree,
    /// 새 압축 파일에 대기 중이던 파일 추가
    AddQueued(Vec<PathBuf>),
    /// 검사 결과 표시
    ReportTest,
}

/// 작업 디스패처 (진행 중 작업 + 대기 파일)
#[derive(Debug, Default)]
pub struct Dispatcher {
    in_flight: Option<ActionKind>,
    queued: Vec<PathBuf>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_flight(&self) -> Option<ActionKind> {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn queued(&self) -> &[PathBuf] {
        &self.queued
    }

    /// 명령 실행
    ///
    /// 진행 중인 작업이 있으면 엔진을 건드리지 않고 거부합니다.
    pub fn dispatch<E: ArchiveEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        command: Command,
        context: &DispatchContext,
    ) -> Result<ActionKind> {
        if let Some(current) = self.in_flight {
            debug!("refusing {:?}: {} is in progress", command, current);
            return Err(ArchiverError::OperationInProgress(current));
        }
        if command.needs_loaded_archive() && !engine.is_loaded() {
            return Err(ArchiverError::NoArchiveLoaded);
        }

        let action = command.action();
        match command {
            Command::Create { path, queued } => {
                engine.create_new(&path)?;
                self.queued = queued;
            }
            Command::Open { path } => engine.open(&path)?,
            Command::AddFiles { paths } => {
                let options = AddOptions {
                    password: None,
                    compression: context.compression,
                };
                engine.add_entries(&paths, context.base_dir(), options)?;
            }
            Command::AddFolder { path } => {
                let options = AddOptions {
                    password: None,
                    compression: context.compression,
                };
                engine.add_entries(&[path], context.base_dir(), options)?;
            }
            Command::Delete { selection } => engine.remove_entries(&selection)?,
            Command::Extract {
                dest,
                selection,
                password,
            } => {
                let options = context.extract_options(password);
                if selection.is_empty() {
                    engine.extract_all(&dest, options)?;
                } else {
                    engine.extract_entries(&selection, &dest, context.base_dir(), options)?;
                }
            }
            Command::ExtractHere { password } => {
                engine.extract_here(context.extract_options(password))?
            }
            Command::Test { password } => engine.test_integrity(password.as_deref())?,
            Command::Reload => engine.reload()?,
        }

        self.in_flight = Some(action);
        Ok(action)
    }

    /// 작업 완료 처리
    ///
    /// 추가/삭제 후에는 성공 여부와 관계없이 다시 읽습니다 (부분 변경 반영).
    pub fn on_finish(&mut self, action: ActionKind, succeeded: bool) -> FollowUp {
        self.in_flight = None;
        if !succeeded {
            self.queued.clear();
        }
        match action {
            ActionKind::AddingFiles | ActionKind::DeletingFiles => FollowUp::Reload,
            _ if !succeeded => FollowUp::None,
            ActionKind::CreatingNewArchive | ActionKind::ListingContent => {
                if self.queued.is_empty() {
                    FollowUp::RebuildTree
                } else {
                    FollowUp::AddQueued(std::mem::take(&mut self.queued))
                }
            }
            ActionKind::TestingArchive => FollowUp::ReportTest,
            ActionKind::ExtractingFiles => FollowUp::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::engine::EngineEvent;
    use std::path::Path;

    /// 호출만 기록하는 엔진
    #[derive(Default)]
    struct RecordingEngine {
        loaded: bool,
        calls: Vec<String>,
    }

    impl ArchiveEngine for RecordingEngine {
        fn open(&mut self, path: &Path) -> Result<()> {
            self.calls.push(format!("open {}", path.display()));
            Ok(())
        }
        fn create_new(&mut self, path: &Path) -> Result<()> {
            self.calls.push(format!("create {}", path.display()));
            Ok(())
        }
        fn add_entries(&mut self, paths: &[PathBuf], base_dir: &str, _: AddOptions) -> Result<()> {
            self.calls
                .push(format!("add {} into {:?}", paths.len(), base_dir));
            Ok(())
        }
        fn remove_entries(&mut self, paths: &[String]) -> Result<()> {
            self.calls.push(format!("remove {}", paths.join(",")));
            Ok(())
        }
        fn extract_all(&mut self, dest: &Path, _: ExtractOptions) -> Result<()> {
            self.calls.push(format!("extract_all {}", dest.display()));
            Ok(())
        }
        fn extract_entries(
            &mut self,
            paths: &[String],
            _: &Path,
            base_dir: &str,
            _: ExtractOptions,
        ) -> Result<()> {
            self.calls
                .push(format!("extract {} from {:?}", paths.join(","), base_dir));
            Ok(())
        }
        fn extract_here(&mut self, _: ExtractOptions) -> Result<()> {
            self.calls.push("extract_here".to_string());
            Ok(())
        }
        fn test_integrity(&mut self, _: Option<&str>) -> Result<()> {
            self.calls.push("test".to_string());
            Ok(())
        }
        fn reload(&mut self) -> Result<()> {
            self.calls.push("reload".to_string());
            Ok(())
        }
        fn stop(&mut self) {}
        fn is_loaded(&self) -> bool {
            self.loaded
        }
        fn archive_path(&self) -> Option<&Path> {
            None
        }
        fn poll_event(&mut self) -> Option<EngineEvent> {
            None
        }
    }

    fn loaded_engine() -> RecordingEngine {
        RecordingEngine {
            loaded: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_second_dispatch_is_refused() {
        let mut engine = loaded_engine();
        let mut dispatcher = Dispatcher::new();
        let context = DispatchContext::default();

        dispatcher
            .dispatch(&mut engine, Command::Reload, &context)
            .unwrap();
        let second = dispatcher.dispatch(
            &mut engine,
            Command::Delete {
                selection: vec!["a.txt".to_string()],
            },
            &context,
        );
        assert!(matches!(
            second,
            Err(ArchiverError::OperationInProgress(ActionKind::ListingContent))
        ));
        assert_eq!(engine.calls, vec!["reload"]);
    }

    #[test]
    fn test_dispatch_allowed_after_finish() {
        let mut engine = loaded_engine();
        let mut dispatcher = Dispatcher::new();
        let context = DispatchContext::default();

        dispatcher
            .dispatch(&mut engine, Command::Test { password: None }, &context)
            .unwrap();
        assert_eq!(
            dispatcher.on_finish(ActionKind::TestingArchive, true),
            FollowUp::ReportTest
        );
        assert!(!dispatcher.is_busy());
        dispatcher
            .dispatch(&mut engine, Command::Reload, &context)
            .unwrap();
    }

    #[test]
    fn test_commands_require_loaded_archive() {
        let mut engine = RecordingEngine::default();
        let mut dispatcher = Dispatcher::new();
        let context = DispatchContext::default();

        let result = dispatcher.dispatch(&mut engine, Command::Reload, &context);
        assert!(matches!(result, Err(ArchiverError::NoArchiveLoaded)));
        assert!(!dispatcher.is_busy());

        dispatcher
            .dispatch(
                &mut engine,
                Command::Open {
                    path: PathBuf::from("a.zip"),
                },
                &context,
            )
            .unwrap();
        assert_eq!(dispatcher.in_flight(), Some(ActionKind::ListingContent));
    }

    #[test]
    fn test_base_dir_depends_on_view_mode() {
        let mut engine = loaded_engine();
        let mut dispatcher = Dispatcher::new();
        let mut context = DispatchContext {
            current_path: "docs/".to_string(),
            ..Default::default()
        };

        dispatcher
            .dispatch(
                &mut engine,
                Command::AddFiles {
                    paths: vec![PathBuf::from("/tmp/x.txt")],
                },
                &context,
            )
            .unwrap();
        dispatcher.on_finish(ActionKind::AddingFiles, true);

        context.view_mode = ViewMode::Flat;
        dispatcher
            .dispatch(
                &mut engine,
                Command::AddFolder {
                    path: PathBuf::from("/tmp/dir"),
                },
                &context,
            )
            .unwrap();

        assert_eq!(
            engine.calls,
            vec!["add 1 into \"docs/\"", "add 1 into \"\""]
        );
    }

    #[test]
    fn test_extract_selection_uses_current_dir() {
        let mut engine = loaded_engine();
        let mut dispatcher = Dispatcher::new();
        let context = DispatchContext {
            current_path: "a/".to_string(),
            ..Default::default()
        };

        dispatcher
            .dispatch(
                &mut engine,
                Command::Extract {
                    dest: PathBuf::from("/out"),
                    selection: vec!["a/b.txt".to_string()],
                    password: None,
                },
                &context,
            )
            .unwrap();
        dispatcher.on_finish(ActionKind::ExtractingFiles, true);
        dispatcher
            .dispatch(
                &mut engine,
                Command::Extract {
                    dest: PathBuf::from("/out"),
                    selection: Vec::new(),
                    password: None,
                },
                &context,
            )
            .unwrap();

        assert_eq!(
            engine.calls,
            vec!["extract a/b.txt from \"a/\"", "extract_all /out"]
        );
    }

    #[test]
    fn test_follow_ups() {
        let mut dispatcher = Dispatcher::new();
        assert_eq!(
            dispatcher.on_finish(ActionKind::AddingFiles, true),
            FollowUp::Reload
        );
        assert_eq!(
            dispatcher.on_finish(ActionKind::DeletingFiles, false),
            FollowUp::Reload
        );
        assert_eq!(
            dispatcher.on_finish(ActionKind::ListingContent, true),
            FollowUp::RebuildTree
        );
        assert_eq!(
            dispatcher.on_finish(ActionKind::ListingContent, false),
            FollowUp::None
        );
        assert_eq!(
            dispatcher.on_finish(ActionKind::ExtractingFiles, true),
            FollowUp::None
        );
    }

    #[test]
    fn test_create_queues_files_until_finish() {
        let mut engine = RecordingEngine::default();
        let mut dispatcher = Dispatcher::new();
        let queued = vec![PathBuf::from("/tmp/a.txt"), PathBuf::from("/tmp/b.txt")];

        dispatcher
            .dispatch(
                &mut engine,
                Command::Create {
                    path: PathBuf::from("new.zip"),
                    queued: queued.clone(),
                },
                &DispatchContext::default(),
            )
            .unwrap();
        assert_eq!(dispatcher.queued(), queued.as_slice());

        assert_eq!(
            dispatcher.on_finish(ActionKind::CreatingNewArchive, true),
            FollowUp::AddQueued(queued)
        );
        assert!(dispatcher.queued().is_empty());
    }

    #[test]
    fn test_failed_create_drops_queue() {
        let mut engine = RecordingEngine::default();
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .dispatch(
                &mut engine,
                Command::Create {
                    path: PathBuf::from("new.zip"),
                    queued: vec![PathBuf::from("/tmp/a.txt")],
                },
                &DispatchContext::default(),
            )
            .unwrap();

        assert_eq!(
            dispatcher.on_finish(ActionKind::CreatingNewArchive, false),
            FollowUp::None
        );
        assert!(dispatcher.queued().is_empty());
    }
}
