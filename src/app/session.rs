//! 압축 파일 세션
//!
//! 엔진, 탐색 상태, 디스패처를 묶어 엔진 이벤트를 화면이 쓸 알림으로
//! 바꿉니다. TUI와 명령줄 모드가 같은 세션을 사용합니다.

use crate::core::dispatcher::{Command, DispatchContext, Dispatcher, FollowUp};
use crate::core::navigation::{Navigator, Reconciliation, ViewMode};
use crate::core::projection::ListingRow;
use crate::models::operation::{ActionKind, ArchiveSummary, CompressionLevel};
use crate::system::engine::{ActionOutput, ArchiveEngine, EngineEvent};
use crate::utils::error::Result;
use log::debug;
use std::path::Path;

/// 화면 갱신용 알림
#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotice {
    Started(ActionKind),
    Progress(f64),
    Message(String),
    Stoppable(bool),
    /// 현재 목록 무효 (작업 중)
    ContentInvalidated,
    /// 새 스냅샷 설치됨
    ContentChanged(Reconciliation),
    /// 무결성 검사 통과
    TestPassed(ArchiveSummary),
    Completed {
        action: ActionKind,
        summary: ArchiveSummary,
    },
    /// 작업 실패 (메시지는 그대로 표시)
    Error { action: ActionKind, message: String },
}

/// 압축 파일 세션
#[derive(Debug)]
pub struct ArchiveSession<E: ArchiveEngine> {
    engine: E,
    navigator: Navigator,
    dispatcher: Dispatcher,
    compression: CompressionLevel,
    overwrite: bool,
    /// 다른 압축 파일을 여는 중 (성공 시 경로 초기화)
    opening_new: bool,
}

impl<E: ArchiveEngine> ArchiveSession<E> {
    pub fn new(engine: E, view_mode: ViewMode) -> Self {
        Self {
            engine,
            navigator: Navigator::new(view_mode),
            dispatcher: Dispatcher::new(),
            compression: CompressionLevel::default(),
            overwrite: false,
            opening_new: false,
        }
    }

    pub fn with_compression(mut self, compression: CompressionLevel) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    pub fn archive_path(&self) -> Option<&Path> {
        self.engine.archive_path()
    }

    pub fn is_busy(&self) -> bool {
        self.dispatcher.is_busy()
    }

    pub fn in_flight(&self) -> Option<ActionKind> {
        self.dispatcher.in_flight()
    }

    /// 명령 실행 (현재 디렉토리/보기 모드 기준)
    pub fn execute(&mut self, command: Command) -> Result<ActionKind> {
        let opening_new = matches!(command, Command::Open { .. } | Command::Create { .. });
        let context = DispatchContext {
            current_path: self.navigator.current_path().to_string(),
            view_mode: self.navigator.view_mode(),
            compression: self.compression,
            overwrite: self.overwrite,
        };
        let action = self
            .dispatcher
            .dispatch(&mut self.engine, command, &context)?;
        self.opening_new = opening_new;
        Ok(action)
    }

    /// 진행 중인 작업 중지 요청
    pub fn stop(&mut self) {
        if self.dispatcher.is_busy() {
            self.engine.stop();
        }
    }

    /// 대기 중인 엔진 이벤트 모두 처리
    pub fn pump(&mut self) -> Vec<SessionNotice> {
        let mut notices = Vec::new();
        while let Some(event) = self.engine.poll_event() {
            notices.extend(self.handle_event(event));
        }
        notices
    }

    /// 엔진 이벤트 하나 처리
    pub fn handle_event(&mut self, event: EngineEvent) -> Vec<SessionNotice> {
        match event {
            EngineEvent::Start(action) => vec![SessionNotice::Started(action)],
            EngineEvent::Progress(fraction) => vec![SessionNotice::Progress(fraction)],
            EngineEvent::Message(message) => vec![SessionNotice::Message(message)],
            EngineEvent::Stoppable(stoppable) => vec![SessionNotice::Stoppable(stoppable)],
            EngineEvent::ContentInvalidated => {
                self.navigator.invalidate();
                vec![SessionNotice::ContentInvalidated]
            }
            EngineEvent::Finish { action, result } => self.finish(action, result),
        }
    }

    fn finish(&mut self, action: ActionKind, result: Result<ActionOutput>) -> Vec<SessionNotice> {
        let follow_up = self.dispatcher.on_finish(action, result.is_ok());
        let opening_new = std::mem::take(&mut self.opening_new);
        let mut notices = Vec::new();

        match result {
            Ok(ActionOutput::Listing(entries)) => {
                if opening_new {
                    self.navigator.clear();
                }
                let outcome = self.navigator.install(entries);
                notices.push(SessionNotice::ContentChanged(outcome));
            }
            Ok(ActionOutput::Summary(summary)) => {
                if follow_up == FollowUp::ReportTest {
                    notices.push(SessionNotice::TestPassed(summary));
                } else {
                    notices.push(SessionNotice::Completed { action, summary });
                }
            }
            Err(e) => {
                self.navigator.restore();
                notices.push(SessionNotice::Error {
                    action,
                    message: e.to_string(),
                });
            }
        }

        let next = match follow_up {
            FollowUp::Reload => Some(Command::Reload),
            FollowUp::AddQueued(paths) => Some(Command::AddFiles { paths }),
            FollowUp::None | FollowUp::RebuildTree | FollowUp::ReportTest => None,
        };
        if let Some(command) = next {
            let next_action = command.action();
            debug!("follow-up after {}: {:?}", action, command);
            if let Err(e) = self.execute(command) {
                notices.push(SessionNotice::Error {
                    action: next_action,
                    message: e.to_string(),
                });
            }
        }
        notices
    }

    /// 암호화된 항목이 있는지
    pub fn requires_password(&self) -> bool {
        self.navigator
            .snapshot()
            .is_some_and(|snapshot| snapshot.is_encrypted())
    }

    /// 선택 행의 압축 파일 내부 경로 ("..", 다른 세대 행은 제외)
    pub fn selection_paths(&self, rows: &[ListingRow]) -> Vec<String> {
        let Some(snapshot) = self.navigator.snapshot() else {
            return Vec::new();
        };
        rows.iter()
            .filter(|row| !row.is_parent())
            .filter_map(|row| snapshot.describe(row, false))
            .map(|view| view.path.to_string())
            .collect()
    }
}
