use crate::config::Config;
use crate::core::actions::{command_bar_items, Action};
use crate::core::dispatcher::Command;
use crate::core::navigation::ViewMode;
use crate::core::projection::ListingRow;
use crate::models::operation::ActionKind;
use crate::system::engine::ArchiveEngine;
use crate::ui::components::CommandItem;
use crate::ui::{DialogKind, LayoutManager, LayoutMode, Theme};
use crate::utils::error::ArchiverError;
use log::debug;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use ratatui::layout::Rect;
use std::time::Instant;

mod dialogs;
mod navigation;
mod operations;
pub mod session;

pub use session::{ArchiveSession, SessionNotice};

/// 진행 중인 작업 표시 상태
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Activity {
    pub action: Option<ActionKind>,
    pub fraction: f64,
    pub message: String,
    pub stoppable: bool,
}

/// 앱 상태
pub struct App<E: ArchiveEngine> {
    /// 종료 플래그
    pub should_quit: bool,
    /// 레이아웃 매니저
    pub layout: LayoutManager,
    /// 현재 표시 중인 다이얼로그
    pub dialog: Option<DialogKind>,
    session: ArchiveSession<E>,
    config: Config,
    theme: Theme,
    /// 현재 목록 (스냅샷이 바뀌면 다시 계산)
    rows: Vec<ListingRow>,
    cursor: usize,
    scroll_offset: usize,
    marked: HashSet<ListingRow>,
    /// 폴더 트리 창 표시 설정 (트리 보기 모드에서만 적용)
    show_tree: bool,
    /// 방향키가 트리 창 선택을 움직임
    tree_focused: bool,
    activity: Activity,
    /// 토스트 메시지 (3초 후 자동 소멸)
    toast_message: Option<(String, Instant)>,
    /// 입력 다이얼로그 기본 폴더
    working_dir: PathBuf,
}

impl<E: ArchiveEngine> App<E> {
    pub fn new(engine: E, config: Config) -> Self {
        let theme = Theme::by_name(&config.theme).unwrap_or_else(|| {
            debug!("unknown theme {:?}, using dark", config.theme);
            Theme::dark()
        });
        let working_dir = config
            .default_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        let session = ArchiveSession::new(engine, config.view_mode)
            .with_compression(config.compression)
            .with_overwrite(config.overwrite_on_extract);

        Self {
            should_quit: false,
            layout: LayoutManager::new(),
            dialog: None,
            session,
            config,
            theme,
            rows: Vec::new(),
            cursor: 0,
            scroll_offset: 0,
            marked: HashSet::new(),
            show_tree: true,
            tree_focused: false,
            activity: Activity::default(),
            toast_message: None,
            working_dir,
        }
    }

    /// 시작 시 압축 파일 열기
    pub fn open_archive(&mut self, path: &Path) {
        self.run_command(Command::Open {
            path: path.to_path_buf(),
        });
    }

    /// 종료 (진행 중인 작업은 중지 요청)
    pub fn quit(&mut self) {
        self.session.stop();
        self.should_quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn session(&self) -> &ArchiveSession<E> {
        &self.session
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn rows(&self) -> &[ListingRow] {
        &self.rows
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn marked(&self) -> &HashSet<ListingRow> {
        &self.marked
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    pub fn view_mode(&self) -> ViewMode {
        self.session.navigator().view_mode()
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    pub fn is_dialog_active(&self) -> bool {
        self.dialog.is_some()
    }

    /// 트리 창 표시 여부 (설정이 켜져 있고 트리 보기 모드일 때)
    pub fn tree_visible(&self) -> bool {
        self.show_tree && self.view_mode() == ViewMode::Tree
    }

    pub fn is_tree_focused(&self) -> bool {
        self.tree_focused && self.tree_visible()
    }

    /// 화면 크기 반영 (트리 창을 그릴 자리가 없으면 목록으로 포커스 복귀)
    pub fn update_layout(&mut self, area: Rect) {
        self.layout.update(area, self.tree_visible());
        if self.layout.mode() != LayoutMode::WithTree {
            self.tree_focused = false;
        }
    }

    /// 열린 압축 파일 이름
    pub fn archive_name(&self) -> Option<String> {
        self.session.archive_path().map(|path| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        })
    }

    /// 제목줄 문구 (압축 파일 경로 + 현재 폴더)
    pub fn title(&self) -> String {
        match self.archive_name() {
            Some(name) => format!("{}:/{}", name, self.session.navigator().current_path()),
            None => "No archive".to_string(),
        }
    }

    /// 커맨드바 항목
    pub fn command_items(&self) -> Vec<CommandItem> {
        command_bar_items(self.is_busy(), self.session.archive_path().is_some())
    }

    /// 엔진 이벤트 처리 (메인 루프에서 매 틱 호출)
    pub fn poll(&mut self) {
        for notice in self.session.pump() {
            self.apply_notice(notice);
        }
        if !self.session.is_busy() {
            self.activity = Activity::default();
            if self.dialog.as_ref().is_some_and(DialogKind::is_progress) {
                self.dialog = None;
            }
        }
        self.clear_expired_toast();
    }

    /// 명령 실행 (시작 실패는 오류 다이얼로그)
    pub(crate) fn run_command(&mut self, command: Command) {
        let action = command.action();
        if let Err(e) = self.session.execute(command) {
            self.show_error(action.name(), &e);
        }
    }

    pub fn show_error(&mut self, title: &str, error: &ArchiverError) {
        self.dialog = Some(DialogKind::error(title, error.to_string()));
    }

    pub fn show_message(&mut self, title: &str, message: &str) {
        self.dialog = Some(DialogKind::message(title, message));
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }

    /// 토스트 메시지 설정 (3초 후 자동 소멸)
    pub fn set_toast(&mut self, message: &str) {
        self.toast_message = Some((message.to_string(), Instant::now()));
    }

    /// 만료된 토스트 제거
    pub fn clear_expired_toast(&mut self) {
        if let Some((_, time)) = &self.toast_message {
            if time.elapsed().as_secs() >= 3 {
                self.toast_message = None;
            }
        }
    }

    /// 토스트 메시지 가져오기 (만료 안 된 경우만)
    pub fn toast_display(&self) -> Option<&str> {
        self.toast_message.as_ref().and_then(|(msg, time)| {
            if time.elapsed().as_secs() < 3 {
                Some(msg.as_str())
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests;
