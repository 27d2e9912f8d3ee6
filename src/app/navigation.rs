use super::*;
use crate::models::snapshot::NodeHandle;
use crate::ui::InputPurpose;
use crossterm::event::{KeyCode, KeyModifiers};

impl<E: ArchiveEngine> App<E> {
    /// 일반 모드 키 처리
    pub fn handle_key(&mut self, modifiers: KeyModifiers, code: KeyCode) {
        if self.is_dialog_active() {
            self.handle_dialog_key(modifiers, code);
        } else if let Some(action) = crate::core::actions::find_action(modifiers, code) {
            self.execute_action(action);
        }
    }

    /// 액션 실행 (단일 진실 원천)
    pub fn execute_action(&mut self, action: Action) {
        if action.requires_idle() && self.is_busy() {
            let busy = self.session.in_flight().map(|a| a.name()).unwrap_or("");
            self.set_toast(&format!("{}: wait for \"{}\" to finish", action.label(), busy));
            return;
        }
        if action.requires_archive() && self.session.archive_path().is_none() {
            self.set_toast("No archive open");
            return;
        }

        match action {
            Action::MoveUp if self.is_tree_focused() => self.move_tree_selection(-1),
            Action::MoveDown if self.is_tree_focused() => self.move_tree_selection(1),
            Action::PageUp if self.is_tree_focused() => {
                self.move_tree_selection(-(self.page_size() as isize))
            }
            Action::PageDown if self.is_tree_focused() => {
                self.move_tree_selection(self.page_size() as isize)
            }
            Action::GoToTop if self.is_tree_focused() => self.move_tree_selection(isize::MIN),
            Action::GoToBottom if self.is_tree_focused() => self.move_tree_selection(isize::MAX),
            Action::MoveUp => self.move_cursor_by(-1),
            Action::MoveDown => self.move_cursor_by(1),
            Action::PageUp => self.move_cursor_by(-(self.page_size() as isize)),
            Action::PageDown => self.move_cursor_by(self.page_size() as isize),
            Action::GoToTop => self.set_cursor(0),
            Action::GoToBottom => self.set_cursor(self.rows.len().saturating_sub(1)),
            Action::Activate => self.activate_selected(),
            Action::GoToParent => self.go_to_parent(),
            Action::GoToPath => self.start_go_to_path(),
            Action::ToggleViewMode => self.toggle_view_mode(),
            Action::ToggleTreePane => self.toggle_tree_pane(),
            Action::SwitchPane => self.switch_pane(),
            Action::ToggleMark => self.toggle_mark_and_move_down(),
            Action::MarkAll => self.toggle_mark_all(),
            Action::OpenArchive => self.start_open(),
            Action::NewArchive => self.start_new(),
            Action::AddFiles => self.start_add(),
            Action::AddFolder => self.start_add_folder(),
            Action::Delete => self.start_delete(),
            Action::Extract => self.start_extract(),
            Action::ExtractHere => self.start_extract_here(),
            Action::TestArchive => self.start_test(),
            Action::Reload => self.run_command(Command::Reload),
            Action::Stop => self.session.stop(),
            Action::Quit => self.quit(),
        }
    }

    fn page_size(&self) -> usize {
        self.layout.visible_rows().max(1)
    }

    fn move_cursor_by(&mut self, delta: isize) {
        let target = self.cursor.saturating_add_signed(delta);
        self.set_cursor(target);
    }

    /// 커서 이동 (목록 범위로 제한)
    pub fn set_cursor(&mut self, index: usize) {
        self.cursor = index.min(self.rows.len().saturating_sub(1));
        self.adjust_scroll_offset();
    }

    /// 커서가 보이도록 스크롤 조정
    fn adjust_scroll_offset(&mut self) {
        let visible = self.page_size();
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + visible {
            self.scroll_offset = self.cursor + 1 - visible;
        }
        let max_offset = self.rows.len().saturating_sub(visible);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    pub fn selected_row(&self) -> Option<ListingRow> {
        self.rows.get(self.cursor).copied()
    }

    /// 목록 다시 계산 (표시 기준이 바뀜: 커서 맨 위, 표시 해제)
    pub(super) fn reset_rows(&mut self) {
        self.rows = self.session.navigator().listing();
        self.marked.clear();
        self.cursor = 0;
        self.scroll_offset = 0;
    }

    /// 새로고침 후 목록 갱신 (커서는 새 목록 범위로, 표시 해제)
    pub(super) fn reload_rows(&mut self) {
        self.rows = self.session.navigator().listing();
        self.marked.clear();
        self.set_cursor(self.cursor);
    }

    fn activate_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if !row.is_directory() {
            return;
        }
        let leaving = self.session.navigator().current_dir();
        match self.session.navigator_mut().activate(&row) {
            Ok(()) => {
                self.reset_rows();
                if row.is_parent() {
                    self.focus_directory(leaving);
                }
            }
            Err(e) => self.show_error("Open folder", &e),
        }
    }

    /// 상위 폴더로 이동 (떠난 폴더에 커서)
    pub fn go_to_parent(&mut self) {
        if self.session.navigator().is_at_root() {
            return;
        }
        let leaving = self.session.navigator().current_dir();
        match self.session.navigator_mut().go_parent() {
            Ok(()) => {
                self.reset_rows();
                self.focus_directory(leaving);
            }
            Err(e) => self.show_error("Parent", &e),
        }
    }

    fn focus_directory(&mut self, handle: Option<NodeHandle>) {
        let Some(handle) = handle else {
            return;
        };
        if let Some(index) = self
            .rows
            .iter()
            .position(|row| *row == ListingRow::Directory(handle))
        {
            self.set_cursor(index);
        }
    }

    fn start_go_to_path(&mut self) {
        let current = self.session.navigator().current_path().to_string();
        self.dialog = Some(DialogKind::input(
            "Go to",
            "Folder inside the archive:",
            current,
            InputPurpose::GoToPath,
        ));
    }

    pub(super) fn go_to_path(&mut self, path: &str) {
        let path = path.trim().trim_start_matches('/');
        match self.session.navigator_mut().chdir_path(path) {
            Ok(()) => self.reset_rows(),
            Err(e) => self.show_error("Go to", &e),
        }
    }

    pub fn toggle_view_mode(&mut self) {
        let mode = self.view_mode().toggled();
        if self.session.navigator_mut().set_view_mode(mode) {
            self.reset_rows();
            if mode == ViewMode::Flat {
                self.tree_focused = false;
            }
            self.set_toast(&format!("View: {}", mode.label()));
        }
    }

    /// 폴더 트리 창 켜기/끄기 (보기 모드와 별개 설정)
    pub fn toggle_tree_pane(&mut self) {
        self.show_tree = !self.show_tree;
        if self.show_tree {
            self.set_toast("Folder tree shown");
        } else {
            self.tree_focused = false;
            self.set_toast("Folder tree hidden");
        }
    }

    /// 목록 창 <-> 트리 창 포커스 전환
    fn switch_pane(&mut self) {
        if !self.tree_visible() {
            self.tree_focused = false;
            self.set_toast("Folder tree is hidden");
            return;
        }
        self.tree_focused = !self.tree_focused;
    }

    /// 트리 창 선택 이동 (선택한 폴더가 바로 현재 폴더가 됨)
    fn move_tree_selection(&mut self, delta: isize) {
        if let Some(busy) = self.session.in_flight() {
            self.set_toast(&format!("Folders: wait for \"{}\" to finish", busy.name()));
            return;
        }
        let navigator = self.session.navigator();
        let Some(snapshot) = navigator.snapshot() else {
            return;
        };
        let dirs = snapshot.directories();
        let current = navigator
            .current_dir()
            .and_then(|current| dirs.iter().position(|(handle, _)| *handle == current))
            .unwrap_or(0);
        let target = current
            .saturating_add_signed(delta)
            .min(dirs.len().saturating_sub(1));
        if target == current {
            return;
        }
        let Some(&(handle, _)) = dirs.get(target) else {
            return;
        };
        match self.session.navigator_mut().chdir(handle) {
            Ok(()) => self.reset_rows(),
            Err(e) => self.show_error("Folders", &e),
        }
    }

    fn toggle_mark_and_move_down(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if !row.is_parent() && !self.marked.remove(&row) {
            self.marked.insert(row);
        }
        self.move_cursor_by(1);
    }

    /// 전체 표시 (모두 표시되어 있으면 해제)
    fn toggle_mark_all(&mut self) {
        let markable: Vec<ListingRow> = self
            .rows
            .iter()
            .filter(|row| !row.is_parent())
            .copied()
            .collect();
        if !markable.is_empty() && markable.iter().all(|row| self.marked.contains(row)) {
            self.marked.clear();
        } else {
            self.marked.extend(markable);
        }
    }

    /// 작업 대상 행 (표시한 행, 없으면 커서 행)
    pub(super) fn target_rows(&self) -> Vec<ListingRow> {
        if self.marked.is_empty() {
            return self
                .selected_row()
                .filter(|row| !row.is_parent())
                .into_iter()
                .collect();
        }
        self.rows
            .iter()
            .filter(|row| self.marked.contains(row))
            .copied()
            .collect()
    }
}
