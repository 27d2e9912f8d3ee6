use super::*;
use crate::ui::{ConfirmPurpose, InputPurpose};
use crossterm::event::{KeyCode, KeyModifiers};

impl<E: ArchiveEngine> App<E> {
    // === 다이얼로그 키 처리 ===

    /// 다이얼로그 모드 키 처리 (다이얼로그 종류에 따라 분기)
    pub fn handle_dialog_key(&mut self, modifiers: KeyModifiers, code: KeyCode) {
        match &self.dialog {
            Some(DialogKind::Input { .. }) => self.handle_input_dialog_key(modifiers, code),
            Some(DialogKind::Confirm { .. }) => self.handle_confirm_dialog_key(modifiers, code),
            Some(DialogKind::Progress { .. }) => self.handle_progress_dialog_key(modifiers, code),
            Some(DialogKind::Message { .. }) | Some(DialogKind::Error { .. }) => {
                if matches!(code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                    self.close_dialog();
                }
            }
            None => {}
        }
    }

    fn handle_input_dialog_key(&mut self, modifiers: KeyModifiers, code: KeyCode) {
        match (modifiers, code) {
            (_, KeyCode::Enter) => {
                if self.dialog_selected_button() == Some(0) {
                    self.confirm_input_dialog();
                } else {
                    self.close_dialog();
                }
            }
            (_, KeyCode::Esc) => self.close_dialog(),
            // 버튼 전환 (Tab / Shift+Tab)
            (_, KeyCode::Tab) | (_, KeyCode::BackTab) => self.dialog_toggle_button(),
            _ => {
                if let Some(DialogKind::Input { input, .. }) = &mut self.dialog {
                    input.handle_key(modifiers, code);
                }
            }
        }
    }

    fn handle_confirm_dialog_key(&mut self, modifiers: KeyModifiers, code: KeyCode) {
        match (modifiers, code) {
            (_, KeyCode::Tab) | (_, KeyCode::BackTab) | (_, KeyCode::Left) | (_, KeyCode::Right) => {
                self.dialog_toggle_button()
            }
            (_, KeyCode::Enter) => {
                if self.dialog_selected_button() == Some(0) {
                    self.confirm_dialog();
                } else {
                    self.close_dialog();
                }
            }
            (_, KeyCode::Char('y')) => self.confirm_dialog(),
            (_, KeyCode::Esc) | (_, KeyCode::Char('n')) => self.close_dialog(),
            _ => {}
        }
    }

    /// 진행률 다이얼로그: Esc/s로 중지, 나머지 키는 무시
    fn handle_progress_dialog_key(&mut self, modifiers: KeyModifiers, code: KeyCode) {
        match (modifiers, code) {
            (_, KeyCode::Esc) | (KeyModifiers::NONE, KeyCode::Char('s')) => self.session.stop(),
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => self.quit(),
            _ => {}
        }
    }

    fn dialog_selected_button(&self) -> Option<usize> {
        match &self.dialog {
            Some(DialogKind::Input {
                selected_button, ..
            })
            | Some(DialogKind::Confirm {
                selected_button, ..
            }) => Some(*selected_button),
            _ => None,
        }
    }

    fn dialog_toggle_button(&mut self) {
        if let Some(DialogKind::Input {
            selected_button, ..
        })
        | Some(DialogKind::Confirm {
            selected_button, ..
        }) = &mut self.dialog
        {
            *selected_button = if *selected_button == 0 { 1 } else { 0 };
        }
    }

    /// 입력 다이얼로그 확인 (목적에 따라 다음 단계 실행)
    pub fn confirm_input_dialog(&mut self) {
        let Some(DialogKind::Input { input, purpose, .. }) = self.dialog.take() else {
            return;
        };
        let value = input.into_value();
        if value.trim().is_empty()
            && !matches!(purpose, InputPurpose::Password(_) | InputPurpose::GoToPath)
        {
            return;
        }
        match purpose {
            InputPurpose::OpenArchive => self.open_from_input(&value),
            InputPurpose::NewArchive => self.create_from_input(&value),
            InputPurpose::AddFiles => self.add_from_input(&value),
            InputPurpose::AddFolder => self.add_folder_from_input(&value),
            InputPurpose::ExtractDestination {
                selection,
                password,
            } => self.extract_to_input(&value, selection, password),
            InputPurpose::GoToPath => self.go_to_path(&value),
            InputPurpose::Password(next) => self.continue_with_password(next, value),
        }
    }

    /// 확인 다이얼로그 OK
    pub fn confirm_dialog(&mut self) {
        let Some(DialogKind::Confirm { purpose, .. }) = self.dialog.take() else {
            return;
        };
        match purpose {
            ConfirmPurpose::Delete { selection } => {
                self.run_command(Command::Delete { selection })
            }
            ConfirmPurpose::CreateDestination {
                dest,
                selection,
                password,
            } => self.create_destination_and_extract(dest, selection, password),
        }
    }
}
