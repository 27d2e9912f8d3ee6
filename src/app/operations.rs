use super::*;
use crate::core::navigation::Reconciliation;
use crate::ui::{ConfirmPurpose, InputPurpose, PasswordPurpose};
use crate::utils::formatter::pluralize;
use std::fs;

impl<E: ArchiveEngine> App<E> {
    // === 작업 시작 (다이얼로그 열기) ===

    pub(super) fn start_open(&mut self) {
        let initial = self.initial_dir_text();
        self.dialog = Some(DialogKind::input(
            "Open",
            "Archive to open:",
            initial,
            InputPurpose::OpenArchive,
        ));
    }

    pub(super) fn start_new(&mut self) {
        let initial = self.initial_dir_text();
        self.dialog = Some(DialogKind::input(
            "New archive",
            "File name (.zip, .tar, .tar.gz, .tar.zst, .7z):",
            initial,
            InputPurpose::NewArchive,
        ));
    }

    /// 추가 대상 폴더 표시 (평면 보기는 루트)
    fn add_target_label(&self) -> String {
        match self.view_mode() {
            ViewMode::Tree => format!("/{}", self.session.navigator().current_path()),
            ViewMode::Flat => "/".to_string(),
        }
    }

    pub(super) fn start_add(&mut self) {
        self.dialog = Some(DialogKind::input(
            "Add files",
            format!("Files to add into {} (space separated):", self.add_target_label()),
            "",
            InputPurpose::AddFiles,
        ));
    }

    pub(super) fn start_add_folder(&mut self) {
        let initial = self.initial_dir_text();
        self.dialog = Some(DialogKind::input(
            "Add folder",
            format!("Folder to add into {}:", self.add_target_label()),
            initial,
            InputPurpose::AddFolder,
        ));
    }

    pub(super) fn start_delete(&mut self) {
        let selection = self.session.selection_paths(&self.target_rows());
        if selection.is_empty() {
            self.set_toast("Nothing selected");
            return;
        }
        if !self.config.confirm_delete {
            self.run_command(Command::Delete { selection });
            return;
        }
        let message = match selection.as_slice() {
            [single] => format!("Delete \"{}\" from the archive?", single),
            many => format!(
                "Delete {} from the archive?",
                pluralize(many.len(), "item", "items")
            ),
        };
        self.dialog = Some(DialogKind::confirm(
            "Delete",
            message,
            ConfirmPurpose::Delete { selection },
        ));
    }

    /// 해제 (표시한 항목, 없으면 전체)
    pub(super) fn start_extract(&mut self) {
        let marked: Vec<ListingRow> = self
            .rows
            .iter()
            .filter(|row| self.marked.contains(row))
            .copied()
            .collect();
        let selection = self.session.selection_paths(&marked);
        if self.session.requires_password() {
            self.dialog = Some(DialogKind::password(PasswordPurpose::Extract { selection }));
        } else {
            self.ask_extract_destination(selection, None);
        }
    }

    pub(super) fn start_extract_here(&mut self) {
        if self.session.requires_password() {
            self.dialog = Some(DialogKind::password(PasswordPurpose::ExtractHere));
        } else {
            self.run_command(Command::ExtractHere { password: None });
        }
    }

    pub(super) fn start_test(&mut self) {
        if self.session.requires_password() {
            self.dialog = Some(DialogKind::password(PasswordPurpose::Test));
        } else {
            self.run_command(Command::Test { password: None });
        }
    }

    pub(super) fn ask_extract_destination(
        &mut self,
        selection: Vec<String>,
        password: Option<String>,
    ) {
        let what = if selection.is_empty() {
            "all files".to_string()
        } else {
            pluralize(selection.len(), "item", "items")
        };
        let initial = self.initial_dir_text();
        self.dialog = Some(DialogKind::input(
            "Extract",
            format!("Extract {} to folder:", what),
            initial,
            InputPurpose::ExtractDestination {
                selection,
                password,
            },
        ));
    }

    // === 다이얼로그 확인 후 실행 ===

    pub(super) fn open_from_input(&mut self, value: &str) {
        let path = self.resolve_input_path(value);
        self.remember_parent(&path);
        self.run_command(Command::Open { path });
    }

    pub(super) fn create_from_input(&mut self, value: &str) {
        let path = self.resolve_input_path(value);
        if path.exists() {
            self.show_error(
                "New archive",
                &ArchiverError::Io(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("{} already exists", path.display()),
                )),
            );
            return;
        }
        self.remember_parent(&path);
        self.run_command(Command::Create {
            path,
            queued: Vec::new(),
        });
    }

    /// 셸 문법 파일 목록 추가
    pub(super) fn add_from_input(&mut self, value: &str) {
        let Some(words) = shlex::split(value) else {
            self.set_toast("Unbalanced quotes in file list");
            return;
        };
        let paths: Vec<PathBuf> = words
            .iter()
            .filter(|word| !word.is_empty())
            .map(|word| self.resolve_input_path(word))
            .collect();
        if paths.is_empty() {
            self.set_toast("No files given");
            return;
        }
        self.run_command(Command::AddFiles { paths });
    }

    pub(super) fn add_folder_from_input(&mut self, value: &str) {
        let path = self.resolve_input_path(value);
        if !path.is_dir() {
            self.show_error(
                "Add folder",
                &ArchiverError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} is not a folder", path.display()),
                )),
            );
            return;
        }
        self.remember_parent(&path);
        self.run_command(Command::AddFolder { path });
    }

    /// 해제 폴더 확인 (없으면 생성 여부 확인)
    pub(super) fn extract_to_input(
        &mut self,
        value: &str,
        selection: Vec<String>,
        password: Option<String>,
    ) {
        let dest = self.resolve_input_path(value);
        if dest.is_dir() {
            self.remember_dir(&dest);
            self.run_command(Command::Extract {
                dest,
                selection,
                password,
            });
            return;
        }
        let message = format!("Folder {} does not exist. Create it?", dest.display());
        self.dialog = Some(DialogKind::confirm(
            "Extract",
            message,
            ConfirmPurpose::CreateDestination {
                dest,
                selection,
                password,
            },
        ));
    }

    pub(super) fn create_destination_and_extract(
        &mut self,
        dest: PathBuf,
        selection: Vec<String>,
        password: Option<String>,
    ) {
        if let Err(e) = fs::create_dir_all(&dest) {
            self.show_error("Extract", &ArchiverError::Io(e));
            return;
        }
        self.run_command(Command::Extract {
            dest,
            selection,
            password,
        });
    }

    pub(super) fn continue_with_password(&mut self, purpose: PasswordPurpose, password: String) {
        let password = Some(password).filter(|p| !p.is_empty());
        match purpose {
            PasswordPurpose::Extract { selection } => {
                self.ask_extract_destination(selection, password)
            }
            PasswordPurpose::ExtractHere => self.run_command(Command::ExtractHere { password }),
            PasswordPurpose::Test => self.run_command(Command::Test { password }),
        }
    }

    // === 엔진 알림 반영 ===

    pub(crate) fn apply_notice(&mut self, notice: SessionNotice) {
        match notice {
            SessionNotice::Started(action) => {
                self.activity = Activity {
                    action: Some(action),
                    fraction: 0.0,
                    message: action.name().to_string(),
                    stoppable: false,
                };
                if self.dialog.is_none() || self.dialog.as_ref().is_some_and(DialogKind::is_progress)
                {
                    self.dialog = Some(DialogKind::progress(action.name()));
                }
            }
            SessionNotice::Progress(fraction) => {
                self.activity.fraction = fraction;
                if let Some(DialogKind::Progress { fraction: f, .. }) = &mut self.dialog {
                    *f = fraction;
                }
            }
            SessionNotice::Message(message) => {
                if let Some(DialogKind::Progress { message: m, .. }) = &mut self.dialog {
                    m.clone_from(&message);
                }
                self.activity.message = message;
            }
            SessionNotice::Stoppable(stoppable) => {
                self.activity.stoppable = stoppable;
                if let Some(DialogKind::Progress { stoppable: s, .. }) = &mut self.dialog {
                    *s = stoppable;
                }
            }
            SessionNotice::ContentInvalidated => {
                self.rows.clear();
                self.marked.clear();
            }
            SessionNotice::ContentChanged(outcome) => {
                self.reload_rows();
                if outcome == Reconciliation::FellBackToRoot {
                    self.set_toast("Folder no longer exists, showing archive root");
                }
            }
            SessionNotice::TestPassed(summary) => {
                let message = format!(
                    "No errors found ({} tested).",
                    pluralize(summary.total_items, "file", "files")
                );
                self.show_message("Test archive", &message);
            }
            SessionNotice::Completed { action, summary } => {
                self.set_toast(&format!(
                    "{}: {} done",
                    action.name(),
                    pluralize(summary.items_processed, "item", "items")
                ));
            }
            SessionNotice::Error { action, message } => {
                // 실패하면 이전 목록이 복원됨
                self.reload_rows();
                self.dialog = Some(DialogKind::error(action.name(), message));
            }
        }
    }

    // === 경로 입력 ===

    /// 입력 다이얼로그 초기값 (마지막 폴더 + "/")
    fn initial_dir_text(&self) -> String {
        let mut text = self.working_dir.display().to_string();
        if !text.ends_with(std::path::MAIN_SEPARATOR) {
            text.push(std::path::MAIN_SEPARATOR);
        }
        text
    }

    /// 사용자 입력 경로 해석 (`~` 확장, 상대 경로는 작업 폴더 기준)
    pub(super) fn resolve_input_path(&self, value: &str) -> PathBuf {
        let value = value.trim();
        let expanded = match value.strip_prefix('~') {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => dirs::home_dir()
                .map(|home| home.join(rest.trim_start_matches('/')))
                .unwrap_or_else(|| PathBuf::from(value)),
            _ => PathBuf::from(value),
        };
        if expanded.is_absolute() {
            expanded
        } else {
            self.working_dir.join(expanded)
        }
    }

    fn remember_dir(&mut self, dir: &Path) {
        if dir.is_dir() {
            self.working_dir = dir.to_path_buf();
        }
    }

    fn remember_parent(&mut self, path: &Path) {
        if let Some(parent) = path.parent() {
            self.remember_dir(parent);
        }
    }
}
