//! 액션 레지스트리
//!
//! 키 바인딩과 커맨드바 항목이 모두 이 표를 참조합니다.

use crate::ui::components::command_bar::CommandItem;
use crossterm::event::{KeyCode, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Navigation
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    Activate,
    GoToParent,
    GoToPath,
    ToggleViewMode,
    ToggleTreePane,
    SwitchPane,
    // Selection
    ToggleMark,
    MarkAll,
    // Archive
    OpenArchive,
    NewArchive,
    AddFiles,
    AddFolder,
    Delete,
    Extract,
    ExtractHere,
    TestArchive,
    Reload,
    Stop,
    // System
    Quit,
}

/// 액션 정의
pub struct ActionDef {
    pub action: Action,
    pub label: &'static str,
    /// 커맨드바 표시 키 (없으면 표시 안 함)
    pub command_key: Option<&'static str>,
    /// 작업 진행 중에는 실행할 수 없음
    pub requires_idle: bool,
    /// 열린 압축 파일이 있어야 함
    pub requires_archive: bool,
}

/// 키 바인딩 (modifiers가 None이면 modifier 무시)
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: Option<KeyModifiers>,
    pub action: Action,
}

const fn def(
    action: Action,
    label: &'static str,
    command_key: Option<&'static str>,
    requires_idle: bool,
    requires_archive: bool,
) -> ActionDef {
    ActionDef {
        action,
        label,
        command_key,
        requires_idle,
        requires_archive,
    }
}

pub static ACTION_DEFS: &[ActionDef] = &[
    def(Action::MoveUp, "Move up", None, false, false),
    def(Action::MoveDown, "Move down", None, false, false),
    def(Action::PageUp, "Page up", None, false, false),
    def(Action::PageDown, "Page down", None, false, false),
    def(Action::GoToTop, "Top", None, false, false),
    def(Action::GoToBottom, "Bottom", None, false, false),
    def(Action::Activate, "Open folder", None, true, true),
    def(Action::GoToParent, "Parent", None, true, true),
    def(Action::GoToPath, "Go to", Some("g"), true, true),
    def(Action::ToggleViewMode, "View", Some("v"), true, false),
    def(Action::ToggleTreePane, "Tree", Some("T"), false, false),
    def(Action::SwitchPane, "Switch pane", None, false, true),
    def(Action::ToggleMark, "Mark", None, false, true),
    def(Action::MarkAll, "Mark all", None, false, true),
    def(Action::OpenArchive, "Open", Some("o"), true, false),
    def(Action::NewArchive, "New", Some("n"), true, false),
    def(Action::AddFiles, "Add", Some("+"), true, true),
    def(Action::AddFolder, "Add folder", Some("A"), true, true),
    def(Action::Delete, "Del", Some("d"), true, true),
    def(Action::Extract, "Extract", Some("x"), true, true),
    def(Action::ExtractHere, "Here", Some("e"), true, true),
    def(Action::TestArchive, "Test", Some("t"), true, true),
    def(Action::Reload, "Reload", Some("r"), true, true),
    def(Action::Stop, "Stop", Some("s"), false, false),
    def(Action::Quit, "Quit", Some("q"), false, false),
];

pub static KEY_BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        code: KeyCode::Up,
        modifiers: None,
        action: Action::MoveUp,
    },
    KeyBinding {
        code: KeyCode::Char('k'),
        modifiers: Some(KeyModifiers::NONE),
        action: Action::MoveUp,
    },
    KeyBinding {
        code: KeyCode::Down,
        modifiers: None,
        action: Action::MoveDown,
    },
    KeyBinding {
        code: KeyCode::Char('j'),
        modifiers: Some(KeyModifiers::NONE),
        action: Action::MoveDown,
    },
    KeyBinding {
        code: KeyCode::PageUp,
        modifiers: None,
        action: Action::PageUp,
    },
    KeyBinding {
        code: KeyCode::PageDown,
        modifiers: None,
        action: Action::PageDown,
    },
    KeyBinding {
        code: KeyCode::Home,
        modifiers: None,
        action: Action::GoToTop,
    },
    KeyBinding {
        code: KeyCode::End,
        modifiers: None,
        action: Action::GoToBottom,
    },
    KeyBinding {
        code: KeyCode::Enter,
        modifiers: None,
        action: Action::Activate,
    },
    KeyBinding {
        code: KeyCode::Backspace,
        modifiers: None,
        action: Action::GoToParent,
    },
    KeyBinding {
        code: KeyCode::Char('g'),
        modifiers: Some(KeyModifiers::NONE),
        action: Action::GoToPath,
    },
    KeyBinding {
        code: KeyCode::Char('v'),
        modifiers: Some(KeyModifiers::NONE),
        action: Action::ToggleViewMode,
    },
    KeyBinding {
        code: KeyCode::Char('T'),
        modifiers: Some(KeyModifiers::NONE),
        action: Action::ToggleTreePane,
    },
    KeyBinding {
        code: KeyCode::Tab,
        modifiers: None,
        action: Action::SwitchPane,
    },
    KeyBinding {
        code: KeyCode::Char(' '),
        modifiers: None,
        action: Action::ToggleMark,
    },
    KeyBinding {
        code: KeyCode::Char('a'),
        modifiers: Some(KeyModifiers::NONE),
        action: Action::MarkAll,
    },
    KeyBinding {
        code: KeyCode::Char('o'),
        modifiers: Some(KeyModifiers::NONE),
        action: Action::OpenArchive,
    },
    KeyBinding {
        code: KeyCode::Char('n'),
        modifiers: Some(KeyModifiers::NONE),
        action: Action::NewArchive,
    },
    KeyBinding {
        code: KeyCode::Char('+'),
        modifiers: None,
        action: Action::AddFiles,
    },
    KeyBinding {
        code: KeyCode::Char('A'),
        modifiers: Some(KeyModifiers::NONE),
        action: Action::AddFolder,
    },
    KeyBinding {
        code: KeyCode::Char('d'),
        modifiers: Some(KeyModifiers::NONE),
        action: Action::Delete,
    },
    KeyBinding {
        code: KeyCode::Delete,
        modifiers: None,
        action: Action::Delete,
    },
    KeyBinding {
        code: KeyCode::Char('x'),
        modifiers: Some(KeyModifiers::NONE),
        action: Action::Extract,
    },
    KeyBinding {
        code: KeyCode::Char('e'),
        modifiers: Some(KeyModifiers::NONE),
        action: Action::ExtractHere,
    },
    KeyBinding {
        code: KeyCode::Char('t'),
        modifiers: Some(KeyModifiers::NONE),
        action: Action::TestArchive,
    },
    KeyBinding {
        code: KeyCode::Char('r'),
        modifiers: Some(KeyModifiers::NONE),
        action: Action::Reload,
    },
    KeyBinding {
        code: KeyCode::F(5),
        modifiers: None,
        action: Action::Reload,
    },
    KeyBinding {
        code: KeyCode::Char('s'),
        modifiers: Some(KeyModifiers::NONE),
        action: Action::Stop,
    },
    KeyBinding {
        code: KeyCode::Char('q'),
        modifiers: Some(KeyModifiers::NONE),
        action: Action::Quit,
    },
    KeyBinding {
        code: KeyCode::Char('c'),
        modifiers: Some(KeyModifiers::CONTROL),
        action: Action::Quit,
    },
];

impl Action {
    pub fn def(&self) -> Option<&'static ActionDef> {
        ACTION_DEFS.iter().find(|d| d.action == *self)
    }

    pub fn label(&self) -> &'static str {
        self.def().map(|d| d.label).unwrap_or("")
    }

    pub fn requires_idle(&self) -> bool {
        self.def().is_some_and(|d| d.requires_idle)
    }

    pub fn requires_archive(&self) -> bool {
        self.def().is_some_and(|d| d.requires_archive)
    }
}

/// 키 입력으로 액션 조회
pub fn find_action(modifiers: KeyModifiers, code: KeyCode) -> Option<Action> {
    // 대문자/기호 입력은 SHIFT가 함께 올 수 있음
    let modifiers = modifiers.difference(KeyModifiers::SHIFT);
    KEY_BINDINGS
        .iter()
        .find(|binding| {
            binding.code == code
                && binding
                    .modifiers
                    .map_or(true, |required| modifiers == required)
        })
        .map(|binding| binding.action)
}

/// 커맨드바 항목 (작업 중/압축 파일 없음이면 비활성)
pub fn command_bar_items(busy: bool, archive_loaded: bool) -> Vec<CommandItem> {
    ACTION_DEFS
        .iter()
        .filter_map(|d| {
            let key = d.command_key?;
            let enabled = !(d.requires_idle && busy) && (archive_loaded || !d.requires_archive);
            let enabled = if d.action == Action::Stop { busy } else { enabled };
            Some(CommandItem::new(key, d.label).enabled(enabled))
        })
        .collect()
}
