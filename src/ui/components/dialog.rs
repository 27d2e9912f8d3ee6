//! 다이얼로그
//!
//! 입력, 확인, 진행률, 메시지, 오류 다이얼로그 상태와 렌더링

use crate::ui::components::text_input::TextInput;
use crate::ui::Theme;
use crate::utils::formatter::format_percent;
use crate::utils::path_display::truncate_name;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget, Wrap},
};
use std::path::PathBuf;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// 다이얼로그 내부 좌우 패딩
const DIALOG_H_PADDING: u16 = 2;
/// 다이얼로그 내부 상단 패딩
const DIALOG_V_PADDING: u16 = 1;

/// 암호 입력 후 이어서 할 작업
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordPurpose {
    Extract { selection: Vec<String> },
    ExtractHere,
    Test,
}

/// 입력 다이얼로그 목적
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPurpose {
    OpenArchive,
    NewArchive,
    /// 추가할 로컬 파일 (셸 문법 목록)
    AddFiles,
    /// 추가할 로컬 폴더 (하위 항목 포함)
    AddFolder,
    ExtractDestination {
        selection: Vec<String>,
        password: Option<String>,
    },
    GoToPath,
    Password(PasswordPurpose),
}

/// 확인 다이얼로그 목적
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmPurpose {
    Delete { selection: Vec<String> },
    /// 없는 해제 폴더 생성 후 해제
    CreateDestination {
        dest: PathBuf,
        selection: Vec<String>,
        password: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DialogKind {
    Input {
        title: String,
        prompt: String,
        input: TextInput,
        selected_button: usize, // 0: OK, 1: Cancel
        purpose: InputPurpose,
        mask_input: bool,
    },
    Confirm {
        title: String,
        message: String,
        selected_button: usize, // 0: OK, 1: Cancel
        purpose: ConfirmPurpose,
    },
    Progress {
        title: String,
        fraction: f64,
        message: String,
        stoppable: bool,
    },
    Message {
        title: String,
        message: String,
    },
    Error {
        title: String,
        message: String,
    },
}

impl DialogKind {
    pub fn input(
        title: impl Into<String>,
        prompt: impl Into<String>,
        initial: impl Into<String>,
        purpose: InputPurpose,
    ) -> Self {
        DialogKind::Input {
            title: title.into(),
            prompt: prompt.into(),
            input: TextInput::new(initial),
            selected_button: 0,
            purpose,
            mask_input: false,
        }
    }

    pub fn password(purpose: PasswordPurpose) -> Self {
        DialogKind::Input {
            title: "Password".to_string(),
            prompt: "Archive password:".to_string(),
            input: TextInput::default(),
            selected_button: 0,
            purpose: InputPurpose::Password(purpose),
            mask_input: true,
        }
    }

    pub fn confirm(
        title: impl Into<String>,
        message: impl Into<String>,
        purpose: ConfirmPurpose,
    ) -> Self {
        DialogKind::Confirm {
            title: title.into(),
            message: message.into(),
            selected_button: 0,
            purpose,
        }
    }

    pub fn progress(title: impl Into<String>) -> Self {
        DialogKind::Progress {
            title: title.into(),
            fraction: 0.0,
            message: String::new(),
            stoppable: false,
        }
    }

    pub fn message(title: impl Into<String>, message: impl Into<String>) -> Self {
        DialogKind::Message {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        DialogKind::Error {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn is_progress(&self) -> bool {
        matches!(self, DialogKind::Progress { .. })
    }
}

pub struct Dialog<'a> {
    kind: &'a DialogKind,
    bg_color: Color,
    fg_color: Color,
    border_color: Color,
    title_color: Color,
    error_color: Color,
    button_bg: Color,
    button_fg: Color,
    button_selected_bg: Color,
    button_selected_fg: Color,
    input_bg: Color,
    progress_filled: Color,
    progress_unfilled: Color,
}

impl<'a> Dialog<'a> {
    pub fn new(kind: &'a DialogKind, theme: &Theme) -> Self {
        Self {
            kind,
            bg_color: theme.bg_primary.to_color(),
            fg_color: theme.fg_primary.to_color(),
            border_color: theme.pane_active_border.to_color(),
            title_color: theme.accent.to_color(),
            error_color: theme.error.to_color(),
            button_bg: theme.command_bar_bg.to_color(),
            button_fg: theme.fg_primary.to_color(),
            button_selected_bg: theme.entry_selected_bg.to_color(),
            button_selected_fg: theme.entry_selected.to_color(),
            input_bg: theme.command_bar_bg.to_color(),
            progress_filled: theme.accent.to_color(),
            progress_unfilled: theme.pane_inactive_border.to_color(),
        }
    }

    /// 다이얼로그 영역 (화면 중앙)
    fn calculate_area(&self, screen: Rect) -> Rect {
        let sw = screen.width;
        let sh = screen.height;
        let (width, height) = match self.kind {
            DialogKind::Input { .. } => (60u16.min(sw.saturating_sub(4)).max(30), 7u16),
            DialogKind::Confirm { message, .. } => {
                let lines = message.lines().count().max(1) as u16;
                (50u16.min(sw.saturating_sub(4)).max(30), (5 + lines).max(7))
            }
            DialogKind::Progress { .. } => (50u16.min(sw.saturating_sub(4)).max(30), 8u16),
            DialogKind::Message { message, .. } | DialogKind::Error { message, .. } => {
                let lines = message.lines().count().max(1) as u16;
                (60u16.min(sw.saturating_sub(4)).max(30), (6 + lines).max(6))
            }
        };
        let width = width.min(sw);
        let height = height.min(sh);

        Rect {
            x: screen.x + sw.saturating_sub(width) / 2,
            y: screen.y + sh.saturating_sub(height) / 2,
            width,
            height,
        }
    }

    fn frame(&self, buf: &mut Buffer, area: Rect, title: &str, accent: Color) -> Rect {
        Block::default()
            .title(format!(" {} ", title))
            .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent))
            .style(Style::default().bg(self.bg_color))
            .render(area, buf);

        Rect {
            x: area.x + DIALOG_H_PADDING,
            y: area.y + DIALOG_V_PADDING,
            width: area.width.saturating_sub(DIALOG_H_PADDING * 2),
            height: area.height.saturating_sub(DIALOG_V_PADDING * 2),
        }
    }

    fn render_button(&self, buf: &mut Buffer, x: u16, y: u16, label: &str, selected: bool) -> u16 {
        let (bg, fg) = if selected {
            (self.button_selected_bg, self.button_selected_fg)
        } else {
            (self.button_bg, self.button_fg)
        };
        let padded = format!(" {} ", label);
        buf.set_string(x, y, &padded, Style::default().fg(fg).bg(bg));
        padded.width() as u16
    }

    fn render_ok_cancel(&self, buf: &mut Buffer, area: Rect, selected_button: usize) {
        let y = area.y + area.height.saturating_sub(2);
        let x = area.x + area.width.saturating_sub(16) / 2;
        let ok_width = self.render_button(buf, x, y, "OK", selected_button == 0);
        self.render_button(buf, x + ok_width + 2, y, "Cancel", selected_button == 1);
    }

    #[allow(clippy::too_many_arguments)]
    fn render_input(
        &self,
        buf: &mut Buffer,
        area: Rect,
        title: &str,
        prompt: &str,
        input: &TextInput,
        mask_input: bool,
        selected_button: usize,
    ) {
        let inner = self.frame(buf, area, title, self.title_color);
        buf.set_string(inner.x, inner.y, prompt, Style::default().fg(self.fg_color));

        let input_y = inner.y + 1;
        let field_style = Style::default().fg(self.fg_color).bg(self.input_bg);
        buf.set_string(inner.x, input_y, " ".repeat(usize::from(inner.width)), field_style);

        let shown: String = if mask_input {
            "*".repeat(input.value().chars().count())
        } else {
            input.value().to_string()
        };
        let cursor_chars = input.value()[..input.cursor()].chars().count();
        let (visible, cursor_col) = scroll_to_cursor(
            &shown,
            cursor_chars,
            usize::from(inner.width.saturating_sub(2)),
        );
        buf.set_string(inner.x + 1, input_y, &visible, field_style);

        let cursor_x = inner.x + 1 + cursor_col as u16;
        if cursor_x < inner.x + inner.width {
            if let Some(cell) = buf.cell_mut((cursor_x, input_y)) {
                cell.set_style(Style::default().fg(self.input_bg).bg(self.fg_color));
            }
        }

        self.render_ok_cancel(buf, area, selected_button);
    }

    fn render_confirm(
        &self,
        buf: &mut Buffer,
        area: Rect,
        title: &str,
        message: &str,
        selected_button: usize,
    ) {
        let inner = self.frame(buf, area, title, self.title_color);
        Paragraph::new(message)
            .style(Style::default().fg(self.fg_color))
            .wrap(Wrap { trim: true })
            .render(
                Rect {
                    height: inner.height.saturating_sub(2),
                    ..inner
                },
                buf,
            );
        self.render_ok_cancel(buf, area, selected_button);
    }

    fn render_progress(
        &self,
        buf: &mut Buffer,
        area: Rect,
        title: &str,
        fraction: f64,
        message: &str,
        stoppable: bool,
    ) {
        let inner = self.frame(buf, area, title, self.title_color);
        let text_style = Style::default().fg(self.fg_color);
        let shown = truncate_name(message, usize::from(inner.width));
        buf.set_string(inner.x, inner.y, &shown, text_style);

        Gauge::default()
            .ratio(fraction.clamp(0.0, 1.0))
            .gauge_style(
                Style::default()
                    .fg(self.progress_filled)
                    .bg(self.progress_unfilled),
            )
            .label(format_percent(fraction).trim_start().to_string())
            .render(
                Rect {
                    y: inner.y + 2,
                    height: 1,
                    ..inner
                },
                buf,
            );

        if stoppable {
            buf.set_string(
                inner.x,
                inner.y + 4,
                "Esc/s: stop",
                text_style.add_modifier(Modifier::DIM),
            );
        }
    }

    fn render_message(&self, buf: &mut Buffer, area: Rect, title: &str, message: &str, is_error: bool) {
        let accent = if is_error {
            self.error_color
        } else {
            self.title_color
        };
        let inner = self.frame(buf, area, title, accent);
        Paragraph::new(message)
            .style(Style::default().fg(self.fg_color))
            .wrap(Wrap { trim: false })
            .render(
                Rect {
                    height: inner.height.saturating_sub(2),
                    ..inner
                },
                buf,
            );
        let x = area.x + area.width.saturating_sub(6) / 2;
        self.render_button(buf, x, area.y + area.height.saturating_sub(2), "OK", true);
    }
}

/// 커서가 보이도록 입력값의 보이는 부분 계산
///
/// 반환값: (보이는 문자열, 보이는 부분 기준 커서 열)
fn scroll_to_cursor(value: &str, cursor_chars: usize, max_width: usize) -> (String, usize) {
    let widths: Vec<usize> = value
        .chars()
        .map(|c| UnicodeWidthChar::width(c).unwrap_or(0))
        .collect();
    let cursor_col: usize = widths.iter().take(cursor_chars).sum();
    if cursor_col < max_width {
        return (value.to_string(), cursor_col);
    }

    // 커서가 오른쪽 끝에 오도록 앞부분 생략
    let mut skip = 0;
    let mut skipped_width = 0;
    while cursor_col - skipped_width >= max_width && skip < widths.len() {
        skipped_width += widths[skip];
        skip += 1;
    }
    let visible: String = value.chars().skip(skip).collect();
    (visible, cursor_col - skipped_width)
}

impl Widget for Dialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dialog_area = self.calculate_area(area);
        Clear.render(dialog_area, buf);

        match self.kind {
            DialogKind::Input {
                title,
                prompt,
                input,
                selected_button,
                mask_input,
                ..
            } => self.render_input(
                buf,
                dialog_area,
                title,
                prompt,
                input,
                *mask_input,
                *selected_button,
            ),
            DialogKind::Confirm {
                title,
                message,
                selected_button,
                ..
            } => self.render_confirm(buf, dialog_area, title, message, *selected_button),
            DialogKind::Progress {
                title,
                fraction,
                message,
                stoppable,
            } => self.render_progress(buf, dialog_area, title, *fraction, message, *stoppable),
            DialogKind::Message { title, message } => {
                self.render_message(buf, dialog_area, title, message, false)
            }
            DialogKind::Error { title, message } => {
                self.render_message(buf, dialog_area, title, message, true)
            }
        }
    }
}
