// Command bar component - 하단 단축키 안내

use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// 커맨드 항목
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandItem {
    /// 단축키 (o, x, ...)
    pub key: &'static str,
    /// 레이블 (Open, Extract, ...)
    pub label: &'static str,
    /// 활성화 여부 (작업 중이거나 압축 파일이 없으면 비활성)
    pub enabled: bool,
}

impl CommandItem {
    pub fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// 커맨드 바 컴포넌트
pub struct CommandBar {
    /// 커맨드 항목들
    commands: Vec<CommandItem>,
    /// 배경색
    bg_color: Color,
    /// 전경색 (키)
    key_fg_color: Color,
    /// 전경색 (레이블)
    label_fg_color: Color,
    /// 비활성 색상
    disabled_color: Color,
}

impl CommandBar {
    pub fn new(commands: Vec<CommandItem>) -> Self {
        Self {
            commands,
            bg_color: Color::Rgb(30, 30, 30),
            key_fg_color: Color::Rgb(0, 120, 212),
            label_fg_color: Color::Rgb(212, 212, 212),
            disabled_color: Color::Rgb(100, 100, 100),
        }
    }

    pub fn theme(mut self, theme: &Theme) -> Self {
        self.bg_color = theme.command_bar_bg.to_color();
        self.key_fg_color = theme.accent.to_color();
        self.label_fg_color = theme.command_bar_fg.to_color();
        self
    }
}

impl Widget for CommandBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(self.bg_color));

        let mut spans = vec![Span::raw(" ")];
        for (i, cmd) in self.commands.iter().enumerate() {
            let (key_style, label_style) = if cmd.enabled {
                (
                    Style::default()
                        .fg(self.key_fg_color)
                        .add_modifier(Modifier::BOLD),
                    Style::default().fg(self.label_fg_color),
                )
            } else {
                (
                    Style::default().fg(self.disabled_color),
                    Style::default().fg(self.disabled_color),
                )
            };

            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(cmd.key, key_style));
            spans.push(Span::styled(":", label_style));
            spans.push(Span::styled(cmd.label, label_style));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
