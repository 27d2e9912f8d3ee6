// 터미널이 너무 작을 때 표시되는 경고 화면

use crate::ui::layout::{MIN_HEIGHT, MIN_WIDTH};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// 경고 화면 컴포넌트
pub struct WarningScreen {
    /// 현재 터미널 크기
    current_size: (u16, u16),
    /// 경고 색상
    warning_color: Color,
    /// 배경색
    bg_color: Color,
    /// 전경색
    fg_color: Color,
}

impl WarningScreen {
    pub fn new(theme: &Theme) -> Self {
        Self {
            current_size: (0, 0),
            warning_color: theme.warning.to_color(),
            bg_color: theme.bg_primary.to_color(),
            fg_color: theme.fg_primary.to_color(),
        }
    }

    pub fn current_size(mut self, width: u16, height: u16) -> Self {
        self.current_size = (width, height);
        self
    }
}

impl Widget for WarningScreen {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold = Style::default()
            .fg(self.warning_color)
            .add_modifier(Modifier::BOLD);
        let lines = vec![
            Line::from(Span::styled("Terminal Too Small", bold)),
            Line::from(""),
            Line::from(Span::styled(
                format!(
                    "{}x{} < {}x{}",
                    self.current_size.0, self.current_size.1, MIN_WIDTH, MIN_HEIGHT
                ),
                Style::default().fg(self.fg_color),
            )),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.warning_color))
            .style(Style::default().bg(self.bg_color));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .block(block)
            .render(area, buf);
    }
}
