// Status bar component - 상태바 컴포넌트
//
// 항목 수, 총 크기, 작업 진행률/메시지, 보기 모드 표시

use crate::ui::Theme;
use crate::utils::formatter::format_percent;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

/// 상태바 컴포넌트
pub struct StatusBar<'a> {
    /// 파일 개수
    file_count: usize,
    /// 디렉토리 개수
    dir_count: usize,
    /// 총 크기 (포맷된 문자열)
    total_size: &'a str,
    /// 표시한 항목 수
    marked_count: usize,
    /// 진행 중인 작업 진행률 (없으면 None)
    progress: Option<f64>,
    /// 작업 메시지 또는 알림
    message: &'a str,
    /// 보기 모드 표시 (TREE/FLAT)
    view_mode: &'a str,
    /// 배경색
    bg_color: Color,
    /// 전경색
    fg_color: Color,
    /// 작업 진행률/메시지 강조 색상
    highlight_color: Color,
}

impl Default for StatusBar<'_> {
    fn default() -> Self {
        Self {
            file_count: 0,
            dir_count: 0,
            total_size: "0B",
            marked_count: 0,
            progress: None,
            message: "",
            view_mode: "TREE",
            bg_color: Color::Rgb(30, 30, 30),
            fg_color: Color::Rgb(212, 212, 212),
            highlight_color: Color::Yellow,
        }
    }
}

impl<'a> StatusBar<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(mut self, file_count: usize, dir_count: usize) -> Self {
        self.file_count = file_count;
        self.dir_count = dir_count;
        self
    }

    pub fn total_size(mut self, size: &'a str) -> Self {
        self.total_size = size;
        self
    }

    pub fn marked_count(mut self, count: usize) -> Self {
        self.marked_count = count;
        self
    }

    pub fn progress(mut self, progress: Option<f64>) -> Self {
        self.progress = progress;
        self
    }

    pub fn message(mut self, message: &'a str) -> Self {
        self.message = message;
        self
    }

    pub fn view_mode(mut self, label: &'a str) -> Self {
        self.view_mode = label;
        self
    }

    pub fn theme(mut self, theme: &Theme) -> Self {
        self.bg_color = theme.status_bar_bg.to_color();
        self.fg_color = theme.status_bar_fg.to_color();
        self.highlight_color = theme.warning.to_color();
        self
    }

    fn left_text(&self) -> String {
        let mut text = format!(
            " {} files, {} dirs | {}",
            self.file_count, self.dir_count, self.total_size
        );
        if self.marked_count > 0 {
            text.push_str(&format!(" | {} marked", self.marked_count));
        }
        text
    }

    fn activity_text(&self) -> String {
        match (self.progress, self.message.is_empty()) {
            (Some(fraction), true) => format!(" | {}", format_percent(fraction)),
            (Some(fraction), false) => {
                format!(" | {} {}", format_percent(fraction), self.message)
            }
            (None, false) => format!(" | {}", self.message),
            (None, true) => String::new(),
        }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(self.bg_color));

        let left = self.left_text();
        let activity = self.activity_text();
        let right = format!("[{}] ", self.view_mode);

        let used = left.width() + activity.width() + right.width();
        let padding = " ".repeat(usize::from(area.width).saturating_sub(used));

        let line = Line::from(vec![
            Span::styled(left, Style::default().fg(self.fg_color)),
            Span::styled(activity, Style::default().fg(self.highlight_color)),
            Span::raw(padding),
            Span::styled(right, Style::default().fg(self.fg_color)),
        ]);
        Paragraph::new(line).render(area, buf);
    }
}
