//! 항목 목록 창
//!
//! 현재 목록 행을 이름/종류/크기/수정 시각 컬럼으로 표시합니다.

use crate::core::projection::{ListingRow, RowView};
use crate::models::snapshot::Snapshot;
use crate::ui::Theme;
use crate::utils::formatter::{format_file_size, format_timestamp};
use crate::utils::mime::describe_content_type;
use crate::utils::path_display::truncate_name;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};
use std::collections::HashSet;
use unicode_width::UnicodeWidthStr;

/// 머리글 + 구분선
const HEADER_LINES: usize = 2;

pub struct FileList<'a> {
    title: &'a str,
    rows: &'a [ListingRow],
    snapshot: Option<&'a Snapshot>,
    flat: bool,
    cursor: usize,
    scroll_offset: usize,
    marked: Option<&'a HashSet<ListingRow>>,
    /// 스냅샷이 없을 때 표시할 문구
    placeholder: &'a str,
    active: bool,
    theme: Option<&'a Theme>,
}

/// 컬럼 레이아웃
struct ColumnLayout {
    show_type: bool,
    show_size: bool,
    name_width: usize,
    type_width: usize,
    date_width: usize,
}

impl ColumnLayout {
    /// 창 너비 기반 컬럼 표시 여부/크기 결정
    fn for_width(width: usize, has_scrollbar: bool) -> Self {
        let scrollbar_width = usize::from(has_scrollbar);
        let (show_type, show_size) = match width {
            w if w >= 70 => (true, true),
            w if w >= 45 => (false, true),
            _ => (false, false),
        };
        let type_width = if show_type { 14 } else { 0 };
        let size_width = if show_size { 10 } else { 0 };
        let date_width = 17;
        let margins = 2;
        let name_width = width
            .saturating_sub(type_width)
            .saturating_sub(size_width)
            .saturating_sub(date_width)
            .saturating_sub(margins)
            .saturating_sub(scrollbar_width);
        Self {
            show_type,
            show_size,
            name_width,
            type_width,
            date_width,
        }
    }
}

impl<'a> FileList<'a> {
    pub fn new(rows: &'a [ListingRow], snapshot: Option<&'a Snapshot>) -> Self {
        Self {
            title: "",
            rows,
            snapshot,
            flat: false,
            cursor: 0,
            scroll_offset: 0,
            marked: None,
            placeholder: "",
            active: true,
            theme: None,
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    pub fn flat(mut self, flat: bool) -> Self {
        self.flat = flat;
        self
    }

    pub fn cursor(mut self, cursor: usize) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn scroll_offset(mut self, offset: usize) -> Self {
        self.scroll_offset = offset;
        self
    }

    pub fn marked(mut self, marked: &'a HashSet<ListingRow>) -> Self {
        self.marked = Some(marked);
        self
    }

    pub fn placeholder(mut self, text: &'a str) -> Self {
        self.placeholder = text;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn theme(mut self, theme: &'a Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    fn color(&self, pick: impl Fn(&Theme) -> Color, fallback: Color) -> Color {
        self.theme.map(pick).unwrap_or(fallback)
    }

    fn render_header(&self, layout: &ColumnLayout, inner: Rect, buf: &mut Buffer) {
        let header_style = Style::default()
            .fg(self.color(|t| t.pane_inactive_border.to_color(), Color::Gray))
            .add_modifier(Modifier::BOLD);

        let mut spans = vec![
            Span::raw(" "),
            Span::styled(
                format!("{:<width$}", "Name", width = layout.name_width),
                header_style,
            ),
        ];
        if layout.show_type {
            spans.push(Span::styled(
                format!("{:<width$}", "Type", width = layout.type_width),
                header_style,
            ));
        }
        if layout.show_size {
            spans.push(Span::styled(format!("{:>9} ", "Size"), header_style));
        }
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!("{:<width$}", "Modified", width = layout.date_width),
            header_style,
        ));
        buf.set_line(inner.x, inner.y, &Line::from(spans), inner.width);

        buf.set_string(
            inner.x,
            inner.y + 1,
            "─".repeat(usize::from(inner.width)),
            Style::default().fg(self.color(|t| t.pane_inactive_border.to_color(), Color::DarkGray)),
        );
    }

    fn render_row(
        &self,
        row: &ListingRow,
        view: &RowView<'_>,
        index: usize,
        layout: &ColumnLayout,
        area: Rect,
        buf: &mut Buffer,
    ) {
        let is_cursor = index == self.cursor && self.active;
        let is_marked = self.marked.is_some_and(|m| m.contains(row));

        let base_fg = if view.is_encrypted {
            self.color(|t| t.encrypted.to_color(), Color::Yellow)
        } else if view.is_dir {
            self.color(|t| t.directory.to_color(), Color::Blue)
        } else {
            self.color(|t| t.entry_normal.to_color(), Color::White)
        };
        let fg = match (is_cursor, is_marked) {
            (_, true) => self.color(|t| t.entry_marked.to_color(), Color::Yellow),
            (true, false) => self.color(|t| t.entry_selected.to_color(), Color::Black),
            (false, false) => base_fg,
        };
        let mut style = Style::default().fg(fg);
        if is_cursor {
            style = style.bg(self.color(|t| t.entry_selected_bg.to_color(), Color::Cyan));
        }

        let marker = if is_marked { "*" } else { " " };
        let mut spans = vec![Span::styled(marker, style)];

        // 디렉토리는 "/" 접미, 암호화 항목은 "+" 접미
        let suffix = match (view.is_dir && !row.is_parent(), view.is_encrypted) {
            (true, _) if view.name.ends_with('/') => "",
            (true, _) => "/",
            (false, true) => "+",
            (false, false) => "",
        };
        let name = truncate_name(view.name, layout.name_width.saturating_sub(suffix.width()));
        let name = format!("{}{}", name, suffix);
        let padding = layout.name_width.saturating_sub(name.width());
        spans.push(Span::styled(name, style));
        spans.push(Span::styled(" ".repeat(padding), style));

        if layout.show_type {
            let kind = if row.is_parent() {
                String::new()
            } else {
                describe_content_type(view.content_type)
            };
            let kind = truncate_name(&kind, layout.type_width.saturating_sub(1));
            spans.push(Span::styled(
                format!("{:<width$}", kind, width = layout.type_width),
                style,
            ));
        }
        if layout.show_size {
            let size = if view.is_dir {
                "-".to_string()
            } else {
                format_file_size(view.size)
            };
            spans.push(Span::styled(format!("{:>9} ", size), style));
        }
        spans.push(Span::styled(" ", style));
        spans.push(Span::styled(
            format!(
                "{:<width$}",
                format_timestamp(view.modified),
                width = layout.date_width
            ),
            style,
        ));

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }

    fn render_scrollbar(&self, inner: Rect, track_height: usize, buf: &mut Buffer) {
        let total = self.rows.len();
        if track_height == 0 || total == 0 {
            return;
        }
        let thumb_height = (track_height * track_height / total).max(1);
        let max_scroll = total.saturating_sub(track_height);
        let thumb_pos = if max_scroll == 0 {
            0
        } else {
            self.scroll_offset.min(max_scroll) * track_height.saturating_sub(thumb_height)
                / max_scroll
        };

        let x = inner.x + inner.width - 1;
        let track_style = Style::default().fg(Color::Rgb(60, 60, 60));
        let thumb_style = Style::default().fg(Color::Rgb(150, 150, 150));
        for i in 0..track_height {
            let y = inner.y + (HEADER_LINES + i) as u16;
            let (symbol, style) = if (thumb_pos..thumb_pos + thumb_height).contains(&i) {
                ("┃", thumb_style)
            } else {
                ("│", track_style)
            };
            buf.set_string(x, y, symbol, style);
        }
    }
}

impl Widget for FileList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let border = if self.active {
            self.color(|t| t.pane_active_border.to_color(), Color::Cyan)
        } else {
            self.color(|t| t.pane_inactive_border.to_color(), Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .style(Style::default().bg(self.color(|t| t.bg_primary.to_color(), Color::Reset)));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 3 {
            return;
        }

        let track_height = usize::from(inner.height).saturating_sub(HEADER_LINES);
        let has_scrollbar = self.rows.len() > track_height;
        let layout = ColumnLayout::for_width(usize::from(inner.width), has_scrollbar);
        self.render_header(&layout, inner, buf);

        let dim = Style::default().fg(Color::Rgb(100, 100, 100));
        let Some(snapshot) = self.snapshot else {
            buf.set_string(inner.x, inner.y + 2, format!(" {}", self.placeholder), dim);
            return;
        };
        if self.rows.is_empty() {
            buf.set_string(inner.x, inner.y + 2, " (Empty)", dim);
            return;
        }

        let start = self.scroll_offset.min(self.rows.len());
        let end = (start + track_height).min(self.rows.len());
        for (i, row) in self.rows[start..end].iter().enumerate() {
            let Some(view) = snapshot.describe(row, self.flat) else {
                continue;
            };
            let row_area = Rect {
                y: inner.y + (HEADER_LINES + i) as u16,
                height: 1,
                width: inner.width.saturating_sub(u16::from(has_scrollbar)),
                ..inner
            };
            self.render_row(row, &view, start + i, &layout, row_area, buf);
        }

        if has_scrollbar {
            self.render_scrollbar(inner, track_height, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::projection::list_directory;
    use crate::models::archive_entry::ArchiveEntry;

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut text = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                text.push_str(buf[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_column_layout_by_width() {
        let wide = ColumnLayout::for_width(100, false);
        assert!(wide.show_type && wide.show_size);
        let medium = ColumnLayout::for_width(50, true);
        assert!(!medium.show_type && medium.show_size);
        let narrow = ColumnLayout::for_width(40, false);
        assert!(!narrow.show_type && !narrow.show_size);
    }

    #[test]
    fn test_render_directory_rows() {
        let snapshot = Snapshot::build(
            1,
            vec![
                ArchiveEntry::file("docs/readme.txt", 2048),
                ArchiveEntry::file("notes.md", 10).encrypted(true),
            ],
        );
        let rows: Vec<ListingRow> = list_directory(&snapshot, snapshot.root())
            .expect("root listing")
            .collect();
        let area = Rect::new(0, 0, 80, 8);
        let mut buf = Buffer::empty(area);
        FileList::new(&rows, Some(&snapshot))
            .title("sample.zip")
            .render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("sample.zip"));
        assert!(text.contains("docs/"));
        assert!(text.contains("notes.md+"));
        assert!(text.contains("Folder"));
    }

    #[test]
    fn test_render_placeholder_without_snapshot() {
        let area = Rect::new(0, 0, 60, 6);
        let mut buf = Buffer::empty(area);
        FileList::new(&[], None)
            .placeholder("Reading archive...")
            .render(area, &mut buf);
        assert!(buffer_text(&buf).contains("Reading archive..."));
    }
}
