//! 디렉토리 트리 창
//!
//! 스냅샷의 모든 디렉토리를 깊이만큼 들여 써서 표시하고
//! 현재 디렉토리를 강조합니다.

use crate::models::snapshot::{NodeHandle, Snapshot};
use crate::ui::Theme;
use crate::utils::path_display::truncate_name;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Widget},
};

const INDENT: usize = 2;

pub struct DirTree<'a> {
    snapshot: Option<&'a Snapshot>,
    current: Option<NodeHandle>,
    root_label: &'a str,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> DirTree<'a> {
    pub fn new(snapshot: Option<&'a Snapshot>, theme: &'a Theme) -> Self {
        Self {
            snapshot,
            current: None,
            root_label: "/",
            focused: false,
            theme,
        }
    }

    pub fn current(mut self, current: Option<NodeHandle>) -> Self {
        self.current = current;
        self
    }

    /// 루트 표시 이름 (보통 압축 파일 이름)
    pub fn root_label(mut self, label: &'a str) -> Self {
        self.root_label = label;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

/// 현재 디렉토리가 보이도록 시작 행 계산
fn visible_start(current_index: usize, height: usize) -> usize {
    if height == 0 || current_index < height {
        0
    } else {
        current_index + 1 - height
    }
}

impl Widget for DirTree<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let border = if self.focused {
            self.theme.pane_active_border.to_color()
        } else {
            self.theme.pane_inactive_border.to_color()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Folders ")
            .style(Style::default().bg(self.theme.bg_primary.to_color()));
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(snapshot) = self.snapshot else {
            return;
        };
        let dirs = snapshot.directories();
        let height = usize::from(inner.height);
        let current_index = self
            .current
            .and_then(|current| dirs.iter().position(|(handle, _)| *handle == current))
            .unwrap_or(0);
        let start = visible_start(current_index, height);

        let normal = Style::default().fg(self.theme.directory.to_color());
        let selected = Style::default()
            .fg(self.theme.entry_selected.to_color())
            .bg(self.theme.entry_selected_bg.to_color())
            .add_modifier(Modifier::BOLD);

        for (i, (handle, depth)) in dirs.iter().skip(start).take(height).enumerate() {
            let Some(node) = snapshot.node(*handle) else {
                continue;
            };
            let name = if node.is_root() {
                self.root_label
            } else {
                node.name.as_str()
            };
            let indent = depth * INDENT;
            let width = usize::from(inner.width).saturating_sub(indent + 1);
            let label = format!(
                " {}{}",
                " ".repeat(indent),
                truncate_name(name, width)
            );
            let style = if start + i == current_index {
                selected
            } else {
                normal
            };
            let y = inner.y + i as u16;
            if start + i == current_index {
                buf.set_string(
                    inner.x,
                    y,
                    " ".repeat(usize::from(inner.width)),
                    Style::default().bg(self.theme.entry_selected_bg.to_color()),
                );
            }
            buf.set_stringn(inner.x, y, &label, usize::from(inner.width), style);
        }

        if dirs.len() > height {
            let hint = format!("{}/{}", current_index + 1, dirs.len());
            let x = area.x + area.width.saturating_sub(hint.len() as u16 + 2);
            buf.set_string(
                x,
                area.y + area.height - 1,
                hint,
                Style::default().fg(self.theme.pane_inactive_border.to_color()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::archive_entry::ArchiveEntry;

    #[test]
    fn test_visible_start_keeps_current_in_view() {
        assert_eq!(visible_start(0, 5), 0);
        assert_eq!(visible_start(4, 5), 0);
        assert_eq!(visible_start(5, 5), 1);
        assert_eq!(visible_start(12, 5), 8);
    }

    #[test]
    fn test_render_indents_by_depth() {
        let snapshot = Snapshot::build(1, vec![ArchiveEntry::file("a/b/c.txt", 1)]);
        let theme = Theme::dark();
        let b = snapshot.resolve_by_path("a/b").expect("a/b");
        let area = Rect::new(0, 0, 30, 6);
        let mut buf = Buffer::empty(area);
        DirTree::new(Some(&snapshot), &theme)
            .current(Some(b))
            .root_label("x.zip")
            .render(area, &mut buf);

        let line = |y: u16| -> String { (0..30).map(|x| buf[(x, y)].symbol()).collect() };
        assert!(line(1).contains(" x.zip"));
        assert!(line(2).starts_with("│   a"));
        assert!(line(3).starts_with("│     b"));
    }

    #[test]
    fn test_focus_border_and_scroll_hint_use_theme() {
        let snapshot = Snapshot::build(
            1,
            vec![
                ArchiveEntry::file("a/1.txt", 1),
                ArchiveEntry::file("b/2.txt", 1),
                ArchiveEntry::file("c/3.txt", 1),
                ArchiveEntry::file("d/4.txt", 1),
            ],
        );
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 20, 4);

        let mut buf = Buffer::empty(area);
        DirTree::new(Some(&snapshot), &theme)
            .focused(true)
            .render(area, &mut buf);
        assert_eq!(buf[(0, 0)].fg, theme.pane_active_border.to_color());

        // 5개 디렉토리 중 2줄만 보임: 하단 테두리에 위치 표시
        let mut buf = Buffer::empty(area);
        DirTree::new(Some(&snapshot), &theme).render(area, &mut buf);
        assert_eq!(buf[(0, 0)].fg, theme.pane_inactive_border.to_color());
        let bottom: String = (0..20).map(|x| buf[(x, 3)].symbol()).collect();
        assert!(bottom.contains("1/5"));
        let hint_x = bottom.chars().position(|c| c == '1').unwrap() as u16;
        assert_eq!(buf[(hint_x, 3)].fg, theme.pane_inactive_border.to_color());
    }
}
