// 화면 레이아웃
//
// - 80+ cols, 트리 보기: 디렉토리 트리 창 + 항목 목록
// - 40-79 cols 또는 평탄 보기: 항목 목록만
// - <40 cols: 경고 메시지 표시

use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub const MIN_WIDTH: u16 = 40;
pub const MIN_HEIGHT: u16 = 10;
pub const TREE_PANE_MIN_WIDTH: u16 = 80;

/// 트리 창 너비 비율 (%)
const TREE_PANE_PERCENT: u16 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// 트리 창 + 목록
    WithTree,
    /// 목록만
    ListOnly,
    /// 터미널이 너무 작음
    TooSmall,
}

/// 계산된 영역
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutAreas {
    pub title_bar: Rect,
    pub tree_pane: Rect,
    pub list_pane: Rect,
    pub status_bar: Rect,
    pub command_bar: Rect,
    pub warning: Rect,
}

#[derive(Debug)]
pub struct LayoutManager {
    mode: LayoutMode,
    terminal_size: (u16, u16),
    areas: LayoutAreas,
}

impl Default for LayoutManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutManager {
    pub fn new() -> Self {
        Self {
            mode: LayoutMode::ListOnly,
            terminal_size: (80, 24),
            areas: LayoutAreas::default(),
        }
    }

    fn determine_mode(width: u16, height: u16, show_tree: bool) -> LayoutMode {
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            LayoutMode::TooSmall
        } else if show_tree && width >= TREE_PANE_MIN_WIDTH {
            LayoutMode::WithTree
        } else {
            LayoutMode::ListOnly
        }
    }

    /// 터미널 크기/보기 모드에 맞춰 레이아웃 재계산
    pub fn update(&mut self, area: Rect, show_tree: bool) {
        self.terminal_size = (area.width, area.height);
        self.mode = Self::determine_mode(area.width, area.height, show_tree);
        self.areas = self.calculate_areas(area);
    }

    fn calculate_areas(&self, area: Rect) -> LayoutAreas {
        if self.mode == LayoutMode::TooSmall {
            return LayoutAreas {
                warning: area,
                ..Default::default()
            };
        }

        // 제목줄 | 본문 | 상태바 | 커맨드바
        let vertical_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        let (tree_pane, list_pane) = if self.mode == LayoutMode::WithTree {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(TREE_PANE_PERCENT),
                    Constraint::Percentage(100 - TREE_PANE_PERCENT),
                ])
                .split(vertical_chunks[1]);
            (body[0], body[1])
        } else {
            (Rect::default(), vertical_chunks[1])
        };

        LayoutAreas {
            title_bar: vertical_chunks[0],
            tree_pane,
            list_pane,
            status_bar: vertical_chunks[2],
            command_bar: vertical_chunks[3],
            warning: Rect::default(),
        }
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn areas(&self) -> &LayoutAreas {
        &self.areas
    }

    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// 목록 창에 보이는 행 수 (테두리, 머리글 제외)
    pub fn visible_rows(&self) -> usize {
        usize::from(self.areas.list_pane.height.saturating_sub(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_mode() {
        assert_eq!(
            LayoutManager::determine_mode(80, 24, true),
            LayoutMode::WithTree
        );
        assert_eq!(
            LayoutManager::determine_mode(120, 30, false),
            LayoutMode::ListOnly
        );
        assert_eq!(
            LayoutManager::determine_mode(79, 24, true),
            LayoutMode::ListOnly
        );
        assert_eq!(
            LayoutManager::determine_mode(39, 24, true),
            LayoutMode::TooSmall
        );
        assert_eq!(
            LayoutManager::determine_mode(80, 9, false),
            LayoutMode::TooSmall
        );
    }

    #[test]
    fn test_tree_pane_split() {
        let mut manager = LayoutManager::new();
        manager.update(Rect::new(0, 0, 100, 30), true);
        let areas = manager.areas();
        assert_eq!(areas.title_bar.height, 1);
        assert_eq!(areas.tree_pane.width + areas.list_pane.width, 100);
        assert_eq!(areas.list_pane.height, 27);
        assert_eq!(manager.visible_rows(), 24);

        manager.update(Rect::new(0, 0, 100, 30), false);
        assert_eq!(manager.areas().tree_pane, Rect::default());
        assert_eq!(manager.areas().list_pane.width, 100);
    }

    #[test]
    fn test_too_small_uses_whole_area() {
        let mut manager = LayoutManager::new();
        manager.update(Rect::new(0, 0, 30, 5), true);
        assert_eq!(manager.mode(), LayoutMode::TooSmall);
        assert_eq!(manager.areas().warning, Rect::new(0, 0, 30, 5));
    }
}
