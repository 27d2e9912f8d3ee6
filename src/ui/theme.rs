use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// 색상 테마
///
/// 설정 파일의 `theme` 이름으로 선택합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    // 배경/전경
    pub bg_primary: ColorDef,
    pub fg_primary: ColorDef,

    // 창
    pub pane_active_border: ColorDef,
    pub pane_inactive_border: ColorDef,

    // 항목 목록
    pub entry_normal: ColorDef,
    pub entry_selected: ColorDef,
    pub entry_selected_bg: ColorDef,
    pub entry_marked: ColorDef,
    pub directory: ColorDef,
    pub encrypted: ColorDef,

    // UI 컴포넌트
    pub title_bar_bg: ColorDef,
    pub title_bar_fg: ColorDef,
    pub status_bar_bg: ColorDef,
    pub status_bar_fg: ColorDef,
    pub command_bar_bg: ColorDef,
    pub command_bar_fg: ColorDef,

    // 강조
    pub accent: ColorDef,
    pub warning: ColorDef,
    pub error: ColorDef,
    pub success: ColorDef,
}

/// 색상 정의
///
/// Hex 문자열("#1e1e1e") 또는 색상 이름("Red")을 지원합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorDef {
    Hex(String),
    Named(String),
}

impl ColorDef {
    pub fn to_color(&self) -> Color {
        match self {
            ColorDef::Hex(hex) => parse_hex_color(hex),
            ColorDef::Named(name) => parse_named_color(name),
        }
    }
}

impl From<&str> for ColorDef {
    fn from(s: &str) -> Self {
        if s.starts_with('#') {
            ColorDef::Hex(s.to_string())
        } else {
            ColorDef::Named(s.to_string())
        }
    }
}

fn parse_hex_color(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');

    if hex.len() == 6 && hex.is_ascii() {
        let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
        let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
        let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
        Color::Rgb(r, g, b)
    } else {
        Color::Reset
    }
}

fn parse_named_color(name: &str) -> Color {
    match name.to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "white" => Color::White,
        _ => Color::Reset,
    }
}

impl Theme {
    /// Dark 테마 (기본)
    pub fn dark() -> Self {
        Theme {
            bg_primary: "#1e1e1e".into(),
            fg_primary: "#d4d4d4".into(),

            pane_active_border: "#0078d4".into(),
            pane_inactive_border: "#3c3c3c".into(),

            entry_normal: "#d4d4d4".into(),
            entry_selected: "#ffffff".into(),
            entry_selected_bg: "#0078d4".into(),
            entry_marked: "#dcdcaa".into(),
            directory: "#569cd6".into(),
            encrypted: "#ce9178".into(),

            title_bar_bg: "#2d2d30".into(),
            title_bar_fg: "#ffffff".into(),
            status_bar_bg: "#007acc".into(),
            status_bar_fg: "#ffffff".into(),
            command_bar_bg: "#2d2d30".into(),
            command_bar_fg: "#cccccc".into(),

            accent: "#0078d4".into(),
            warning: "#ffa500".into(),
            error: "#f44747".into(),
            success: "#4ec9b0".into(),
        }
    }

    /// Light 테마
    pub fn light() -> Self {
        Theme {
            bg_primary: "#ffffff".into(),
            fg_primary: "#1e1e1e".into(),

            pane_active_border: "#0078d4".into(),
            pane_inactive_border: "#cccccc".into(),

            entry_normal: "#1e1e1e".into(),
            entry_selected: "#000000".into(),
            entry_selected_bg: "#add6ff".into(),
            entry_marked: "#795e26".into(),
            directory: "#0066cc".into(),
            encrypted: "#a65e2b".into(),

            title_bar_bg: "#0078d4".into(),
            title_bar_fg: "#ffffff".into(),
            status_bar_bg: "#0078d4".into(),
            status_bar_fg: "#ffffff".into(),
            command_bar_bg: "#f3f3f3".into(),
            command_bar_fg: "#1e1e1e".into(),

            accent: "#0078d4".into(),
            warning: "#ff8c00".into(),
            error: "#e51400".into(),
            success: "#107c10".into(),
        }
    }

    /// High Contrast 테마
    pub fn high_contrast() -> Self {
        Theme {
            bg_primary: "#000000".into(),
            fg_primary: "#ffffff".into(),

            pane_active_border: "#00ff00".into(),
            pane_inactive_border: "#808080".into(),

            entry_normal: "#ffffff".into(),
            entry_selected: "#000000".into(),
            entry_selected_bg: "#00ff00".into(),
            entry_marked: "#ffff00".into(),
            directory: "#00ffff".into(),
            encrypted: "#ff00ff".into(),

            title_bar_bg: "#000000".into(),
            title_bar_fg: "#00ff00".into(),
            status_bar_bg: "#000000".into(),
            status_bar_fg: "#00ff00".into(),
            command_bar_bg: "#000000".into(),
            command_bar_fg: "#ffffff".into(),

            accent: "#00ff00".into(),
            warning: "#ffff00".into(),
            error: "#ff0000".into(),
            success: "#00ff00".into(),
        }
    }

    /// 이름으로 테마 선택 (모르는 이름은 None)
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            "high_contrast" => Some(Self::high_contrast()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
