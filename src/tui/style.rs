//! Color scheme and styles.

use ratatui::style::{Color, Style};

/// Palette.
pub struct Theme;

impl Theme {
    pub const HEADER_FG: Color = Color::Black;
    pub const HEADER_BG: Color = Color::Green;
    /// Background of the header cell the table is sorted by.
    pub const HEADER_SORT_BG: Color = Color::Cyan;

    pub const SELECTED_FG: Color = Color::Black;
    pub const SELECTED_BG: Color = Color::Cyan;

    pub const RUNNING: Color = Color::Green;
    /// Tree branch glyphs, kept visually apart from the commands.
    pub const TREE: Color = Color::DarkGray;
}

/// Pre-defined styles.
pub struct Styles;

impl Styles {
    pub fn row() -> Style {
        Style::default()
    }

    pub fn header() -> Style {
        Style::default().fg(Theme::HEADER_FG).bg(Theme::HEADER_BG)
    }

    pub fn header_sorted() -> Style {
        Style::default().fg(Theme::HEADER_FG).bg(Theme::HEADER_SORT_BG)
    }

    pub fn selected() -> Style {
        Style::default().fg(Theme::SELECTED_FG).bg(Theme::SELECTED_BG)
    }

    pub fn running() -> Style {
        Style::default().fg(Theme::RUNNING)
    }

    pub fn tree_prefix() -> Style {
        Style::default().fg(Theme::TREE)
    }
}
