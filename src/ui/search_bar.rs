//! Search input widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

/// Search bar with inline error and in-progress hint.
pub struct SearchBar<'a> {
    /// Current query text.
    query: &'a str,
    /// Cursor position (char index).
    cursor: usize,
    /// Inline validation error, if showing.
    error: Option<&'a str>,
    /// Whether a search is in flight.
    searching: bool,
}

impl<'a> SearchBar<'a> {
    /// Creates a search bar for the given query.
    #[must_use]
    pub fn new(query: &'a str) -> Self {
        Self {
            query,
            cursor: query.chars().count(),
            error: None,
            searching: false,
        }
    }

    /// Sets the cursor position (char index).
    #[must_use]
    pub fn cursor(mut self, cursor: usize) -> Self {
        self.cursor = cursor;
        self
    }

    /// Sets the inline error message.
    #[must_use]
    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    /// Sets the in-progress flag.
    #[must_use]
    pub fn searching(mut self, searching: bool) -> Self {
        self.searching = searching;
        self
    }

    /// Returns the column the terminal cursor should sit at, relative to
    /// the inner text area.
    #[must_use]
    pub fn cursor_column(&self) -> u16 {
        let prefix: String = self.query.chars().take(self.cursor).collect();
        prefix.width() as u16
    }
}

impl Widget for SearchBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title, border_style) = if let Some(error) = self.error {
            (
                Line::from(Span::styled(
                    format!(" {} ", error),
                    Style::default()
                        .fg(Color::Red)
                        .add_modifier(Modifier::BOLD),
                )),
                Style::default().fg(Color::Red),
            )
        } else if self.searching {
            (
                Line::from(Span::styled(
                    " Searching... (Esc to cancel) ",
                    Style::default().fg(Color::Yellow),
                )),
                Style::default().fg(Color::Yellow),
            )
        } else {
            (
                Line::from(Span::raw(" Search ")),
                Style::default().fg(Color::Gray),
            )
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title);

        Paragraph::new(self.query).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(bar: SearchBar) -> String {
        let area = Rect::new(0, 0, 40, 3);
        let mut buf = Buffer::empty(area);
        bar.render(area, &mut buf);
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_renders_query() {
        let text = rendered(SearchBar::new("lofi beats"));
        assert!(text.contains("lofi beats"));
        assert!(text.contains("Search"));
    }

    #[test]
    fn test_renders_error_title() {
        let text = rendered(SearchBar::new("").error(Some("Fill the search field")));
        assert!(text.contains("Fill the search field"));
    }

    #[test]
    fn test_renders_searching_hint() {
        let text = rendered(SearchBar::new("x").searching(true));
        assert!(text.contains("Searching"));
    }

    #[test]
    fn test_cursor_column() {
        let bar = SearchBar::new("abc").cursor(2);
        assert_eq!(bar.cursor_column(), 2);
    }
}
