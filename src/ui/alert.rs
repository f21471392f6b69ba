//! Transient alert banner.
//!
//! Replaces the original toast/alert notices: a one-line banner at the top
//! of the screen that the app clears after a fixed duration.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Visual category of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Positive notice (back online, download enqueued).
    Success,
    /// Recoverable failure (network error, offline).
    Error,
    /// Neutral information.
    Info,
}

impl AlertKind {
    /// Returns the banner background color.
    #[must_use]
    fn color(self) -> Color {
        match self {
            Self::Success => Color::Green,
            Self::Error => Color::Red,
            Self::Info => Color::Blue,
        }
    }
}

/// One-line alert banner.
pub struct Alert<'a> {
    /// Banner headline.
    title: &'a str,
    /// Supporting text.
    text: &'a str,
    /// Visual category.
    kind: AlertKind,
}

impl<'a> Alert<'a> {
    /// Creates an alert banner.
    #[must_use]
    pub fn new(title: &'a str, text: &'a str, kind: AlertKind) -> Self {
        Self { title, text, kind }
    }
}

impl Widget for Alert<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default().bg(self.kind.color()).fg(Color::White);
        let line = Line::from(vec![
            Span::styled(
                format!(" {} ", self.title),
                style.add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("{} ", self.text), style),
        ]);

        // Paint the full banner row, then the text over it
        for x in area.x..area.x + area.width {
            buf[(x, area.y)].set_style(style).set_char(' ');
        }
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_title_and_text() {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        Alert::new("Here we go!", "Device is back online", AlertKind::Success)
            .render(area, &mut buf);

        let text: String = (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert!(text.contains("Here we go!"));
        assert!(text.contains("back online"));
    }
}
