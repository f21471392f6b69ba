//! Status bar widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Single-line status bar: message on the left, connectivity and version on
/// the right.
pub struct StatusBar<'a> {
    /// Status message.
    message: &'a str,
    /// Current connectivity state.
    online: bool,
    /// Running version string.
    version: &'a str,
}

impl<'a> StatusBar<'a> {
    /// Creates a status bar.
    #[must_use]
    pub fn new(message: &'a str, online: bool, version: &'a str) -> Self {
        Self {
            message,
            online,
            version,
        }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (conn_label, conn_color) = if self.online {
            ("ONLINE", Color::Green)
        } else {
            ("OFFLINE", Color::Red)
        };

        let right = format!(" {} | v{} ", conn_label, self.version);
        let left_width = (area.width as usize).saturating_sub(right.len());

        // Truncate on char boundaries; byte truncation panics mid-codepoint.
        let message: String = self.message.chars().take(left_width).collect();

        let line = Line::from(vec![
            Span::styled(
                format!("{:<width$}", message, width = left_width),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(right, Style::default().fg(conn_color)),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
