//! Ratatui widgets for the tunegrab screen.

pub mod alert;
pub mod results;
pub mod search_bar;
pub mod status_bar;
pub mod update_prompt;

pub use alert::{Alert, AlertKind};
pub use results::ResultsList;
pub use search_bar::SearchBar;
pub use status_bar::StatusBar;
pub use update_prompt::UpdatePromptWidget;

use ratatui::layout::Rect;

/// Returns a centered rect of the given size, clamped to `area`.
#[must_use]
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 80, 24);
        let rect = centered_rect(40, 10, area);
        assert_eq!(rect, Rect::new(20, 7, 40, 10));
    }

    #[test]
    fn test_centered_rect_clamps() {
        let area = Rect::new(0, 0, 10, 5);
        let rect = centered_rect(40, 10, area);
        assert_eq!(rect, area);
    }
}
