//! Frame layout for the application screen.

use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    Frame,
};

use crate::ui::{
    centered_rect, Alert, ResultsList, SearchBar, StatusBar, UpdatePromptWidget,
};

use super::App;

/// Width of the update prompt dialog.
const PROMPT_WIDTH: u16 = 60;

/// Height of the update prompt dialog.
const PROMPT_HEIGHT: u16 = 10;

impl App {
    /// Draws one frame.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let constraints = if self.notice.is_some() {
            vec![
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
            ]
        } else {
            vec![
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
            ]
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let mut next = 0;
        if let Some(notice) = &self.notice {
            frame.render_widget(
                Alert::new(&notice.title, &notice.text, notice.kind),
                rows[next],
            );
            next += 1;
        }

        let search_area = rows[next];
        let search_bar = SearchBar::new(&self.query)
            .cursor(self.cursor)
            .error(self.search.error_message())
            .searching(self.search.is_searching());
        let cursor_column = search_bar.cursor_column();
        frame.render_widget(search_bar, search_area);

        frame.render_widget(
            ResultsList::new(&self.results)
                .selected(self.selected)
                .empty_state(self.show_empty_state),
            rows[next + 1],
        );

        frame.render_widget(
            StatusBar::new(&self.status, self.online, env!("CARGO_PKG_VERSION")),
            rows[next + 2],
        );

        if let Some(prompt) = self.update.prompt() {
            let dialog = centered_rect(PROMPT_WIDTH, PROMPT_HEIGHT, area);
            frame.render_widget(
                UpdatePromptWidget::new(prompt, self.prompt_ignore_checked),
                dialog,
            );
        } else {
            frame.set_cursor_position(cursor_position(search_area, cursor_column));
        }
    }
}

/// Terminal cursor position inside the search bar's text area.
fn cursor_position(search_area: Rect, column: u16) -> Position {
    Position::new(
        search_area.x + 1 + column.min(search_area.width.saturating_sub(3)),
        search_area.y + 1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_position_offsets_by_border() {
        let area = Rect::new(0, 0, 40, 3);
        assert_eq!(cursor_position(area, 0), Position::new(1, 1));
        assert_eq!(cursor_position(area, 5), Position::new(6, 1));
    }

    #[test]
    fn test_cursor_position_clamps_to_inner_width() {
        let area = Rect::new(0, 0, 10, 3);
        assert_eq!(cursor_position(area, 50), Position::new(8, 1));
    }
}
