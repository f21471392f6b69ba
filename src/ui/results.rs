//! Search results list widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

use crate::search::SearchItem;

/// Results list with an empty-state view.
pub struct ResultsList<'a> {
    /// Items in render order.
    items: &'a [SearchItem],
    /// Selected item index.
    selected: usize,
    /// Whether the last search produced zero results.
    show_empty_state: bool,
}

impl<'a> ResultsList<'a> {
    /// Creates a results list.
    #[must_use]
    pub fn new(items: &'a [SearchItem]) -> Self {
        Self {
            items,
            selected: 0,
            show_empty_state: false,
        }
    }

    /// Sets the selected index.
    #[must_use]
    pub fn selected(mut self, selected: usize) -> Self {
        self.selected = selected;
        self
    }

    /// Enables the empty-state view.
    #[must_use]
    pub fn empty_state(mut self, show: bool) -> Self {
        self.show_empty_state = show;
        self
    }
}

impl Widget for ResultsList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title(" Results ");

        if self.show_empty_state {
            Paragraph::new("No results found")
                .style(Style::default().fg(Color::DarkGray))
                .centered()
                .block(block)
                .render(area, buf);
            return;
        }

        let entries: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| {
                ListItem::new(Line::from(vec![
                    Span::raw(item.title().to_string()),
                    Span::styled(
                        format!("  {}", item.channel()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(entries).block(block).highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

        let mut state = ListState::default();
        if !self.items.is_empty() {
            state.select(Some(self.selected.min(self.items.len() - 1)));
        }
        StatefulWidget::render(list, area, buf, &mut state);
    }
}
