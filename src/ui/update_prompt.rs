//! Update prompt dialog widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::update::UpdatePrompt;

/// Modal dialog offering an update: changelog, confirm/dismiss buttons and
/// the "ignore this update" checkbox.
pub struct UpdatePromptWidget<'a> {
    /// The prompt under decision.
    prompt: &'a UpdatePrompt,
    /// State of the ignore checkbox.
    ignore_checked: bool,
}

impl<'a> UpdatePromptWidget<'a> {
    /// Creates the dialog widget.
    #[must_use]
    pub fn new(prompt: &'a UpdatePrompt, ignore_checked: bool) -> Self {
        Self {
            prompt,
            ignore_checked,
        }
    }
}

impl Widget for UpdatePromptWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", self.prompt.title()));

        let checkbox = if self.ignore_checked { "[x]" } else { "[ ]" };
        let lines = vec![
            Line::raw(self.prompt.descriptor.changelog.clone()),
            Line::raw(""),
            Line::from(vec![
                Span::styled(
                    format!("[Enter] {}", self.prompt.confirm_label()),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("   "),
                Span::styled("[Esc] NO", Style::default().fg(Color::Red)),
            ]),
            Line::from(Span::raw(format!(
                "[i] {} Ignore this update",
                checkbox
            ))),
        ];

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::types::{DownloadInfo, UpdateDescriptor};

    fn prompt(local: bool) -> UpdatePrompt {
        UpdatePrompt {
            descriptor: UpdateDescriptor {
                version_code: 6,
                version_name: "0.2.0".to_string(),
                changelog: "New things".to_string(),
                download_info: DownloadInfo {
                    use_bundled_update_link: true,
                    update_link: None,
                },
            },
            download_url: "https://example.com/pkg".to_string(),
            local_package: local.then(|| std::path::PathBuf::from("/tmp/pkg")),
        }
    }

    fn rendered(widget: UpdatePromptWidget) -> String {
        let area = Rect::new(0, 0, 50, 8);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
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
    fn test_renders_changelog_and_title() {
        let p = prompt(false);
        let text = rendered(UpdatePromptWidget::new(&p, false));
        assert!(text.contains("Version 0.2.0 found!"));
        assert!(text.contains("New things"));
        assert!(text.contains("DOWNLOAD UPDATE"));
        assert!(text.contains("[ ] Ignore"));
    }

    #[test]
    fn test_install_label_with_local_package() {
        let p = prompt(true);
        let text = rendered(UpdatePromptWidget::new(&p, true));
        assert!(text.contains("INSTALL UPDATE"));
        assert!(text.contains("[x] Ignore"));
    }
}
