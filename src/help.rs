use crate::theme::Palette;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Clear, Paragraph, Widget},
};

static BINDINGS: &[(&str, &str)] = &[
    ("h, LEFT", "Previous month"),
    ("l, RIGHT", "Next month"),
    ("j, DOWN", "Scroll weekly summaries down"),
    ("k, UP", "Scroll weekly summaries up"),
    ("m, g", "Choose a month"),
    ("0, HOME", "Jump to the default month"),
    ("t", "Toggle light/dark theme"),
    ("r", "Reload the challenge"),
    ("?", "Show this help"),
    ("q, ESC", "Quit"),
];

const KEY_WIDTH: usize = 16;

const DISMISS: &str = "Press the Any Key to dismiss.";

/// Popup listing the key bindings
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Help<'a>(pub(crate) &'a Palette);

impl Help<'_> {
    fn text(self) -> Text<'static> {
        let p = self.0;
        let mut lines = BINDINGS
            .iter()
            .map(|&(keys, action)| {
                Line::from_iter([
                    Span::styled(format!("{keys:<KEY_WIDTH$}"), p.accent),
                    Span::styled(action, p.base),
                ])
            })
            .collect::<Vec<_>>();
        lines.push(Line::default());
        lines.push(Line::styled(DISMISS, p.quiet));
        Text::from(lines)
    }
}

impl Widget for Help<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = self.text();
        // Text plus borders plus one column/row of padding all round
        let height = u16::try_from(text.height())
            .unwrap_or(u16::MAX)
            .saturating_add(4)
            .min(area.height);
        let width = u16::try_from(text.width())
            .unwrap_or(u16::MAX)
            .saturating_add(4)
            .min(area.width);
        let [outer_area] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
        let [outer_area] = Layout::vertical([height])
            .flex(Flex::Center)
            .areas(outer_area);
        Clear.render(outer_area, buf);
        Block::new().style(self.0.base).render(outer_area, buf);
        Paragraph::new(text)
            .block(
                Block::bordered()
                    .title(" Commands ")
                    .title_alignment(Alignment::Center)
                    .title_style(self.0.heading),
            )
            .style(self.0.base)
            .render(outer_area.inner(Margin::new(1, 1)), buf);
    }
}
