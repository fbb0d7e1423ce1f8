use crate::dates::YearMonth;
use crate::theme::Palette;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    text::{Line, Text},
    widgets::{Block, Clear, StatefulWidget, Widget},
};

/// Width of the longest entry, "September 2025", plus the cursor marker
const ENTRY_WIDTH: u16 = 16;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MonthPick<'a>(pub(crate) &'a Palette);

impl StatefulWidget for MonthPick<'_> {
    type State = MonthPickState;

    /*
     * ....................
     * .┌ Select Month ──┐.
     * .│ January 2025   │.
     * .│>February 2025  │.
     * .│ March 2025     │.
     * .│ …              │.
     * .└────────────────┘.
     * ....................
     */

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let entries = u16::try_from(state.months.len()).unwrap_or(u16::MAX);
        let [outer_area] = Layout::horizontal([ENTRY_WIDTH + 4])
            .flex(Flex::Center)
            .areas(area);
        let [outer_area] = Layout::vertical([entries.saturating_add(4).min(area.height)])
            .flex(Flex::Center)
            .areas(outer_area);
        Clear.render(outer_area, buf);
        Block::new().style(self.0.base).render(outer_area, buf);
        let block_area = outer_area.inner(Margin::new(1, 1));
        Block::bordered()
            .title(" Select Month ")
            .title_alignment(Alignment::Center)
            .style(self.0.base)
            .render(block_area, buf);
        let text_area = block_area.inner(Margin::new(1, 1));
        state.to_text(self.0).render(text_area, buf);
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthPickState {
    // Invariant: nonempty, and `cursor` is a valid index into it
    months: Vec<YearMonth>,
    cursor: usize,
}

impl MonthPickState {
    /// Returns `None` if there are no months to pick from.  The cursor starts
    /// on `current` if it is one of `months`.
    pub(crate) fn new(months: Vec<YearMonth>, current: YearMonth) -> Option<MonthPickState> {
        if months.is_empty() {
            return None;
        }
        let cursor = months.iter().position(|&m| m == current).unwrap_or(0);
        Some(MonthPickState { months, cursor })
    }

    fn to_text(&self, palette: &Palette) -> Text<'static> {
        Text::from_iter(self.months.iter().enumerate().map(|(i, m)| {
            if i == self.cursor {
                Line::styled(format!(">{m}"), palette.selected)
            } else {
                Line::styled(format!(" {m}"), palette.base)
            }
        }))
    }

    pub(crate) fn handle_input(&mut self, input: MonthPickInput) -> MonthPickOutput {
        match input {
            MonthPickInput::Up if self.cursor > 0 => {
                self.cursor -= 1;
                MonthPickOutput::Ok
            }
            MonthPickInput::Down if self.cursor + 1 < self.months.len() => {
                self.cursor += 1;
                MonthPickOutput::Ok
            }
            MonthPickInput::First => {
                self.cursor = 0;
                MonthPickOutput::Ok
            }
            MonthPickInput::Last => {
                self.cursor = self.months.len().saturating_sub(1);
                MonthPickOutput::Ok
            }
            // 1-based position in the list
            MonthPickInput::Digit(d) => match usize::from(d).checked_sub(1) {
                Some(i) if i < self.months.len() => {
                    self.cursor = i;
                    MonthPickOutput::Ok
                }
                _ => MonthPickOutput::Invalid,
            },
            MonthPickInput::Enter => match self.months.get(self.cursor) {
                Some(&m) => MonthPickOutput::Pick(m),
                None => MonthPickOutput::Invalid,
            },
            _ => MonthPickOutput::Invalid,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum MonthPickInput {
    Up,
    Down,
    First,
    Last,
    Digit(u8),
    Enter,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum MonthPickOutput {
    Ok,
    Invalid,
    Pick(YearMonth),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use time::Month;

    fn months() -> Vec<YearMonth> {
        [Month::January, Month::February, Month::March]
            .into_iter()
            .map(|m| YearMonth::new(2025, m).unwrap())
            .collect()
    }

    fn ym(m: Month) -> YearMonth {
        YearMonth::new(2025, m).unwrap()
    }

    #[test]
    fn test_empty() {
        assert_eq!(MonthPickState::new(Vec::new(), ym(Month::May)), None);
    }

    #[test]
    fn test_starts_on_current() {
        let mut state = MonthPickState::new(months(), ym(Month::February)).unwrap();
        assert_eq!(
            state.handle_input(MonthPickInput::Enter),
            MonthPickOutput::Pick(ym(Month::February))
        );
    }

    #[test]
    fn test_starts_on_first_when_current_absent() {
        let mut state = MonthPickState::new(months(), ym(Month::May)).unwrap();
        assert_eq!(
            state.handle_input(MonthPickInput::Enter),
            MonthPickOutput::Pick(ym(Month::January))
        );
    }

    #[test]
    fn test_movement_is_bounded() {
        let mut state = MonthPickState::new(months(), ym(Month::January)).unwrap();
        assert_eq!(state.handle_input(MonthPickInput::Up), MonthPickOutput::Invalid);
        assert_eq!(state.handle_input(MonthPickInput::Down), MonthPickOutput::Ok);
        assert_eq!(state.handle_input(MonthPickInput::Down), MonthPickOutput::Ok);
        assert_eq!(
            state.handle_input(MonthPickInput::Down),
            MonthPickOutput::Invalid
        );
        assert_eq!(
            state.handle_input(MonthPickInput::Enter),
            MonthPickOutput::Pick(ym(Month::March))
        );
        assert_eq!(state.handle_input(MonthPickInput::First), MonthPickOutput::Ok);
        assert_eq!(
            state.handle_input(MonthPickInput::Enter),
            MonthPickOutput::Pick(ym(Month::January))
        );
        assert_eq!(state.handle_input(MonthPickInput::Last), MonthPickOutput::Ok);
        assert_eq!(
            state.handle_input(MonthPickInput::Enter),
            MonthPickOutput::Pick(ym(Month::March))
        );
    }

    #[test]
    fn test_digits() {
        let mut state = MonthPickState::new(months(), ym(Month::January)).unwrap();
        assert_eq!(state.handle_input(MonthPickInput::Digit(0)), MonthPickOutput::Invalid);
        assert_eq!(state.handle_input(MonthPickInput::Digit(4)), MonthPickOutput::Invalid);
        assert_eq!(state.handle_input(MonthPickInput::Digit(2)), MonthPickOutput::Ok);
        assert_eq!(
            state.handle_input(MonthPickInput::Enter),
            MonthPickOutput::Pick(ym(Month::February))
        );
    }

    #[test]
    fn test_render() {
        let mut state = MonthPickState::new(months(), ym(Month::February)).unwrap();
        let area = Rect::new(0, 0, 30, 11);
        let mut buffer = Buffer::empty(area);
        MonthPick(Theme::Dark.palette()).render(area, &mut buffer, &mut state);
        let lines = (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>();
        assert!(lines.iter().any(|l| l.contains("Select Month")));
        assert!(lines.iter().any(|l| l.contains(">February 2025")));
        assert!(lines.iter().any(|l| l.contains(" January 2025")));
    }
}
