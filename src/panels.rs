//! The boxes surrounding the calendar: month tabs, legend, counters, weekly
//! summaries and the rules of the challenge

use crate::challenge::Challenge;
use crate::dates::{day_month, long_date, YearMonth};
use crate::rates::{distance_penalty, monetary_penalty, Pesos};
use crate::tally::{WeekStatus, WeekSummary};
use crate::theme::{Palette, CHECK, CROSS, SWATCH};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Paragraph, Tabs, Widget, Wrap},
};

fn panel<'a>(title: &'a str, palette: &Palette) -> Block<'a> {
    Block::bordered()
        .title(title)
        .title_style(palette.heading)
        .style(palette.base)
}

fn mark(done: bool, palette: &Palette) -> Span<'static> {
    if done {
        Span::styled(CHECK, palette.done)
    } else {
        Span::styled(CROSS, palette.skipped)
    }
}

/// One tab per month of the challenge, the displayed one highlighted
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthBar<'a> {
    pub(crate) months: Vec<YearMonth>,
    pub(crate) current: YearMonth,
    pub(crate) palette: &'a Palette,
}

impl Widget for MonthBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let selected = self.months.iter().position(|&m| m == self.current);
        let titles = self.months.iter().map(|m| {
            let name = m.month().to_string();
            format!("{} {}", name.get(..3).unwrap_or(name.as_str()), m.year())
        });
        Tabs::new(titles)
            .select(selected)
            .style(self.palette.base)
            .highlight_style(self.palette.selected)
            .divider("|")
            .render(area, buf);
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Counters<'a> {
    pub(crate) challenge: &'a Challenge,
    pub(crate) month: YearMonth,
    pub(crate) counts: Vec<usize>,
    pub(crate) owed: Pesos,
    pub(crate) palette: &'a Palette,
}

impl Counters<'_> {
    pub(crate) fn height(&self) -> u16 {
        // One line per participant, then the total, a blank line, the rate,
        // the amount owed if any, and two borders
        let participants =
            u16::try_from(self.challenge.participants().len()).unwrap_or(u16::MAX);
        participants.saturating_add(if self.owed > Pesos::ZERO { 6 } else { 5 })
    }
}

impl Widget for Counters<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let p = self.palette;
        let mut lines = Vec::new();
        let participants = self.challenge.participants();
        for (participant, count) in participants.iter().zip(&self.counts) {
            let style = if *count == 0 { p.unfilled } else { p.accent };
            lines.push(Line::from_iter([
                Span::styled(format!("{:<12}", participant.name()), p.base),
                Span::styled(count.to_string(), style),
            ]));
        }
        lines.push(Line::from_iter([
            Span::styled(format!("{:<12}", "Total"), p.base),
            Span::styled(self.counts.iter().sum::<usize>().to_string(), p.accent),
        ]));
        lines.push(Line::default());
        lines.push(Line::styled(
            format!(
                "Monthly Penalty: {}/Missed Day",
                monetary_penalty(self.month.month())
            ),
            p.base,
        ));
        if self.owed > Pesos::ZERO {
            lines.push(Line::styled(
                format!("Amount Owed (Uncompleted Penalties): {}", self.owed),
                p.owed,
            ));
        }
        Paragraph::new(Text::from(lines))
            .block(panel(" Monthly Penalty Counter ", p))
            .render(area, buf);
    }
}

/// The weeks with penalties in the displayed month.  The list scrolls when it
/// is taller than its box.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Summaries<'a> {
    pub(crate) challenge: &'a Challenge,
    pub(crate) summaries: Vec<WeekSummary<'a>>,
    /// Number of lines scrolled past the top
    pub(crate) scroll: u16,
    pub(crate) palette: &'a Palette,
}

impl Summaries<'_> {
    /// The largest useful scroll offset when drawn `height` rows tall
    pub(crate) fn max_scroll(&self, height: u16) -> u16 {
        let lines = u16::try_from(self.text().height()).unwrap_or(u16::MAX);
        lines.saturating_sub(height.saturating_sub(2))
    }

    fn text(&self) -> Text<'static> {
        let p = self.palette;
        let mut lines = Vec::new();
        if self.summaries.is_empty() {
            lines.push(
                Line::styled("No penalty data for this month", p.quiet)
                    .alignment(Alignment::Center),
            );
        }
        for summary in &self.summaries {
            let key = summary.record.key();
            let style = match summary.status {
                WeekStatus::AllCompleted => p.week_all,
                WeekStatus::NoneCompleted => p.week_none,
                WeekStatus::Mixed => p.week_mixed,
            };
            lines.push(Line::styled(
                format!("{} - {}", day_month(key.monday()), day_month(key.friday())),
                style.patch(p.heading),
            ));
            if !summary.record.description().is_empty() {
                lines.push(Line::styled(
                    format!("  {}", summary.record.description()),
                    style,
                ));
            }
            let mut spans = vec![Span::raw(" ")];
            for (participant, entry) in self
                .challenge
                .participants()
                .iter()
                .zip(summary.record.entries())
            {
                spans.push(Span::styled(
                    format!(
                        " {}: {} penalties ",
                        participant.name(),
                        entry.penalties().len()
                    ),
                    p.base,
                ));
                spans.push(mark(entry.completed(), p));
            }
            lines.push(Line::from(spans));
        }
        Text::from(lines)
    }
}

impl Widget for Summaries<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let max_scroll = self.max_scroll(area.height);
        let title = if max_scroll > 0 {
            " Weekly Summaries (j/k scroll) "
        } else {
            " Weekly Summaries "
        };
        Paragraph::new(self.text())
            .scroll((self.scroll.min(max_scroll), 0))
            .block(panel(title, self.palette))
            .render(area, buf);
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Rules<'a> {
    pub(crate) challenge: &'a Challenge,
    pub(crate) month: YearMonth,
    pub(crate) palette: &'a Palette,
}

impl Rules<'_> {
    /// One line per rule and two borders, with a little room for wrapping
    pub(crate) fn height(&self) -> u16 {
        let participants =
            u16::try_from(self.challenge.participants().len()).unwrap_or(u16::MAX);
        participants.saturating_add(5 + 2 + 3)
    }
}

impl Widget for Rules<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let c = self.challenge;
        let mut rules = c
            .participants()
            .iter()
            .map(|p| {
                format!(
                    "{} needs to drink {}L of water daily.",
                    p.name(),
                    p.target_liters()
                )
            })
            .collect::<Vec<_>>();
        rules.push(String::from(
            "Participants must report their water intake at the end of each day via video or picture.",
        ));
        rules.push(format!(
            "Penalty for missing water target: {} jog/walk on weekend.",
            distance_penalty(self.month.month())
        ));
        rules.push(format!(
            "Failure to complete exercise: {} per missed day.",
            monetary_penalty(self.month.month())
        ));
        rules.push(format!(
            "Challenge runs from {} to {}.",
            long_date(c.start()),
            long_date(c.end())
        ));
        rules.push(format!(
            "Penalty enforcement begins {}.",
            long_date(c.penalty_start())
        ));
        let lines = std::iter::zip(1.., rules)
            .map(|(i, rule)| Line::raw(format!("{i}. {rule}")))
            .collect::<Vec<_>>();
        Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(panel(" Rules ", self.palette))
            .render(area, buf);
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Legend<'a>(pub(crate) &'a Palette);

impl Legend<'_> {
    pub(crate) const HEIGHT: u16 = 5;
}

impl Widget for Legend<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let p = self.0;
        let entry = |sym: &'static str, style: Style, label: &'static str| {
            [
                Span::styled(sym, style),
                Span::styled(format!(" {label:<24}"), p.base),
            ]
        };
        // Fill colors double as the swatch colors
        let swatch = |fill: Style| p.base.fg(fill.bg.unwrap_or(Color::Reset));
        let lines = [
            Line::from_iter(
                entry(SWATCH, swatch(p.met), "Target Achieved")
                    .into_iter()
                    .chain(entry(SWATCH, swatch(p.missed), "Target Missed")),
            ),
            Line::from_iter(
                entry(CHECK, p.done, "Penalty Completed")
                    .into_iter()
                    .chain(entry(CROSS, p.skipped, "Penalty Not Completed")),
            ),
            Line::from_iter(entry("due", p.quiet, "Weekend (Penalties due)")),
        ];
        Paragraph::new(Text::from_iter(lines))
            .block(panel(" Legend ", p))
            .render(area, buf);
    }
}
