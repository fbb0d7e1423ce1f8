use super::grid::{Cell, MonthGrid};
use crate::challenge::Participant;
use crate::tally::DayStatus;
use crate::theme::{Palette, CHECK, CROSS};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Text,
    widgets::{Paragraph, Widget},
};
use time::Date;

static WEEKDAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// Number of columns per day of week
const DAY_WIDTH: u16 = 9;

/// Width of the calendar in columns
pub(crate) const MAIN_WIDTH: u16 = DAY_WIDTH * 7;

/// Number of lines taken up by the header and its rule
const HEADER_LINES: u16 = 2;

/// Width of the participant name shown in each cell
const NAME_WIDTH: usize = 6;

/// Column within a cell at which a participant's check or cross is drawn
const MARK_OFFSET: u16 = 7;

const ACS_HLINE: char = '─';

/// Draws a [`MonthGrid`], one block of lines per week: the day numbers, then
/// one line per participant, then a blank spacer line
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct CalendarView<'a> {
    grid: &'a MonthGrid,
    participants: &'a [Participant],
    today: Date,
    palette: &'a Palette,
}

impl<'a> CalendarView<'a> {
    pub(crate) fn new(
        grid: &'a MonthGrid,
        participants: &'a [Participant],
        today: Date,
        palette: &'a Palette,
    ) -> Self {
        CalendarView {
            grid,
            participants,
            today,
            palette,
        }
    }

    fn week_lines(&self) -> u16 {
        u16::try_from(self.participants.len())
            .unwrap_or(u16::MAX)
            .saturating_add(2)
    }

    /// Number of lines needed to draw the whole month
    pub(crate) fn height(&self) -> u16 {
        let rows = u16::try_from(self.grid.row_count()).unwrap_or(u16::MAX);
        HEADER_LINES.saturating_add(rows.saturating_mul(self.week_lines()))
    }

    fn draw_cell(&self, canvas: &mut BufferCanvas<'_>, y: u16, x: u16, cell: &Cell) {
        let Some(date) = cell.date() else {
            return;
        };
        let label = if date == self.today {
            format!("[{:2}]", date.day())
        } else {
            format!(" {:2} ", date.day())
        };
        match cell {
            Cell::Blank => (),
            Cell::Inactive(_) => canvas.mvprint(y, x, label, self.palette.inactive),
            Cell::WeekendClear(_) => {
                canvas.mvprint(y, x, label, self.palette.base);
                canvas.mvprint(y + 1, x + 1, "weekend", self.palette.quiet);
            }
            Cell::WeekendDue { completed, .. } => {
                canvas.mvprint(y, x, label, self.palette.base);
                canvas.mvprint(y, x + 5, "due", self.palette.quiet);
                let rows = self.participants.iter().zip(completed);
                for (i, (p, &done)) in std::iter::zip(1u16.., rows) {
                    canvas.mvprint(y + i, x, short_name(p), self.palette.base);
                    let (mark, style) = self.mark(done);
                    canvas.mvprint(y + i, x + MARK_OFFSET, mark, style);
                }
            }
            Cell::Weekday { statuses, .. } => {
                canvas.mvprint(y, x, label, self.palette.base);
                let rows = self.participants.iter().zip(statuses);
                for (i, (p, status)) in std::iter::zip(1u16.., rows) {
                    match *status {
                        DayStatus::TargetMet => {
                            canvas.mvprint(y + i, x, short_name(p), self.palette.met);
                        }
                        DayStatus::TargetMissed { penalty_done } => {
                            canvas.mvprint(y + i, x, short_name(p), self.palette.missed);
                            if let Some(done) = penalty_done {
                                let (mark, style) = self.mark(done);
                                canvas.mvprint(y + i, x + MARK_OFFSET, mark, style);
                            }
                        }
                    }
                }
            }
        }
    }

    fn mark(&self, done: bool) -> (&'static str, Style) {
        if done {
            (CHECK, self.palette.done)
        } else {
            (CROSS, self.palette.skipped)
        }
    }
}

fn short_name(p: &Participant) -> String {
    let name = p.name().chars().take(NAME_WIDTH).collect::<String>();
    format!("{name:<NAME_WIDTH$}")
}

impl Widget for CalendarView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut canvas = BufferCanvas::new(area, buf);
        canvas.draw_header(self.palette.heading);
        let week_lines = self.week_lines();
        for (row, week) in std::iter::zip(0u16.., self.grid.rows()) {
            let y = HEADER_LINES.saturating_add(row.saturating_mul(week_lines));
            for (col, cell) in std::iter::zip(0u16.., week) {
                self.draw_cell(&mut canvas, y, col * DAY_WIDTH, cell);
            }
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    fn draw_header(&mut self, style: Style) {
        for (col, name) in std::iter::zip(0u16.., WEEKDAYS) {
            self.mvprint(0, col * DAY_WIDTH + 1, name, style);
        }
        self.hline(1, 0, ACS_HLINE, MAIN_WIDTH);
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Style) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style);
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // Using a Paragraph lets us truncate text that extends beyond the
            // calendar's area, though we need to be sure that the Rect passed
            // to the Paragraph is entirely within the frame lest a panic
            // result.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    fn hline(&mut self, y: u16, x: u16, ch: char, length: u16) {
        self.mvprint(
            y,
            x,
            String::from(ch).repeat(length.into()),
            Style::new(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChallengeSource;
    use crate::dates::YearMonth;
    use crate::tally::Ledger;
    use crate::theme::Theme;
    use ratatui::style::Color;
    use time::{macros::date, Month};

    fn render(month: Month, today: Date) -> Buffer {
        let ledger = Ledger::new(ChallengeSource::Builtin.load().unwrap());
        let grid = MonthGrid::build(&ledger, YearMonth::new(2025, month).unwrap());
        let view = CalendarView::new(
            &grid,
            ledger.challenge().participants(),
            today,
            Theme::Dark.palette(),
        );
        let area = Rect::new(0, 0, MAIN_WIDTH, view.height());
        let mut buffer = Buffer::empty(area);
        view.render(area, &mut buffer);
        buffer
    }

    fn line(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol())
            .collect()
    }

    #[test]
    fn test_height() {
        // 2 header lines + 5 weeks × (day line + 2 participants + spacer)
        let buffer = render(Month::February, date!(2025 - 03 - 15));
        assert_eq!(buffer.area.height, 22);
    }

    #[test]
    fn test_february_first_week() {
        let buffer = render(Month::February, date!(2025 - 03 - 15));
        assert_eq!(
            line(&buffer, 0),
            " Su       Mo       Tu       We       Th       Fr       Sa      "
        );
        assert_eq!(line(&buffer, 1), "─".repeat(63));
        assert_eq!(line(&buffer, 2).trim_end(), format!("{}  1", " ".repeat(54)));
        assert_eq!(line(&buffer, 3).trim_end(), format!("{}weekend", " ".repeat(55)));
    }

    #[test]
    fn test_february_second_week() {
        let buffer = render(Month::February, date!(2025 - 03 - 15));
        // Monday the 3rd: Edjay & Nicole both missed, both completed
        assert_eq!(&line(&buffer, 6)[9..17], "  3     ");
        assert_eq!(&line(&buffer, 7)[9..16], "Edjay  ");
        assert_eq!(buffer[(16, 7)].symbol(), CHECK);
        assert_eq!(buffer[(9, 7)].style().bg, Some(Color::Red));
        // Thursday the 6th: only Nicole missed
        assert_eq!(buffer[(36, 7)].style().bg, Some(Color::Green));
        assert_eq!(buffer[(36, 8)].style().bg, Some(Color::Red));
        assert_eq!(buffer[(43, 7)].symbol(), " ");
        assert_eq!(buffer[(43, 8)].symbol(), CHECK);
        // Saturday the 8th has penalties due
        assert_eq!(&line(&buffer, 6)[54..62], "  8  due");
    }

    #[test]
    fn test_today_is_bracketed() {
        let buffer = render(Month::February, date!(2025 - 02 - 12));
        // Wednesday the 12th is in the third week
        assert_eq!(&line(&buffer, 10)[27..31], "[12]");
    }

    #[test]
    fn test_inactive_days_show_no_status() {
        let buffer = render(Month::January, date!(2025 - 03 - 15));
        // January 1, 2025 is a Wednesday; the first week is before the start
        assert_eq!(&line(&buffer, 2)[27..31], "  1 ");
        assert_eq!(buffer[(28, 2)].style().fg, Some(Color::DarkGray));
        assert_eq!(line(&buffer, 3).trim(), "");
    }
}
