use crate::challenge::ParticipantWeek;
use crate::dates::{is_weekend, week_key, YearMonth, DAYS_IN_WEEK};
use crate::tally::{DayStatus, Ledger};
use std::iter::repeat_with;
use std::slice::ChunksExact;
use time::Date;

const COLUMNS: usize = DAYS_IN_WEEK as usize;

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Cell {
    /// Padding before the first or after the last day of the month
    Blank,
    /// A day outside the challenge window
    Inactive(Date),
    /// A weekend whose week has a penalty record; holds each participant's
    /// compliance for that week
    WeekendDue { date: Date, completed: Vec<bool> },
    /// A weekend with no penalties to work off
    WeekendClear(Date),
    /// A weekday inside the challenge window; holds each participant's status
    Weekday { date: Date, statuses: Vec<DayStatus> },
}

impl Cell {
    pub(crate) fn date(&self) -> Option<Date> {
        match self {
            Cell::Blank => None,
            Cell::Inactive(date) | Cell::WeekendClear(date) => Some(*date),
            Cell::WeekendDue { date, .. } | Cell::Weekday { date, .. } => Some(*date),
        }
    }

    fn classify(ledger: &Ledger, date: Date) -> Cell {
        let challenge = ledger.challenge();
        if !challenge.in_window(date) {
            Cell::Inactive(date)
        } else if is_weekend(date) {
            match challenge.week(week_key(date)) {
                Some(record) => Cell::WeekendDue {
                    date,
                    completed: record
                        .entries()
                        .iter()
                        .map(ParticipantWeek::completed)
                        .collect(),
                },
                None => Cell::WeekendClear(date),
            }
        } else {
            Cell::Weekday {
                date,
                statuses: (0..challenge.participants().len())
                    .map(|p| ledger.day_status(p, date))
                    .collect(),
            }
        }
    }
}

/// The cells of one month laid out row-major in Sunday-first weeks
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthGrid {
    month: YearMonth,
    // Invariant: length is a nonzero multiple of COLUMNS
    cells: Vec<Cell>,
}

impl MonthGrid {
    pub(crate) fn build(ledger: &Ledger, month: YearMonth) -> MonthGrid {
        let offset = usize::from(month.first_weekday_offset());
        let days = usize::from(month.day_count());
        let rows = (offset + days).div_ceil(COLUMNS);
        let mut cells = Vec::with_capacity(rows * COLUMNS);
        cells.extend(repeat_with(|| Cell::Blank).take(offset));
        cells.extend(month.days().map(|date| Cell::classify(ledger, date)));
        cells.resize(rows * COLUMNS, Cell::Blank);
        MonthGrid { month, cells }
    }

    pub(crate) fn month(&self) -> YearMonth {
        self.month
    }

    pub(crate) fn rows(&self) -> ChunksExact<'_, Cell> {
        self.cells.chunks_exact(COLUMNS)
    }

    pub(crate) fn row_count(&self) -> usize {
        self.cells.len() / COLUMNS
    }

    #[cfg(test)]
    fn cell(&self, date: Date) -> Option<&Cell> {
        if !self.month.contains(date) {
            return None;
        }
        let i = usize::from(self.month.first_weekday_offset()) + usize::from(date.day()) - 1;
        self.cells.get(i)
    }
}
