use std::fmt;
use std::iter::successors;
use time::{util::is_leap_year, Date, Duration, Month, Weekday};

pub(crate) const DAYS_IN_WEEK: u8 = 7;

pub(crate) trait WeekdayExt {
    /// Column of the weekday in a Sunday-first calendar
    fn index0(&self) -> u8;

    fn is_weekend(&self) -> bool;
}

impl WeekdayExt for Weekday {
    fn index0(&self) -> u8 {
        self.number_days_from_sunday()
    }

    fn is_weekend(&self) -> bool {
        matches!(self, Weekday::Saturday | Weekday::Sunday)
    }
}

pub(crate) fn is_weekend(date: Date) -> bool {
    date.weekday().is_weekend()
}

pub(crate) fn days_in_month(year: i32, month: Month) -> u8 {
    match month {
        Month::February if is_leap_year(year) => 29,
        Month::February => 28,
        Month::April | Month::June | Month::September | Month::November => 30,
        _ => 31,
    }
}

/// Identifies the Monday–Sunday span containing a date by the date of its
/// Monday.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct WeekKey(Date);

impl WeekKey {
    pub(crate) fn containing(date: Date) -> WeekKey {
        let back = match date.weekday().index0() {
            0 => 6,
            wd => wd - 1,
        };
        // Saturates at the start of the representable calendar, the only
        // place where the Monday may not exist.
        WeekKey(date.saturating_sub(Duration::days(back.into())))
    }

    pub(crate) fn monday(self) -> Date {
        self.0
    }

    pub(crate) fn friday(self) -> Date {
        self.0.saturating_add(Duration::days(4))
    }

    pub(crate) fn contains(self, date: Date) -> bool {
        WeekKey::containing(date) == self
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "week-{}", self.0)
    }
}

pub(crate) fn week_key(date: Date) -> WeekKey {
    WeekKey::containing(date)
}

/// A calendar month, stored as its first day
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct YearMonth(Date);

impl YearMonth {
    pub(crate) fn new(year: i32, month: Month) -> Option<YearMonth> {
        Date::from_calendar_date(year, month, 1).ok().map(YearMonth)
    }

    pub(crate) fn of(date: Date) -> YearMonth {
        YearMonth(date.saturating_sub(Duration::days(i64::from(date.day()) - 1)))
    }

    pub(crate) fn year(self) -> i32 {
        self.0.year()
    }

    pub(crate) fn month(self) -> Month {
        self.0.month()
    }

    pub(crate) fn first_day(self) -> Date {
        self.0
    }

    pub(crate) fn last_day(self) -> Date {
        self.0
            .saturating_add(Duration::days(i64::from(self.day_count()) - 1))
    }

    pub(crate) fn day_count(self) -> u8 {
        days_in_month(self.year(), self.month())
    }

    /// Number of blank cells before the first day in a Sunday-first grid
    pub(crate) fn first_weekday_offset(self) -> u8 {
        self.0.weekday().index0()
    }

    pub(crate) fn contains(self, date: Date) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    pub(crate) fn days(self) -> impl Iterator<Item = Date> {
        successors(Some(self.0), |d| d.next_day()).take(usize::from(self.day_count()))
    }

    pub(crate) fn next(self) -> Option<YearMonth> {
        self.last_day().next_day().map(YearMonth)
    }

    pub(crate) fn previous(self) -> Option<YearMonth> {
        self.0.previous_day().map(YearMonth::of)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month(), self.year())
    }
}

/// Renders a date the long way round, e.g. "January 20, 2025"
pub(crate) fn long_date(date: Date) -> String {
    format!("{} {}, {}", date.month(), date.day(), date.year())
}

/// Renders a date as day and month, e.g. "3 February"
pub(crate) fn day_month(date: Date) -> String {
    format!("{} {}", date.day(), date.month())
}
