use crate::config::{ChallengeFile, WeekEntry, DEFAULT_TITLE};
use crate::dates::{WeekKey, YearMonth};
use std::collections::{BTreeMap, BTreeSet};
use std::iter::successors;
use thiserror::Error;
use time::{Date, Weekday};

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Participant {
    id: String,
    name: String,
    target_liters: u8,
}

impl Participant {
    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn target_liters(&self) -> u8 {
        self.target_liters
    }
}

/// One participant's side of a week: the days they missed their target and
/// whether they then did the penalty exercise
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct ParticipantWeek {
    penalties: Vec<Date>,
    completed: bool,
}

impl ParticipantWeek {
    pub(crate) fn penalties(&self) -> &[Date] {
        &self.penalties
    }

    pub(crate) fn completed(&self) -> bool {
        self.completed
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct WeekRecord {
    key: WeekKey,
    description: String,
    // Indexed in the same order as `Challenge::participants`
    entries: Vec<ParticipantWeek>,
}

impl WeekRecord {
    pub(crate) fn key(&self) -> WeekKey {
        self.key
    }

    pub(crate) fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn entries(&self) -> &[ParticipantWeek] {
        &self.entries
    }

    pub(crate) fn entry(&self, participant: usize) -> Option<&ParticipantWeek> {
        self.entries.get(participant)
    }
}

/// A validated challenge.  Once constructed it is never modified; a changed
/// dataset is a new `Challenge`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Challenge {
    title: String,
    start: Date,
    end: Date,
    penalty_start: Date,
    participants: Vec<Participant>,
    weeks: Vec<WeekRecord>,
    by_key: BTreeMap<WeekKey, usize>,
}

impl Challenge {
    pub(crate) fn title(&self) -> &str {
        &self.title
    }

    pub(crate) fn start(&self) -> Date {
        self.start
    }

    pub(crate) fn end(&self) -> Date {
        self.end
    }

    pub(crate) fn penalty_start(&self) -> Date {
        self.penalty_start
    }

    pub(crate) fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Weekly records in the order they were given
    pub(crate) fn weeks(&self) -> &[WeekRecord] {
        &self.weeks
    }

    pub(crate) fn week(&self, key: WeekKey) -> Option<&WeekRecord> {
        self.by_key.get(&key).and_then(|&i| self.weeks.get(i))
    }

    /// Both ends of the challenge window are inclusive.
    pub(crate) fn in_window(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every month that overlaps the challenge window, in order
    pub(crate) fn months(&self) -> impl Iterator<Item = YearMonth> + '_ {
        successors(Some(YearMonth::of(self.start)), |m| m.next())
            .take_while(|m| m.first_day() <= self.end)
    }

    pub(crate) fn has_month(&self, month: YearMonth) -> bool {
        YearMonth::of(self.start) <= month && month <= YearMonth::of(self.end)
    }

    /// The month shown when nothing else has been asked for: the one in which
    /// penalties start being enforced
    pub(crate) fn default_month(&self) -> YearMonth {
        YearMonth::of(self.penalty_start)
    }
}

impl TryFrom<ChallengeFile> for Challenge {
    type Error = ChallengeError;

    fn try_from(file: ChallengeFile) -> Result<Challenge, ChallengeError> {
        if file.end < file.start {
            return Err(ChallengeError::EmptyWindow {
                start: file.start,
                end: file.end,
            });
        }
        if !(file.start <= file.penalty_start && file.penalty_start <= file.end) {
            return Err(ChallengeError::EnforcementOutsideWindow(file.penalty_start));
        }
        if file.participants.is_empty() {
            return Err(ChallengeError::NoParticipants);
        }
        let mut seen = BTreeSet::new();
        let participants = file
            .participants
            .into_iter()
            .map(|p| {
                if seen.insert(p.id.clone()) {
                    Ok(Participant {
                        id: p.id,
                        name: p.name,
                        target_liters: p.target_liters,
                    })
                } else {
                    Err(ChallengeError::DuplicateParticipant(p.id))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut challenge = Challenge {
            title: file.title.unwrap_or_else(|| String::from(DEFAULT_TITLE)),
            start: file.start,
            end: file.end,
            penalty_start: file.penalty_start,
            participants,
            weeks: Vec::with_capacity(file.weeks.len()),
            by_key: BTreeMap::new(),
        };
        for entry in file.weeks {
            let record = challenge.validate_week(entry)?;
            let key = record.key;
            if challenge.by_key.insert(key, challenge.weeks.len()).is_some() {
                return Err(ChallengeError::DuplicateWeek(key));
            }
            challenge.weeks.push(record);
        }
        Ok(challenge)
    }
}

impl Challenge {
    fn validate_week(&self, mut entry: WeekEntry) -> Result<WeekRecord, ChallengeError> {
        if entry.start.weekday() != Weekday::Monday {
            return Err(ChallengeError::NotAMonday {
                date: entry.start,
                weekday: entry.start.weekday(),
            });
        }
        let key = WeekKey::containing(entry.start);
        for id in entry.penalties.keys().chain(entry.compliance.keys()) {
            if !self.participants.iter().any(|p| &p.id == id) {
                return Err(ChallengeError::UnknownParticipant {
                    week: key,
                    id: id.clone(),
                });
            }
        }
        let mut entries = Vec::with_capacity(self.participants.len());
        for p in &self.participants {
            let penalties = entry.penalties.remove(&p.id).unwrap_or_default();
            let mut seen = BTreeSet::new();
            for &date in &penalties {
                let problem = if !key.contains(date) {
                    Some(DateProblem::OutsideWeek)
                } else if !self.in_window(date) {
                    Some(DateProblem::OutsideWindow)
                } else if date < self.penalty_start {
                    Some(DateProblem::BeforeEnforcement)
                } else if !seen.insert(date) {
                    Some(DateProblem::Duplicate)
                } else {
                    None
                };
                if let Some(problem) = problem {
                    return Err(ChallengeError::BadPenaltyDate {
                        week: key,
                        id: p.id.clone(),
                        date,
                        problem,
                    });
                }
            }
            let completed = match entry.compliance.remove(&p.id) {
                Some(c) => c,
                // Nothing to complete
                None if penalties.is_empty() => true,
                None => {
                    return Err(ChallengeError::MissingCompliance {
                        week: key,
                        id: p.id.clone(),
                    })
                }
            };
            entries.push(ParticipantWeek {
                penalties,
                completed,
            });
        }
        Ok(WeekRecord {
            key,
            description: entry.description,
            entries,
        })
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub(crate) enum ChallengeError {
    #[error("challenge ends ({end}) before it starts ({start})")]
    EmptyWindow { start: Date, end: Date },
    #[error("penalty enforcement start {0} is outside the challenge window")]
    EnforcementOutsideWindow(Date),
    #[error("challenge has no participants")]
    NoParticipants,
    #[error("participant {0:?} is listed more than once")]
    DuplicateParticipant(String),
    #[error("week starting {date} starts on a {weekday}, not a Monday")]
    NotAMonday { date: Date, weekday: Weekday },
    #[error("{0} is listed more than once")]
    DuplicateWeek(WeekKey),
    #[error("{week} mentions unknown participant {id:?}")]
    UnknownParticipant { week: WeekKey, id: String },
    #[error("{week} gives penalties for {id:?} but does not say whether they were completed")]
    MissingCompliance { week: WeekKey, id: String },
    #[error("{week}: penalty date {date} for {id:?} {problem}")]
    BadPenaltyDate {
        week: WeekKey,
        id: String,
        date: Date,
        problem: DateProblem,
    },
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub(crate) enum DateProblem {
    #[error("is not in that week")]
    OutsideWeek,
    #[error("is outside the challenge window")]
    OutsideWindow,
    /// A penalty dated before the challenge's `penalty-start`; missed days
    /// before enforcement starts are not recorded
    #[error("is before penalty enforcement starts")]
    BeforeEnforcement,
    #[error("is listed more than once")]
    Duplicate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParticipantEntry;
    use time::macros::date;

    fn participant(id: &str) -> ParticipantEntry {
        ParticipantEntry {
            id: id.into(),
            name: id.to_uppercase(),
            target_liters: 3,
        }
    }

    fn week(start: Date, penalties: &[(&str, &[Date])], compliance: &[(&str, bool)]) -> WeekEntry {
        WeekEntry {
            start,
            description: String::new(),
            penalties: penalties
                .iter()
                .map(|&(id, dates)| (id.to_owned(), dates.to_vec()))
                .collect(),
            compliance: compliance
                .iter()
                .map(|&(id, c)| (id.to_owned(), c))
                .collect(),
        }
    }

    fn file(weeks: Vec<WeekEntry>) -> ChallengeFile {
        ChallengeFile {
            title: None,
            start: date!(2025 - 01 - 20),
            end: date!(2025 - 08 - 31),
            penalty_start: date!(2025 - 02 - 03),
            participants: vec![participant("a"), participant("b")],
            weeks,
        }
    }

    #[test]
    fn test_valid() {
        let challenge = Challenge::try_from(file(vec![week(
            date!(2025 - 02 - 03),
            &[("a", &[date!(2025 - 02 - 03)]), ("b", &[])],
            &[("a", false)],
        )]))
        .unwrap();
        let record = challenge.week(WeekKey::containing(date!(2025 - 02 - 06))).unwrap();
        assert_eq!(record.entries().len(), 2);
        assert_eq!(record.entries()[0].penalties(), [date!(2025 - 02 - 03)]);
        assert!(!record.entries()[0].completed());
        assert!(record.entries()[1].penalties().is_empty());
        assert!(record.entries()[1].completed());
    }

    #[test]
    fn test_window_is_inclusive() {
        let challenge = Challenge::try_from(file(Vec::new())).unwrap();
        assert!(challenge.in_window(date!(2025 - 01 - 20)));
        assert!(challenge.in_window(date!(2025 - 08 - 31)));
        assert!(!challenge.in_window(date!(2025 - 01 - 19)));
        assert!(!challenge.in_window(date!(2025 - 09 - 01)));
    }

    #[test]
    fn test_months() {
        let challenge = Challenge::try_from(file(Vec::new())).unwrap();
        let months = challenge.months().map(|m| m.to_string()).collect::<Vec<_>>();
        assert_eq!(
            months,
            [
                "January 2025",
                "February 2025",
                "March 2025",
                "April 2025",
                "May 2025",
                "June 2025",
                "July 2025",
                "August 2025"
            ]
        );
        assert_eq!(challenge.default_month().to_string(), "February 2025");
        assert!(challenge.has_month(challenge.default_month()));
        assert!(!challenge.has_month(YearMonth::of(date!(2025 - 09 - 01))));
        assert!(!challenge.has_month(YearMonth::of(date!(2024 - 12 - 31))));
    }

    #[test]
    fn test_empty_window() {
        let mut f = file(Vec::new());
        f.end = date!(2025 - 01 - 01);
        assert_eq!(
            Challenge::try_from(f),
            Err(ChallengeError::EmptyWindow {
                start: date!(2025 - 01 - 20),
                end: date!(2025 - 01 - 01)
            })
        );
    }

    #[test]
    fn test_enforcement_outside_window() {
        let mut f = file(Vec::new());
        f.penalty_start = date!(2025 - 09 - 01);
        assert_eq!(
            Challenge::try_from(f),
            Err(ChallengeError::EnforcementOutsideWindow(date!(2025 - 09 - 01)))
        );
    }

    #[test]
    fn test_duplicate_participant() {
        let mut f = file(Vec::new());
        f.participants.push(participant("a"));
        assert_eq!(
            Challenge::try_from(f),
            Err(ChallengeError::DuplicateParticipant("a".into()))
        );
    }

    #[test]
    fn test_not_a_monday() {
        let f = file(vec![week(date!(2025 - 02 - 04), &[], &[])]);
        assert_eq!(
            Challenge::try_from(f),
            Err(ChallengeError::NotAMonday {
                date: date!(2025 - 02 - 04),
                weekday: Weekday::Tuesday
            })
        );
    }

    #[test]
    fn test_duplicate_week() {
        let f = file(vec![
            week(date!(2025 - 02 - 03), &[], &[]),
            week(date!(2025 - 02 - 03), &[], &[]),
        ]);
        assert_eq!(
            Challenge::try_from(f),
            Err(ChallengeError::DuplicateWeek(WeekKey::containing(date!(
                2025 - 02 - 03
            ))))
        );
    }

    #[test]
    fn test_unknown_participant() {
        let f = file(vec![week(date!(2025 - 02 - 03), &[], &[("c", true)])]);
        let e = Challenge::try_from(f).unwrap_err();
        assert_eq!(
            e.to_string(),
            "week-2025-02-03 mentions unknown participant \"c\""
        );
    }

    #[test]
    fn test_missing_compliance() {
        let f = file(vec![week(
            date!(2025 - 02 - 03),
            &[("b", &[date!(2025 - 02 - 05)])],
            &[],
        )]);
        assert_eq!(
            Challenge::try_from(f),
            Err(ChallengeError::MissingCompliance {
                week: WeekKey::containing(date!(2025 - 02 - 03)),
                id: "b".into()
            })
        );
    }

    #[test]
    fn test_penalty_outside_week() {
        let f = file(vec![week(
            date!(2025 - 02 - 03),
            &[("a", &[date!(2025 - 02 - 10)])],
            &[("a", true)],
        )]);
        let e = Challenge::try_from(f).unwrap_err();
        assert_eq!(
            e.to_string(),
            "week-2025-02-03: penalty date 2025-02-10 for \"a\" is not in that week"
        );
    }

    #[test]
    fn test_penalty_on_sunday_belongs_to_preceding_monday() {
        let f = file(vec![week(
            date!(2025 - 02 - 03),
            &[("a", &[date!(2025 - 02 - 09)])],
            &[("a", true)],
        )]);
        assert!(Challenge::try_from(f).is_ok());
    }

    #[test]
    fn test_penalty_outside_window() {
        let mut f = file(vec![week(
            date!(2025 - 08 - 25),
            &[("a", &[date!(2025 - 08 - 31)])],
            &[("a", true)],
        )]);
        f.end = date!(2025 - 08 - 30);
        assert!(matches!(
            Challenge::try_from(f),
            Err(ChallengeError::BadPenaltyDate {
                problem: DateProblem::OutsideWindow,
                ..
            })
        ));
    }

    #[test]
    fn test_penalty_before_enforcement() {
        let f = file(vec![week(
            date!(2025 - 01 - 27),
            &[("a", &[date!(2025 - 01 - 28)])],
            &[("a", true)],
        )]);
        assert!(matches!(
            Challenge::try_from(f),
            Err(ChallengeError::BadPenaltyDate {
                problem: DateProblem::BeforeEnforcement,
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_penalty_date() {
        let f = file(vec![week(
            date!(2025 - 02 - 03),
            &[("a", &[date!(2025 - 02 - 04), date!(2025 - 02 - 04)])],
            &[("a", true)],
        )]);
        assert!(matches!(
            Challenge::try_from(f),
            Err(ChallengeError::BadPenaltyDate {
                problem: DateProblem::Duplicate,
                ..
            })
        ));
    }

    #[test]
    fn test_default_title() {
        let challenge = Challenge::try_from(file(Vec::new())).unwrap();
        assert_eq!(challenge.title(), DEFAULT_TITLE);
        let mut f = file(Vec::new());
        f.title = Some("Water!".into());
        assert_eq!(Challenge::try_from(f).unwrap().title(), "Water!");
    }
}
