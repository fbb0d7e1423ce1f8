//! Figures derived from a challenge's weekly records: who missed which days,
//! how many misses fall in a month, and what is owed for skipped exercise.

use crate::challenge::{Challenge, ParticipantWeek, WeekRecord};
use crate::dates::{week_key, YearMonth};
use crate::rates::{monetary_penalty, Pesos};
use std::collections::BTreeSet;
use time::Date;

/// Every penalty date of every participant, flattened out of the weekly
/// records
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct PenaltyIndex {
    // Indexed in the same order as `Challenge::participants`
    dates: Vec<BTreeSet<Date>>,
}

impl PenaltyIndex {
    pub(crate) fn build(challenge: &Challenge) -> PenaltyIndex {
        let mut dates = vec![BTreeSet::new(); challenge.participants().len()];
        for record in challenge.weeks() {
            for (set, entry) in dates.iter_mut().zip(record.entries()) {
                set.extend(entry.penalties().iter().copied());
            }
        }
        PenaltyIndex { dates }
    }

    pub(crate) fn contains(&self, participant: usize, date: Date) -> bool {
        self.dates
            .get(participant)
            .is_some_and(|set| set.contains(&date))
    }

    pub(crate) fn count_in(&self, participant: usize, month: YearMonth) -> usize {
        self.dates.get(participant).map_or(0, |set| {
            set.range(month.first_day()..=month.last_day()).count()
        })
    }
}

/// How a participant fared on a single weekday
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum DayStatus {
    TargetMet,
    TargetMissed {
        /// Whether the penalty for the missed day's week was done; `None` if
        /// no record exists for that week
        penalty_done: Option<bool>,
    },
}

/// Overall outcome of a week across all participants
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum WeekStatus {
    AllCompleted,
    NoneCompleted,
    Mixed,
}

impl WeekStatus {
    pub(crate) fn of(record: &WeekRecord) -> WeekStatus {
        let done = record.entries().iter().filter(|e| e.completed()).count();
        if done == record.entries().len() {
            WeekStatus::AllCompleted
        } else if done == 0 {
            WeekStatus::NoneCompleted
        } else {
            WeekStatus::Mixed
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct WeekSummary<'a> {
    pub(crate) record: &'a WeekRecord,
    pub(crate) status: WeekStatus,
}

/// A challenge together with the index derived from it.  The two are only
/// ever constructed together, so replacing the challenge always rebuilds the
/// index.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Ledger {
    challenge: Challenge,
    index: PenaltyIndex,
}

impl Ledger {
    pub(crate) fn new(challenge: Challenge) -> Ledger {
        let index = PenaltyIndex::build(&challenge);
        Ledger { challenge, index }
    }

    pub(crate) fn challenge(&self) -> &Challenge {
        &self.challenge
    }

    /// Number of missed days per participant in `month`
    pub(crate) fn monthly_counts(&self, month: YearMonth) -> Vec<usize> {
        (0..self.challenge.participants().len())
            .map(|p| self.index.count_in(p, month))
            .collect()
    }

    /// Money owed for weeks starting in `month` whose penalty exercise was
    /// skipped, charged at `month`'s rate per missed day
    pub(crate) fn owed_amount(&self, month: YearMonth) -> Pesos {
        let rate = monetary_penalty(month.month());
        self.challenge
            .weeks()
            .iter()
            .filter(|record| month.contains(record.key().monday()))
            .flat_map(WeekRecord::entries)
            .filter(|entry| !entry.completed())
            .fold(Pesos::ZERO, |total, entry| {
                total + rate.times(entry.penalties().len())
            })
    }

    /// Records with at least one penalty in `month`, in dataset order
    pub(crate) fn weekly_summaries(&self, month: YearMonth) -> Vec<WeekSummary<'_>> {
        self.challenge
            .weeks()
            .iter()
            .filter(|record| {
                record
                    .entries()
                    .iter()
                    .flat_map(ParticipantWeek::penalties)
                    .any(|&d| month.contains(d))
            })
            .map(|record| WeekSummary {
                record,
                status: WeekStatus::of(record),
            })
            .collect()
    }

    pub(crate) fn day_status(&self, participant: usize, date: Date) -> DayStatus {
        if self.index.contains(participant, date) {
            let penalty_done = self
                .challenge
                .week(week_key(date))
                .and_then(|record| record.entry(participant))
                .map(ParticipantWeek::completed);
            DayStatus::TargetMissed { penalty_done }
        } else {
            DayStatus::TargetMet
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChallengeSource;
    use time::{macros::date, Month};

    const EDJAY: usize = 0;
    const NICOLE: usize = 1;

    fn ledger() -> Ledger {
        Ledger::new(ChallengeSource::Builtin.load().unwrap())
    }

    fn month(m: Month) -> YearMonth {
        YearMonth::new(2025, m).unwrap()
    }

    #[test]
    fn test_index_contains() {
        let ledger = ledger();
        assert!(ledger.index.contains(EDJAY, date!(2025 - 02 - 03)));
        assert!(ledger.index.contains(NICOLE, date!(2025 - 02 - 06)));
        assert!(!ledger.index.contains(EDJAY, date!(2025 - 02 - 06)));
        assert!(!ledger.index.contains(EDJAY, date!(2025 - 02 - 01)));
        assert!(!ledger.index.contains(7, date!(2025 - 02 - 03)));
    }

    #[test]
    fn test_every_penalty_maps_back_to_its_week() {
        let ledger = ledger();
        for record in ledger.challenge().weeks() {
            for entry in record.entries() {
                for &d in entry.penalties() {
                    assert_eq!(week_key(d), record.key());
                }
            }
        }
    }

    #[test]
    fn test_monthly_counts_february() {
        let ledger = ledger();
        let counts = ledger.monthly_counts(month(Month::February));
        assert_eq!(counts, [2 + 5 + 3 + 5, 2 + 5 + 5 + 4]);
        // Pure: asking again gives the same answer
        assert_eq!(ledger.monthly_counts(month(Month::February)), counts);
    }

    #[test]
    fn test_monthly_counts_empty_month() {
        let ledger = ledger();
        assert_eq!(ledger.monthly_counts(month(Month::March)), [0, 0]);
        assert_eq!(ledger.monthly_counts(month(Month::January)), [0, 0]);
    }

    #[test]
    fn test_owed_february() {
        let ledger = ledger();
        assert_eq!(ledger.owed_amount(month(Month::February)), Pesos::new(100));
    }

    fn two_march_weeks(second_a_completed: bool) -> Ledger {
        let challenge = crate::config::parse_challenge(&format!(
            concat!(
                "start = \"2025-01-20\"\n",
                "end = \"2025-08-31\"\n",
                "penalty-start = \"2025-02-03\"\n",
                "participants = [\n",
                "  {{ id = \"a\", name = \"A\", target-liters = 1 }},\n",
                "  {{ id = \"b\", name = \"B\", target-liters = 1 }},\n",
                "]\n",
                "[[weeks]]\n",
                "start = \"2025-03-03\"\n",
                "penalties = {{ a = [\"2025-03-04\"], b = [\"2025-03-05\", \"2025-03-06\"] }}\n",
                "compliance = {{ a = true, b = true }}\n",
                "[[weeks]]\n",
                "start = \"2025-03-10\"\n",
                "penalties = {{ a = [\"2025-03-11\", \"2025-03-12\"], b = [\"2025-03-13\"] }}\n",
                "compliance = {{ a = {}, b = true }}\n",
            ),
            second_a_completed
        ))
        .unwrap();
        Ledger::new(challenge)
    }

    #[test]
    fn test_owed_zero_when_all_compliant() {
        let ledger = two_march_weeks(true);
        let march = month(Month::March);
        assert_eq!(
            ledger.monthly_counts(march),
            vec![3, 3],
            "March should have penalties on record"
        );
        assert_eq!(ledger.owed_amount(march), Pesos::ZERO);
    }

    #[test]
    fn test_owed_counts_one_skipped_week() {
        let ledger = two_march_weeks(false);
        // A skipped two penalties in the second week, at 15 pesos each
        assert_eq!(ledger.owed_amount(month(Month::March)), Pesos::new(30));
    }

    #[test]
    fn test_weekly_summaries_february() {
        let ledger = ledger();
        let summaries = ledger.weekly_summaries(month(Month::February));
        let got = summaries
            .iter()
            .map(|s| (s.record.key().to_string(), s.status))
            .collect::<Vec<_>>();
        assert_eq!(
            got,
            [
                ("week-2025-02-03".to_owned(), WeekStatus::AllCompleted),
                ("week-2025-02-10".to_owned(), WeekStatus::NoneCompleted),
                ("week-2025-02-17".to_owned(), WeekStatus::AllCompleted),
                ("week-2025-02-24".to_owned(), WeekStatus::AllCompleted),
            ]
        );
    }

    #[test]
    fn test_weekly_summaries_other_month() {
        let ledger = ledger();
        assert!(ledger.weekly_summaries(month(Month::March)).is_empty());
    }

    #[test]
    fn test_day_status() {
        let ledger = ledger();
        assert_eq!(
            ledger.day_status(EDJAY, date!(2025 - 02 - 03)),
            DayStatus::TargetMissed {
                penalty_done: Some(true)
            }
        );
        assert_eq!(
            ledger.day_status(NICOLE, date!(2025 - 02 - 12)),
            DayStatus::TargetMissed {
                penalty_done: Some(false)
            }
        );
        assert_eq!(
            ledger.day_status(EDJAY, date!(2025 - 02 - 19)),
            DayStatus::TargetMet
        );
        assert_eq!(
            ledger.day_status(NICOLE, date!(2025 - 02 - 19)),
            DayStatus::TargetMissed {
                penalty_done: Some(true)
            }
        );
    }

    #[test]
    fn test_mixed_week() {
        let challenge = crate::config::parse_challenge(concat!(
            "start = \"2025-01-20\"\n",
            "end = \"2025-08-31\"\n",
            "penalty-start = \"2025-02-03\"\n",
            "participants = [\n",
            "  { id = \"a\", name = \"A\", target-liters = 1 },\n",
            "  { id = \"b\", name = \"B\", target-liters = 1 },\n",
            "]\n",
            "[[weeks]]\n",
            "start = \"2025-03-03\"\n",
            "penalties = { a = [\"2025-03-04\", \"2025-03-05\"], b = [\"2025-03-04\"] }\n",
            "compliance = { a = false, b = true }\n",
        ))
        .unwrap();
        let ledger = Ledger::new(challenge);
        let march = month(Month::March);
        let summaries = ledger.weekly_summaries(march);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].status, WeekStatus::Mixed);
        // March is charged at 15 pesos per missed day
        assert_eq!(ledger.owed_amount(march), Pesos::new(30));
    }

    #[test]
    fn test_week_spanning_months() {
        // The week of March 31 has its penalties in April; it is summarized
        // under April but only billed under March, where the week starts.
        let challenge = crate::config::parse_challenge(concat!(
            "start = \"2025-01-20\"\n",
            "end = \"2025-08-31\"\n",
            "penalty-start = \"2025-02-03\"\n",
            "participants = [{ id = \"a\", name = \"A\", target-liters = 1 }]\n",
            "[[weeks]]\n",
            "start = \"2025-03-31\"\n",
            "penalties = { a = [\"2025-04-01\", \"2025-04-02\"] }\n",
            "compliance = { a = false }\n",
        ))
        .unwrap();
        let ledger = Ledger::new(challenge);
        let (march, april) = (month(Month::March), month(Month::April));
        assert!(ledger.weekly_summaries(march).is_empty());
        assert_eq!(ledger.weekly_summaries(april).len(), 1);
        assert_eq!(ledger.owed_amount(march), Pesos::new(30));
        assert_eq!(ledger.owed_amount(april), Pesos::ZERO);
        assert_eq!(ledger.monthly_counts(april), [2]);
    }
}
