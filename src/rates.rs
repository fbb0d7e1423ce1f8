//! Month-indexed penalty schedules.  Penalties grow every month from February
//! to August; any other month is charged at the lowest tier.

use std::fmt;
use std::ops::Add;
use time::Month;

/// Distance to jog or walk on the weekend for each missed day
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct Distance {
    meters: u32,
}

impl Distance {
    const fn meters(meters: u32) -> Distance {
        Distance { meters }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let km = self.meters / 1000;
        let rest = self.meters % 1000;
        if rest == 0 {
            write!(f, "{km}km")
        } else {
            let frac = format!("{rest:03}");
            write!(f, "{km}.{}km", frac.trim_end_matches('0'))
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct Pesos(u32);

impl Pesos {
    pub(crate) const ZERO: Pesos = Pesos(0);

    pub(crate) const fn new(amount: u32) -> Pesos {
        Pesos(amount)
    }

    pub(crate) fn amount(self) -> u32 {
        self.0
    }

    /// The rate charged `days` times over
    pub(crate) fn times(self, days: usize) -> Pesos {
        let days = u32::try_from(days).unwrap_or(u32::MAX);
        Pesos(self.0.saturating_mul(days))
    }
}

impl Add for Pesos {
    type Output = Pesos;

    fn add(self, rhs: Pesos) -> Pesos {
        Pesos(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Pesos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Pesos", self.amount())
    }
}

pub(crate) fn distance_penalty(month: Month) -> Distance {
    Distance::meters(match month {
        Month::March => 1500,
        Month::April => 2000,
        Month::May => 2500,
        Month::June => 3000,
        Month::July => 3500,
        Month::August => 4000,
        // February and every month outside the schedule
        _ => 1000,
    })
}

pub(crate) fn monetary_penalty(month: Month) -> Pesos {
    Pesos::new(match month {
        Month::March => 15,
        Month::April => 20,
        Month::May => 25,
        Month::June => 30,
        Month::July => 35,
        Month::August => 40,
        _ => 10,
    })
}
