//! Salary and budget arithmetic.
//!
//! - Captain-weighted salary totals
//! - Remaining budget against a salary cap
//! - Affordability checks for the player picker
//! - Lineup status counts

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

use serde::{Serialize, Serializer};

use crate::models::{Lineup, LineupStatus, LineupSummary, Player, PlayerId};

/// The captain's salary counts one and a half times toward the cap.
pub const CAPTAIN_MULTIPLIER: f64 = 1.5;

/// A currency amount held in half units.
///
/// The captain multiplier can produce a trailing half unit; keeping the
/// amount in halves means totals never truncate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SalaryAmount {
    halves: i64,
}

impl SalaryAmount {
    pub const ZERO: SalaryAmount = SalaryAmount { halves: 0 };

    pub fn from_units(units: i64) -> Self {
        Self { halves: units * 2 }
    }

    /// A player's contribution to the total.
    pub fn weighted(salary: u32, is_captain: bool) -> Self {
        let factor = if is_captain { CAPTAIN_MULTIPLIER } else { 1.0 };
        Self {
            halves: i64::from(salary) * (factor * 2.0) as i64,
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.halves as f64 / 2.0
    }

    pub fn is_negative(&self) -> bool {
        self.halves < 0
    }

    pub fn has_half(&self) -> bool {
        self.halves % 2 != 0
    }
}

impl Add for SalaryAmount {
    type Output = SalaryAmount;

    fn add(self, rhs: SalaryAmount) -> SalaryAmount {
        SalaryAmount {
            halves: self.halves + rhs.halves,
        }
    }
}

impl Sub for SalaryAmount {
    type Output = SalaryAmount;

    fn sub(self, rhs: SalaryAmount) -> SalaryAmount {
        SalaryAmount {
            halves: self.halves - rhs.halves,
        }
    }
}

impl Sum for SalaryAmount {
    fn sum<I: Iterator<Item = SalaryAmount>>(iter: I) -> Self {
        iter.fold(SalaryAmount::ZERO, Add::add)
    }
}

impl Serialize for SalaryAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

/// Renders like `$51,000` or `-$1,000.5`.
impl fmt::Display for SalaryAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let whole = (self.halves.abs() / 2).to_string();
        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, c) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        let half = if self.has_half() { ".5" } else { "" };
        write!(f, "{}${}{}", sign, grouped, half)
    }
}

/// Sum of salaries with the captain weighted by [`CAPTAIN_MULTIPLIER`].
pub fn total_salary<'a, I>(players: I, captain_id: Option<&PlayerId>) -> SalaryAmount
where
    I: IntoIterator<Item = &'a Player>,
{
    players
        .into_iter()
        .map(|p| SalaryAmount::weighted(p.salary, captain_id == Some(&p.id)))
        .sum()
}

/// Budget figures for a selection under a cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Budget {
    pub salary_cap: u32,
    pub total_salary: SalaryAmount,
    pub remaining: SalaryAmount,
}

impl Budget {
    pub fn new(salary_cap: u32, total_salary: SalaryAmount) -> Self {
        Self {
            salary_cap,
            total_salary,
            remaining: SalaryAmount::from_units(i64::from(salary_cap)) - total_salary,
        }
    }

    /// Negative remaining budget is a warning state, not an error.
    pub fn is_over_budget(&self) -> bool {
        self.remaining.is_negative()
    }

    /// Share of the cap in use, clamped to 100.
    pub fn percent_used(&self) -> f64 {
        if self.salary_cap == 0 {
            return 100.0;
        }
        (self.total_salary.as_f64() / f64::from(self.salary_cap) * 100.0).min(100.0)
    }
}

/// Whether a player can be picked into a slot.
///
/// `freed` is the unweighted salary of whoever currently holds the slot,
/// since replacing them releases that amount.
pub fn can_afford(salary: u32, remaining: SalaryAmount, freed: u32) -> bool {
    SalaryAmount::from_units(i64::from(salary))
        <= remaining + SalaryAmount::from_units(i64::from(freed))
}

/// Count lineups by status.
pub fn summarize_lineups(lineups: &[Lineup]) -> LineupSummary {
    let mut summary = LineupSummary {
        total: lineups.len(),
        ..Default::default()
    };
    for lineup in lineups {
        match lineup.status {
            LineupStatus::Active => summary.active += 1,
            LineupStatus::Completed => summary.completed += 1,
            LineupStatus::Cancelled => summary.cancelled += 1,
        }
    }
    summary
}
