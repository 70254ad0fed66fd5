//! Piecewise-constant marginal rate schedules.
//!
//! A [`BracketSchedule`] is an ordered list of `(threshold, rate)` pairs. The
//! rate of a bracket applies from its threshold up to the next bracket's
//! threshold; the last bracket extends without bound. Rates are signed
//! percentages, so refundable credits and benefit phase-ins show up as
//! negative marginal rates and phase-outs as positive ones.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use rates_core::schedule::BracketSchedule;
//!
//! let schedule = BracketSchedule::from_pairs([
//!     (dec!(0), dec!(10)),
//!     (dec!(9525), dec!(12)),
//! ])
//! .unwrap();
//!
//! assert_eq!(schedule.rate_at(dec!(5000)), dec!(10));
//! assert_eq!(schedule.rate_at(dec!(9525)), dec!(12));
//! ```

pub mod algebra;
pub mod phaseout;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Bracket;

pub use algebra::{scale, shift, sum};
pub use phaseout::ExemptionPhaseout;

/// Errors raised when a schedule would break its ordering invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("a bracket schedule needs at least one bracket")]
    Empty,

    #[error("bracket {index} starts at {threshold}, not above the previous threshold {previous}")]
    NonIncreasingThreshold {
        index: usize,
        previous: Decimal,
        threshold: Decimal,
    },

    #[error("schedule starts at {0} instead of 0")]
    NotAnchored(Decimal),

    #[error("cannot shift a schedule by a negative amount ({0})")]
    NegativeShift(Decimal),

    #[error("scale factor must be positive, got {0}")]
    NonPositiveScale(Decimal),

    #[error("exemption phaseout band must have a positive width, got {0}")]
    DegeneratePhaseout(Decimal),
}

/// An ordered, strictly increasing sequence of brackets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bracket>", into = "Vec<Bracket>")]
pub struct BracketSchedule {
    brackets: Vec<Bracket>,
}

impl BracketSchedule {
    /// Builds a schedule, checking that it is non-empty and that thresholds
    /// strictly increase.
    pub fn new(brackets: Vec<Bracket>) -> Result<Self, ScheduleError> {
        if brackets.is_empty() {
            return Err(ScheduleError::Empty);
        }
        for (index, pair) in brackets.windows(2).enumerate() {
            if pair[1].threshold <= pair[0].threshold {
                return Err(ScheduleError::NonIncreasingThreshold {
                    index: index + 1,
                    previous: pair[0].threshold,
                    threshold: pair[1].threshold,
                });
            }
        }
        Ok(Self { brackets })
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self, ScheduleError>
    where
        I: IntoIterator<Item = (Decimal, Decimal)>,
    {
        Self::new(pairs.into_iter().map(Bracket::from).collect())
    }

    /// The constant-zero schedule `[[0, 0]]`.
    pub fn zero() -> Self {
        Self {
            brackets: vec![Bracket::zero()],
        }
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bracket> {
        self.brackets.iter()
    }

    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }

    pub fn first(&self) -> Bracket {
        self.brackets[0]
    }

    pub fn thresholds(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.brackets.iter().map(|b| b.threshold)
    }

    /// Marginal rate at `income`. Income below the first threshold has a
    /// rate of zero.
    pub fn rate_at(
        &self,
        income: Decimal,
    ) -> Decimal {
        let idx = self.brackets.partition_point(|b| b.threshold <= income);
        if idx == 0 {
            Decimal::ZERO
        } else {
            self.brackets[idx - 1].rate
        }
    }

    /// Whether the schedule starts at zero income, as any schedule shown on
    /// its own must.
    pub fn is_anchored(&self) -> bool {
        self.first().threshold.is_zero()
    }

    pub fn ensure_anchored(&self) -> Result<(), ScheduleError> {
        if self.is_anchored() {
            Ok(())
        } else {
            Err(ScheduleError::NotAnchored(self.first().threshold))
        }
    }

    pub fn into_brackets(self) -> Vec<Bracket> {
        self.brackets
    }
}

impl TryFrom<Vec<Bracket>> for BracketSchedule {
    type Error = ScheduleError;

    fn try_from(brackets: Vec<Bracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<BracketSchedule> for Vec<Bracket> {
    fn from(schedule: BracketSchedule) -> Self {
        schedule.brackets
    }
}

impl<'a> IntoIterator for &'a BracketSchedule {
    type Item = &'a Bracket;
    type IntoIter = std::slice::Iter<'a, Bracket>;

    fn into_iter(self) -> Self::IntoIter {
        self.brackets.iter()
    }
}
