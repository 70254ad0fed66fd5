//! Pure transforms over [`BracketSchedule`]s.
//!
//! | Operation | Effect on the step function |
//! |-----------|-----------------------------|
//! | [`sum`]   | `rate(x) = a.rate(x) + b.rate(x)` |
//! | [`shift`] | `rate(x) = 0` below `amount`, `original.rate(x - amount)` above |
//! | [`scale`] | `rate(x) = original.rate(x / factor)`, optionally `/ factor` |

use std::cmp::Ordering;
use std::iter;

use rust_decimal::Decimal;

use super::{BracketSchedule, ScheduleError};
use crate::models::Bracket;

/// Adds two schedules, producing one whose rate at every income is the sum
/// of the two input rates.
///
/// Both schedules are walked with one cursor each. Every step emits a
/// breakpoint at the later of the two current thresholds and then advances
/// the cursor whose next threshold comes first (both on a tie), so the
/// result holds exactly the union of the input breakpoints.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use rates_core::schedule::{BracketSchedule, sum};
///
/// let income_tax = BracketSchedule::from_pairs([(dec!(0), dec!(10)), (dec!(9525), dec!(12))]).unwrap();
/// let payroll = BracketSchedule::from_pairs([(dec!(0), dec!(7.65)), (dec!(127200), dec!(1.45))]).unwrap();
///
/// let combined = sum(&income_tax, &payroll);
///
/// assert_eq!(combined.rate_at(dec!(5000)), dec!(17.65));
/// assert_eq!(combined.rate_at(dec!(200000)), dec!(13.45));
/// assert_eq!(combined.len(), 3);
/// ```
pub fn sum(
    a: &BracketSchedule,
    b: &BracketSchedule,
) -> BracketSchedule {
    let (a, b) = (a.brackets(), b.brackets());
    let (last_a, last_b) = (a.len() - 1, b.len() - 1);
    let (mut i, mut j) = (0, 0);
    let mut brackets = Vec::with_capacity(a.len() + b.len() - 1);

    loop {
        let threshold = a[i].threshold.max(b[j].threshold);
        push_breakpoint(&mut brackets, Bracket::new(threshold, a[i].rate + b[j].rate));

        match (i == last_a, j == last_b) {
            (true, true) => break,
            (true, false) => j += 1,
            (false, true) => i += 1,
            (false, false) => match a[i + 1].threshold.cmp(&b[j + 1].threshold) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            },
        }
    }

    BracketSchedule { brackets }
}

/// Collapses a breakpoint onto the previous one when both share a threshold.
/// Only happens when the inputs to [`sum`] start at different thresholds.
fn push_breakpoint(
    brackets: &mut Vec<Bracket>,
    bracket: Bracket,
) {
    match brackets.last_mut() {
        Some(last) if last.threshold == bracket.threshold => last.rate = bracket.rate,
        _ => brackets.push(bracket),
    }
}

/// Moves every threshold right by `amount` and prepends a `[0, 0]` bracket.
///
/// This is how a standard deduction is applied: income below the deduction
/// is untaxed, and the original structure starts again above it.
///
/// A zero shift returns the schedule unchanged.
///
/// # Errors
///
/// * [`ScheduleError::NegativeShift`] if `amount` is negative.
/// * [`ScheduleError::NonIncreasingThreshold`] if the shifted first
///   threshold does not land above zero.
pub fn shift(
    schedule: &BracketSchedule,
    amount: Decimal,
) -> Result<BracketSchedule, ScheduleError> {
    if amount < Decimal::ZERO {
        return Err(ScheduleError::NegativeShift(amount));
    }
    if amount.is_zero() {
        return Ok(schedule.clone());
    }

    let brackets = iter::once(Bracket::zero())
        .chain(
            schedule
                .iter()
                .map(|b| Bracket::new(b.threshold + amount, b.rate)),
        )
        .collect();

    BracketSchedule::new(brackets)
}

/// Multiplies every threshold by `factor`.
///
/// With `scale_rates_too`, every rate is also divided by `factor`. That
/// re-expresses a deduction of a fixed share of income as an equivalent
/// change of the rates.
///
/// # Errors
///
/// Returns [`ScheduleError::NonPositiveScale`] if `factor` is zero or
/// negative.
pub fn scale(
    schedule: &BracketSchedule,
    factor: Decimal,
    scale_rates_too: bool,
) -> Result<BracketSchedule, ScheduleError> {
    if factor <= Decimal::ZERO {
        return Err(ScheduleError::NonPositiveScale(factor));
    }

    let brackets = schedule
        .iter()
        .map(|b| {
            let rate = if scale_rates_too { b.rate / factor } else { b.rate };
            Bracket::new(b.threshold * factor, rate)
        })
        .collect();

    BracketSchedule::new(brackets)
}
