//! Child tax credit.
//!
//! The credit phases in as a refund at a fixed rate above an earnings
//! threshold, until either the full credit is reached or the household owes
//! enough income tax for the credit to simply offset liability. Past the
//! point where the accumulated schedule has produced `max benefit` of tax,
//! extra income no longer earns extra credit, so the phase-in rate stops
//! there. At higher incomes the credit phases out at a fixed rate.

use rust_decimal::Decimal;
use tracing::trace;

use super::ProvisionError;
use super::common::{HUNDRED, checked_div, percent_of};
use crate::models::{Bracket, FilingStatus};
use crate::schedule::{BracketSchedule, sum};
use crate::tables::YearTables;

const PROVISION: &str = "ctc";

/// The CTC schedule for a household, given the schedule accumulated so far
/// (which already carries the zero bracket).
///
/// Households without dependents get the zero schedule.
pub fn ctc_schedule(
    tables: &YearTables,
    filing_status: FilingStatus,
    dependents: u32,
    accumulated: &BracketSchedule,
) -> Result<BracketSchedule, ProvisionError> {
    if dependents == 0 {
        return Ok(BracketSchedule::zero());
    }

    let ctc = &tables.ctc;
    let max_benefit = Decimal::from(dependents) * ctc.per_child;

    let phase_in_threshold = ctc.phase_in_threshold;
    let phase_in_over = phase_in_threshold
        + checked_div(max_benefit * HUNDRED, ctc.phase_in_rate, PROVISION, "phase-in rate")?;

    let phase_out_threshold = tables.ctc_phase_out_threshold(filing_status)?;
    let phase_out_over = phase_out_threshold
        + checked_div(max_benefit * HUNDRED, ctc.phase_out_rate, PROVISION, "phase-out rate")?;

    let refunded_point =
        entirely_refunded_point(accumulated, max_benefit, phase_in_over)?.unwrap_or(phase_in_over);

    trace!(
        %max_benefit,
        %phase_in_over,
        %refunded_point,
        %phase_out_over,
        "child tax credit breakpoints"
    );

    let phase_out = BracketSchedule::new(vec![
        Bracket::zero(),
        Bracket::new(phase_out_threshold, ctc.phase_out_rate),
        Bracket::new(phase_out_over, Decimal::ZERO),
    ])?;

    // Liability already covers the credit before it starts phasing in.
    if refunded_point <= phase_in_threshold {
        return Ok(phase_out);
    }

    let phase_in = BracketSchedule::new(vec![
        Bracket::zero(),
        Bracket::new(phase_in_threshold, -ctc.phase_in_rate),
        Bracket::new(refunded_point, Decimal::ZERO),
    ])?;

    Ok(sum(&phase_in, &phase_out))
}

/// Income at which `schedule` has accumulated exactly `max_benefit` of tax.
///
/// Only bounded brackets are walked, and the walk stops at the first bracket
/// starting past the phase-in end. `None` when the walk ends without the
/// tax reaching `max_benefit`.
fn entirely_refunded_point(
    schedule: &BracketSchedule,
    max_benefit: Decimal,
    phase_in_over: Decimal,
) -> Result<Option<Decimal>, ProvisionError> {
    let mut tax_before = Decimal::ZERO;

    for pair in schedule.brackets().windows(2) {
        let (start, end) = (pair[0].threshold, pair[1].threshold);
        if start > phase_in_over {
            break;
        }
        let tax_in_bracket = percent_of(end - start, pair[0].rate);

        if tax_before + tax_in_bracket > max_benefit {
            let remaining = max_benefit - tax_before;
            let share = checked_div(remaining, tax_in_bracket, PROVISION, "tax in bracket")?;
            return Ok(Some(start + share * (end - start)));
        }
        tax_before += tax_in_bracket;
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::test_support::{assert_close, tables_2017, tables_2018};

    fn schedule(pairs: &[(Decimal, Decimal)]) -> BracketSchedule {
        BracketSchedule::from_pairs(pairs.iter().copied()).unwrap()
    }

    // =========================================================================
    // ctc_schedule tests
    // =========================================================================

    #[test]
    fn no_dependents_gives_zero_schedule() {
        let tables = tables_2018();
        let accumulated = schedule(&[(dec!(0), dec!(0)), (dec!(24000), dec!(10))]);

        let result =
            ctc_schedule(&tables, FilingStatus::MarriedFilingJointly, 0, &accumulated).unwrap();

        assert_eq!(result, BracketSchedule::zero());
    }

    #[test]
    fn refunded_point_interpolates_inside_bracket() {
        let tables = tables_2018();
        // The bracket [1000, 9000) at 50% holds 4000 of tax, so 2000 is
        // reached halfway, at 5000.
        let accumulated = schedule(&[
            (dec!(0), dec!(0)),
            (dec!(1000), dec!(50)),
            (dec!(9000), dec!(10)),
        ]);

        let result = ctc_schedule(&tables, FilingStatus::Single, 1, &accumulated).unwrap();

        assert_eq!(
            result,
            schedule(&[
                (dec!(0), dec!(0)),
                (dec!(2500), dec!(-15)),
                (dec!(5000), dec!(0)),
                (dec!(200000), dec!(5)),
                (dec!(240000), dec!(0)),
            ])
        );
    }

    #[test]
    fn refunded_point_defaults_to_phase_in_end() {
        let tables = tables_2018();
        let accumulated = schedule(&[
            (dec!(0), dec!(0)),
            (dec!(24000), dec!(10)),
            (dec!(43050), dec!(12)),
        ]);

        let result =
            ctc_schedule(&tables, FilingStatus::MarriedFilingJointly, 2, &accumulated).unwrap();

        let brackets = result.brackets();
        assert_eq!(brackets.len(), 5);
        assert_eq!(brackets[1], Bracket::new(dec!(2500), dec!(-15)));
        // 2500 + 4000 × 100 / 15
        assert_close(brackets[2].threshold, dec!(29166.6667));
        assert_eq!(brackets[2].rate, dec!(0));
        assert_eq!(brackets[3], Bracket::new(dec!(400000), dec!(5)));
        assert_eq!(brackets[4], Bracket::new(dec!(480000), dec!(0)));
    }

    #[test]
    fn walk_stops_at_bracket_past_phase_in_end() {
        let tables = tables_2017();
        // Phase-in ends at 3000 + 1000 × 100 / 15 = 9666.67. The bracket at
        // 20000 starts past it, so its tax is never counted.
        let accumulated = schedule(&[
            (dec!(0), dec!(0)),
            (dec!(20000), dec!(10)),
            (dec!(50000), dec!(20)),
        ]);

        let result = ctc_schedule(&tables, FilingStatus::Single, 1, &accumulated).unwrap();

        assert_close(result.brackets()[2].threshold, dec!(9666.6667));
    }

    #[test]
    fn overlapping_phase_in_and_phase_out_add_up() {
        let tables = tables_2017();
        // Liability stays at zero, so the phase-in runs to its end at
        // 3000 + 12000 × 100 / 15 = 83000, past the 75000 phase-out start.
        let accumulated = schedule(&[(dec!(0), dec!(0))]);

        let result = ctc_schedule(&tables, FilingStatus::Single, 12, &accumulated).unwrap();

        assert_eq!(result.rate_at(dec!(50000)), dec!(-15));
        assert_eq!(result.rate_at(dec!(80000)), dec!(-10));
        assert_eq!(result.rate_at(dec!(90000)), dec!(5));
        assert_eq!(result.rate_at(dec!(315000)), dec!(0));
    }

    #[test]
    fn liability_before_phase_in_leaves_only_phase_out() {
        let tables = tables_2018();
        let accumulated = schedule(&[(dec!(0), dec!(100)), (dec!(5000), dec!(10))]);

        let result = ctc_schedule(&tables, FilingStatus::Single, 1, &accumulated).unwrap();

        assert_eq!(
            result,
            schedule(&[(dec!(0), dec!(0)), (dec!(200000), dec!(5)), (dec!(240000), dec!(0))])
        );
    }

    #[test]
    fn zero_phase_in_rate_is_degenerate() {
        let mut tables = tables_2018();
        tables.ctc.phase_in_rate = dec!(0);

        let result = ctc_schedule(&tables, FilingStatus::Single, 1, &BracketSchedule::zero());

        assert_eq!(
            result,
            Err(ProvisionError::DegenerateDivision {
                provision: "ctc",
                quantity: "phase-in rate",
            })
        );
    }
}
