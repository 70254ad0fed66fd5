//! Supplemental Nutrition Assistance Program.
//!
//! SNAP tables are monthly. Net income is gross income less a 20% earned
//! income disregard, the standard deduction and dependent care, less the
//! part of shelter cost above half of that income:
//!
//! ```text
//! net = (0.8 × gross - standard deduction - child care) × 1.5 - shelter
//! ```
//!
//! The household contributes 30% of net income toward food, so benefits
//! start shrinking where net income turns positive and then fall by
//! 30% × 0.8 × 1.5 = 36% of every extra dollar of gross income.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::trace;

use super::ProvisionError;
use super::common::{HUNDRED, checked_div, household_size, percent_of};
use crate::models::{Bracket, FilingStatus};
use crate::schedule::{BracketSchedule, scale};
use crate::tables::YearTables;

const PROVISION: &str = "snap";

/// Share of net income the household is expected to spend on food.
const CONTRIBUTION_PCT: Decimal = dec!(30);
/// Share of earned income that counts after the disregard.
const COUNTED_EARNINGS: Decimal = dec!(0.8);
/// Net income grows 1.5× as fast as counted income once the excess
/// shelter deduction applies.
const SHELTER_GROWTH: Decimal = dec!(1.5);
const MONTHS: Decimal = dec!(12);

/// The SNAP schedule for a household, annualized.
///
/// When the benefit has not run out by the program's maximum countable
/// income, the household loses eligibility there. The amount lost is the
/// part of the income gap up to the run-out point that the phaseout would
/// not have taken back, booked as a one-dollar bracket (annually) with a
/// rate equal to that annual amount in percent.
pub fn snap_schedule(
    tables: &YearTables,
    filing_status: FilingStatus,
    dependents: u32,
) -> Result<BracketSchedule, ProvisionError> {
    let size = household_size(filing_status, dependents);
    let household = tables.snap_household(size)?;
    let snap = &tables.snap;

    let contribution_start = checked_div(
        SHELTER_GROWTH * (household.standard_deduction + snap.child_care_cost) + snap.shelter_cost,
        COUNTED_EARNINGS * SHELTER_GROWTH,
        PROVISION,
        "counted earnings share",
    )?;
    let phaseout_rate = CONTRIBUTION_PCT * COUNTED_EARNINGS * SHELTER_GROWTH;
    let run_out = contribution_start
        + checked_div(household.max_benefit * HUNDRED, phaseout_rate, PROVISION, "phaseout rate")?;

    trace!(
        size,
        %contribution_start,
        %run_out,
        max_income = %household.max_income,
        "snap monthly breakpoints"
    );

    let mut monthly = vec![Bracket::zero(), Bracket::new(contribution_start, phaseout_rate)];
    let cliff = run_out > household.max_income;

    if cliff {
        let lost_benefit = percent_of(run_out - household.max_income, HUNDRED - phaseout_rate);
        monthly.push(Bracket::new(household.max_income, lost_benefit * HUNDRED * MONTHS));
    } else {
        monthly.push(Bracket::new(run_out, Decimal::ZERO));
    }

    let annual = scale(&BracketSchedule::new(monthly)?, MONTHS, false)?;
    if !cliff {
        return Ok(annual);
    }

    let cliff_end = household.max_income * MONTHS + Decimal::ONE;
    let mut brackets = annual.into_brackets();
    brackets.push(Bracket::new(cliff_end, Decimal::ZERO));

    Ok(BracketSchedule::new(brackets)?)
}
