//! Housing choice vouchers.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::trace;

use super::ProvisionError;
use super::common::{HUNDRED, checked_div, percent_of};
use crate::models::{Bracket, FilingStatus};
use crate::schedule::BracketSchedule;
use crate::tables::YearTables;

const PROVISION: &str = "section 8";

/// Share of adjusted income a voucher holder pays toward rent.
const CONTRIBUTION_PCT: Decimal = dec!(30);
/// Eligibility ends at this share of area median income.
const INCOME_LIMIT_PCT: Decimal = dec!(80);

/// The Section 8 schedule for a household.
///
/// The household pays 30% of income above its dependent deduction toward
/// rent until the voucher runs out at median rent. If eligibility ends
/// first, the household loses the 70% of the income gap up to the run-out
/// point that it would have kept, in a one-dollar bracket at the income
/// limit.
pub fn section8_schedule(
    tables: &YearTables,
    _filing_status: FilingStatus,
    dependents: u32,
) -> Result<BracketSchedule, ProvisionError> {
    let section8 = &tables.section8;
    let deduction = Decimal::from(dependents) * section8.deduction_per_dependent;

    let mut brackets = if deduction.is_zero() {
        vec![Bracket::new(Decimal::ZERO, CONTRIBUTION_PCT)]
    } else {
        vec![Bracket::zero(), Bracket::new(deduction, CONTRIBUTION_PCT)]
    };

    let run_out = deduction
        + checked_div(
            section8.median_rent * HUNDRED,
            CONTRIBUTION_PCT,
            PROVISION,
            "contribution rate",
        )?;
    let income_limit = percent_of(section8.median_income, INCOME_LIMIT_PCT);

    trace!(%deduction, %run_out, %income_limit, "section 8 breakpoints");

    if run_out <= income_limit {
        brackets.push(Bracket::new(run_out, Decimal::ZERO));
    } else {
        let lost_voucher = percent_of(run_out - income_limit, HUNDRED - CONTRIBUTION_PCT);
        brackets.push(Bracket::new(income_limit, lost_voucher * HUNDRED));
        brackets.push(Bracket::new(income_limit + Decimal::ONE, Decimal::ZERO));
    }

    Ok(BracketSchedule::new(brackets)?)
}
