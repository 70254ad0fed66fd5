//! Premium tax credit, including the loss of expanded Medicaid.
//!
//! Between fixed multiples of the poverty line a household must contribute
//! a growing share of its income toward the benchmark premium; the credit
//! pays the rest. Every extra dollar of income therefore raises the required
//! contribution, which shows up as a positive marginal rate.
//!
//! Three discontinuities are modeled:
//!
//! * one dollar below the first band, Medicaid is lost, and the household
//!   suddenly owes the contribution due at the start of the first band;
//! * once the required contribution covers the whole premium, the credit is
//!   gone and the walk stops;
//! * if the bands run out first, the remaining subsidy is lost at once at
//!   the end of the last band.

use rust_decimal::Decimal;
use tracing::trace;

use super::ProvisionError;
use super::common::{HUNDRED, checked_div, household_size, percent_of};
use crate::models::{Bracket, FilingStatus};
use crate::schedule::BracketSchedule;
use crate::tables::{TablesError, YearTables};

const PROVISION: &str = "ptc";

/// The PTC schedule for a household.
///
/// When the subsidy runs out inside a band the walk stops there and no
/// cliff is emitted. The cliff at the end of the bands uses the
/// contribution reached at the end of the last band that was fully walked.
pub fn ptc_schedule(
    tables: &YearTables,
    filing_status: FilingStatus,
    dependents: u32,
) -> Result<BracketSchedule, ProvisionError> {
    let bands = &tables.ptc.bands;
    if bands.is_empty() {
        return Err(TablesError::EmptyTable {
            table: "ptc bands",
            year: tables.year,
        }
        .into());
    }

    let size = household_size(filing_status, dependents);
    let poverty_line = tables.poverty_line(size)?;
    let total_premium = Decimal::from(size) * tables.ptc.average_premium;

    trace!(size, %poverty_line, %total_premium, "premium tax credit inputs");

    let mut brackets = vec![Bracket::zero()];
    let mut end = Decimal::ZERO;
    let mut contribution_end = Decimal::ZERO;
    let mut exhausted = true;

    for (index, band) in bands.iter().enumerate() {
        let start = percent_of(poverty_line, band.poverty_pct_start);
        let band_end = percent_of(poverty_line, band.poverty_pct_end);
        let contribution_start = percent_of(start, band.contribution_pct_start);
        let band_contribution_end = percent_of(band_end, band.contribution_pct_end);

        if index == 0 {
            brackets.push(Bracket::new(start - Decimal::ONE, contribution_start * HUNDRED));
        }

        if contribution_start >= total_premium {
            end = start;
            exhausted = false;
            break;
        }

        let rate = checked_div(
            HUNDRED * (band_contribution_end - contribution_start),
            band_end - start,
            PROVISION,
            "band width",
        )?;
        brackets.push(Bracket::new(start, rate));

        if band_contribution_end > total_premium {
            end = start
                + checked_div(
                    (total_premium - contribution_start) * HUNDRED,
                    rate,
                    PROVISION,
                    "band rate",
                )?;
            exhausted = false;
            trace!(%end, "subsidy runs out inside a band");
            break;
        }

        end = band_end;
        contribution_end = band_contribution_end;
    }

    if exhausted && contribution_end < total_premium {
        let lost_subsidy = total_premium - contribution_end;
        trace!(%end, %lost_subsidy, "subsidy cliff at the end of the last band");
        brackets.push(Bracket::new(end, lost_subsidy * HUNDRED));
        end += Decimal::ONE;
    }

    brackets.push(Bracket::new(end, Decimal::ZERO));

    Ok(BracketSchedule::new(brackets)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::test_support::{assert_close, tables_2017, tables_2018};

    // =========================================================================
    // ptc_schedule tests
    // =========================================================================

    #[test]
    fn single_filer_gets_medicaid_cliff_below_first_band() {
        let tables = tables_2017();

        let result = ptc_schedule(&tables, FilingStatus::Single, 0).unwrap();
        let brackets = result.brackets();

        assert_eq!(brackets[0], Bracket::zero());
        // 133% of 12060, minus one dollar; 3% of 16039.8 lost at once.
        assert_eq!(brackets[1], Bracket::new(dec!(16038.8), dec!(48119.4)));
        assert_eq!(brackets[2].threshold, dec!(16039.8));
        // 100 × (723.6 - 481.194) / (18090 - 16039.8)
        assert_close(brackets[2].rate, dec!(11.8235));
    }

    #[test]
    fn subsidy_running_out_truncates_band_without_cliff() {
        let tables = tables_2017();

        let result = ptc_schedule(&tables, FilingStatus::Single, 0).unwrap();
        let brackets = result.brackets();

        // Premium 3600 is reached in the last band, at 9.5% of income.
        let last_band = brackets[brackets.len() - 2];
        assert_eq!(last_band.threshold, dec!(36180));
        assert_eq!(last_band.rate, dec!(9.5));

        let end = brackets[brackets.len() - 1];
        assert_close(end.threshold, dec!(37894.7368));
        assert_eq!(end.rate, dec!(0));
        assert_eq!(brackets.len(), 8);
    }

    #[test]
    fn large_household_hits_cliff_at_four_times_poverty_line() {
        let tables = tables_2018();

        let result = ptc_schedule(&tables, FilingStatus::MarriedFilingJointly, 2).unwrap();
        let brackets = result.brackets();

        // Size 4: poverty line 24600, premium 4 × 411 × 12 = 19728. At 400%
        // of the poverty line the contribution is only 9348.
        assert_eq!(
            &brackets[brackets.len() - 2..],
            &[
                Bracket::new(dec!(98400), dec!(1038000)),
                Bracket::new(dec!(98401), dec!(0)),
            ]
        );
        // 200%-250% band: 100 × (4950.75 - 3099.6) / (61500 - 49200)
        assert_eq!(result.rate_at(dec!(50000)), dec!(15.05));
    }

    #[test]
    fn contribution_covering_premium_at_band_start_stops_walk() {
        let mut tables = tables_2017();
        tables.ptc.average_premium = dec!(481.194);

        let result = ptc_schedule(&tables, FilingStatus::Single, 0).unwrap();

        assert_eq!(
            result,
            BracketSchedule::from_pairs([
                (dec!(0), dec!(0)),
                (dec!(16038.8), dec!(48119.4)),
                (dec!(16039.8), dec!(0)),
            ])
            .unwrap()
        );
    }

    #[test]
    fn unknown_household_size_is_an_error() {
        let tables = tables_2017();

        let result = ptc_schedule(&tables, FilingStatus::MarriedFilingJointly, 5);

        assert_eq!(
            result,
            Err(ProvisionError::Tables(TablesError::MissingHouseholdSize {
                table: "poverty line",
                year: tables.year,
                size: 7,
            }))
        );
    }

    #[test]
    fn empty_band_table_is_an_error() {
        let mut tables = tables_2018();
        tables.ptc.bands.clear();

        assert_eq!(
            ptc_schedule(&tables, FilingStatus::Single, 0),
            Err(ProvisionError::Tables(TablesError::EmptyTable {
                table: "ptc bands",
                year: tables.year,
            }))
        );
    }

    #[test]
    fn zero_width_band_is_degenerate() {
        let mut tables = tables_2018();
        tables.ptc.bands[1].poverty_pct_end = tables.ptc.bands[1].poverty_pct_start;

        assert_eq!(
            ptc_schedule(&tables, FilingStatus::Single, 0),
            Err(ProvisionError::DegenerateDivision {
                provision: "ptc",
                quantity: "band width",
            })
        );
    }
}
