//! Builds one combined marginal rate schedule per household.
//!
//! The calculator starts from the base rates for the household's income
//! class, applies the zero bracket (with the exemption phaseout in years that
//! have one), adjusts for the pass-through deduction and the investment
//! income surtax, and then sums in every requested provision in a fixed
//! order.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, trace};

use crate::comparison::{ComparisonError, ComparisonTable};
use crate::models::{HouseholdProfile, IncomeCategory, Provision, TaxYear};
use crate::provisions::{
    ProvisionError, ctc_schedule, eitc_schedule, payroll_schedule, ptc_schedule, section8_schedule,
    snap_schedule,
};
use crate::schedule::{BracketSchedule, ScheduleError, scale, shift, sum};
use crate::tables::{RateTables, TablesError, YearTables};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompositionError {
    #[error(transparent)]
    Tables(#[from] TablesError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("{provision} provision failed: {source}")]
    Provision {
        provision: Provision,
        #[source]
        source: ProvisionError,
    },

    #[error("pass-through deduction must be below 100%, got {0}")]
    PassThroughFraction(Decimal),

    #[error(transparent)]
    Comparison(#[from] ComparisonError),
}

/// Computes marginal rate schedules from a set of rate tables.
#[derive(Debug)]
pub struct MarginalRateCalculator<'a, T: RateTables + ?Sized> {
    tables: &'a T,
}

impl<'a, T: RateTables + ?Sized> MarginalRateCalculator<'a, T> {
    pub fn new(tables: &'a T) -> Self {
        Self { tables }
    }

    /// The combined schedule for `profile`, anchored at zero income.
    ///
    /// # Errors
    ///
    /// Any missing table entry, schedule invariant violation or provision
    /// failure aborts the calculation.
    pub fn calculate(
        &self,
        profile: &HouseholdProfile,
    ) -> Result<BracketSchedule, CompositionError> {
        let tables = self.tables.year_tables(profile.year)?;
        let status = profile.filing_status;
        let class = profile.income_category.rate_class();

        debug!(
            year = %profile.year,
            %status,
            dependents = profile.dependents,
            category = profile.income_category.as_str(),
            "calculating marginal rates"
        );

        let base = tables.base_rates(class, status)?;
        let mut schedule = with_zero_bracket(tables, base, profile)?;

        if profile.income_category == IncomeCategory::Business {
            if let Some(fraction) = tables.pass_through_deduction {
                schedule = with_pass_through_deduction(&schedule, fraction)?;
            }
        }

        if profile.income_category != IncomeCategory::Wages {
            debug!("adding investment income surtax");
            schedule = sum(&schedule, tables.surtax(status)?);
        }

        for &provision in &profile.provisions {
            let addition = provision_schedule(tables, profile, provision, &schedule)
                .map_err(|source| CompositionError::Provision { provision, source })?;
            trace!(%provision, brackets = addition.len(), "provision schedule");
            schedule = sum(&schedule, &addition);
            debug!(%provision, brackets = schedule.len(), "added provision");
        }

        schedule.ensure_anchored()?;
        Ok(schedule)
    }

    /// Runs [`calculate`](Self::calculate) once per year for the same
    /// household and tabulates the results side by side, labelled by year.
    pub fn compare(
        &self,
        profile: &HouseholdProfile,
        years: &[TaxYear],
    ) -> Result<ComparisonTable, CompositionError> {
        let schedules = years
            .iter()
            .map(|&year| {
                self.calculate(&profile.for_year(year))
                    .map(|schedule| (year.to_string(), schedule))
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(series = schedules.len(), "building comparison table");

        let table = ComparisonTable::build(
            schedules
                .iter()
                .map(|(label, schedule)| (label.clone(), schedule.iter().copied())),
        )?;
        Ok(table)
    }
}

fn with_zero_bracket(
    tables: &YearTables,
    base: &BracketSchedule,
    profile: &HouseholdProfile,
) -> Result<BracketSchedule, CompositionError> {
    let status = profile.filing_status;

    match tables.exemption_phaseout(status)? {
        Some(phaseout) => {
            debug!(
                begin = %phaseout.phaseout_begin,
                end = %phaseout.phaseout_end(),
                "applying zero bracket with exemption phaseout"
            );
            Ok(phaseout.apply(base, status, profile.dependents)?)
        }
        None => {
            let deduction = tables.standard_deduction(status)?;
            debug!(%deduction, "applying standard deduction");
            Ok(shift(base, deduction)?)
        }
    }
}

/// Deducting a fraction `f` of pass-through income means a threshold of
/// taxable income is reached at `1 / (1 - f)` times the income, and each
/// extra dollar is taxed at `(1 - f)` of the rate.
fn with_pass_through_deduction(
    schedule: &BracketSchedule,
    fraction: Decimal,
) -> Result<BracketSchedule, CompositionError> {
    let kept = Decimal::ONE - fraction;
    if kept <= Decimal::ZERO {
        return Err(CompositionError::PassThroughFraction(fraction));
    }
    let factor = Decimal::ONE / kept;
    debug!(%fraction, %factor, "applying pass-through deduction");

    Ok(scale(schedule, factor, true)?)
}

fn provision_schedule(
    tables: &YearTables,
    profile: &HouseholdProfile,
    provision: Provision,
    accumulated: &BracketSchedule,
) -> Result<BracketSchedule, ProvisionError> {
    let status = profile.filing_status;
    let dependents = profile.dependents;

    match provision {
        Provision::Eitc => eitc_schedule(tables, status, dependents),
        Provision::Ctc => ctc_schedule(tables, status, dependents, accumulated),
        Provision::Payroll => payroll_schedule(tables, profile.splits_payroll_evenly()),
        Provision::Ptc => ptc_schedule(tables, status, dependents),
        Provision::Section8 => section8_schedule(tables, status, dependents),
        Provision::Snap => snap_schedule(tables, status, dependents),
    }
}
