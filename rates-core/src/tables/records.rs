use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TablesError;
use crate::models::{FilingStatus, RateClass, TaxYear};
use crate::schedule::{BracketSchedule, ExemptionPhaseout};

/// Personal exemption rules for a year in which exemptions are law.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExemptionRules {
    pub personal_exemption: Decimal,
    /// Width of the AGI band over which exemptions phase out.
    pub phaseout_width: Decimal,
    pub phaseout_starts: BTreeMap<FilingStatus, Decimal>,
}

/// Earned income tax credit schedules keyed by number of dependents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EitcParameters {
    pub schedules: BTreeMap<u32, BracketSchedule>,
    /// Dependents beyond this count do not change the credit.
    pub max_dependents: u32,
    /// Added to the plateau-end and phase-out-end thresholds for joint filers.
    pub joint_extension: Decimal,
}

/// Child tax credit amounts. Rates are percentages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtcParameters {
    pub per_child: Decimal,
    pub phase_in_threshold: Decimal,
    pub phase_in_rate: Decimal,
    pub phase_out_thresholds: BTreeMap<FilingStatus, Decimal>,
    pub phase_out_rate: Decimal,
}

/// One premium tax credit band: between two multiples of the poverty line
/// (in percent) the required contribution moves linearly between two shares
/// of income (also in percent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtcBand {
    pub poverty_pct_start: Decimal,
    pub poverty_pct_end: Decimal,
    pub contribution_pct_start: Decimal,
    pub contribution_pct_end: Decimal,
}

impl PtcBand {
    pub const fn new(
        poverty_pct_start: Decimal,
        poverty_pct_end: Decimal,
        contribution_pct_start: Decimal,
        contribution_pct_end: Decimal,
    ) -> Self {
        Self {
            poverty_pct_start,
            poverty_pct_end,
            contribution_pct_start,
            contribution_pct_end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtcParameters {
    pub bands: Vec<PtcBand>,
    /// Poverty line keyed by household size.
    pub poverty_lines: BTreeMap<u32, Decimal>,
    /// Average annual benchmark premium per person.
    pub average_premium: Decimal,
}

/// SNAP tables. Every amount is monthly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapParameters {
    pub max_benefits: BTreeMap<u32, Decimal>,
    pub max_incomes: BTreeMap<u32, Decimal>,
    pub standard_deductions: BTreeMap<u32, Decimal>,
    /// Assumed shelter cost.
    pub shelter_cost: Decimal,
    /// Assumed dependent care cost.
    pub child_care_cost: Decimal,
}

/// SNAP amounts for one household size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapHousehold {
    pub max_benefit: Decimal,
    pub max_income: Decimal,
    pub standard_deduction: Decimal,
}

/// Housing choice voucher constants. Amounts are annual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section8Parameters {
    pub deduction_per_dependent: Decimal,
    pub median_rent: Decimal,
    pub median_income: Decimal,
}

/// Every table the composition engine reads for one tax year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearTables {
    pub year: TaxYear,
    pub base_rates: BTreeMap<(RateClass, FilingStatus), BracketSchedule>,
    pub standard_deductions: BTreeMap<FilingStatus, Decimal>,
    /// `None` in years without personal exemptions.
    pub exemption: Option<ExemptionRules>,
    /// Share of pass-through income that is deductible, if any.
    pub pass_through_deduction: Option<Decimal>,
    /// Net investment income surtax.
    pub surtax: BTreeMap<FilingStatus, BracketSchedule>,
    pub payroll: BracketSchedule,
    pub eitc: EitcParameters,
    pub ctc: CtcParameters,
    pub ptc: PtcParameters,
    pub snap: SnapParameters,
    pub section8: Section8Parameters,
}

impl YearTables {
    pub fn base_rates(
        &self,
        class: RateClass,
        status: FilingStatus,
    ) -> Result<&BracketSchedule, TablesError> {
        let table = match class {
            RateClass::Ordinary => "ordinary rates",
            RateClass::Capital => "capital rates",
        };
        self.base_rates
            .get(&(class, status))
            .ok_or_else(|| self.missing_status(table, status))
    }

    pub fn standard_deduction(
        &self,
        status: FilingStatus,
    ) -> Result<Decimal, TablesError> {
        self.standard_deductions
            .get(&status)
            .copied()
            .ok_or_else(|| self.missing_status("standard deduction", status))
    }

    /// Exemption parameters for `status`, or `None` in a year without
    /// personal exemptions.
    pub fn exemption_phaseout(
        &self,
        status: FilingStatus,
    ) -> Result<Option<ExemptionPhaseout>, TablesError> {
        let Some(rules) = &self.exemption else {
            return Ok(None);
        };
        let phaseout_begin = rules
            .phaseout_starts
            .get(&status)
            .copied()
            .ok_or_else(|| self.missing_status("exemption phaseout", status))?;

        Ok(Some(ExemptionPhaseout {
            standard_deduction: self.standard_deduction(status)?,
            personal_exemption: rules.personal_exemption,
            phaseout_begin,
            phaseout_width: rules.phaseout_width,
        }))
    }

    pub fn surtax(
        &self,
        status: FilingStatus,
    ) -> Result<&BracketSchedule, TablesError> {
        self.surtax
            .get(&status)
            .ok_or_else(|| self.missing_status("investment income surtax", status))
    }

    pub fn eitc_schedule(
        &self,
        dependents: u32,
    ) -> Result<&BracketSchedule, TablesError> {
        self.eitc
            .schedules
            .get(&dependents)
            .ok_or(TablesError::MissingDependents {
                table: "eitc",
                year: self.year,
                dependents,
            })
    }

    pub fn ctc_phase_out_threshold(
        &self,
        status: FilingStatus,
    ) -> Result<Decimal, TablesError> {
        self.ctc
            .phase_out_thresholds
            .get(&status)
            .copied()
            .ok_or_else(|| self.missing_status("ctc phase-out", status))
    }

    pub fn poverty_line(
        &self,
        household_size: u32,
    ) -> Result<Decimal, TablesError> {
        lookup_size(&self.ptc.poverty_lines, "poverty line", self.year, household_size)
    }

    pub fn snap_household(
        &self,
        household_size: u32,
    ) -> Result<SnapHousehold, TablesError> {
        Ok(SnapHousehold {
            max_benefit: lookup_size(
                &self.snap.max_benefits,
                "snap maximum benefit",
                self.year,
                household_size,
            )?,
            max_income: lookup_size(
                &self.snap.max_incomes,
                "snap maximum income",
                self.year,
                household_size,
            )?,
            standard_deduction: lookup_size(
                &self.snap.standard_deductions,
                "snap standard deduction",
                self.year,
                household_size,
            )?,
        })
    }

    fn missing_status(
        &self,
        table: &'static str,
        status: FilingStatus,
    ) -> TablesError {
        TablesError::MissingFilingStatus {
            table,
            year: self.year,
            status,
        }
    }
}

fn lookup_size(
    table: &BTreeMap<u32, Decimal>,
    name: &'static str,
    year: TaxYear,
    size: u32,
) -> Result<Decimal, TablesError> {
    table
        .get(&size)
        .copied()
        .ok_or(TablesError::MissingHouseholdSize {
            table: name,
            year,
            size,
        })
}
