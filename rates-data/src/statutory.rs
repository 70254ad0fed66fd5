//! Statutory 2017 and 2018 rate tables.
//!
//! 2017 is prior law: personal exemptions with a phaseout, smaller standard
//! deductions and child tax credit. 2018 is the first year of the new law:
//! no exemptions, larger standard deductions and credit, and a 20%
//! pass-through deduction.

use std::collections::BTreeMap;

use rates_core::models::{FilingStatus, RateClass, TaxYear};
use rates_core::schedule::{BracketSchedule, ScheduleError};
use rates_core::tables::{
    CtcParameters, EitcParameters, ExemptionRules, PtcBand, PtcParameters, RateTables,
    Section8Parameters, SnapParameters, TablesError, YearTables,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use FilingStatus::{HeadOfHousehold as Hoh, MarriedFilingJointly as Mfj, Single};

/// Rate tables for every supported tax year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatutoryTables {
    years: BTreeMap<TaxYear, YearTables>,
}

impl StatutoryTables {
    /// Builds the tables for every supported year.
    ///
    /// # Errors
    ///
    /// A [`ScheduleError`] if a literal schedule below is malformed.
    pub fn new() -> Result<Self, ScheduleError> {
        Ok(Self {
            years: BTreeMap::from([
                (TaxYear::Y2017, year_2017()?),
                (TaxYear::Y2018, year_2018()?),
            ]),
        })
    }

    /// Replaces one base rate schedule.
    ///
    /// # Errors
    ///
    /// [`TablesError::MissingYear`] if `year` has no tables.
    pub fn set_base_rates(
        &mut self,
        year: TaxYear,
        class: RateClass,
        status: FilingStatus,
        schedule: BracketSchedule,
    ) -> Result<(), TablesError> {
        let tables = self
            .years
            .get_mut(&year)
            .ok_or(TablesError::MissingYear(year))?;

        debug!(%year, %class, %status, brackets = schedule.len(), "replacing base rates");
        tables.base_rates.insert((class, status), schedule);
        Ok(())
    }

    /// Consumes `self`, replacing every listed base rate schedule.
    pub fn with_base_rates(
        mut self,
        schedules: impl IntoIterator<Item = ((TaxYear, RateClass, FilingStatus), BracketSchedule)>,
    ) -> Result<Self, TablesError> {
        for ((year, class, status), schedule) in schedules {
            self.set_base_rates(year, class, status, schedule)?;
        }
        Ok(self)
    }
}

impl RateTables for StatutoryTables {
    fn year_tables(
        &self,
        year: TaxYear,
    ) -> Result<&YearTables, TablesError> {
        self.years.year_tables(year)
    }

    fn tax_years(&self) -> Vec<TaxYear> {
        self.years.tax_years()
    }
}

fn schedule(pairs: &[(i64, Decimal)]) -> Result<BracketSchedule, ScheduleError> {
    BracketSchedule::from_pairs(pairs.iter().map(|&(t, r)| (Decimal::from(t), r)))
}

fn by_status<T>(
    single: T,
    hoh: T,
    mfj: T,
) -> BTreeMap<FilingStatus, T> {
    BTreeMap::from([(Single, single), (Hoh, hoh), (Mfj, mfj)])
}

fn by_household_size(amounts: [i64; 6]) -> BTreeMap<u32, Decimal> {
    (1..).zip(amounts.map(Decimal::from)).collect()
}

fn year_2017() -> Result<YearTables, ScheduleError> {
    let base_rates = BTreeMap::from([
        (
            (RateClass::Ordinary, Single),
            schedule(&[
                (0, dec!(10)),
                (9325, dec!(15)),
                (37950, dec!(25)),
                (91900, dec!(28)),
                (191650, dec!(33)),
                (416700, dec!(35)),
                (418400, dec!(39.6)),
            ])?,
        ),
        (
            (RateClass::Ordinary, Hoh),
            schedule(&[
                (0, dec!(10)),
                (13350, dec!(15)),
                (50800, dec!(25)),
                (131200, dec!(28)),
                (212500, dec!(33)),
                (416700, dec!(35)),
                (444550, dec!(39.6)),
            ])?,
        ),
        (
            (RateClass::Ordinary, Mfj),
            schedule(&[
                (0, dec!(10)),
                (18650, dec!(15)),
                (75900, dec!(25)),
                (153100, dec!(28)),
                (233350, dec!(33)),
                (416700, dec!(35)),
                (470700, dec!(39.6)),
            ])?,
        ),
        (
            (RateClass::Capital, Single),
            schedule(&[(0, dec!(0)), (37950, dec!(15)), (418400, dec!(20))])?,
        ),
        (
            (RateClass::Capital, Hoh),
            schedule(&[(0, dec!(0)), (50800, dec!(15)), (444550, dec!(20))])?,
        ),
        (
            (RateClass::Capital, Mfj),
            schedule(&[(0, dec!(0)), (75900, dec!(15)), (470700, dec!(20))])?,
        ),
    ]);

    Ok(YearTables {
        year: TaxYear::Y2017,
        base_rates,
        standard_deductions: by_status(dec!(6350), dec!(9350), dec!(12700)),
        exemption: Some(ExemptionRules {
            personal_exemption: dec!(4050),
            phaseout_width: dec!(125000),
            phaseout_starts: by_status(dec!(261500), dec!(287650), dec!(313800)),
        }),
        pass_through_deduction: None,
        surtax: surtax()?,
        payroll: payroll()?,
        eitc: eitc()?,
        ctc: CtcParameters {
            per_child: dec!(1000),
            phase_in_threshold: dec!(3000),
            phase_in_rate: dec!(15),
            phase_out_thresholds: by_status(dec!(75000), dec!(75000), dec!(110000)),
            phase_out_rate: dec!(5),
        },
        ptc: ptc(dec!(300) * dec!(12)),
        snap: SnapParameters {
            max_benefits: by_household_size([194, 357, 511, 649, 771, 925]),
            max_incomes: by_household_size([1287, 1736, 2184, 2633, 3081, 3530]),
            standard_deductions: by_household_size([157, 157, 157, 168, 197, 226]),
            shelter_cost: SNAP_SHELTER_COST,
            child_care_cost: SNAP_CHILD_CARE_COST,
        },
        section8: section8(),
    })
}

fn year_2018() -> Result<YearTables, ScheduleError> {
    let base_rates = BTreeMap::from([
        (
            (RateClass::Ordinary, Single),
            schedule(&[
                (0, dec!(10)),
                (9525, dec!(12)),
                (38700, dec!(22)),
                (82500, dec!(24)),
                (157500, dec!(32)),
                (200000, dec!(35)),
                (500000, dec!(37)),
            ])?,
        ),
        (
            (RateClass::Ordinary, Hoh),
            schedule(&[
                (0, dec!(10)),
                (13600, dec!(12)),
                (51800, dec!(22)),
                (82500, dec!(24)),
                (157500, dec!(32)),
                (200000, dec!(35)),
                (500000, dec!(37)),
            ])?,
        ),
        (
            (RateClass::Ordinary, Mfj),
            schedule(&[
                (0, dec!(10)),
                (19050, dec!(12)),
                (77400, dec!(22)),
                (165000, dec!(24)),
                (315000, dec!(32)),
                (400000, dec!(35)),
                (600000, dec!(37)),
            ])?,
        ),
        (
            (RateClass::Capital, Single),
            schedule(&[(0, dec!(0)), (38600, dec!(15)), (425800, dec!(20))])?,
        ),
        (
            (RateClass::Capital, Hoh),
            schedule(&[(0, dec!(0)), (51700, dec!(15)), (452400, dec!(20))])?,
        ),
        (
            (RateClass::Capital, Mfj),
            schedule(&[(0, dec!(0)), (77200, dec!(15)), (479000, dec!(20))])?,
        ),
    ]);

    Ok(YearTables {
        year: TaxYear::Y2018,
        base_rates,
        standard_deductions: by_status(dec!(12000), dec!(18000), dec!(24000)),
        exemption: None,
        pass_through_deduction: Some(dec!(0.20)),
        surtax: surtax()?,
        payroll: payroll()?,
        eitc: eitc()?,
        ctc: CtcParameters {
            per_child: dec!(2000),
            phase_in_threshold: dec!(2500),
            phase_in_rate: dec!(15),
            phase_out_thresholds: by_status(dec!(200000), dec!(200000), dec!(400000)),
            phase_out_rate: dec!(5),
        },
        ptc: ptc(dec!(411) * dec!(12)),
        snap: SnapParameters {
            max_benefits: by_household_size([192, 352, 504, 640, 760, 913]),
            max_incomes: by_household_size([1307, 1760, 2213, 2665, 3118, 3571]),
            standard_deductions: by_household_size([160, 160, 160, 170, 199, 228]),
            shelter_cost: SNAP_SHELTER_COST,
            child_care_cost: SNAP_CHILD_CARE_COST,
        },
        section8: section8(),
    })
}

/// Monthly shelter and dependent care costs assumed for every household.
const SNAP_SHELTER_COST: Decimal = dec!(881);
const SNAP_CHILD_CARE_COST: Decimal = dec!(67);

fn surtax() -> Result<BTreeMap<FilingStatus, BracketSchedule>, ScheduleError> {
    Ok(by_status(
        schedule(&[(0, dec!(0)), (200000, dec!(3.8))])?,
        schedule(&[(0, dec!(0)), (200000, dec!(3.8))])?,
        schedule(&[(0, dec!(0)), (250000, dec!(3.8))])?,
    ))
}

fn payroll() -> Result<BracketSchedule, ScheduleError> {
    schedule(&[(0, dec!(7.65)), (127200, dec!(1.45)), (200000, dec!(2.35))])
}

// The same EITC schedules are used for both years.
fn eitc() -> Result<EitcParameters, ScheduleError> {
    Ok(EitcParameters {
        schedules: BTreeMap::from([
            (
                0,
                schedule(&[
                    (0, dec!(-7.65)),
                    (6670, dec!(0)),
                    (8340, dec!(7.65)),
                    (15010, dec!(0)),
                ])?,
            ),
            (
                1,
                schedule(&[
                    (0, dec!(-34)),
                    (10000, dec!(0)),
                    (18340, dec!(15.98)),
                    (39617, dec!(0)),
                ])?,
            ),
            (
                2,
                schedule(&[
                    (0, dec!(-40)),
                    (14040, dec!(0)),
                    (18340, dec!(21.06)),
                    (45007, dec!(0)),
                ])?,
            ),
            (
                3,
                schedule(&[
                    (0, dec!(-45)),
                    (14040, dec!(0)),
                    (18340, dec!(21.06)),
                    (48340, dec!(0)),
                ])?,
            ),
        ]),
        max_dependents: 3,
        joint_extension: dec!(5000),
    })
}

// 2018 poverty lines were not yet published, so 2017's are used for both.
fn ptc(average_premium: Decimal) -> PtcParameters {
    PtcParameters {
        bands: vec![
            PtcBand::new(dec!(133), dec!(150), dec!(3), dec!(4)),
            PtcBand::new(dec!(150), dec!(200), dec!(4), dec!(6.3)),
            PtcBand::new(dec!(200), dec!(250), dec!(6.3), dec!(8.05)),
            PtcBand::new(dec!(250), dec!(300), dec!(8.05), dec!(9.5)),
            PtcBand::new(dec!(300), dec!(400), dec!(9.5), dec!(9.5)),
        ],
        poverty_lines: by_household_size([12060, 16240, 20420, 24600, 28780, 32960]),
        average_premium,
    }
}

fn section8() -> Section8Parameters {
    Section8Parameters {
        deduction_per_dependent: dec!(480),
        median_rent: dec!(949) * dec!(12),
        median_income: dec!(56516),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rates_core::test_support::{tables_2017, tables_2018};

    use super::*;

    #[test]
    fn core_fixture_tables_match_statutory_values() {
        let tables = StatutoryTables::new().unwrap();

        assert_eq!(tables.year_tables(TaxYear::Y2017).unwrap(), &tables_2017());
        assert_eq!(tables.year_tables(TaxYear::Y2018).unwrap(), &tables_2018());
    }

    #[test]
    fn both_years_are_available() {
        let tables = StatutoryTables::new().unwrap();

        assert_eq!(tables.tax_years(), vec![TaxYear::Y2017, TaxYear::Y2018]);
    }

    #[test]
    fn only_2017_has_exemptions_and_only_2018_a_pass_through_deduction() {
        let tables = StatutoryTables::new().unwrap();
        let y2017 = tables.year_tables(TaxYear::Y2017).unwrap();
        let y2018 = tables.year_tables(TaxYear::Y2018).unwrap();

        assert!(y2017.exemption.is_some());
        assert_eq!(y2017.pass_through_deduction, None);
        assert!(y2018.exemption.is_none());
        assert_eq!(y2018.pass_through_deduction, Some(dec!(0.2)));
    }

    #[test]
    fn every_filing_status_has_both_rate_classes() {
        let tables = StatutoryTables::new().unwrap();

        for year in tables.tax_years() {
            let year_tables = tables.year_tables(year).unwrap();
            for status in FilingStatus::ALL {
                for class in [RateClass::Ordinary, RateClass::Capital] {
                    let base = year_tables.base_rates(class, status).unwrap();
                    assert!(base.is_anchored(), "{year} {class} {status}");
                }
                assert!(year_tables.standard_deduction(status).is_ok());
                assert!(year_tables.surtax(status).is_ok());
                assert!(year_tables.ctc_phase_out_threshold(status).is_ok());
            }
            for size in 1..=6 {
                assert!(year_tables.poverty_line(size).is_ok());
                assert!(year_tables.snap_household(size).is_ok());
            }
        }
    }

    #[test]
    fn set_base_rates_replaces_one_schedule() {
        let mut tables = StatutoryTables::new().unwrap();
        let flat = schedule(&[(0, dec!(20))]).unwrap();

        tables
            .set_base_rates(TaxYear::Y2018, RateClass::Ordinary, Single, flat.clone())
            .unwrap();

        let y2018 = tables.year_tables(TaxYear::Y2018).unwrap();
        assert_eq!(y2018.base_rates(RateClass::Ordinary, Single).unwrap(), &flat);
        assert_ne!(y2018.base_rates(RateClass::Ordinary, Mfj).unwrap(), &flat);
    }
}
