//! Fixture tables for unit tests, mirroring the statutory 2017 and 2018
//! values. `rates-data` checks them against its own tables through the
//! `test-support` feature.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{FilingStatus, RateClass, TaxYear};
use crate::schedule::BracketSchedule;
use crate::tables::{
    CtcParameters, EitcParameters, ExemptionRules, PtcBand, PtcParameters, Section8Parameters,
    SnapParameters, YearTables,
};

use crate::models::FilingStatus::{HeadOfHousehold as Hoh, MarriedFilingJointly as Mfj, Single};

/// Asserts two decimals agree to four decimal places.
#[track_caller]
pub fn assert_close(
    actual: Decimal,
    expected: Decimal,
) {
    assert!(
        (actual - expected).abs() < dec!(0.0001),
        "expected {expected}, got {actual}"
    );
}

pub fn schedule(pairs: &[(i64, Decimal)]) -> BracketSchedule {
    BracketSchedule::from_pairs(pairs.iter().map(|&(t, r)| (Decimal::from(t), r))).unwrap()
}

fn by_status<T>(
    single: T,
    hoh: T,
    mfj: T,
) -> BTreeMap<FilingStatus, T> {
    BTreeMap::from([(Single, single), (Hoh, hoh), (Mfj, mfj)])
}

fn by_size(values: [i64; 6]) -> BTreeMap<u32, Decimal> {
    (1..).zip(values.map(Decimal::from)).collect()
}

pub fn tables_2017() -> YearTables {
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
            ]),
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
            ]),
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
            ]),
        ),
        (
            (RateClass::Capital, Single),
            schedule(&[(0, dec!(0)), (37950, dec!(15)), (418400, dec!(20))]),
        ),
        (
            (RateClass::Capital, Hoh),
            schedule(&[(0, dec!(0)), (50800, dec!(15)), (444550, dec!(20))]),
        ),
        (
            (RateClass::Capital, Mfj),
            schedule(&[(0, dec!(0)), (75900, dec!(15)), (470700, dec!(20))]),
        ),
    ]);

    YearTables {
        year: TaxYear::Y2017,
        base_rates,
        standard_deductions: by_status(dec!(6350), dec!(9350), dec!(12700)),
        exemption: Some(ExemptionRules {
            personal_exemption: dec!(4050),
            phaseout_width: dec!(125000),
            phaseout_starts: by_status(dec!(261500), dec!(287650), dec!(313800)),
        }),
        pass_through_deduction: None,
        ctc: CtcParameters {
            per_child: dec!(1000),
            phase_in_threshold: dec!(3000),
            phase_in_rate: dec!(15),
            phase_out_thresholds: by_status(dec!(75000), dec!(75000), dec!(110000)),
            phase_out_rate: dec!(5),
        },
        ptc: ptc(dec!(3600)),
        snap: SnapParameters {
            max_benefits: by_size([194, 357, 511, 649, 771, 925]),
            max_incomes: by_size([1287, 1736, 2184, 2633, 3081, 3530]),
            standard_deductions: by_size([157, 157, 157, 168, 197, 226]),
            shelter_cost: dec!(881),
            child_care_cost: dec!(67),
        },
        ..shared(TaxYear::Y2017)
    }
}

pub fn tables_2018() -> YearTables {
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
            ]),
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
            ]),
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
            ]),
        ),
        (
            (RateClass::Capital, Single),
            schedule(&[(0, dec!(0)), (38600, dec!(15)), (425800, dec!(20))]),
        ),
        (
            (RateClass::Capital, Hoh),
            schedule(&[(0, dec!(0)), (51700, dec!(15)), (452400, dec!(20))]),
        ),
        (
            (RateClass::Capital, Mfj),
            schedule(&[(0, dec!(0)), (77200, dec!(15)), (479000, dec!(20))]),
        ),
    ]);

    YearTables {
        year: TaxYear::Y2018,
        base_rates,
        standard_deductions: by_status(dec!(12000), dec!(18000), dec!(24000)),
        exemption: None,
        pass_through_deduction: Some(dec!(0.2)),
        ctc: CtcParameters {
            per_child: dec!(2000),
            phase_in_threshold: dec!(2500),
            phase_in_rate: dec!(15),
            phase_out_thresholds: by_status(dec!(200000), dec!(200000), dec!(400000)),
            phase_out_rate: dec!(5),
        },
        ptc: ptc(dec!(4932)),
        snap: SnapParameters {
            max_benefits: by_size([192, 352, 504, 640, 760, 913]),
            max_incomes: by_size([1307, 1760, 2213, 2665, 3118, 3571]),
            standard_deductions: by_size([160, 160, 160, 170, 199, 228]),
            shelter_cost: dec!(881),
            child_care_cost: dec!(67),
        },
        ..shared(TaxYear::Y2018)
    }
}

fn ptc(average_premium: Decimal) -> PtcParameters {
    PtcParameters {
        bands: vec![
            PtcBand::new(dec!(133), dec!(150), dec!(3), dec!(4)),
            PtcBand::new(dec!(150), dec!(200), dec!(4), dec!(6.3)),
            PtcBand::new(dec!(200), dec!(250), dec!(6.3), dec!(8.05)),
            PtcBand::new(dec!(250), dec!(300), dec!(8.05), dec!(9.5)),
            PtcBand::new(dec!(300), dec!(400), dec!(9.5), dec!(9.5)),
        ],
        poverty_lines: by_size([12060, 16240, 20420, 24600, 28780, 32960]),
        average_premium,
    }
}

/// Tables identical in both years. Year-specific fields are overwritten by
/// the callers.
fn shared(year: TaxYear) -> YearTables {
    YearTables {
        year,
        base_rates: BTreeMap::new(),
        standard_deductions: BTreeMap::new(),
        exemption: None,
        pass_through_deduction: None,
        surtax: by_status(
            schedule(&[(0, dec!(0)), (200000, dec!(3.8))]),
            schedule(&[(0, dec!(0)), (200000, dec!(3.8))]),
            schedule(&[(0, dec!(0)), (250000, dec!(3.8))]),
        ),
        payroll: schedule(&[
            (0, dec!(7.65)),
            (127200, dec!(1.45)),
            (200000, dec!(2.35)),
        ]),
        eitc: EitcParameters {
            schedules: BTreeMap::from([
                (
                    0,
                    schedule(&[
                        (0, dec!(-7.65)),
                        (6670, dec!(0)),
                        (8340, dec!(7.65)),
                        (15010, dec!(0)),
                    ]),
                ),
                (
                    1,
                    schedule(&[
                        (0, dec!(-34)),
                        (10000, dec!(0)),
                        (18340, dec!(15.98)),
                        (39617, dec!(0)),
                    ]),
                ),
                (
                    2,
                    schedule(&[
                        (0, dec!(-40)),
                        (14040, dec!(0)),
                        (18340, dec!(21.06)),
                        (45007, dec!(0)),
                    ]),
                ),
                (
                    3,
                    schedule(&[
                        (0, dec!(-45)),
                        (14040, dec!(0)),
                        (18340, dec!(21.06)),
                        (48340, dec!(0)),
                    ]),
                ),
            ]),
            max_dependents: 3,
            joint_extension: dec!(5000),
        },
        ctc: CtcParameters {
            per_child: Decimal::ZERO,
            phase_in_threshold: Decimal::ZERO,
            phase_in_rate: Decimal::ZERO,
            phase_out_thresholds: BTreeMap::new(),
            phase_out_rate: Decimal::ZERO,
        },
        ptc: ptc(Decimal::ZERO),
        snap: SnapParameters {
            max_benefits: BTreeMap::new(),
            max_incomes: BTreeMap::new(),
            standard_deductions: BTreeMap::new(),
            shelter_cost: Decimal::ZERO,
            child_care_cost: Decimal::ZERO,
        },
        section8: Section8Parameters {
            deduction_per_dependent: dec!(480),
            median_rent: dec!(11388),
            median_income: dec!(56516),
        },
    }
}
