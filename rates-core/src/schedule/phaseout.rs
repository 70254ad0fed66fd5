//! Zero bracket with a phased-out personal exemption.
//!
//! In years where personal exemptions are law, the zero bracket is the
//! standard deduction plus one exemption per filer and dependent. Above a
//! filing-status threshold the exemptions are clawed back linearly over a
//! fixed band of AGI, so inside that band each extra dollar of AGI raises
//! taxable income by more than a dollar:
//!
//! ```text
//! taxable = AGI - standard deduction - total exemption × (band end - AGI) / band width
//! ```
//!
//! [`ExemptionPhaseout::apply`] shifts a base schedule by the full zero
//! bracket, then re-maps every threshold inside the band back to AGI by
//! solving the formula above and multiplies every rate inside the band by
//! `1 + total exemption / band width`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{BracketSchedule, ScheduleError, algebra::shift};
use crate::models::{Bracket, FilingStatus};

/// Exemption parameters resolved for one filing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExemptionPhaseout {
    pub standard_deduction: Decimal,
    pub personal_exemption: Decimal,
    /// AGI at which the exemption starts to phase out.
    pub phaseout_begin: Decimal,
    pub phaseout_width: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Below,
    Inside,
    Above,
}

impl ExemptionPhaseout {
    pub fn total_exemption(
        &self,
        filing_status: FilingStatus,
        dependents: u32,
    ) -> Decimal {
        Decimal::from(filing_status.filers() + dependents) * self.personal_exemption
    }

    pub fn phaseout_end(&self) -> Decimal {
        self.phaseout_begin + self.phaseout_width
    }

    /// Applies the zero bracket and the exemption phaseout to `schedule`.
    ///
    /// Breakpoints are always emitted at both edges of the phaseout band,
    /// whether or not a shifted threshold falls on them.
    ///
    /// # Errors
    ///
    /// * [`ScheduleError::DegeneratePhaseout`] if the band width is not
    ///   positive.
    /// * Any error from shifting the schedule.
    pub fn apply(
        &self,
        schedule: &BracketSchedule,
        filing_status: FilingStatus,
        dependents: u32,
    ) -> Result<BracketSchedule, ScheduleError> {
        if self.phaseout_width <= Decimal::ZERO {
            return Err(ScheduleError::DegeneratePhaseout(self.phaseout_width));
        }

        let total_exemption = self.total_exemption(filing_status, dependents);
        let zero_bracket = self.standard_deduction + total_exemption;
        let shifted = shift(schedule, zero_bracket)?;

        let begin = self.phaseout_begin;
        let end = self.phaseout_end();
        let factor = Decimal::ONE + total_exemption / self.phaseout_width;
        // Constant part of the AGI solved from a taxable-income threshold.
        let offset = total_exemption * end / self.phaseout_width - total_exemption;

        trace!(
            %zero_bracket,
            %begin,
            %end,
            %factor,
            "applying exemption phaseout"
        );

        let mut brackets = Vec::with_capacity(shifted.len() + 2);
        let mut band = Band::Below;
        let mut previous_rate = Decimal::ZERO;

        for bracket in shifted.iter() {
            if bracket.threshold < begin {
                brackets.push(*bracket);
                previous_rate = bracket.rate;
                continue;
            }

            if band == Band::Below {
                band = Band::Inside;
                if bracket.threshold != begin {
                    brackets.push(Bracket::new(begin, previous_rate * factor));
                }
            }

            if bracket.threshold < end {
                let agi = (bracket.threshold + offset) / factor;
                brackets.push(Bracket::new(agi, bracket.rate * factor));
                previous_rate = bracket.rate;
                continue;
            }

            if band == Band::Inside {
                band = Band::Above;
                if bracket.threshold != end {
                    brackets.push(Bracket::new(end, previous_rate));
                }
            }

            brackets.push(*bracket);
            previous_rate = bracket.rate;
        }

        match band {
            Band::Below => {
                brackets.push(Bracket::new(begin, previous_rate * factor));
                brackets.push(Bracket::new(end, previous_rate));
            }
            Band::Inside => brackets.push(Bracket::new(end, previous_rate)),
            Band::Above => {}
        }

        BracketSchedule::new(brackets)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn rules_single_2017() -> ExemptionPhaseout {
        ExemptionPhaseout {
            standard_deduction: dec!(6350),
            personal_exemption: dec!(4050),
            phaseout_begin: dec!(261500),
            phaseout_width: dec!(125000),
        }
    }

    fn ordinary_single_2017() -> BracketSchedule {
        BracketSchedule::from_pairs([
            (dec!(0), dec!(10)),
            (dec!(9325), dec!(15)),
            (dec!(37950), dec!(25)),
            (dec!(91900), dec!(28)),
            (dec!(191650), dec!(33)),
            (dec!(416700), dec!(35)),
            (dec!(418400), dec!(39.6)),
        ])
        .unwrap()
    }

    // =========================================================================
    // total_exemption tests
    // =========================================================================

    #[test]
    fn total_exemption_counts_filers_and_dependents() {
        let rules = rules_single_2017();

        assert_eq!(rules.total_exemption(FilingStatus::Single, 0), dec!(4050));
        assert_eq!(
            rules.total_exemption(FilingStatus::MarriedFilingJointly, 2),
            dec!(16200)
        );
    }

    // =========================================================================
    // apply tests
    // =========================================================================

    #[test]
    fn apply_inserts_band_edges_when_no_threshold_falls_inside() {
        let result = rules_single_2017()
            .apply(&ordinary_single_2017(), FilingStatus::Single, 0)
            .unwrap();

        // factor = 1 + 4050 / 125000 = 1.0324
        assert_eq!(
            result,
            BracketSchedule::from_pairs([
                (dec!(0), dec!(0)),
                (dec!(10400), dec!(10)),
                (dec!(19725), dec!(15)),
                (dec!(48350), dec!(25)),
                (dec!(102300), dec!(28)),
                (dec!(202050), dec!(33)),
                (dec!(261500), dec!(34.0692)),
                (dec!(386500), dec!(33)),
                (dec!(427100), dec!(35)),
                (dec!(428800), dec!(39.6)),
            ])
            .unwrap()
        );
    }

    #[test]
    fn apply_remaps_thresholds_inside_the_band() {
        let base = BracketSchedule::from_pairs([(dec!(0), dec!(10)), (dec!(250000), dec!(20))])
            .unwrap();
        let rules = ExemptionPhaseout {
            standard_deduction: dec!(0),
            personal_exemption: dec!(25000),
            phaseout_begin: dec!(200000),
            phaseout_width: dec!(125000),
        };

        let result = rules.apply(&base, FilingStatus::Single, 0).unwrap();

        // factor = 1.2; the shifted threshold 275000 maps back to
        // (275000 - 25000 + 25000 × 325000 / 125000) / 1.2 = 262500
        assert_eq!(
            result,
            BracketSchedule::from_pairs([
                (dec!(0), dec!(0)),
                (dec!(25000), dec!(10)),
                (dec!(200000), dec!(12)),
                (dec!(262500), dec!(24)),
                (dec!(325000), dec!(20)),
            ])
            .unwrap()
        );
    }

    #[test]
    fn apply_skips_edge_when_threshold_sits_on_it() {
        let base = BracketSchedule::from_pairs([(dec!(0), dec!(10)), (dec!(100000), dec!(20))])
            .unwrap();
        let rules = ExemptionPhaseout {
            standard_deduction: dec!(0),
            personal_exemption: dec!(25000),
            phaseout_begin: dec!(0),
            phaseout_width: dec!(100000),
        };

        let result = rules.apply(&base, FilingStatus::Single, 0).unwrap();

        // The [0, 0] bracket sits on the band start; 25000 is inside the band
        // and 125000 lies past its end at 100000.
        let thresholds: Vec<_> = result.thresholds().collect();
        assert_eq!(thresholds.len(), 4);
        assert_eq!(thresholds[0], dec!(0));
        assert_eq!(thresholds[2], dec!(100000));
        assert_eq!(thresholds[3], dec!(125000));
    }

    #[test]
    fn apply_emits_band_when_schedule_ends_below_it() {
        let base = BracketSchedule::from_pairs([(dec!(0), dec!(10))]).unwrap();

        let result = rules_single_2017()
            .apply(&base, FilingStatus::Single, 0)
            .unwrap();

        assert_eq!(
            result,
            BracketSchedule::from_pairs([
                (dec!(0), dec!(0)),
                (dec!(10400), dec!(10)),
                (dec!(261500), dec!(10.324)),
                (dec!(386500), dec!(10)),
            ])
            .unwrap()
        );
    }

    #[test]
    fn apply_rejects_zero_width_band() {
        let rules = ExemptionPhaseout {
            phaseout_width: dec!(0),
            ..rules_single_2017()
        };

        assert_eq!(
            rules.apply(&ordinary_single_2017(), FilingStatus::Single, 0),
            Err(ScheduleError::DegeneratePhaseout(dec!(0)))
        );
    }
}
