//! Earned income tax credit.

use tracing::{trace, warn};

use super::ProvisionError;
use crate::models::{Bracket, FilingStatus};
use crate::schedule::BracketSchedule;
use crate::tables::YearTables;

/// Positions of the plateau-end and phase-out-end breakpoints that move
/// right for joint filers.
const JOINT_EXTENDED: [usize; 2] = [2, 3];

/// The EITC schedule for a household.
///
/// Dependents past the table's maximum earn no extra credit, so the count
/// is capped before the lookup. Joint filers get a longer plateau: the
/// plateau end and the phase-out end both move right by the table's joint
/// extension.
pub fn eitc_schedule(
    tables: &YearTables,
    filing_status: FilingStatus,
    dependents: u32,
) -> Result<BracketSchedule, ProvisionError> {
    let max_dependents = tables.eitc.max_dependents;
    let counted = if dependents > max_dependents {
        warn!(
            dependents,
            max_dependents, "eitc does not grow past the maximum dependents; capping"
        );
        max_dependents
    } else {
        dependents
    };

    let base = tables.eitc_schedule(counted)?;
    if !filing_status.is_joint() {
        return Ok(base.clone());
    }

    let extension = tables.eitc.joint_extension;
    let brackets: Vec<Bracket> = base
        .iter()
        .enumerate()
        .map(|(index, bracket)| {
            if JOINT_EXTENDED.contains(&index) {
                Bracket::new(bracket.threshold + extension, bracket.rate)
            } else {
                *bracket
            }
        })
        .collect();

    trace!(dependents = counted, %extension, "extended eitc plateau for joint filers");

    Ok(BracketSchedule::new(brackets)?)
}
