//! Generators for the credits, benefits and payroll taxes that sit on top of
//! the income tax schedule.
//!
//! Every generator reads its constants from a [`YearTables`] and returns a
//! fresh [`BracketSchedule`] meant to be summed into the accumulated
//! schedule. Tables are never mutated.
//!
//! [`YearTables`]: crate::tables::YearTables
//! [`BracketSchedule`]: crate::schedule::BracketSchedule

pub mod common;
pub mod ctc;
pub mod eitc;
pub mod payroll;
pub mod ptc;
pub mod section8;
pub mod snap;

use thiserror::Error;

use crate::schedule::ScheduleError;
use crate::tables::TablesError;

pub use ctc::ctc_schedule;
pub use eitc::eitc_schedule;
pub use payroll::payroll_schedule;
pub use ptc::ptc_schedule;
pub use section8::section8_schedule;
pub use snap::snap_schedule;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    #[error(transparent)]
    Tables(#[from] TablesError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("{provision}: cannot divide by zero {quantity}")]
    DegenerateDivision {
        provision: &'static str,
        quantity: &'static str,
    },
}
