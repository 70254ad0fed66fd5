//! Marginal tax and benefit rate schedules.
//!
//! Income taxes, credits and means-tested benefits are modeled as
//! piecewise-constant marginal rate schedules. The [`schedule`] module holds
//! the schedule type and its algebra, [`provisions`] derives schedules for
//! individual credits and benefits, [`composition`] combines them for one
//! household, and [`comparison`] lines several schedules up side by side.
//!
//! Year-specific numbers are never embedded here; they come from a
//! [`tables::RateTables`] implementation.

pub mod comparison;
pub mod composition;
pub mod models;
pub mod provisions;
pub mod schedule;
pub mod tables;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use comparison::{ComparisonError, ComparisonRow, ComparisonTable};
pub use composition::{CompositionError, MarginalRateCalculator};
pub use models::*;
pub use provisions::ProvisionError;
pub use schedule::{BracketSchedule, ScheduleError};
pub use tables::{RateTables, TablesError, YearTables};
