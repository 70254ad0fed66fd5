//! Employee and employer payroll taxes.

use rust_decimal::Decimal;

use super::ProvisionError;
use crate::schedule::{BracketSchedule, scale};
use crate::tables::YearTables;

/// The payroll schedule for a household.
///
/// Payroll thresholds apply per worker. When two earners split the income
/// evenly, every threshold is reached at twice the household income.
pub fn payroll_schedule(
    tables: &YearTables,
    split_evenly: bool,
) -> Result<BracketSchedule, ProvisionError> {
    if split_evenly {
        Ok(scale(&tables.payroll, Decimal::TWO, false)?)
    } else {
        Ok(tables.payroll.clone())
    }
}
