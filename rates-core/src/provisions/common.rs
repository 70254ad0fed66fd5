//! Arithmetic shared by the provision generators.

use rust_decimal::Decimal;

use super::ProvisionError;
use crate::models::FilingStatus;

/// One hundred, for converting between fractions and percentages.
pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Divides `numerator` by `denominator`, reporting a zero (or overflowing)
/// division instead of panicking.
///
/// `provision` and `quantity` name the generator and the divisor in the
/// error.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use rates_core::provisions::common::checked_div;
///
/// assert_eq!(checked_div(dec!(3000), dec!(15), "ctc", "phase-in rate").unwrap(), dec!(200));
/// assert!(checked_div(dec!(1), dec!(0), "ctc", "phase-in rate").is_err());
/// ```
pub fn checked_div(
    numerator: Decimal,
    denominator: Decimal,
    provision: &'static str,
    quantity: &'static str,
) -> Result<Decimal, ProvisionError> {
    numerator
        .checked_div(denominator)
        .ok_or(ProvisionError::DegenerateDivision {
            provision,
            quantity,
        })
}

/// `amount × rate / 100` for a rate given in percent.
pub fn percent_of(
    amount: Decimal,
    rate: Decimal,
) -> Decimal {
    amount * rate / HUNDRED
}

/// Persons counted by the benefit programs: the filers plus dependents.
pub fn household_size(
    filing_status: FilingStatus,
    dependents: u32,
) -> u32 {
    filing_status.filers() + dependents
}
