use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One step of a marginal rate schedule.
///
/// `rate` is a signed percentage applying from `threshold` up to the next
/// bracket's threshold (or without bound for the last bracket).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub threshold: Decimal,
    pub rate: Decimal,
}

impl Bracket {
    pub const fn new(
        threshold: Decimal,
        rate: Decimal,
    ) -> Self {
        Self { threshold, rate }
    }

    /// The `[0, 0]` bracket every displayable schedule starts from.
    pub const fn zero() -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO)
    }
}

impl From<(Decimal, Decimal)> for Bracket {
    fn from((threshold, rate): (Decimal, Decimal)) -> Self {
        Self::new(threshold, rate)
    }
}
