use std::fmt;

use serde::{Deserialize, Serialize};

/// Tax years with rate tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum TaxYear {
    Y2017,
    Y2018,
}

impl TaxYear {
    pub const ALL: [TaxYear; 2] = [Self::Y2017, Self::Y2018];

    pub fn value(&self) -> i32 {
        match self {
            Self::Y2017 => 2017,
            Self::Y2018 => 2018,
        }
    }

    pub fn from_year(year: i32) -> Option<Self> {
        match year {
            2017 => Some(Self::Y2017),
            2018 => Some(Self::Y2018),
            _ => None,
        }
    }
}

impl TryFrom<i32> for TaxYear {
    type Error = String;

    fn try_from(year: i32) -> Result<Self, Self::Error> {
        Self::from_year(year).ok_or_else(|| format!("unsupported tax year {year}"))
    }
}

impl From<TaxYear> for i32 {
    fn from(year: TaxYear) -> Self {
        year.value()
    }
}

impl fmt::Display for TaxYear {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
