use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilingStatus {
    Single,
    #[serde(rename = "hoh")]
    HeadOfHousehold,
    #[serde(rename = "mfj")]
    MarriedFilingJointly,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 3] = [
        Self::Single,
        Self::HeadOfHousehold,
        Self::MarriedFilingJointly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::HeadOfHousehold => "hoh",
            Self::MarriedFilingJointly => "mfj",
        }
    }

    /// Parses the lowercase code used by the rate tables (`single`, `hoh`,
    /// `mfj`). Matching is case-insensitive and ignores surrounding spaces.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Some(Self::Single),
            "hoh" => Some(Self::HeadOfHousehold),
            "mfj" => Some(Self::MarriedFilingJointly),
            _ => None,
        }
    }

    pub fn is_joint(&self) -> bool {
        matches!(self, Self::MarriedFilingJointly)
    }

    /// Number of adults on the return.
    pub fn filers(&self) -> u32 {
        if self.is_joint() { 2 } else { 1 }
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_accepts_every_code() {
        for status in FilingStatus::ALL {
            assert_eq!(FilingStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(
            FilingStatus::parse(" MFJ "),
            Some(FilingStatus::MarriedFilingJointly)
        );
    }

    #[test]
    fn parse_rejects_unknown_codes() {
        assert_eq!(FilingStatus::parse("mfs"), None);
    }

    #[test]
    fn joint_filers_count_two_adults() {
        assert_eq!(FilingStatus::MarriedFilingJointly.filers(), 2);
        assert_eq!(FilingStatus::HeadOfHousehold.filers(), 1);
        assert_eq!(FilingStatus::Single.filers(), 1);
    }
}
