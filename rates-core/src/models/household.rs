use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{FilingStatus, TaxYear};

/// Errors raised while turning raw profile input into a [`HouseholdProfile`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("unsupported tax year {0}")]
    UnsupportedYear(i32),

    #[error("unknown filing status '{0}' (expected single, hoh or mfj)")]
    UnknownFilingStatus(String),

    #[error("dependent count must be non-negative, got {0}")]
    NegativeDependents(i64),

    #[error("dependent count {0} is out of range")]
    TooManyDependents(i64),

    #[error("unknown income category '{0}' (expected wages, business or capital)")]
    UnknownIncomeCategory(String),

    #[error("unknown income division '{0}' (expected equal or unequal)")]
    UnknownIncomeDivision(String),

    #[error("unknown provision '{0}' (expected eitc, ctc, payroll, ptc, section8 or snap)")]
    UnknownProvision(String),
}

/// Which base rate table applies to the income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateClass {
    Ordinary,
    Capital,
}

impl RateClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ordinary => "ordinary",
            Self::Capital => "capital",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ordinary" => Some(Self::Ordinary),
            "capital" => Some(Self::Capital),
            _ => None,
        }
    }
}

impl fmt::Display for RateClass {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeCategory {
    #[default]
    Wages,
    /// Pass-through business income.
    Business,
    Capital,
}

impl IncomeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wages => "wages",
            Self::Business => "business",
            Self::Capital => "capital",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wages" => Some(Self::Wages),
            "business" => Some(Self::Business),
            "capital" => Some(Self::Capital),
            _ => None,
        }
    }

    pub fn rate_class(&self) -> RateClass {
        match self {
            Self::Capital => RateClass::Capital,
            Self::Wages | Self::Business => RateClass::Ordinary,
        }
    }
}

/// How a married couple's income is split between the spouses. Only the
/// payroll tax schedule depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeDivision {
    #[default]
    Equal,
    Unequal,
}

impl IncomeDivision {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equal" => Some(Self::Equal),
            "unequal" => Some(Self::Unequal),
            _ => None,
        }
    }
}

/// Optional provisions layered on top of the income tax.
///
/// The declaration order is the order in which the composition engine sums
/// them in, so the derived `Ord` keeps a `BTreeSet<Provision>` in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provision {
    Eitc,
    Ctc,
    Payroll,
    Ptc,
    Section8,
    Snap,
}

impl Provision {
    pub const ALL: [Provision; 6] = [
        Self::Eitc,
        Self::Ctc,
        Self::Payroll,
        Self::Ptc,
        Self::Section8,
        Self::Snap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eitc => "eitc",
            Self::Ctc => "ctc",
            Self::Payroll => "payroll",
            Self::Ptc => "ptc",
            Self::Section8 => "section8",
            Self::Snap => "snap",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let code = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|p| p.as_str() == code)
    }
}

impl fmt::Display for Provision {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the composition engine needs to know about one household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdProfile {
    pub year: TaxYear,
    pub filing_status: FilingStatus,
    pub dependents: u32,
    pub income_category: IncomeCategory,
    pub income_division: IncomeDivision,
    pub provisions: BTreeSet<Provision>,
}

impl HouseholdProfile {
    /// Creates a profile with equal income division and no extra provisions.
    pub fn new(
        year: TaxYear,
        filing_status: FilingStatus,
        dependents: u32,
        income_category: IncomeCategory,
    ) -> Self {
        Self {
            year,
            filing_status,
            dependents,
            income_category,
            income_division: IncomeDivision::default(),
            provisions: BTreeSet::new(),
        }
    }

    pub fn with_income_division(
        mut self,
        division: IncomeDivision,
    ) -> Self {
        self.income_division = division;
        self
    }

    pub fn with_provisions(
        mut self,
        provisions: impl IntoIterator<Item = Provision>,
    ) -> Self {
        self.provisions.extend(provisions);
        self
    }

    /// The same household in another tax year.
    pub fn for_year(
        &self,
        year: TaxYear,
    ) -> Self {
        Self {
            year,
            ..self.clone()
        }
    }

    /// Whether the payroll schedule is doubled before it is summed in.
    pub fn splits_payroll_evenly(&self) -> bool {
        self.filing_status.is_joint() && self.income_division == IncomeDivision::Equal
    }
}

/// Unvalidated profile fields as they arrive from a caller (CLI flags, a
/// deserialized request, ...).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileInput {
    pub year: i32,
    pub filing_status: String,
    pub dependents: i64,
    pub income_category: String,
    #[serde(default)]
    pub income_division: Option<String>,
    #[serde(default)]
    pub provisions: Vec<String>,
}

impl TryFrom<ProfileInput> for HouseholdProfile {
    type Error = ProfileError;

    fn try_from(input: ProfileInput) -> Result<Self, Self::Error> {
        let year =
            TaxYear::from_year(input.year).ok_or(ProfileError::UnsupportedYear(input.year))?;

        let filing_status = FilingStatus::parse(&input.filing_status)
            .ok_or_else(|| ProfileError::UnknownFilingStatus(input.filing_status.clone()))?;

        if input.dependents < 0 {
            return Err(ProfileError::NegativeDependents(input.dependents));
        }
        let dependents = u32::try_from(input.dependents)
            .map_err(|_| ProfileError::TooManyDependents(input.dependents))?;

        let income_category = IncomeCategory::parse(&input.income_category)
            .ok_or_else(|| ProfileError::UnknownIncomeCategory(input.income_category.clone()))?;

        let income_division = match input.income_division.as_deref() {
            None => IncomeDivision::default(),
            Some(raw) => IncomeDivision::parse(raw)
                .ok_or_else(|| ProfileError::UnknownIncomeDivision(raw.to_string()))?,
        };

        let provisions = input
            .provisions
            .iter()
            .map(|raw| {
                Provision::parse(raw).ok_or_else(|| ProfileError::UnknownProvision(raw.clone()))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Self {
            year,
            filing_status,
            dependents,
            income_category,
            income_division,
            provisions,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn valid_input() -> ProfileInput {
        ProfileInput {
            year: 2018,
            filing_status: "mfj".to_string(),
            dependents: 2,
            income_category: "wages".to_string(),
            income_division: Some("unequal".to_string()),
            provisions: vec!["snap".to_string(), "ctc".to_string(), "eitc".to_string()],
        }
    }

    // =========================================================================
    // TryFrom<ProfileInput> tests
    // =========================================================================

    #[test]
    fn valid_input_builds_profile() {
        let profile = HouseholdProfile::try_from(valid_input()).unwrap();

        assert_eq!(profile.year, TaxYear::Y2018);
        assert_eq!(profile.filing_status, FilingStatus::MarriedFilingJointly);
        assert_eq!(profile.dependents, 2);
        assert_eq!(profile.income_category, IncomeCategory::Wages);
        assert_eq!(profile.income_division, IncomeDivision::Unequal);
    }

    #[test]
    fn provisions_iterate_in_composition_order() {
        let profile = HouseholdProfile::try_from(valid_input()).unwrap();

        let order: Vec<_> = profile.provisions.iter().copied().collect();

        assert_eq!(order, vec![Provision::Eitc, Provision::Ctc, Provision::Snap]);
    }

    #[test]
    fn missing_income_division_defaults_to_equal() {
        let input = ProfileInput {
            income_division: None,
            ..valid_input()
        };

        let profile = HouseholdProfile::try_from(input).unwrap();

        assert_eq!(profile.income_division, IncomeDivision::Equal);
    }

    #[test]
    fn negative_dependents_are_rejected() {
        let input = ProfileInput {
            dependents: -1,
            ..valid_input()
        };

        assert_eq!(
            HouseholdProfile::try_from(input),
            Err(ProfileError::NegativeDependents(-1))
        );
    }

    #[test]
    fn unsupported_year_is_rejected() {
        let input = ProfileInput {
            year: 2019,
            ..valid_input()
        };

        assert_eq!(
            HouseholdProfile::try_from(input),
            Err(ProfileError::UnsupportedYear(2019))
        );
    }

    #[test]
    fn unknown_filing_status_is_rejected() {
        let input = ProfileInput {
            filing_status: "mfs".to_string(),
            ..valid_input()
        };

        assert_eq!(
            HouseholdProfile::try_from(input),
            Err(ProfileError::UnknownFilingStatus("mfs".to_string()))
        );
    }

    #[test]
    fn unknown_income_category_is_rejected() {
        let input = ProfileInput {
            income_category: "rent".to_string(),
            ..valid_input()
        };

        assert_eq!(
            HouseholdProfile::try_from(input),
            Err(ProfileError::UnknownIncomeCategory("rent".to_string()))
        );
    }

    #[test]
    fn unknown_provision_is_rejected() {
        let input = ProfileInput {
            provisions: vec!["wic".to_string()],
            ..valid_input()
        };

        assert_eq!(
            HouseholdProfile::try_from(input),
            Err(ProfileError::UnknownProvision("wic".to_string()))
        );
    }

    // =========================================================================
    // derived values
    // =========================================================================

    #[test]
    fn payroll_is_split_only_for_joint_filers_with_equal_income() {
        let joint = HouseholdProfile::new(
            TaxYear::Y2018,
            FilingStatus::MarriedFilingJointly,
            0,
            IncomeCategory::Wages,
        );

        assert!(joint.splits_payroll_evenly());
        assert!(
            !joint
                .clone()
                .with_income_division(IncomeDivision::Unequal)
                .splits_payroll_evenly()
        );
        assert!(
            !HouseholdProfile {
                filing_status: FilingStatus::Single,
                ..joint
            }
            .splits_payroll_evenly()
        );
    }

    #[test]
    fn capital_income_uses_capital_rates() {
        assert_eq!(IncomeCategory::Capital.rate_class(), RateClass::Capital);
        assert_eq!(IncomeCategory::Business.rate_class(), RateClass::Ordinary);
        assert_eq!(IncomeCategory::Wages.rate_class(), RateClass::Ordinary);
    }
}
