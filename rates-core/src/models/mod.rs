mod bracket;
mod filing_status;
mod household;
mod tax_year;

pub use bracket::Bracket;
pub use filing_status::FilingStatus;
pub use household::{
    HouseholdProfile, IncomeCategory, IncomeDivision, ProfileError, ProfileInput, Provision,
    RateClass,
};
pub use tax_year::TaxYear;
