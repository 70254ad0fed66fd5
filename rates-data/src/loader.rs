use std::collections::BTreeMap;
use std::io::Read;

use rates_core::models::{Bracket, FilingStatus, RateClass, TaxYear};
use rates_core::schedule::{BracketSchedule, ScheduleError};
use rates_core::tables::TablesError;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::statutory::StatutoryTables;

/// Errors that can occur when loading base rate schedules.
#[derive(Debug, Error)]
pub enum ScheduleLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unsupported tax year {0}")]
    UnsupportedYear(i32),

    #[error("Unknown rate class '{0}'")]
    UnknownRateClass(String),

    #[error("Unknown filing status '{0}'")]
    UnknownFilingStatus(String),

    #[error("Invalid {class} schedule for {status} in {year}: {source}")]
    InvalidSchedule {
        year: TaxYear,
        class: RateClass,
        status: FilingStatus,
        #[source]
        source: ScheduleError,
    },

    #[error(transparent)]
    Tables(#[from] TablesError),
}

impl From<csv::Error> for ScheduleLoaderError {
    fn from(err: csv::Error) -> Self {
        ScheduleLoaderError::CsvParse(err.to_string())
    }
}

/// Resolves a filing status column value.
///
/// Besides the table codes (`single`, `hoh`, `mfj`) the IRS schedule letters
/// are accepted:
/// - Schedule X → single
/// - Schedule Y-1 → mfj
/// - Schedule Z → hoh
fn parse_filing_status(raw: &str) -> Result<FilingStatus, ScheduleLoaderError> {
    match raw.trim() {
        "X" => Ok(FilingStatus::Single),
        "Y-1" => Ok(FilingStatus::MarriedFilingJointly),
        "Z" => Ok(FilingStatus::HeadOfHousehold),
        other => FilingStatus::parse(other)
            .ok_or_else(|| ScheduleLoaderError::UnknownFilingStatus(raw.to_string())),
    }
}

/// A single row of a base rates CSV file.
///
/// - `tax_year`: 2017 or 2018
/// - `rate_class`: `ordinary` or `capital`
/// - `filing_status`: a filing status code or IRS schedule letter
/// - `threshold`: income at which the rate starts
/// - `rate`: marginal rate in percent (e.g. 22 for 22%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScheduleRecord {
    pub tax_year: i32,
    pub rate_class: String,
    pub filing_status: String,
    pub threshold: Decimal,
    pub rate: Decimal,
}

/// Key of one base rate schedule.
pub type ScheduleKey = (TaxYear, RateClass, FilingStatus);

/// Loader for base rate schedules from CSV files.
///
/// Rows are grouped by year, rate class and filing status. Within a group
/// the rows must appear in increasing threshold order starting at zero.
pub struct ScheduleLoader;

impl ScheduleLoader {
    /// Parse schedule records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ScheduleRecord>, ScheduleLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ScheduleRecord = result?;
            records.push(record);
        }

        debug!(records = records.len(), "parsed base rate records");
        Ok(records)
    }

    /// Group records into validated schedules.
    pub fn schedules(
        records: &[ScheduleRecord]
    ) -> Result<BTreeMap<ScheduleKey, BracketSchedule>, ScheduleLoaderError> {
        let mut groups: BTreeMap<ScheduleKey, Vec<Bracket>> = BTreeMap::new();

        for record in records {
            let year = TaxYear::from_year(record.tax_year)
                .ok_or(ScheduleLoaderError::UnsupportedYear(record.tax_year))?;
            let class = RateClass::parse(&record.rate_class)
                .ok_or_else(|| ScheduleLoaderError::UnknownRateClass(record.rate_class.clone()))?;
            let status = parse_filing_status(&record.filing_status)?;

            groups
                .entry((year, class, status))
                .or_default()
                .push(Bracket::new(record.threshold, record.rate));
        }

        groups
            .into_iter()
            .map(|((year, class, status), brackets)| -> Result<_, ScheduleLoaderError> {
                let invalid = |source| ScheduleLoaderError::InvalidSchedule {
                    year,
                    class,
                    status,
                    source,
                };
                let schedule = BracketSchedule::new(brackets).map_err(invalid)?;
                schedule.ensure_anchored().map_err(invalid)?;
                Ok(((year, class, status), schedule))
            })
            .collect()
    }

    /// Replace base rate schedules in `tables` with those in the records.
    ///
    /// Schedules not mentioned in the records are left untouched. Returns
    /// the number of schedules replaced. Nothing is replaced unless every
    /// group is valid.
    pub fn apply(
        tables: &mut StatutoryTables,
        records: &[ScheduleRecord],
    ) -> Result<usize, ScheduleLoaderError> {
        let schedules = Self::schedules(records)?;
        let replaced = schedules.len();

        for ((year, class, status), schedule) in schedules {
            tables.set_base_rates(year, class, status, schedule)?;
        }

        info!(replaced, "loaded base rate schedules");
        Ok(replaced)
    }
}
