//! Read-only lookup of the per-year rate tables.
//!
//! The composition engine never embeds year-specific numbers; it asks a
//! [`RateTables`] implementation for a [`YearTables`] and then looks up the
//! schedule or parameter it needs. Any missing entry is a [`TablesError`]:
//! defaulting would silently produce a wrong schedule.

mod records;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::{FilingStatus, TaxYear};

pub use records::{
    CtcParameters, EitcParameters, ExemptionRules, PtcBand, PtcParameters, Section8Parameters,
    SnapHousehold, SnapParameters, YearTables,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TablesError {
    #[error("no rate tables for tax year {0}")]
    MissingYear(TaxYear),

    #[error("{table} table for {year} has no entry for filing status '{status}'")]
    MissingFilingStatus {
        table: &'static str,
        year: TaxYear,
        status: FilingStatus,
    },

    #[error("{table} table for {year} has no entry for household size {size}")]
    MissingHouseholdSize {
        table: &'static str,
        year: TaxYear,
        size: u32,
    },

    #[error("{table} table for {year} has no entry for {dependents} dependents")]
    MissingDependents {
        table: &'static str,
        year: TaxYear,
        dependents: u32,
    },

    #[error("{table} table for {year} is empty")]
    EmptyTable { table: &'static str, year: TaxYear },
}

/// Source of the immutable per-year tables.
pub trait RateTables {
    /// Tables for `year`.
    ///
    /// # Errors
    ///
    /// [`TablesError::MissingYear`] when the year has no tables.
    fn year_tables(
        &self,
        year: TaxYear,
    ) -> Result<&YearTables, TablesError>;

    /// Years with tables, oldest first.
    fn tax_years(&self) -> Vec<TaxYear>;
}

impl RateTables for BTreeMap<TaxYear, YearTables> {
    fn year_tables(
        &self,
        year: TaxYear,
    ) -> Result<&YearTables, TablesError> {
        self.get(&year).ok_or(TablesError::MissingYear(year))
    }

    fn tax_years(&self) -> Vec<TaxYear> {
        self.keys().copied().collect()
    }
}

/// A single year's tables answer for that year only.
impl RateTables for YearTables {
    fn year_tables(
        &self,
        year: TaxYear,
    ) -> Result<&YearTables, TablesError> {
        if year == self.year {
            Ok(self)
        } else {
            Err(TablesError::MissingYear(year))
        }
    }

    fn tax_years(&self) -> Vec<TaxYear> {
        vec![self.year]
    }
}
