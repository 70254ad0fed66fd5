use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rates_core::models::{HouseholdProfile, ProfileInput, TaxYear};
use rates_core::tables::RateTables;
use rates_core::{ComparisonTable, MarginalRateCalculator};
use rates_data::{ScheduleLoader, StatutoryTables};
use tracing::{debug, info};

use crate::render;

// ─── CLI definition ──────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum YearSelection {
    #[value(name = "2017")]
    Y2017,
    #[value(name = "2018")]
    Y2018,
    /// Every year with tables, side by side.
    Compare,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Csv,
}

/// Marginal tax and benefit rate schedules for one household.
///
/// Combines income tax brackets, deductions, credits and benefit phaseouts
/// into the rate paid on the next dollar of income, and prints it by income
/// range.
#[derive(Debug, Parser)]
#[command(name = "marginal-rates")]
pub struct Cli {
    /// Tax year to show, or `compare` for all years side by side.
    #[arg(long, value_enum, default_value_t = YearSelection::Compare)]
    pub year: YearSelection,

    /// Filing status: single, hoh or mfj.
    #[arg(long)]
    pub filing_status: String,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub dependents: i64,

    /// How a couple's earnings are split: equal or unequal.
    #[arg(long, default_value = "equal")]
    pub income_division: String,

    /// Kind of income: wages, business or capital.
    #[arg(long, default_value = "wages")]
    pub income_category: String,

    /// Credit or benefit to include (eitc, ctc, payroll, ptc, section8,
    /// snap). Repeatable.
    #[arg(long = "provision")]
    pub provisions: Vec<String>,

    /// CSV file of base rate schedules replacing the statutory ones.
    #[arg(long)]
    pub base_rates: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write log records to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Raw profile fields for `year`, validated by [`HouseholdProfile`].
    pub fn profile_input(
        &self,
        year: TaxYear,
    ) -> ProfileInput {
        ProfileInput {
            year: year.value(),
            filing_status: self.filing_status.clone(),
            dependents: self.dependents,
            income_category: self.income_category.clone(),
            income_division: Some(self.income_division.clone()),
            provisions: self.provisions.clone(),
        }
    }
}

// ─── pipeline ────────────────────────────────────────────────────────────────

/// Statutory tables, with base rates replaced from `base_rates` if given.
pub fn load_tables(base_rates: Option<&Path>) -> Result<StatutoryTables> {
    let mut tables = StatutoryTables::new().context("building statutory tables")?;

    if let Some(path) = base_rates {
        let file = File::open(path)
            .with_context(|| format!("cannot open base rates file '{}'", path.display()))?;
        let records = ScheduleLoader::parse(file)
            .with_context(|| format!("cannot read base rates file '{}'", path.display()))?;
        let replaced = ScheduleLoader::apply(&mut tables, &records)
            .with_context(|| format!("invalid base rates in '{}'", path.display()))?;
        info!(path = %path.display(), replaced, "applied base rates");
    }

    Ok(tables)
}

/// Builds the comparison table the flags ask for.
pub fn build_table<T: RateTables + ?Sized>(
    cli: &Cli,
    tables: &T,
) -> Result<ComparisonTable> {
    let years = match cli.year {
        YearSelection::Y2017 => vec![TaxYear::Y2017],
        YearSelection::Y2018 => vec![TaxYear::Y2018],
        YearSelection::Compare => tables.tax_years(),
    };
    let first = *years.first().context("no tax years to show")?;

    let profile = HouseholdProfile::try_from(cli.profile_input(first))
        .context("invalid household profile")?;
    debug!(?profile, ?years, "household profile");

    let calculator = MarginalRateCalculator::new(tables);
    let table = calculator
        .compare(&profile, &years)
        .context("cannot compute marginal rates")?;

    info!(rows = table.rows().len(), series = years.len(), "computed marginal rates");
    Ok(table)
}

/// Runs the whole command, printing the table to `out`.
pub fn run<W: Write>(
    cli: &Cli,
    out: W,
) -> Result<()> {
    let tables = load_tables(cli.base_rates.as_deref())?;
    let table = build_table(cli, &tables)?;

    match cli.format {
        OutputFormat::Text => render::write_text(&table, out).context("cannot write table")?,
        OutputFormat::Csv => render::write_csv(&table, out).context("cannot write CSV")?,
    }
    Ok(())
}
