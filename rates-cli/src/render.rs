//! Text and CSV output of a comparison table.

use std::io::{self, Write};

use rates_core::{ComparisonRow, ComparisonTable};
use rust_decimal::Decimal;

/// Whole dollars.
fn dollars(amount: Decimal) -> String {
    amount.round().normalize().to_string()
}

/// Two decimals and a percent sign.
fn percent(rate: Decimal) -> String {
    format!("{:.2}%", rate.round_dp(2))
}

fn text_cells(row: &ComparisonRow) -> Vec<String> {
    let mut cells = Vec::with_capacity(row.rates.len() + 2);
    cells.push(dollars(row.start));
    cells.push(row.end.map(dollars).unwrap_or_default());
    cells.extend(row.rates.iter().copied().map(percent));
    cells
}

/// Renders `table` as right-aligned text columns under an `Over`, `But ≤`
/// and one `<label> marginal rates` header per series.
pub fn render_text(table: &ComparisonTable) -> String {
    let header: Vec<String> = ["Over".to_string(), "But ≤".to_string()]
        .into_iter()
        .chain(table.labels().iter().map(|label| format!("{label} marginal rates")))
        .collect();
    let body: Vec<Vec<String>> = table.rows().iter().map(text_cells).collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:>width$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut out = String::new();
    out.push_str(&line(&header));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&line(&rule));
    out.push('\n');
    for cells in &body {
        out.push_str(&line(cells));
        out.push('\n');
    }
    out
}

pub fn write_text<W: Write>(
    table: &ComparisonTable,
    mut out: W,
) -> io::Result<()> {
    out.write_all(render_text(table).as_bytes())?;
    out.flush()
}

/// Writes `table` as CSV with a `start,end,<labels…>` header. The open last
/// row has an empty `end`. Amounts and rates are written unrounded.
pub fn write_csv<W: Write>(
    table: &ComparisonTable,
    out: W,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);

    let header = ["start", "end"]
        .into_iter()
        .map(str::to_string)
        .chain(table.labels().iter().cloned());
    writer.write_record(header)?;

    for row in table.rows() {
        let record = [
            row.start.normalize().to_string(),
            row.end.map(|end| end.normalize().to_string()).unwrap_or_default(),
        ]
        .into_iter()
        .chain(row.rates.iter().map(|rate| rate.normalize().to_string()));
        writer.write_record(record)?;
    }

    writer.flush()?;
    Ok(())
}
