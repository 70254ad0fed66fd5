//! Side-by-side tabulation of several schedules.
//!
//! [`ComparisonTable::build`] merges any number of breakpoint streams onto
//! one common partition of `[0, ∞)`. Each row covers an income range in
//! which no series changes its rate, and carries every series' rate there.

use std::iter::Peekable;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Bracket;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComparisonError {
    #[error("a comparison needs at least one series")]
    NoSeries,

    #[error("series {0} has no brackets")]
    EmptySeries(usize),

    #[error("series {series} starts at {threshold} instead of 0")]
    NotAnchored { series: usize, threshold: Decimal },

    #[error("series {series} has threshold {threshold} after {previous}")]
    NonIncreasing {
        series: usize,
        previous: Decimal,
        threshold: Decimal,
    },
}

/// One row of a comparison: an income range and the rate of every series
/// in it. The last row has no end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub start: Decimal,
    pub end: Option<Decimal>,
    pub rates: Vec<Decimal>,
}

impl ComparisonRow {
    pub fn contains(
        &self,
        income: Decimal,
    ) -> bool {
        income >= self.start && self.end.is_none_or(|end| income < end)
    }
}

/// Labelled series merged onto common rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonTable {
    labels: Vec<String>,
    rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    /// Merges labelled breakpoint streams, in order, into one table.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use rates_core::comparison::ComparisonTable;
    /// use rates_core::schedule::BracketSchedule;
    ///
    /// let old = BracketSchedule::from_pairs([(dec!(0), dec!(10)), (dec!(9325), dec!(15))]).unwrap();
    /// let new = BracketSchedule::from_pairs([(dec!(0), dec!(10)), (dec!(9525), dec!(12))]).unwrap();
    ///
    /// let table = ComparisonTable::build([
    ///     ("2017", old.iter().copied()),
    ///     ("2018", new.iter().copied()),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(table.rows().len(), 3);
    /// assert_eq!(table.rates_at(dec!(9400)), Some(&[dec!(15), dec!(10)][..]));
    /// ```
    ///
    /// # Errors
    ///
    /// See [`merge_breakpoints`].
    pub fn build<L, S>(series: impl IntoIterator<Item = (L, S)>) -> Result<Self, ComparisonError>
    where
        L: Into<String>,
        S: IntoIterator<Item = Bracket>,
    {
        let (labels, streams): (Vec<String>, Vec<S>) =
            series.into_iter().map(|(label, stream)| (label.into(), stream)).unzip();
        let rows = merge_breakpoints(streams)?;

        Ok(Self { labels, rows })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    /// The row whose income range contains `income`, or `None` for negative
    /// income.
    pub fn row_for(
        &self,
        income: Decimal,
    ) -> Option<&ComparisonRow> {
        let idx = self.rows.partition_point(|row| row.start <= income);
        idx.checked_sub(1).map(|i| &self.rows[i])
    }

    pub fn rates_at(
        &self,
        income: Decimal,
    ) -> Option<&[Decimal]> {
        self.row_for(income).map(|row| row.rates.as_slice())
    }
}

struct Cursor<I: Iterator<Item = Bracket>> {
    threshold: Decimal,
    rate: Decimal,
    rest: Peekable<I>,
}

/// K-way merge of ordered breakpoint streams.
///
/// From the current row start, the next row ends at the smallest upcoming
/// threshold among all streams. Every stream whose next threshold equals it
/// advances. Once no stream has an upcoming threshold, a final open-ended
/// row is emitted.
///
/// # Errors
///
/// * [`ComparisonError::NoSeries`] with no streams at all.
/// * [`ComparisonError::EmptySeries`] for a stream without brackets.
/// * [`ComparisonError::NotAnchored`] for a stream not starting at zero.
/// * [`ComparisonError::NonIncreasing`] for a stream whose thresholds do not
///   strictly increase.
pub fn merge_breakpoints<S>(series: Vec<S>) -> Result<Vec<ComparisonRow>, ComparisonError>
where
    S: IntoIterator<Item = Bracket>,
{
    if series.is_empty() {
        return Err(ComparisonError::NoSeries);
    }

    let mut cursors = series
        .into_iter()
        .enumerate()
        .map(|(index, stream)| {
            let mut rest = stream.into_iter().peekable();
            let first = rest.next().ok_or(ComparisonError::EmptySeries(index))?;
            if !first.threshold.is_zero() {
                return Err(ComparisonError::NotAnchored {
                    series: index,
                    threshold: first.threshold,
                });
            }
            Ok(Cursor {
                threshold: first.threshold,
                rate: first.rate,
                rest,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::new();
    let mut start = Decimal::ZERO;

    loop {
        let mut end: Option<Decimal> = None;
        for (index, cursor) in cursors.iter_mut().enumerate() {
            let Some(next) = cursor.rest.peek() else {
                continue;
            };
            if next.threshold <= cursor.threshold {
                return Err(ComparisonError::NonIncreasing {
                    series: index,
                    previous: cursor.threshold,
                    threshold: next.threshold,
                });
            }
            end = Some(end.map_or(next.threshold, |e| e.min(next.threshold)));
        }

        let rates = cursors.iter().map(|c| c.rate).collect();
        rows.push(ComparisonRow { start, end, rates });

        let Some(end) = end else {
            return Ok(rows);
        };

        for cursor in &mut cursors {
            if let Some(next) = cursor.rest.next_if(|b| b.threshold == end) {
                cursor.threshold = next.threshold;
                cursor.rate = next.rate;
            }
        }
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::schedule::BracketSchedule;

    fn brackets(pairs: &[(Decimal, Decimal)]) -> Vec<Bracket> {
        pairs.iter().copied().map(Bracket::from).collect()
    }

    fn row(
        start: Decimal,
        end: Option<Decimal>,
        rates: &[Decimal],
    ) -> ComparisonRow {
        ComparisonRow {
            start,
            end,
            rates: rates.to_vec(),
        }
    }

    // =========================================================================
    // merge_breakpoints tests
    // =========================================================================

    #[test]
    fn merge_interleaves_breakpoints_of_all_series() {
        let a = brackets(&[(dec!(0), dec!(10)), (dec!(100), dec!(20))]);
        let b = brackets(&[(dec!(0), dec!(0)), (dec!(50), dec!(5)), (dec!(100), dec!(7))]);
        let c = brackets(&[(dec!(0), dec!(1))]);

        let rows = merge_breakpoints(vec![a, b, c]).unwrap();

        assert_eq!(
            rows,
            vec![
                row(dec!(0), Some(dec!(50)), &[dec!(10), dec!(0), dec!(1)]),
                row(dec!(50), Some(dec!(100)), &[dec!(10), dec!(5), dec!(1)]),
                row(dec!(100), None, &[dec!(20), dec!(7), dec!(1)]),
            ]
        );
    }

    #[test]
    fn single_flat_series_is_one_open_row() {
        let rows = merge_breakpoints(vec![brackets(&[(dec!(0), dec!(0))])]).unwrap();

        assert_eq!(rows, vec![row(dec!(0), None, &[dec!(0)])]);
    }

    #[test]
    fn merge_rejects_bad_streams() {
        assert_eq!(
            merge_breakpoints(Vec::<Vec<Bracket>>::new()),
            Err(ComparisonError::NoSeries)
        );
        assert_eq!(
            merge_breakpoints(vec![brackets(&[(dec!(0), dec!(0))]), vec![]]),
            Err(ComparisonError::EmptySeries(1))
        );
        assert_eq!(
            merge_breakpoints(vec![brackets(&[(dec!(10400), dec!(10))])]),
            Err(ComparisonError::NotAnchored {
                series: 0,
                threshold: dec!(10400),
            })
        );
        assert_eq!(
            merge_breakpoints(vec![brackets(&[
                (dec!(0), dec!(0)),
                (dec!(500), dec!(10)),
                (dec!(500), dec!(20)),
            ])]),
            Err(ComparisonError::NonIncreasing {
                series: 0,
                previous: dec!(500),
                threshold: dec!(500),
            })
        );
    }

    // =========================================================================
    // ComparisonTable tests
    // =========================================================================

    #[test]
    fn table_keeps_labels_and_samples_rows() {
        let old =
            BracketSchedule::from_pairs([(dec!(0), dec!(0)), (dec!(10400), dec!(10))]).unwrap();
        let new =
            BracketSchedule::from_pairs([(dec!(0), dec!(0)), (dec!(12000), dec!(10))]).unwrap();

        let table =
            ComparisonTable::build([("2017", old.iter().copied()), ("2018", new.iter().copied())])
                .unwrap();

        assert_eq!(table.labels(), &["2017".to_string(), "2018".to_string()]);
        assert_eq!(table.rates_at(dec!(11000)), Some(&[dec!(10), dec!(0)][..]));
        assert_eq!(table.rates_at(dec!(-1)), None);
        assert!(table.row_for(dec!(12000)).unwrap().contains(dec!(1000000)));
    }

    // =========================================================================
    // property tests
    // =========================================================================

    fn arb_schedule() -> impl Strategy<Value = BracketSchedule> {
        (prop::collection::btree_map(1u32..40_000, -50i32..100, 0..6), -50i32..100).prop_map(
            |(steps, first_rate)| {
                let pairs = std::iter::once((Decimal::ZERO, Decimal::from(first_rate)))
                    .chain(steps.into_iter().map(|(t, r)| (Decimal::from(t), Decimal::from(r))));
                BracketSchedule::from_pairs(pairs).unwrap()
            },
        )
    }

    proptest! {
        #[test]
        fn rows_tile_income_and_match_direct_sampling(
            schedules in prop::collection::vec(arb_schedule(), 1..5),
        ) {
            let table = ComparisonTable::build(
                schedules.iter().enumerate().map(|(i, s)| (i.to_string(), s.iter().copied())),
            )
            .unwrap();
            let rows = table.rows();

            prop_assert_eq!(rows[0].start, Decimal::ZERO);
            prop_assert_eq!(rows[rows.len() - 1].end, None);
            for pair in rows.windows(2) {
                prop_assert_eq!(pair[0].end, Some(pair[1].start));
                prop_assert!(pair[0].start < pair[1].start);
            }
            for row in rows {
                for (schedule, rate) in schedules.iter().zip(&row.rates) {
                    prop_assert_eq!(schedule.rate_at(row.start), *rate);
                }
            }
            for schedule in &schedules {
                for threshold in schedule.thresholds() {
                    prop_assert!(rows.iter().any(|row| row.start == threshold));
                }
            }
        }
    }
}
