//! Single-pass row evaluation.

use std::io::Read;

use csv::ByteRecord;
use tracing::{debug, trace};

use crate::combination::CombinationSet;
use crate::config::Configuration;
use crate::error::Result;
use crate::input::RowReader;
use crate::schema::Columns;

use super::progress::ProgressState;

/// Per-combination counts produced by one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    /// `valid_counts[i]` is the number of rows satisfying combination `i`.
    pub valid_counts: Vec<u64>,
    /// Data rows read, excluding the header.
    pub total_rows: u64,
}

impl Tally {
    /// Zeroed counts for `combinations` combinations.
    pub fn new(combinations: usize) -> Self {
        Self {
            valid_counts: vec![0; combinations],
            total_rows: 0,
        }
    }

    /// Fraction of rows satisfying combination `index`, 0.0 when there are no rows.
    pub fn completeness(&self, index: usize) -> f64 {
        match self.valid_counts.get(index) {
            Some(&valid) if self.total_rows > 0 => valid as f64 / self.total_rows as f64,
            _ => 0.0,
        }
    }
}

/// Evaluates every combination against each row of a stream.
pub struct Evaluator<'a> {
    columns: &'a Columns,
    combinations: &'a CombinationSet,
}

impl<'a> Evaluator<'a> {
    pub fn new(columns: &'a Columns, combinations: &'a CombinationSet) -> Self {
        Self {
            columns,
            combinations,
        }
    }

    pub fn from_configuration(config: &'a Configuration) -> Self {
        Self::new(config.columns(), config.combinations())
    }

    /// Read `rows` to the end and count satisfying rows.
    ///
    /// The processed-row count in `progress` is updated after every row. Rows
    /// shorter than a referenced column are counted, with the missing fields
    /// treated as invalid.
    pub fn run<R: Read>(&self, rows: &mut RowReader<R>, progress: &ProgressState) -> Result<Tally> {
        let mut tally = Tally::new(self.combinations.len());
        let mut record = ByteRecord::new();

        while rows.read_row(&mut record)? {
            for (count, combination) in tally.valid_counts.iter_mut().zip(self.combinations) {
                if combination.is_satisfied(&record, self.columns) {
                    *count += 1;
                }
            }

            tally.total_rows += 1;
            progress.record(tally.total_rows);
            trace!(row = tally.total_rows, fields = record.len(), "evaluated row");
        }

        debug!(rows = tally.total_rows, "evaluation finished");
        Ok(tally)
    }
}
