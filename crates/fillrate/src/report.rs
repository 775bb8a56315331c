//! Completeness results and their machine-readable renderings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::combination::CombinationSet;
use crate::engine::Tally;
use crate::input::SourceMetadata;

/// Result for a single combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationResult {
    /// The combination in `1:3/4` notation.
    pub combination: String,
    pub valid_rows: u64,
    pub total_rows: u64,
    /// Fraction of rows satisfying the combination (0.0 when there are no rows).
    pub completeness: f64,
}

impl CombinationResult {
    /// Completeness as a percentage.
    pub fn percentage(&self) -> f64 {
        self.completeness * 100.0
    }
}

/// Results of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessReport {
    /// Version of the tool that produced the report.
    pub version: String,
    pub checked_at: DateTime<Utc>,
    pub source: SourceMetadata,
    pub total_rows: u64,
    pub results: Vec<CombinationResult>,
}

impl CompletenessReport {
    /// Pair each combination with its count.
    pub fn new(source: SourceMetadata, combinations: &CombinationSet, tally: &Tally) -> Self {
        let results = combinations
            .iter()
            .enumerate()
            .map(|(index, combination)| CombinationResult {
                combination: combination.to_string(),
                valid_rows: tally.valid_counts.get(index).copied().unwrap_or(0),
                total_rows: tally.total_rows,
                completeness: tally.completeness(index),
            })
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            checked_at: Utc::now(),
            source,
            total_rows: tally.total_rows,
            results,
        }
    }

    /// Whether the file had any data rows.
    pub fn has_data(&self) -> bool {
        self.total_rows > 0
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Completeness fractions separated by commas, e.g. `0.50,1.00`.
    pub fn to_csv_line(&self) -> String {
        self.results
            .iter()
            .map(|r| format!("{:.2}", r.completeness))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// `combination=fraction` pairs separated by spaces, e.g. `1:2=0.50 3=1.00`.
    pub fn to_key_value(&self) -> String {
        self.results
            .iter()
            .map(|r| format!("{}={:.2}", r.combination, r.completeness))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
