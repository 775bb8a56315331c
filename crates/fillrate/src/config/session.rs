//! Session files - save/load a configuration as JSON.
//!
//! Combinations are stored with one-based column numbers. Two shapes are
//! accepted when loading:
//!
//! ```text
//! [1, 2, 3]          every listed column required (older files)
//! [[1], [2, 3]]      AND of OR-groups; a bare number is a one-column group
//! ```
//!
//! Saving always writes the nested shape.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::combination::{Combination, CombinationSet, Disjunction};
use crate::error::{FillrateError, Result};
use crate::input::DataSource;
use crate::schema::{ColumnNumber, ColumnOffset};

use super::{parse_delimiter, Configuration, ConfigurationBuilder};

/// Base name for generated session file names.
const DEFAULT_BASE_NAME: &str = "fillrate";

/// One column entry in a session file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionColumn {
    pub field_number: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub invalid_values: Vec<String>,
}

/// A clause inside the nested combination shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersistedClause {
    Single(i64),
    Alternatives(Vec<i64>),
}

/// A stored combination, decoded by shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersistedCombination {
    /// All integers: every column is required.
    Flat(Vec<i64>),
    /// Contains at least one nested array: AND of OR-groups.
    Nested(Vec<PersistedClause>),
    /// Anything else is ignored on load.
    Unrecognized(serde_json::Value),
}

impl PersistedCombination {
    /// Store a combination in the nested shape.
    pub fn from_combination(combination: &Combination) -> Self {
        PersistedCombination::Nested(
            combination
                .clauses()
                .iter()
                .map(|clause| {
                    PersistedClause::Alternatives(
                        clause.offsets().iter().map(|&o| o as i64 + 1).collect(),
                    )
                })
                .collect(),
        )
    }

    /// Decode into a combination. `Ok(None)` means the entry is skipped.
    pub fn to_combination(&self, column_count: usize) -> Result<Option<Combination>> {
        let clauses: Vec<Disjunction> = match self {
            PersistedCombination::Flat(numbers) => numbers
                .iter()
                .map(|&n| to_offset(n, column_count).map(Disjunction::single))
                .collect::<Result<_>>()?,
            PersistedCombination::Nested(clauses) => clauses
                .iter()
                .map(|clause| clause_to_disjunction(clause, column_count))
                .collect::<Result<_>>()?,
            PersistedCombination::Unrecognized(value) => {
                warn!(entry = %value, "ignoring unrecognized combination entry");
                return Ok(None);
            }
        };

        Ok(Combination::new(clauses))
    }
}

fn clause_to_disjunction(clause: &PersistedClause, column_count: usize) -> Result<Disjunction> {
    match clause {
        PersistedClause::Single(n) => to_offset(*n, column_count).map(Disjunction::single),
        PersistedClause::Alternatives(numbers) => {
            let offsets = numbers
                .iter()
                .map(|&n| to_offset(n, column_count))
                .collect::<Result<Vec<_>>>()?;
            Disjunction::new(offsets)
                .ok_or_else(|| FillrateError::config("empty field group in combinations"))
        }
    }
}

fn to_offset(number: i64, column_count: usize) -> Result<ColumnOffset> {
    match ColumnNumber::try_from(number) {
        Ok(n) if (1..=column_count).contains(&n) => Ok(n - 1),
        _ => Err(FillrateError::config(format!(
            "field number {} in combinations is out of range",
            number
        ))),
    }
}

/// The on-disk form of a configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFile {
    /// Path of the data file.
    pub csv_file: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    /// Header row captured when the session was saved.
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub columns: Vec<SessionColumn>,
    #[serde(default)]
    pub combinations: Vec<PersistedCombination>,
}

impl SessionFile {
    /// Capture a finished configuration.
    pub fn from_configuration(config: &Configuration) -> Self {
        let columns = config
            .columns()
            .iter()
            .map(|column| SessionColumn {
                field_number: column.number() as i64,
                name: Some(column.name.clone()),
                // BTreeSet iteration is already sorted
                invalid_values: column.invalid_values.iter().cloned().collect(),
            })
            .collect();

        Self {
            csv_file: config.source().path().to_path_buf(),
            delimiter: Some((config.source().delimiter() as char).to_string()),
            headers: config.headers().to_vec(),
            columns,
            combinations: config
                .combinations()
                .iter()
                .map(PersistedCombination::from_combination)
                .collect(),
        }
    }

    /// Save the session to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    FillrateError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(path).map_err(|e| {
            FillrateError::Persistence(format!(
                "Could not open '{}' for writing: {}",
                path.display(),
                e
            ))
        })?;

        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).map_err(|e| {
            FillrateError::Persistence(format!("Failed to serialize session: {}", e))
        })?;

        debug!(path = %path.display(), "saved session");
        Ok(())
    }

    /// Load a session from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            FillrateError::Persistence(format!(
                "Could not open session file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| {
            FillrateError::Persistence(format!(
                "Failed to parse session file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Rebuild a configuration against the data file as it is now.
    ///
    /// The recorded headers must match the file. Columns default to every
    /// header and combinations to the default combination when absent. A
    /// column's recorded name replaces its header name.
    pub fn into_builder(self) -> Result<ConfigurationBuilder> {
        if self.csv_file.as_os_str().is_empty() {
            return Err(FillrateError::config("session file is missing 'csv_file'"));
        }

        let delimiter = self.delimiter.as_deref().map(parse_delimiter).transpose()?;
        let source = DataSource::new(&self.csv_file, delimiter)?;
        let headers = source.headers()?;

        if !self.headers.is_empty() && self.headers != headers {
            return Err(FillrateError::config(
                "headers in session file do not match the data file",
            ));
        }

        let column_count = headers.len();
        let mut builder = ConfigurationBuilder::with_headers(source, headers);

        if !self.columns.is_empty() {
            let numbers = self
                .columns
                .iter()
                .map(|column| match ColumnNumber::try_from(column.field_number) {
                    Ok(n) if (1..=column_count).contains(&n) => Ok(n),
                    _ => Err(FillrateError::config(format!(
                        "column field_number {} is out of range for the data file headers",
                        column.field_number
                    ))),
                })
                .collect::<Result<Vec<_>>>()?;
            builder = builder.select(&numbers)?;

            for (column, number) in self.columns.into_iter().zip(numbers) {
                if let Some(name) = column.name {
                    builder = builder.rename(number, name)?;
                }
                builder = builder.invalid_values(number, column.invalid_values)?;
            }
        }

        let mut combinations = CombinationSet::new();
        for entry in &self.combinations {
            if let Some(combination) = entry.to_combination(column_count)? {
                combinations.push(combination);
            }
        }
        if !combinations.is_empty() {
            builder = builder.combinations(combinations)?;
        }

        Ok(builder)
    }

    /// Load and build in one step.
    pub fn into_configuration(self) -> Result<Configuration> {
        self.into_builder()?.build()
    }
}

/// A timestamped default file name, e.g. `fillrate_20240101_120000.json`.
pub fn default_session_file_name() -> String {
    format!(
        "{}_{}.json",
        DEFAULT_BASE_NAME,
        Local::now().format("%Y%m%d_%H%M%S")
    )
}

/// Append `.json` unless the name already ends with it (any case).
pub fn with_json_extension(path: impl Into<PathBuf>) -> PathBuf {
    let mut path = path.into();
    let has_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !has_json {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".json");
        path.set_file_name(name);
    }
    path
}
