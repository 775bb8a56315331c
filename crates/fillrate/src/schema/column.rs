//! Column definitions and the selected column set.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::validity::{self, InvalidValues};

/// Zero-based position of a field within a row.
pub type ColumnOffset = usize;

/// One-based column identifier shown to users (`offset + 1`).
pub type ColumnNumber = usize;

/// A selected column and the values that count as missing for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Position of the column in each row.
    pub offset: ColumnOffset,
    /// Header name.
    pub name: String,
    /// Values that mark an otherwise non-empty cell as missing.
    #[serde(default, skip_serializing_if = "InvalidValues::is_empty")]
    pub invalid_values: InvalidValues,
}

impl ColumnDefinition {
    /// Create a column with no invalid-value overrides.
    pub fn new(offset: ColumnOffset, name: impl Into<String>) -> Self {
        Self {
            offset,
            name: name.into(),
            invalid_values: InvalidValues::new(),
        }
    }

    /// Add invalid values to this column.
    pub fn with_invalid_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invalid_values.extend(values.into_iter().map(Into::into));
        self
    }

    /// The one-based number of this column.
    pub fn number(&self) -> ColumnNumber {
        self.offset + 1
    }

    /// Check a single cell against this column's contract.
    pub fn is_valid(&self, cell: &str) -> bool {
        validity::is_valid(cell, &self.invalid_values)
    }
}

/// The selected columns, keyed by column number in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Columns {
    by_number: IndexMap<ColumnNumber, ColumnDefinition>,
}

impl Columns {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select every header.
    pub fn all(headers: &[String]) -> Self {
        headers
            .iter()
            .enumerate()
            .map(|(offset, name)| ColumnDefinition::new(offset, name.as_str()))
            .collect()
    }

    /// Add or replace a column.
    pub fn insert(&mut self, column: ColumnDefinition) {
        self.by_number.insert(column.number(), column);
        self.by_number.sort_keys();
    }

    /// Look up a column by its one-based number.
    pub fn get(&self, number: ColumnNumber) -> Option<&ColumnDefinition> {
        self.by_number.get(&number)
    }

    /// Mutable lookup, used while configuring invalid values.
    pub fn get_mut(&mut self, number: ColumnNumber) -> Option<&mut ColumnDefinition> {
        self.by_number.get_mut(&number)
    }

    /// Look up a column by its zero-based offset.
    pub fn by_offset(&self, offset: ColumnOffset) -> Option<&ColumnDefinition> {
        self.get(offset + 1)
    }

    /// Whether the column number is selected.
    pub fn contains(&self, number: ColumnNumber) -> bool {
        self.by_number.contains_key(&number)
    }

    /// Selected column numbers, ascending.
    pub fn numbers(&self) -> impl Iterator<Item = ColumnNumber> + '_ {
        self.by_number.keys().copied()
    }

    /// Selected columns, ascending by number.
    pub fn iter(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.by_number.values()
    }

    pub fn len(&self) -> usize {
        self.by_number.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_number.is_empty()
    }
}

impl FromIterator<ColumnDefinition> for Columns {
    fn from_iter<T: IntoIterator<Item = ColumnDefinition>>(iter: T) -> Self {
        let mut by_number: IndexMap<ColumnNumber, ColumnDefinition> = iter
            .into_iter()
            .map(|column| (column.number(), column))
            .collect();
        by_number.sort_keys();
        Self { by_number }
    }
}
