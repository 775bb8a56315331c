//! Parsers for the command-line field selection and invalid-value strings.

use std::collections::BTreeSet;

use crate::error::{FillrateError, Result};
use crate::schema::{ColumnNumber, Columns};

/// Parse a comma-separated list of column numbers (`1,2,5`).
///
/// Blank entries are ignored. Returns the numbers ascending and deduplicated.
pub fn parse_field_selection(text: &str, column_count: usize) -> Result<Vec<ColumnNumber>> {
    let mut selected = BTreeSet::new();

    for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let number: ColumnNumber = token.parse().map_err(|_| {
            FillrateError::config(format!("invalid field number '{}'", token))
        })?;
        if number < 1 || number > column_count {
            return Err(FillrateError::config(format!(
                "field {} is out of range, valid range is 1 to {}",
                number, column_count
            )));
        }
        selected.insert(number);
    }

    if selected.is_empty() {
        return Err(FillrateError::config("no valid field numbers were detected"));
    }

    Ok(selected.into_iter().collect())
}

/// Parse the invalid-value mapping (`2:NA:-:5:unknown`).
///
/// Tokens are separated by `:`. A token naming a selected column switches the
/// column that following values apply to; any other token is an invalid value
/// for the current column.
pub fn parse_invalid_values(text: &str, columns: &Columns) -> Result<Vec<(ColumnNumber, String)>> {
    let mut current: Option<ColumnNumber> = None;
    let mut assignments = Vec::new();

    for token in text.split(':').map(str::trim).filter(|t| !t.is_empty()) {
        if let Ok(number) = token.parse::<ColumnNumber>() {
            if columns.contains(number) {
                current = Some(number);
                continue;
            }
        }

        let Some(number) = current else {
            return Err(FillrateError::config(format!(
                "invalid value '{}' provided without specifying a field first",
                token
            )));
        };
        assignments.push((number, token.to_string()));
    }

    Ok(assignments)
}
