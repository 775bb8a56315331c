//! Run configuration.
//!
//! A [`Configuration`] is assembled once by [`ConfigurationBuilder`] and is
//! read-only afterwards; the evaluator only ever sees it by reference.

mod selection;
mod session;

pub use selection::{parse_field_selection, parse_invalid_values};
pub use session::{
    default_session_file_name, with_json_extension, PersistedClause, PersistedCombination,
    SessionColumn, SessionFile,
};

use std::path::Path;

use tracing::debug;

use crate::combination::{
    parse_or_default, Combination, CombinationSet, SegmentDiagnostic,
};
use crate::error::{FillrateError, Result};
use crate::input::DataSource;
use crate::schema::{ColumnDefinition, ColumnNumber, Columns};

/// Parse a delimiter given as a single character, `tab` or `\t`.
pub fn parse_delimiter(text: &str) -> Result<u8> {
    match text {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => match text.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(FillrateError::config(format!(
                "delimiter must be a single ASCII character, got '{}'",
                text
            ))),
        },
    }
}

/// Finalized settings for one run.
#[derive(Debug, Clone)]
pub struct Configuration {
    source: DataSource,
    headers: Vec<String>,
    columns: Columns,
    combinations: CombinationSet,
}

impl Configuration {
    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn combinations(&self) -> &CombinationSet {
        &self.combinations
    }
}

/// Builds a [`Configuration`] step by step.
#[derive(Debug, Clone)]
pub struct ConfigurationBuilder {
    source: DataSource,
    headers: Vec<String>,
    columns: Columns,
    combinations: CombinationSet,
    diagnostics: Vec<SegmentDiagnostic>,
}

impl ConfigurationBuilder {
    /// Start from a data file, reading its header. Every column starts selected.
    pub fn open(path: impl AsRef<Path>, delimiter: Option<u8>) -> Result<Self> {
        let source = DataSource::new(path, delimiter)?;
        let headers = source.headers()?;
        Ok(Self::with_headers(source, headers))
    }

    /// Start from an already-read header.
    pub fn with_headers(source: DataSource, headers: Vec<String>) -> Self {
        let columns = Columns::all(&headers);
        Self {
            source,
            headers,
            columns,
            combinations: CombinationSet::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Segments dropped while parsing combination expressions.
    pub fn diagnostics(&self) -> &[SegmentDiagnostic] {
        &self.diagnostics
    }

    /// Select every header column.
    pub fn select_all(mut self) -> Self {
        self.columns = Columns::all(&self.headers);
        self
    }

    /// Replace the selection with the given column numbers.
    ///
    /// Clears any combinations configured so far.
    pub fn select(mut self, numbers: &[ColumnNumber]) -> Result<Self> {
        let mut columns = Columns::new();
        for &number in numbers {
            let name = number
                .checked_sub(1)
                .and_then(|offset| self.headers.get(offset))
                .ok_or_else(|| {
                    FillrateError::config(format!(
                        "field {} is out of range, valid range is 1 to {}",
                        number,
                        self.headers.len()
                    ))
                })?;
            columns.insert(ColumnDefinition::new(number - 1, name.as_str()));
        }
        if columns.is_empty() {
            return Err(FillrateError::config("no fields were selected"));
        }

        debug!(selected = columns.len(), "selected fields");
        self.columns = columns;
        self.combinations = CombinationSet::new();
        Ok(self)
    }

    /// Select columns from a `1,2,5` style list.
    pub fn select_fields(self, text: &str) -> Result<Self> {
        let numbers = parse_field_selection(text, self.headers.len())?;
        self.select(&numbers)
    }

    /// Mark values as missing for one selected column.
    pub fn invalid_values<I, S>(mut self, number: ColumnNumber, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let column = self.columns.get_mut(number).ok_or_else(|| {
            FillrateError::config(format!("field {} not in selected columns", number))
        })?;
        column
            .invalid_values
            .extend(values.into_iter().map(Into::into));
        Ok(self)
    }

    /// Give a selected column a display name other than its header.
    pub fn rename(mut self, number: ColumnNumber, name: impl Into<String>) -> Result<Self> {
        let column = self.columns.get_mut(number).ok_or_else(|| {
            FillrateError::config(format!("field {} not in selected columns", number))
        })?;
        column.name = name.into();
        Ok(self)
    }

    /// Apply a `field:value:value:field:value` mapping.
    pub fn invalid_values_from_str(mut self, text: &str) -> Result<Self> {
        for (number, value) in parse_invalid_values(text, &self.columns)? {
            self = self.invalid_values(number, [value])?;
        }
        Ok(self)
    }

    /// Parse combinations from an expression; blank text yields the default.
    pub fn combinations_from_expression(mut self, expression: &str) -> Result<Self> {
        let outcome = parse_or_default(expression, &self.columns, self.headers.len())?;
        self.combinations = outcome.combinations;
        self.diagnostics.extend(outcome.diagnostics);
        Ok(self)
    }

    /// Use prebuilt combinations. Every referenced column must be selected.
    pub fn combinations(mut self, combinations: CombinationSet) -> Result<Self> {
        for combination in &combinations {
            self.check_selected(combination)?;
        }
        self.combinations = combinations;
        Ok(self)
    }

    fn check_selected(&self, combination: &Combination) -> Result<()> {
        match combination
            .offsets()
            .find(|&offset| self.columns.by_offset(offset).is_none())
        {
            Some(offset) => Err(FillrateError::config(format!(
                "combination '{}' references field {} which is not selected",
                combination,
                offset + 1
            ))),
            None => Ok(()),
        }
    }

    /// Finish configuration.
    ///
    /// Without explicit combinations, all selected columns are required together.
    pub fn build(self) -> Result<Configuration> {
        if self.columns.is_empty() {
            return Err(FillrateError::config("no fields were selected"));
        }

        let combinations = if self.combinations.is_empty() {
            CombinationSet::default_for(&self.columns)
        } else {
            self.combinations
        };

        debug!(
            columns = self.columns.len(),
            combinations = combinations.len(),
            "configuration built"
        );

        Ok(Configuration {
            source: self.source,
            headers: self.headers,
            columns: self.columns,
            combinations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
        assert!(parse_delimiter(",,").is_err());
        assert!(parse_delimiter("").is_err());
    }

    #[test]
    fn test_default_configuration() {
        let file = create_test_file("a,b,c\n1,2,3\n");
        let config = ConfigurationBuilder::open(file.path(), None)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.columns().len(), 3);
        assert_eq!(config.combinations().to_string(), "1:2:3");
    }

    #[test]
    fn test_selection_then_expression() {
        let file = create_test_file("a,b,c,d,e\n");
        let config = ConfigurationBuilder::open(file.path(), None)
            .unwrap()
            .select_fields("1,3,5")
            .unwrap()
            .invalid_values_from_str("3:NA")
            .unwrap()
            .combinations_from_expression("1:3/5, 2")
            .unwrap();

        assert_eq!(config.diagnostics().len(), 1);
        let config = config.build().unwrap();
        assert_eq!(config.combinations().to_string(), "1:3/5");
        assert!(config.columns().get(3).unwrap().invalid_values.contains("NA"));
    }

    #[test]
    fn test_blank_expression_uses_selection() {
        let file = create_test_file("a,b,c,d,e\n");
        let config = ConfigurationBuilder::open(file.path(), None)
            .unwrap()
            .select(&[5, 1, 3])
            .unwrap()
            .combinations_from_expression("")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.combinations().to_string(), "1:3:5");
    }

    #[test]
    fn test_prebuilt_combination_must_be_selected() {
        let file = create_test_file("a,b\n");
        let builder = ConfigurationBuilder::open(file.path(), None)
            .unwrap()
            .select(&[1])
            .unwrap();
        let set: CombinationSet = Combination::from_required([1]).into_iter().collect();

        assert!(matches!(builder.combinations(set), Err(FillrateError::Config(_))));
    }

    #[test]
    fn test_invalid_values_for_unselected_field() {
        let file = create_test_file("a,b\n");
        let builder = ConfigurationBuilder::open(file.path(), None)
            .unwrap()
            .select(&[1])
            .unwrap();

        assert!(builder.invalid_values(2, ["NA"]).is_err());
    }

    #[test]
    fn test_select_out_of_range() {
        let file = create_test_file("a,b\n");
        let builder = ConfigurationBuilder::open(file.path(), None).unwrap();

        assert!(builder.clone().select(&[3]).is_err());
        assert!(builder.clone().select(&[0]).is_err());
        assert!(builder.select(&[]).is_err());
    }
}
