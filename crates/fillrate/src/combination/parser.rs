//! Parser for the compact combination notation.
//!
//! `,` separates independent combinations, `:` separates required clauses and
//! `/` separates alternatives within a clause. Numbers are one-based column
//! numbers, so `1:2:3/4` requires columns 1 and 2 plus either 3 or 4.
//!
//! A malformed segment is dropped as a whole and reported through a
//! [`SegmentDiagnostic`]; the remaining segments are still parsed.

use std::fmt;

use tracing::{debug, warn};

use crate::error::{FillrateError, Result};
use crate::schema::{ColumnNumber, ColumnOffset, Columns};

use super::model::{Combination, CombinationSet, Disjunction};

const COMBINATION_SEPARATOR: char = ',';
const CLAUSE_SEPARATOR: char = ':';
const ALTERNATIVE_SEPARATOR: char = '/';

/// Why a segment was discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    /// A `:` clause was empty (`1::2`, trailing `:`).
    EmptyClause,
    /// A `/` alternative was empty (`1//2`, trailing `/`).
    EmptyAlternative { clause: String },
    /// An alternative was not a number.
    NotANumber { token: String },
    /// The number does not name a header column.
    OutOfRange {
        number: i64,
        column_count: usize,
    },
    /// The column exists but was not selected.
    NotSelected { number: ColumnNumber },
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardReason::EmptyClause => write!(f, "empty field group"),
            DiscardReason::EmptyAlternative { clause } => {
                write!(f, "empty field entry in group '{}'", clause)
            }
            DiscardReason::NotANumber { token } => write!(f, "invalid number '{}'", token),
            DiscardReason::OutOfRange {
                number,
                column_count,
            } => write!(
                f,
                "field {} is out of range (valid range is 1 to {})",
                number, column_count
            ),
            DiscardReason::NotSelected { number } => {
                write!(f, "field {} was not selected", number)
            }
        }
    }
}

/// A discarded segment and the reason it was discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentDiagnostic {
    /// The original comma-separated segment, trimmed.
    pub segment: String,
    pub reason: DiscardReason,
}

impl fmt::Display for SegmentDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipping combination '{}': {}", self.segment, self.reason)
    }
}

/// Result of parsing an expression with at least one valid combination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub combinations: CombinationSet,
    /// Segments that were dropped, in input order.
    pub diagnostics: Vec<SegmentDiagnostic>,
}

/// Parses combination expressions against a column selection.
pub struct CombinationParser<'a> {
    columns: &'a Columns,
    column_count: usize,
}

impl<'a> CombinationParser<'a> {
    /// `column_count` is the number of header columns; `columns` the selection.
    pub fn new(columns: &'a Columns, column_count: usize) -> Self {
        Self {
            columns,
            column_count,
        }
    }

    /// Parse a full expression.
    ///
    /// Returns [`FillrateError::NoExpression`] for blank input so the caller can
    /// substitute [`CombinationSet::default_for`], and a configuration error
    /// when no segment survives.
    pub fn parse(&self, expression: &str) -> Result<ParseOutcome> {
        if expression.trim().is_empty() {
            return Err(FillrateError::NoExpression);
        }

        let mut outcome = ParseOutcome::default();

        for raw_segment in expression.split(COMBINATION_SEPARATOR) {
            let segment = raw_segment.trim();
            if segment.is_empty() {
                continue;
            }

            match self.parse_segment(segment) {
                Ok(combination) => {
                    debug!(segment, combination = %combination, "parsed combination");
                    outcome.combinations.push(combination);
                }
                Err(reason) => {
                    let diagnostic = SegmentDiagnostic {
                        segment: segment.to_string(),
                        reason,
                    };
                    warn!("{}", diagnostic);
                    outcome.diagnostics.push(diagnostic);
                }
            }
        }

        if outcome.combinations.is_empty() {
            return Err(FillrateError::config("no valid combinations provided"));
        }

        Ok(outcome)
    }

    /// Parse one comma-separated segment into a combination.
    pub fn parse_segment(&self, segment: &str) -> std::result::Result<Combination, DiscardReason> {
        let mut clauses = Vec::new();

        for raw_clause in segment.split(CLAUSE_SEPARATOR) {
            let clause = raw_clause.trim();
            if clause.is_empty() {
                return Err(DiscardReason::EmptyClause);
            }
            clauses.push(self.parse_clause(clause)?);
        }

        Combination::new(clauses).ok_or(DiscardReason::EmptyClause)
    }

    fn parse_clause(&self, clause: &str) -> std::result::Result<Disjunction, DiscardReason> {
        let mut offsets = Vec::new();

        for raw_alternative in clause.split(ALTERNATIVE_SEPARATOR) {
            let alternative = raw_alternative.trim();
            if alternative.is_empty() {
                return Err(DiscardReason::EmptyAlternative {
                    clause: clause.to_string(),
                });
            }
            offsets.push(self.resolve(alternative)?);
        }

        Disjunction::new(offsets).ok_or_else(|| DiscardReason::EmptyAlternative {
            clause: clause.to_string(),
        })
    }

    /// Turn a column number token into a selected offset.
    fn resolve(&self, token: &str) -> std::result::Result<ColumnOffset, DiscardReason> {
        let number: i64 = token.parse().map_err(|_| DiscardReason::NotANumber {
            token: token.to_string(),
        })?;

        let out_of_range = DiscardReason::OutOfRange {
            number,
            column_count: self.column_count,
        };
        let number = ColumnNumber::try_from(number).map_err(|_| out_of_range.clone())?;
        if number < 1 || number > self.column_count {
            return Err(out_of_range);
        }

        if !self.columns.contains(number) {
            return Err(DiscardReason::NotSelected { number });
        }

        Ok(number - 1)
    }
}

/// Parse `expression`, falling back to the default combination when it is blank.
pub fn parse_or_default(
    expression: &str,
    columns: &Columns,
    column_count: usize,
) -> Result<ParseOutcome> {
    match CombinationParser::new(columns, column_count).parse(expression) {
        Err(FillrateError::NoExpression) => {
            let combinations = CombinationSet::default_for(columns);
            if combinations.is_empty() {
                return Err(FillrateError::config(
                    "no fields were selected, cannot define combinations",
                ));
            }
            Ok(ParseOutcome {
                combinations,
                diagnostics: Vec::new(),
            })
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDefinition;

    fn selected(numbers: &[ColumnNumber]) -> Columns {
        numbers
            .iter()
            .map(|&n| ColumnDefinition::new(n - 1, format!("col{}", n)))
            .collect()
    }

    fn offsets(combination: &Combination) -> Vec<Vec<ColumnOffset>> {
        combination
            .clauses()
            .iter()
            .map(|clause| clause.offsets().to_vec())
            .collect()
    }

    #[test]
    fn test_and_of_or() {
        let columns = selected(&[1, 2, 3, 4]);
        let outcome = CombinationParser::new(&columns, 4).parse("1:2:3/4").unwrap();

        assert_eq!(outcome.combinations.len(), 1);
        let combination = outcome.combinations.get(0).unwrap();
        assert_eq!(offsets(combination), vec![vec![0], vec![1], vec![2, 3]]);
        assert_eq!(combination.to_string(), "1:2:3/4");
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_multiple_combinations() {
        let columns = selected(&[1, 2, 3]);
        let outcome = CombinationParser::new(&columns, 3).parse("1,2:3").unwrap();

        assert_eq!(outcome.combinations.len(), 2);
        assert_eq!(offsets(outcome.combinations.get(0).unwrap()), vec![vec![0]]);
        assert_eq!(
            offsets(outcome.combinations.get(1).unwrap()),
            vec![vec![1], vec![2]]
        );
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let columns = selected(&[1, 3, 4, 5]);
        let outcome = CombinationParser::new(&columns, 5)
            .parse(" 1 , 3 / 4 : 5 ")
            .unwrap();

        assert_eq!(outcome.combinations.to_string(), "1,3/4:5");
    }

    #[test]
    fn test_duplicate_alternatives_collapse() {
        let columns = selected(&[1, 2]);
        let outcome = CombinationParser::new(&columns, 2).parse("2/1/2").unwrap();
        assert_eq!(offsets(outcome.combinations.get(0).unwrap()), vec![vec![0, 1]]);
    }

    #[test]
    fn test_empty_clause_discards_only_its_segment() {
        let columns = selected(&[1, 2, 3]);
        let outcome = CombinationParser::new(&columns, 3).parse("1::2,3").unwrap();

        assert_eq!(outcome.combinations.to_string(), "3");
        assert_eq!(
            outcome.diagnostics,
            vec![SegmentDiagnostic {
                segment: "1::2".to_string(),
                reason: DiscardReason::EmptyClause,
            }]
        );
    }

    #[test]
    fn test_trailing_separators_discard() {
        let columns = selected(&[1, 2]);
        let parser = CombinationParser::new(&columns, 2);

        assert_eq!(parser.parse_segment("1:"), Err(DiscardReason::EmptyClause));
        assert_eq!(
            parser.parse_segment("1/"),
            Err(DiscardReason::EmptyAlternative {
                clause: "1/".to_string()
            })
        );
    }

    #[test]
    fn test_bad_tokens_discard_segment() {
        let columns = selected(&[1, 2]);
        let parser = CombinationParser::new(&columns, 3);

        assert_eq!(
            parser.parse_segment("1:x"),
            Err(DiscardReason::NotANumber {
                token: "x".to_string()
            })
        );
        assert_eq!(
            parser.parse_segment("0"),
            Err(DiscardReason::OutOfRange {
                number: 0,
                column_count: 3
            })
        );
        assert_eq!(
            parser.parse_segment("-2"),
            Err(DiscardReason::OutOfRange {
                number: -2,
                column_count: 3
            })
        );
        assert_eq!(
            parser.parse_segment("1/4"),
            Err(DiscardReason::OutOfRange {
                number: 4,
                column_count: 3
            })
        );
        assert_eq!(
            parser.parse_segment("1:3"),
            Err(DiscardReason::NotSelected { number: 3 })
        );
    }

    #[test]
    fn test_no_valid_combinations_is_an_error() {
        let columns = selected(&[1]);
        let err = CombinationParser::new(&columns, 1).parse("2,1::1").unwrap_err();
        assert!(matches!(err, FillrateError::Config(_)));
    }

    #[test]
    fn test_blank_expression_signals_no_input() {
        let columns = selected(&[1]);
        let parser = CombinationParser::new(&columns, 1);

        assert!(matches!(parser.parse(""), Err(FillrateError::NoExpression)));
        assert!(matches!(parser.parse("  \t"), Err(FillrateError::NoExpression)));
    }

    #[test]
    fn test_only_commas_is_not_blank() {
        let columns = selected(&[1]);
        let err = CombinationParser::new(&columns, 1).parse(" , ,").unwrap_err();
        assert!(matches!(err, FillrateError::Config(_)));
    }

    #[test]
    fn test_parse_or_default() {
        let columns = selected(&[1, 3, 5]);
        let outcome = parse_or_default("   ", &columns, 5).unwrap();

        assert_eq!(outcome.combinations.len(), 1);
        assert_eq!(
            offsets(outcome.combinations.get(0).unwrap()),
            vec![vec![0], vec![2], vec![4]]
        );
    }

    #[test]
    fn test_parse_or_default_without_selection() {
        let err = parse_or_default("", &Columns::new(), 5).unwrap_err();
        assert!(matches!(err, FillrateError::Config(_)));
    }

    #[test]
    fn test_flat_and_nested_forms_mix() {
        let columns = selected(&[1, 2, 3]);
        let outcome = CombinationParser::new(&columns, 3).parse("1:2,1:2/3").unwrap();

        assert!(outcome.combinations.get(0).unwrap().is_flat());
        assert!(!outcome.combinations.get(1).unwrap().is_flat());
    }
}
