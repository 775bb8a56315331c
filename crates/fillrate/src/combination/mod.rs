//! Combination model and expression parser.

mod model;
mod parser;

pub use model::{satisfied, Combination, CombinationSet, Disjunction, Row};
pub use parser::{parse_or_default, CombinationParser, DiscardReason, ParseOutcome, SegmentDiagnostic};
