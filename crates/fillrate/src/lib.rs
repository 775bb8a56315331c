//! Fillrate: streaming field-completeness checks for delimited files.
//!
//! A check is a set of *combinations*, each an AND of OR-groups over columns.
//! `1:2:3/4` asks for rows where columns 1 and 2 are filled in and at least
//! one of columns 3 or 4 is. A cell counts as filled in when it is non-empty
//! and not one of the column's configured invalid values (`NA`, `-`, ...).
//!
//! The file is read once; every combination is evaluated per row while a
//! progress line is drawn from a second thread.
//!
//! # Example
//!
//! ```no_run
//! use fillrate::{ConfigurationBuilder, Fillrate};
//!
//! let config = ConfigurationBuilder::open("patients.csv", None)?
//!     .invalid_values_from_str("3:NA:unknown")?
//!     .combinations_from_expression("1:2, 1:3/4")?
//!     .build()?;
//!
//! let report = Fillrate::new(config).run()?;
//! for result in &report.results {
//!     println!("[{}] {:.2}%", result.combination, result.percentage());
//! }
//! # Ok::<(), fillrate::FillrateError>(())
//! ```

pub mod combination;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod report;
pub mod schema;
pub mod validity;

mod fillrate;

pub use crate::fillrate::Fillrate;
pub use combination::{Combination, CombinationParser, CombinationSet, Disjunction};
pub use config::{Configuration, ConfigurationBuilder, SessionFile};
pub use engine::{ProgressConfig, Tally};
pub use error::{FillrateError, Result};
pub use input::{DataSource, SourceMetadata};
pub use report::{CombinationResult, CompletenessReport};
pub use schema::{ColumnDefinition, ColumnNumber, ColumnOffset, Columns};
pub use validity::is_valid;
