//! Column selection types.

mod column;

pub use column::{ColumnDefinition, ColumnNumber, ColumnOffset, Columns};
