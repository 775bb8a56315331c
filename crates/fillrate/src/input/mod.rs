//! Data file access.

mod reader;
mod source;

pub use reader::{detect_delimiter, DataSource, RowReader};
pub use source::SourceMetadata;
