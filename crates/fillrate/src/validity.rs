//! The per-cell validity predicate.

use std::collections::BTreeSet;

/// Literal values that count as missing for one column.
pub type InvalidValues = BTreeSet<String>;

/// Returns true if `cell` holds a usable value.
///
/// The empty string is always invalid. Any other value is invalid only when it
/// exactly matches one of `invalid_values`; no trimming or case folding is done
/// here, so normalization must already have happened during tokenization.
pub fn is_valid(cell: &str, invalid_values: &InvalidValues) -> bool {
    !cell.is_empty() && !invalid_values.contains(cell)
}

/// [`is_valid`] for a raw cell.
///
/// Invalid values are text, so a cell that is not UTF-8 never matches one and
/// is valid whenever it is non-empty.
pub fn is_valid_bytes(cell: &[u8], invalid_values: &InvalidValues) -> bool {
    match std::str::from_utf8(cell) {
        Ok(text) => is_valid(text, invalid_values),
        Err(_) => !cell.is_empty(),
    }
}
