//! AND-of-OR column requirements.

use std::fmt;

use crate::schema::{ColumnOffset, Columns};
use crate::validity::{self, InvalidValues};

static NO_INVALID_VALUES: InvalidValues = InvalidValues::new();

/// Field access for one data row.
///
/// Fields are bytes so rows that are not valid UTF-8 are still checked.
/// Implemented for string slices (handy in tests) and for CSV records so the
/// evaluator can check rows without copying them.
pub trait Row {
    /// The field at `offset`, or `None` if the row is too short.
    fn field(&self, offset: ColumnOffset) -> Option<&[u8]>;
}

impl<S: AsRef<[u8]>> Row for [S] {
    fn field(&self, offset: ColumnOffset) -> Option<&[u8]> {
        self.get(offset).map(AsRef::as_ref)
    }
}

impl<S: AsRef<[u8]>> Row for Vec<S> {
    fn field(&self, offset: ColumnOffset) -> Option<&[u8]> {
        self.as_slice().field(offset)
    }
}

impl Row for csv::ByteRecord {
    fn field(&self, offset: ColumnOffset) -> Option<&[u8]> {
        self.get(offset)
    }
}

/// An OR-group: satisfied when any member column holds a valid value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Disjunction {
    offsets: Vec<ColumnOffset>,
}

impl Disjunction {
    /// Build a group from offsets, sorting and deduplicating them.
    ///
    /// Returns `None` for an empty group.
    pub fn new(offsets: impl IntoIterator<Item = ColumnOffset>) -> Option<Self> {
        let mut offsets: Vec<ColumnOffset> = offsets.into_iter().collect();
        if offsets.is_empty() {
            return None;
        }
        offsets.sort_unstable();
        offsets.dedup();
        Some(Self { offsets })
    }

    /// A group with a single required column.
    pub fn single(offset: ColumnOffset) -> Self {
        Self {
            offsets: vec![offset],
        }
    }

    /// Member offsets, ascending.
    pub fn offsets(&self) -> &[ColumnOffset] {
        &self.offsets
    }

    /// Whether at least one member is present and valid in `row`.
    ///
    /// Members past the end of the row count as missing.
    pub fn is_satisfied<R: Row + ?Sized>(&self, row: &R, columns: &Columns) -> bool {
        self.offsets.iter().any(|&offset| {
            let Some(cell) = row.field(offset) else {
                return false;
            };
            let invalid_values = columns
                .by_offset(offset)
                .map_or(&NO_INVALID_VALUES, |column| &column.invalid_values);
            validity::is_valid_bytes(cell, invalid_values)
        })
    }
}

impl fmt::Display for Disjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, offset) in self.offsets.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", offset + 1)?;
        }
        Ok(())
    }
}

/// A rule: satisfied when every clause is satisfied.
///
/// Clause order has no effect on the verdict, so clauses are kept sorted and
/// deduplicated; two combinations over the same sets compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination {
    clauses: Vec<Disjunction>,
}

impl Combination {
    /// Build a combination from its clauses. Returns `None` if there are none.
    pub fn new(clauses: impl IntoIterator<Item = Disjunction>) -> Option<Self> {
        let mut clauses: Vec<Disjunction> = clauses.into_iter().collect();
        if clauses.is_empty() {
            return None;
        }
        clauses.sort();
        clauses.dedup();
        Some(Self { clauses })
    }

    /// The flat form: every listed column is required.
    pub fn from_required(offsets: impl IntoIterator<Item = ColumnOffset>) -> Option<Self> {
        Self::new(offsets.into_iter().map(Disjunction::single))
    }

    pub fn clauses(&self) -> &[Disjunction] {
        &self.clauses
    }

    /// Every offset referenced by any clause.
    pub fn offsets(&self) -> impl Iterator<Item = ColumnOffset> + '_ {
        self.clauses
            .iter()
            .flat_map(|clause| clause.offsets().iter().copied())
    }

    /// Whether no clause offers alternatives.
    pub fn is_flat(&self) -> bool {
        self.clauses.iter().all(|clause| clause.offsets().len() == 1)
    }

    /// Evaluate this combination against a row.
    pub fn is_satisfied<R: Row + ?Sized>(&self, row: &R, columns: &Columns) -> bool {
        satisfied(row, self, columns)
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}

/// Check `row` against `combination`.
///
/// Stops at the first unsatisfied clause, and within a clause at the first
/// valid member.
pub fn satisfied<R: Row + ?Sized>(row: &R, combination: &Combination, columns: &Columns) -> bool {
    combination
        .clauses
        .iter()
        .all(|clause| clause.is_satisfied(row, columns))
}

/// The ordered set of combinations evaluated in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinationSet {
    combinations: Vec<Combination>,
}

impl CombinationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// One combination requiring every selected column, ascending.
    pub fn default_for(columns: &Columns) -> Self {
        Combination::from_required(columns.iter().map(|column| column.offset))
            .into_iter()
            .collect()
    }

    pub fn push(&mut self, combination: Combination) {
        self.combinations.push(combination);
    }

    pub fn get(&self, index: usize) -> Option<&Combination> {
        self.combinations.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Combination> {
        self.combinations.iter()
    }

    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }
}

impl FromIterator<Combination> for CombinationSet {
    fn from_iter<T: IntoIterator<Item = Combination>>(iter: T) -> Self {
        Self {
            combinations: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CombinationSet {
    type Item = &'a Combination;
    type IntoIter = std::slice::Iter<'a, Combination>;

    fn into_iter(self) -> Self::IntoIter {
        self.combinations.iter()
    }
}

impl fmt::Display for CombinationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, combination) in self.combinations.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", combination)?;
        }
        Ok(())
    }
}
