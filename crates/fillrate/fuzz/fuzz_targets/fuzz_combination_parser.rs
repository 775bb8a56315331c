//! Fuzz target for the combination expression parser.
//!
//! Any expression either fails cleanly or yields combinations that only
//! reference selected columns and format back to an expression that parses
//! to the same combinations.

#![no_main]

use fillrate::{ColumnDefinition, CombinationParser, Columns};
use libfuzzer_sys::fuzz_target;

const COLUMN_COUNT: usize = 8;

fuzz_target!(|data: &[u8]| {
    let Ok(expression) = std::str::from_utf8(data) else {
        return;
    };
    if expression.len() > 10_000 {
        return;
    }

    // Every other column selected
    let columns: Columns = (0..COLUMN_COUNT)
        .step_by(2)
        .map(|offset| ColumnDefinition::new(offset, format!("c{}", offset + 1)))
        .collect();
    let parser = CombinationParser::new(&columns, COLUMN_COUNT);

    if let Ok(outcome) = parser.parse(expression) {
        for combination in &outcome.combinations {
            assert!(combination
                .offsets()
                .all(|offset| columns.by_offset(offset).is_some()));
        }

        let formatted = outcome.combinations.to_string();
        let reparsed = parser
            .parse(&formatted)
            .expect("formatted combinations must parse");
        assert_eq!(reparsed.combinations, outcome.combinations);
        assert!(reparsed.diagnostics.is_empty());
    }
});
