//! Fuzz target for the data parser.
//!
//! The CSV/TSV and JSON parsers must never panic on malformed input, and
//! every table they return must satisfy the ID invariant.

#![no_main]

use std::collections::HashSet;

use libfuzzer_sys::fuzz_target;
use scour::Parser;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    let parser = Parser::new();
    for delimiter in [b',', b'\t', b';', b'|'] {
        if let Ok(table) = parser.parse_bytes(data, delimiter) {
            let ids: HashSet<u64> = table.ids().collect();
            assert_eq!(ids.len(), table.row_count());
        }
    }
    let _ = parser.parse_json(data);
});
