//! Fuzz target for detection and binning over parsed tables.
//!
//! Whatever the parser accepts, detection must not panic and every row
//! must land in exactly one bin of every column's histogram.

#![no_main]

use libfuzzer_sys::fuzz_target;
use scour::{Parser, Session, SessionConfig};

fuzz_target!(|data: &[u8]| {
    if data.len() > 20_000 {
        return;
    }

    let Ok(table) = Parser::new().parse_bytes(data, b',') else {
        return;
    };
    let Ok(session) = Session::new(table, SessionConfig::default()) else {
        return;
    };

    for column in session.table().columns() {
        if let Ok(histogram) = session.histogram(column) {
            assert_eq!(histogram.total(), session.table().row_count());
        }
    }
});
