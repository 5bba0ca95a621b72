//! Input parsing, output writing and data source handling.

mod parser;
mod source;
mod writer;

pub use parser::{Parser, ParserConfig};
pub use source::{DataFormat, SourceMetadata};
pub use writer::write_table;
