//! lms-search: advanced search over learning-management records.
//!
//! The query language itself lives in `lmsql-core`; this crate wires it to
//! configuration, JSON record files, terminal output and an interactive REPL.

pub mod config;
pub mod records;
pub mod render;
pub mod repl;

pub use config::{Config, OutputConfig};
pub use lmsql_core::{CompiledQuery, QueryError, SearchEngine};
pub use records::{parse_records, read_records};
