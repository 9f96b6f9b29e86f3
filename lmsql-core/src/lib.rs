//! LMSQL Core - filter query language for in-memory record collections.
//!
//! Users type boolean filters such as `average>=90 AND courses>=4` or
//! `nombre:Ana`; this crate compiles them and returns the matching subset of
//! any record collection. It does no I/O and owns no records.
//!
//! # Main Components
//!
//! - **Lexer**: query string to tokens with character positions
//! - **Parser**: recursive descent into an [`Expression`] tree (NOT > AND > OR)
//! - **Evaluator**: total, type-aware matching of one record
//! - **SearchEngine**: facade with a bounded LRU cache of compiled queries
//!
//! # Example
//!
//! ```rust
//! use lmsql_core::SearchEngine;
//! use serde_json::json;
//!
//! let students = vec![
//!     json!({"name": "Ana Torres", "average": 85, "courses": 4}),
//!     json!({"name": "Juan Méndez", "average": 92, "courses": 5}),
//! ];
//!
//! let engine = SearchEngine::default();
//! let honors = engine.search(&students, "average>=90").unwrap();
//! assert_eq!(honors, vec![&students[1]]);
//!
//! let err = engine.search(&students, "average>= AND").unwrap_err();
//! assert_eq!(err.position(), 10);
//! ```

pub mod ast;
pub mod compiled;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod value;

// Re-export main types for convenience
pub use ast::{render_tree, ComparisonOperator, Expression, LiteralValue, LogicalOperator};
pub use compiled::CompiledQuery;
pub use engine::{CacheStats, EngineConfig, SearchEngine, DEFAULT_CACHE_CAPACITY};
pub use error::{LexError, ParseError, QueryError, QueryResult};
pub use evaluator::evaluate;
pub use lexer::{tokenize, Keyword, Lexeme, Lexer, Token};
pub use parser::{parse, parse_tokens, Parser};
pub use value::{FieldValue, Record};
