//! Error types for lmsql-core.
//!
//! Only compilation can fail: evaluation of a compiled query against a record
//! is total. Both error kinds carry the 0-based character offset into the
//! query source so callers can point at the offending spot.

use thiserror::Error;

/// Lexical failure: an unterminated quoted literal or an unrecognized symbol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Lex error at position {position}: {reason}")]
pub struct LexError {
    pub position: usize,
    pub reason: String,
}

impl LexError {
    pub fn new(position: usize, reason: impl Into<String>) -> Self {
        Self {
            position,
            reason: reason.into(),
        }
    }
}

/// Syntax failure: the token stream does not match the query grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Parse error at position {position}: expected {expected}, found {found}")]
pub struct ParseError {
    pub position: usize,
    pub expected: String,
    pub found: String,
}

impl ParseError {
    pub fn new(position: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self {
            position,
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Query compilation error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Result type for query compilation
pub type QueryResult<T> = Result<T, QueryError>;

impl QueryError {
    /// 0-based character offset of the error in the query source.
    pub fn position(&self) -> usize {
        match self {
            QueryError::Lex(e) => e.position,
            QueryError::Parse(e) => e.position,
        }
    }

    /// Human-readable reason without the position prefix.
    pub fn reason(&self) -> String {
        match self {
            QueryError::Lex(e) => e.reason.clone(),
            QueryError::Parse(e) => format!("expected {}, found {}", e.expected, e.found),
        }
    }

    /// Render the query with a caret under the error position.
    ///
    /// ```text
    /// average>= AND
    ///           ^ expected value after '>=', found keyword AND
    /// ```
    pub fn hint(&self, source: &str) -> String {
        let line: String = source
            .chars()
            .map(|c| if c.is_whitespace() || c.is_control() { ' ' } else { c })
            .collect();
        let pad = " ".repeat(self.position());
        format!("{}\n{}^ {}", line, pad, self.reason())
    }
}

impl serde::Serialize for QueryError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LexError::new(3, "unterminated string literal");
        assert_eq!(
            err.to_string(),
            "Lex error at position 3: unterminated string literal"
        );

        let err = ParseError::new(10, "value after '>='", "keyword AND");
        assert_eq!(
            err.to_string(),
            "Parse error at position 10: expected value after '>=', found keyword AND"
        );
    }

    #[test]
    fn test_query_error_is_transparent() {
        let err: QueryError = LexError::new(0, "unexpected character '#'").into();
        assert_eq!(
            err.to_string(),
            "Lex error at position 0: unexpected character '#'"
        );
        assert_eq!(err.position(), 0);
    }

    #[test]
    fn test_hint_points_at_position() {
        let err: QueryError = ParseError::new(10, "value after '>='", "keyword AND").into();
        let hint = err.hint("average>= AND");
        let lines: Vec<&str> = hint.lines().collect();
        assert_eq!(lines[0], "average>= AND");
        assert_eq!(lines[1].find('^'), Some(10));
        assert!(lines[1].ends_with("expected value after '>=', found keyword AND"));
    }

    #[test]
    fn test_hint_flattens_tabs_and_newlines() {
        let err: QueryError = ParseError::new(10, "value after '>='", "keyword AND").into();
        let hint = err.hint("average>=\tAND\nx");
        let lines: Vec<&str> = hint.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "average>= AND x");
        assert_eq!(lines[0].chars().nth(10), Some('A'));
        assert_eq!(lines[1].find('^'), Some(10));
    }

    #[test]
    fn test_serialize_as_string() {
        let err: QueryError = LexError::new(5, "unexpected character '&'").into();
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!("Lex error at position 5: unexpected character '&'")
        );
    }

    #[test]
    fn test_query_result_type() {
        let ok_result: QueryResult<i32> = Ok(42);
        assert_eq!(ok_result.unwrap(), 42);

        let err_result: QueryResult<i32> = Err(ParseError::new(0, "field name", "end of input").into());
        assert!(err_result.is_err());
    }
}
