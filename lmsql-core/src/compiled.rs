use std::fmt;

use crate::ast::Expression;
use crate::error::QueryResult;
use crate::evaluator::evaluate;
use crate::parser::parse;
use crate::value::Record;

/// A parsed query, immutable once built and safe to share across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    source: String,
    /// `None` for an empty query, which matches every record.
    root: Option<Expression>,
}

impl CompiledQuery {
    /// Tokenize and parse `source`.
    pub fn compile(source: &str) -> QueryResult<Self> {
        let root = parse(source)?;
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Option<&Expression> {
        self.root.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        match &self.root {
            Some(expr) => evaluate(expr, record),
            None => true,
        }
    }

    /// Matching records in input order.
    pub fn filter<'r, R: Record>(&self, records: &'r [R]) -> Vec<&'r R> {
        records.iter().filter(|r| self.matches(*r)).collect()
    }

    /// One entry per record: whether it matches.
    pub fn mask<R: Record>(&self, records: &[R]) -> Vec<bool> {
        records.iter().map(|r| self.matches(r)).collect()
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(expr) => write!(f, "{}", expr),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compile_keeps_source() {
        let query = CompiledQuery::compile("name:ana  and average>80").unwrap();
        assert_eq!(query.source(), "name:ana  and average>80");
        assert_eq!(query.to_string(), "name:\"ana\" AND average>80");
        assert!(!query.is_empty());
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let query = CompiledQuery::compile("  ").unwrap();
        assert!(query.is_empty());
        assert!(query.root().is_none());
        assert!(query.matches(&json!({})));
        assert_eq!(query.to_string(), "");
    }

    #[test]
    fn test_filter_and_mask() {
        let records = vec![
            json!({"name": "Ana", "courses": 4}),
            json!({"name": "María", "courses": 3}),
            json!({"name": "Carlos", "courses": 4}),
        ];
        let query = CompiledQuery::compile("courses>=4").unwrap();

        let matched: Vec<&str> = query
            .filter(&records)
            .iter()
            .filter_map(|r| r["name"].as_str())
            .collect();
        assert_eq!(matched, vec!["Ana", "Carlos"]);
        assert_eq!(query.mask(&records), vec![true, false, true]);
    }

    #[test]
    fn test_compile_error() {
        let err = CompiledQuery::compile("average>= AND").unwrap_err();
        assert_eq!(err.position(), 10);
    }
}
