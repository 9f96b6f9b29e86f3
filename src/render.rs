//! Output formatting for matches, compile errors and cache statistics.

use colored::Colorize;
use lmsql_core::{render_tree, CacheStats, CompiledQuery, QueryError};
use serde_json::Value;

/// Matched records as JSON: one array when `pretty`, JSON Lines otherwise.
pub fn render_matches(records: &[&Value], pretty: bool) -> anyhow::Result<String> {
    if pretty {
        return Ok(serde_json::to_string_pretty(records)?);
    }

    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

/// Compile error with the query and a caret under the offending position.
pub fn render_error(err: &QueryError, query: &str, color: bool) -> String {
    let hint = err.hint(query);
    let (source_line, caret_line) = hint.split_once('\n').unwrap_or((hint.as_str(), ""));
    let kind = match err {
        QueryError::Lex(_) => "lex error",
        QueryError::Parse(_) => "syntax error",
    };
    let header = format!("{} at position {}", kind, err.position());

    if color {
        format!(
            "{}\n  {}\n  {}",
            header.red().bold(),
            source_line,
            caret_line.yellow()
        )
    } else {
        format!("{}\n  {}\n  {}", header, source_line, caret_line)
    }
}

/// Canonical form followed by the indented expression tree.
pub fn render_explain(compiled: &CompiledQuery) -> String {
    match compiled.root() {
        Some(root) => format!("{}\n\n{}", compiled, render_tree(root)),
        None => "(empty query: matches every record)\n".to_string(),
    }
}

pub fn render_stats(stats: &CacheStats) -> String {
    format!(
        "cache: {}/{} entries, {} hits, {} misses",
        stats.len, stats.capacity, stats.hits, stats.misses
    )
}
