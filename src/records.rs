//! Loading record collections for the CLI.
//!
//! Accepts either a JSON array of objects or JSON Lines (one object per line).

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use serde_json::Value;

/// Read records from `source`, or from stdin when `source` is `None` or `-`.
pub fn read_records(source: Option<&Path>) -> anyhow::Result<Vec<Value>> {
    let text = match source {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read records from {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read records from stdin")?;
            buf
        }
    };

    let records = parse_records(&text)?;
    tracing::info!("Loaded {} records", records.len());
    Ok(records)
}

/// Parse a JSON array or JSON Lines document into records.
pub fn parse_records(text: &str) -> anyhow::Result<Vec<Value>> {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let records: Vec<Value> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).context("Records are not a valid JSON array")?
    } else {
        let mut records = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: Value = serde_json::from_str(line)
                .with_context(|| format!("Invalid JSON on line {}", index + 1))?;
            records.push(record);
        }
        records
    };

    for (index, record) in records.iter().enumerate() {
        if !record.is_object() {
            bail!("Record {} is not a JSON object", index + 1);
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_parse_json_array() {
        let records = parse_records(r#"[{"name": "Ana"}, {"name": "Juan"}]"#).unwrap();
        assert_eq!(records, vec![json!({"name": "Ana"}), json!({"name": "Juan"})]);
    }

    #[test]
    fn test_parse_json_lines() {
        let text = "{\"name\": \"Ana\"}\n\n{\"name\": \"Juan\"}\n";
        let records = parse_records(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["name"], "Juan");
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_records("").unwrap().is_empty());
        assert!(parse_records("  \n").unwrap().is_empty());
        assert!(parse_records("[]").unwrap().is_empty());
    }

    #[test]
    fn test_reject_non_objects() {
        let err = parse_records("[{\"a\": 1}, 2]").unwrap_err();
        assert!(err.to_string().contains("Record 2"));
    }

    #[test]
    fn test_reject_bad_line() {
        let err = parse_records("{\"a\": 1}\n{oops}\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_read_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("students.json");
        std::fs::write(&path, r#"[{"name": "Laura", "average": 95}]"#).unwrap();

        let records = read_records(Some(path.as_path())).unwrap();
        assert_eq!(records, vec![json!({"name": "Laura", "average": 95})]);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");
        let err = read_records(Some(path.as_path())).unwrap_err();
        assert!(err.to_string().contains("Failed to read records"));
    }
}
