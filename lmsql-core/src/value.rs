//! Record model: the closed value type a query sees and the lookup capability
//! a record has to expose.
//!
//! The engine never owns or mutates records. Anything that can answer "what is
//! the value of field `x`" can be searched: JSON documents, maps of
//! [`FieldValue`]s, or caller types implementing [`Record`] directly.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

/// A field value as seen by the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Number(f64),
    Bool(bool),
    Absent,
}

impl<'a> FieldValue<'a> {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    /// Borrowing copy of this value.
    pub fn reborrow(&self) -> FieldValue<'_> {
        match self {
            FieldValue::Text(s) => FieldValue::Text(Cow::Borrowed(s.as_ref())),
            FieldValue::Number(n) => FieldValue::Number(*n),
            FieldValue::Bool(b) => FieldValue::Bool(*b),
            FieldValue::Absent => FieldValue::Absent,
        }
    }

    /// Canonical string form: numbers in shortest decimal form, booleans in
    /// lowercase. `None` when absent.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            FieldValue::Text(s) => Some(Cow::Borrowed(s.as_ref())),
            FieldValue::Number(n) => Some(Cow::Owned(format_number(*n))),
            FieldValue::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            FieldValue::Absent => None,
        }
    }

    /// Numeric view: numbers as-is, text that parses as a finite number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => parse_number(s),
            FieldValue::Bool(_) | FieldValue::Absent => None,
        }
    }

    /// View a JSON value. `null`, arrays and objects read as absent.
    pub fn from_json(value: &'a Value) -> Self {
        match value {
            Value::String(s) => FieldValue::Text(Cow::Borrowed(s)),
            Value::Number(n) => n.as_f64().map_or(FieldValue::Absent, FieldValue::Number),
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Null | Value::Array(_) | Value::Object(_) => FieldValue::Absent,
        }
    }
}

impl From<&'static str> for FieldValue<'static> {
    fn from(s: &'static str) -> Self {
        FieldValue::Text(Cow::Borrowed(s))
    }
}

impl From<String> for FieldValue<'static> {
    fn from(s: String) -> Self {
        FieldValue::Text(Cow::Owned(s))
    }
}

impl From<f64> for FieldValue<'static> {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue<'static> {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<bool> for FieldValue<'static> {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// Lookup capability every searchable record exposes.
pub trait Record {
    /// Value of `name`, or [`FieldValue::Absent`] when the record has no such field.
    fn field(&self, name: &str) -> FieldValue<'_>;
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> FieldValue<'_> {
        (**self).field(name)
    }
}

impl Record for Map<String, Value> {
    /// Exact key first, then a dot-separated path through nested objects.
    fn field(&self, name: &str) -> FieldValue<'_> {
        if let Some(value) = self.get(name) {
            return FieldValue::from_json(value);
        }
        if !name.contains('.') {
            return FieldValue::Absent;
        }

        let mut parts = name.split('.');
        let mut current = match parts.next().and_then(|first| self.get(first)) {
            Some(value) => value,
            None => return FieldValue::Absent,
        };
        for part in parts {
            match current.get(part) {
                Some(value) => current = value,
                None => return FieldValue::Absent,
            }
        }
        FieldValue::from_json(current)
    }
}

impl Record for Value {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match self {
            Value::Object(map) => map.field(name),
            _ => FieldValue::Absent,
        }
    }
}

impl<'v> Record for HashMap<String, FieldValue<'v>> {
    fn field(&self, name: &str) -> FieldValue<'_> {
        self.get(name)
            .map_or(FieldValue::Absent, |value| value.reborrow())
    }
}

impl<'v> Record for BTreeMap<String, FieldValue<'v>> {
    fn field(&self, name: &str) -> FieldValue<'_> {
        self.get(name)
            .map_or(FieldValue::Absent, |value| value.reborrow())
    }
}

/// Shortest decimal form: integral values without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(85.0), "85");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(92.5), "92.5");
        assert_eq!(format_number(0.1), "0.1");
    }

    #[test]
    fn test_as_text() {
        assert_eq!(FieldValue::from(85.0).as_text().unwrap(), "85");
        assert_eq!(FieldValue::from(true).as_text().unwrap(), "true");
        assert_eq!(FieldValue::from("Ana").as_text().unwrap(), "Ana");
        assert!(FieldValue::Absent.as_text().is_none());
    }

    #[test]
    fn test_as_number() {
        assert_eq!(FieldValue::from(4.0).as_number(), Some(4.0));
        assert_eq!(FieldValue::from(" 88.5 ").as_number(), Some(88.5));
        assert_eq!(FieldValue::from("eighty").as_number(), None);
        assert_eq!(FieldValue::from("NaN").as_number(), None);
        assert_eq!(FieldValue::from(true).as_number(), None);
        assert_eq!(FieldValue::Absent.as_number(), None);
    }

    #[test]
    fn test_json_record_lookup() {
        let doc = json!({
            "name": "Ana Torres",
            "average": 85,
            "active": true,
            "tutor": null,
            "tags": ["math"],
            "student": {"address": {"city": "Lima"}}
        });

        assert_eq!(doc.field("name"), FieldValue::from("Ana Torres"));
        assert_eq!(doc.field("average"), FieldValue::Number(85.0));
        assert_eq!(doc.field("active"), FieldValue::Bool(true));
        assert!(doc.field("tutor").is_absent());
        assert!(doc.field("tags").is_absent());
        assert!(doc.field("missing").is_absent());
        assert_eq!(doc.field("student.address.city"), FieldValue::from("Lima"));
        assert!(doc.field("student.address.zip").is_absent());
    }

    #[test]
    fn test_json_exact_dotted_key_wins() {
        let doc = json!({"a.b": "flat", "a": {"b": "nested"}});
        assert_eq!(doc.field("a.b"), FieldValue::from("flat"));
    }

    #[test]
    fn test_non_object_json_has_no_fields() {
        assert!(json!([1, 2]).field("0").is_absent());
        assert!(json!("text").field("len").is_absent());
    }

    #[test]
    fn test_map_records() {
        let mut record: HashMap<String, FieldValue> = HashMap::new();
        record.insert("name".to_string(), "Juan".into());
        record.insert("courses".to_string(), 5i64.into());

        assert_eq!(record.field("name"), FieldValue::from("Juan"));
        assert_eq!(record.field("courses"), FieldValue::Number(5.0));
        assert!(record.field("average").is_absent());

        let ordered: BTreeMap<String, FieldValue> = record.into_iter().collect();
        assert_eq!(ordered.field("courses"), FieldValue::Number(5.0));
    }
}
