//! Tree-walking evaluation of a filter expression against one record.
//!
//! Evaluation is total: type mismatches resolve to `false`, never to an error.
//!
//! - `:` case-insensitive substring match on the string forms
//! - `=` / `!=` numeric when both sides are numbers, otherwise exact string
//!   equality; an absent field is unequal to everything
//!
//! A field's string form is its canonical one (`85`, `true`). A number
//! literal's string form is the spelling from the query, so `version:1.0`
//! does not match "2.1.3".
//! - `>` `>=` `<` `<=` only when both sides read as numbers

use std::cmp::Ordering;

use crate::ast::{ComparisonOperator, Expression, LiteralValue, LogicalOperator};
use crate::value::{FieldValue, Record};

/// Decide whether `record` matches `expr`.
pub fn evaluate<R: Record + ?Sized>(expr: &Expression, record: &R) -> bool {
    match expr {
        Expression::FieldTest {
            field,
            operator,
            literal,
        } => compare(&record.field(field), *operator, literal),
        Expression::BinaryLogic { op, left, right } => match op {
            LogicalOperator::And => evaluate(left, record) && evaluate(right, record),
            LogicalOperator::Or => evaluate(left, record) || evaluate(right, record),
        },
        Expression::Negation { operand } => !evaluate(operand, record),
    }
}

/// Apply a single comparison to an already looked-up field value.
pub fn compare(
    value: &FieldValue<'_>,
    operator: ComparisonOperator,
    literal: &LiteralValue,
) -> bool {
    if value.is_absent() {
        return operator == ComparisonOperator::NotEquals;
    }

    match operator {
        ComparisonOperator::Contains => contains_ignore_case(value, literal),
        ComparisonOperator::Equals => values_equal(value, literal),
        ComparisonOperator::NotEquals => !values_equal(value, literal),
        ComparisonOperator::GreaterThan => {
            numeric_ordering(value, literal) == Some(Ordering::Greater)
        }
        ComparisonOperator::GreaterOrEqual => matches!(
            numeric_ordering(value, literal),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        ComparisonOperator::LessThan => numeric_ordering(value, literal) == Some(Ordering::Less),
        ComparisonOperator::LessOrEqual => matches!(
            numeric_ordering(value, literal),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

fn literal_text(literal: &LiteralValue) -> &str {
    match literal {
        LiteralValue::Text(s) => s,
        LiteralValue::Number { text, .. } => text,
    }
}

fn contains_ignore_case(value: &FieldValue<'_>, literal: &LiteralValue) -> bool {
    match value.as_text() {
        Some(text) => text
            .to_lowercase()
            .contains(&literal_text(literal).to_lowercase()),
        None => false,
    }
}

fn values_equal(value: &FieldValue<'_>, literal: &LiteralValue) -> bool {
    if let (FieldValue::Number(a), LiteralValue::Number { value: b, .. }) = (value, literal) {
        return a == b;
    }
    match value.as_text() {
        Some(text) => text == literal_text(literal),
        None => false,
    }
}

fn numeric_ordering(value: &FieldValue<'_>, literal: &LiteralValue) -> Option<Ordering> {
    let left = value.as_number()?;
    let right = literal.as_number()?;
    left.partial_cmp(&right)
}
