use std::fmt;

use crate::value::format_number;

/// Comparison between a field and a literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Contains,       // :
    Equals,         // =
    NotEquals,      // !=
    GreaterThan,    // >
    GreaterOrEqual, // >=
    LessThan,       // <
    LessOrEqual,    // <=
}

impl ComparisonOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::Contains => ":",
            ComparisonOperator::Equals => "=",
            ComparisonOperator::NotEquals => "!=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterOrEqual => ">=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessOrEqual => "<=",
        }
    }

    /// True for the ordering operators, which only match numeric data.
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            ComparisonOperator::GreaterThan
                | ComparisonOperator::GreaterOrEqual
                | ComparisonOperator::LessThan
                | ComparisonOperator::LessOrEqual
        )
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => f.write_str("AND"),
            LogicalOperator::Or => f.write_str("OR"),
        }
    }
}

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Text(String),
    /// `text` is the spelling from the query, used wherever the literal is
    /// compared as a string (`version:1.0` looks for "1.0", not "1")
    Number { value: f64, text: String },
}

impl LiteralValue {
    /// Number literal spelled in canonical form.
    pub fn number(value: f64) -> Self {
        LiteralValue::Number {
            value,
            text: format_number(value),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            LiteralValue::Number { value, .. } => Some(*value),
            LiteralValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

impl fmt::Display for LiteralValue {
    /// Numbers as written, text always quoted so keywords and
    /// numeric-looking text survive a re-parse.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Number { text, .. } => f.write_str(text),
            LiteralValue::Text(s) => {
                f.write_str("\"")?;
                for ch in s.chars() {
                    match ch {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        '\r' => f.write_str("\\r")?,
                        _ => write!(f, "{}", ch)?,
                    }
                }
                f.write_str("\"")
            }
        }
    }
}

/// Filter expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// field operator literal (e.g. `average>=90`)
    FieldTest {
        field: String,
        operator: ComparisonOperator,
        literal: LiteralValue,
    },

    /// left AND right, left OR right
    BinaryLogic {
        op: LogicalOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// NOT operand
    Negation { operand: Box<Expression> },
}

impl Expression {
    pub fn field_test(
        field: impl Into<String>,
        operator: ComparisonOperator,
        literal: LiteralValue,
    ) -> Self {
        Expression::FieldTest {
            field: field.into(),
            operator,
            literal,
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::BinaryLogic {
            op: LogicalOperator::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Expression::BinaryLogic {
            op: LogicalOperator::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn negate(operand: Expression) -> Self {
        Expression::Negation {
            operand: Box::new(operand),
        }
    }

    /// Number of field tests in the tree.
    pub fn field_test_count(&self) -> usize {
        match self {
            Expression::FieldTest { .. } => 1,
            Expression::BinaryLogic { left, right, .. } => {
                left.field_test_count() + right.field_test_count()
            }
            Expression::Negation { operand } => operand.field_test_count(),
        }
    }
}

impl fmt::Display for Expression {
    /// Canonical query text. Trees built by the parser always follow the
    /// NOT > AND > OR precedence, so no grouping is needed to re-parse them.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::FieldTest {
                field,
                operator,
                literal,
            } => write!(f, "{}{}{}", field, operator, literal),
            Expression::BinaryLogic { op, left, right } => {
                write!(f, "{} {} {}", left, op, right)
            }
            Expression::Negation { operand } => write!(f, "NOT {}", operand),
        }
    }
}

/// Indented tree view, one node per line.
pub fn render_tree(expr: &Expression) -> String {
    let mut out = String::new();
    render_node(expr, 0, &mut out);
    out
}

fn render_node(expr: &Expression, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match expr {
        Expression::FieldTest {
            field,
            operator,
            literal,
        } => {
            let kind = match literal {
                LiteralValue::Text(_) => "text",
                LiteralValue::Number { .. } => "number",
            };
            out.push_str(&format!(
                "{}FieldTest {} '{}' {} ({})\n",
                indent, field, operator, literal, kind
            ));
        }
        Expression::BinaryLogic { op, left, right } => {
            out.push_str(&format!("{}{}\n", indent, op));
            render_node(left, depth + 1, out);
            render_node(right, depth + 1, out);
        }
        Expression::Negation { operand } => {
            out.push_str(&format!("{}NOT\n", indent));
            render_node(operand, depth + 1, out);
        }
    }
}
