//! Parser for the filter query language.
//!
//! Recursive descent over the lexer output, precedence low to high:
//!
//! ```text
//! OrExpr     := AndExpr (OR AndExpr)*
//! AndExpr    := NotExpr (AND NotExpr)*
//! NotExpr    := NOT? Comparison
//! Comparison := Identifier ComparisonOperator Literal
//! ```
//!
//! AND/OR chains are left-associative. Parentheses are lexed but rejected.


use crate::ast::{Expression, LiteralValue};
use crate::error::{ParseError, QueryResult};
use crate::lexer::{tokenize, Keyword, Lexeme, Token};

/// Parser over a tokenized query
pub struct Parser {
    lexemes: Vec<Lexeme>,
    position: usize,
    end: Lexeme,
}

impl Parser {
    /// Create a parser from an input string
    pub fn new(input: &str) -> QueryResult<Self> {
        let lexemes = tokenize(input)?;
        Ok(Self::from_lexemes(lexemes))
    }

    /// Create a parser over already tokenized input
    pub fn from_lexemes(lexemes: Vec<Lexeme>) -> Self {
        let end_position = lexemes.last().map_or(0, |l| l.position);
        Self {
            lexemes,
            position: 0,
            end: Lexeme {
                token: Token::EndOfInput,
                position: end_position,
            },
        }
    }

    fn current(&self) -> &Lexeme {
        self.lexemes.get(self.position).unwrap_or(&self.end)
    }

    fn current_token(&self) -> &Token {
        &self.current().token
    }

    fn advance(&mut self) {
        if self.position < self.lexemes.len() {
            self.position += 1;
        }
    }

    fn error(&self, expected: impl Into<String>) -> ParseError {
        let current = self.current();
        let found = match current.token {
            Token::LeftParen | Token::RightParen => {
                format!("{} (parentheses are not supported)", current.token)
            }
            _ => current.token.to_string(),
        };
        ParseError::new(current.position, expected, found)
    }

    /// Parse the whole token stream.
    ///
    /// Returns `Ok(None)` for an empty query (no tokens besides end of input),
    /// which callers treat as "match everything".
    pub fn parse(&mut self) -> Result<Option<Expression>, ParseError> {
        if matches!(self.current_token(), Token::EndOfInput) {
            return Ok(None);
        }

        let expr = self.parse_or_expression()?;

        if !matches!(self.current_token(), Token::EndOfInput) {
            return Err(self.error("AND, OR or end of input"));
        }

        Ok(Some(expr))
    }

    fn parse_or_expression(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_and_expression()?;

        while matches!(self.current_token(), Token::Keyword(Keyword::Or)) {
            self.advance();
            if matches!(self.current_token(), Token::EndOfInput) {
                return Err(self.error("condition after OR"));
            }
            let right = self.parse_and_expression()?;
            left = Expression::or(left, right);
        }

        Ok(left)
    }

    fn parse_and_expression(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_not_expression()?;

        while matches!(self.current_token(), Token::Keyword(Keyword::And)) {
            self.advance();
            if matches!(self.current_token(), Token::EndOfInput) {
                return Err(self.error("condition after AND"));
            }
            let right = self.parse_not_expression()?;
            left = Expression::and(left, right);
        }

        Ok(left)
    }

    fn parse_not_expression(&mut self) -> Result<Expression, ParseError> {
        if matches!(self.current_token(), Token::Keyword(Keyword::Not)) {
            self.advance();
            if matches!(self.current_token(), Token::EndOfInput) {
                return Err(self.error("condition after NOT"));
            }
            let operand = self.parse_comparison()?;
            return Ok(Expression::negate(operand));
        }

        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expression, ParseError> {
        let field = match self.current_token() {
            Token::Identifier(name) => name.clone(),
            _ => return Err(self.error("field name")),
        };
        self.advance();

        let operator = match self.current_token() {
            Token::Operator(op) => *op,
            _ => return Err(self.error(format!("comparison operator after '{}'", field))),
        };
        self.advance();

        let literal = match self.current_token() {
            Token::StringLiteral(text) => LiteralValue::Text(text.clone()),
            Token::NumberLiteral { value, text } => LiteralValue::Number {
                value: *value,
                text: text.clone(),
            },
            _ => return Err(self.error(format!("value after '{}'", operator))),
        };
        self.advance();

        Ok(Expression::field_test(field, operator, literal))
    }
}

/// Parse a query string into an expression tree (`None` for an empty query).
pub fn parse(input: &str) -> QueryResult<Option<Expression>> {
    let mut parser = Parser::new(input)?;
    Ok(parser.parse()?)
}

/// Parse an already tokenized query.
pub fn parse_tokens(lexemes: Vec<Lexeme>) -> Result<Option<Expression>, ParseError> {
    Parser::from_lexemes(lexemes).parse()
}
