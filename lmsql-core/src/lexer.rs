use std::fmt;

use crate::ast::ComparisonOperator;
use crate::error::LexError;

/// Reserved words. Matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    And,
    Or,
    Not,
}

impl Keyword {
    fn from_word(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("AND") {
            Some(Keyword::And)
        } else if word.eq_ignore_ascii_case("OR") {
            Some(Keyword::Or)
        } else if word.eq_ignore_ascii_case("NOT") {
            Some(Keyword::Not)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::And => "AND",
            Keyword::Or => "OR",
            Keyword::Not => "NOT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Identifier(String),
    Operator(ComparisonOperator),
    Keyword(Keyword),
    StringLiteral(String),
    /// Parsed value plus the spelling it was written with
    NumberLiteral { value: f64, text: String },

    // Only lexed so the parser can reject them with a precise position
    LeftParen,  // (
    RightParen, // )

    EndOfInput,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
            Token::Operator(op) => write!(f, "operator '{}'", op),
            Token::Keyword(kw) => write!(f, "keyword {}", kw.as_str()),
            Token::StringLiteral(text) => write!(f, "string \"{}\"", text),
            Token::NumberLiteral { text, .. } => write!(f, "number {}", text),
            Token::LeftParen => write!(f, "'('"),
            Token::RightParen => write!(f, "')'"),
            Token::EndOfInput => write!(f, "end of input"),
        }
    }
}

/// A token together with the character offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub position: usize,
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
    /// Set right after a comparison operator: the next run is its literal.
    expect_value: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            input: chars,
            position: 0,
            current_char,
            expect_value: false,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_ascii_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_string(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let quote = match self.current_char {
            Some(q) => q,
            None => return Err(LexError::new(start, "expected string literal")),
        };
        self.advance(); // Skip opening quote

        let mut string = String::new();

        while let Some(ch) = self.current_char {
            if ch == quote {
                self.advance(); // Skip closing quote
                return Ok(Token::StringLiteral(string));
            } else if ch == '\\' {
                self.advance();
                if let Some(escaped) = self.current_char {
                    string.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        _ => escaped,
                    });
                    self.advance();
                }
            } else {
                string.push(ch);
                self.advance();
            }
        }

        Err(LexError::new(start, "unterminated string literal"))
    }

    fn read_identifier(&mut self) -> Token {
        let mut ident = String::new();

        while let Some(ch) = self.current_char {
            if is_identifier_char(ch) {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match Keyword::from_word(&ident) {
            Some(kw) => Token::Keyword(kw),
            None => Token::Identifier(ident),
        }
    }

    /// Read the unquoted right-hand side of a comparison.
    ///
    /// A reserved word only reads as a keyword when whitespace separated it
    /// from the operator; `state:OR` compares against the text "OR".
    fn read_value(&mut self, detached: bool) -> Token {
        let mut text = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_ascii_whitespace() || ch == '(' || ch == ')' {
                break;
            }
            text.push(ch);
            self.advance();
        }

        if detached {
            if let Some(kw) = Keyword::from_word(&text) {
                return Token::Keyword(kw);
            }
        }
        match parse_decimal(&text) {
            Some(value) => Token::NumberLiteral { value, text },
            None => Token::StringLiteral(text),
        }
    }

    /// Consume an operator whose first character is current, upgrading to the
    /// two-character form when followed by `=`.
    fn read_operator(
        &mut self,
        single: ComparisonOperator,
        with_eq: ComparisonOperator,
    ) -> Token {
        self.advance();
        if self.current_char == Some('=') {
            self.advance();
            Token::Operator(with_eq)
        } else {
            Token::Operator(single)
        }
    }

    pub fn next_token(&mut self) -> Result<Lexeme, LexError> {
        let before = self.position;
        self.skip_whitespace();
        let position = self.position;

        if self.expect_value {
            self.expect_value = false;
            match self.current_char {
                Some('"') | Some('\'') => {
                    let token = self.read_string()?;
                    return Ok(Lexeme { token, position });
                }
                Some(ch) if ch != '(' && ch != ')' => {
                    let token = self.read_value(position > before);
                    return Ok(Lexeme { token, position });
                }
                _ => {}
            }
        }

        let token = match self.current_char {
            None => Token::EndOfInput,

            Some('"') | Some('\'') => self.read_string()?,

            Some('(') => {
                self.advance();
                Token::LeftParen
            }

            Some(')') => {
                self.advance();
                Token::RightParen
            }

            Some(':') => {
                self.advance();
                self.expect_value = true;
                Token::Operator(ComparisonOperator::Contains)
            }

            Some('=') => {
                self.advance();
                self.expect_value = true;
                Token::Operator(ComparisonOperator::Equals)
            }

            Some('>') => {
                self.expect_value = true;
                self.read_operator(
                    ComparisonOperator::GreaterThan,
                    ComparisonOperator::GreaterOrEqual,
                )
            }

            Some('<') => {
                self.expect_value = true;
                self.read_operator(
                    ComparisonOperator::LessThan,
                    ComparisonOperator::LessOrEqual,
                )
            }

            Some('!') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    self.expect_value = true;
                    Token::Operator(ComparisonOperator::NotEquals)
                } else {
                    return Err(LexError::new(position, "expected '=' after '!'"));
                }
            }

            Some(ch) if is_identifier_char(ch) => self.read_identifier(),

            Some(ch) => {
                return Err(LexError::new(
                    position,
                    format!("unexpected character '{}'", ch),
                ));
            }
        };

        Ok(Lexeme { token, position })
    }

    /// Tokenize the whole input. The last lexeme is always `EndOfInput`.
    pub fn tokenize(&mut self) -> Result<Vec<Lexeme>, LexError> {
        let mut lexemes = Vec::new();

        loop {
            let lexeme = self.next_token()?;
            let is_end = lexeme.token == Token::EndOfInput;
            lexemes.push(lexeme);
            if is_end {
                break;
            }
        }

        Ok(lexemes)
    }
}

/// Tokenize a query string.
pub fn tokenize(source: &str) -> Result<Vec<Lexeme>, LexError> {
    Lexer::new(source).tokenize()
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '.' || ch == '-'
}

/// Parse `-?digits[.digits]`; anything else (exponents, `+`, `inf`) is text.
fn parse_decimal(text: &str) -> Option<f64> {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let mut seen_digit = false;
    let mut seen_dot = false;

    for ch in unsigned.chars() {
        match ch {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return None,
        }
    }

    if !seen_digit {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}
