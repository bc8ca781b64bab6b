use thiserror::Error;

use crate::ast::{SpannedToken, Token};

/// Lexical error: unterminated string, bad escape or unexpected character.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at position {position}")]
pub struct LexError {
    /// 0-based character offset where the problem was detected
    pub position: usize,
    pub message: String,
}

const KEYWORDS: [&str; 15] = [
    "true", "false", "null", "and", "or", "not", "eq", "ne", "lt", "gt", "le", "ge", "div", "mod",
    "empty",
];

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    /// Added to every reported position, for expressions embedded in
    /// larger template text.
    base_offset: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            base_offset: 0,
        }
    }

    /// Lexer whose positions are reported relative to an enclosing text.
    pub fn with_offset(input: &str, base_offset: usize) -> Self {
        Lexer {
            base_offset,
            ..Lexer::new(input)
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn error(&self, at: usize, message: impl Into<String>) -> LexError {
        LexError {
            position: self.base_offset + at,
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance();
                    match self.current_char() {
                        Some(c @ ('"' | '\'' | '\\')) => result.push(c),
                        Some(c) => {
                            return Err(
                                self.error(self.position - 1, format!("Invalid escape sequence \\{}", c))
                            );
                        }
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(self.error(start, "Unterminated string literal"))
    }

    fn read_digits(&mut self, into: &mut String) {
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                into.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let mut number = String::new();
        let mut is_float = false;

        self.read_digits(&mut number);

        if self.current_char() == Some('.') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            number.push('.');
            self.advance();
            self.read_digits(&mut number);
        }

        if matches!(self.current_char(), Some('e' | 'E')) {
            let sign = matches!(self.peek_char(1), Some('+' | '-'));
            let digit_at = if sign { 2 } else { 1 };
            if self.peek_char(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                number.push('e');
                self.advance();
                if sign {
                    number.push(self.current_char().unwrap_or('+'));
                    self.advance();
                }
                self.read_digits(&mut number);
            }
        }

        if is_float {
            match number.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Token::Float(n)),
                Ok(_) => Err(self.error(start, format!("Float literal '{}' out of range", number))),
                Err(_) => Err(self.error(start, format!("Invalid number '{}'", number))),
            }
        } else {
            number
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| self.error(start, format!("Integer literal '{}' out of range", number)))
        }
    }

    /// Whether `word` lexes as a keyword rather than an identifier.
    pub(crate) fn is_keyword(word: &str) -> bool {
        KEYWORDS.contains(&word)
    }

    fn keyword(ident: String) -> Token {
        match ident.as_str() {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            "null" => Token::Null,
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "eq" => Token::EqEq,
            "ne" => Token::NotEq,
            "lt" => Token::Lt,
            "gt" => Token::Gt,
            "le" => Token::LtEq,
            "ge" => Token::GtEq,
            "div" => Token::Slash,
            "mod" => Token::Percent,
            "empty" => Token::Empty,
            _ => Token::Identifier(ident),
        }
    }

    /// Reads a one- or two-character operator. `second` is the character
    /// that upgrades `short` to `long`.
    fn operator(&mut self, second: char, long: Token, short: Option<Token>) -> Result<Token, LexError> {
        if self.peek_char(1) == Some(second) {
            self.advance();
            self.advance();
            return Ok(long);
        }
        match short {
            Some(token) => {
                self.advance();
                Ok(token)
            }
            None => {
                let ch = self.current_char().unwrap_or(' ');
                Err(self.error(
                    self.position,
                    format!("Unexpected '{}' (did you mean '{}{}'?)", ch, ch, second),
                ))
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.next_spanned().map(|spanned| spanned.token)
    }

    /// Next token with its source text and offset.
    pub fn next_spanned(&mut self) -> Result<SpannedToken, LexError> {
        self.skip_whitespace();
        let start = self.position;

        let token = match self.current_char() {
            None => Token::Eof,
            Some('.') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number()?
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some('"') => Token::String(self.read_string('"')?),
            Some('\'') => Token::String(self.read_string('\'')?),
            Some('=') => self.operator('=', Token::EqEq, None)?,
            Some('!') => self.operator('=', Token::NotEq, Some(Token::Not))?,
            Some('<') => self.operator('=', Token::LtEq, Some(Token::Lt))?,
            Some('>') => self.operator('=', Token::GtEq, Some(Token::Gt))?,
            Some('&') => self.operator('&', Token::And, None)?,
            Some('|') => self.operator('|', Token::Or, None)?,
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();
                Self::keyword(ident)
            }
            Some(ch) => {
                let token = match ch {
                    '.' => Token::Dot,
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '%' => Token::Percent,
                    '?' => Token::Question,
                    ':' => Token::Colon,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    other => {
                        return Err(self.error(start, format!("Unexpected character '{}'", other)));
                    }
                };
                self.advance();
                token
            }
        };

        Ok(SpannedToken {
            token,
            text: self.input[start..self.position].iter().collect(),
            position: self.base_offset + start,
        })
    }
}

/// Splits `source` into tokens, ending with a single [`Token::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let spanned = lexer.next_spanned()?;
        let done = spanned.token == Token::Eof;
        tokens.push(spanned);
        if done {
            return Ok(tokens);
        }
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("and or not true false null empty div mod");
    assert_eq!(lexer.next_token().unwrap(), Token::And);
    assert_eq!(lexer.next_token().unwrap(), Token::Or);
    assert_eq!(lexer.next_token().unwrap(), Token::Not);
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(true));
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(false));
    assert_eq!(lexer.next_token().unwrap(), Token::Null);
    assert_eq!(lexer.next_token().unwrap(), Token::Empty);
    assert_eq!(lexer.next_token().unwrap(), Token::Slash);
    assert_eq!(lexer.next_token().unwrap(), Token::Percent);
}

#[test]
fn test_access_chain() {
    let mut lexer = Lexer::new("a.b[c] >= 5");
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("a".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Dot);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("b".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::LBracket);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("c".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::RBracket);
    assert_eq!(lexer.next_token().unwrap(), Token::GtEq);
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(5));
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_offset_positions() {
    let mut lexer = Lexer::with_offset("x + 1", 2);
    assert_eq!(lexer.next_spanned().unwrap().position, 2);
    assert_eq!(lexer.next_spanned().unwrap().position, 4);
}
