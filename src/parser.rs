use std::mem;

use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, SpannedToken, Token, UnaryOp},
    implicit::ImplicitObject,
    lexer::{LexError, Lexer},
    value::Value,
};

/// Syntax error. Fatal for the expression being parsed; no partial tree is
/// produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("Expected {expected}, found {found} at position {position}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("Unexpected end of expression at position {position}")]
    UnexpectedEof { position: usize },

    #[error("Unterminated '${{' starting at position {position}")]
    UnterminatedExpression { position: usize },
}

impl ParseError {
    /// 0-based character offset of the offending input.
    pub fn position(&self) -> usize {
        match self {
            ParseError::Lex(e) => e.position,
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEof { position }
            | ParseError::UnterminatedExpression { position } => *position,
        }
    }
}

pub struct Parser {
    lexer: Lexer,
    current: SpannedToken,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current = lexer.next_spanned()?;
        Ok(Parser { lexer, current })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self.lexer.next_spanned()?;
        Ok(())
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current.token) == mem::discriminant(token)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        if self.current.token == Token::Eof {
            ParseError::UnexpectedEof {
                position: self.current.position,
            }
        } else {
            ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: self.current.token.describe(),
                position: self.current.position,
            }
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.unexpected(&format!("'{}'", expected)));
        }
        self.advance()
    }

    /// Parse primary expressions: literals, identifiers, '(' expr ')'
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let expr = match &self.current.token {
            Token::Float(n) => Expr::Literal(Value::Float(*n)),
            Token::Integer(n) => Expr::Literal(Value::Integer(*n)),
            Token::Boolean(b) => Expr::Literal(Value::Boolean(*b)),
            Token::Null => Expr::Literal(Value::Null),
            Token::String(_) | Token::Identifier(_) => {
                match mem::replace(&mut self.current.token, Token::Eof) {
                    Token::String(s) => Expr::Literal(Value::String(s)),
                    Token::Identifier(name) => match ImplicitObject::lookup(&name) {
                        Some(obj) => Expr::ImplicitObject(obj),
                        None => Expr::Variable(name),
                    },
                    _ => unreachable!(),
                }
            }
            Token::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                return Ok(expr);
            }
            _ => return Err(self.unexpected("an expression")),
        };
        self.advance()?;
        Ok(expr)
    }

    /// Parse postfix access chains: `a.b[c].d`
    fn parse_access(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.check(&Token::LBracket) {
                self.advance()?;
                let key = self.parse_expression()?;
                self.expect(Token::RBracket)?;
                expr = Expr::access(expr, key);
            } else if self.check(&Token::Dot) {
                self.advance()?;

                let name = match &self.current.token {
                    Token::Identifier(n) => n.clone(),
                    _ => return Err(self.unexpected("property name after '.'")),
                };
                self.advance()?;

                expr = Expr::access(expr, Expr::Literal(Value::String(name)));
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// Prefix operators are right-recursive and bind looser than access, so
    /// `empty a.b` is `empty (a.b)` and `-a.b` is `-(a.b)`.
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match &self.current.token {
            Token::Minus => UnaryOp::Negate,
            Token::Not => UnaryOp::Not,
            Token::Empty => UnaryOp::Empty,
            _ => return self.parse_access(),
        };
        self.advance()?;
        let operand = self.parse_unary()?;
        Ok(Expr::unary(op, operand))
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match &self.current.token {
                Token::Star => BinOp::Multiply,
                Token::Slash => BinOp::Divide,
                Token::Percent => BinOp::Modulo,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match &self.current.token {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Subtract,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_multiplicative()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match &self.current.token {
                Token::Lt => BinOp::LessThan,
                Token::Gt => BinOp::GreaterThan,
                Token::LtEq => BinOp::LessEqual,
                Token::GtEq => BinOp::GreaterEqual,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_additive()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_relational()?;

        loop {
            let op = match &self.current.token {
                Token::EqEq => BinOp::Equal,
                Token::NotEq => BinOp::NotEqual,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_relational()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;

        while self.check(&Token::And) {
            self.advance()?;
            let right = self.parse_equality()?;
            left = Expr::binary(BinOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;

        while self.check(&Token::Or) {
            self.advance()?;
            let right = self.parse_and()?;
            left = Expr::binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_or()?;

        if !self.check(&Token::Question) {
            return Ok(condition);
        }
        self.advance()?;
        let then_branch = self.parse_conditional()?;
        self.expect(Token::Colon)?;
        let else_branch = self.parse_conditional()?;

        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_conditional()
    }

    /// Parses one complete expression; trailing tokens are an error.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        if !self.check(&Token::Eof) {
            return Err(self.unexpected("end of expression"));
        }
        Ok(expr)
    }
}

/// Parses raw expression text (without the `${` `}` delimiters).
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    Parser::new(Lexer::new(source))?.parse()
}

fn parse_embedded(source: &str, offset: usize) -> Result<Expr, ParseError> {
    Parser::new(Lexer::with_offset(source, offset))?.parse()
}

/// A piece of template text.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Text(String),
    Expression(Expr),
}

/// Parsed attribute text: plain text, a single `${...}`, or a mix.
#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    /// No `${` anywhere in the text
    Literal(String),
    /// The whole text is one `${...}`; evaluates to the raw typed value
    Expression(Expr),
    /// Text and expressions; evaluates to the concatenated string
    Composite(Vec<TemplatePart>),
}

/// Finds the `}` closing an expression body that starts at `from`,
/// skipping braces inside quoted strings.
fn find_closing_brace(chars: &[char], from: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut i = from;
    while i < chars.len() {
        let ch = chars[i];
        match quote {
            Some(q) => {
                if ch == '\\' {
                    i += 1;
                } else if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '}' => return Some(i),
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Parses text in which expressions are delimited by `${` and `}`.
///
/// Reported error positions are offsets into `text` itself.
pub fn parse_template(text: &str) -> Result<Template, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '$' && chars.get(i + 1) == Some(&'{') {
            let body_start = i + 2;
            let close = find_closing_brace(&chars, body_start)
                .ok_or(ParseError::UnterminatedExpression { position: i })?;
            let body: String = chars[body_start..close].iter().collect();
            let expr = parse_embedded(&body, body_start)?;

            if !literal.is_empty() {
                parts.push(TemplatePart::Text(mem::take(&mut literal)));
            }
            parts.push(TemplatePart::Expression(expr));
            i = close + 1;
        } else {
            literal.push(chars[i]);
            i += 1;
        }
    }

    if !literal.is_empty() {
        parts.push(TemplatePart::Text(literal));
    }

    let template = match parts.len() {
        0 => Template::Literal(String::new()),
        1 => match parts.pop() {
            Some(TemplatePart::Expression(expr)) => Template::Expression(expr),
            Some(TemplatePart::Text(text)) => Template::Literal(text),
            None => unreachable!(),
        },
        _ => Template::Composite(parts),
    };
    Ok(template)
}
