use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Floating-point literal
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 1e3
    /// .5
    /// ```
    Float(f64),

    /// Integer literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0
    /// ```
    Integer(i64),

    /// String literal, single or double quoted
    ///
    /// Only `\"`, `\'` and `\\` are recognised escapes.
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'it\'s'
    /// ```
    String(String),

    /// `true` or `false`
    Boolean(bool),

    /// `null`
    Null,

    // Identifiers
    /// Attribute name, property name or implicit object name
    ///
    /// Must start with a letter or underscore, followed by letters, digits,
    /// or underscores.
    ///
    /// # Examples
    /// ```text
    /// user
    /// param
    /// _cart
    /// ```
    Identifier(String),

    // Comparison
    /// `==` or `eq`
    EqEq,

    /// `!=` or `ne`
    NotEq,

    /// `<` or `lt`
    Lt,

    /// `>` or `gt`
    Gt,

    /// `<=` or `le`
    LtEq,

    /// `>=` or `ge`
    GtEq,

    // Arithmetic
    /// Addition
    Plus,

    /// Subtraction or unary negation
    Minus,

    /// Multiplication
    Star,

    /// `/` or `div`
    Slash,

    /// `%` or `mod`
    Percent,

    // Logical
    /// `&&` or `and`
    And,

    /// `||` or `or`
    Or,

    /// `!` or `not`
    Not,

    /// `empty` prefix operator
    ///
    /// # Examples
    /// ```text
    /// empty param.name
    /// not empty session.cart
    /// ```
    Empty,

    // Delimiters
    /// Left bracket for index access
    LBracket,

    /// Right bracket
    RBracket,

    /// Left parenthesis for grouping
    LParen,

    /// Right parenthesis
    RParen,

    /// Dot for property access
    Dot,

    /// Ternary condition marker
    Question,

    /// Ternary branch separator
    Colon,

    /// End of input
    Eof,
}

impl Token {
    /// Short description used in syntax error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Float(n) => format!("number {}", n),
            Token::Integer(n) => format!("number {}", n),
            Token::String(s) => format!("string \"{}\"", s),
            Token::Boolean(b) => format!("'{}'", b),
            Token::Null => "'null'".to_string(),
            Token::Identifier(name) => format!("identifier '{}'", name),
            Token::Eof => "end of expression".to_string(),
            other => format!("'{}'", other),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Token::Float(n) => return write!(f, "{}", n),
            Token::Integer(n) => return write!(f, "{}", n),
            Token::String(s) => return write!(f, "\"{}\"", s),
            Token::Boolean(b) => return write!(f, "{}", b),
            Token::Identifier(name) => return f.write_str(name),
            Token::Null => "null",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::LtEq => "<=",
            Token::GtEq => ">=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::And => "&&",
            Token::Or => "||",
            Token::Not => "!",
            Token::Empty => "empty",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Dot => ".",
            Token::Question => "?",
            Token::Colon => ":",
            Token::Eof => "<eof>",
        };
        f.write_str(symbol)
    }
}

/// A token together with the source text it was read from and its offset.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    /// Raw source slice, e.g. `and` for [`Token::And`] or `'a'` for a string
    pub text: String,
    /// 0-based character offset of the first character
    pub position: usize,
}
