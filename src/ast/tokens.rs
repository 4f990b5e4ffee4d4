use std::fmt;

use crate::lexer::Position;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Dotted attribute path
    ///
    /// # Examples
    /// ```text
    /// age
    /// address.street
    /// comments.author.email
    /// ```
    Path(String),

    /// String literal enclosed in single quotes, quotes removed
    ///
    /// # Examples
    /// ```text
    /// 'Charles'
    /// 'it\'s'
    /// ```
    String(String),

    /// Integer or decimal number, kept as written
    ///
    /// The text is handed to the converter of the target field, so `1011`
    /// may become an `i32`, a big integer or a decimal.
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -3
    /// 1.011
    /// ```
    Number(String),

    // Punctuation
    /// Left parenthesis for grouping or value lists
    LParen,

    /// Right parenthesis
    RParen,

    /// Comma separating list values
    Comma,

    // Relational
    /// Equality (`=`)
    Eq,

    /// Inequality (`!=` or `<>`)
    NotEq,

    /// Greater than (`>`)
    Gt,

    /// Greater than or equal (`>=`)
    GtEq,

    /// Less than (`<`)
    Lt,

    /// Less than or equal (`<=`)
    LtEq,

    // Boolean and null tests
    /// `is true`
    IsTrue,

    /// `is false`
    IsFalse,

    /// `is null`
    IsNull,

    /// `is not null`
    IsNotNull,

    // String matching
    /// `contains`
    Contains,

    /// `not contains`
    NotContains,

    /// `starts`
    Starts,

    /// `not starts`
    NotStarts,

    // Membership and range
    /// `in`
    In,

    /// `not in`
    NotIn,

    /// `between`
    Between,

    // Logical
    /// Logical AND (`&&` or `and`)
    ///
    /// Also separates the bounds of `between`.
    And,

    /// Logical OR (`||` or `or`)
    Or,

    /// End of input
    Eof,
}

impl Token {
    /// Short human-readable description used in syntax errors.
    pub fn describe(&self) -> String {
        match self {
            Token::Path(path) => format!("attribute '{path}'"),
            Token::String(s) => format!("string '{s}'"),
            Token::Number(n) => format!("number {n}"),
            Token::Eof => "end of input".to_string(),
            other => format!("'{other}'"),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Path(path) => return f.write_str(path),
            Token::String(s) => return write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Token::Number(n) => return f.write_str(n),
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Comma => ",",
            Token::Eq => "=",
            Token::NotEq => "!=",
            Token::Gt => ">",
            Token::GtEq => ">=",
            Token::Lt => "<",
            Token::LtEq => "<=",
            Token::IsTrue => "is true",
            Token::IsFalse => "is false",
            Token::IsNull => "is null",
            Token::IsNotNull => "is not null",
            Token::Contains => "contains",
            Token::NotContains => "not contains",
            Token::Starts => "starts",
            Token::NotStarts => "not starts",
            Token::In => "in",
            Token::NotIn => "not in",
            Token::Between => "between",
            Token::And => "and",
            Token::Or => "or",
            Token::Eof => "",
        };
        f.write_str(text)
    }
}

/// A token together with the source text it was read from and where it
/// starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    /// Raw source text, e.g. `IS  NOT null` or `'ab'`
    pub text: String,
    pub position: Position,
}
