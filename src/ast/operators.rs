use std::fmt;

use crate::ast::Token;

/// Predicate operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Relational
    /// Equal (`=`)
    Equal,
    /// Not equal (`!=`, `<>`)
    NotEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,

    // Tests
    /// `is true`
    IsTrue,
    /// `is false`
    IsFalse,
    /// `is null`
    IsNull,
    /// `is not null`
    IsNotNull,

    // String matching (case-insensitive)
    /// `contains`
    Contains,
    /// `not contains`
    NotContains,
    /// `starts`
    Starts,
    /// `not starts`
    NotStarts,

    // Membership
    /// `in (...)`
    In,
    /// `not in (...)`
    NotIn,

    // Range
    /// `between low and high`, inclusive
    Between,
}

/// How many operand literals an operator takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    One,
    /// A single string literal, never converted
    Pattern,
    List,
    Range,
}

impl Operator {
    pub fn from_token(token: &Token) -> Option<Self> {
        let op = match token {
            Token::Eq => Operator::Equal,
            Token::NotEq => Operator::NotEqual,
            Token::Gt => Operator::GreaterThan,
            Token::GtEq => Operator::GreaterEqual,
            Token::Lt => Operator::LessThan,
            Token::LtEq => Operator::LessEqual,
            Token::IsTrue => Operator::IsTrue,
            Token::IsFalse => Operator::IsFalse,
            Token::IsNull => Operator::IsNull,
            Token::IsNotNull => Operator::IsNotNull,
            Token::Contains => Operator::Contains,
            Token::NotContains => Operator::NotContains,
            Token::Starts => Operator::Starts,
            Token::NotStarts => Operator::NotStarts,
            Token::In => Operator::In,
            Token::NotIn => Operator::NotIn,
            Token::Between => Operator::Between,
            _ => return None,
        };
        Some(op)
    }

    pub fn arity(self) -> Arity {
        match self {
            Operator::Equal
            | Operator::NotEqual
            | Operator::GreaterThan
            | Operator::GreaterEqual
            | Operator::LessThan
            | Operator::LessEqual => Arity::One,
            Operator::IsTrue | Operator::IsFalse | Operator::IsNull | Operator::IsNotNull => {
                Arity::None
            }
            Operator::Contains | Operator::NotContains | Operator::Starts | Operator::NotStarts => {
                Arity::Pattern
            }
            Operator::In | Operator::NotIn => Arity::List,
            Operator::Between => Arity::Range,
        }
    }

    /// Canonical spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::GreaterThan => ">",
            Operator::GreaterEqual => ">=",
            Operator::LessThan => "<",
            Operator::LessEqual => "<=",
            Operator::IsTrue => "is true",
            Operator::IsFalse => "is false",
            Operator::IsNull => "is null",
            Operator::IsNotNull => "is not null",
            Operator::Contains => "contains",
            Operator::NotContains => "not contains",
            Operator::Starts => "starts",
            Operator::NotStarts => "not starts",
            Operator::In => "in",
            Operator::NotIn => "not in",
            Operator::Between => "between",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Logical connectives. `&&`/`and` and `||`/`or` are synonyms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn from_token(token: &Token) -> Option<Self> {
        match token {
            Token::And => Some(LogicalOp::And),
            Token::Or => Some(LogicalOp::Or),
            _ => None,
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => f.write_str("&&"),
            LogicalOp::Or => f.write_str("||"),
        }
    }
}
