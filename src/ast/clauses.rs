use std::fmt;

use crate::{
    ast::{LogicalOp, Operator},
    lexer::Position,
};

/// Literal operand of a predicate, kept as source text until the target
/// field's type is known.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Quoted string, quotes removed
    String(String),
    /// Number as written, sign included
    Number(String),
}

impl Operand {
    pub fn text(&self) -> &str {
        match self {
            Operand::String(s) | Operand::Number(s) => s,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::String(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Operand::Number(n) => f.write_str(n),
        }
    }
}

/// Atomic condition on one attribute.
///
/// # Examples
/// ```text
/// age >= 30
/// email is not null
/// address.street in ('Street A', 'Street B')
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Dotted attribute path as written
    pub path: String,
    pub operator: Operator,
    /// Operand literals in source order
    pub operands: Vec<Operand>,
    /// Position of the attribute path
    pub position: Position,
}

/// A node of the filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Predicate(Predicate),
    /// Parenthesized sub-query
    Group(Group),
}

/// Sequence of clauses joined by logical operators.
///
/// A group always holds at least one clause and exactly one operator between
/// each pair of consecutive clauses. It is folded from left to right without
/// any precedence between `&&` and `||`.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    first: Box<Clause>,
    rest: Vec<(LogicalOp, Clause)>,
}

impl Group {
    pub fn new(first: Clause) -> Self {
        Group {
            first: Box::new(first),
            rest: Vec::new(),
        }
    }

    /// Appends `clause`, joined to what precedes it by `op`.
    pub fn push(&mut self, op: LogicalOp, clause: Clause) {
        self.rest.push((op, clause));
    }

    pub fn first(&self) -> &Clause {
        &self.first
    }

    /// Clauses after the first, each with the operator that precedes it.
    pub fn rest(&self) -> &[(LogicalOp, Clause)] {
        &self.rest
    }

    pub fn children(&self) -> impl Iterator<Item = &Clause> {
        std::iter::once(self.first.as_ref()).chain(self.rest.iter().map(|(_, clause)| clause))
    }

    pub fn operators(&self) -> impl Iterator<Item = LogicalOp> + '_ {
        self.rest.iter().map(|(op, _)| *op)
    }

    /// Every atomic predicate in the group, depth first.
    pub fn predicates(&self) -> Vec<&Predicate> {
        let mut found = Vec::new();
        collect_predicates(self, &mut found);
        found
    }
}

fn collect_predicates<'a>(group: &'a Group, found: &mut Vec<&'a Predicate>) {
    for clause in group.children() {
        match clause {
            Clause::Predicate(p) => found.push(p),
            Clause::Group(g) => collect_predicates(g, found),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.operator)?;
        match self.operator {
            Operator::In | Operator::NotIn => {
                let items: Vec<String> = self.operands.iter().map(|o| o.to_string()).collect();
                write!(f, " ({})", items.join(", "))
            }
            Operator::Between => match self.operands.as_slice() {
                [.., low, high] => write!(f, " {low} and {high}"),
                _ => Ok(()),
            },
            _ => {
                for operand in &self.operands {
                    write!(f, " {operand}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Predicate(p) => write!(f, "{p}"),
            Clause::Group(g) => write!(f, "({g})"),
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for (op, clause) in &self.rest {
            write!(f, " {op} {clause}")?;
        }
        Ok(())
    }
}
