//! # Sieve Filter Language - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for the Sieve filter
//! language, a small condition language that compiles into typed predicates
//! over an entity schema.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[operators]** - Predicate operators and logical connectives
//! - **[clauses]** - Predicate and group nodes built by the parser
//!
//! ## Quick Start
//!
//! ```text
//! firstName = 'Charles' && (age < 30 || email is null)
//! ```
//!
//! This filter keeps records named Charles that are either younger than 30 or
//! have no email address.
//!
//! ## Core Concepts
//!
//! ### Attribute Paths
//!
//! Attributes are addressed with dotted paths. Every segment except the last
//! one traverses a relationship:
//!
//! ```text
//! comments.author.email = 'a_two@mail.com'
//! ```
//!
//! ### Folding Order
//!
//! `&&` and `||` have the same precedence. A chain is folded strictly from
//! left to right, so `a || b && c` means `(a || b) && c`. Parentheses are the
//! only way to group differently.
//!
//! ## Examples
//!
//! ### Range and Membership
//!
//! ```text
//! age between 50 and 100 && address.street in ('Street A', 'Street B')
//! ```
//!
//! ### Case-insensitive Matching
//!
//! ```text
//! firstName starts 'ch' or firstName not contains '.'
//! ```
pub mod clauses;
pub mod operators;
pub mod tokens;

pub use clauses::{Clause, Group, Operand, Predicate};
pub use operators::{Arity, LogicalOp, Operator};
pub use tokens::{Spanned, Token};
