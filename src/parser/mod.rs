//! Parser module for building the node arena.
//!
//! This module contains the parser that transforms a stream of tokens
//! into an [`Ast`](crate::ast::ast::Ast). It uses a Pratt parser for
//! expressions with proper operator precedence and handles:
//!
//! - Statement parsing (declarations, routines, control flow, assignments)
//! - Expression parsing (binary ops, calls, indexing, literals)
//! - Name tables for every block, seeded with the host built-ins at the root
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;

#[cfg(test)]
mod tests;
