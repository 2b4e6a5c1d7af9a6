//! Semantics checker.
//!
//! A second walk over the parsed tree, independent of the analyzer's
//! annotations, that reports undefined names, arity mismatches, invalid
//! assignment targets and misplaced `return` / `break` statements.

pub mod checker;

#[cfg(test)]
mod tests;
