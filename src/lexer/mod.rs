//! Lexical analysis module for the script front end.
//!
//! This module contains the lexer (tokenizer) that converts script source
//! into a stream of tokens for parsing. It handles:
//!
//! - Tokenization of source code using an ordered regex table
//! - Recognition of keywords, identifiers, literals, and operators
//! - Entry routine markers (`@Initialize`) and headers (`#Title[...]`)
//! - Token position tracking for error reporting
//! - Comments and whitespace handling

pub mod lexer;
pub mod tokens;
