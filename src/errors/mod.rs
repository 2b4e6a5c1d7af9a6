//! Error types and error handling for the analyzer.
//!
//! This module defines the error types used throughout the pipeline:
//!
//! - Error structures with source position information
//! - Front-end errors (lexing and parsing) which stop the pipeline
//! - Semantic diagnostics collected by the checker
//! - The fatal malformed-tree error raised by the analyzer
//! - Helpful error messages and suggestions

pub mod errors;
