#![allow(clippy::module_inception)]

use std::{fmt::Display, rc::Rc};

use crate::{
    analyzer::{analyzer::analyze, annotations::Annotations},
    ast::ast::Ast,
    builtins::BuiltinTable,
    checker::checker::check,
    config::AnalyzerConfig,
    errors::errors::{Error, ErrorTip},
    lexer::lexer::tokenize,
    parser::parser::parse,
};

pub mod analyzer;
pub mod ast;
pub mod builtins;
pub mod checker;
pub mod config;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;

extern crate regex;

/// Byte offset into a named source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.1, self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Line number (1-based), line text and column of a byte offset.
pub fn get_line_at_position(source: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;
    let mut start = 0;

    for (index, line) in source.split_inclusive('\n').enumerate() {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return Some((index + 1, line.to_string(), pos - start));
        }

        start = end;
    }

    None
}

/// Renders a diagnostic with the offending line and a marker under it.
pub fn render_error(error: &Error, source: &str) -> String {
    /*
        Error: BreakOutsideLoop (`break` must be inside a loop)
        -> stage.dnh
           |
        20 | break;
           | -^
    */

    let position = error.get_position();
    let mut rendered = match error.get_tip() {
        ErrorTip::None => format!("Error: {}\n", error.get_error_name()),
        tip => format!("Error: {} ({})\n", error.get_error_name(), tip),
    };
    rendered.push_str(&format!("-> {}\n", position.1));

    let Some((line, line_text, line_pos)) = get_line_at_position(source, position.0) else {
        return rendered;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;
    rendered.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    rendered.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;
    rendered.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));

    rendered
}

pub fn display_error(error: &Error, source: &str) {
    eprint!("{}", render_error(error, source));
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let trimmed = string.trim_start_matches([' ', '\t']);
    (String::from(trimmed), string.len() - trimmed.len())
}

/// A script that passed every stage, with its annotations.
#[derive(Debug)]
pub struct AnalyzedScript {
    pub ast: Ast,
    pub annotations: Annotations,
}

/// Runs the whole pipeline: tokenize, parse, analyze, check.
///
/// Front-end failures and malformed trees produce a single error; otherwise
/// every checker diagnostic is returned together.
#[tracing::instrument(skip(source, builtins, config))]
pub fn analyze_source(
    source: &str,
    file: &str,
    builtins: &BuiltinTable,
    config: &AnalyzerConfig,
) -> Result<AnalyzedScript, Vec<Error>> {
    let tokens = tokenize(source.to_string(), Some(file.to_string())).map_err(|error| vec![error])?;
    tracing::debug!(tokens = tokens.len(), "tokenized");

    let ast = parse(tokens, Rc::new(file.to_string()), builtins).map_err(|error| vec![error])?;
    let annotations = analyze(&ast, config).map_err(|error| vec![error])?;

    split_fatal(check(&ast))?;

    Ok(AnalyzedScript { ast, annotations })
}

/// A fatal error replaces every other diagnostic, since the tree it was
/// found in cannot be trusted.
fn split_fatal(mut diagnostics: Vec<Error>) -> Result<(), Vec<Error>> {
    if diagnostics.is_empty() {
        return Ok(());
    }

    match diagnostics.iter().position(Error::is_fatal) {
        Some(index) => Err(vec![diagnostics.swap_remove(index)]),
        None => Err(diagnostics),
    }
}
