use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    /// Fatal errors abort the compile step; every other kind is a diagnostic
    /// collected alongside its siblings.
    pub fn is_fatal(&self) -> bool {
        matches!(self.internal_error, ErrorImpl::MalformedTree { .. })
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::NestingTooDeep { .. } => "NestingTooDeep",
            ErrorImpl::DefinitionAlreadyDeclared { .. } => "DefinitionAlreadyDeclared",
            ErrorImpl::UndefinedName { .. } => "UndefinedName",
            ErrorImpl::WrongArgumentCount { .. } => "WrongArgumentCount",
            ErrorImpl::RoutineInExpression { .. } => "RoutineInExpression",
            ErrorImpl::AssignToNonVariable { .. } => "AssignToNonVariable",
            ErrorImpl::ReturnValueOutsideFunction => "ReturnValueOutsideFunction",
            ErrorImpl::ReturnOutsideRoutine => "ReturnOutsideRoutine",
            ErrorImpl::BreakOutsideLoop => "BreakOutsideLoop",
            ErrorImpl::MalformedTree { .. } => "MalformedTree",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => {
                ErrorTip::Suggestion(format!("Invalid number: `{}`", token))
            }
            ErrorImpl::NestingTooDeep { limit } => ErrorTip::Suggestion(format!(
                "Blocks and expressions may nest at most {} levels deep",
                limit
            )),
            ErrorImpl::DefinitionAlreadyDeclared { name } => ErrorTip::Suggestion(format!(
                "`{}` is already declared in this scope",
                name
            )),
            ErrorImpl::UndefinedName { name } => {
                ErrorTip::Suggestion(format!("`{}` is not defined", name))
            }
            ErrorImpl::WrongArgumentCount {
                name,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "`{}` expects {} arguments, received {}",
                name, expected, received
            )),
            ErrorImpl::RoutineInExpression { name } => ErrorTip::Suggestion(format!(
                "`{}` has no value, call it as a statement instead",
                name
            )),
            ErrorImpl::AssignToNonVariable { name } => {
                ErrorTip::Suggestion(format!("`{}` is not a variable", name))
            }
            ErrorImpl::ReturnValueOutsideFunction => ErrorTip::Suggestion(String::from(
                "Only a function can return a value",
            )),
            ErrorImpl::ReturnOutsideRoutine => ErrorTip::Suggestion(String::from(
                "`return` must be inside a function, sub, task or routine",
            )),
            ErrorImpl::BreakOutsideLoop => {
                ErrorTip::Suggestion(String::from("`break` must be inside a loop"))
            }
            ErrorImpl::MalformedTree { .. } => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.internal_error, self.position)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
    #[error("{name:?} already declared in this scope")]
    DefinitionAlreadyDeclared { name: String },
    #[error("{name:?} is not defined")]
    UndefinedName { name: String },
    #[error("wrong number of arguments for {name:?}: expected {expected}, received {received}")]
    WrongArgumentCount {
        name: String,
        expected: usize,
        received: usize,
    },
    #[error("{name:?} has no value and cannot be used in an expression")]
    RoutineInExpression { name: String },
    #[error("cannot assign to {name:?}")]
    AssignToNonVariable { name: String },
    #[error("return with a value outside of a function")]
    ReturnValueOutsideFunction,
    #[error("return outside of a routine")]
    ReturnOutsideRoutine,
    #[error("break outside of a loop")]
    BreakOutsideLoop,
    #[error("malformed syntax tree: {reason}")]
    MalformedTree { reason: String },
}
