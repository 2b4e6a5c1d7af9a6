//! Operators appearing in expressions.

use std::fmt::Display;

use crate::lexer::tokens::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    Abs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Cat,
}

/// How an operator decides its result type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    /// `+` and `-`: real arithmetic, or element-wise on arrays.
    ArithOrArray,
    /// `*`, `/`, `%`, `^`: always real.
    Arith,
    /// Always bool.
    Compare,
    /// `&&` and `||` yield one of their operands.
    Logical,
    /// `~`
    Concat,
}

impl BinaryOp {
    pub fn class(self) -> OperatorClass {
        match self {
            BinaryOp::Add | BinaryOp::Sub => OperatorClass::ArithOrArray,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem | BinaryOp::Pow => {
                OperatorClass::Arith
            }
            BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::Le
            | BinaryOp::Ge
            | BinaryOp::Eq
            | BinaryOp::Ne => OperatorClass::Compare,
            BinaryOp::And | BinaryOp::Or => OperatorClass::Logical,
            BinaryOp::Cat => OperatorClass::Concat,
        }
    }

    pub fn from_token(kind: TokenKind) -> Option<BinaryOp> {
        Some(match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Dash => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Rem,
            TokenKind::Caret => BinaryOp::Pow,
            TokenKind::Less => BinaryOp::Lt,
            TokenKind::Greater => BinaryOp::Gt,
            TokenKind::LessEquals => BinaryOp::Le,
            TokenKind::GreaterEquals => BinaryOp::Ge,
            TokenKind::Equals => BinaryOp::Eq,
            TokenKind::NotEquals => BinaryOp::Ne,
            TokenKind::And => BinaryOp::And,
            TokenKind::Or => BinaryOp::Or,
            TokenKind::Tilde => BinaryOp::Cat,
            _ => return None,
        })
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Pow => "^",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Cat => "~",
        };
        write!(f, "{}", symbol)
    }
}
