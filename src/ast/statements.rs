//! Statement operators and the definition variants.

use crate::lexer::tokens::TokenKind;

use super::{ast::NodeId, types::Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Cat,
}

impl AssignOp {
    pub fn from_token(kind: TokenKind) -> Option<AssignOp> {
        Some(match kind {
            TokenKind::Assignment => AssignOp::Assign,
            TokenKind::PlusEquals => AssignOp::Add,
            TokenKind::MinusEquals => AssignOp::Sub,
            TokenKind::StarEquals => AssignOp::Mul,
            TokenKind::SlashEquals => AssignOp::Div,
            TokenKind::PercentEquals => AssignOp::Rem,
            TokenKind::CaretEquals => AssignOp::Pow,
            TokenKind::TildeEquals => AssignOp::Cat,
            _ => return None,
        })
    }
}

/// Definition
///
/// A node that introduces a name. Definitions are owned by the tree like any
/// other node and are additionally referenced by id from the name table of
/// the block that declares them.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    VarDecl {
        name: String,
    },
    ProcParam {
        name: String,
    },
    LoopParam {
        name: String,
    },
    /// The implicit `result` slot of a function.
    Result,
    Sub {
        name: String,
        block: NodeId,
    },
    /// `@Initialize`, `@MainLoop`, ... invoked by the host runtime.
    EntryRoutine {
        name: String,
        block: NodeId,
    },
    Func {
        name: String,
        params: Vec<NodeId>,
        block: NodeId,
    },
    Task {
        name: String,
        params: Vec<NodeId>,
        block: NodeId,
    },
    BuiltInFunc {
        name: String,
        arity: usize,
        ret_type: Type,
        pure: bool,
    },
    Const {
        name: String,
        ty: Type,
    },
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::VarDecl { name }
            | Definition::ProcParam { name }
            | Definition::LoopParam { name }
            | Definition::Sub { name, .. }
            | Definition::EntryRoutine { name, .. }
            | Definition::Func { name, .. }
            | Definition::Task { name, .. }
            | Definition::BuiltInFunc { name, .. }
            | Definition::Const { name, .. } => name,
            Definition::Result => "result",
        }
    }

    /// Number of arguments a call must supply.
    pub fn arity(&self) -> usize {
        match self {
            Definition::Func { params, .. } | Definition::Task { params, .. } => params.len(),
            Definition::BuiltInFunc { arity, .. } => *arity,
            _ => 0,
        }
    }

    /// Body block for definitions that have one.
    pub fn body(&self) -> Option<NodeId> {
        match self {
            Definition::Sub { block, .. }
            | Definition::EntryRoutine { block, .. }
            | Definition::Func { block, .. }
            | Definition::Task { block, .. } => Some(*block),
            _ => None,
        }
    }

    /// Storage the script may assign to.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Definition::VarDecl { .. }
                | Definition::ProcParam { .. }
                | Definition::LoopParam { .. }
                | Definition::Result
        )
    }

    /// Host-provided definitions whose values are immutable or always fresh.
    pub fn is_host_provided(&self) -> bool {
        matches!(
            self,
            Definition::BuiltInFunc { .. } | Definition::Const { .. }
        )
    }

    /// Routines that produce no value: subs, tasks and entry routines.
    pub fn is_valueless_routine(&self) -> bool {
        matches!(
            self,
            Definition::Sub { .. } | Definition::Task { .. } | Definition::EntryRoutine { .. }
        )
    }
}
