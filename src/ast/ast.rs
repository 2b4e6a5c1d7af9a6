use std::fmt::Display;

use rustc_hash::FxHashMap;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Span,
};

use super::{
    expressions::{BinaryOp, UnaryOp},
    statements::{AssignOp, Definition},
};

/// Stable index of a node inside its [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Names declared directly in one block.
pub type NameTable = FxHashMap<String, NodeId>;

/// Node Kinds
///
/// One variant per syntactic form. Children are referenced by [`NodeId`];
/// the tree shape never changes once the parser has finished.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // Expressions
    Num(f64),
    Char(char),
    Str(String),
    Array(Vec<NodeId>),
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    /// A bare identifier: a variable read or a call without parentheses.
    NoParenCall {
        name: String,
    },
    Call {
        name: String,
        args: Vec<NodeId>,
    },
    ArrayRef {
        array: NodeId,
        index: NodeId,
    },
    Range {
        start: NodeId,
        end: NodeId,
    },
    ArraySlice {
        array: NodeId,
        range: NodeId,
    },

    // Statements
    Nop,
    /// Assignment target: `name[i][j]...`
    LeftVal {
        name: String,
        indices: Vec<NodeId>,
    },
    Assign {
        op: AssignOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    CallStmt {
        name: String,
        args: Vec<NodeId>,
    },
    Return {
        value: NodeId,
    },
    ReturnVoid,
    Yield,
    Break,
    Succ {
        lhs: NodeId,
    },
    Pred {
        lhs: NodeId,
    },
    VarInit {
        name: String,
        rhs: NodeId,
    },
    Block {
        stmts: Vec<NodeId>,
        table: NameTable,
    },
    Local {
        block: NodeId,
    },
    Loop {
        block: NodeId,
    },
    Times {
        count: NodeId,
        block: NodeId,
    },
    While {
        cond: NodeId,
        block: NodeId,
    },
    Ascent {
        range: NodeId,
        block: NodeId,
    },
    Descent {
        range: NodeId,
        block: NodeId,
    },
    ElseIf {
        cond: NodeId,
        block: NodeId,
    },
    If {
        cond: NodeId,
        then_block: NodeId,
        elsifs: Vec<NodeId>,
        else_block: Option<NodeId>,
    },
    Case {
        exps: Vec<NodeId>,
        block: NodeId,
    },
    Alternative {
        cond: NodeId,
        cases: Vec<NodeId>,
        others: Option<NodeId>,
    },
    Header {
        name: String,
        params: Vec<String>,
    },

    Def(Definition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

/// Arena owning every node of a parsed script.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    /// Creates an empty arena; [`Ast::set_root`] must be called once the
    /// outermost block has been pushed.
    pub fn new() -> Self {
        Ast {
            nodes: vec![],
            root: NodeId(0),
        }
    }

    pub fn push(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { kind, span });
        id
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Looks a node up, reporting a dangling id as a malformed tree.
    pub fn node(&self, id: NodeId) -> Result<&Node, Error> {
        self.get(id).ok_or_else(|| {
            Error::new(
                ErrorImpl::MalformedTree {
                    reason: format!("node {} does not exist", id),
                },
                crate::Position::null(),
            )
        })
    }

    /// Looks up a node that must be a definition.
    pub fn definition(&self, id: NodeId) -> Result<&Definition, Error> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Def(def) => Ok(def),
            _ => Err(Error::new(
                ErrorImpl::MalformedTree {
                    reason: format!("node {} is not a definition", id),
                },
                node.span.start.clone(),
            )),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index as u32), node))
    }

    /// Every definition node in the arena, in creation order.
    pub fn definitions(&self) -> impl Iterator<Item = (NodeId, &Definition)> {
        self.iter().filter_map(|(id, node)| match &node.kind {
            NodeKind::Def(def) => Some((id, def)),
            _ => None,
        })
    }
}

impl Default for Ast {
    fn default() -> Self {
        Ast::new()
    }
}
