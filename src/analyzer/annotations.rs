//! Side table of analysis results.
//!
//! The tree never changes after parsing; everything the analyzer learns is
//! recorded here, indexed by [`NodeId`].

use rustc_hash::FxHashMap;

use crate::{
    ast::{
        ast::{Ast, NodeId},
        statements::Definition,
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeAnnotation {
    /// Evaluating the node has no observable side effect.
    pub no_sub_effect: bool,
    pub exp_type: Type,
    /// The produced value may alias storage and needs copying before reuse.
    pub copy_required: bool,
}

impl Default for NodeAnnotation {
    fn default() -> Self {
        NodeAnnotation {
            no_sub_effect: false,
            exp_type: Type::Any,
            copy_required: true,
        }
    }
}

/// Analysis state of a definition.
#[derive(Debug, Clone, PartialEq)]
pub struct DefState {
    /// Set until the definition is first analysed.
    pub unreachable: bool,
    pub ret_type: Type,
    pub ref_cnt: u32,
    pub assign_cnt: u32,
}

impl Default for DefState {
    fn default() -> Self {
        DefState {
            unreachable: true,
            ret_type: Type::Any,
            ref_cnt: 0,
            assign_cnt: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotations {
    nodes: Vec<NodeAnnotation>,
    visits: Vec<u32>,
    defs: FxHashMap<NodeId, DefState>,
}

fn missing(id: NodeId, what: &str) -> Error {
    Error::new(
        ErrorImpl::MalformedTree {
            reason: format!("node {} has no {}", id, what),
        },
        Position::null(),
    )
}

impl Annotations {
    /// Fresh table for `ast`: every node unvisited, every definition
    /// unreachable. Host built-ins start with their declared purity and
    /// return type.
    pub fn new(ast: &Ast) -> Self {
        let mut annotations = Annotations {
            nodes: vec![NodeAnnotation::default(); ast.len()],
            visits: vec![0; ast.len()],
            defs: FxHashMap::default(),
        };

        for (id, def) in ast.definitions() {
            let mut state = DefState::default();
            match def {
                Definition::BuiltInFunc { ret_type, pure, .. } => {
                    state.ret_type = ret_type.clone();
                    annotations.nodes[id.index()].no_sub_effect = *pure;
                }
                Definition::Const { ty, .. } => {
                    state.ret_type = ty.clone();
                    annotations.nodes[id.index()].no_sub_effect = true;
                }
                _ => {}
            }
            annotations.defs.insert(id, state);
        }

        annotations
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeAnnotation> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut NodeAnnotation, Error> {
        self.nodes
            .get_mut(id.index())
            .ok_or_else(|| missing(id, "annotation"))
    }

    pub fn no_sub_effect(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|annotation| annotation.no_sub_effect)
    }

    pub fn exp_type(&self, id: NodeId) -> Type {
        self.get(id)
            .map(|annotation| annotation.exp_type.clone())
            .unwrap_or_default()
    }

    pub fn copy_required(&self, id: NodeId) -> bool {
        self.get(id).map_or(true, |annotation| annotation.copy_required)
    }

    pub fn def_state(&self, id: NodeId) -> Option<&DefState> {
        self.defs.get(&id)
    }

    pub fn def_state_mut(&mut self, id: NodeId) -> Result<&mut DefState, Error> {
        self.defs
            .get_mut(&id)
            .ok_or_else(|| missing(id, "definition state"))
    }

    pub fn visit(&mut self, id: NodeId) {
        if let Some(count) = self.visits.get_mut(id.index()) {
            *count += 1;
        }
    }

    /// How many times the analyzer traversed the node.
    pub fn visit_count(&self, id: NodeId) -> u32 {
        self.visits.get(id.index()).copied().unwrap_or(0)
    }

    pub fn is_visited(&self, id: NodeId) -> bool {
        self.visit_count(id) > 0
    }

    pub fn is_reachable(&self, id: NodeId) -> bool {
        self.def_state(id).is_some_and(|state| !state.unreachable)
    }

    /// Variables on an executed path that are never read.
    pub fn unused_variables<'a>(&'a self, ast: &'a Ast) -> impl Iterator<Item = NodeId> + 'a {
        ast.definitions().filter_map(move |(id, def)| {
            let state = self.def_state(id)?;
            let live = !state.unreachable || self.is_visited(id);
            (matches!(def, Definition::VarDecl { .. }) && live && state.ref_cnt == 0).then_some(id)
        })
    }

    /// Callable definitions whose body was never analysed.
    pub fn unreachable_definitions<'a>(
        &'a self,
        ast: &'a Ast,
    ) -> impl Iterator<Item = NodeId> + 'a {
        ast.definitions().filter_map(move |(id, def)| {
            let state = self.def_state(id)?;
            (def.body().is_some() && state.unreachable).then_some(id)
        })
    }
}
