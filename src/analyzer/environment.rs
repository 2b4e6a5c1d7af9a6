//! Lexical environments.
//!
//! An [`Environment`] is one link of a scope chain: the names declared
//! directly in a block plus a shared pointer to the enclosing scope. It holds
//! no analysis logic; the parser uses it to build name tables and the
//! analyzer and checker use it to resolve names.

use std::{cell::RefCell, rc::Rc};

use crate::{
    ast::ast::{NameTable, NodeId},
    errors::errors::{Error, ErrorImpl},
    Position,
};

#[derive(Debug)]
pub struct Environment {
    parent: Option<Rc<Environment>>,
    table: RefCell<NameTable>,
    depth: usize,
}

impl Environment {
    /// Creates a scope over `table`, nested one level inside `parent`.
    pub fn new(table: NameTable, parent: Option<Rc<Environment>>) -> Rc<Self> {
        let depth = parent.as_ref().map_or(0, |parent| parent.depth + 1);
        Rc::new(Environment {
            parent,
            table: RefCell::new(table),
            depth,
        })
    }

    pub fn root(table: NameTable) -> Rc<Self> {
        Environment::new(table, None)
    }

    /// Declares `name` in this scope.
    ///
    /// A second declaration of the same name in the same scope is rejected;
    /// declarations in enclosing scopes are shadowed.
    pub fn add_definition(
        &self,
        name: &str,
        def: NodeId,
        position: Position,
    ) -> Result<NodeId, Error> {
        let mut table = self.table.borrow_mut();
        if table.contains_key(name) {
            return Err(Error::new(
                ErrorImpl::DefinitionAlreadyDeclared {
                    name: name.to_string(),
                },
                position,
            ));
        }
        table.insert(name.to_string(), def);
        Ok(def)
    }

    /// Resolves `name` from this scope outward.
    pub fn find_definition(&self, name: &str) -> Option<NodeId> {
        let mut env = Some(self);
        while let Some(current) = env {
            if let Some(def) = current.own_definition(name) {
                return Some(def);
            }
            env = current.parent.as_deref();
        }
        None
    }

    /// Looks `name` up in this scope only.
    pub fn own_definition(&self, name: &str) -> Option<NodeId> {
        self.table.borrow().get(name).copied()
    }

    /// Finds the scope whose own table declares `name`, together with the
    /// definition it maps to.
    pub fn defining_scope(self: &Rc<Self>, name: &str) -> Option<(Rc<Environment>, NodeId)> {
        let mut env = Some(Rc::clone(self));
        while let Some(current) = env {
            if let Some(def) = current.own_definition(name) {
                return Some((current, def));
            }
            env = current.parent.clone();
        }
        None
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn parent(&self) -> Option<&Rc<Environment>> {
        self.parent.as_ref()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Moves the declarations out, leaving this scope empty.
    pub fn take_table(&self) -> NameTable {
        std::mem::take(&mut *self.table.borrow_mut())
    }
}
