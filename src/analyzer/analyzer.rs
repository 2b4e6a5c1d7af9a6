use std::rc::Rc;

use crate::{
    ast::{
        ast::{Ast, NodeId, NodeKind},
        expressions::{OperatorClass, UnaryOp},
        statements::Definition,
        types::Type,
    },
    config::AnalyzerConfig,
    errors::errors::{Error, ErrorImpl},
};

use super::{annotations::Annotations, environment::Environment};

/// Infers types, effects and copy requirements for everything reachable from
/// the root block and the host entry routines.
///
/// Definitions are analysed lazily: a body is walked the first time its name
/// is resolved from reachable code, never before and never twice.
pub struct CodeAnalyzer<'a> {
    ast: &'a Ast,
    config: &'a AnalyzerConfig,
    annotations: Annotations,
}

impl<'a> CodeAnalyzer<'a> {
    pub fn new(ast: &'a Ast, config: &'a AnalyzerConfig) -> Self {
        CodeAnalyzer {
            ast,
            config,
            annotations: Annotations::new(ast),
        }
    }

    pub fn run(mut self) -> Result<Annotations, Error> {
        let root = self.ast.root();
        self.annotations.visit(root);
        self.traverse_block(root, None)?;
        Ok(self.annotations)
    }

    fn annotate(
        &mut self,
        id: NodeId,
        no_sub_effect: bool,
        exp_type: Type,
        copy_required: bool,
    ) -> Result<(), Error> {
        let annotation = self.annotations.get_mut(id)?;
        annotation.no_sub_effect = no_sub_effect;
        annotation.exp_type = exp_type;
        annotation.copy_required = copy_required;
        Ok(())
    }

    fn set_no_sub_effect(&mut self, id: NodeId, no_sub_effect: bool) -> Result<(), Error> {
        self.annotations.get_mut(id)?.no_sub_effect = no_sub_effect;
        Ok(())
    }

    fn effect_free(&self, id: NodeId) -> bool {
        self.annotations.no_sub_effect(id)
    }

    fn type_of(&self, id: NodeId) -> Type {
        self.annotations.exp_type(id)
    }

    fn traverse_all(&mut self, ids: &[NodeId], env: &Rc<Environment>) -> Result<bool, Error> {
        let mut no_sub_effect = true;
        for id in ids {
            self.traverse(*id, env)?;
            no_sub_effect &= self.effect_free(*id);
        }
        Ok(no_sub_effect)
    }

    fn traverse_block(&mut self, id: NodeId, parent: Option<&Rc<Environment>>) -> Result<(), Error> {
        let ast = self.ast;
        let node = ast.node(id)?;
        let NodeKind::Block { stmts, table } = &node.kind else {
            return Err(Error::new(
                ErrorImpl::MalformedTree {
                    reason: format!("node {} is not a block", id),
                },
                node.span.start.clone(),
            ));
        };

        let env = Environment::new(table.clone(), parent.cloned());
        tracing::trace!(block = %id, depth = env.depth(), "enter block");

        if env.is_root() {
            for name in &self.config.entry_routines {
                if env.own_definition(name).is_some() {
                    tracing::debug!(routine = name.as_str(), "forcing entry routine");
                }
                self.analyze_def(name, &env)?;
            }
        }

        for stmt in stmts {
            self.traverse(*stmt, &env)?;
        }

        Ok(())
    }

    /// Finds the scope declaring `name` and, on first reference, analyses the
    /// definition there. The flag is cleared before descending so recursive
    /// references stop here.
    fn analyze_def(&mut self, name: &str, env: &Rc<Environment>) -> Result<Option<NodeId>, Error> {
        let Some((def_env, def)) = env.defining_scope(name) else {
            return Ok(None);
        };

        let state = self.annotations.def_state_mut(def)?;
        if state.unreachable {
            state.unreachable = false;
            tracing::trace!(name, def = %def, "analysing definition");
            self.traverse(def, &def_env)?;
        }

        Ok(Some(def))
    }

    fn count_use(&mut self, def: NodeId, assignment: bool) -> Result<(), Error> {
        let ast = self.ast;
        if let Definition::VarDecl { .. } = ast.definition(def)? {
            let state = self.annotations.def_state_mut(def)?;
            if assignment {
                state.assign_cnt += 1;
            } else {
                state.ref_cnt += 1;
            }
        }
        Ok(())
    }

    /// Identifier reads and call expressions.
    fn analyze_reference(
        &mut self,
        id: NodeId,
        name: &str,
        args: &[NodeId],
        env: &Rc<Environment>,
    ) -> Result<(), Error> {
        let Some(def_id) = self.analyze_def(name, env)? else {
            tracing::debug!(name, node = %id, "unresolved identifier");
            self.traverse_all(args, env)?;
            return self.annotate(id, false, Type::Any, true);
        };

        let ast = self.ast;
        let def = ast.definition(def_id)?;
        let copy_required = !def.is_host_provided();
        let ret_type = self
            .annotations
            .def_state(def_id)
            .map(|state| state.ret_type.clone())
            .unwrap_or_default();

        let mut no_sub_effect = self.effect_free(def_id);
        no_sub_effect &= self.traverse_all(args, env)?;
        self.count_use(def_id, false)?;

        self.annotate(id, no_sub_effect, ret_type, copy_required)
    }

    fn analyze_definition(
        &mut self,
        id: NodeId,
        def: &Definition,
        env: &Rc<Environment>,
    ) -> Result<(), Error> {
        match def {
            Definition::VarDecl { .. }
            | Definition::ProcParam { .. }
            | Definition::LoopParam { .. }
            | Definition::Result => self.set_no_sub_effect(id, true),
            Definition::Sub { block, .. }
            | Definition::EntryRoutine { block, .. }
            | Definition::Func { block, .. }
            | Definition::Task { block, .. } => self.traverse(*block, env),
            Definition::BuiltInFunc { .. } | Definition::Const { .. } => Ok(()),
        }
    }

    fn traverse(&mut self, id: NodeId, env: &Rc<Environment>) -> Result<(), Error> {
        let ast = self.ast;
        let node = ast.node(id)?;
        self.annotations.visit(id);

        match &node.kind {
            NodeKind::Num(_) => self.annotate(id, true, Type::Real, false)?,
            NodeKind::Char(_) => self.annotate(id, true, Type::Char, false)?,
            NodeKind::Str(value) => {
                // The empty string is the empty array
                let ty = if value.is_empty() {
                    Type::empty_array()
                } else {
                    Type::String
                };
                self.annotate(id, true, ty, false)?
            }
            NodeKind::Array(elems) => {
                let no_sub_effect = self.traverse_all(elems, env)?;
                let copy_required = elems
                    .iter()
                    .any(|elem| self.annotations.copy_required(*elem));
                let types: Vec<Type> = elems.iter().map(|elem| self.type_of(*elem)).collect();
                let ty = Type::array(Type::unify_elements(&types));
                self.annotate(id, no_sub_effect, ty, copy_required)?
            }
            NodeKind::Unary { op, operand } => {
                self.traverse(*operand, env)?;
                let ty = match op {
                    UnaryOp::Neg | UnaryOp::Abs => Type::Real,
                    UnaryOp::Not => Type::Bool,
                };
                let no_sub_effect = self.effect_free(*operand);
                self.annotate(id, no_sub_effect, ty, false)?
            }
            NodeKind::Binary { op, lhs, rhs } => {
                self.traverse(*lhs, env)?;
                self.traverse(*rhs, env)?;
                let no_sub_effect = self.effect_free(*lhs) && self.effect_free(*rhs);
                let (lhs_type, rhs_type) = (self.type_of(*lhs), self.type_of(*rhs));
                let either_copied =
                    self.annotations.copy_required(*lhs) || self.annotations.copy_required(*rhs);

                let (ty, copy_required) = match op.class() {
                    OperatorClass::ArithOrArray => {
                        let ty = if lhs_type == Type::Real && rhs_type == Type::Real {
                            Type::Real
                        } else if lhs_type.is_array() && rhs_type.is_array() {
                            lhs_type.unify(&rhs_type)
                        } else {
                            Type::Any
                        };
                        (ty, false)
                    }
                    OperatorClass::Arith => (Type::Real, false),
                    OperatorClass::Compare => (Type::Bool, false),
                    OperatorClass::Logical => {
                        let ty = if lhs_type == rhs_type {
                            lhs_type
                        } else {
                            Type::Any
                        };
                        (ty, either_copied)
                    }
                    OperatorClass::Concat => {
                        let ty = if lhs_type.is_array_like() && rhs_type.is_array_like() {
                            lhs_type.unify(&rhs_type)
                        } else {
                            Type::array(Type::Any)
                        };
                        (ty, either_copied)
                    }
                };
                self.annotate(id, no_sub_effect, ty, copy_required)?
            }
            NodeKind::NoParenCall { name } => self.analyze_reference(id, name, &[], env)?,
            NodeKind::Call { name, args } => self.analyze_reference(id, name, args, env)?,
            NodeKind::ArrayRef { array, index } => {
                self.traverse(*array, env)?;
                self.traverse(*index, env)?;
                let no_sub_effect = self.effect_free(*array) && self.effect_free(*index);
                let ty = self.type_of(*array).element();
                self.annotate(id, no_sub_effect, ty, false)?
            }
            NodeKind::Range { start, end } => {
                self.traverse(*start, env)?;
                self.traverse(*end, env)?;
                let no_sub_effect = self.effect_free(*start) && self.effect_free(*end);
                self.set_no_sub_effect(id, no_sub_effect)?
            }
            NodeKind::ArraySlice { array, range } => {
                self.traverse(*array, env)?;
                self.traverse(*range, env)?;
                let no_sub_effect = self.effect_free(*array) && self.effect_free(*range);
                let array_type = self.type_of(*array);
                let ty = if array_type.is_array_like() {
                    array_type
                } else {
                    Type::Any
                };
                self.annotate(id, no_sub_effect, ty, false)?
            }
            NodeKind::LeftVal { name, indices } => {
                let def = self.analyze_def(name, env)?;
                self.traverse_all(indices, env)?;
                if let Some(def) = def {
                    self.count_use(def, true)?;
                }
            }
            NodeKind::Assign { lhs, rhs, .. } => {
                self.traverse(*lhs, env)?;
                self.traverse(*rhs, env)?;
                self.set_no_sub_effect(id, false)?
            }
            NodeKind::Succ { lhs } | NodeKind::Pred { lhs } => {
                self.traverse(*lhs, env)?;
                self.set_no_sub_effect(id, false)?
            }
            NodeKind::VarInit { name, rhs } => {
                let def = self.analyze_def(name, env)?;
                self.traverse(*rhs, env)?;
                self.set_no_sub_effect(id, false)?;
                if let Some(def) = def {
                    self.count_use(def, true)?;
                }
            }
            NodeKind::CallStmt { name, args } => {
                if self.analyze_def(name, env)?.is_none() {
                    tracing::debug!(name = name.as_str(), node = %id, "unresolved call");
                }
                self.traverse_all(args, env)?;
            }
            NodeKind::Return { value } => self.traverse(*value, env)?,
            NodeKind::Block { .. } => self.traverse_block(id, Some(env))?,
            NodeKind::Local { block } | NodeKind::Loop { block } => self.traverse(*block, env)?,
            NodeKind::Times { count: first, block }
            | NodeKind::While { cond: first, block }
            | NodeKind::Ascent { range: first, block }
            | NodeKind::Descent { range: first, block }
            | NodeKind::ElseIf { cond: first, block } => {
                self.traverse(*first, env)?;
                self.traverse(*block, env)?;
            }
            NodeKind::If {
                cond,
                then_block,
                elsifs,
                else_block,
            } => {
                self.traverse(*cond, env)?;
                self.traverse(*then_block, env)?;
                self.traverse_all(elsifs, env)?;
                if let Some(else_block) = else_block {
                    self.traverse(*else_block, env)?;
                }
            }
            NodeKind::Case { exps, block } => {
                self.traverse_all(exps, env)?;
                self.traverse(*block, env)?;
            }
            NodeKind::Alternative {
                cond,
                cases,
                others,
            } => {
                self.traverse(*cond, env)?;
                self.traverse_all(cases, env)?;
                if let Some(others) = others {
                    self.traverse(*others, env)?;
                }
            }
            NodeKind::Def(def) => self.analyze_definition(id, def, env)?,
            NodeKind::Nop
            | NodeKind::ReturnVoid
            | NodeKind::Yield
            | NodeKind::Break
            | NodeKind::Header { .. } => {}
        }

        Ok(())
    }
}

/// Analyses a parsed script and returns its annotation table.
///
/// Only a structurally broken tree is an error; unresolved names and type
/// mismatches fall back to `any` and are left for the checker.
#[tracing::instrument(skip_all, fields(nodes = ast.len()))]
pub fn analyze(ast: &Ast, config: &AnalyzerConfig) -> Result<Annotations, Error> {
    let annotations = CodeAnalyzer::new(ast, config).run()?;
    tracing::debug!(
        unreachable = annotations.unreachable_definitions(ast).count(),
        "analysis finished"
    );
    Ok(annotations)
}
