use std::rc::Rc;

use crate::{
    analyzer::environment::Environment,
    ast::{
        ast::{Ast, NodeId, NodeKind},
        statements::Definition,
    },
    errors::errors::{Error, ErrorImpl},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallableKind {
    Function,
    /// Subs, tasks and entry routines
    Routine,
}

/// Structural checks over the whole tree.
///
/// Every callable body is checked whether or not the analyzer reached it.
/// Diagnostics are collected rather than returned early so one pass reports
/// every violation.
pub struct SemanticsChecker<'a> {
    ast: &'a Ast,
    diagnostics: Vec<Error>,
    callable_stack: Vec<CallableKind>,
    loop_stack: Vec<bool>,
}

impl<'a> SemanticsChecker<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        SemanticsChecker {
            ast,
            diagnostics: vec![],
            callable_stack: vec![],
            loop_stack: vec![],
        }
    }

    pub fn run(mut self) -> Vec<Error> {
        if let Err(fatal) = self.check_block(self.ast.root(), None) {
            self.diagnostics.push(fatal);
        }

        self.diagnostics
            .sort_by_key(|diagnostic| diagnostic.get_position().0);
        self.diagnostics
    }

    fn in_loop(&self) -> bool {
        self.loop_stack.last().copied().unwrap_or(false)
    }

    fn callable(&self) -> Option<CallableKind> {
        self.callable_stack.last().copied()
    }

    fn report(&mut self, error: ErrorImpl, id: NodeId) -> Result<(), Error> {
        let position = self.ast.node(id)?.span.start.clone();
        tracing::debug!(error = %error, position = %position, "diagnostic");
        self.diagnostics.push(Error::new(error, position));
        Ok(())
    }

    fn check_all(&mut self, ids: &[NodeId], env: &Rc<Environment>) -> Result<(), Error> {
        for id in ids {
            self.check(*id, env)?;
        }
        Ok(())
    }

    fn check_block(&mut self, id: NodeId, parent: Option<&Rc<Environment>>) -> Result<(), Error> {
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
        self.check_all(stmts, &env)?;

        // Callable bodies hang off the table only
        let mut defs: Vec<NodeId> = table.values().copied().collect();
        defs.sort();
        for def in defs {
            let (kind, body) = match ast.definition(def)? {
                Definition::Func { block, .. } => (CallableKind::Function, *block),
                Definition::Sub { block, .. }
                | Definition::Task { block, .. }
                | Definition::EntryRoutine { block, .. } => (CallableKind::Routine, *block),
                _ => continue,
            };

            self.callable_stack.push(kind);
            self.loop_stack.push(false);
            let result = self.check_block(body, Some(&env));
            self.loop_stack.pop();
            self.callable_stack.pop();
            result?;
        }

        Ok(())
    }

    fn check_loop_body(&mut self, block: NodeId, env: &Rc<Environment>) -> Result<(), Error> {
        self.loop_stack.push(true);
        let result = self.check(block, env);
        self.loop_stack.pop();
        result
    }

    /// Name resolution and arity for calls and identifier reads.
    fn check_reference(
        &mut self,
        id: NodeId,
        name: &str,
        received: usize,
        in_expression: bool,
        env: &Rc<Environment>,
    ) -> Result<(), Error> {
        let Some(def_id) = env.find_definition(name) else {
            return self.report(
                ErrorImpl::UndefinedName {
                    name: name.to_string(),
                },
                id,
            );
        };

        let ast = self.ast;
        let def = ast.definition(def_id)?;
        if in_expression && def.is_valueless_routine() {
            return self.report(
                ErrorImpl::RoutineInExpression {
                    name: name.to_string(),
                },
                id,
            );
        }

        let expected = def.arity();
        if expected != received {
            return self.report(
                ErrorImpl::WrongArgumentCount {
                    name: name.to_string(),
                    expected,
                    received,
                },
                id,
            );
        }

        Ok(())
    }

    fn check(&mut self, id: NodeId, env: &Rc<Environment>) -> Result<(), Error> {
        let ast = self.ast;
        let node = ast.node(id)?;

        match &node.kind {
            NodeKind::Array(elems) => self.check_all(elems, env)?,
            NodeKind::Unary { operand, .. } => self.check(*operand, env)?,
            NodeKind::Binary { lhs, rhs, .. }
            | NodeKind::Assign { lhs, rhs, .. }
            | NodeKind::ArrayRef {
                array: lhs,
                index: rhs,
            }
            | NodeKind::ArraySlice {
                array: lhs,
                range: rhs,
            }
            | NodeKind::Range {
                start: lhs,
                end: rhs,
            } => {
                self.check(*lhs, env)?;
                self.check(*rhs, env)?;
            }
            NodeKind::NoParenCall { name } => self.check_reference(id, name, 0, true, env)?,
            NodeKind::Call { name, args } => {
                self.check_reference(id, name, args.len(), true, env)?;
                self.check_all(args, env)?;
            }
            NodeKind::CallStmt { name, args } => {
                self.check_reference(id, name, args.len(), false, env)?;
                self.check_all(args, env)?;
            }
            NodeKind::LeftVal { name, indices } => {
                match env.find_definition(name) {
                    None => self.report(
                        ErrorImpl::UndefinedName {
                            name: name.to_string(),
                        },
                        id,
                    )?,
                    Some(def) if !ast.definition(def)?.is_assignable() => self.report(
                        ErrorImpl::AssignToNonVariable {
                            name: name.to_string(),
                        },
                        id,
                    )?,
                    Some(_) => {}
                }
                self.check_all(indices, env)?;
            }
            NodeKind::Succ { lhs } | NodeKind::Pred { lhs } => self.check(*lhs, env)?,
            NodeKind::VarInit { rhs, .. } => self.check(*rhs, env)?,
            NodeKind::Return { value } => {
                if self.callable() != Some(CallableKind::Function) {
                    self.report(ErrorImpl::ReturnValueOutsideFunction, id)?;
                }
                self.check(*value, env)?;
            }
            NodeKind::ReturnVoid => {
                if self.callable().is_none() {
                    self.report(ErrorImpl::ReturnOutsideRoutine, id)?;
                }
            }
            NodeKind::Break => {
                if !self.in_loop() {
                    self.report(ErrorImpl::BreakOutsideLoop, id)?;
                }
            }
            NodeKind::Block { .. } => self.check_block(id, Some(env))?,
            NodeKind::Local { block } => self.check(*block, env)?,
            NodeKind::Loop { block } => self.check_loop_body(*block, env)?,
            NodeKind::Times { count: first, block }
            | NodeKind::While { cond: first, block }
            | NodeKind::Ascent { range: first, block }
            | NodeKind::Descent { range: first, block } => {
                self.check(*first, env)?;
                self.check_loop_body(*block, env)?;
            }
            NodeKind::ElseIf { cond, block } => {
                self.check(*cond, env)?;
                self.check(*block, env)?;
            }
            NodeKind::If {
                cond,
                then_block,
                elsifs,
                else_block,
            } => {
                self.check(*cond, env)?;
                self.check(*then_block, env)?;
                self.check_all(elsifs, env)?;
                if let Some(else_block) = else_block {
                    self.check(*else_block, env)?;
                }
            }
            NodeKind::Case { exps, block } => {
                self.check_all(exps, env)?;
                self.check(*block, env)?;
            }
            NodeKind::Alternative {
                cond,
                cases,
                others,
            } => {
                self.check(*cond, env)?;
                self.check_all(cases, env)?;
                if let Some(others) = others {
                    self.check(*others, env)?;
                }
            }
            NodeKind::Num(_)
            | NodeKind::Char(_)
            | NodeKind::Str(_)
            | NodeKind::Nop
            | NodeKind::Yield
            | NodeKind::Header { .. }
            | NodeKind::Def(_) => {}
        }

        Ok(())
    }
}

/// Checks a parsed script and returns its diagnostics in source order.
#[tracing::instrument(skip_all, fields(nodes = ast.len()))]
pub fn check(ast: &Ast) -> Vec<Error> {
    let diagnostics = SemanticsChecker::new(ast).run();
    tracing::debug!(count = diagnostics.len(), "check finished");
    diagnostics
}
