use crate::{
    ast::{
        ast::{NodeId, NodeKind},
        statements::{AssignOp, Definition},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{
        expr::{parse_call_args, parse_expr},
        lookups::BindingPower,
    },
    Span,
};

use super::parser::Parser;

pub fn parse_stmt(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let token_kind = parser.current_token_kind();
    if let Some(handler) = parser.get_stmt_lookup().get(&token_kind).copied() {
        return handler(parser);
    }

    Err(parser.unexpected("expected a statement"))
}

/// Parses `{ stmt* }` in a fresh scope, declaring `decls` (parameters, loop
/// variables, `result`) in it before the first statement.
pub fn parse_block(parser: &mut Parser, decls: &[NodeId]) -> Result<NodeId, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;

    parser.enter_nesting()?;
    parser.push_scope();
    for decl in decls {
        parser.declare_existing(*decl)?;
    }

    let mut stmts = vec![];
    while parser.has_tokens() && parser.current_token_kind() != TokenKind::CloseCurly {
        if let Some(stmt) = parse_stmt(parser)? {
            stmts.push(stmt);
        }
    }

    parser.expect(TokenKind::CloseCurly)?;
    let table = parser.pop_scope();
    parser.leave_nesting();
    let span = parser.span_from(start);

    Ok(parser.push_node(NodeKind::Block { stmts, table }, span))
}

fn parse_condition(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let cond = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;
    Ok(cond)
}

fn expect_identifier(parser: &mut Parser, context: &str) -> Result<String, Error> {
    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: format!("expected identifier {}", context),
        },
        parser.get_position(),
    );
    Ok(parser
        .expect_error(TokenKind::Identifier, Some(error))?
        .value)
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let start = parser.advance().span.start.clone();
    let name_token = parser.current_token().clone();
    let name = expect_identifier(parser, "during variable declaration")?;

    let decl = parser.declare(Definition::VarDecl { name: name.clone() }, name_token.span)?;

    if parser.eat(TokenKind::Assignment) {
        let rhs = parse_expr(parser, BindingPower::Default)?;
        parser.expect(TokenKind::Semicolon)?;
        let span = parser.span_from(start);
        return Ok(Some(parser.push_node(NodeKind::VarInit { name, rhs }, span)));
    }

    parser.expect(TokenKind::Semicolon)?;
    Ok(Some(decl))
}

/// `(a, let b, var c)`; parameters become definitions of the body scope.
fn parse_params(parser: &mut Parser) -> Result<Vec<NodeId>, Error> {
    let mut params = vec![];
    if !parser.eat(TokenKind::OpenParen) {
        return Ok(params);
    }

    while parser.current_token_kind() != TokenKind::CloseParen {
        parser.eat(TokenKind::Let);
        let token = parser.current_token().clone();
        let name = expect_identifier(parser, "in parameter list")?;
        params.push(parser.push_node(NodeKind::Def(Definition::ProcParam { name }), token.span));

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    Ok(params)
}

/// `function name(params) { ... }` and `task name(params) { ... }`
pub fn parse_callable_def_stmt(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let keyword = parser.advance().clone();
    let name = expect_identifier(parser, "after function or task")?;
    let params = parse_params(parser)?;

    let def = if keyword.kind == TokenKind::Function {
        let result_span = keyword.span.clone();
        let result = parser.push_node(NodeKind::Def(Definition::Result), result_span);
        let mut decls = params.clone();
        decls.push(result);
        let block = parse_block(parser, &decls)?;
        Definition::Func {
            name,
            params,
            block,
        }
    } else {
        let block = parse_block(parser, &params)?;
        Definition::Task {
            name,
            params,
            block,
        }
    };

    let span = parser.span_from(keyword.span.start);
    parser.declare(def, span)?;
    Ok(None)
}

pub fn parse_sub_def_stmt(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let start = parser.advance().span.start.clone();
    let name = expect_identifier(parser, "after sub")?;
    let block = parse_block(parser, &[])?;

    let span = parser.span_from(start);
    parser.declare(Definition::Sub { name, block }, span)?;
    Ok(None)
}

/// `@Name { ... }`
pub fn parse_entry_routine_stmt(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let token = parser.advance().clone();
    let block = parse_block(parser, &[])?;

    let span = parser.span_from(token.span.start);
    parser.declare(
        Definition::EntryRoutine {
            name: token.value,
            block,
        },
        span,
    )?;
    Ok(None)
}

/// `#TouhouDanmakufu[Single]`, `#Title["..."]`
pub fn parse_header_stmt(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let token = parser.advance().clone();

    let (name, params) = match token.value.split_once('[') {
        Some((name, rest)) => {
            let inner = rest.trim_end_matches(']');
            let params = inner
                .split(',')
                .map(str::trim)
                .filter(|param| !param.is_empty())
                .map(String::from)
                .collect();
            (name.to_string(), params)
        }
        None => (token.value.clone(), vec![]),
    };

    Ok(Some(
        parser.push_node(NodeKind::Header { name, params }, token.span),
    ))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let start = parser.advance().span.start.clone();
    let cond = parse_condition(parser)?;
    let then_block = parse_block(parser, &[])?;

    let mut elsifs = vec![];
    let mut else_block = None;
    while parser.current_token_kind() == TokenKind::Else {
        let else_start = parser.advance().span.start.clone();
        if parser.eat(TokenKind::If) {
            let cond = parse_condition(parser)?;
            let block = parse_block(parser, &[])?;
            let span = parser.span_from(else_start);
            elsifs.push(parser.push_node(NodeKind::ElseIf { cond, block }, span));
        } else {
            else_block = Some(parse_block(parser, &[])?);
            break;
        }
    }

    let span = parser.span_from(start);
    Ok(Some(parser.push_node(
        NodeKind::If {
            cond,
            then_block,
            elsifs,
            else_block,
        },
        span,
    )))
}

/// `loop { ... }` or `loop(n) { ... }`, the latter being `times`.
pub fn parse_loop_stmt(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let start = parser.advance().span.start.clone();

    if parser.current_token_kind() == TokenKind::OpenParen {
        let count = parse_condition(parser)?;
        let block = parse_block(parser, &[])?;
        let span = parser.span_from(start);
        return Ok(Some(parser.push_node(NodeKind::Times { count, block }, span)));
    }

    let block = parse_block(parser, &[])?;
    let span = parser.span_from(start);
    Ok(Some(parser.push_node(NodeKind::Loop { block }, span)))
}

pub fn parse_times_stmt(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let start = parser.advance().span.start.clone();
    let count = parse_condition(parser)?;
    parser.eat(TokenKind::Loop);
    let block = parse_block(parser, &[])?;

    let span = parser.span_from(start);
    Ok(Some(parser.push_node(NodeKind::Times { count, block }, span)))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let start = parser.advance().span.start.clone();
    let cond = parse_condition(parser)?;
    let block = parse_block(parser, &[])?;

    let span = parser.span_from(start);
    Ok(Some(parser.push_node(NodeKind::While { cond, block }, span)))
}

/// `ascent(let i in a..b) { ... }` and the `descent` counterpart.
pub fn parse_ascent_stmt(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let keyword = parser.advance().clone();
    parser.expect(TokenKind::OpenParen)?;
    parser.eat(TokenKind::Let);

    let name_token = parser.current_token().clone();
    let name = expect_identifier(parser, "as loop variable")?;
    let param = parser.push_node(NodeKind::Def(Definition::LoopParam { name }), name_token.span);

    parser.expect(TokenKind::In)?;
    let range_start = parser.get_position();
    let start = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::DotDot)?;
    let end = parse_expr(parser, BindingPower::Default)?;
    let range_span = parser.span_from(range_start);
    let range = parser.push_node(NodeKind::Range { start, end }, range_span);
    parser.expect(TokenKind::CloseParen)?;

    let block = parse_block(parser, &[param])?;
    let span = parser.span_from(keyword.span.start);

    let kind = if keyword.kind == TokenKind::Descent {
        NodeKind::Descent { range, block }
    } else {
        NodeKind::Ascent { range, block }
    };
    Ok(Some(parser.push_node(kind, span)))
}

pub fn parse_alternative_stmt(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let start = parser.advance().span.start.clone();
    let cond = parse_condition(parser)?;

    let mut cases = vec![];
    while parser.current_token_kind() == TokenKind::Case {
        let case_start = parser.advance().span.start.clone();
        let exps = parse_call_args(parser)?;
        if exps.is_empty() {
            return Err(parser.unexpected("expected at least one case value"));
        }
        let block = parse_block(parser, &[])?;
        let span = parser.span_from(case_start);
        cases.push(parser.push_node(NodeKind::Case { exps, block }, span));
    }

    let others = if parser.eat(TokenKind::Others) {
        Some(parse_block(parser, &[])?)
    } else {
        None
    };

    let span = parser.span_from(start);
    Ok(Some(parser.push_node(
        NodeKind::Alternative {
            cond,
            cases,
            others,
        },
        span,
    )))
}

pub fn parse_local_stmt(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let start = parser.advance().span.start.clone();
    let block = parse_block(parser, &[])?;

    let span = parser.span_from(start);
    Ok(Some(parser.push_node(NodeKind::Local { block }, span)))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let start = parser.advance().span.start.clone();

    if parser.eat(TokenKind::Semicolon) {
        let span = parser.span_from(start);
        return Ok(Some(parser.push_node(NodeKind::ReturnVoid, span)));
    }

    let value = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;
    let span = parser.span_from(start);
    Ok(Some(parser.push_node(NodeKind::Return { value }, span)))
}

pub fn parse_yield_stmt(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let start = parser.advance().span.start.clone();
    parser.expect(TokenKind::Semicolon)?;

    let span = parser.span_from(start);
    Ok(Some(parser.push_node(NodeKind::Yield, span)))
}

pub fn parse_break_stmt(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let start = parser.advance().span.start.clone();
    parser.expect(TokenKind::Semicolon)?;

    let span = parser.span_from(start);
    Ok(Some(parser.push_node(NodeKind::Break, span)))
}

/// Statements starting with an identifier: calls, assignments, `x++`.
pub fn parse_assign_or_call_stmt(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let name_token = parser.advance().clone();
    let start = name_token.span.start.clone();
    let name = name_token.value;

    if parser.current_token_kind() == TokenKind::OpenParen {
        let args = parse_call_args(parser)?;
        parser.expect(TokenKind::Semicolon)?;
        let span = parser.span_from(start);
        return Ok(Some(parser.push_node(NodeKind::CallStmt { name, args }, span)));
    }

    let mut indices = vec![];
    while parser.eat(TokenKind::OpenBracket) {
        indices.push(parse_expr(parser, BindingPower::Default)?);
        parser.expect(TokenKind::CloseBracket)?;
    }

    if indices.is_empty() && parser.eat(TokenKind::Semicolon) {
        let span = parser.span_from(start);
        return Ok(Some(parser.push_node(
            NodeKind::CallStmt { name, args: vec![] },
            span,
        )));
    }

    let lhs_span = parser.span_from(start.clone());
    let lhs = parser.push_node(NodeKind::LeftVal { name, indices }, lhs_span);

    let operator = parser.advance().clone();
    let kind = match operator.kind {
        TokenKind::PlusPlus => NodeKind::Succ { lhs },
        TokenKind::MinusMinus => NodeKind::Pred { lhs },
        kind => match AssignOp::from_token(kind) {
            Some(op) => {
                let rhs = parse_expr(parser, BindingPower::Default)?;
                NodeKind::Assign { op, lhs, rhs }
            }
            None => {
                return Err(Error::new(
                    ErrorImpl::UnexpectedTokenDetailed {
                        token: operator.value,
                        message: String::from("expected assignment or call"),
                    },
                    operator.span.start,
                ))
            }
        },
    };

    parser.expect(TokenKind::Semicolon)?;
    let span = Span {
        start,
        end: parser.previous_end(),
    };
    Ok(Some(parser.push_node(kind, span)))
}

pub fn parse_nop_stmt(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    let token = parser.advance().clone();
    Ok(Some(parser.push_node(NodeKind::Nop, token.span)))
}
