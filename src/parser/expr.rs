use crate::{
    ast::{
        ast::{NodeId, NodeKind},
        expressions::{BinaryOp, UnaryOp},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<NodeId, Error> {
    parser.enter_nesting()?;
    let expr = parse_nested_expr(parser, bp);
    parser.leave_nesting();
    expr
}

fn parse_nested_expr(parser: &mut Parser, bp: BindingPower) -> Result<NodeId, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected("expected an expression"));
    };

    let mut left = nud(parser)?;

    // While the current token binds tighter than `bp`, keep extending lhs
    while parser.current_binding_power() > bp {
        let token_kind = parser.current_token_kind();
        let binding_power = parser.current_binding_power();
        let Some(led) = parser.get_led_lookup().get(&token_kind).copied() else {
            return Err(parser.unexpected("expected an operator"));
        };

        left = led(parser, left, binding_power)?;
    }

    Ok(left)
}

fn span_between(parser: &Parser, left: NodeId, right: NodeId) -> Span {
    let start = parser.ast().get(left).map(|node| node.span.start.clone());
    let end = parser.ast().get(right).map(|node| node.span.end.clone());
    match (start, end) {
        (Some(start), Some(end)) => Span { start, end },
        _ => parser.span_from(parser.get_position()),
    }
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let token = parser.advance().clone();
    let kind = match token.kind {
        TokenKind::Number => match token.value.parse() {
            Ok(value) => NodeKind::Num(value),
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.span.start,
                ))
            }
        },
        TokenKind::Char => match token.value.chars().next() {
            Some(ch) => NodeKind::Char(ch),
            None => {
                return Err(Error::new(
                    ErrorImpl::UnexpectedTokenDetailed {
                        token: token.value,
                        message: String::from("empty character literal"),
                    },
                    token.span.start,
                ))
            }
        },
        TokenKind::String => NodeKind::Str(token.value),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                token.span.start,
            ))
        }
    };

    Ok(parser.push_node(kind, token.span))
}

/// `name` or `name(args)`
pub fn parse_identifier_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let token = parser.advance().clone();

    if parser.current_token_kind() == TokenKind::OpenParen {
        let args = parse_call_args(parser)?;
        let span = parser.span_from(token.span.start);
        return Ok(parser.push_node(
            NodeKind::Call {
                name: token.value,
                args,
            },
            span,
        ));
    }

    Ok(parser.push_node(NodeKind::NoParenCall { name: token.value }, token.span))
}

/// `( expr, expr, ... )`
pub fn parse_call_args(parser: &mut Parser) -> Result<Vec<NodeId>, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut args = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        args.push(parse_expr(parser, BindingPower::Default)?);
        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    Ok(args)
}

pub fn parse_array_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span.start.clone();

    let mut elems = vec![];
    while parser.current_token_kind() != TokenKind::CloseBracket {
        elems.push(parse_expr(parser, BindingPower::Default)?);
        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect(TokenKind::CloseBracket)?;
    let span = parser.span_from(start);
    Ok(parser.push_node(NodeKind::Array(elems), span))
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: NodeId,
    bp: BindingPower,
) -> Result<NodeId, Error> {
    let operator_token = parser.advance().clone();
    let Some(op) = BinaryOp::from_token(operator_token.kind) else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.value,
            },
            operator_token.span.start,
        ));
    };

    let right = parse_expr(parser, bp)?;
    let span = span_between(parser, left, right);

    Ok(parser.push_node(
        NodeKind::Binary {
            op,
            lhs: left,
            rhs: right,
        },
        span,
    ))
}

/// `^` binds right to left.
pub fn parse_power_expr(
    parser: &mut Parser,
    left: NodeId,
    _bp: BindingPower,
) -> Result<NodeId, Error> {
    parser.advance();
    let right = parse_expr(parser, BindingPower::Unary)?;
    let span = span_between(parser, left, right);

    Ok(parser.push_node(
        NodeKind::Binary {
            op: BinaryOp::Pow,
            lhs: left,
            rhs: right,
        },
        span,
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let operator_token = parser.advance().clone();
    let op = if operator_token.kind == TokenKind::Not {
        UnaryOp::Not
    } else {
        UnaryOp::Neg
    };
    let operand = parse_expr(parser, BindingPower::Unary)?;
    let span = parser.span_from(operator_token.span.start);

    Ok(parser.push_node(NodeKind::Unary { op, operand }, span))
}

/// `(| expr |)`
pub fn parse_abs_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span.start.clone();
    let operand = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseAbs)?;
    let span = parser.span_from(start);

    Ok(parser.push_node(
        NodeKind::Unary {
            op: UnaryOp::Abs,
            operand,
        },
        span,
    ))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// `array[index]` or `array[start..end]`
pub fn parse_index_expr(
    parser: &mut Parser,
    left: NodeId,
    _bp: BindingPower,
) -> Result<NodeId, Error> {
    parser.advance();
    let index = parse_expr(parser, BindingPower::Default)?;

    if parser.eat(TokenKind::DotDot) {
        let end = parse_expr(parser, BindingPower::Default)?;
        let range_span = span_between(parser, index, end);
        let range = parser.push_node(NodeKind::Range { start: index, end }, range_span);
        parser.expect(TokenKind::CloseBracket)?;
        let span = span_between(parser, left, range);
        let span = Span {
            start: span.start,
            end: parser.previous_end(),
        };
        return Ok(parser.push_node(NodeKind::ArraySlice { array: left, range }, span));
    }

    parser.expect(TokenKind::CloseBracket)?;
    let span = span_between(parser, left, index);
    let span = Span {
        start: span.start,
        end: parser.previous_end(),
    };

    Ok(parser.push_node(NodeKind::ArrayRef { array: left, index }, span))
}
