//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Variable declarations and initializers
//! - Functions, tasks, subs and entry routines
//! - Expressions and operator precedence
//! - Control flow statements
//! - Name tables and duplicate declarations

use std::rc::Rc;

use super::parser::parse;
use crate::{
    ast::{
        ast::{Ast, NameTable, NodeId, NodeKind},
        expressions::BinaryOp,
        statements::Definition,
    },
    builtins::BuiltinTable,
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> Result<Ast, Error> {
    let tokens = tokenize(source.to_string(), Some("test.dnh".to_string()))?;
    parse(tokens, Rc::new("test.dnh".to_string()), &BuiltinTable::empty())
}

fn root_block(ast: &Ast) -> (&Vec<NodeId>, &NameTable) {
    match &ast.node(ast.root()).unwrap().kind {
        NodeKind::Block { stmts, table } => (stmts, table),
        other => panic!("root is not a block: {:?}", other),
    }
}

fn block_of(ast: &Ast, id: NodeId) -> (&Vec<NodeId>, &NameTable) {
    match &ast.node(id).unwrap().kind {
        NodeKind::Block { stmts, table } => (stmts, table),
        other => panic!("not a block: {:?}", other),
    }
}

#[test]
fn test_parse_variable_declaration() {
    let ast = parse_source("let x;").unwrap();
    let (stmts, table) = root_block(&ast);

    assert_eq!(stmts.len(), 1);
    assert_eq!(table.get("x"), Some(&stmts[0]));
    assert_eq!(
        ast.definition(stmts[0]).unwrap(),
        &Definition::VarDecl {
            name: "x".to_string()
        }
    );
}

#[test]
fn test_parse_variable_initializer() {
    let ast = parse_source("var x = 42;").unwrap();
    let (stmts, table) = root_block(&ast);

    assert_eq!(stmts.len(), 1);
    assert!(table.contains_key("x"));
    match &ast.node(stmts[0]).unwrap().kind {
        NodeKind::VarInit { name, rhs } => {
            assert_eq!(name, "x");
            assert_eq!(ast.node(*rhs).unwrap().kind, NodeKind::Num(42.0));
        }
        other => panic!("expected initializer, got {:?}", other),
    }
}

#[test]
fn test_parse_function_declaration() {
    let ast = parse_source("function add(a, let b) { return a + b; }").unwrap();
    let (stmts, table) = root_block(&ast);

    // Callable definitions only live in the name table
    assert!(stmts.is_empty());
    let def = ast.definition(table["add"]).unwrap();
    assert_eq!(def.arity(), 2);

    let (body, body_table) = block_of(&ast, def.body().unwrap());
    assert_eq!(body.len(), 1);
    assert!(body_table.contains_key("a"));
    assert!(body_table.contains_key("b"));
    assert_eq!(
        ast.definition(body_table["result"]).unwrap(),
        &Definition::Result
    );
}

#[test]
fn test_parse_task_has_no_result() {
    let ast = parse_source("task Move(obj) { yield; }").unwrap();
    let (_, table) = root_block(&ast);

    let def = ast.definition(table["Move"]).unwrap();
    assert!(matches!(def, Definition::Task { .. }));

    let (_, body_table) = block_of(&ast, def.body().unwrap());
    assert!(body_table.contains_key("obj"));
    assert!(!body_table.contains_key("result"));
}

#[test]
fn test_parse_entry_routine_and_sub() {
    let ast = parse_source("@MainLoop { Tick; yield; } sub Tick { }").unwrap();
    let (stmts, table) = root_block(&ast);

    assert!(stmts.is_empty());
    assert!(matches!(
        ast.definition(table["MainLoop"]).unwrap(),
        Definition::EntryRoutine { .. }
    ));
    assert!(matches!(
        ast.definition(table["Tick"]).unwrap(),
        Definition::Sub { .. }
    ));
}

#[test]
fn test_parse_builtins_seed_global_table() {
    let tokens = tokenize("let x = sin(pi);".to_string(), None).unwrap();
    let ast = parse(
        tokens,
        Rc::new("test.dnh".to_string()),
        &BuiltinTable::standard(),
    )
    .unwrap();
    let (_, table) = root_block(&ast);

    assert!(matches!(
        ast.definition(table["sin"]).unwrap(),
        Definition::BuiltInFunc { .. }
    ));
    assert!(matches!(
        ast.definition(table["pi"]).unwrap(),
        Definition::Const { .. }
    ));
}

#[test]
fn test_parse_operator_precedence() {
    let ast = parse_source("let x = 1 + 2 * 3;").unwrap();
    let (stmts, _) = root_block(&ast);

    let NodeKind::VarInit { rhs, .. } = &ast.node(stmts[0]).unwrap().kind else {
        panic!("expected initializer");
    };
    match &ast.node(*rhs).unwrap().kind {
        NodeKind::Binary { op, rhs, .. } => {
            assert_eq!(*op, BinaryOp::Add);
            assert!(matches!(
                ast.node(*rhs).unwrap().kind,
                NodeKind::Binary {
                    op: BinaryOp::Mul,
                    ..
                }
            ));
        }
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn test_parse_power_is_right_associative() {
    let ast = parse_source("let x = 2 ^ 3 ^ 2;").unwrap();
    let (stmts, _) = root_block(&ast);

    let NodeKind::VarInit { rhs, .. } = &ast.node(stmts[0]).unwrap().kind else {
        panic!("expected initializer");
    };
    let NodeKind::Binary { lhs, rhs, .. } = &ast.node(*rhs).unwrap().kind else {
        panic!("expected binary");
    };
    assert_eq!(ast.node(*lhs).unwrap().kind, NodeKind::Num(2.0));
    assert!(matches!(
        ast.node(*rhs).unwrap().kind,
        NodeKind::Binary {
            op: BinaryOp::Pow,
            ..
        }
    ));
}

#[test]
fn test_parse_index_and_slice() {
    let ast = parse_source("let a = [1, 2, 3]; let b = a[0]; let c = a[0..2];").unwrap();
    let (stmts, _) = root_block(&ast);

    let rhs_kind = |index: usize| match &ast.node(stmts[index]).unwrap().kind {
        NodeKind::VarInit { rhs, .. } => ast.node(*rhs).unwrap().kind.clone(),
        other => panic!("expected initializer, got {:?}", other),
    };

    assert!(matches!(rhs_kind(0), NodeKind::Array(ref elems) if elems.len() == 3));
    assert!(matches!(rhs_kind(1), NodeKind::ArrayRef { .. }));
    assert!(matches!(rhs_kind(2), NodeKind::ArraySlice { .. }));
}

#[test]
fn test_parse_if_else_statement() {
    let ast = parse_source(
        "let x = 0; if (x > 0) { x = 1; } else if (x < 0) { x = 2; } else { x = 3; }",
    )
    .unwrap();
    let (stmts, _) = root_block(&ast);

    match &ast.node(stmts[1]).unwrap().kind {
        NodeKind::If {
            elsifs, else_block, ..
        } => {
            assert_eq!(elsifs.len(), 1);
            assert!(else_block.is_some());
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn test_parse_loops() {
    let ast = parse_source(
        "loop { break; } loop(3) { } times(2) loop { } while(true) { } descent(i in 0..3) { }",
    )
    .unwrap();
    let (stmts, _) = root_block(&ast);

    assert!(matches!(ast.node(stmts[0]).unwrap().kind, NodeKind::Loop { .. }));
    assert!(matches!(ast.node(stmts[1]).unwrap().kind, NodeKind::Times { .. }));
    assert!(matches!(ast.node(stmts[2]).unwrap().kind, NodeKind::Times { .. }));
    assert!(matches!(ast.node(stmts[3]).unwrap().kind, NodeKind::While { .. }));
    assert!(matches!(ast.node(stmts[4]).unwrap().kind, NodeKind::Descent { .. }));
}

#[test]
fn test_parse_ascent_declares_loop_param() {
    let ast = parse_source("ascent(let i in 0..10) { WriteLog(i); }").unwrap();
    let (stmts, _) = root_block(&ast);

    let NodeKind::Ascent { range, block } = &ast.node(stmts[0]).unwrap().kind else {
        panic!("expected ascent");
    };
    assert!(matches!(ast.node(*range).unwrap().kind, NodeKind::Range { .. }));

    let (_, table) = block_of(&ast, *block);
    assert_eq!(
        ast.definition(table["i"]).unwrap(),
        &Definition::LoopParam {
            name: "i".to_string()
        }
    );
}

#[test]
fn test_parse_alternative() {
    let ast = parse_source("alternative(1) case(1, 2) { } case(3) { } others { }").unwrap();
    let (stmts, _) = root_block(&ast);

    match &ast.node(stmts[0]).unwrap().kind {
        NodeKind::Alternative { cases, others, .. } => {
            assert_eq!(cases.len(), 2);
            assert!(others.is_some());
        }
        other => panic!("expected alternative, got {:?}", other),
    }
}

#[test]
fn test_parse_assignments() {
    let ast = parse_source("let a; a = 1; a += 2; a ~= [3]; a[0] = 4; a++; a--;").unwrap();
    let (stmts, _) = root_block(&ast);

    assert!(matches!(ast.node(stmts[1]).unwrap().kind, NodeKind::Assign { .. }));
    assert!(matches!(ast.node(stmts[2]).unwrap().kind, NodeKind::Assign { .. }));
    assert!(matches!(ast.node(stmts[3]).unwrap().kind, NodeKind::Assign { .. }));
    match &ast.node(stmts[4]).unwrap().kind {
        NodeKind::Assign { lhs, .. } => assert!(matches!(
            ast.node(*lhs).unwrap().kind,
            NodeKind::LeftVal { ref indices, .. } if indices.len() == 1
        )),
        other => panic!("expected assignment, got {:?}", other),
    }
    assert!(matches!(ast.node(stmts[5]).unwrap().kind, NodeKind::Succ { .. }));
    assert!(matches!(ast.node(stmts[6]).unwrap().kind, NodeKind::Pred { .. }));
}

#[test]
fn test_parse_header() {
    let ast = parse_source("#TouhouDanmakufu[Single]").unwrap();
    let (stmts, _) = root_block(&ast);

    assert_eq!(
        ast.node(stmts[0]).unwrap().kind,
        NodeKind::Header {
            name: "TouhouDanmakufu".to_string(),
            params: vec!["Single".to_string()],
        }
    );
}

#[test]
fn test_parse_duplicate_declaration() {
    let error = parse_source("let x; let x;").unwrap_err();

    assert_eq!(
        error.get_kind(),
        &ErrorImpl::DefinitionAlreadyDeclared {
            name: "x".to_string()
        }
    );
    assert_eq!(error.get_position().0, 11);
}

#[test]
fn test_parse_shadowing_in_nested_block() {
    let ast = parse_source("let x; local { let x; }").unwrap();
    let (stmts, table) = root_block(&ast);

    let NodeKind::Local { block } = &ast.node(stmts[1]).unwrap().kind else {
        panic!("expected local block");
    };
    let (_, inner) = block_of(&ast, *block);
    assert_ne!(inner["x"], table["x"]);
}

#[test]
fn test_parse_missing_semicolon() {
    let error = parse_source("let x = 1").unwrap_err();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_parse_unclosed_block() {
    assert!(parse_source("function f() { let x;").is_err());
}

#[test]
fn test_deeply_nested_expression_is_rejected() {
    let depth = 20_000;
    let source = format!("let x = {}1{};", "(".repeat(depth), ")".repeat(depth));

    let error = parse_source(&source).unwrap_err();
    assert_eq!(
        error.get_kind(),
        &ErrorImpl::NestingTooDeep {
            limit: super::parser::MAX_NESTING
        }
    );
}

#[test]
fn test_deeply_nested_blocks_are_rejected() {
    let depth = super::parser::MAX_NESTING + 1;
    let source = format!("{}{}", "local {".repeat(depth), "}".repeat(depth));

    let error = parse_source(&source).unwrap_err();
    assert_eq!(error.get_error_name(), "NestingTooDeep");
}

#[test]
fn test_moderate_nesting_is_accepted() {
    let depth = 100;
    let source = format!("let x = {}1{};", "(".repeat(depth), ")".repeat(depth));

    assert!(parse_source(&source).is_ok());
}
