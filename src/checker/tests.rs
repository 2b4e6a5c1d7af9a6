//! Unit tests for the semantics checker.

use std::rc::Rc;

use super::checker::check;
use crate::{
    builtins::BuiltinTable,
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
    parser::parser::parse,
};

fn check_script(source: &str) -> Vec<Error> {
    let tokens = tokenize(source.to_string(), Some("test.dnh".to_string())).unwrap();
    let ast = parse(
        tokens,
        Rc::new("test.dnh".to_string()),
        &BuiltinTable::standard(),
    )
    .unwrap();
    check(&ast)
}

fn kinds(diagnostics: &[Error]) -> Vec<ErrorImpl> {
    diagnostics
        .iter()
        .map(|diagnostic| diagnostic.get_kind().clone())
        .collect()
}

#[test]
fn test_valid_script_has_no_diagnostics() {
    let diagnostics = check_script(
        r#"
        #TouhouDanmakufu[Single]
        let count = 0;
        function next(n) { result = n + 1; return result; }
        task Fire(angle) {
            loop(10) {
                CreateShotA1(GetPlayerX, 0, 2, angle, 1, 5);
                yield;
            }
            return;
        }
        @Initialize { Fire(90); }
        @MainLoop {
            count = next(count);
            while(count > 10) { break; }
            if(count == 20) { CloseScript(0); }
            yield;
        }
        "#,
    );

    assert_eq!(diagnostics, vec![]);
}

#[test]
fn test_break_outside_loop() {
    let diagnostics = check_script("break;");

    assert_eq!(kinds(&diagnostics), vec![ErrorImpl::BreakOutsideLoop]);
    assert_eq!(diagnostics[0].get_position().0, 0);
}

#[test]
fn test_break_inside_nested_block_of_loop() {
    let diagnostics = check_script("loop { if(true) { local { break; } } }");

    assert!(diagnostics.is_empty());
}

#[test]
fn test_callable_resets_loop_context() {
    let diagnostics = check_script("loop { } ascent(i in 0..3) { } sub s { break; }");

    assert_eq!(kinds(&diagnostics), vec![ErrorImpl::BreakOutsideLoop]);
}

#[test]
fn test_return_value_outside_function() {
    let diagnostics = check_script("sub s { return 1; } return 2;");

    assert_eq!(
        kinds(&diagnostics),
        vec![
            ErrorImpl::ReturnValueOutsideFunction,
            ErrorImpl::ReturnValueOutsideFunction,
        ]
    );
    // Sorted by position
    assert!(diagnostics[0].get_position().0 < diagnostics[1].get_position().0);
}

#[test]
fn test_return_outside_routine() {
    let diagnostics = check_script("return; task t { return; } function f { return; }");

    assert_eq!(kinds(&diagnostics), vec![ErrorImpl::ReturnOutsideRoutine]);
}

#[test]
fn test_undefined_names() {
    let diagnostics = check_script("let a = b; c(1); d = 2;");

    assert_eq!(
        kinds(&diagnostics),
        vec![
            ErrorImpl::UndefinedName {
                name: "b".to_string()
            },
            ErrorImpl::UndefinedName {
                name: "c".to_string()
            },
            ErrorImpl::UndefinedName {
                name: "d".to_string()
            },
        ]
    );
}

#[test]
fn test_result_is_only_visible_in_functions() {
    let diagnostics = check_script("function f { result = 1; } task t { result = 1; }");

    assert_eq!(
        kinds(&diagnostics),
        vec![ErrorImpl::UndefinedName {
            name: "result".to_string()
        }]
    );
}

#[test]
fn test_wrong_argument_count() {
    let diagnostics = check_script(
        r#"
        function f(a, b) { return a + b; }
        let x = f(1);
        let y = sin(1, 2);
        let z = f;
        let v = 1;
        let w = v(1);
        "#,
    );

    assert_eq!(
        kinds(&diagnostics),
        vec![
            ErrorImpl::WrongArgumentCount {
                name: "f".to_string(),
                expected: 2,
                received: 1,
            },
            ErrorImpl::WrongArgumentCount {
                name: "sin".to_string(),
                expected: 1,
                received: 2,
            },
            ErrorImpl::WrongArgumentCount {
                name: "f".to_string(),
                expected: 2,
                received: 0,
            },
            ErrorImpl::WrongArgumentCount {
                name: "v".to_string(),
                expected: 0,
                received: 1,
            },
        ]
    );
}

#[test]
fn test_routine_in_expression() {
    let diagnostics = check_script("sub s { } task t { } let a = s; let b = t(); s; t;");

    assert_eq!(
        kinds(&diagnostics),
        vec![
            ErrorImpl::RoutineInExpression {
                name: "s".to_string()
            },
            ErrorImpl::RoutineInExpression {
                name: "t".to_string()
            },
        ]
    );
}

#[test]
fn test_assign_to_non_variable() {
    let diagnostics = check_script("function f { } f = 1; pi++; sin[0] = 2;");

    assert_eq!(
        kinds(&diagnostics),
        vec![
            ErrorImpl::AssignToNonVariable {
                name: "f".to_string()
            },
            ErrorImpl::AssignToNonVariable {
                name: "pi".to_string()
            },
            ErrorImpl::AssignToNonVariable {
                name: "sin".to_string()
            },
        ]
    );
}

#[test]
fn test_parameters_and_loop_variables_are_assignable() {
    let diagnostics = check_script("function f(p) { p = 1; } ascent(i in 0..2) { i++; }");

    assert!(diagnostics.is_empty());
}

#[test]
fn test_unreachable_bodies_are_checked() {
    let diagnostics = check_script("function never_called { break; }");

    assert_eq!(kinds(&diagnostics), vec![ErrorImpl::BreakOutsideLoop]);
}

#[test]
fn test_every_violation_is_reported() {
    let diagnostics = check_script("break; return 1; missing; loop { break; } break;");

    assert_eq!(diagnostics.len(), 4);
    let positions: Vec<u32> = diagnostics
        .iter()
        .map(|diagnostic| diagnostic.get_position().0)
        .collect();
    let mut sorted = positions.clone();
    sorted.sort();
    assert_eq!(positions, sorted);
}
