//! Integration tests for the end-to-end pipeline.
//!
//! These tests verify that the complete pipeline works correctly from
//! source code through tokenization, parsing, analysis and checking.

use script_analyzer::{
    analyze_source,
    ast::{ast::NodeKind, types::Type},
    builtins::BuiltinTable,
    config::AnalyzerConfig,
    errors::errors::ErrorImpl,
    render_error, AnalyzedScript,
};

const STAGE_SCRIPT: &str = r#"
#TouhouDanmakufu[Single]
#Title["Sample"]

let objBoss;
let count = 0;
let angles = [];

function Aim(x, y) {
    return atan2(y - GetPlayerY, x - GetPlayerX);
}

task Fan(ways) {
    ascent(let i in 0..ways) {
        angles = angles ~ [Aim(0, 0) + i * 10];
        CreateShotA1(0, 0, 2, angles[i], 1, 5);
    }
}

sub Cleanup {
    angles = [];
}

function Unused() {
    WriteLog("never");
}

@Initialize {
    objBoss = 1;
    Fan(5);
}

@MainLoop {
    count++;
    if (count % 60 == 0) {
        Cleanup;
    }
    yield;
}
"#;

fn run(source: &str) -> AnalyzedScript {
    analyze_source(
        source,
        "stage.dnh",
        &BuiltinTable::standard(),
        &AnalyzerConfig::default(),
    )
    .unwrap_or_else(|errors| panic!("unexpected diagnostics: {:?}", errors))
}

fn global(script: &AnalyzedScript, name: &str) -> script_analyzer::ast::ast::NodeId {
    match &script.ast.node(script.ast.root()).unwrap().kind {
        NodeKind::Block { table, .. } => table[name],
        other => panic!("root is not a block: {:?}", other),
    }
}

#[test]
fn test_stage_script_reachability() {
    let script = run(STAGE_SCRIPT);

    for name in ["Aim", "Fan", "Cleanup", "Initialize", "MainLoop"] {
        assert!(
            script.annotations.is_reachable(global(&script, name)),
            "{} should be reachable",
            name
        );
    }
    assert!(!script.annotations.is_reachable(global(&script, "Unused")));

    let unreachable: Vec<_> = script
        .annotations
        .unreachable_definitions(&script.ast)
        .collect();
    assert_eq!(unreachable, vec![global(&script, "Unused")]);
}

#[test]
fn test_stage_script_usage_counters() {
    let script = run(STAGE_SCRIPT);

    let angles = script
        .annotations
        .def_state(global(&script, "angles"))
        .unwrap();
    assert_eq!(angles.assign_cnt, 3);
    assert_eq!(angles.ref_cnt, 2);

    let boss = script
        .annotations
        .def_state(global(&script, "objBoss"))
        .unwrap();
    assert_eq!(boss.assign_cnt, 1);
    assert_eq!(boss.ref_cnt, 0);

    let unused: Vec<_> = script.annotations.unused_variables(&script.ast).collect();
    assert_eq!(unused, vec![global(&script, "objBoss")]);
}

#[test]
fn test_initializer_types_survive_pipeline() {
    let script = run("let a = [1, 2] ~ []; let b = \"x\" ~ \"\";");

    let types: Vec<Type> = script
        .ast
        .iter()
        .filter_map(|(_, node)| match &node.kind {
            NodeKind::VarInit { rhs, .. } => Some(script.annotations.exp_type(*rhs)),
            _ => None,
        })
        .collect();

    assert_eq!(types, vec![Type::array(Type::Real), Type::String]);
}

#[test]
fn test_checker_diagnostics_are_collected() {
    let errors = analyze_source(
        "break; @MainLoop { return 1; missing(1); }",
        "bad.dnh",
        &BuiltinTable::standard(),
        &AnalyzerConfig::default(),
    )
    .unwrap_err();

    let kinds: Vec<&ErrorImpl> = errors.iter().map(|error| error.get_kind()).collect();
    assert_eq!(
        kinds,
        vec![
            &ErrorImpl::BreakOutsideLoop,
            &ErrorImpl::ReturnValueOutsideFunction,
            &ErrorImpl::UndefinedName {
                name: "missing".to_string()
            },
        ]
    );
    assert!(errors.iter().all(|error| !error.is_fatal()));
}

#[test]
fn test_front_end_error_stops_pipeline() {
    let errors = analyze_source(
        "let x = $;",
        "bad.dnh",
        &BuiltinTable::standard(),
        &AnalyzerConfig::default(),
    )
    .unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_error_name(), "UnrecognisedToken");
    assert_eq!(errors[0].get_position().0, 8);

    let rendered = render_error(&errors[0], "let x = $;");
    assert!(rendered.contains("-> bad.dnh"));
    assert!(rendered.contains("1 | let x = $;"));
}

#[test]
fn test_duplicate_builtin_is_rejected() {
    let errors = analyze_source(
        "let sin = 1;",
        "bad.dnh",
        &BuiltinTable::standard(),
        &AnalyzerConfig::default(),
    )
    .unwrap_err();

    assert_eq!(
        errors[0].get_kind(),
        &ErrorImpl::DefinitionAlreadyDeclared {
            name: "sin".to_string()
        }
    );
}

#[test]
fn test_custom_builtins_and_entry_routines() {
    let mut builtins = BuiltinTable::empty();
    builtins
        .function("Shoot", 1, Type::Real, false)
        .constant("SPEED", Type::Real);

    let config = AnalyzerConfig::default().with_entry_routines(["Tick"]);
    let script = analyze_source(
        "@Tick { let s = SPEED + Shoot(1); } @MainLoop { let t = 1; }",
        "custom.dnh",
        &builtins,
        &config,
    )
    .unwrap();

    assert!(script.annotations.is_reachable(global(&script, "Tick")));
    assert!(!script.annotations.is_reachable(global(&script, "MainLoop")));
}
