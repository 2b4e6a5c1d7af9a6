use std::{fs::read_to_string, path::PathBuf, process::ExitCode, time::Instant};

use clap::Parser;
use script_analyzer::{
    analyze_source,
    builtins::BuiltinTable,
    config::AnalyzerConfig,
    display_error,
    AnalyzedScript,
};
use tracing_subscriber::EnvFilter;

/// Semantic analysis for stage, enemy and player scripts.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Script to analyse
    file: PathBuf,

    /// Routine invoked by the host; replaces the default set when given
    #[arg(long = "entry-routine", value_name = "NAME")]
    entry_routines: Vec<String>,

    /// Print reachability and usage counters
    #[arg(long)]
    summary: bool,
}

fn main() -> ExitCode {
    // Initialize tracing if SCRIPT_LOG is set
    if let Ok(filter) = EnvFilter::try_from_env("SCRIPT_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
        tracing::debug!("tracing initialized");
    }

    let cli = Cli::parse();

    let mut config = AnalyzerConfig::default().with_report_unused(cli.summary);
    if !cli.entry_routines.is_empty() {
        config = config.with_entry_routines(cli.entry_routines.clone());
    }

    let source = match read_to_string(&cli.file) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Failed to read {}: {}", cli.file.display(), error);
            return ExitCode::FAILURE;
        }
    };
    let file_name = cli
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| cli.file.to_string_lossy().into_owned());

    let start = Instant::now();
    let analyzed = analyze_source(&source, &file_name, &BuiltinTable::standard(), &config);
    let elapsed = start.elapsed();

    match analyzed {
        Ok(script) => {
            println!("Analyzed {} in {:?}", file_name, elapsed);
            if config.report_unused {
                print_summary(&script);
            }
            ExitCode::SUCCESS
        }
        Err(errors) => {
            for error in &errors {
                display_error(error, &source);
            }
            eprintln!("{} error(s) in {}", errors.len(), file_name);
            ExitCode::FAILURE
        }
    }
}

fn print_summary(script: &AnalyzedScript) {
    let AnalyzedScript { ast, annotations } = script;

    for (id, def) in ast.definitions() {
        let Some(state) = annotations.def_state(id) else {
            continue;
        };
        if def.is_host_provided() {
            continue;
        }

        println!(
            "{:<24} reachable={:<5} ret={:<8} refs={:<3} assigns={}",
            def.name(),
            !state.unreachable,
            state.ret_type.to_string(),
            state.ref_cnt,
            state.assign_cnt
        );
    }

    for id in annotations.unused_variables(ast) {
        if let Ok(def) = ast.definition(id) {
            println!("warning: `{}` is never read", def.name());
        }
    }
}
