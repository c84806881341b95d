//! cloneplan CLI - Command-line interface
//!
//! Commands:
//!   compile  - Compile descriptors into clone plans
//!   render   - Generate clone operations from descriptors
//!   check    - Validate descriptors without generating code
//!   config   - Show the effective project configuration
//!   schema   - Print JSON schemas

mod cli;

use cloneplan::*;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "compile" => cli::cmd_compile(&args[2..]),
        "render" => cli::cmd_render(&args[2..]),
        "check" => cli::cmd_check(&args[2..]),
        "config" => cli::cmd_config(&args[2..]),
        "schema" => cli::cmd_schema(&args[2..]),
        "version" | "--version" | "-v" => {
            println!("cloneplan {}", VERSION);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Err("Unknown command".into())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Diagnostics go to stderr, filtered by `CLONEPLAN_LOG` (default `warn`)
fn init_logging() {
    let filter =
        EnvFilter::try_from_env("CLONEPLAN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage() {
    println!(
        r#"
cloneplan - Deep-clone plan compiler

USAGE:
    cloneplan <COMMAND> [OPTIONS]

COMMANDS:
    compile <types.yaml> [--json]     Compile descriptors and print their plans
    render <types.yaml> [--lang]      Generate fast and cycle-safe clone operations
    check <types.yaml>                Validate descriptors
    config                            Show the effective project configuration
    schema [name]                     Print JSON schema (descriptor, plan, config)
    version                           Print version

OPTIONS:
    --lang <csharp|typescript>        Target language (default: config targets)
    --output <dir>                    Output directory (default: stdout)
    --config <file>                   Config file (default: nearest .cloneplan.yaml)
    --json                            JSON output format (compile, check)

ENVIRONMENT:
    CLONEPLAN_LOG                     Log filter, e.g. `debug` or `cloneplan=trace`

EXAMPLES:
    cloneplan compile types.yaml --json
    cloneplan render types.yaml --lang cs --output Generated
    cloneplan render types.yaml --lang ts > clone.ts
"#
    );
}
