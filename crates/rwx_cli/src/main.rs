//! rwx: generate the SWIG interface of the wxRuby extension
//!
//! ```text
//! rwx generate [--manifest rwx.toml] [--jobs N] [--module NAME]... [--deps-only]
//! rwx directors
//! ```
//!
//! Logging is configured through `RWX_LOG` (default `info`); `--verbose`
//! and `--trace` override it.

mod generate;
mod manifest;

use anyhow::{bail, Result};
use std::env;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: rwx <command> [options]

Commands:
  generate     Generate interface, header, script, doc and dependency files
  directors    List the built-in director setups

Options for generate:
  -m, --manifest <path>   Package manifest (default: rwx.toml)
  -j, --jobs <n>          Worker threads (default: available cores)
      --module <name>     Only generate this module (repeatable)
      --deps-only         Only write dependency files
  -v, --verbose           Debug logging
      --trace             Trace logging";

fn init_logging(args: &[String]) {
    let level = if args.iter().any(|a| a == "--trace") {
        Some("trace")
    } else if args.iter().any(|a| a == "--verbose" || a == "-v") {
        Some("debug")
    } else {
        None
    };
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_env("RWX_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &[String]) -> Result<bool> {
    let Some(command) = args.first() else {
        bail!("missing command\n\n{}", USAGE);
    };
    match command.as_str() {
        "generate" => generate::run(&args[1..]),
        "directors" => {
            for name in rwx_weld::builtin_names() {
                println!("{}", name);
            }
            Ok(true)
        }
        "help" | "--help" | "-h" => {
            println!("{}", USAGE);
            Ok(true)
        }
        other => bail!("Unknown command: {}\n\n{}", other, USAGE),
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    init_logging(&args);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
