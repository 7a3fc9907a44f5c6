//! `rwx generate`: write the interface files of a package

use crate::manifest::Manifest;
use anyhow::{bail, Result};
use rwx_weld::GenerateReport;
use std::path::PathBuf;
use std::thread;

/// Generate command configuration
#[derive(Debug)]
pub struct GenerateCommand {
    /// Package manifest
    pub manifest: PathBuf,
    /// Worker threads
    pub jobs: usize,
    /// Restrict generation to these modules
    pub modules: Vec<String>,
    /// Only write dependency files
    pub deps_only: bool,
}

impl GenerateCommand {
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut cmd = GenerateCommand {
            manifest: PathBuf::from("rwx.toml"),
            jobs: thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            modules: Vec::new(),
            deps_only: false,
        };

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--manifest" | "-m" => {
                    let Some(value) = args.get(i + 1) else {
                        bail!("--manifest requires a value");
                    };
                    cmd.manifest = PathBuf::from(value);
                    i += 2;
                }
                "--jobs" | "-j" => {
                    let Some(value) = args.get(i + 1) else {
                        bail!("--jobs requires a value");
                    };
                    cmd.jobs = match value.parse::<usize>() {
                        Ok(n) if n > 0 => n,
                        _ => bail!("--jobs expects a positive number, got '{}'", value),
                    };
                    i += 2;
                }
                "--module" => {
                    let Some(value) = args.get(i + 1) else {
                        bail!("--module requires a value");
                    };
                    cmd.modules.push(value.clone());
                    i += 2;
                }
                "--deps-only" => {
                    cmd.deps_only = true;
                    i += 1;
                }
                // logging flags are handled in main
                "--verbose" | "-v" | "--trace" => i += 1,
                _ => bail!("Unknown flag: {}", args[i]),
            }
        }
        Ok(cmd)
    }
}

/// Run the generate command with the given arguments
pub fn run(args: &[String]) -> Result<bool> {
    let cmd = GenerateCommand::parse(args)?;
    tracing::debug!(manifest = %cmd.manifest.display(), jobs = cmd.jobs, "loading manifest");
    let package = Manifest::load(&cmd.manifest)?.into_package(Some(&cmd.manifest))?;

    let modules: Vec<&str> = if cmd.modules.is_empty() {
        package.module_names().collect()
    } else {
        for name in &cmd.modules {
            package.director(name)?;
        }
        cmd.modules.iter().map(String::as_str).collect()
    };

    if cmd.deps_only {
        for module in &modules {
            package.create_rakefile(module)?;
        }
        println!("Dependency files written for {} modules", modules.len());
        return Ok(true);
    }

    package.write_common_typemaps()?;
    println!(
        "Generating {} modules of package {} ({} jobs)...",
        modules.len(),
        package.name(),
        cmd.jobs
    );
    let report = package.generate_modules(&modules, cmd.jobs);
    print_summary(&report);
    Ok(report.is_success())
}

fn print_summary(report: &GenerateReport) {
    println!(
        "\nGeneration complete: {} generated, {} failed",
        report.generated.len(),
        report.failures.len()
    );
    for failure in &report.failures {
        eprintln!("  {}: {}", failure.module, failure.error);
    }
}
