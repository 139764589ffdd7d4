//! CLI entrypoint for stencil.
//!
//! This binary wraps the stencil library to generate specialized, vendored
//! versions of Go packages from stencil import paths.

mod cli;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use cli::{Args, Commands};
use stencil::roots::HostEnv;
use stencil::{engine, scanner, DetectionResult, StencilMatch};

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Commands::Generate {
            paths,
            tidy,
            dry_run,
            verbose,
        } => cmd_generate(paths, tidy, dry_run, verbose),

        Commands::Detect {
            paths,
            json,
            verbose,
        } => cmd_detect(paths, json, verbose),

        Commands::Scan { paths } => cmd_scan(paths),
    }
}

fn cmd_generate(
    paths: Option<Vec<PathBuf>>,
    tidy_inputs: bool,
    dry_run: bool,
    verbose: bool,
) -> Result<()> {
    let scan_paths = paths.unwrap_or_default();

    if verbose {
        let dirs = scanner::list_packages(&scan_paths)?;
        let files: usize = dirs.values().map(Vec::len).sum();
        eprintln!(
            "{} Scanning {} file(s) in {} director(ies)",
            "info:".blue().bold(),
            files,
            dirs.len()
        );
    }

    let files = if dry_run {
        engine::specialize(&scan_paths, &HostEnv)?
    } else {
        engine::process(&scan_paths, tidy_inputs, &HostEnv)?
    };

    if files.is_empty() {
        println!("{} No stencil imports found", "info:".blue().bold());
        return Ok(());
    }

    let action = if dry_run { "Would write:" } else { "Wrote:" };
    for file in &files {
        println!("{} {}", action.yellow().bold(), file.path.display());
    }

    if dry_run {
        println!(
            "\n{} Run without --dry-run to write files",
            "hint:".cyan().bold()
        );
    } else if tidy_inputs && verbose {
        eprintln!("{} Tidied imports of input files", "info:".blue().bold());
    }

    Ok(())
}

fn cmd_detect(paths: Option<Vec<PathBuf>>, json_output: bool, verbose: bool) -> Result<()> {
    let scan_paths = paths.unwrap_or_default();
    let result = engine::detect(&scan_paths, &HostEnv)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_detection_result(&result, verbose);
    }

    Ok(())
}

fn cmd_scan(paths: Option<Vec<PathBuf>>) -> Result<()> {
    let scan_paths = paths.unwrap_or_default();
    let dirs = scanner::list_packages(&scan_paths)?;

    let files: Vec<_> = dirs.values().flatten().collect();
    println!("Would scan {} files:", files.len());
    for file in files {
        println!("  {}", file.display());
    }

    Ok(())
}

fn print_detection_result(result: &DetectionResult, verbose: bool) {
    let d = &result.diagnostics;

    if verbose {
        println!(
            "\n{} Files: {}, Imports: {} ({} stencil)",
            "Diagnostics:".bold(),
            d.files_scanned,
            d.imports_seen,
            d.stencil_imports
        );
    }

    if result.matches.is_empty() {
        println!("{} No stencil imports found", "ok:".green().bold());
        return;
    }

    println!(
        "\n{} {} stencil import(s):\n",
        "Found".green().bold(),
        result.matches.len()
    );

    for m in &result.matches {
        print_match(m);
    }
}

fn print_match(m: &StencilMatch) {
    let loc = format!(
        "{}:{}:{}",
        m.import.file.display(),
        m.import.line,
        m.import.column
    );
    println!("  {} {}", loc.dimmed(), m.import.path.cyan());
    for (param, spec) in &m.substitutions {
        println!("    {} {} {}", param, "->".green(), spec.green());
    }
}
