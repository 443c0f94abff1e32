//! soui-capigen CLI — generate C API headers for SOUI interfaces.
//!
//! Calls `soui-capigen-core` directly; the zero-flag invocation reproduces the
//! historical fixed layout (interfaces in the current directory, output in
//! `./capi`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use soui_capigen_core::types::{Diagnostic, GenerationReport};
use soui_capigen_core::{collect_interfaces, load_capigen_config, run_check, run_generation};

/// soui-capigen — C API header generator for SOUI C++ interfaces.
#[derive(Parser)]
#[command(name = "soui-capigen", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate all C API headers and update the aggregator
    Generate {
        /// Directory holding the *-i.h interface headers (default: current directory)
        #[arg(long)]
        interfaces: Option<PathBuf>,

        /// Output directory (default: <interfaces>/capi)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Dry run: report what `generate` would write, without writing
    Check {
        /// Directory holding the *-i.h interface headers (default: current directory)
        #[arg(long)]
        interfaces: Option<PathBuf>,

        /// Output directory (default: <interfaces>/capi)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the interfaces found in the input directory
    List {
        /// Directory holding the *-i.h interface headers (default: current directory)
        #[arg(long)]
        interfaces: Option<PathBuf>,
    },
}

fn resolve_dir(dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_else(|| std::env::current_dir().expect("Could not determine current directory"))
        .canonicalize()
        .expect("Path not found")
}

fn print_report(report: &GenerationReport, json: bool, dry_run: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(report).unwrap());
        return;
    }

    let verb = if dry_run { "Would generate" } else { "Generated" };
    for header in &report.full_headers {
        println!("  {header}");
    }
    for header in &report.stub_headers {
        println!("  {header} (stub)");
    }
    for header in &report.skipped_existing {
        println!("  {header} (exists, skipped)");
    }

    for diag in &report.diagnostics {
        match diag {
            Diagnostic::UnreadableFile { file, error } => {
                eprintln!("warning: could not read {file}: {error}")
            }
            Diagnostic::NoInterfacesFound { file } => {
                eprintln!("warning: no interfaces found in {file}")
            }
            Diagnostic::NoMethodsExtracted { file, interface } => {
                eprintln!("warning: no methods extracted for {interface} in {file}")
            }
            Diagnostic::UnterminatedBody { file, interface } => {
                eprintln!("warning: body of {interface} in {file} never closes")
            }
            Diagnostic::WriteFailure { file, error } => {
                eprintln!("warning: could not write {file}: {error}")
            }
            Diagnostic::StubSourceMissing { file } => {
                eprintln!("warning: stub source {file} not found")
            }
            Diagnostic::AggregatorSectionNotFound { file } => {
                eprintln!("warning: include section not found in {file}, skipped")
            }
        }
    }

    eprintln!(
        "\n{verb} {} headers ({} full, {} stub, {} skipped)",
        report.written(),
        report.full_headers.len(),
        report.stub_headers.len(),
        report.skipped_existing.len()
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("soui_capigen_core=warn".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { interfaces, output } => {
            let dir = resolve_dir(interfaces);
            let mut config = load_capigen_config(&dir);
            if let Some(out) = output {
                config.output_dir = out;
            }
            let report = run_generation(&config);
            print_report(&report, cli.json, false);
        }
        Commands::Check { interfaces, output } => {
            let dir = resolve_dir(interfaces);
            let mut config = load_capigen_config(&dir);
            if let Some(out) = output {
                config.output_dir = out;
            }
            let report = run_check(&config);
            print_report(&report, cli.json, true);
        }
        Commands::List { interfaces } => {
            let dir = resolve_dir(interfaces);
            let (found, diagnostics) = collect_interfaces(&dir);

            if cli.json {
                let items: Vec<serde_json::Value> = found
                    .iter()
                    .map(|(file, def)| {
                        serde_json::json!({
                            "file": file,
                            "interface": def.name,
                            "base": def.base,
                            "methods": def.methods.len(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&items).unwrap());
            } else {
                if found.is_empty() {
                    eprintln!("No interfaces found in {}", dir.display());
                    std::process::exit(1);
                }
                for (file, def) in &found {
                    let base = if def.base.is_empty() { "-" } else { def.base.as_str() };
                    println!(
                        "{:<28} {:<20} {:>3} methods  {}",
                        def.name,
                        base,
                        def.methods.len(),
                        file
                    );
                }
                eprintln!("\n{} interfaces, {} warnings", found.len(), diagnostics.len());
            }
        }
    }
}
