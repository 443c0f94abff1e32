//! soui-capigen — C API header generation for SOUI C++ interfaces.
//!
//! This crate translates SOUI-style interface headers (the `#define INTERFACE`
//! / `DECLARE_INTERFACE` / `STDMETHOD` idiom) into companion `*-capi.h`
//! headers that expose each interface through C-linkage macros and inline
//! wrapper functions dispatching through the per-instance vtable pointer,
//! and keeps the `soui-capi.h` aggregator's include list up to date.
//!
//! # Modules
//!
//! - [`scan`] — Interface header discovery in the input directory
//! - [`parse`] — Declaration markers, brace-balanced bodies, method extraction,
//!   parameter normalization
//! - [`emit`] — `HeaderSpec` construction (full and stub) and rendering
//! - [`aggregate`] — Aggregator include-section maintenance
//! - [`types`] — Parsed interface model, config, diagnostics, run report

pub mod aggregate;
pub mod emit;
pub mod parse;
pub mod scan;
pub mod types;

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use aggregate::AggregatorStatus;
use emit::HeaderSpec;
use types::*;

// ---------------------------------------------------------------------------
// capigen.toml config loading
// ---------------------------------------------------------------------------

/// Known keys in `capigen.toml` for config validation.
const KNOWN_CONFIG_KEYS: &[&str] = &["output_dir", "stub_files", "aggregator"];

/// Simple Levenshtein edit distance for typo suggestions.
fn edit_distance(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Load generation configuration for an interface directory.
///
/// Returns a [`GenConfig`] with defaults (output in `<dir>/capi`, the built-in
/// stub list, aggregator `soui-capi.h`), merged with any overrides from a
/// `capigen.toml` beside the interface headers. A missing or unparsable file
/// falls back to defaults with a warning. Unknown keys trigger a warning with
/// a typo suggestion.
pub fn load_capigen_config(interface_dir: &Path) -> GenConfig {
    let mut config = GenConfig::new(interface_dir.to_path_buf());
    let config_path = interface_dir.join("capigen.toml");

    if config_path.exists() {
        debug!("Loading capigen.toml");
        if let Ok(content) = fs::read_to_string(&config_path) {
            if let Ok(table) = content.parse::<toml::Table>() {
                for key in table.keys() {
                    if !KNOWN_CONFIG_KEYS.contains(&key.as_str()) {
                        let suggestion =
                            KNOWN_CONFIG_KEYS.iter().min_by_key(|k| edit_distance(key, k)).unwrap();
                        if edit_distance(key, suggestion) <= 3 {
                            warn!(
                                key = key.as_str(),
                                suggestion = *suggestion,
                                "Unknown key in capigen.toml — did you mean '{suggestion}'?"
                            );
                        } else {
                            warn!(
                                key = key.as_str(),
                                "Unknown key in capigen.toml (known keys: {})",
                                KNOWN_CONFIG_KEYS.join(", ")
                            );
                        }
                    }
                }

                if let Some(dir) = table.get("output_dir").and_then(|v| v.as_str()) {
                    config.output_dir = interface_dir.join(dir);
                }
                if let Some(files) = table.get("stub_files").and_then(|v| v.as_array()) {
                    config.stub_files =
                        files.iter().filter_map(|v| v.as_str().map(|s| s.to_string())).collect();
                }
                if let Some(name) = table.get("aggregator").and_then(|v| v.as_str()) {
                    config.aggregator_name = name.to_string();
                }
            } else {
                warn!("Failed to parse capigen.toml");
            }
        }
    }

    config
}

// ---------------------------------------------------------------------------
// Parse-only collection (used by the CLI `list` command)
// ---------------------------------------------------------------------------

/// Parse every interface header in the directory without emitting anything.
/// Returns `(source file name, definition)` pairs in processing order plus
/// the diagnostics the parse produced.
pub fn collect_interfaces(
    interface_dir: &Path,
) -> (Vec<(String, InterfaceDefinition)>, Vec<Diagnostic>) {
    let mut found = Vec::new();
    let mut diagnostics = Vec::new();

    for path in scan::scan_interface_files(interface_dir) {
        let file = scan::file_name_of(&path).to_string();
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!(file = file.as_str(), error = %e, "Could not read interface file");
                diagnostics.push(Diagnostic::UnreadableFile { file, error: e.to_string() });
                continue;
            }
        };

        let (interfaces, unterminated) = parse::parse_interfaces(&content);
        for name in unterminated {
            warn!(file = file.as_str(), interface = name.as_str(), "Interface body never closes");
            diagnostics.push(Diagnostic::UnterminatedBody { file: file.clone(), interface: name });
        }
        if interfaces.is_empty() {
            diagnostics.push(Diagnostic::NoInterfacesFound { file: file.clone() });
            continue;
        }
        for def in interfaces {
            found.push((file.clone(), def));
        }
    }

    (found, diagnostics)
}

// ---------------------------------------------------------------------------
// Generation pipeline
// ---------------------------------------------------------------------------

/// Run the whole pipeline: scan, parse, emit full headers, emit stub headers,
/// maintain the aggregator. Every failure is recovered at the narrowest scope
/// and recorded as a [`Diagnostic`]; the run always completes.
pub fn run_generation(config: &GenConfig) -> GenerationReport {
    run_pipeline(config, false)
}

/// Dry run: parse everything and report what [`run_generation`] would write,
/// without touching the output directory.
pub fn run_check(config: &GenConfig) -> GenerationReport {
    run_pipeline(config, true)
}

fn run_pipeline(config: &GenConfig, dry_run: bool) -> GenerationReport {
    let mut report = GenerationReport::default();

    info!(
        interfaces = %config.interface_dir.display(),
        output = %config.output_dir.display(),
        dry_run,
        "Generating C API headers"
    );

    if !dry_run {
        if let Err(e) = fs::create_dir_all(&config.output_dir) {
            warn!(dir = %config.output_dir.display(), error = %e, "Could not create output directory");
            report.diagnostics.push(Diagnostic::WriteFailure {
                file: config.output_dir.display().to_string(),
                error: e.to_string(),
            });
            return report;
        }
    }

    full_pass(config, dry_run, &mut report);
    stub_pass(config, dry_run, &mut report);
    aggregator_pass(config, dry_run, &mut report);

    info!(
        full = report.full_headers.len(),
        stubs = report.stub_headers.len(),
        skipped = report.skipped_existing.len(),
        problems = report.diagnostics.len(),
        "Generation complete"
    );
    report
}

/// One pass over all discovered interface files: full extraction and emission
/// for every interface with at least one method.
fn full_pass(config: &GenConfig, dry_run: bool, report: &mut GenerationReport) {
    let files = scan::scan_interface_files(&config.interface_dir);
    info!(count = files.len(), "Found interface files");

    for path in &files {
        let file = scan::file_name_of(path).to_string();
        debug!(file = file.as_str(), "Processing");

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(file = file.as_str(), error = %e, "Could not read interface file");
                report
                    .diagnostics
                    .push(Diagnostic::UnreadableFile { file, error: e.to_string() });
                continue;
            }
        };

        let (interfaces, unterminated) = parse::parse_interfaces(&content);
        for name in unterminated {
            warn!(file = file.as_str(), interface = name.as_str(), "Interface body never closes");
            report
                .diagnostics
                .push(Diagnostic::UnterminatedBody { file: file.clone(), interface: name });
        }
        if interfaces.is_empty() {
            debug!(file = file.as_str(), "No interfaces found");
            report.diagnostics.push(Diagnostic::NoInterfacesFound { file: file.clone() });
            continue;
        }

        for def in interfaces {
            if def.methods.is_empty() {
                // Stays eligible for the stub pass if listed there.
                report.diagnostics.push(Diagnostic::NoMethodsExtracted {
                    file: file.clone(),
                    interface: def.name.clone(),
                });
                continue;
            }

            let spec = HeaderSpec::full(&def, &file);
            if dry_run {
                report.full_headers.push(spec.file_name());
                continue;
            }
            match spec.write_to(&config.output_dir) {
                Ok(_) => {
                    info!(
                        header = spec.file_name().as_str(),
                        methods = def.methods.len(),
                        "Generated"
                    );
                    report.full_headers.push(spec.file_name());
                }
                Err(e) => {
                    warn!(header = spec.file_name().as_str(), error = %e, "Could not write header");
                    report.diagnostics.push(Diagnostic::WriteFailure {
                        file: spec.file_name(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }
}

/// One pass over the fixed supplementary list: lifecycle-only stub headers,
/// never overwriting an output file that already exists.
fn stub_pass(config: &GenConfig, dry_run: bool, report: &mut GenerationReport) {
    for stub_file in &config.stub_files {
        let path = config.interface_dir.join(stub_file);
        if !path.exists() {
            warn!(file = stub_file.as_str(), "Stub source file not found");
            report.diagnostics.push(Diagnostic::StubSourceMissing { file: stub_file.clone() });
            continue;
        }

        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!(file = stub_file.as_str(), error = %e, "Could not read stub source");
                report.diagnostics.push(Diagnostic::UnreadableFile {
                    file: stub_file.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        let names = parse::scan_interface_names(&content);
        if names.is_empty() {
            warn!(file = stub_file.as_str(), "No interfaces found in stub source");
            report.diagnostics.push(Diagnostic::NoInterfacesFound { file: stub_file.clone() });
            continue;
        }

        let spec = HeaderSpec::stub(stub_file, &names);
        if config.output_dir.join(spec.file_name()).exists() {
            debug!(header = spec.file_name().as_str(), "Already exists, skipping");
            report.skipped_existing.push(spec.file_name());
            continue;
        }

        if dry_run {
            report.stub_headers.push(spec.file_name());
            continue;
        }
        match spec.write_to(&config.output_dir) {
            Ok(_) => {
                info!(
                    header = spec.file_name().as_str(),
                    interfaces = names.len(),
                    "Generated stub"
                );
                report.stub_headers.push(spec.file_name());
            }
            Err(e) => {
                warn!(header = spec.file_name().as_str(), error = %e, "Could not write stub header");
                report.diagnostics.push(Diagnostic::WriteFailure {
                    file: spec.file_name(),
                    error: e.to_string(),
                });
            }
        }
    }
}

/// Bring the aggregator's include list in line with the output directory.
fn aggregator_pass(config: &GenConfig, dry_run: bool, report: &mut GenerationReport) {
    if dry_run {
        // Report whether an update would apply to an existing aggregator.
        let path = config.output_dir.join(&config.aggregator_name);
        match fs::read_to_string(&path) {
            Ok(content) => {
                if aggregate::rewrite_include_section(&content, &[]).is_some() {
                    report.aggregator_updated = true;
                } else {
                    report.diagnostics.push(Diagnostic::AggregatorSectionNotFound {
                        file: config.aggregator_name.clone(),
                    });
                }
            }
            // Missing file would be created from the template, which has the
            // include section.
            Err(_) => report.aggregator_updated = true,
        }
        return;
    }

    match aggregate::update_aggregator(&config.output_dir, &config.aggregator_name) {
        Ok(AggregatorStatus::Updated { includes }) => {
            info!(file = config.aggregator_name.as_str(), includes, "Updated aggregator");
            report.aggregator_updated = true;
        }
        Ok(AggregatorStatus::SectionNotFound) => {
            warn!(
                file = config.aggregator_name.as_str(),
                "Could not find include section in aggregator, leaving it unchanged"
            );
            report.diagnostics.push(Diagnostic::AggregatorSectionNotFound {
                file: config.aggregator_name.clone(),
            });
        }
        Err(e) => {
            warn!(file = config.aggregator_name.as_str(), error = %e, "Could not update aggregator");
            report.diagnostics.push(Diagnostic::WriteFailure {
                file: config.aggregator_name.clone(),
                error: e.to_string(),
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
