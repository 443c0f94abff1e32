//! Core types shared across the generator: generation configuration, the
//! parsed interface model, per-run diagnostics, and the run report.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Generation config
// ---------------------------------------------------------------------------

/// Return type assumed for `STDMETHOD(name)` declarations, which omit it.
pub const DEFAULT_RETURN_TYPE: &str = "HRESULT";

/// File name of the aggregator header whose include list is regenerated each run.
pub const AGGREGATOR_NAME: &str = "soui-capi.h";

/// Interface files handled by the stub emitter rather than full extraction.
/// Mirrors the hand-maintained list shipped with SOUI; overridable via
/// `capigen.toml`.
pub const DEFAULT_STUB_FILES: &[&str] = &[
    "SAttrStorage-i.h",
    "SCtrl-i.h",
    "SEvtArgs-i.h",
    "SGradient-i.h",
    "SHostPresenter-i.h",
    "SHttpClient-i.h",
    "SImgDecoder-i.h",
    "SListViewItemLocator-i.h",
    "SMatrix-i.h",
    "SMessageBox-i.h",
    "SMsgLoop-i.h",
    "SNativeWnd-i.h",
    "SNcPainter-i.h",
    "SNotifyCenter-i.h",
    "SObjFactory-i.h",
    "SPathEffect-i.h",
    "SRealWndHandler-i.h",
    "SResProvider-i.h",
    "SResProviderMgr-i.h",
    "SScriptModule-i.h",
    "SSkinPool-i.h",
    "SSkinobj-i.h",
    "STaskLoop-i.h",
    "STileViewItemLocator-i.h",
    "STimelineHandler-i.h",
    "STransform-i.h",
    "STranslator-i.h",
    "STreeViewItemLocator-i.h",
    "SValueAnimator-i.h",
    "SWndContainer-i.h",
    "sacchelper-i.h",
    "saccproxy-i.h",
    "sapp-i.h",
    "scaret-i.h",
    "shostwnd-i.h",
    "sinterpolator-i.h",
    "sipcobj-i.h",
    "slayout-i.h",
    "slog-i.h",
    "smenu-i.h",
    "smenuex-i.h",
    "sobject-i.h",
    "stooltip-i.h",
];

/// Configuration for one generation run.
#[derive(Debug, Clone)]
pub struct GenConfig {
    /// Directory holding the `*-i.h` interface headers.
    pub interface_dir: PathBuf,
    /// Directory the `*-capi.h` headers are written to.
    pub output_dir: PathBuf,
    /// Interface files handled by the stub emitter.
    pub stub_files: Vec<String>,
    /// File name of the aggregator header inside `output_dir`.
    pub aggregator_name: String,
}

impl GenConfig {
    /// Defaults matching the original layout: output lives in a `capi/`
    /// subdirectory of the interface directory.
    pub fn new(interface_dir: PathBuf) -> Self {
        let output_dir = interface_dir.join("capi");
        Self {
            interface_dir,
            output_dir,
            stub_files: DEFAULT_STUB_FILES.iter().map(|s| s.to_string()).collect(),
            aggregator_name: AGGREGATOR_NAME.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsed interface model
// ---------------------------------------------------------------------------

/// One method declared inside an interface body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceMethod {
    /// Return type text; [`DEFAULT_RETURN_TYPE`] when the declaration omitted it.
    pub return_type: String,
    pub name: String,
    /// Raw parameter text after receiver-placeholder cleanup, still typed.
    pub params_raw: String,
    pub is_const: bool,
}

impl fmt::Display for InterfaceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let const_str = if self.is_const { " SCONST" } else { "" };
        write!(f, "{} {}({}){}", self.return_type, self.name, self.params_raw, const_str)
    }
}

/// A complete interface declaration found in a source header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceDefinition {
    pub name: String,
    /// Base interface name; empty for lifecycle-only inheritance.
    pub base: String,
    /// Declaration order, which drives emission order.
    pub methods: Vec<InterfaceMethod>,
}

impl InterfaceDefinition {
    pub fn new(name: impl Into<String>, base: impl Into<String>) -> Self {
        Self { name: name.into(), base: base.into(), methods: Vec::new() }
    }
}

// ---------------------------------------------------------------------------
// Diagnostics and run report
// ---------------------------------------------------------------------------

/// One non-fatal problem observed during a run. Every variant is recoverable
/// at the narrowest scope; nothing aborts the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A source file could not be opened or decoded.
    UnreadableFile { file: String, error: String },
    /// A scanned file contained no declaration markers at all.
    NoInterfacesFound { file: String },
    /// An interface was located but no method declarations matched.
    NoMethodsExtracted { file: String, interface: String },
    /// Brace depth never returned to zero after a declaration marker.
    UnterminatedBody { file: String, interface: String },
    /// An output header could not be written.
    WriteFailure { file: String, error: String },
    /// A stub-list entry names a source file that does not exist.
    StubSourceMissing { file: String },
    /// The aggregator's bounded include section was not found.
    AggregatorSectionNotFound { file: String },
}

/// Outcome of one generation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    /// Headers written by full extraction, in emission order.
    pub full_headers: Vec<String>,
    /// Headers written by the stub emitter this run.
    pub stub_headers: Vec<String>,
    /// Stub outputs skipped because the file already existed.
    pub skipped_existing: Vec<String>,
    /// Whether the aggregator's include section was rewritten.
    pub aggregator_updated: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationReport {
    /// Total number of headers written this run.
    pub fn written(&self) -> usize {
        self.full_headers.len() + self.stub_headers.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
