//! Conformance test helpers for critpath.
//!
//! Provides shared pipeline functions that take circuit description text
//! through the full pipeline (parse → analyze) and return structured results
//! for assertion in integration tests.

#![warn(missing_docs)]

use std::path::{Path, PathBuf};

use critpath_diagnostics::{Diagnostic, DiagnosticSink, Severity, SourceDb};
use critpath_netlist::ParsedCircuit;
use critpath_timing::{CriticalPath, CriticalPathAnalyzer, DelayTable, TimingError};

/// Result of running the full parse → analyze pipeline.
pub struct PipelineResult {
    /// The parsed circuit.
    pub circuit: ParsedCircuit,
    /// The analysis outcome.
    pub path: Result<CriticalPath, TimingError>,
    /// The analyzer that produced `path`.
    pub analyzer: CriticalPathAnalyzer,
    /// All diagnostics emitted while parsing.
    pub diagnostics: Vec<Diagnostic>,
    /// Whether any errors were emitted.
    pub has_errors: bool,
    /// Number of error-severity diagnostics.
    pub error_count: usize,
    /// Number of warning-severity diagnostics.
    pub warning_count: usize,
}

impl PipelineResult {
    /// Returns the critical path, panicking with the analysis error if there
    /// is none.
    pub fn critical_path(&self) -> &CriticalPath {
        match self.path {
            Ok(ref path) => path,
            Err(ref e) => panic!("analysis of `{}` failed: {e}", self.circuit.name),
        }
    }

    /// Returns the diagnostic codes in emission order, e.g. `["E102", "W104"]`.
    pub fn codes(&self) -> Vec<String> {
        self.diagnostics.iter().map(|d| d.code.to_string()).collect()
    }
}

/// Runs the full pipeline on circuit text with the default delay table.
pub fn full_pipeline(source: &str) -> PipelineResult {
    full_pipeline_with_delays(source, DelayTable::default())
}

/// Runs the full pipeline on circuit text with an explicit delay table.
pub fn full_pipeline_with_delays(source: &str, delays: DelayTable) -> PipelineResult {
    let mut source_db = SourceDb::new();
    let file = source_db.add_source("test.txt", source.to_string());
    run_pipeline(file, &source_db, delays)
}

/// Runs the full pipeline with delays taken from `critpath.toml` text.
pub fn full_pipeline_with_config(source: &str, config_toml: &str) -> PipelineResult {
    let config = critpath_config::load_config_from_str(config_toml)
        .expect("test config should be valid");
    full_pipeline_with_delays(source, DelayTable::from(&config))
}

/// Runs the full pipeline on a circuit file.
pub fn pipeline_from_file(path: &Path, delays: DelayTable) -> PipelineResult {
    let mut source_db = SourceDb::new();
    let file = source_db
        .load_file(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    run_pipeline(file, &source_db, delays)
}

/// Returns the directory holding the bundled sample circuits.
pub fn samples_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../circuits")
}

/// Returns the path of a bundled sample circuit.
pub fn sample_circuit(file_name: &str) -> PathBuf {
    samples_dir().join(file_name)
}

fn run_pipeline(
    file: critpath_diagnostics::FileId,
    source_db: &SourceDb,
    delays: DelayTable,
) -> PipelineResult {
    let sink = DiagnosticSink::new();
    let circuit = critpath_netlist::parse_file(file, source_db, &sink);

    let analyzer = CriticalPathAnalyzer::new(delays);
    let path = analyzer.find_critical_path(&circuit.graph);

    let diagnostics = sink.diagnostics();
    let has_errors = sink.has_errors();
    let error_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();

    PipelineResult {
        circuit,
        path,
        analyzer,
        diagnostics,
        has_errors,
        error_count,
        warning_count,
    }
}
