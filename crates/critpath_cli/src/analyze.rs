//! `critpath analyze`: batch critical path analysis.
//!
//! The pipeline:
//!
//! 1. Load `critpath.toml` (explicit `--config`, or the nearest one above
//!    the working directory)
//! 2. Pick the circuit files: command line, else `[batch] circuits`
//! 3. Read and parse every file, in order
//! 4. Analyze all parsed circuits in parallel
//! 5. Print one report per circuit, text or JSON, plus diagnostics
//!
//! A circuit that cannot be read or analyzed is reported and the batch moves
//! on; the exit code is 1 if any circuit failed.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use critpath_common::Frequency;
use critpath_config::AnalysisConfig;
use critpath_diagnostics::{
    Category, Diagnostic, DiagnosticCode, DiagnosticSink, FileId, Label, Severity, SourceDb, Span,
};
use critpath_netlist::ParsedCircuit;
use critpath_timing::{ComponentType, CriticalPath, CriticalPathAnalyzer, DelayTable, TimingError};
use rayon::prelude::*;
use serde::Serialize;

use crate::pipeline::{circuit_files, render_diagnostics, resolve_settings, should_render};
use crate::view::render_dot;
use crate::{AnalyzeArgs, GlobalArgs, ReportFormat};

/// The circuit has a combinational cycle.
const CYCLE: u16 = 1;
/// The circuit has no OUTPUT node.
const NO_OUTPUT: u16 = 2;
/// No OUTPUT node is reachable from an INPUT.
const UNREACHABLE: u16 = 3;
/// The graph itself is malformed.
const MALFORMED: u16 = 4;
/// A component type has no delay table entry.
const NO_DELAY: u16 = 301;

/// The outcome of analyzing one circuit file.
#[derive(Debug, Serialize)]
pub struct CircuitReport {
    /// The file as given on the command line or in the batch list.
    pub file: String,
    /// The circuit name, if the file could be read.
    pub name: Option<String>,
    /// The critical path, if analysis succeeded.
    pub critical_path: Option<CriticalPath>,
    /// Why the circuit failed, if it did.
    pub error: Option<String>,
    /// The highest clock the critical path allows, when `unit_ns` is set.
    pub max_frequency_mhz: Option<f64>,
    /// The configured target frequency check, when one is set.
    pub target: Option<TargetCheck>,
    /// Diagnostics raised for this file.
    pub diagnostics: Vec<Diagnostic>,
    /// Where the file was loaded in the source database.
    #[serde(skip)]
    pub source: Option<FileId>,
    /// The parsed circuit, kept for DOT output.
    #[serde(skip)]
    pub circuit: Option<ParsedCircuit>,
}

/// The critical path measured against a target clock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetCheck {
    /// The target clock in MHz.
    pub frequency_mhz: f64,
    /// Whether the path fits in one target clock period.
    pub met: bool,
    /// Spare delay in time units, negative when the target is missed.
    pub slack: f64,
}

impl CircuitReport {
    /// Returns `true` if the circuit could not be read or analyzed.
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

struct Loaded {
    display: String,
    file: FileId,
    circuit: ParsedCircuit,
}

/// Runs the `critpath analyze` command.
///
/// Returns exit code 0 if every circuit was analyzed without errors, 1
/// otherwise.
pub fn run(args: &AnalyzeArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let settings = resolve_settings(global)?;
    let files = circuit_files(&args.files, &settings)?;
    let analyzer = CriticalPathAnalyzer::new(DelayTable::from(&settings.config));
    for (component, delay) in analyzer.delays().iter() {
        log::debug!("delay {component} = {delay}");
    }

    if !global.quiet {
        eprintln!("   Analyzing {} circuit(s)", files.len());
    }
    if global.verbose {
        match settings.config_path {
            Some(ref p) => eprintln!("      Config {}", p.display()),
            None => eprintln!("      Config (defaults)"),
        }
    }

    let mut source_db = SourceDb::new();
    let sink = DiagnosticSink::new();
    let reports = analyze_files(
        &files,
        &analyzer,
        &settings.config.analysis,
        &mut source_db,
        &sink,
    );
    log::debug!(
        "read {} of {} circuit file(s)",
        source_db.file_count(),
        files.len()
    );

    if let Some(ref dir) = args.dot_dir {
        write_dot_files(Path::new(dir), &reports, &files, global)?;
    }

    match args.format {
        ReportFormat::Text => {
            for report in &reports {
                print!("{}", format_report(report, &analyzer, &settings.config.analysis));
                if should_render(&report.diagnostics, global.quiet) {
                    render_diagnostics(&report.diagnostics, &source_db, global.color);
                }
            }
        }
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&reports)?;
            println!("{json}");
        }
    }

    let failed = reports.iter().filter(|r| r.failed()).count();
    let errors = reports
        .iter()
        .flat_map(|r| &r.diagnostics)
        .filter(|d| d.severity == Severity::Error)
        .count();

    if !global.quiet && args.format == ReportFormat::Text {
        eprintln!(
            "   Result: {} analyzed, {} failed, {} error(s)",
            reports.len() - failed,
            failed,
            errors
        );
    }

    Ok(if failed > 0 || errors > 0 { 1 } else { 0 })
}

/// Reads, parses and analyzes every file, returning one report per file in
/// input order.
///
/// Files are read one by one into `source_db`; the analysis itself runs on
/// the rayon thread pool.
pub fn analyze_files(
    files: &[PathBuf],
    analyzer: &CriticalPathAnalyzer,
    analysis: &AnalysisConfig,
    source_db: &mut SourceDb,
    sink: &DiagnosticSink,
) -> Vec<CircuitReport> {
    let mut slots: Vec<Result<Loaded, CircuitReport>> = Vec::with_capacity(files.len());
    for path in files {
        let display = path.display().to_string();
        match critpath_netlist::load_circuit(path, source_db, sink) {
            Ok((file, circuit)) => slots.push(Ok(Loaded {
                display,
                file,
                circuit,
            })),
            Err(e) => {
                log::debug!("failed to read {display}: {e}");
                slots.push(Err(CircuitReport {
                    error: Some(format!("cannot read {display}: {e}")),
                    file: display,
                    name: None,
                    critical_path: None,
                    max_frequency_mhz: None,
                    target: None,
                    diagnostics: Vec::new(),
                    source: None,
                    circuit: None,
                }));
            }
        }
    }

    let mut reports: Vec<CircuitReport> = slots
        .into_par_iter()
        .map(|slot| match slot {
            Ok(loaded) => analyze_one(loaded, analyzer, analysis, sink),
            Err(report) => report,
        })
        .collect();

    let mut diagnostics = sink.take_all();
    for report in &mut reports {
        let Some(file) = report.source else {
            continue;
        };
        let (mine, rest): (Vec<_>, Vec<_>) = diagnostics
            .into_iter()
            .partition(|d| d.primary_span.file == file);
        report.diagnostics = mine;
        diagnostics = rest;
    }
    reports
}

fn analyze_one(
    loaded: Loaded,
    analyzer: &CriticalPathAnalyzer,
    analysis: &AnalysisConfig,
    sink: &DiagnosticSink,
) -> CircuitReport {
    let Loaded {
        display,
        file,
        circuit,
    } = loaded;
    log::debug!(
        "analyzing {display}: {} nodes, {} edges",
        circuit.graph.node_count(),
        circuit.graph.edge_count()
    );

    check_delay_coverage(&circuit, analyzer.delays(), file, sink);

    let mut report = CircuitReport {
        file: display,
        name: Some(circuit.name.clone()),
        critical_path: None,
        error: None,
        max_frequency_mhz: None,
        target: None,
        diagnostics: Vec::new(),
        source: Some(file),
        circuit: None,
    };

    match analyzer.find_critical_path(&circuit.graph) {
        Ok(path) => {
            if let Some(unit_ns) = analysis.unit_ns {
                report.max_frequency_mhz = path.max_frequency(unit_ns).map(|f| f.mhz());
                report.target = analysis.target().map(|target| {
                    let (met, slack) = path.check_target(target, unit_ns);
                    TargetCheck {
                        frequency_mhz: target.mhz(),
                        met,
                        slack,
                    }
                });
            }
            report.critical_path = Some(path);
        }
        Err(err) => {
            report.error = Some(err.to_string());
            sink.emit(timing_diagnostic(&err, &circuit, file));
        }
    }
    report.circuit = Some(circuit);
    report
}

/// Warns once per declared component type that the delay table does not
/// price.
fn check_delay_coverage(
    circuit: &ParsedCircuit,
    delays: &DelayTable,
    file: FileId,
    sink: &DiagnosticSink,
) {
    let mut reported: BTreeSet<&ComponentType> = BTreeSet::new();
    for node in circuit.graph.iter() {
        let component = &node.component;
        if *component == ComponentType::Unknown
            || delays.contains(component)
            || !reported.insert(component)
        {
            continue;
        }
        let span = circuit.span_of(&node.name).unwrap_or(Span::new(file, 0, 0));
        sink.emit(
            Diagnostic::warning(
                DiagnosticCode::new(Category::Warning, NO_DELAY),
                format!("component type `{component}` has no configured delay"),
                span,
            )
            .with_note("it is counted as 0 time units")
            .with_help(format!("add `{component} = <delay>` to `[delays]` in critpath.toml")),
        );
    }
}

/// Converts an analysis failure into a diagnostic pointing into the file.
pub fn timing_diagnostic(err: &TimingError, circuit: &ParsedCircuit, file: FileId) -> Diagnostic {
    let span_of = |name: &str| circuit.span_of(name).unwrap_or(Span::new(file, 0, 0));
    match err {
        TimingError::CyclicGraph { nodes } => {
            let first = nodes.first().map_or(Span::new(file, 0, 0), |n| span_of(n));
            let mut diag = Diagnostic::error(
                DiagnosticCode::new(Category::Timing, CYCLE),
                err.to_string(),
                first,
            )
            .with_label(Label::primary(first, "this node depends on itself"))
            .with_help("remove one of the inputs that closes the loop");
            for node in nodes.iter().skip(1) {
                diag = diag.with_label(Label::secondary(span_of(node), "also on the cycle"));
            }
            diag
        }
        TimingError::NoOutputNode => Diagnostic::error(
            DiagnosticCode::new(Category::Timing, NO_OUTPUT),
            err.to_string(),
            Span::new(file, 0, 0),
        )
        .with_help("declare at least one `OUTPUT <id> <inputs...>` line"),
        TimingError::UnreachableOutputs { outputs } => {
            let first = outputs.first().map_or(Span::new(file, 0, 0), |n| span_of(n));
            Diagnostic::error(
                DiagnosticCode::new(Category::Timing, UNREACHABLE),
                err.to_string(),
                first,
            )
            .with_note("a path must start at an INPUT node")
        }
        TimingError::DuplicateNode { name } | TimingError::UnknownNode { name } => {
            Diagnostic::error(
                DiagnosticCode::new(Category::Timing, MALFORMED),
                err.to_string(),
                span_of(name),
            )
        }
    }
}

/// Formats one report in the plain text layout.
pub fn format_report(
    report: &CircuitReport,
    analyzer: &CriticalPathAnalyzer,
    analysis: &AnalysisConfig,
) -> String {
    let mut out = format!("\nAnalyzing circuit: {}\n", report.file);

    let Some(ref path) = report.critical_path else {
        let reason = report.error.as_deref().unwrap_or("analysis failed");
        out.push_str(&format!("Error: {reason}\n"));
        return out;
    };

    out.push_str(&format!("Critical Path: {}\n", path.node_names().join(" -> ")));
    out.push_str("Path Components:\n");
    for element in &path.elements {
        if let Some(delay) = analyzer.delays().get(&element.component) {
            out.push_str(&format!(
                "- {} ({}): {delay:.1} tu\n",
                element.component, element.node
            ));
        }
    }
    out.push_str(&format!(
        "Total Delay: {:.2} {}\n",
        path.total_delay, analysis.time_unit
    ));

    if let Some(mhz) = report.max_frequency_mhz {
        out.push_str(&format!("Max Frequency: {}\n", Frequency::new(mhz * 1e6)));
    }
    if let Some(ref target) = report.target {
        out.push_str(&format!(
            "Target {}: {} (slack {:.2} {})\n",
            Frequency::new(target.frequency_mhz * 1e6),
            if target.met { "met" } else { "VIOLATED" },
            target.slack,
            analysis.time_unit
        ));
    }
    out
}

fn write_dot_files(
    dir: &Path,
    reports: &[CircuitReport],
    files: &[PathBuf],
    global: &GlobalArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    for (report, name) in reports.iter().zip(dot_file_names(files)) {
        let Some(ref circuit) = report.circuit else {
            continue;
        };
        let critical = report.critical_path.clone().unwrap_or_default();
        let out = dir.join(name);
        std::fs::write(&out, render_dot(&circuit.name, &circuit.graph, &critical))?;
        if !global.quiet {
            eprintln!("      Wrote {}", out.display());
        }
    }
    Ok(())
}

/// Names the DOT file for each input after its stem. Stems seen before get
/// a `-2`, `-3`, ... suffix so no two inputs share an output file.
fn dot_file_names(files: &[PathBuf]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    files
        .iter()
        .map(|path| {
            let stem = path
                .file_stem()
                .map_or_else(|| "circuit".to_string(), |s| s.to_string_lossy().into_owned());
            let mut name = stem.clone();
            let mut n = 2;
            while !used.insert(name.clone()) {
                name = format!("{stem}-{n}");
                n += 1;
            }
            format!("{name}.dot")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CHAIN: &str = "# Circuit name: chain\nINPUT I1\nADD A1 I1\nADD A2 A1\nOUTPUT O1 A2\n";

    fn run_batch(
        dir: &TempDir,
        sources: &[(&str, &str)],
        analysis: &AnalysisConfig,
        delays: DelayTable,
    ) -> Vec<CircuitReport> {
        let files: Vec<PathBuf> = sources
            .iter()
            .map(|(name, text)| {
                let path = dir.path().join(name);
                fs::write(&path, text).unwrap();
                path
            })
            .collect();
        let mut db = SourceDb::new();
        let sink = DiagnosticSink::new();
        analyze_files(
            &files,
            &CriticalPathAnalyzer::new(delays),
            analysis,
            &mut db,
            &sink,
        )
    }

    #[test]
    fn text_report_matches_classic_layout() {
        let dir = TempDir::new().unwrap();
        let reports = run_batch(
            &dir,
            &[("cir1.txt", CHAIN)],
            &AnalysisConfig::default(),
            DelayTable::default(),
        );
        let text = format_report(
            &reports[0],
            &CriticalPathAnalyzer::default(),
            &AnalysisConfig::default(),
        );
        let file = dir.path().join("cir1.txt").display().to_string();
        assert_eq!(
            text,
            format!(
                "\nAnalyzing circuit: {file}\n\
                 Critical Path: I1 -> A1 -> A2 -> O1\n\
                 Path Components:\n\
                 - INPUT (I1): 0.0 tu\n\
                 - ADD (A1): 1.0 tu\n\
                 - ADD (A2): 1.0 tu\n\
                 - OUTPUT (O1): 0.0 tu\n\
                 Total Delay: 2.00 time units\n"
            )
        );
    }

    #[test]
    fn unpriced_components_are_left_out_of_the_listing() {
        let dir = TempDir::new().unwrap();
        let src = "# Circuit name: x\nINPUT i\nXOR x i\nADD a x\nOUTPUT o a\n";
        let reports = run_batch(
            &dir,
            &[("x.txt", src)],
            &AnalysisConfig::default(),
            DelayTable::default(),
        );
        let text = format_report(
            &reports[0],
            &CriticalPathAnalyzer::default(),
            &AnalysisConfig::default(),
        );
        assert!(text.contains("Critical Path: i -> x -> a -> o\n"));
        assert!(!text.contains("XOR"));
        assert_eq!(reports[0].diagnostics.len(), 1);
        assert_eq!(reports[0].diagnostics[0].code.to_string(), "W301");
    }

    #[test]
    fn failures_do_not_stop_the_batch() {
        let dir = TempDir::new().unwrap();
        let cyclic = "# Circuit name: loop\nINPUT i\nADD a i b\nADD b a\nOUTPUT o b\n";
        let files = vec![
            dir.path().join("missing.txt"),
            dir.path().join("loop.txt"),
            dir.path().join("ok.txt"),
        ];
        fs::write(&files[1], cyclic).unwrap();
        fs::write(&files[2], CHAIN).unwrap();

        let mut db = SourceDb::new();
        let sink = DiagnosticSink::new();
        let reports = analyze_files(
            &files,
            &CriticalPathAnalyzer::default(),
            &AnalysisConfig::default(),
            &mut db,
            &sink,
        );

        assert_eq!(reports.len(), 3);
        assert!(reports[0].failed());
        assert!(reports[0].error.as_deref().unwrap().contains("cannot read"));
        assert!(reports[1].failed());
        assert_eq!(reports[1].diagnostics[0].code.to_string(), "T001");
        assert!(!reports[2].failed());
        assert_eq!(reports[2].critical_path.as_ref().unwrap().total_delay, 2.0);
        assert!(reports[2].diagnostics.is_empty());
    }

    #[test]
    fn failed_report_text() {
        let dir = TempDir::new().unwrap();
        let reports = run_batch(
            &dir,
            &[("noout.txt", "# Circuit name: n\nINPUT i\nADD a i\n")],
            &AnalysisConfig::default(),
            DelayTable::default(),
        );
        let text = format_report(
            &reports[0],
            &CriticalPathAnalyzer::default(),
            &AnalysisConfig::default(),
        );
        assert!(text.ends_with("Error: circuit has no OUTPUT node\n"));
        assert_eq!(reports[0].diagnostics[0].code.to_string(), "T002");
    }

    #[test]
    fn frequency_and_target_lines() {
        let dir = TempDir::new().unwrap();
        let analysis = AnalysisConfig {
            time_unit: "tu".to_string(),
            unit_ns: Some(5.0),
            target_frequency: Some("200MHz".to_string()),
        };
        let reports = run_batch(&dir, &[("c.txt", CHAIN)], &analysis, DelayTable::default());
        let report = &reports[0];
        assert!((report.max_frequency_mhz.unwrap() - 100.0).abs() < 1e-9);
        let target = report.target.as_ref().unwrap();
        assert!(!target.met);
        assert!((target.slack + 1.0).abs() < 1e-9);

        let text = format_report(report, &CriticalPathAnalyzer::default(), &analysis);
        assert!(text.contains("Total Delay: 2.00 tu\n"));
        assert!(text.contains("Max Frequency: 100.000MHz\n"));
        assert!(text.contains("Target 200.000MHz: VIOLATED (slack -1.00 tu)\n"));
    }

    #[test]
    fn custom_delays_flow_through() {
        let dir = TempDir::new().unwrap();
        let mut delays = DelayTable::default();
        delays.set(ComponentType::Add, 2.5);
        let reports = run_batch(&dir, &[("c.txt", CHAIN)], &AnalysisConfig::default(), delays);
        assert_eq!(reports[0].critical_path.as_ref().unwrap().total_delay, 5.0);
    }

    #[test]
    fn json_report_shape() {
        let dir = TempDir::new().unwrap();
        let reports = run_batch(
            &dir,
            &[("c.txt", CHAIN)],
            &AnalysisConfig::default(),
            DelayTable::default(),
        );
        let json = serde_json::to_value(&reports).unwrap();
        assert_eq!(json[0]["name"], "chain");
        assert_eq!(json[0]["critical_path"]["total_delay"], 2.0);
        assert_eq!(json[0]["critical_path"]["elements"][1]["node"], "A1");
        assert!(json[0]["error"].is_null());
    }

    #[test]
    fn cycle_diagnostic_labels_every_member() {
        let sink = DiagnosticSink::new();
        let circuit = critpath_netlist::parse_circuit(
            "# Circuit name: c\nADD a c\nADD b a\nADD c b\nOUTPUT o c\n",
            FileId::from_raw(0),
            &sink,
        );
        let err = CriticalPathAnalyzer::default()
            .find_critical_path(&circuit.graph)
            .unwrap_err();
        let diag = timing_diagnostic(&err, &circuit, FileId::from_raw(0));
        assert_eq!(diag.code.to_string(), "T001");
        assert_eq!(diag.labels.len(), 3);
        assert_eq!(diag.primary_span, circuit.span_of("a").unwrap());
    }

    #[test]
    fn dot_names_never_collide() {
        let files = [
            PathBuf::from("a/cir.txt"),
            PathBuf::from("b/cir.txt"),
            PathBuf::from("fir.txt"),
            PathBuf::from("c/cir.txt"),
        ];
        assert_eq!(
            dot_file_names(&files),
            vec!["cir.dot", "cir-2.dot", "fir.dot", "cir-3.dot"]
        );
    }

    #[test]
    fn same_stem_in_two_directories_writes_two_files() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("critpath.toml");
        fs::write(&config, "").unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("cir.txt"), CHAIN).unwrap();
        fs::write(
            b.join("cir.txt"),
            "# Circuit name: other\nINPUT X\nMUL M X\nOUTPUT Y M\n",
        )
        .unwrap();
        let dot_dir = dir.path().join("dot");

        let args = AnalyzeArgs {
            files: vec![
                a.join("cir.txt").to_string_lossy().into_owned(),
                b.join("cir.txt").to_string_lossy().into_owned(),
            ],
            format: ReportFormat::Json,
            dot_dir: Some(dot_dir.to_string_lossy().into_owned()),
        };
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(config.to_string_lossy().into_owned()),
        };
        assert_eq!(run(&args, &global).unwrap(), 0);
        let first = fs::read_to_string(dot_dir.join("cir.dot")).unwrap();
        let second = fs::read_to_string(dot_dir.join("cir-2.dot")).unwrap();
        assert!(first.starts_with("digraph \"chain\""));
        assert!(second.starts_with("digraph \"other\""));
    }

    #[test]
    fn run_with_dot_dir() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("critpath.toml");
        fs::write(&config, "[batch]\ncircuits = [\"c.txt\"]\n").unwrap();
        fs::write(dir.path().join("c.txt"), CHAIN).unwrap();
        let dot_dir = dir.path().join("dot");

        let args = AnalyzeArgs {
            files: Vec::new(),
            format: ReportFormat::Json,
            dot_dir: Some(dot_dir.to_string_lossy().into_owned()),
        };
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(config.to_string_lossy().into_owned()),
        };
        assert_eq!(run(&args, &global).unwrap(), 0);
        let dot = fs::read_to_string(dot_dir.join("c.dot")).unwrap();
        assert!(dot.contains("\"A2\" -> \"O1\" [color=red, penwidth=2.0];"));
    }
}
