//! Malformed circuit descriptions: the parser reports and keeps going, and
//! the analyzer sees whatever graph survives.

use critpath_conformance::full_pipeline;
use critpath_diagnostics::{DiagnosticSink, Severity, SourceDb};
use critpath_timing::{ComponentType, CriticalPathAnalyzer, TimingError};

#[test]
fn missing_node_id_skips_the_line() {
    let result = full_pipeline("# Circuit name: t\nINPUT I1\nMUL\nADD A1 I1\nOUTPUT O1 A1\n");
    assert_eq!(result.codes(), vec!["E101"]);
    assert!(result.has_errors);
    assert_eq!(result.circuit.graph.node_count(), 3);
    assert_eq!(
        result.critical_path().node_names(),
        vec!["I1", "A1", "O1"]
    );
}

#[test]
fn duplicate_declaration_keeps_the_first() {
    let result = full_pipeline(
        "# Circuit name: t\nINPUT I1\nINPUT I2\nADD A1 I1\nMUL A1 I2\nOUTPUT O1 A1\n",
    );
    assert_eq!(result.codes(), vec!["E102"]);
    let graph = &result.circuit.graph;
    assert_eq!(graph.type_of("A1"), &ComponentType::Add);
    // The second line's input is dropped with it.
    let a1 = graph.find("A1").unwrap();
    assert!(!graph.has_edge(graph.find("I2").unwrap(), a1));
    assert_eq!(result.critical_path().total_delay, 1.0);
}

#[test]
fn duplicate_declaration_points_at_both_lines() {
    let source = "# Circuit name: t\nINPUT I1\nADD A1 I1\nADD A1 I1\n";
    let mut db = SourceDb::new();
    let file = db.add_source("dup.txt", source.to_string());
    let sink = DiagnosticSink::new();
    critpath_netlist::parse_file(file, &db, &sink);

    let diags = sink.take_all();
    assert_eq!(diags.len(), 1);
    let diag = &diags[0];
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(db.snippet(diag.primary_span), "A1");
    assert_eq!(db.resolve_span(diag.primary_span).start_line, 4);

    let first = diag.labels.iter().find(|l| !l.primary).unwrap();
    assert_eq!(db.resolve_span(first.span).start_line, 3);
}

#[test]
fn repeated_input_collapses_to_one_edge() {
    let result = full_pipeline("# Circuit name: t\nINPUT I1\nADD A1 I1 I1\nOUTPUT O1 A1 A1\n");
    assert_eq!(result.codes(), vec!["W103", "W103"]);
    assert!(!result.has_errors);
    assert_eq!(result.warning_count, 2);
    assert_eq!(result.circuit.graph.edge_count(), 2);
    assert_eq!(result.critical_path().total_delay, 1.0);
}

#[test]
fn missing_name_falls_back_to_file_stem() {
    let result = full_pipeline("INPUT I1\nOUTPUT O1 I1\n");
    assert_eq!(result.codes(), vec!["W104"]);
    assert_eq!(result.circuit.name, "test");
    assert_eq!(result.critical_path().node_names(), vec!["I1", "O1"]);
}

#[test]
fn undeclared_reference_becomes_unknown_node() {
    let result = full_pipeline(
        "# Circuit name: t\nINPUT I1\nADD A1 I1 B9\nOUTPUT O1 A1\n",
    );
    assert!(result.diagnostics.is_empty());
    let circuit = &result.circuit;
    assert_eq!(circuit.graph.type_of("B9"), &ComponentType::Unknown);
    assert!(!circuit.is_declared("B9"));
    assert!(circuit.span_of("B9").is_some());
    // B9 has no path from an INPUT, so the path still starts at I1.
    assert_eq!(
        result.critical_path().node_names(),
        vec!["I1", "A1", "O1"]
    );
}

#[test]
fn declaration_after_reference_fixes_the_type() {
    let result = full_pipeline(
        "# Circuit name: t\nOUTPUT O1 M1\nMUL M1 I1\nINPUT I1\n",
    );
    assert!(result.diagnostics.is_empty());
    let path = result.critical_path();
    assert_eq!(path.node_names(), vec!["I1", "M1", "O1"]);
    assert_eq!(path.total_delay, 1.0);
}

#[test]
fn cycle_is_still_found_after_parse_errors() {
    let result = full_pipeline(
        "# Circuit name: t\nINPUT I1\nADD\nADD A1 I1 A2\nADD A2 A1\nADD A2 I1\nOUTPUT O1 A2\n",
    );
    assert_eq!(result.codes(), vec!["E101", "E102"]);
    assert_eq!(
        result.path,
        Err(TimingError::CyclicGraph {
            nodes: vec!["A1".to_string(), "A2".to_string()]
        })
    );
}

#[test]
fn cycle_report_excludes_downstream_nodes() {
    let result = full_pipeline(
        "# Circuit name: t\nINPUT I1\nADD A1 I1 A3\nADD A2 A1\nADD A3 A2\nREG R1 A3\nOUTPUT O1 R1\n",
    );
    match result.path {
        Err(TimingError::CyclicGraph { ref nodes }) => {
            assert_eq!(nodes, &["A1", "A2", "A3"]);
        }
        ref other => panic!("expected a cycle, got {other:?}"),
    }
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let result = full_pipeline(
        "\n# Circuit name: spaced\n\n   # a note\nINPUT   I1\n\n\tADD A1\tI1\n# OUTPUT O2 A1\nOUTPUT O1 A1\n",
    );
    assert!(result.diagnostics.is_empty(), "{:?}", result.codes());
    assert_eq!(result.circuit.name, "spaced");
    assert_eq!(result.circuit.graph.node_count(), 3);
    assert_eq!(result.critical_path().total_delay, 1.0);
}

#[test]
fn empty_file_has_no_output() {
    let result = full_pipeline("");
    assert_eq!(result.codes(), vec!["W104"]);
    assert_eq!(result.path, Err(TimingError::NoOutputNode));
}

#[test]
fn graph_from_errors_analyzes_like_a_clean_one() {
    let noisy = full_pipeline(
        "# Circuit name: t\nINPUT I1\nREG\nMUL M1 I1 I1\nADD M1 I1\nOUTPUT O1 M1\n",
    );
    let clean = full_pipeline("# Circuit name: t\nINPUT I1\nMUL M1 I1\nOUTPUT O1 M1\n");
    assert_eq!(noisy.codes(), vec!["E101", "W103", "E102"]);
    let analyzer = CriticalPathAnalyzer::default();
    assert_eq!(
        analyzer.find_critical_path(&noisy.circuit.graph),
        analyzer.find_critical_path(&clean.circuit.graph)
    );
}
