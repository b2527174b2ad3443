//! Implementation of the `critpath view` command.
//!
//! Renders a circuit as a Graphviz DOT digraph with its critical path
//! highlighted: path nodes filled red, path edges red and bold, everything
//! else drawn in neutral colors. Pipe the output through `dot -Tsvg` to get
//! a picture.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

use critpath_diagnostics::{DiagnosticSink, SourceDb};
use critpath_timing::{CircuitGraph, CriticalPath, CriticalPathAnalyzer, DelayTable};

use crate::analyze::timing_diagnostic;
use crate::pipeline::{render_diagnostics, resolve_settings, should_render};
use crate::{GlobalArgs, ViewArgs};

/// Runs the `critpath view` command.
///
/// The DOT text goes to `--output` or stdout. A circuit whose analysis
/// fails is still drawn, without highlighting, and the exit code is 1.
pub fn run(args: &ViewArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let settings = resolve_settings(global)?;
    let analyzer = CriticalPathAnalyzer::new(DelayTable::from(&settings.config));

    let path = Path::new(&args.file);
    let mut source_db = SourceDb::new();
    let sink = DiagnosticSink::new();
    let (file, circuit) = critpath_netlist::load_circuit(path, &mut source_db, &sink)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;

    let critical = match analyzer.find_critical_path(&circuit.graph) {
        Ok(critical) => critical,
        Err(err) => {
            sink.emit(timing_diagnostic(&err, &circuit, file));
            CriticalPath::default()
        }
    };

    let dot = render_dot(&circuit.name, &circuit.graph, &critical);
    match args.output {
        Some(ref out) => {
            std::fs::write(out, &dot)?;
            if !global.quiet {
                eprintln!("      Wrote {out}");
            }
        }
        None => print!("{dot}"),
    }

    let diagnostics = sink.take_all();
    if should_render(&diagnostics, global.quiet) {
        render_diagnostics(&diagnostics, &source_db, global.color);
    }

    Ok(if sink.has_errors() { 1 } else { 0 })
}

/// Renders `graph` as DOT, highlighting the nodes and edges of `path`.
pub fn render_dot(name: &str, graph: &CircuitGraph, path: &CriticalPath) -> String {
    let path_edges: HashSet<(&str, &str)> = path.edges().collect();

    let mut out = String::new();
    let _ = writeln!(out, "digraph {} {{", quote(name));
    out.push_str("    rankdir=LR;\n");
    out.push_str("    node [shape=box, style=\"rounded,filled\", fillcolor=lightblue];\n");

    for node in graph.iter() {
        let label = format!("{}\\n{}", escape(&node.name), node.component);
        if path.contains(&node.name) {
            let _ = writeln!(
                out,
                "    {} [label=\"{label}\", fillcolor=red];",
                quote(&node.name)
            );
        } else {
            let _ = writeln!(out, "    {} [label=\"{label}\"];", quote(&node.name));
        }
    }

    for (from, to) in graph.edges() {
        let from = graph.node(from).name.as_str();
        let to = graph.node(to).name.as_str();
        let style = if path_edges.contains(&(from, to)) {
            "color=red, penwidth=2.0"
        } else {
            "color=gray"
        };
        let _ = writeln!(out, "    {} -> {} [{style}];", quote(from), quote(to));
    }

    out.push_str("}\n");
    out
}

fn quote(id: &str) -> String {
    format!("\"{}\"", escape(id))
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
