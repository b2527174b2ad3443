//! Reader for line-oriented circuit description files.
//!
//! The main entry points are [`parse_circuit`] for in-memory text and
//! [`load_circuit`] for files on disk. Both produce a [`ParsedCircuit`]
//! holding the [`CircuitGraph`] ready for
//! [`CriticalPathAnalyzer`](critpath_timing::CriticalPathAnalyzer), plus the
//! spans needed to point diagnostics back at the description.
//!
//! Problems in the description are reported to a [`DiagnosticSink`] and
//! never abort parsing.

#![warn(missing_docs)]

pub mod parser;

pub use parser::parse_circuit;

use critpath_diagnostics::{DiagnosticSink, FileId, SourceDb, Span};
use critpath_timing::CircuitGraph;
use serde::Serialize;
use std::collections::HashMap;
use std::io;
use std::path::Path;

/// A circuit description after parsing.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedCircuit {
    /// The circuit name from the `# Circuit name:` comment, or a fallback.
    pub name: String,
    /// The dependency graph, nodes in order of first appearance.
    pub graph: CircuitGraph,
    /// Ids that have a declaration line, in declaration order.
    pub declared: Vec<String>,
    /// Where each node is declared, or first referenced if never declared.
    pub spans: HashMap<String, Span>,
}

impl ParsedCircuit {
    /// Returns `true` if `node` has its own declaration line.
    pub fn is_declared(&self, node: &str) -> bool {
        self.declared.iter().any(|d| d == node)
    }

    /// Returns the span recorded for `node`.
    pub fn span_of(&self, node: &str) -> Option<Span> {
        self.spans.get(node).copied()
    }
}

/// Parses a file already loaded into `source_db`.
///
/// An unnamed circuit takes the file stem as its name.
pub fn parse_file(file: FileId, source_db: &SourceDb, sink: &DiagnosticSink) -> ParsedCircuit {
    let source = source_db.get_file(file);
    let fallback = source.stem().unwrap_or("unnamed");
    parser::parse_with_fallback(&source.content, file, sink, fallback)
}

/// Reads a circuit file from disk into `source_db` and parses it.
///
/// Only an unreadable file is an error; everything else is reported to
/// `sink`.
pub fn load_circuit(
    path: &Path,
    source_db: &mut SourceDb,
    sink: &DiagnosticSink,
) -> io::Result<(FileId, ParsedCircuit)> {
    let file = source_db.load_file(path)?;
    log::debug!("loaded {} as file {}", path.display(), file.as_raw());
    Ok((file, parse_file(file, source_db, sink)))
}
