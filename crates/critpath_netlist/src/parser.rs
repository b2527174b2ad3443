//! Line-oriented circuit description parser.
//!
//! The format is one component per line:
//!
//! ```text
//! # Circuit name: 2-stage adder
//! INPUT i1
//! ADD a1 i1
//! ADD a2 a1
//! OUTPUT o1 a2
//! ```
//!
//! The first token is the component keyword, the second the node id, and
//! any remaining tokens name the nodes that feed it. Blank lines and `#`
//! comments are skipped; the first comment mentioning `Circuit name` names
//! the circuit.
//!
//! Parsing never fails. Malformed lines are reported to the sink and
//! skipped, and ids that are referenced but never declared become
//! [`ComponentType::Unknown`] nodes, so the graph never has a dangling edge.

use crate::ParsedCircuit;
use critpath_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, FileId, Label, Span};
use critpath_timing::{CircuitGraph, ComponentType, NodeId};
use std::collections::HashMap;

/// A keyword line with no node id.
pub const MISSING_NODE_ID: u16 = 101;
/// A node declared on more than one line.
pub const DUPLICATE_DECLARATION: u16 = 102;
/// The same input listed twice on one line.
pub const REPEATED_INPUT: u16 = 103;
/// No `# Circuit name:` comment.
pub const MISSING_CIRCUIT_NAME: u16 = 104;

const NAME_MARKER: &str = "Circuit name";

/// A whitespace-separated token and where it sits in the file.
#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    text: &'a str,
    span: Span,
}

/// Collects nodes in order of first appearance.
struct Builder<'a> {
    file: FileId,
    sink: &'a DiagnosticSink,
    name: Option<String>,
    order: Vec<&'a str>,
    ids: HashMap<&'a str, NodeId>,
    components: Vec<ComponentType>,
    spans: HashMap<String, Span>,
    declared_at: HashMap<&'a str, Span>,
    declared: Vec<String>,
    edges: Vec<(NodeId, NodeId)>,
}

/// Parses circuit description text into a graph.
///
/// `file` is stamped on every recorded span. A circuit without a name
/// comment is called `unnamed`; [`crate::load_circuit`] substitutes the file
/// stem instead.
pub fn parse_circuit(source: &str, file: FileId, sink: &DiagnosticSink) -> ParsedCircuit {
    parse_with_fallback(source, file, sink, "unnamed")
}

pub(crate) fn parse_with_fallback(
    source: &str,
    file: FileId,
    sink: &DiagnosticSink,
    fallback_name: &str,
) -> ParsedCircuit {
    let mut builder = Builder {
        file,
        sink,
        name: None,
        order: Vec::new(),
        ids: HashMap::new(),
        components: Vec::new(),
        spans: HashMap::new(),
        declared_at: HashMap::new(),
        declared: Vec::new(),
        edges: Vec::new(),
    };

    let mut offset = 0usize;
    for raw in source.split_inclusive('\n') {
        builder.line(raw, offset);
        offset += raw.len();
    }

    let name = match builder.name.take() {
        Some(name) => name,
        None => {
            sink.emit(
                Diagnostic::warning(
                    DiagnosticCode::new(Category::Warning, MISSING_CIRCUIT_NAME),
                    format!("circuit has no name comment, using `{fallback_name}`"),
                    Span::new(file, 0, 0),
                )
                .with_help("add a line like `# Circuit name: my circuit`"),
            );
            fallback_name.to_string()
        }
    };

    log::debug!(
        "parsed circuit `{name}`: {} nodes, {} declared, {} edges",
        builder.order.len(),
        builder.declared.len(),
        builder.edges.len()
    );

    builder.finish(name)
}

impl<'a> Builder<'a> {
    fn line(&mut self, raw: &'a str, offset: usize) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return;
        }
        if trimmed.starts_with('#') {
            self.comment(trimmed);
            return;
        }

        let tokens = tokenize(raw, offset, self.file);
        let Some((keyword, rest)) = tokens.split_first() else {
            return;
        };
        let Some((id, inputs)) = rest.split_first() else {
            self.sink.emit(
                Diagnostic::error(
                    DiagnosticCode::new(Category::Error, MISSING_NODE_ID),
                    format!("`{}` line has no node id", keyword.text),
                    keyword.span,
                )
                .with_label(Label::primary(keyword.span, "expected a node id after this"))
                .with_note("the line is skipped"),
            );
            return;
        };

        if let Some(&first) = self.declared_at.get(id.text) {
            self.sink.emit(
                Diagnostic::error(
                    DiagnosticCode::new(Category::Error, DUPLICATE_DECLARATION),
                    format!("node `{}` is declared more than once", id.text),
                    id.span,
                )
                .with_label(Label::primary(id.span, "second declaration"))
                .with_label(Label::secondary(first, "first declared here"))
                .with_note("the first declaration is kept"),
            );
            return;
        }

        let node = self.touch(*id);
        self.components[node.as_raw() as usize] = ComponentType::parse(keyword.text);
        self.declared_at.insert(id.text, id.span);
        self.declared.push(id.text.to_string());
        self.spans.insert(id.text.to_string(), id.span);

        let mut seen: Vec<&str> = Vec::with_capacity(inputs.len());
        for input in inputs {
            if seen.contains(&input.text) {
                self.sink.emit(
                    Diagnostic::warning(
                        DiagnosticCode::new(Category::Warning, REPEATED_INPUT),
                        format!("node `{}` lists input `{}` more than once", id.text, input.text),
                        input.span,
                    )
                    .with_note("repeated inputs are collapsed into one edge"),
                );
                continue;
            }
            seen.push(input.text);
            let source = self.touch(*input);
            self.edges.push((source, node));
        }
    }

    fn comment(&mut self, text: &str) {
        if self.name.is_some() || !text.contains(NAME_MARKER) {
            return;
        }
        if let Some((_, value)) = text.split_once(':') {
            let value = value.trim();
            if !value.is_empty() {
                self.name = Some(value.to_string());
            }
        }
    }

    /// Returns the id for `token`, registering it as an unknown node on
    /// first sight.
    fn touch(&mut self, token: Token<'a>) -> NodeId {
        if let Some(&id) = self.ids.get(token.text) {
            return id;
        }
        let id = NodeId::from_raw(self.order.len() as u32);
        self.ids.insert(token.text, id);
        self.order.push(token.text);
        self.components.push(ComponentType::Unknown);
        self.spans.insert(token.text.to_string(), token.span);
        id
    }

    fn finish(self, name: String) -> ParsedCircuit {
        let mut graph = CircuitGraph::new();
        for (node, component) in self.order.iter().zip(self.components) {
            graph
                .add_node(*node, component)
                .expect("node names are registered once");
        }
        for (from, to) in self.edges {
            graph.add_edge_ids(from, to);
        }
        ParsedCircuit {
            name,
            graph,
            declared: self.declared,
            spans: self.spans,
        }
    }
}

/// Splits a line on whitespace, recording each token's byte span.
fn tokenize(line: &str, base: usize, file: FileId) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, ch) in line.char_indices() {
        match (ch.is_whitespace(), start) {
            (true, Some(s)) => {
                tokens.push(token(line, s, i, base, file));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push(token(line, s, line.len(), base, file));
    }
    tokens
}

fn token(line: &str, start: usize, end: usize, base: usize, file: FileId) -> Token<'_> {
    Token {
        text: &line[start..end],
        span: Span::new(file, (base + start) as u32, (base + end) as u32),
    }
}
