//! Diagnostic rendering for the terminal.

use crate::diagnostic::Diagnostic;
use crate::source::SourceDb;

/// Formats a diagnostic into a string.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;
}

/// Renders diagnostics in a rustc-style terminal format:
///
/// ```text
/// error[E102]: node `a1` is declared more than once
///   --> cir1.txt:4:5
///   |
/// 4 | ADD a1 x y
///   |     ^^ second declaration
///   = note: the first declaration is kept
/// ```
pub struct TerminalRenderer {
    /// Whether to emit ANSI color codes.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, ansi: &str) -> String {
        if self.color {
            format!("\x1b[{ansi}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = String::new();

        let header = format!("{}[{}]", diag.severity, diag.code);
        let ansi = if diag.severity.is_error() { "1;31" } else { "1;33" };
        out.push_str(&format!("{}: {}\n", self.paint(&header, ansi), diag.message));

        if !diag.primary_span.is_dummy() {
            let resolved = source_db.resolve_span(diag.primary_span);
            out.push_str(&format!("  --> {resolved}\n"));

            let file = source_db.get_file(diag.primary_span.file);
            let (line, col) = file.line_col(diag.primary_span.start);
            let line_num = line.to_string();
            let padding = " ".repeat(line_num.len());

            out.push_str(&format!("{padding} |\n"));
            out.push_str(&format!(
                "{line_num} | {}\n",
                file.line_text(diag.primary_span.start)
            ));

            let carets = "^".repeat(diag.primary_span.len().max(1) as usize);
            let col_padding = " ".repeat((col as usize).saturating_sub(1));
            let primary_msg = diag
                .labels
                .iter()
                .find(|l| l.primary)
                .map(|l| format!(" {}", l.message))
                .unwrap_or_default();
            out.push_str(&format!(
                "{padding} | {col_padding}{}{primary_msg}\n",
                self.paint(&carets, ansi)
            ));

            for label in diag.labels.iter().filter(|l| !l.primary && !l.span.is_dummy()) {
                out.push_str(&format!(
                    "{padding} = {}: {}\n",
                    source_db.resolve_span(label.span),
                    label.message
                ));
            }
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }

        out
    }
}
