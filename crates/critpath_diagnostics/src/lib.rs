//! Source tracking and structured diagnostics for circuit descriptions.
//!
//! The [`SourceDb`] owns the text of every loaded circuit file and resolves
//! [`Span`]s to `file:line:col`. [`Diagnostic`]s carry a severity, a code, and
//! a primary span; the thread-safe [`DiagnosticSink`] accumulates them while
//! files are parsed and analyzed, and [`TerminalRenderer`] formats them.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;
pub mod source;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::{Diagnostic, Label};
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
pub use source::{FileId, ResolvedSpan, SourceDb, SourceFile, Span};
