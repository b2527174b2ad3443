//! Loaded circuit files, byte spans, and line/column resolution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Opaque identifier for a file loaded into the [`SourceDb`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// File ID used by spans that have no source location.
    pub const DUMMY: FileId = FileId(u32::MAX);

    /// Creates a `FileId` from a raw `u32` value.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `u32` value.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// A byte range `[start, end)` within a loaded file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Span {
    /// The file this span belongs to.
    pub file: FileId,
    /// Byte offset of the first byte (inclusive).
    pub start: u32,
    /// Byte offset one past the last byte (exclusive).
    pub end: u32,
}

impl Span {
    /// A span with no source location.
    pub const DUMMY: Span = Span {
        file: FileId::DUMMY,
        start: 0,
        end: 0,
    };

    /// Creates a new span in `file` covering `start..end`.
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Self { file, start, end }
    }

    /// Returns the length of this span in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` if this span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if this is the dummy span.
    pub fn is_dummy(&self) -> bool {
        self.file == FileId::DUMMY
    }
}

/// A circuit file's text with precomputed line starts.
pub struct SourceFile {
    /// The identifier of this file within its [`SourceDb`].
    pub id: FileId,
    /// Filesystem path, or a synthetic name for in-memory sources.
    pub path: PathBuf,
    /// The full text of the file.
    pub content: String,
    line_starts: Vec<u32>,
}

impl SourceFile {
    /// Creates a `SourceFile`, indexing the start of each line.
    pub fn new(id: FileId, path: PathBuf, content: String) -> Self {
        let line_starts = std::iter::once(0)
            .chain(
                content
                    .bytes()
                    .enumerate()
                    .filter(|&(_, b)| b == b'\n')
                    .map(|(i, _)| (i + 1) as u32),
            )
            .collect();
        Self {
            id,
            path,
            content,
            line_starts,
        }
    }

    /// Converts a byte offset into 1-indexed `(line, column)` coordinates.
    pub fn line_col(&self, byte_offset: u32) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let col = byte_offset - self.line_starts[line_idx] + 1;
        (line_idx as u32 + 1, col)
    }

    /// Returns the full text of the line containing `byte_offset`, without
    /// its line terminator.
    pub fn line_text(&self, byte_offset: u32) -> &str {
        let offset = (byte_offset as usize).min(self.content.len());
        let start = self.content[..offset].rfind('\n').map_or(0, |p| p + 1);
        let end = self.content[offset..]
            .find('\n')
            .map_or(self.content.len(), |p| offset + p);
        self.content[start..end].trim_end_matches('\r')
    }

    /// Returns the file stem, used as a fallback circuit name.
    pub fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }
}

/// Owns every loaded circuit file for a session.
#[derive(Default)]
pub struct SourceDb {
    files: Vec<SourceFile>,
}

impl SourceDb {
    /// Creates an empty source database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a file from disk and returns its [`FileId`].
    pub fn load_file(&mut self, path: &Path) -> Result<FileId, io::Error> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.add_source(path, content))
    }

    /// Adds an in-memory source under the given display name.
    pub fn add_source(&mut self, name: impl Into<PathBuf>, content: String) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        self.files.push(SourceFile::new(id, name.into(), content));
        id
    }

    /// Returns the [`SourceFile`] for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this database.
    pub fn get_file(&self, id: FileId) -> &SourceFile {
        &self.files[id.as_raw() as usize]
    }

    /// Returns the number of loaded files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Resolves a [`Span`] to line/column coordinates.
    pub fn resolve_span(&self, span: Span) -> ResolvedSpan {
        let file = self.get_file(span.file);
        let (start_line, start_col) = file.line_col(span.start);
        let (end_line, end_col) = file.line_col(span.end.saturating_sub(1).max(span.start));
        ResolvedSpan {
            file_path: file.path.clone(),
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Returns the text covered by `span`.
    pub fn snippet(&self, span: Span) -> &str {
        let file = self.get_file(span.file);
        &file.content[span.start as usize..span.end as usize]
    }
}

/// A span resolved to 1-indexed line/column coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpan {
    /// Path of the file.
    pub file_path: PathBuf,
    /// Starting line (1-indexed).
    pub start_line: u32,
    /// Starting column (1-indexed).
    pub start_col: u32,
    /// Ending line (1-indexed).
    pub end_line: u32,
    /// Ending column (1-indexed).
    pub end_col: u32,
}

impl fmt::Display for ResolvedSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file_path.display(),
            self.start_line,
            self.start_col
        )
    }
}
