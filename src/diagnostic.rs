//! Structured, renderable problem reports.

use crate::pos::{Position, SourceLocator};
use serde::Serialize;
use std::fmt::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    pub fn point(pos: Position) -> Self {
        Span {
            start: pos.clone(),
            end: pos,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    /// Hints printed after the source excerpt.
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Diagnostic {
            severity: Severity::Error,
            message: message.into(),
            span,
            notes: vec![],
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Formats the diagnostic with the offending source line and a caret
    /// under the start column:
    ///
    /// ```text
    /// error: expected IDENT, got INT ("1")
    ///  --> main.gvt:3:5
    ///     |
    ///   3 | def 1 = 2
    ///     |     ^
    /// ```
    pub fn render(&self, source: &str) -> String {
        let locator = SourceLocator::new(source);
        self.render_with(source, &locator)
    }

    /// Same as [`Diagnostic::render`], reusing a locator built for `source`.
    pub fn render_with(&self, source: &str, locator: &SourceLocator) -> String {
        let start = &self.span.start;
        let code_line = locator.line_text(source, start.line).unwrap_or("");
        let underline = format!(
            "{}^",
            " ".repeat(start.column.saturating_sub(1) as usize)
        );
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "{}: {}\n --> {}:{}:{}\n    |\n {:2} | {}\n    | {}\n",
            self.severity,
            self.message,
            start.file,
            start.line,
            start.column,
            start.line,
            code_line,
            underline,
        );
        for note in &self.notes {
            let _ = writeln!(out, "    = note: {}", note);
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.span.start, self.severity, self.message)
    }
}
