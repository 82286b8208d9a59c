use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic as CodespanDiagnostic, Label, Severity};

/// The kind of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A fenced code block opened but never closed before document end.
    MalformedBlock,
    /// A link with a disallowed scheme or embedded whitespace.
    MalformedLink,
    /// A heading with no body content. Warning only; never fails a run.
    EmptySection,
}

impl DiagnosticKind {
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticKind::MalformedBlock => "malformed-block",
            DiagnosticKind::MalformedLink => "malformed-link",
            DiagnosticKind::EmptySection => "empty-section",
        }
    }
}

/// A validation finding with source location information.
/// Diagnostics are collected, never thrown: one bad fence or link never
/// aborts the scan.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Range<usize>,
    pub file_id: usize,
    pub severity: Severity,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn malformed_block(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        Diagnostic {
            kind: DiagnosticKind::MalformedBlock,
            message: message.into(),
            span,
            file_id,
            severity: Severity::Error,
            notes: Vec::new(),
        }
    }

    pub fn malformed_link(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        Diagnostic {
            kind: DiagnosticKind::MalformedLink,
            message: message.into(),
            span,
            file_id,
            severity: Severity::Error,
            notes: Vec::new(),
        }
    }

    pub fn empty_section(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        Diagnostic {
            kind: DiagnosticKind::EmptySection,
            message: message.into(),
            span,
            file_id,
            severity: Severity::Warning,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> CodespanDiagnostic<usize> {
        CodespanDiagnostic::new(self.severity)
            .with_message(&self.message)
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}
