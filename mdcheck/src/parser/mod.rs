mod structural;

use crate::diagnostic::Diagnostic;
use crate::document::Document;

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser { source, file_id }
    }

    /// Parse the source Markdown into a Document, collecting diagnostics.
    /// Malformed structure is reported, never fatal: parsing always
    /// produces a Document.
    pub fn parse(&self) -> (Document, Vec<Diagnostic>) {
        structural::parse_sections(&self.source, self.file_id)
    }
}
