pub mod diagnostic;
pub mod document;
pub mod link;
pub mod parser;
pub mod report;

use crate::diagnostic::Diagnostic;
use crate::document::Document;
use crate::link::SchemeSet;
use crate::report::ValidationReport;

/// The result of analyzing one markdown document.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub document: Document,
    /// All collected diagnostics, structural first, then links.
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    /// True iff there are zero error-severity diagnostics.
    pub fn pass(&self) -> bool {
        self.diagnostics.iter().all(|d| !d.is_error())
    }

    pub fn report(&self, source: &str) -> ValidationReport {
        ValidationReport::build(&self.document, &self.diagnostics, source)
    }
}

/// One-pass analysis: parse the document structure, then extract and
/// validate link references against the scheme allow-set.
pub fn analyze(source: &str, file_id: usize, schemes: &SchemeSet) -> Analysis {
    let parser = parser::Parser::new(source.to_string(), file_id);
    let (mut document, mut diagnostics) = parser.parse();
    diagnostics.extend(link::scan_links(&mut document, source, file_id, schemes));
    Analysis {
        document,
        diagnostics,
    }
}
