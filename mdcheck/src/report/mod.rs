use std::collections::BTreeMap;
use std::fmt;

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::document::Document;

/// A validation finding as it appears in the final report.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub kind: DiagnosticKind,
    /// Title of the enclosing section, or "(document)" when the finding
    /// falls outside every section.
    pub section: String,
    /// 1-based line number of the finding's span start.
    pub line: usize,
    pub message: String,
}

/// The aggregated result of one validation run. Holds only derived summary
/// data; read-only after generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    /// Total number of sections.
    pub sections: usize,
    /// Code-block counts grouped by language tag. BTreeMap keeps the
    /// rendered report deterministic.
    pub code_blocks: BTreeMap<String, usize>,
    /// Total number of link references.
    pub links: usize,
    /// Findings ordered by source position.
    pub findings: Vec<Finding>,
    /// True iff there are zero error-severity findings. Warnings do not
    /// fail a run.
    pub pass: bool,
}

impl ValidationReport {
    pub fn build(document: &Document, diagnostics: &[Diagnostic], source: &str) -> Self {
        let mut code_blocks: BTreeMap<String, usize> = BTreeMap::new();
        for section in &document.sections {
            for block in &section.code_blocks {
                *code_blocks.entry(block.language_key().to_string()).or_insert(0) += 1;
            }
        }

        let links = document.sections.iter().map(|s| s.links.len()).sum();

        let mut ordered: Vec<&Diagnostic> = diagnostics.iter().collect();
        ordered.sort_by_key(|d| d.span.start);

        let findings = ordered
            .iter()
            .map(|d| Finding {
                kind: d.kind,
                section: document
                    .section_at(d.span.start)
                    .map(|s| s.display_title().to_string())
                    .unwrap_or_else(|| "(document)".to_string()),
                line: line_number(source, d.span.start),
                message: d.message.clone(),
            })
            .collect();

        ValidationReport {
            sections: document.sections.len(),
            code_blocks,
            links,
            findings,
            pass: diagnostics.iter().all(|d| !d.is_error()),
        }
    }
}

/// 1-based line number of a byte offset.
fn line_number(source: &str, offset: usize) -> usize {
    let offset = offset.min(source.len());
    source[..offset].bytes().filter(|b| *b == b'\n').count() + 1
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "sections: {}", self.sections)?;
        let total: usize = self.code_blocks.values().sum();
        writeln!(f, "code blocks: {}", total)?;
        for (tag, count) in &self.code_blocks {
            writeln!(f, "  {}: {}", tag, count)?;
        }
        writeln!(f, "links: {}", self.links)?;
        writeln!(f, "findings: {}", self.findings.len())?;
        for finding in &self.findings {
            writeln!(
                f,
                "  line {} [{}] {}: {}",
                finding.line,
                finding.kind.name(),
                finding.section,
                finding.message
            )?;
        }
        writeln!(f, "result: {}", if self.pass { "PASS" } else { "FAIL" })
    }
}
