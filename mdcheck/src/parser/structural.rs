use crate::diagnostic::Diagnostic;
use crate::document::{CodeBlock, Document, Section};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse Markdown source text into a Document of heading-delimited sections.
///
/// Line-based single pass. Fenced code blocks are consumed before headings
/// are recognized, so a `#` line inside a closed fence is content, never
/// structure. An unterminated fence is reported and parsing resumes at the
/// line after the opener.
pub fn parse_sections(source: &str, file_id: usize) -> (Document, Vec<Diagnostic>) {
    let lines = split_lines(source);

    let mut state = ParseState::new(source, file_id);
    let mut i = 0;

    while i < lines.len() {
        let line = &lines[i];

        if let Some(fence) = FenceLine::parse(line.text) {
            match find_closer(&lines, i + 1, &fence) {
                Some(j) => {
                    let block = CodeBlock {
                        language: fence.language(),
                        lines: lines[i + 1..j].iter().map(|l| l.text.to_string()).collect(),
                        span: line.start..lines[j].end(),
                    };
                    state.current_section().code_blocks.push(block);
                    i = j + 1;
                }
                None => {
                    state.diagnostics.push(
                        Diagnostic::malformed_block(
                            "unterminated code fence",
                            line.start..line.end(),
                            file_id,
                        )
                        .with_note(
                            "a closing fence must repeat the opening character \
                             with the exact same run length",
                        ),
                    );
                    // Recover: treat the opener as prose and rescan the rest.
                    state.current_section().has_prose = true;
                    i += 1;
                }
            }
            continue;
        }

        if let Some((level, title)) = parse_heading(line.text) {
            state.close_section(line.start);
            state.open = Some(SectionBuilder {
                title,
                level,
                span_start: line.start,
                heading_end: line.end(),
                code_blocks: Vec::new(),
                has_prose: false,
            });
            i += 1;
            continue;
        }

        if !line.text.trim().is_empty() {
            state.current_section().has_prose = true;
        }
        i += 1;
    }

    state.finalize(source.len())
}

// ---------------------------------------------------------------------------
// Parse state
// ---------------------------------------------------------------------------

struct ParseState<'a> {
    source: &'a str,
    file_id: usize,
    sections: Vec<Section>,
    open: Option<SectionBuilder>,
    diagnostics: Vec<Diagnostic>,
}

struct SectionBuilder {
    title: String,
    level: u8,
    span_start: usize,
    heading_end: usize,
    code_blocks: Vec<CodeBlock>,
    has_prose: bool,
}

impl SectionBuilder {
    fn into_section(self, span_end: usize) -> Section {
        Section {
            title: self.title,
            level: self.level,
            span: self.span_start..span_end,
            code_blocks: self.code_blocks,
            links: Vec::new(),
            has_prose: self.has_prose,
        }
    }
}

impl<'a> ParseState<'a> {
    fn new(source: &'a str, file_id: usize) -> Self {
        ParseState {
            source,
            file_id,
            sections: Vec::new(),
            open: None,
            diagnostics: Vec::new(),
        }
    }

    /// The section currently being built. Content before the first heading
    /// opens a synthetic untitled preamble section, so every code block
    /// belongs to exactly one section.
    fn current_section(&mut self) -> &mut SectionBuilder {
        self.open.get_or_insert_with(|| SectionBuilder {
            title: String::new(),
            level: 0,
            span_start: 0,
            heading_end: 0,
            code_blocks: Vec::new(),
            has_prose: false,
        })
    }

    fn close_section(&mut self, span_end: usize) {
        if let Some(builder) = self.open.take() {
            let heading_span = builder.span_start..builder.heading_end;
            let section = builder.into_section(span_end);
            // The preamble is only created when it has content.
            if section.level > 0 && section.is_empty() {
                self.diagnostics.push(Diagnostic::empty_section(
                    format!("section '{}' has no body content", section.title),
                    heading_span,
                    self.file_id,
                ));
            }
            self.sections.push(section);
        }
    }

    fn finalize(mut self, end: usize) -> (Document, Vec<Diagnostic>) {
        self.close_section(end);
        let document = Document {
            sections: self.sections,
            source_len: self.source.len(),
        };
        (document, self.diagnostics)
    }
}

// ---------------------------------------------------------------------------
// Line scanning helpers
// ---------------------------------------------------------------------------

/// A source line with its byte offset. `text` excludes the line terminator.
struct Line<'a> {
    start: usize,
    text: &'a str,
}

impl<'a> Line<'a> {
    fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

fn split_lines(source: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for segment in source.split_inclusive('\n') {
        let text = segment
            .strip_suffix('\n')
            .map(|t| t.strip_suffix('\r').unwrap_or(t))
            .unwrap_or(segment);
        lines.push(Line { start, text });
        start += segment.len();
    }
    lines
}

/// A fence delimiter line: a run of >= 3 backticks or tildes after at most
/// 3 leading spaces, followed by an optional info string.
struct FenceLine<'a> {
    ch: u8,
    run: usize,
    info: &'a str,
}

impl<'a> FenceLine<'a> {
    fn parse(text: &'a str) -> Option<Self> {
        let stripped = text.trim_start_matches(' ');
        if text.len() - stripped.len() > 3 {
            return None;
        }
        let ch = *stripped.as_bytes().first()?;
        if ch != b'`' && ch != b'~' {
            return None;
        }
        let run = stripped.bytes().take_while(|b| *b == ch).count();
        if run < 3 {
            return None;
        }
        let info = stripped[run..].trim();
        // A backtick info string may not itself contain a backtick.
        if ch == b'`' && info.contains('`') {
            return None;
        }
        Some(FenceLine { ch, run, info })
    }

    /// Whether this fence line closes a block opened by `opener`.
    ///
    /// Rule: same fence character and the exact same run length. A fence
    /// line with a longer or shorter run (or the other character) inside an
    /// open block is literal content of that block.
    fn closes(&self, opener: &FenceLine) -> bool {
        self.ch == opener.ch && self.run == opener.run
    }

    /// The declared language tag: the first word of the info string.
    fn language(&self) -> Option<String> {
        self.info.split_whitespace().next().map(String::from)
    }
}

/// Find the line index of the closing fence for an opener, if any.
fn find_closer(lines: &[Line<'_>], from: usize, opener: &FenceLine) -> Option<usize> {
    lines[from..]
        .iter()
        .position(|l| FenceLine::parse(l.text).is_some_and(|f| f.closes(opener)))
        .map(|p| from + p)
}

/// Parse a heading line: 1-6 `#` after at most 3 leading spaces, followed by
/// whitespace or end of line. Returns the level and the normalized title.
fn parse_heading(text: &str) -> Option<(u8, String)> {
    let stripped = text.trim_start_matches(' ');
    if text.len() - stripped.len() > 3 {
        return None;
    }
    let hashes = stripped.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let after = &stripped[hashes..];
    if !after.is_empty() && !after.starts_with(' ') && !after.starts_with('\t') {
        return None;
    }
    let title = strip_closing_hashes(after.trim());
    Some((hashes as u8, normalize_title(title)))
}

/// Strip an optional closing hash sequence ("## Title ##"), but only when it
/// is preceded by whitespace so titles like "C#" survive.
fn strip_closing_hashes(title: &str) -> &str {
    let trimmed = title.trim_end_matches('#');
    if trimmed.len() == title.len() {
        return title;
    }
    if trimmed.is_empty() || trimmed.ends_with(char::is_whitespace) {
        trimmed.trim_end()
    } else {
        title
    }
}

/// Normalize a title: strip leading/trailing whitespace, collapse interior
/// whitespace.
fn normalize_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
