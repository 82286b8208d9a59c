use std::ops::Range;

/// A parsed markdown document: an ordered sequence of heading-delimited
/// sections. Immutable once analysis completes.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Sections in source order. Nesting is conveyed by `Section::level` only.
    pub sections: Vec<Section>,
    /// Total length of the source in bytes.
    pub source_len: usize,
}

impl Document {
    /// The section whose span contains the given byte offset, if any.
    pub fn section_at(&self, offset: usize) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.span.start <= offset && offset < s.span.end)
    }
}

/// A heading-delimited region of the document.
/// Every code block and link reference belongs to exactly one section.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Heading text, whitespace-normalized. Empty for the synthetic
    /// preamble section covering content before the first heading.
    pub title: String,
    /// Heading level: 1-6, or 0 for the preamble section.
    pub level: u8,
    /// Byte span from the heading line to the start of the next heading
    /// (or end of document).
    pub span: Range<usize>,
    /// Fenced code blocks in this section's body, in source order.
    pub code_blocks: Vec<CodeBlock>,
    /// URL-shaped link tokens found in this section's body, in source order.
    /// Duplicates allowed.
    pub links: Vec<LinkReference>,
    /// Whether the body contained any non-blank prose line.
    pub has_prose: bool,
}

impl Section {
    /// Display name for reports: the title, or a placeholder when the
    /// heading text is empty.
    pub fn display_title(&self) -> &str {
        if !self.title.is_empty() {
            &self.title
        } else if self.level == 0 {
            "(preamble)"
        } else {
            "(untitled)"
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.has_prose && self.code_blocks.is_empty()
    }
}

/// A fenced code snippet. Content excludes the delimiter lines.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    /// Declared language tag (first word of the info string), if any.
    pub language: Option<String>,
    /// Raw content lines between the delimiters.
    pub lines: Vec<String>,
    /// Byte span covering the opening fence through the closing fence.
    pub span: Range<usize>,
}

impl CodeBlock {
    /// Key used when grouping blocks by language tag in reports.
    pub fn language_key(&self) -> &str {
        self.language.as_deref().unwrap_or("(untagged)")
    }
}

/// A URL-shaped token extracted from a section body.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkReference {
    /// The raw URL string as written in the source.
    pub url: String,
    /// Byte span of the token in the source.
    pub span: Range<usize>,
}

impl LinkReference {
    /// The scheme portion (text before the first colon), lowercased.
    pub fn scheme(&self) -> Option<String> {
        let (scheme, _) = self.url.split_once(':')?;
        Some(scheme.to_ascii_lowercase())
    }
}
