use pulldown_cmark::{Event, Options, Parser as CmarkParser, Tag, TagEnd};

use crate::diagnostic::Diagnostic;
use crate::document::{Document, LinkReference};

// ---------------------------------------------------------------------------
// Scheme allow-set
// ---------------------------------------------------------------------------

/// The configured set of allowed link schemes. Membership is
/// case-insensitive; schemes are stored lowercased.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemeSet {
    schemes: Vec<String>,
}

impl Default for SchemeSet {
    fn default() -> Self {
        SchemeSet::new(["http", "https"])
    }
}

impl SchemeSet {
    pub fn new<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        SchemeSet {
            schemes: schemes
                .into_iter()
                .map(|s| s.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn allows(&self, scheme: &str) -> bool {
        let scheme = scheme.to_ascii_lowercase();
        self.schemes.iter().any(|s| *s == scheme)
    }

    /// Comma-separated listing for diagnostic notes.
    pub fn describe(&self) -> String {
        self.schemes.join(", ")
    }
}

// ---------------------------------------------------------------------------
// Extraction & validation
// ---------------------------------------------------------------------------

/// Scan the document for URL-shaped tokens, attach a LinkReference to the
/// owning section, and validate each against the scheme allow-set.
/// Malformed links are collected, never fatal: one bad link never aborts
/// the scan.
pub fn scan_links(
    document: &mut Document,
    source: &str,
    file_id: usize,
    schemes: &SchemeSet,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for link in extract_links(source) {
        // The structural parser is authoritative about code-block extents:
        // its fence-closing rule (exact run length) is stricter than
        // CommonMark's, so a token the CommonMark pass saw as prose can
        // still land inside a parsed code block.
        if in_code_block(document, link.span.start) {
            continue;
        }
        if let Some(diagnostic) = validate(&link, file_id, schemes) {
            diagnostics.push(diagnostic);
        }
        if let Some(section) = document
            .sections
            .iter_mut()
            .find(|s| s.span.start <= link.span.start && link.span.start < s.span.end)
        {
            section.links.push(link);
        }
    }

    diagnostics
}

fn in_code_block(document: &Document, offset: usize) -> bool {
    document
        .sections
        .iter()
        .flat_map(|s| &s.code_blocks)
        .any(|b| b.span.start <= offset && offset < b.span.end)
}

fn validate(link: &LinkReference, file_id: usize, schemes: &SchemeSet) -> Option<Diagnostic> {
    if link.url.chars().any(char::is_whitespace) {
        return Some(Diagnostic::malformed_link(
            "link contains unescaped whitespace",
            link.span.clone(),
            file_id,
        ));
    }
    let scheme = link.scheme()?;
    if !schemes.allows(&scheme) {
        return Some(
            Diagnostic::malformed_link(
                format!("link scheme '{}' is not allowed", scheme),
                link.span.clone(),
                file_id,
            )
            .with_note(format!("allowed schemes: {}", schemes.describe())),
        );
    }
    None
}

/// Extract URL-shaped tokens from the source: markdown link and image
/// destinations, plus bare URLs in prose. Text inside code blocks and code
/// spans is skipped.
fn extract_links(source: &str) -> Vec<LinkReference> {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    let parser = CmarkParser::new_ext(source, options);

    let mut links = Vec::new();
    let mut code_depth = 0usize;
    // Link text of an autolink is the URL itself; skip bare scanning inside
    // link markup so it is not counted twice.
    let mut link_depth = 0usize;

    for (event, range) in parser.into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(_)) => code_depth += 1,
            Event::End(TagEnd::CodeBlock) => code_depth = code_depth.saturating_sub(1),
            Event::Start(Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. }) => {
                link_depth += 1;
                if code_depth == 0 && is_url_shaped(&dest_url) {
                    links.push(LinkReference {
                        url: dest_url.to_string(),
                        span: range,
                    });
                }
            }
            Event::End(TagEnd::Link | TagEnd::Image) => {
                link_depth = link_depth.saturating_sub(1);
            }
            Event::Text(_) if code_depth == 0 && link_depth == 0 => {
                // Scan the raw source slice rather than the event's string,
                // so byte offsets stay exact.
                let Some(slice) = source.get(range.clone()) else {
                    continue;
                };
                for (offset, token) in scan_bare_urls(slice) {
                    let start = range.start + offset;
                    links.push(LinkReference {
                        url: token.to_string(),
                        span: start..start + token.len(),
                    });
                }
            }
            _ => {}
        }
    }

    links
}

/// Whether a link destination is URL-shaped: a scheme (ALPHA followed by
/// ALPHA / DIGIT / '+' / '-' / '.'), a colon, and a non-empty remainder.
/// Relative paths and fragments are not URL-shaped and are ignored.
fn is_url_shaped(dest: &str) -> bool {
    let Some((scheme, rest)) = dest.split_once(':') else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }
    let mut bytes = scheme.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
}

/// Find bare URL tokens in a prose slice. A bare token must contain "://"
/// after its scheme; trailing punctuation is trimmed. Returns byte offsets
/// relative to the slice.
fn scan_bare_urls(text: &str) -> Vec<(usize, &str)> {
    let mut found = Vec::new();
    let mut search_from = 0;

    while let Some(pos) = text[search_from..].find("://") {
        let colon = search_from + pos;
        search_from = colon + 3;

        // Scan backwards over scheme characters.
        let scheme_start = text[..colon]
            .rfind(|c: char| !c.is_ascii_alphanumeric() && c != '+' && c != '-' && c != '.')
            .map(|p| p + text[p..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
        let scheme = &text[scheme_start..colon];
        if scheme.is_empty() || !scheme.as_bytes()[0].is_ascii_alphabetic() {
            continue;
        }

        // Extend forwards to the next whitespace.
        let end = text[colon..]
            .find(char::is_whitespace)
            .map(|p| colon + p)
            .unwrap_or(text.len());
        let token = text[scheme_start..end].trim_end_matches(TRAILING_PUNCTUATION);
        if token.len() <= colon + 3 - scheme_start {
            // Nothing left after the "://".
            continue;
        }
        found.push((scheme_start, token));
        search_from = scheme_start + token.len();
    }

    found
}

const TRAILING_PUNCTUATION: &[char] = &[')', ']', '>', '.', ',', ';', ':', '!', '?', '"', '\''];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_shapes() {
        assert!(is_url_shaped("http://example.com"));
        assert!(is_url_shaped("mailto:me@example.com"));
        assert!(!is_url_shaped("./relative/path.md"));
        assert!(!is_url_shaped("#fragment"));
        assert!(!is_url_shaped("42:19"));
    }

    #[test]
    fn bare_scan_finds_tokens() {
        let found = scan_bare_urls("see http://a.example and https://b.example.");
        assert_eq!(
            found,
            vec![(4, "http://a.example"), (25, "https://b.example")]
        );
    }

    #[test]
    fn bare_scan_trims_wrapping_punctuation() {
        let found = scan_bare_urls("(http://example.com/x), done");
        assert_eq!(found, vec![(1, "http://example.com/x")]);
    }

    #[test]
    fn bare_scan_requires_scheme() {
        assert!(scan_bare_urls("just :// nothing").is_empty());
        assert!(scan_bare_urls("no urls here").is_empty());
    }

    #[test]
    fn scheme_set_is_case_insensitive() {
        let set = SchemeSet::default();
        assert!(set.allows("HTTP"));
        assert!(set.allows("https"));
        assert!(!set.allows("ftp"));
    }
}
