use mdcheck::Analysis;
use mdcheck::diagnostic::DiagnosticKind;
use mdcheck::link::SchemeSet;
use mdcheck::report::ValidationReport;

fn analyze(source: &str) -> Analysis {
    mdcheck::analyze(source, 0, &SchemeSet::default())
}

fn report(source: &str) -> ValidationReport {
    analyze(source).report(source)
}

fn kinds(analysis: &Analysis) -> Vec<DiagnosticKind> {
    analysis.diagnostics.iter().map(|d| d.kind).collect()
}

#[test]
fn clean_document_passes() {
    let src = "# 1. PURPOSE & SCOPE\n\nSome prose.\n\n```js\nconsole.log(1);\n```\n";
    let report = report(src);
    assert_eq!(report.sections, 1);
    assert_eq!(report.code_blocks.get("js"), Some(&1));
    assert_eq!(report.findings.len(), 0);
    assert!(report.pass);
}

#[test]
fn code_block_content_excludes_delimiters() {
    let src = "# A\n\n```js\nconsole.log(1);\n```\n";
    let analysis = analyze(src);
    let block = &analysis.document.sections[0].code_blocks[0];
    assert_eq!(block.language.as_deref(), Some("js"));
    assert_eq!(block.lines, vec!["console.log(1);"]);
}

#[test]
fn unterminated_fence_reports_opening_line() {
    let src = "# A\n\n```js\nlet x = 1;\n";
    let analysis = analyze(src);
    assert_eq!(kinds(&analysis), vec![DiagnosticKind::MalformedBlock]);
    assert!(!analysis.pass());

    let report = analysis.report(src);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].line, 3);
    assert_eq!(report.findings[0].section, "A");
    assert!(!report.pass);
}

#[test]
fn parsing_resumes_after_unterminated_fence() {
    let src = "# A\n```\n# B\ntext\n";
    let analysis = analyze(src);

    let titles: Vec<&str> = analysis
        .document
        .sections
        .iter()
        .map(|s| s.title.as_str())
        .collect();
    assert_eq!(titles, vec!["A", "B"]);

    let blocks: Vec<DiagnosticKind> = kinds(&analysis)
        .into_iter()
        .filter(|k| *k == DiagnosticKind::MalformedBlock)
        .collect();
    assert_eq!(blocks.len(), 1);
}

#[test]
fn heading_inside_closed_fence_is_content() {
    let src = "# A\n\n```\n# not a heading\n```\n";
    let report = report(src);
    assert_eq!(report.sections, 1);
    assert!(report.pass);
}

#[test]
fn longer_inner_fence_is_literal_content() {
    let src = "# A\n\n````\n```js\ninner\n```\n````\n";
    let analysis = analyze(src);
    assert!(analysis.pass());

    let section = &analysis.document.sections[0];
    assert_eq!(section.code_blocks.len(), 1);
    assert_eq!(section.code_blocks[0].lines, vec!["```js", "inner", "```"]);
}

#[test]
fn exact_run_length_closes_even_with_info() {
    let src = "# A\n\n```\ntext\n```js\nmore prose\n";
    let analysis = analyze(src);
    assert!(analysis.pass());

    let section = &analysis.document.sections[0];
    assert_eq!(section.code_blocks.len(), 1);
    assert_eq!(section.code_blocks[0].lines, vec!["text"]);
}

#[test]
fn link_inside_longer_run_fence_is_not_scanned() {
    let src = "# A\n\n```\ncode\n````\nftp://example.com\n```\n";
    let analysis = analyze(src);
    assert!(analysis.pass());
    assert_eq!(analysis.diagnostics.len(), 0);

    let section = &analysis.document.sections[0];
    assert_eq!(section.code_blocks.len(), 1);
    assert_eq!(
        section.code_blocks[0].lines,
        vec!["code", "````", "ftp://example.com"]
    );
    assert_eq!(analysis.report(src).links, 0);
}

#[test]
fn unterminated_fence_is_sole_diagnostic() {
    let src = "# A\n```\n";
    let analysis = analyze(src);
    assert_eq!(kinds(&analysis), vec![DiagnosticKind::MalformedBlock]);
}

#[test]
fn tilde_fence_does_not_close_backtick_fence() {
    let src = "# A\n\n```\n~~~\n```\n";
    let analysis = analyze(src);
    assert!(analysis.pass());
    assert_eq!(
        analysis.document.sections[0].code_blocks[0].lines,
        vec!["~~~"]
    );
}

#[test]
fn disallowed_scheme_fails() {
    let src = "# A\n\nftp://example.com\n";
    let analysis = analyze(src);
    assert_eq!(kinds(&analysis), vec![DiagnosticKind::MalformedLink]);
    assert!(!analysis.pass());

    let report = analysis.report(src);
    assert_eq!(report.links, 1);
    assert_eq!(report.findings[0].line, 3);
}

#[test]
fn custom_scheme_set_is_honored() {
    let src = "# A\n\nftp://example.com and http://example.com\n";
    let analysis = mdcheck::analyze(src, 0, &SchemeSet::new(["ftp"]));
    let report = analysis.report(src);
    assert_eq!(report.links, 2);
    assert_eq!(report.findings.len(), 1);
    assert!(report.findings[0].message.contains("http"));
}

#[test]
fn markdown_destination_is_validated() {
    let src = "# A\n\n[site](ftp://example.com)\n";
    let analysis = analyze(src);
    assert_eq!(kinds(&analysis), vec![DiagnosticKind::MalformedLink]);
    assert_eq!(analysis.document.sections[0].links.len(), 1);
}

#[test]
fn whitespace_in_destination_fails() {
    let src = "# A\n\n[x](<http://example.com/a b>)\n";
    let analysis = analyze(src);
    assert_eq!(kinds(&analysis), vec![DiagnosticKind::MalformedLink]);
    assert!(
        analysis.diagnostics[0].message.contains("whitespace"),
        "unexpected message: {}",
        analysis.diagnostics[0].message
    );
}

#[test]
fn autolink_is_counted_once() {
    let src = "# A\n\n<http://example.com>\n";
    let report = report(src);
    assert_eq!(report.links, 1);
    assert!(report.pass);
}

#[test]
fn relative_destinations_are_ignored() {
    let src = "# A\n\n[doc](./other.md) and [frag](#section)\n";
    let report = report(src);
    assert_eq!(report.links, 0);
    assert!(report.pass);
}

#[test]
fn links_inside_code_are_ignored() {
    let src = "# A\n\n```\nftp://example.com\n```\n\nuse `ftp://inline.example` here\n";
    let report = report(src);
    assert_eq!(report.links, 0);
    assert_eq!(report.findings.len(), 0);
    assert!(report.pass);
}

#[test]
fn empty_section_warns_but_passes() {
    let src = "# A\n\ntext\n\n# B\n";
    let analysis = analyze(src);
    assert_eq!(kinds(&analysis), vec![DiagnosticKind::EmptySection]);
    assert!(analysis.pass());

    let report = analysis.report(src);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].section, "B");
    assert!(report.pass);
}

#[test]
fn preamble_content_gets_its_own_section() {
    let src = "intro with http://example.com\n\n# A\ntext\n";
    let analysis = analyze(src);
    assert!(analysis.pass());

    let sections = &analysis.document.sections;
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].title, "");
    assert_eq!(sections[0].display_title(), "(preamble)");
    assert_eq!(sections[0].links.len(), 1);
    assert_eq!(sections[1].title, "A");
}

#[test]
fn section_count_and_language_grouping() {
    let src = "# A\n\n```js\na\n```\n\n## B\n\n```js\nb\n```\n\n```\nc\n```\n";
    let report = report(src);
    assert_eq!(report.sections, 2);
    assert_eq!(report.code_blocks.get("js"), Some(&2));
    assert_eq!(report.code_blocks.get("(untagged)"), Some(&1));
    assert!(report.pass);
}

#[test]
fn reports_are_idempotent() {
    let src = "# A\n\nftp://example.com\n\n```js\nx\n```\n\n# B\n";
    let first = report(src).to_string();
    let second = report(src).to_string();
    assert_eq!(first, second);
}

#[test]
fn pass_iff_no_error_diagnostics() {
    assert!(report("# A\n\ntext\n").pass);
    assert!(!report("# A\n\n```\n").pass);
    assert!(!report("# A\n\nftp://example.com\n").pass);
}
