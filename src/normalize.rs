//! HTML normalization.
//!
//! Turns raw HTML fragments into clean, structure-preserving plain text:
//! paragraph and line-break semantics are kept as blank-line-separated
//! blocks, everything non-visible is stripped. Both functions are pure and
//! never fail — malformed HTML degrades to best-effort text.

use dom_query::Document;
use regex::Regex;
use std::sync::LazyLock;

/// Elements that carry no visible text.
const NONVISIBLE_SELECTOR: &str = "script, style, meta, link, iframe";

/// Elements that mark a paragraph boundary mid-flow.
const LINEBREAK_SELECTOR: &str = "br, hr";

/// Block-level elements that end a paragraph.
const BLOCK_SELECTOR: &str = "p, div, li, tr, h1, h2, h3, h4, h5, h6";

/// A run of two or more newlines, possibly with blank padding between.
static RE_BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n[ \t\r\u{a0}]*(?:\n[ \t\r\u{a0}]*)+").expect("RE_BLANK_RUN regex")
});

/// Horizontal whitespace runs inside a line.
static RE_INLINE_SPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ \t\r\u{a0}]+").expect("RE_INLINE_SPACE regex")
});

/// First line-break tag in a RAW fragment. The preview split must run on
/// the raw markup: the break element is the delimiter, and once normalized
/// away the split point is gone.
static RE_RAW_LINEBREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:br|hr)\b[^>]*>").expect("RE_RAW_LINEBREAK regex")
});

/// Normalize an HTML fragment into plain text with paragraph structure.
///
/// Line-break elements and block-element boundaries both become paragraph
/// breaks; any run of blank lines collapses to a single blank line, so the
/// result never contains three or more consecutive newlines.
///
/// # Example
///
/// ```rust
/// use case_ingest::normalize::normalize;
///
/// let text = normalize("<p>one</p><p>two</p>");
/// assert_eq!(text, "one\n\ntwo");
/// ```
#[must_use]
pub fn normalize(fragment: &str) -> String {
    let doc = Document::from(fragment);

    doc.select(NONVISIBLE_SELECTOR).remove();
    // A break element separates paragraphs in the sources this pipeline
    // sees; the collapse step dedupes breaks that stack up.
    doc.select(LINEBREAK_SELECTOR).replace_with_html("\n\n");
    doc.select(BLOCK_SELECTOR).append_html("\n\n");

    collapse(&doc.select("body").text())
}

/// Extract the preview text of a fragment: everything before the first
/// line-break element, stripped and whitespace-collapsed.
///
/// Operates on the raw fragment string, not on normalized output — see
/// [`RE_RAW_LINEBREAK`].
#[must_use]
pub fn extract_preview(fragment: &str) -> String {
    let head = match RE_RAW_LINEBREAK.find(fragment) {
        Some(m) => &fragment[..m.start()],
        None => fragment,
    };

    let doc = Document::from(head);
    doc.select(NONVISIBLE_SELECTOR).remove();
    collapse(&doc.select("body").text())
}

/// Collapse blank-line runs to one blank line, squeeze horizontal
/// whitespace, and trim.
fn collapse(text: &str) -> String {
    let squeezed = RE_INLINE_SPACE.replace_all(text, " ");
    let collapsed = RE_BLANK_RUN.replace_all(&squeezed, "\n\n");
    collapsed
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
