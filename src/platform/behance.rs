//! Behance parser (HTML-scraped platform).
//!
//! Behance offers no usable public API, so everything comes from the
//! rendered page: the title through an ordered selector chain, the visual
//! modules through the module filter, and the cover through the bounded
//! module scan. The descriptive text is deliberately not deep-scraped —
//! a static placeholder stands in, which reviewers edit by hand. That is a
//! documented limitation of this source, not a defect.

use dom_query::{Document, Selection};
use tracing::info;

use crate::cover::scan_modules;
use crate::error::{Error, Result};
use crate::fetch::fetch_document;
use crate::modules::filter_modules;
use crate::options::FetchOptions;
use crate::record::{CanonicalCaseRecord, Platform};

/// Title stand-in when every fallback source comes up empty.
const TITLE_PLACEHOLDER: &str = "Untitled Project";

/// Description stand-in; this platform's description is reviewer-edited.
const DESCRIPTION_PLACEHOLDER: &str = "Imported from Behance. Edit the description by hand.";

/// Title sources, most reliable first.
const TITLE_SELECTORS: &[&str] = &[
    "h1[class*='Project-title']",
    ".project-title h1",
    "#project-block-title h1",
];

/// Parse a Behance project page into the canonical record.
pub async fn parse(url: &str, options: &FetchOptions) -> Result<CanonicalCaseRecord> {
    parse_inner(url, options)
        .await
        .map_err(|e| Error::for_platform(Platform::Behance.name(), e))
}

async fn parse_inner(url: &str, options: &FetchOptions) -> Result<CanonicalCaseRecord> {
    let fetched = fetch_document(url, options).await?;
    info!(url, strategy = %fetched.strategy, "parsing behance case");

    let doc = Document::from(fetched.html.as_str());
    let mut diagnostics = vec![format!("fetch: {}", fetched.strategy)];

    let mut record = CanonicalCaseRecord::new(Platform::Behance, url);
    let (title, title_source) = extract_title(&doc);
    record.title = title;
    diagnostics.push(format!("title: {title_source}"));

    record.short_description = DESCRIPTION_PLACEHOLDER.to_string();
    record.full_description = DESCRIPTION_PLACEHOLDER.to_string();

    record.normalized_content_html = filter_modules(&fetched.html);

    let scan = scan_modules(&doc, options.max_scan_modules);
    diagnostics.push(if scan.cover.is_empty() {
        "cover: none found".to_string()
    } else if scan.candidates.len() == 1 && scan.candidates[0] == scan.cover {
        format!("cover: {} (sole candidate)", scan.cover)
    } else {
        format!("cover: first of {} candidates", scan.candidates.len())
    });
    record.cover_image_url = scan.cover;
    record.candidate_image_urls = scan.candidates;

    record.diagnostics = diagnostics.join("; ");
    Ok(record)
}

/// Ordered title chain: project heading selectors, OpenGraph title, the
/// document title, then the constant placeholder.
fn extract_title(doc: &Document) -> (String, &'static str) {
    for selector in TITLE_SELECTORS {
        if let Some(node) = doc.select(selector).nodes().first() {
            let text = Selection::from(*node).text().trim().to_string();
            if !text.is_empty() {
                return (text, "heading");
            }
        }
    }

    let og = doc.select("meta[property='og:title']");
    if let Some(content) = og.attr("content") {
        let content = content.trim().to_string();
        if !content.is_empty() {
            return (content, "og:title");
        }
    }

    let title = doc.select("title").text().trim().to_string();
    if !title.is_empty() {
        return (title, "document title");
    }

    (TITLE_PLACEHOLDER.to_string(), "placeholder")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_prefers_project_heading() {
        let doc = Document::from(
            r#"<html><head>
                <meta property="og:title" content="OG Title">
                <title>Doc Title</title>
            </head><body>
                <div class="project-title"><h1>Heading Title</h1></div>
            </body></html>"#,
        );
        let (title, source) = extract_title(&doc);
        assert_eq!(title, "Heading Title");
        assert_eq!(source, "heading");
    }

    #[test]
    fn test_title_falls_back_to_og_then_document_title() {
        let doc = Document::from(
            r#"<html><head>
                <meta property="og:title" content="OG Title">
                <title>Doc Title</title>
            </head><body></body></html>"#,
        );
        assert_eq!(extract_title(&doc), ("OG Title".to_string(), "og:title"));

        let doc = Document::from("<html><head><title>Doc Title</title></head><body></body></html>");
        assert_eq!(
            extract_title(&doc),
            ("Doc Title".to_string(), "document title")
        );
    }

    #[test]
    fn test_title_placeholder_when_nothing_found() {
        let doc = Document::from("<html><body><p>bare</p></body></html>");
        assert_eq!(
            extract_title(&doc),
            (TITLE_PLACEHOLDER.to_string(), "placeholder")
        );
    }
}
