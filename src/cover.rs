//! Cover-image selection.
//!
//! Picks one representative image for a case record. Two modes, depending on
//! what the source offers:
//!
//! - **Descriptor scoring** — a responsive source-set is ranked by its
//!   width/density descriptors plus fixed bonuses for known full-size URL
//!   path markers; the top score wins.
//! - **Module scan** — when no source-set exists, the document's content
//!   modules are scanned in order (bounded) and the first usable image is
//!   the default pick, with the OpenGraph image as the final fallback.
//!
//! Selection is pure: no network calls, deterministic for a fixed input.

use dom_query::{Document, Selection};
use tracing::debug;

use crate::modules::{is_placeholder_src, select_modules};

/// One entry of a responsive source-set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrcsetCandidate {
    /// Image URL.
    pub url: String,
    /// Width (`"1000w"`) or density (`"2x"`) descriptor; may be empty.
    pub descriptor: String,
}

/// Outcome of a cover scan: the chosen URL (possibly empty) and every
/// candidate considered, in discovery order, for human override.
#[derive(Debug, Clone, Default)]
pub struct CoverScan {
    /// Selected cover URL; empty when nothing usable was found.
    pub cover: String,
    /// All candidate URLs in discovery order.
    pub candidates: Vec<String>,
}

/// Bonus for an explicit full-size path marker.
const FULL_SIZE_BONUS: f64 = 10_000.0;
/// Bonus for the large-but-bounded size marker.
const LARGE_BONUS: f64 = 5_000.0;
/// Bonus for the medium size marker.
const MEDIUM_BONUS: f64 = 2_000.0;

/// Parse a `srcset` attribute into candidates.
///
/// Entries are comma-separated `url [descriptor]` pairs. Malformed entries
/// are skipped rather than failing the whole set.
#[must_use]
pub fn parse_srcset(srcset: &str) -> Vec<SrcsetCandidate> {
    srcset
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split_whitespace();
            let url = parts.next()?.to_string();
            if url.is_empty() {
                return None;
            }
            let descriptor = parts.next().unwrap_or("").to_string();
            Some(SrcsetCandidate { url, descriptor })
        })
        .collect()
}

/// Score contributed by a width/density descriptor.
///
/// Width tokens score their pixel width; density tokens score density ×
/// 1000; a missing or bare density defaults to 1.
#[must_use]
pub fn descriptor_score(descriptor: &str) -> f64 {
    let descriptor = descriptor.trim();
    if descriptor.is_empty() {
        return 1_000.0;
    }
    if let Some(width) = descriptor.strip_suffix(['w', 'W']) {
        return width.trim().parse::<f64>().unwrap_or(0.0);
    }
    if let Some(density) = descriptor.strip_suffix(['x', 'X']) {
        let density = density.trim();
        let value = if density.is_empty() {
            1.0
        } else {
            density.parse::<f64>().unwrap_or(1.0)
        };
        return value * 1_000.0;
    }
    0.0
}

/// Fixed bonus for URLs whose path names a known size tier. Bonuses stack
/// additively with the descriptor score.
#[must_use]
pub fn url_size_bonus(url: &str) -> f64 {
    let mut bonus = 0.0;
    if url.contains("fs_webp") || url.contains("/fs/") {
        bonus += FULL_SIZE_BONUS;
    }
    if url.contains("max_3840") {
        bonus += LARGE_BONUS;
    }
    if url.contains("max_632") || url.contains("/1400/") {
        bonus += MEDIUM_BONUS;
    }
    bonus
}

/// Pick the best candidate of a responsive source-set.
///
/// Deterministic: the total score is a pure function of descriptor and URL,
/// and on ties the earliest candidate wins.
#[must_use]
pub fn select_from_srcset(candidates: &[SrcsetCandidate]) -> Option<String> {
    let mut best: Option<(&SrcsetCandidate, f64)> = None;
    for candidate in candidates {
        let score = descriptor_score(&candidate.descriptor) + url_size_bonus(&candidate.url);
        match best {
            Some((_, best_score)) if best_score >= score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best.map(|(candidate, _)| candidate.url.clone())
}

/// Best URL a single `<img>` offers: its source-set winner when present,
/// otherwise its (lazy-repaired) source attribute.
fn image_candidate_url(img: &Selection) -> Option<String> {
    if let Some(srcset) = img.attr("srcset") {
        let parsed = parse_srcset(&srcset);
        if let Some(url) = select_from_srcset(&parsed) {
            return Some(url);
        }
    }
    for attr in ["src", "data-src"] {
        if let Some(src) = img.attr(attr) {
            let src = src.to_string();
            if !src.is_empty() && !is_placeholder_src(&src) {
                return Some(src);
            }
        }
    }
    None
}

/// Scan the document's content modules for cover candidates.
///
/// At most `max_modules` candidate-bearing modules are visited, to bound
/// cost on very long pages. The first image discovered is the default pick;
/// if nothing usable turns up, the OpenGraph image is used and appended to
/// the candidate set.
#[must_use]
pub fn scan_modules(doc: &Document, max_modules: usize) -> CoverScan {
    let mut scan = CoverScan::default();
    let mut bearing_modules = 0;

    for module in select_modules(doc) {
        if bearing_modules >= max_modules {
            break;
        }
        let mut found_any = false;
        for node in module.select("img").nodes() {
            let img = Selection::from(*node);
            if let Some(url) = image_candidate_url(&img) {
                if !scan.candidates.contains(&url) {
                    scan.candidates.push(url);
                }
                found_any = true;
            }
        }
        if found_any {
            bearing_modules += 1;
        }
    }

    // First discovered image is the default pick; reviewers can override.
    if let Some(first) = scan.candidates.first() {
        scan.cover.clone_from(first);
    } else if let Some(og) = open_graph_image(doc) {
        debug!(url = %og, "no module image found, falling back to og:image");
        if !scan.candidates.contains(&og) {
            scan.candidates.push(og.clone());
        }
        scan.cover = og;
    }

    scan
}

/// The document's `og:image` meta content, if any.
#[must_use]
pub fn open_graph_image(doc: &Document) -> Option<String> {
    let meta = doc.select("meta[property='og:image']");
    let content = meta.attr("content")?.to_string();
    if content.is_empty() {
        None
    } else {
        Some(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_srcset_pairs() {
        let parsed = parse_srcset("a.jpg 300w, b.jpg 1000w");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].url, "a.jpg");
        assert_eq!(parsed[0].descriptor, "300w");
        assert_eq!(parsed[1].descriptor, "1000w");
    }

    #[test]
    fn test_parse_srcset_skips_blank_entries() {
        let parsed = parse_srcset("a.jpg 1x, , b.jpg");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].descriptor, "");
    }

    #[test]
    fn test_width_descriptor_wins_by_width() {
        let candidates = parse_srcset("a.jpg 300w, b.jpg 1000w");
        assert_eq!(select_from_srcset(&candidates).as_deref(), Some("b.jpg"));
    }

    #[test]
    fn test_density_defaults_to_one() {
        assert_eq!(descriptor_score("x"), 1_000.0);
        assert_eq!(descriptor_score(""), 1_000.0);
        assert_eq!(descriptor_score("2x"), 2_000.0);
        assert_eq!(descriptor_score("1.5x"), 1_500.0);
    }

    #[test]
    fn test_full_size_bonus_outweighs_equal_density() {
        let candidates = parse_srcset(
            "x/max_632_webp/img.png 1.00x, x/fs_webp/img.png 1.00x",
        );
        assert_eq!(
            select_from_srcset(&candidates).as_deref(),
            Some("x/fs_webp/img.png")
        );
    }

    #[test]
    fn test_tie_keeps_first_candidate() {
        let candidates = parse_srcset("first.jpg 1x, second.jpg 1x");
        assert_eq!(select_from_srcset(&candidates).as_deref(), Some("first.jpg"));
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let candidates = parse_srcset("a.jpg 2x, x/fs_webp/b.jpg 1x, c.jpg 800w");
        let first = select_from_srcset(&candidates);
        for _ in 0..10 {
            assert_eq!(select_from_srcset(&candidates), first);
        }
    }

    #[test]
    fn test_empty_srcset_selects_nothing() {
        assert_eq!(select_from_srcset(&[]), None);
    }

    #[test]
    fn test_scan_picks_first_module_image() {
        let html = r#"<div id="project-modules">
            <div class="project-module"><img src="https://cdn/one.jpg"></div>
            <div class="project-module"><img src="https://cdn/two.jpg"></div>
        </div>"#;
        let doc = Document::from(html);
        let scan = scan_modules(&doc, 10);
        assert_eq!(scan.cover, "https://cdn/one.jpg");
        assert_eq!(scan.candidates.len(), 2);
        assert!(scan.candidates.contains(&"https://cdn/two.jpg".to_string()));
    }

    #[test]
    fn test_scan_cover_is_member_of_candidates() {
        let html = r#"<div id="project-modules">
            <div class="project-module"><img src="https://cdn/a.jpg"></div>
        </div>"#;
        let scan = scan_modules(&Document::from(html), 10);
        assert!(scan.candidates.contains(&scan.cover));
    }

    #[test]
    fn test_scan_skips_spacer_images_and_uses_og_fallback() {
        let html = r#"<html><head>
            <meta property="og:image" content="https://cdn/og.jpg">
        </head><body><div id="project-modules">
            <div class="project-module"><img src="data:image/gif;base64,R0lGOD"></div>
        </div></body></html>"#;
        let scan = scan_modules(&Document::from(html), 10);
        assert_eq!(scan.cover, "https://cdn/og.jpg");
        assert!(scan.candidates.contains(&scan.cover));
    }

    #[test]
    fn test_scan_respects_module_cap() {
        let mut html = String::from(r#"<div id="project-modules">"#);
        for i in 0..15 {
            html.push_str(&format!(
                r#"<div class="project-module"><img src="https://cdn/{i}.jpg"></div>"#
            ));
        }
        html.push_str("</div>");
        let scan = scan_modules(&Document::from(html.as_str()), 10);
        assert_eq!(scan.candidates.len(), 10);
        assert_eq!(scan.cover, "https://cdn/0.jpg");
    }

    #[test]
    fn test_scan_prefers_srcset_winner_for_candidate() {
        let html = r#"<div id="project-modules">
            <div class="project-module">
                <img src="small.jpg" srcset="small.jpg 300w, big.jpg 1400w">
            </div>
        </div>"#;
        let scan = scan_modules(&Document::from(html), 10);
        assert_eq!(scan.cover, "big.jpg");
    }

    #[test]
    fn test_empty_document_yields_empty_scan() {
        let scan = scan_modules(&Document::from("<p>no modules</p>"), 10);
        assert!(scan.cover.is_empty());
        assert!(scan.candidates.is_empty());
    }
}
