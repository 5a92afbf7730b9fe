//! Module filtering and sanitization.
//!
//! A scraped project page is a sequence of structural "modules" (one image,
//! one video embed, one text block). This module isolates the
//! visually-relevant ones and rewrites them into a fragment that renders
//! cleanly outside the source site: tooling chrome removed, lazy-loaded
//! sources repaired, fixed pixel sizing relaxed.
//!
//! The cleanup is a fixed ordered sequence of named passes, each a small
//! tree transform over one module selection. A module that a pass cannot
//! make sense of is skipped, never fatal; an empty result is valid.

use dom_query::{Document, Selection};
use tracing::debug;

/// Module container selectors, most specific first. The first selector
/// that matches anything wins, so markup drift on the source side only
/// costs a fallback, not the whole parse.
const MODULE_SELECTORS: &[&str] = &[
    "#project-modules .project-module",
    "div[class*='project-module']",
    "section[aria-label*='Project Module']",
];

/// UI chrome that never belongs in re-rendered content. Scoped to
/// non-media elements so a lazily-loaded image with a "placeholder" class
/// survives for the repair pass.
const NOISE_SELECTOR: &str = "script, style, svg, \
     div[class*='toolbar'], div[class*='Toolbar'], \
     div[class*='tools'], div[class*='actions'], \
     div[class*='spacer'], div[class*='Spacer'], \
     div[class*='divider'], div[class*='placeholder'], \
     span[class*='spacer'], span[class*='placeholder']";

/// True when an image source attribute is a known blank/spacer marker
/// rather than real pixels.
#[must_use]
pub(crate) fn is_placeholder_src(src: &str) -> bool {
    let src = src.trim();
    src.is_empty()
        || src.starts_with("data:image/gif")
        || src.contains("blank.")
        || src.contains("spacer")
        || src == "about:blank"
}

/// Select the content modules of a document, in document order.
pub(crate) fn select_modules(doc: &Document) -> Vec<Selection> {
    for selector in MODULE_SELECTORS {
        let found = doc.select(selector);
        if found.exists() {
            return found
                .nodes()
                .iter()
                .map(|node| Selection::from(*node))
                .collect();
        }
    }
    Vec::new()
}

/// Isolate and sanitize the media-bearing modules of a scraped document.
///
/// Returns the surviving modules' HTML concatenated in document order,
/// ready for direct display. Modules left with no image, video, or embedded
/// frame after cleanup are dropped entirely.
#[must_use]
pub fn filter_modules(document_html: &str) -> String {
    let doc = Document::from(document_html);
    let modules = select_modules(&doc);
    debug!(count = modules.len(), "found content modules");

    let mut out = String::new();
    let mut kept = 0;
    for module in &modules {
        remove_noise(module);
        flatten_spacing(module);
        relax_embed_sizing(module);
        repair_lazy_images(module);
        responsive_images(module);
        preserve_flex_rows(module);

        if !has_media(module) {
            continue;
        }
        out.push_str(&module.html());
        kept += 1;
    }
    debug!(kept, dropped = modules.len() - kept, "module filter done");
    out
}

/// Strip scripts, styles, inline SVG icons, and tooling/action UI.
fn remove_noise(module: &Selection) {
    module.select(NOISE_SELECTOR).remove();
}

/// Zero out the vertical spacing modules use to gap themselves; the
/// rendering surface supplies its own rhythm.
fn flatten_spacing(module: &Selection) {
    module.set_attr("style", "margin: 0; padding-top: 0; padding-bottom: 0;");
}

/// Let embedded frames and videos scale to the full available width
/// instead of their source-site pixel boxes.
fn relax_embed_sizing(module: &Selection) {
    for node in module.select("iframe, video").nodes() {
        let embed = Selection::from(*node);
        embed.remove_attr("width");
        embed.remove_attr("height");
        embed.set_attr("style", "width: 100%;");
    }
}

/// Swap placeholder sources for the real deferred one: `data-src` first,
/// then the first source-set entry. The stale source-set is dropped so the
/// repaired `src` actually gets used.
fn repair_lazy_images(module: &Selection) {
    for node in module.select("img").nodes() {
        let img = Selection::from(*node);
        let src = img.attr("src").map(|s| s.to_string()).unwrap_or_default();
        if !is_placeholder_src(&src) {
            continue;
        }

        let replacement = img
            .attr("data-src")
            .map(|s| s.to_string())
            .filter(|s| !is_placeholder_src(s))
            .or_else(|| {
                img.attr("srcset").and_then(|srcset| {
                    srcset
                        .split(',')
                        .next()
                        .and_then(|entry| entry.split_whitespace().next())
                        .map(ToString::to_string)
                })
            });

        if let Some(real) = replacement {
            img.set_attr("src", &real);
            img.remove_attr("srcset");
            img.remove_attr("data-src");
        }
    }
}

/// Drop fixed pixel sizing from images so they scale responsively. Images
/// sitting in a flexible grid item fill their slot; everything else is
/// capped at the container width.
fn responsive_images(module: &Selection) {
    for node in module.select("img").nodes() {
        let img = Selection::from(*node);
        img.remove_attr("width");
        img.remove_attr("height");
        if closest_class_fragment(&img, "grid-item").is_some() {
            img.set_attr("style", "width: 100%; height: auto;");
        } else {
            img.set_attr("style", "max-width: 100%; height: auto;");
        }
    }
}

/// Keep the source's multi-image row layout by forcing flex on the
/// enclosing row container of each image, when one exists.
fn preserve_flex_rows(module: &Selection) {
    for node in module.select("img").nodes() {
        let img = Selection::from(*node);
        if let Some(row) = closest_class_fragment(&img, "row") {
            row.set_attr(
                "style",
                "display: flex; flex-wrap: wrap; justify-content: space-between;",
            );
        }
    }
}

/// A module earns its keep only with at least one media element.
fn has_media(module: &Selection) -> bool {
    module.select("img, video, iframe").exists()
}

/// Nearest ancestor whose class attribute contains `fragment`. Bounded
/// walk so a cyclic or pathological tree cannot loop forever.
fn closest_class_fragment<'a>(sel: &Selection<'a>, fragment: &str) -> Option<Selection<'a>> {
    let mut current = sel.parent();
    for _ in 0..64 {
        if !current.exists() {
            return None;
        }
        if current
            .attr("class")
            .is_some_and(|class| class.to_lowercase().contains(fragment))
        {
            return Some(current);
        }
        current = current.parent();
    }
    None
}
