//! Canonical output record for case ingestion.
//!
//! Every platform parser converges on [`CanonicalCaseRecord`], regardless of
//! whether the source was a JSON API or scraped HTML. The record is built
//! once per parse call, optionally edited by a human reviewer (title or
//! cover override), then handed verbatim to the persistence collaborator.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Source platform of a case page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// API-driven platform (detail endpoint returns structured JSON).
    Mana,
    /// HTML-scraped platform (content only reachable through rendered markup).
    Behance,
}

impl Platform {
    /// Platform name used in error messages and diagnostics.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Platform::Mana => "mana",
            Platform::Behance => "behance",
        }
    }
}

/// Normalized output of a single parse request.
///
/// Fields degrade independently: an empty `cover_image_url` or a placeholder
/// description is a normal, expectable outcome, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalCaseRecord {
    /// Best-effort extracted title. Falls back through an ordered chain of
    /// sources ending in a constant placeholder.
    pub title: String,

    /// Short human-scannable summary (text before the first line break),
    /// used for list views.
    pub short_description: String,

    /// Complete normalized text of the source's descriptive content,
    /// paragraphs separated by single blank lines.
    pub full_description: String,

    /// Selected representative image URL. Empty if none was found.
    pub cover_image_url: String,

    /// All images considered, in discovery order, so a reviewer can
    /// override the automatic choice.
    pub candidate_image_urls: Vec<String>,

    /// Sanitized HTML fragment of the source's visual modules, safe to
    /// render directly.
    pub normalized_content_html: String,

    /// Playable video URL, when the source carries a video asset.
    pub video_url: String,

    /// Source platform.
    pub platform: Platform,

    /// The originally requested URL.
    pub source_url: String,

    /// Free-text report of which extraction strategy and fallback paths
    /// were taken, for operability.
    pub diagnostics: String,
}

impl CanonicalCaseRecord {
    /// Empty record skeleton for a platform and source URL.
    #[must_use]
    pub fn new(platform: Platform, source_url: &str) -> Self {
        Self {
            title: String::new(),
            short_description: String::new(),
            full_description: String::new(),
            cover_image_url: String::new(),
            candidate_image_urls: Vec::new(),
            normalized_content_html: String::new(),
            video_url: String::new(),
            platform,
            source_url: source_url.to_string(),
            diagnostics: String::new(),
        }
    }

    /// Shape the record the way the persistence collaborator expects it:
    /// flat display fields plus an opaque JSON-encoded `content` blob
    /// carrying everything needed to re-render or re-edit the case.
    #[must_use]
    pub fn storage_payload(&self) -> serde_json::Value {
        let mut content = json!({
            "rawDescription": self.short_description,
            "fullDescription": self.full_description,
        });
        if self.platform == Platform::Behance {
            content["projectModulesHtml"] = json!(self.normalized_content_html);
            content["images"] = json!(self.candidate_image_urls);
        }
        if !self.video_url.is_empty() {
            content["videoUrl"] = json!(self.video_url);
        }
        json!({
            "title": self.title,
            "description": self.short_description,
            "coverImage": self.cover_image_url,
            "content": content.to_string(),
            "platform": self.platform,
            "sourceUrl": self.source_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_serde_tags() {
        assert_eq!(serde_json::to_string(&Platform::Mana).unwrap(), "\"mana\"");
        assert_eq!(
            serde_json::to_string(&Platform::Behance).unwrap(),
            "\"behance\""
        );
    }

    #[test]
    fn test_storage_payload_maps_display_fields() {
        let mut record = CanonicalCaseRecord::new(Platform::Mana, "https://example.com/v?id=1");
        record.title = "A case".to_string();
        record.short_description = "Short".to_string();
        record.full_description = "Short\n\nLong".to_string();
        record.cover_image_url = "https://cdn.example.com/a.jpg".to_string();

        let payload = record.storage_payload();
        assert_eq!(payload["title"], "A case");
        assert_eq!(payload["description"], "Short");
        assert_eq!(payload["coverImage"], "https://cdn.example.com/a.jpg");
        assert_eq!(payload["platform"], "mana");

        let content: serde_json::Value =
            serde_json::from_str(payload["content"].as_str().unwrap()).unwrap();
        assert_eq!(content["rawDescription"], "Short");
        assert_eq!(content["fullDescription"], "Short\n\nLong");
        // Scraped-platform fields stay out of API-platform payloads.
        assert!(content.get("projectModulesHtml").is_none());
    }

    #[test]
    fn test_storage_payload_includes_scraped_content() {
        let mut record =
            CanonicalCaseRecord::new(Platform::Behance, "https://behance.net/gallery/1/x");
        record.normalized_content_html = "<div><img src=\"a.jpg\"></div>".to_string();
        record.candidate_image_urls = vec!["a.jpg".to_string(), "b.jpg".to_string()];

        let content: serde_json::Value =
            serde_json::from_str(record.storage_payload()["content"].as_str().unwrap()).unwrap();
        assert_eq!(content["projectModulesHtml"], "<div><img src=\"a.jpg\"></div>");
        assert_eq!(content["images"].as_array().unwrap().len(), 2);
    }
}
