//! Mana parser (API-driven platform).
//!
//! Mana exposes a documented JSON detail endpoint, so no scraping is needed
//! for the happy path: extract the video id from the URL, call
//! `{origin}/api/video/detail?videoId={id}`, and map the response onto the
//! canonical record. The response shape is loosely typed in practice —
//! `qiniuData` arrives either as an object or as a JSON-encoded string,
//! most text fields are optional — so every field is presence-checked and a
//! shape mismatch reads as "absent", never as a crash.

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::fetch::plain_fetch;
use crate::normalize::{extract_preview, normalize};
use crate::options::FetchOptions;
use crate::record::{CanonicalCaseRecord, Platform};
use crate::url_utils::{origin, qualify_url};

/// Video id embedded in the URL path, for pages that do not carry an
/// explicit query parameter.
static RE_PATH_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)(?:\.html)?/?$").expect("RE_PATH_ID regex"));

/// Resolution tiers of the storage provider's encoded video structure,
/// best first.
const VIDEO_TIERS: &[&str] = &["1080p", "720p", "480p"];

/// Known containers of the descriptive text on the public page, used only
/// as the last resort of the description chain.
const PAGE_DESCRIPTION_SELECTORS: &[&str] = &[
    ".video-introduction",
    ".introduction",
    "#introduction",
    ".video-detail-intro",
];

/// Detail payload of the Mana API. All fields optional; the record
/// degrades gracefully around whatever is missing.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ManaDetail {
    title: Option<String>,
    qiniu_data: Option<serde_json::Value>,
    introduction: Option<String>,
    introduction_text: Option<String>,
    summary: Option<String>,
    images: Option<serde_json::Value>,
    thumb: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ManaResponse {
    data: Option<ManaDetail>,
}

/// Parse a Mana video page into the canonical record.
pub async fn parse(url: &str, options: &FetchOptions) -> Result<CanonicalCaseRecord> {
    parse_inner(url, options)
        .await
        .map_err(|e| Error::for_platform(Platform::Mana.name(), e))
}

async fn parse_inner(url: &str, options: &FetchOptions) -> Result<CanonicalCaseRecord> {
    let parsed = Url::parse(url)?;
    let id = extract_id(&parsed).ok_or_else(|| Error::IdExtraction {
        platform: Platform::Mana.name(),
        url: url.to_string(),
    })?;
    info!(url, id = %id, "parsing mana case");

    let detail = fetch_detail(&parsed, &id, options).await?;
    let mut diagnostics = vec![format!("id: {id}"), "source: detail API".to_string()];

    let mut record = CanonicalCaseRecord::new(Platform::Mana, url);
    record.title = detail
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .ok_or(Error::MissingTitle {
            platform: Platform::Mana.name(),
        })?;

    apply_description(&mut record, &detail, &parsed, options, &mut diagnostics).await;
    apply_cover(&mut record, &detail, &parsed, &mut diagnostics);
    apply_video(&mut record, &detail, &mut diagnostics);

    record.diagnostics = diagnostics.join("; ");
    Ok(record)
}

/// Video id from the explicit query parameter, falling back to a path
/// pattern match.
fn extract_id(url: &Url) -> Option<String> {
    for (key, value) in url.query_pairs() {
        if (key == "videoId" || key == "id") && !value.is_empty() {
            return Some(value.into_owned());
        }
    }
    RE_PATH_ID
        .captures(url.path())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

async fn fetch_detail(base: &Url, id: &str, options: &FetchOptions) -> Result<ManaDetail> {
    let endpoint = format!("{}/api/video/detail?videoId={id}", origin(base));
    debug!(endpoint, "calling detail API");

    let client = reqwest::Client::builder()
        .timeout(options.request_timeout)
        .user_agent(&options.user_agent)
        .build()?;
    let response = client.get(&endpoint).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Retrieval(format!(
            "detail API returned {status} for video {id}"
        )));
    }

    let payload: ManaResponse = response
        .json()
        .await
        .map_err(|e| Error::ApiShape(format!("detail body did not decode: {e}")))?;
    payload
        .data
        .ok_or_else(|| Error::ApiShape(format!("detail response has no data for video {id}")))
}

/// Ordered description chain: structured HTML field, plain-text field,
/// summary field, then the public page itself. First non-empty source
/// wins; exhausting the chain degrades to empty fields plus a note.
async fn apply_description(
    record: &mut CanonicalCaseRecord,
    detail: &ManaDetail,
    page_url: &Url,
    options: &FetchOptions,
    diagnostics: &mut Vec<String>,
) {
    let attempts: [(&str, Option<&String>); 3] = [
        ("introduction", detail.introduction.as_ref()),
        ("introductionText", detail.introduction_text.as_ref()),
        ("summary", detail.summary.as_ref()),
    ];

    for (label, value) in attempts {
        if let Some(raw) = value {
            if !raw.trim().is_empty() {
                record.short_description = extract_preview(raw);
                record.full_description = normalize(raw);
                diagnostics.push(format!("description: {label}"));
                return;
            }
        }
    }

    // Last resort: the public page carries the introduction in a known
    // container even when the API omits it.
    match plain_fetch(page_url.as_str(), options).await {
        Ok(html) => {
            let doc = dom_query::Document::from(html.as_str());
            for selector in PAGE_DESCRIPTION_SELECTORS {
                if let Some(node) = doc.select(selector).nodes().first() {
                    let raw = dom_query::Selection::from(*node).inner_html().to_string();
                    let full = normalize(&raw);
                    if !full.is_empty() {
                        // Page containers hold paragraphs, not <br> runs, so
                        // the preview is the first normalized paragraph.
                        record.short_description =
                            full.lines().next().unwrap_or_default().to_string();
                        record.full_description = full;
                        diagnostics.push(format!("description: page {selector}"));
                        return;
                    }
                }
            }
            diagnostics.push("description: none found".to_string());
        }
        Err(e) => {
            warn!(error = %e, "page fetch for description fallback failed");
            diagnostics.push(format!("description: page fetch failed ({e})"));
        }
    }
}

/// Cover chain: gallery image list first, thumbnail second. Relative paths
/// are qualified against the page origin. No cover is a normal outcome.
fn apply_cover(
    record: &mut CanonicalCaseRecord,
    detail: &ManaDetail,
    page_url: &Url,
    diagnostics: &mut Vec<String>,
) {
    if let Some(images) = &detail.images {
        record.candidate_image_urls = image_urls(images, page_url);
    }

    if let Some(first) = record.candidate_image_urls.first() {
        record.cover_image_url.clone_from(first);
        diagnostics.push("cover: images[0]".to_string());
        return;
    }

    if let Some(thumb) = detail.thumb.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let qualified = qualify_url(thumb, page_url);
        record.candidate_image_urls.push(qualified.clone());
        record.cover_image_url = qualified;
        diagnostics.push("cover: thumb".to_string());
        return;
    }

    diagnostics.push("cover: none found".to_string());
}

/// Gallery entries arrive as plain strings or as objects carrying a `url`
/// or `path` field; anything else is ignored.
fn image_urls(images: &serde_json::Value, base: &Url) -> Vec<String> {
    let Some(list) = images.as_array() else {
        return Vec::new();
    };
    let mut urls = Vec::new();
    for item in list {
        let raw = item
            .as_str()
            .map(ToString::to_string)
            .or_else(|| {
                item.get("url")
                    .and_then(serde_json::Value::as_str)
                    .map(ToString::to_string)
            })
            .or_else(|| {
                item.get("path")
                    .and_then(serde_json::Value::as_str)
                    .map(ToString::to_string)
            });
        if let Some(raw) = raw {
            if !raw.trim().is_empty() {
                urls.push(qualify_url(&raw, base));
            }
        }
    }
    urls
}

/// Resolve the provider-specific encoded video structure to a playable
/// URL, preferring the highest resolution tier available.
fn apply_video(record: &mut CanonicalCaseRecord, detail: &ManaDetail, diagnostics: &mut Vec<String>) {
    let Some(raw) = &detail.qiniu_data else {
        return;
    };
    let Some(decoded) = decode_qiniu(raw) else {
        diagnostics.push("video: qiniuData undecodable".to_string());
        return;
    };

    for tier in VIDEO_TIERS {
        if let Some(url) = tier_url(&decoded, tier) {
            record.video_url = url;
            diagnostics.push(format!("video: {tier}"));
            return;
        }
    }
    diagnostics.push("video: no known tier".to_string());
}

/// `qiniuData` is sometimes an object and sometimes a JSON-encoded string
/// of that object; accept both.
fn decode_qiniu(value: &serde_json::Value) -> Option<serde_json::Value> {
    match value {
        serde_json::Value::Object(_) => Some(value.clone()),
        serde_json::Value::String(encoded) => serde_json::from_str(encoded).ok(),
        _ => None,
    }
}

/// A tier entry is either a URL string or an object with a `url` field.
fn tier_url(decoded: &serde_json::Value, tier: &str) -> Option<String> {
    let entry = decoded.get(tier)?;
    let url = entry
        .as_str()
        .map(ToString::to_string)
        .or_else(|| {
            entry
                .get("url")
                .and_then(serde_json::Value::as_str)
                .map(ToString::to_string)
        })?;
    if url.trim().is_empty() {
        None
    } else {
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_id_from_query_param() {
        let url = Url::parse("https://www.manamana.net/video/detail?videoId=10086").unwrap();
        assert_eq!(extract_id(&url).as_deref(), Some("10086"));

        let url = Url::parse("https://www.manamana.net/video/detail?id=42").unwrap();
        assert_eq!(extract_id(&url).as_deref(), Some("42"));
    }

    #[test]
    fn test_extract_id_from_path_fallback() {
        let url = Url::parse("https://www.manamana.net/video/10086.html").unwrap();
        assert_eq!(extract_id(&url).as_deref(), Some("10086"));

        let url = Url::parse("https://www.manamana.net/video/10086/").unwrap();
        assert_eq!(extract_id(&url).as_deref(), Some("10086"));
    }

    #[test]
    fn test_extract_id_none_when_absent() {
        let url = Url::parse("https://www.manamana.net/about").unwrap();
        assert_eq!(extract_id(&url), None);
    }

    #[test]
    fn test_decode_qiniu_object_and_string() {
        let object = serde_json::json!({"1080p": "https://cdn/v.mp4"});
        assert!(decode_qiniu(&object).is_some());

        let encoded = serde_json::json!(r#"{"720p": {"url": "https://cdn/v720.mp4"}}"#);
        let decoded = decode_qiniu(&encoded).unwrap();
        assert_eq!(
            tier_url(&decoded, "720p").as_deref(),
            Some("https://cdn/v720.mp4")
        );

        assert!(decode_qiniu(&serde_json::json!(5)).is_none());
        assert!(decode_qiniu(&serde_json::json!("not json")).is_none());
    }

    #[test]
    fn test_video_prefers_highest_tier() {
        let mut record =
            CanonicalCaseRecord::new(Platform::Mana, "https://www.manamana.net/v?id=1");
        let detail = ManaDetail {
            qiniu_data: Some(serde_json::json!({
                "480p": "https://cdn/v480.mp4",
                "1080p": "https://cdn/v1080.mp4",
            })),
            ..ManaDetail::default()
        };
        let mut diagnostics = Vec::new();
        apply_video(&mut record, &detail, &mut diagnostics);
        assert_eq!(record.video_url, "https://cdn/v1080.mp4");
        assert!(diagnostics.contains(&"video: 1080p".to_string()));
    }

    #[test]
    fn test_cover_falls_back_to_thumb_and_qualifies_it() {
        let base = Url::parse("https://www.manamana.net/video/detail?videoId=1").unwrap();
        let mut record = CanonicalCaseRecord::new(Platform::Mana, base.as_str());
        let detail = ManaDetail {
            thumb: Some("/uploads/cover.jpg".to_string()),
            ..ManaDetail::default()
        };
        let mut diagnostics = Vec::new();
        apply_cover(&mut record, &detail, &base, &mut diagnostics);
        assert_eq!(
            record.cover_image_url,
            "https://www.manamana.net/uploads/cover.jpg"
        );
        assert!(record
            .candidate_image_urls
            .contains(&record.cover_image_url));
    }

    #[test]
    fn test_image_list_accepts_strings_and_objects() {
        let base = Url::parse("https://www.manamana.net/").unwrap();
        let images = serde_json::json!([
            "https://cdn/a.jpg",
            {"url": "https://cdn/b.jpg"},
            {"path": "/uploads/c.jpg"},
            {"unrelated": true},
            7,
        ]);
        let urls = image_urls(&images, &base);
        assert_eq!(
            urls,
            vec![
                "https://cdn/a.jpg",
                "https://cdn/b.jpg",
                "https://www.manamana.net/uploads/c.jpg",
            ]
        );
    }
}
