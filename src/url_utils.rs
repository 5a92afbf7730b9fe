//! URL utility functions.
//!
//! Helpers for qualifying the relative image and page paths that third-party
//! payloads hand back (thumbnail fields in particular arrive host-relative).

use url::Url;

/// Check if a string is a valid absolute http(s) URL.
///
/// # Returns
/// * `(is_absolute, parsed_url)` - whether the URL is absolute and the parsed URL if valid
#[must_use]
pub fn is_absolute_url(s: &str) -> (bool, Option<Url>) {
    let s = s.trim();

    if s.is_empty() {
        return (false, None);
    }

    if !s.starts_with("http://") && !s.starts_with("https://") {
        return (false, None);
    }

    match Url::parse(s) {
        Ok(url) if url.host().is_some() => (true, Some(url)),
        _ => (false, None),
    }
}

/// Convert a relative or absolute URL to absolute form against a base.
///
/// Protocol-relative (`//cdn...`) and data URLs are handled; an unresolvable
/// input is returned unchanged rather than dropped, so a reviewer still sees
/// what the source offered.
#[must_use]
pub fn qualify_url(url_str: &str, base: &Url) -> String {
    let url_str = url_str.trim();

    if url_str.is_empty() || url_str.starts_with("data:") {
        return url_str.to_string();
    }

    if url_str.starts_with("//") {
        return format!("{}:{url_str}", base.scheme());
    }

    let (is_abs, _) = is_absolute_url(url_str);
    if is_abs {
        return url_str.to_string();
    }

    match base.join(url_str) {
        Ok(joined) => joined.to_string(),
        Err(_) => url_str.to_string(),
    }
}

/// Origin (scheme + host + port) of a URL, without path or query.
#[must_use]
pub fn origin(url: &Url) -> String {
    let mut out = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        out.push_str(&format!(":{port}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_absolute_url() {
        assert!(is_absolute_url("https://example.com/a.jpg").0);
        assert!(!is_absolute_url("/uploads/a.jpg").0);
        assert!(!is_absolute_url("").0);
        assert!(!is_absolute_url("ftp://example.com/a").0);
    }

    #[test]
    fn test_qualify_relative_path() {
        let base = Url::parse("https://www.manamana.net/video/detail?id=5").unwrap();
        assert_eq!(
            qualify_url("/uploads/thumb.jpg", &base),
            "https://www.manamana.net/uploads/thumb.jpg"
        );
    }

    #[test]
    fn test_qualify_protocol_relative() {
        let base = Url::parse("https://example.com/page").unwrap();
        assert_eq!(
            qualify_url("//cdn.example.com/a.jpg", &base),
            "https://cdn.example.com/a.jpg"
        );
    }

    #[test]
    fn test_qualify_keeps_absolute_and_data_urls() {
        let base = Url::parse("https://example.com/").unwrap();
        assert_eq!(
            qualify_url("https://other.com/x.png", &base),
            "https://other.com/x.png"
        );
        assert_eq!(qualify_url("data:image/gif;base64,R0", &base), "data:image/gif;base64,R0");
    }

    #[test]
    fn test_origin_with_port() {
        let base = Url::parse("http://127.0.0.1:5500/api/x").unwrap();
        assert_eq!(origin(&base), "http://127.0.0.1:5500");
    }
}
