//! Configuration options for page retrieval.
//!
//! The `FetchOptions` struct controls how target pages are fetched and how
//! far the cover-image scan goes. All fields are public for easy
//! configuration; use `Default::default()` for standard settings.

use std::time::Duration;

/// Browser identity sent on both the rendered and the plain fetch path.
///
/// Several target hosts answer bot user agents with empty shells, so a
/// realistic desktop identity is part of the retrieval contract.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration options for fetching and scanning.
///
/// # Example
///
/// ```rust
/// use case_ingest::FetchOptions;
/// use std::time::Duration;
///
/// // Use defaults
/// let options = FetchOptions::default();
///
/// // Customize specific fields
/// let options = FetchOptions {
///     navigation_timeout: Duration::from_secs(30),
///     ..FetchOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Upper bound on rendered navigation (page load + network idle).
    ///
    /// Default: 60 seconds
    pub navigation_timeout: Duration,

    /// Upper bound on the plain HTTP fallback request.
    ///
    /// Default: 30 seconds
    pub request_timeout: Duration,

    /// Pixel increment of the scroll-to-bottom loop that triggers
    /// viewport-bound lazy loading.
    ///
    /// Default: 800
    pub scroll_step: u32,

    /// Pause between scroll increments, giving lazy loaders time to fire.
    ///
    /// Default: 300ms
    pub scroll_delay: Duration,

    /// Hard cap on scroll iterations, so an endlessly growing page
    /// (infinite feed) still terminates.
    ///
    /// Default: 60
    pub max_scroll_steps: u32,

    /// Settle delay after scrolling completes, for late-arriving content.
    ///
    /// Default: 1500ms
    pub settle_delay: Duration,

    /// Bounded wait for a "content loaded" marker element after settling.
    /// Expiry is not fatal; capture proceeds anyway.
    ///
    /// Default: 5 seconds
    pub marker_timeout: Duration,

    /// Browser identity string for both fetch paths.
    ///
    /// Default: [`DEFAULT_USER_AGENT`]
    pub user_agent: String,

    /// Explicit Chrome/Chromium executable for the rendered path. When
    /// `None` the browser is auto-detected; detection failure simply
    /// routes the fetch to the plain fallback.
    ///
    /// Default: `None`
    pub chrome_executable: Option<String>,

    /// Maximum number of candidate-bearing modules the cover-image scan
    /// visits before stopping.
    ///
    /// Default: 10
    pub max_scan_modules: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(60),
            request_timeout: Duration::from_secs(30),
            scroll_step: 800,
            scroll_delay: Duration::from_millis(300),
            max_scroll_steps: 60,
            settle_delay: Duration::from_millis(1500),
            marker_timeout: Duration::from_secs(5),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chrome_executable: None,
            max_scan_modules: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = FetchOptions::default();
        assert_eq!(options.navigation_timeout, Duration::from_secs(60));
        assert_eq!(options.max_scan_modules, 10);
        assert!(options.chrome_executable.is_none());
        assert!(options.user_agent.contains("Mozilla/5.0"));
    }
}
